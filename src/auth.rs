use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use wreq::Client;

use crate::error::{self, TravelError};
use crate::model::User;

pub const DEFAULT_BASE_URL: &str = "https://travellooker.onrender.com";

const LOGIN_PATH: &str = "/api/login";
const REGISTER_PATH: &str = "/api/accounts/register/";
const LOGOUT_PATH: &str = "/accounts/logout/";

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone, Debug)]
pub struct ClientOptions {
    pub base_url: String,
    pub proxy: Option<String>,
    pub timeout: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            proxy: None,
            timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), TravelError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(TravelError::Validation(
                "please fill in all fields".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), TravelError> {
        if self.username.trim().is_empty()
            || self.email.trim().is_empty()
            || self.password.is_empty()
            || self.password_confirm.is_empty()
        {
            return Err(TravelError::Validation(
                "please fill in all fields".into(),
            ));
        }
        if self.password != self.password_confirm {
            return Err(TravelError::Validation("passwords do not match".into()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(TravelError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    pub user: Option<User>,
    pub token: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub token: Option<String>,
    pub user: User,
}

/// The outcome of a successful login or registration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Authenticated {
    pub user: User,
    pub token: Option<String>,
}

pub fn check_status(status: u16) -> Result<(), TravelError> {
    match status {
        200..=299 => Ok(()),
        _ => Err(TravelError::HttpStatus(status)),
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, TravelError> {
    serde_json::from_str(body).map_err(|e| TravelError::Decode(e.to_string()))
}

impl LoginResponse {
    /// Turns the gateway's answer into a session, or the message it gave.
    pub fn into_result(self, email: &str) -> Result<Authenticated, TravelError> {
        if !self.success {
            return Err(TravelError::Application(
                self.message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| "invalid credentials".into()),
            ));
        }
        let user = self.user.unwrap_or_else(|| User {
            username: email.to_string(),
            email: email.to_string(),
        });
        Ok(Authenticated {
            user,
            token: self.token,
        })
    }
}

/// Client for the remote authentication gateway. Calls are never retried.
pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(options: &ClientOptions) -> Result<Self, TravelError> {
        let mut builder = Client::builder().timeout(Duration::from_secs(options.timeout));

        if let Some(ref proxy) = options.proxy {
            builder = builder.proxy(wreq::Proxy::all(proxy).map_err(error::from_http_error)?);
        }

        let client = builder.build().map_err(error::from_http_error)?;

        Ok(Self {
            client,
            base_url: options.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<String, TravelError> {
        let url = self.url(path);
        debug!(%url, "POST");

        let response = self
            .client
            .post(url.as_str())
            .json(body)
            .send()
            .await
            .map_err(error::from_http_error)?;

        check_status(response.status().as_u16())?;
        response.text().await.map_err(error::from_http_error)
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<Authenticated, TravelError> {
        request.validate()?;
        let body = self.post_json(LOGIN_PATH, request).await?;
        let response: LoginResponse = decode(&body)?;
        let session = response.into_result(&request.email)?;
        info!(user = %session.user.username, "logged in");
        Ok(session)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<Authenticated, TravelError> {
        request.validate()?;
        let body = self.post_json(REGISTER_PATH, request).await?;
        let response: RegisterResponse = decode(&body)?;
        info!(user = %response.user.username, "registered");
        Ok(Authenticated {
            user: response.user,
            token: response.token,
        })
    }

    /// Tells the gateway the token is done with. Callers treat failure as
    /// non-fatal.
    pub async fn logout(&self, token: &str) -> Result<(), TravelError> {
        let url = self.url(LOGOUT_PATH);
        debug!(%url, "POST");

        let response = self
            .client
            .post(url.as_str())
            .header("Authorization", format!("Token {token}"))
            .send()
            .await
            .map_err(error::from_http_error)?;

        check_status(response.status().as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(password: &str, confirm: &str) -> RegisterRequest {
        RegisterRequest {
            username: "ada".into(),
            email: "ada@example.com".into(),
            password: password.into(),
            password_confirm: confirm.into(),
        }
    }

    #[test]
    fn register_requires_matching_passwords() {
        let err = register("secret1", "secret2").validate().unwrap_err();
        assert!(err.to_string().contains("do not match"));
    }

    #[test]
    fn register_requires_six_characters() {
        assert!(register("abc12", "abc12").validate().is_err());
        assert!(register("abc123", "abc123").validate().is_ok());
    }

    #[test]
    fn register_requires_all_fields() {
        let mut r = register("abc123", "abc123");
        r.username = "  ".into();
        assert!(matches!(r.validate(), Err(TravelError::Validation(_))));
    }

    #[test]
    fn login_requires_both_fields() {
        let r = LoginRequest {
            email: "ada@example.com".into(),
            password: String::new(),
        };
        assert!(r.validate().is_err());
    }

    #[test]
    fn status_outside_2xx_is_remote_error() {
        assert!(check_status(200).is_ok());
        assert!(check_status(204).is_ok());
        assert!(matches!(check_status(401), Err(TravelError::HttpStatus(401))));
        assert!(matches!(check_status(503), Err(TravelError::HttpStatus(503))));
    }

    #[test]
    fn unsuccessful_login_surfaces_message() {
        let response: LoginResponse =
            decode(r#"{"success": false, "message": "Account locked"}"#).unwrap();
        let err = response.into_result("ada@example.com").unwrap_err();
        assert!(matches!(err, TravelError::Application(ref m) if m == "Account locked"));
    }

    #[test]
    fn unsuccessful_login_without_message_has_default() {
        let response: LoginResponse = decode(r#"{"success": false}"#).unwrap();
        let err = response.into_result("ada@example.com").unwrap_err();
        assert_eq!(err.to_string(), "invalid credentials");
    }

    #[test]
    fn successful_login_without_user_falls_back_to_email() {
        let response: LoginResponse = decode(r#"{"success": true, "token": "t0k"}"#).unwrap();
        let session = response.into_result("ada@example.com").unwrap();
        assert_eq!(session.user.email, "ada@example.com");
        assert_eq!(session.token.as_deref(), Some("t0k"));
    }

    #[test]
    fn register_response_accepts_name_alias() {
        let response: RegisterResponse =
            decode(r#"{"token": "abc", "user": {"name": "ada", "email": "a@b.c"}}"#).unwrap();
        assert_eq!(response.user.username, "ada");
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let client = AuthClient::new(&ClientOptions {
            base_url: "http://localhost:8000/".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.url(LOGIN_PATH), "http://localhost:8000/api/login");
    }
}
