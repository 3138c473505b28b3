//! Settings read from the environment, with `.env` honoured for local use.
//! Command-line flags take precedence over anything loaded here.

use std::path::PathBuf;

use crate::auth::{ClientOptions, DEFAULT_BASE_URL};
use crate::error::TravelError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: Option<String>,
    pub timeout: Option<String>,
    pub proxy: Option<String>,
    pub token_path: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub log_filter: String,
}

fn default_token_path() -> PathBuf {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    home.join(".travelbook").join("token")
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, TravelError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let token_path = non_empty("TRAVELBOOK_TOKEN_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_token_path);

        Ok(Self {
            api_url: non_empty("TRAVELBOOK_API_URL"),
            timeout: non_empty("TRAVELBOOK_TIMEOUT"),
            proxy: non_empty("TRAVELBOOK_PROXY"),
            token_path,
            catalog_path: non_empty("TRAVELBOOK_CATALOG").map(PathBuf::from),
            log_filter: non_empty("RUST_LOG").unwrap_or_else(|| "warn".into()),
        })
    }

    /// Gateway settings, checked on use.
    pub fn client_options(&self) -> Result<ClientOptions, TravelError> {
        let base_url = self
            .api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());
        if !is_http_url(&base_url) {
            return Err(TravelError::Config(format!(
                "API URL (--api-url or TRAVELBOOK_API_URL) must start with http:// or https://, got \"{base_url}\""
            )));
        }

        let timeout = match self.timeout {
            Some(ref v) => v.trim().parse::<u64>().map_err(|_| {
                TravelError::Config(format!(
                    "TRAVELBOOK_TIMEOUT must be a whole number of seconds, got \"{v}\""
                ))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(ClientOptions {
            base_url,
            proxy: self.proxy.clone(),
            timeout,
        })
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
