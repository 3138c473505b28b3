pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod mcp;
pub mod model;
pub mod query;
pub mod session;
pub mod shell;
pub mod table;
pub mod token;

use tracing::{info, warn};

use auth::AuthClient;
use catalog::Catalog;
use error::TravelError;
use model::TravelOption;
use query::SearchCriteria;
use token::TokenStore;

pub fn search(
    catalog: &Catalog,
    criteria: &SearchCriteria,
) -> Result<Vec<TravelOption>, TravelError> {
    criteria.validate()?;
    Ok(query::filter(catalog.options(), criteria))
}

/// Ends the signed-in session. The gateway is told on a best-effort basis;
/// the stored token is removed even when no client could be built or the
/// gateway does not answer.
pub async fn logout(
    client: Result<AuthClient, TravelError>,
    store: &TokenStore,
) -> Result<(), TravelError> {
    let token = store.load().unwrap_or_else(|e| {
        warn!(error = %e, "could not read stored token");
        None
    });
    if let Some(token) = token {
        let acknowledged = match client {
            Ok(client) => client.logout(&token).await,
            Err(e) => Err(e),
        };
        if let Err(e) = acknowledged {
            warn!(error = %e, "logout not acknowledged by gateway");
        }
    }
    store.clear()?;
    info!("logged out");
    Ok(())
}
