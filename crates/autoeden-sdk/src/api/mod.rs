//! Typed endpoint groups
//!
//! Each group borrows the client and maps one method to one REST call:
//! `client.vehicles().mine()`, `client.bids().place(..)`, and so on.

mod ai;
mod analytics;
mod auth;
mod bids;
mod exports;
mod notifications;
mod profile;
mod quotes;
mod reports;
mod searches;
mod vehicles;

pub use ai::AiApi;
pub use analytics::AnalyticsApi;
pub use auth::AuthApi;
pub use bids::BidsApi;
pub use exports::ExportsApi;
pub use notifications::NotificationsApi;
pub use profile::ProfileApi;
pub use quotes::QuotesApi;
pub use reports::ReportsApi;
pub use searches::SearchesApi;
pub use vehicles::VehiclesApi;

use crate::client::AutoEdenClient;
use crate::error::{ApiError, Result};

impl AutoEdenClient {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { client: self }
    }

    pub fn vehicles(&self) -> VehiclesApi<'_> {
        VehiclesApi { client: self }
    }

    pub fn bids(&self) -> BidsApi<'_> {
        BidsApi { client: self }
    }

    pub fn notifications(&self) -> NotificationsApi<'_> {
        NotificationsApi { client: self }
    }

    pub fn ai(&self) -> AiApi<'_> {
        AiApi { client: self }
    }

    pub fn quotes(&self) -> QuotesApi<'_> {
        QuotesApi { client: self }
    }

    pub fn searches(&self) -> SearchesApi<'_> {
        SearchesApi { client: self }
    }

    pub fn profile(&self) -> ProfileApi<'_> {
        ProfileApi { client: self }
    }

    pub fn analytics(&self) -> AnalyticsApi<'_> {
        AnalyticsApi { client: self }
    }

    pub fn reports(&self) -> ReportsApi<'_> {
        ReportsApi { client: self }
    }

    pub fn exports(&self) -> ExportsApi<'_> {
        ExportsApi { client: self }
    }
}

fn require(field: &str, value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(field, message));
    }
    Ok(())
}

fn require_email(field: &str, value: &str) -> Result<()> {
    require(field, value, "Email is required")?;
    let valid = value
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.ends_with('.'))
        .unwrap_or(false);
    if !valid {
        return Err(ApiError::validation(field, "Enter a valid email address"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_email() {
        assert!(require_email("email", "buyer@autoeden.co.zw").is_ok());
        assert!(matches!(
            require_email("email", "  "),
            Err(ApiError::Validation { .. })
        ));
        assert!(require_email("email", "buyer@localhost").is_err());
        assert!(require_email("email", "@example.com").is_err());
    }
}
