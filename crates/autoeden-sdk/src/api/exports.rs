use super::require;
use crate::client::AutoEdenClient;
use crate::error::{ApiError, Result, ResultExt};
use crate::request::ApiRequest;
use crate::types::{ExportConfiguration, Listing};

/// Saved export column sets under `/core/export-configurations/`
pub struct ExportsApi<'a> {
    pub(crate) client: &'a AutoEdenClient,
}

impl ExportsApi<'_> {
    /// Configurations for one export type; empty when the server has none
    pub async fn list(&self, export_type: &str) -> Result<Vec<ExportConfiguration>> {
        let listing: Option<Listing<ExportConfiguration>> = self
            .client
            .json(ApiRequest::get("/core/export-configurations/"))
            .await
            .optional()?;

        Ok(listing
            .map(Listing::into_items)
            .unwrap_or_default()
            .into_iter()
            .filter(|config| config.export_type == export_type)
            .collect())
    }

    pub async fn create(&self, config: &ExportConfiguration) -> Result<ExportConfiguration> {
        require("name", &config.name, "Please enter a configuration name")?;
        if config.columns.is_empty() {
            return Err(ApiError::validation("columns", "Select at least one column"));
        }
        self.client.post("/core/export-configurations/", config).await
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        self.client
            .delete(&format!("/core/export-configurations/{id}/"))
            .await
    }
}
