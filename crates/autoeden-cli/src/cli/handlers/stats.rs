//! Marketplace statistics

use crate::error::Result;
use crate::output::{render, table_output};
use autoeden_sdk::Store;

pub async fn handle_stats(store: &Store, json: bool) -> Result<()> {
    let stats = store.fetch_marketplace_stats().await?;
    render(json, &stats, table_output::display_stats)
}
