//! Saved search handlers

use crate::cli::commands::SearchAction;
use crate::error::Result;
use crate::output::{print_info, print_success, render, table_output};
use autoeden_sdk::Store;

pub async fn handle_searches(store: &Store, action: SearchAction, json: bool) -> Result<()> {
    match action {
        SearchAction::List => {
            let searches = store.fetch_searches().await?;
            render(json, &searches, |searches| {
                if searches.is_empty() {
                    print_info("No saved searches");
                    Ok(())
                } else {
                    table_output::display_searches(searches)
                }
            })
        }
        SearchAction::Delete { id } => {
            store.delete_search(id).await?;
            print_success(&format!("Search {id} deleted"));
            Ok(())
        }
    }
}
