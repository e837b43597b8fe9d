//! Import quote handlers

use crate::cli::commands::QuoteAction;
use crate::error::{CliError, Result};
use crate::output::{compress_path, json_output, print_success};
use autoeden_sdk::api::QuotesApi;
use autoeden_sdk::types::QuoteForm;
use autoeden_sdk::{ApiError, Store};
use console::style;

pub async fn handle_quote(store: &Store, action: QuoteAction, json: bool) -> Result<()> {
    match action {
        QuoteAction::Request {
            vehicle_id,
            name,
            email,
            country,
            city,
            address,
            phone,
            note,
        } => {
            let form = QuoteForm {
                full_name: name,
                email,
                country,
                city,
                address,
                telephone: phone,
                note: note.unwrap_or_default(),
            };

            let quote = match store.request_quote(vehicle_id, &form).await {
                Ok(quote) => quote,
                Err(err) => return Err(rejection(store, err, |s| s.quotes.tracker.error_message())),
            };

            if json {
                return json_output(&quote);
            }
            print_success(&format!(
                "Quote requested. We will email {} shortly.",
                style(&quote.email).bold()
            ));
            if let Some(reference) = quote.reference() {
                println!("  {}: {}", style("Reference").bold(), reference);
            }
            Ok(())
        }
        QuoteAction::Download { quote_id, output } => {
            let pdf = match store.download_quote_pdf(quote_id).await {
                Ok(pdf) => pdf,
                Err(err) => return Err(rejection(store, err, |s| s.quotes.download.error_message())),
            };

            let path = output.unwrap_or_else(|| QuotesApi::pdf_file_name(quote_id).into());
            tokio::fs::write(&path, &pdf).await?;
            print_success(&format!("Saved {}", compress_path(&path)));
            Ok(())
        }
    }
}

/// Prefer the message the store recorded for the failed request
fn rejection(
    store: &Store,
    err: ApiError,
    message: impl FnOnce(&autoeden_sdk::AppState) -> Option<String>,
) -> CliError {
    if matches!(err, ApiError::SessionExpired(_)) {
        return err.into();
    }
    match store.read(message) {
        Some(message) => CliError::Rejected(message),
        None => err.into(),
    }
}
