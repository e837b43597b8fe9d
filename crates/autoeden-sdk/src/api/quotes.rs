use super::{require, require_email};
use crate::client::AutoEdenClient;
use crate::error::Result;
use crate::request::ApiRequest;
use crate::types::{QuoteForm, QuoteRequest};
use bytes::Bytes;
use serde::Serialize;

/// Body of a quote request; new requests always start pending at medium priority
#[derive(Serialize)]
struct QuoteSubmission<'a> {
    #[serde(flatten)]
    form: &'a QuoteForm,
    status: &'static str,
    priority: &'static str,
}

/// Quote requests
pub struct QuotesApi<'a> {
    pub(crate) client: &'a AutoEdenClient,
}

impl QuotesApi<'_> {
    pub async fn request(&self, vehicle_id: u64, form: &QuoteForm) -> Result<QuoteRequest> {
        require("full_name", &form.full_name, "Full name is required")?;
        require_email("email", &form.email)?;
        require("telephone", &form.telephone, "Telephone is required")?;

        let body = QuoteSubmission {
            form,
            status: "pending",
            priority: "medium",
        };
        self.client
            .post(&format!("/core/vehicles/{vehicle_id}/request-quote/"), &body)
            .await
    }

    /// Quote PDF bytes
    pub async fn download_pdf(&self, quote_id: u64) -> Result<Bytes> {
        self.client
            .bytes(ApiRequest::get(format!("/core/quotes/{quote_id}/download/")))
            .await
    }

    /// File name the PDF is saved under
    pub fn pdf_file_name(quote_id: u64) -> String {
        format!("AutoEden_Quote_{quote_id}.pdf")
    }
}
