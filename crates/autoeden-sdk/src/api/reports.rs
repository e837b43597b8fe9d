use super::require;
use crate::client::AutoEdenClient;
use crate::error::{ApiError, Result};
use crate::request::ApiRequest;
use crate::types::Report;

/// Abuse and fraud reports
pub struct ReportsApi<'a> {
    pub(crate) client: &'a AutoEdenClient,
}

impl ReportsApi<'_> {
    pub async fn submit(&self, report: &Report) -> Result<()> {
        require("reason", &report.reason, "Please select a reason for reporting")?;
        if report.reported_vehicle.is_none() && report.reported_user.is_none() {
            return Err(ApiError::validation(
                "reported_vehicle",
                "A report must name a vehicle or a user",
            ));
        }
        self.client
            .empty(ApiRequest::post("/core/reports/").json(report)?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::client::ClientBuilder;
    use crate::error::ApiError;
    use crate::types::Report;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_submit_folds_details_into_reason() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/core/reports/"))
            .and(body_json(json!({
                "reason": "Suspected fraud\n\nAdditional details: VIN plate looks tampered",
                "reporter_email": "tendai@example.com",
                "reported_vehicle": 31
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = ClientBuilder::new()
            .base_url(server.uri())
            .with_tokens("a1", None)
            .build()
            .unwrap();
        let report = Report::new("Suspected fraud")
            .with_details("VIN plate looks tampered")
            .vehicle(31)
            .reporter("tendai@example.com");
        client.reports().submit(&report).await.unwrap();
    }

    #[tokio::test]
    async fn test_report_without_target_is_rejected_locally() {
        let server = MockServer::start().await;
        let client = ClientBuilder::new().base_url(server.uri()).build().unwrap();

        let err = client
            .reports()
            .submit(&Report::new("Spam"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation { ref field, .. } if field == "reported_vehicle"));

        let err = client
            .reports()
            .submit(&Report::new(" ").user(4))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation { ref field, .. } if field == "reason"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
