use super::require;
use crate::client::AutoEdenClient;
use crate::error::Result;
use crate::types::{AiStatus, ChatReply, ChatRequest, VehicleAnalysis};
use serde_json::json;

/// AI assistant under `/core/ai/`
///
/// The server answers 503 when the assistant is switched off.
pub struct AiApi<'a> {
    pub(crate) client: &'a AutoEdenClient,
}

impl AiApi<'_> {
    pub async fn chat(&self, message: &str, context: Option<serde_json::Value>) -> Result<ChatReply> {
        require("message", message, "Message is required")?;
        let request = ChatRequest {
            message: message.trim().to_string(),
            context,
        };
        self.client.post("/core/ai/chat/", &request).await
    }

    pub async fn status(&self) -> Result<AiStatus> {
        self.client.get("/core/ai/status/").await
    }

    pub async fn ask_about_vehicle(&self, vehicle_id: u64, question: &str) -> Result<ChatReply> {
        require("question", question, "Question is required")?;
        self.client
            .post(
                &format!("/core/ai/vehicles/{vehicle_id}/ask/"),
                &json!({ "question": question.trim() }),
            )
            .await
    }

    pub async fn analyze_vehicle(&self, vehicle_id: u64) -> Result<VehicleAnalysis> {
        self.client
            .get(&format!("/core/ai/vehicles/{vehicle_id}/analyze/"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::client::ClientBuilder;
    use crate::error::ApiError;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_ask_about_vehicle_trims_question() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/core/ai/vehicles/8/ask/"))
            .and(body_json(json!({"question": "Is the timing chain original?"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "The seller lists it as replaced in 2021."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ClientBuilder::new()
            .base_url(server.uri())
            .with_tokens("a1", None)
            .build()
            .unwrap();
        let reply = client
            .ai()
            .ask_about_vehicle(8, "  Is the timing chain original?  ")
            .await
            .unwrap();
        assert_eq!(reply.text(), "The seller lists it as replaced in 2021.");
    }

    #[tokio::test]
    async fn test_blank_question_is_rejected_locally() {
        let server = MockServer::start().await;
        let client = ClientBuilder::new().base_url(server.uri()).build().unwrap();

        let err = client.ai().ask_about_vehicle(8, "   ").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_vehicle() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/core/ai/vehicles/8/analyze/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "analysis": "Priced 6% under comparable listings."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ClientBuilder::new()
            .base_url(server.uri())
            .with_tokens("a1", None)
            .build()
            .unwrap();
        let analysis = client.ai().analyze_vehicle(8).await.unwrap();
        assert_eq!(analysis.analysis, "Priced 6% under comparable listings.");
    }

    #[tokio::test]
    async fn test_status_treats_missing_flag_as_enabled() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/core/ai/status/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = ClientBuilder::new().base_url(server.uri()).build().unwrap();
        assert!(client.ai().status().await.unwrap().is_enabled());
    }
}
