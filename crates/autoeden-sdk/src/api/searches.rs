use crate::client::AutoEdenClient;
use crate::error::{ApiError, Result};
use crate::request::ApiRequest;
use crate::types::{Listing, NewVehicleSearch, VehicleSearch, VehicleSearchUpdate};

/// Saved searches under `/core/vehicle-searches/`
pub struct SearchesApi<'a> {
    pub(crate) client: &'a AutoEdenClient,
}

impl SearchesApi<'_> {
    pub async fn list(&self) -> Result<Vec<VehicleSearch>> {
        let listing: Listing<VehicleSearch> = self
            .client
            .json(ApiRequest::get("/core/vehicle-searches/"))
            .await?;
        Ok(listing.into_items())
    }

    pub async fn create(&self, search: &NewVehicleSearch) -> Result<VehicleSearch> {
        if search.min_year > search.max_year {
            return Err(ApiError::validation(
                "min_year",
                "Minimum year cannot be after maximum year",
            ));
        }
        self.client.post("/core/vehicle-searches/", search).await
    }

    pub async fn update(&self, id: u64, update: &VehicleSearchUpdate) -> Result<VehicleSearch> {
        self.client
            .patch(&format!("/core/vehicle-searches/{id}/"), update)
            .await
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        self.client
            .delete(&format!("/core/vehicle-searches/{id}/"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::client::ClientBuilder;
    use crate::error::ApiError;
    use crate::types::{NewVehicleSearch, SearchStatus, VehicleSearchUpdate};
    use rust_decimal_macros::dec;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn search() -> NewVehicleSearch {
        NewVehicleSearch {
            make: "Honda".into(),
            model: "Fit".into(),
            min_year: 2012,
            max_year: 2016,
            max_price: dec!(6000),
            max_mileage: 150000,
        }
    }

    fn saved() -> serde_json::Value {
        json!({
            "id": 5, "make": "Honda", "model": "Fit", "min_year": 2012, "max_year": 2016,
            "max_price": "6000.00", "max_mileage": 150000
        })
    }

    #[tokio::test]
    async fn test_create_posts_search() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/core/vehicle-searches/"))
            .and(body_json(json!({
                "make": "Honda", "model": "Fit", "min_year": 2012, "max_year": 2016,
                "max_price": "6000", "max_mileage": 150000
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(saved()))
            .expect(1)
            .mount(&server)
            .await;

        let client = ClientBuilder::new()
            .base_url(server.uri())
            .with_tokens("a1", None)
            .build()
            .unwrap();
        let created = client.searches().create(&search()).await.unwrap();
        assert_eq!(created.id, 5);
        assert_eq!(created.status, SearchStatus::Active);
    }

    #[tokio::test]
    async fn test_inverted_year_range_is_rejected_locally() {
        let server = MockServer::start().await;
        let client = ClientBuilder::new().base_url(server.uri()).build().unwrap();

        let mut inverted = search();
        inverted.min_year = 2018;
        let err = client.searches().create(&inverted).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation { ref field, .. } if field == "min_year"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_sends_only_changed_fields() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/core/vehicle-searches/5/"))
            .and(body_json(json!({"status": "paused"})))
            .respond_with(ResponseTemplate::new(200).set_body_json({
                let mut body = saved();
                body["status"] = json!("paused");
                body
            }))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/core/vehicle-searches/5/"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = ClientBuilder::new()
            .base_url(server.uri())
            .with_tokens("a1", None)
            .build()
            .unwrap();
        let update = VehicleSearchUpdate {
            status: Some(SearchStatus::Paused),
            ..Default::default()
        };
        let paused = client.searches().update(5, &update).await.unwrap();
        assert_eq!(paused.status, SearchStatus::Paused);
        client.searches().delete(5).await.unwrap();
    }
}
