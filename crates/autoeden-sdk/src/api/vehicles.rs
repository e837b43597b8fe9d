use super::require;
use crate::client::AutoEdenClient;
use crate::error::{ApiError, Result};
use crate::request::{ApiRequest, FilePart, MultipartPayload};
use crate::types::{
    Listing, ListingType, MarketplaceFilters, NewVehicle, Vehicle, VehicleStatus, VehicleUpdate,
    VerificationUpdate, VinCheck,
};
use chrono::Datelike;
use rust_decimal::Decimal;
use serde_json::json;

/// VINs are always 17 characters
pub const VIN_LENGTH: usize = 17;

pub const EARLIEST_MODEL_YEAR: u32 = 1900;

/// Vehicle listings under `/core/vehicles/` and `/core/marketplace/`
pub struct VehiclesApi<'a> {
    pub(crate) client: &'a AutoEdenClient,
}

impl VehiclesApi<'_> {
    pub async fn list(&self) -> Result<Vec<Vehicle>> {
        self.listing(ApiRequest::get("/core/vehicles/")).await
    }

    pub async fn marketplace(&self, filters: &MarketplaceFilters) -> Result<Vec<Vehicle>> {
        self.listing(ApiRequest::get("/core/marketplace/").query(filters)?)
            .await
    }

    /// Vehicles owned by the logged-in user
    pub async fn mine(&self) -> Result<Vec<Vehicle>> {
        self.listing(ApiRequest::get("/core/vehicles/my_vehicles/"))
            .await
    }

    /// Submissions awaiting admin review
    pub async fn pending_review(&self) -> Result<Vec<Vehicle>> {
        self.listing(ApiRequest::get("/core/vehicles/pending_review/"))
            .await
    }

    pub async fn instant_sales(&self) -> Result<Vec<Vehicle>> {
        self.listing(ApiRequest::get("/core/vehicles/instant-sales/"))
            .await
    }

    pub async fn get(&self, id: u64) -> Result<Vehicle> {
        self.client.get(&format!("/core/vehicles/{id}/")).await
    }

    /// Whether a VIN is already registered
    pub async fn vin_exists(&self, vin: &str) -> Result<bool> {
        check_vin(vin)?;
        let check: VinCheck = self
            .client
            .get(&format!("/core/vehicles/check-vin/{}/", vin.trim()))
            .await?;
        Ok(check.exists)
    }

    /// Submit a vehicle with its images as multipart form data
    pub async fn create(&self, vehicle: &NewVehicle) -> Result<Vehicle> {
        validate_new_vehicle(vehicle)?;
        let request = ApiRequest::post("/core/vehicles/").multipart(new_vehicle_form(vehicle));
        self.client.json(request).await
    }

    pub async fn update(&self, id: u64, update: &VehicleUpdate) -> Result<Vehicle> {
        self.client.patch(&format!("/core/vehicles/{id}/"), update).await
    }

    /// Admin verification decision
    pub async fn verify(&self, id: u64, decision: &VerificationUpdate) -> Result<Vehicle> {
        check_decision(decision)?;
        self.client
            .patch(&format!("/core/vehicles/{id}/verify/"), decision)
            .await
    }

    pub async fn review(&self, id: u64, decision: &VerificationUpdate) -> Result<Vehicle> {
        check_decision(decision)?;
        self.client
            .patch(&format!("/core/vehicles/{id}/review/"), decision)
            .await
    }

    pub async fn toggle_visibility(&self, id: u64) -> Result<Vehicle> {
        self.client
            .patch(&format!("/core/vehicles/{id}/toggle_visibility/"), &json!({}))
            .await
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        self.client.delete(&format!("/core/vehicles/{id}/")).await
    }

    async fn listing(&self, request: ApiRequest) -> Result<Vec<Vehicle>> {
        let listing: Listing<Vehicle> = self.client.json(request).await?;
        Ok(listing.into_items())
    }
}

fn check_vin(vin: &str) -> Result<()> {
    let vin = vin.trim();
    if vin.len() != VIN_LENGTH || !vin.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ApiError::validation(
            "vin",
            format!("VIN must be {VIN_LENGTH} letters or digits"),
        ));
    }
    Ok(())
}

fn check_positive(field: &str, amount: Option<Decimal>, message: &str) -> Result<()> {
    match amount {
        Some(value) if value > Decimal::ZERO => Ok(()),
        _ => Err(ApiError::validation(field, message)),
    }
}

fn check_decision(decision: &VerificationUpdate) -> Result<()> {
    let has_reason = decision
        .rejection_reason
        .as_deref()
        .is_some_and(|r| !r.trim().is_empty());
    if decision.status == VehicleStatus::Rejected && !has_reason {
        return Err(ApiError::validation(
            "rejection_reason",
            "Rejection reason is required when rejecting a vehicle",
        ));
    }
    if decision.status == VehicleStatus::Unknown {
        return Err(ApiError::validation("status", "Unknown verification status"));
    }
    Ok(())
}

pub(crate) fn validate_new_vehicle(vehicle: &NewVehicle) -> Result<()> {
    require("make", &vehicle.make, "Make is required")?;
    require("model", &vehicle.model, "Model is required")?;

    let latest = chrono::Utc::now().year() as u32 + 1;
    if !(EARLIEST_MODEL_YEAR..=latest).contains(&vehicle.year) {
        return Err(ApiError::validation(
            "year",
            format!("Year must be between {EARLIEST_MODEL_YEAR} and {latest}"),
        ));
    }
    check_vin(&vehicle.vin)?;

    match vehicle.listing_type {
        ListingType::Marketplace => check_positive(
            "price",
            vehicle.price,
            "Price is required for marketplace listings",
        )?,
        ListingType::InstantSale => check_positive(
            "proposed_price",
            vehicle.proposed_price,
            "Price is required for instant sale",
        )?,
    }

    if vehicle.images.is_empty() {
        return Err(ApiError::validation("image_files", "At least one image is required"));
    }
    Ok(())
}

fn new_vehicle_form(vehicle: &NewVehicle) -> MultipartPayload {
    let mut form = MultipartPayload::new()
        .text("make", vehicle.make.trim())
        .text("model", vehicle.model.trim())
        .text("year", vehicle.year)
        .text("mileage", vehicle.mileage)
        .text("vin", vehicle.vin.trim().to_uppercase())
        .text("listing_type", vehicle.listing_type.as_str());

    if let Some(price) = vehicle.price {
        form = form.text("price", price);
    }
    if let Some(proposed) = vehicle.proposed_price {
        form = form.text("proposed_price", proposed);
    }
    if let Some(fuel) = &vehicle.fuel_type {
        form = form.text("fuel_type", fuel);
    }

    vehicle.images.iter().fold(form, |form, image| {
        form.file(FilePart {
            field: "image_files".to_string(),
            filename: image.filename.clone(),
            content_type: image.content_type.clone(),
            bytes: bytes::Bytes::from(image.bytes.clone()),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageUpload;
    use rust_decimal_macros::dec;

    fn submission() -> NewVehicle {
        NewVehicle {
            make: "Toyota".into(),
            model: "Hilux".into(),
            year: 2018,
            vin: "JTFST22P800012345".into(),
            mileage: 84000,
            listing_type: ListingType::Marketplace,
            price: Some(dec!(28500)),
            proposed_price: None,
            fuel_type: Some("diesel".into()),
            images: vec![ImageUpload {
                filename: "front.jpg".into(),
                content_type: "image/jpeg".into(),
                bytes: vec![0xff, 0xd8],
            }],
        }
    }

    fn field_of(err: ApiError) -> String {
        match err {
            ApiError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_submission_passes() {
        assert!(validate_new_vehicle(&submission()).is_ok());
    }

    #[test]
    fn test_marketplace_requires_price() {
        let mut vehicle = submission();
        vehicle.price = None;
        assert_eq!(field_of(validate_new_vehicle(&vehicle).unwrap_err()), "price");
    }

    #[test]
    fn test_instant_sale_requires_proposed_price() {
        let mut vehicle = submission();
        vehicle.listing_type = ListingType::InstantSale;
        assert_eq!(
            field_of(validate_new_vehicle(&vehicle).unwrap_err()),
            "proposed_price"
        );
        vehicle.proposed_price = Some(dec!(15000));
        assert!(validate_new_vehicle(&vehicle).is_ok());
    }

    #[test]
    fn test_vin_and_images_checked() {
        let mut vehicle = submission();
        vehicle.vin = "SHORT".into();
        assert_eq!(field_of(validate_new_vehicle(&vehicle).unwrap_err()), "vin");

        let mut vehicle = submission();
        vehicle.images.clear();
        assert_eq!(
            field_of(validate_new_vehicle(&vehicle).unwrap_err()),
            "image_files"
        );
    }

    #[test]
    fn test_rejection_needs_reason() {
        let decision = VerificationUpdate {
            status: VehicleStatus::Rejected,
            rejection_reason: Some(" ".into()),
        };
        assert_eq!(field_of(check_decision(&decision).unwrap_err()), "rejection_reason");

        let approve = VerificationUpdate {
            status: VehicleStatus::PhysicallyVerified,
            rejection_reason: None,
        };
        assert!(check_decision(&approve).is_ok());
    }

    #[test]
    fn test_form_uses_image_files_field() {
        let form = new_vehicle_form(&submission());
        assert_eq!(form.files.len(), 1);
        assert_eq!(form.files[0].field, "image_files");
        assert!(form
            .fields
            .contains(&("listing_type".to_string(), "marketplace".to_string())));
        assert!(form.fields.contains(&("price".to_string(), "28500".to_string())));
        assert!(!form.fields.iter().any(|(name, _)| name == "proposed_price"));
    }

    #[tokio::test]
    async fn test_vin_exists_checks_trimmed_vin() {
        use crate::client::ClientBuilder;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/core/vehicles/check-vin/JTFST22P800012345/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"exists": true})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = ClientBuilder::new()
            .base_url(server.uri())
            .with_tokens("a1", None)
            .build()
            .unwrap();
        assert!(client.vehicles().vin_exists(" JTFST22P800012345 ").await.unwrap());
        assert_eq!(
            field_of(client.vehicles().vin_exists("JTF-ST22").await.unwrap_err()),
            "vin"
        );
    }
}
