//! Type definitions for the Auto Eden SDK
//!
//! Resource shapes returned by the `/core/...` API. Lifecycle and invariants
//! are owned by the server; these structs are lenient about missing fields.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ===== Users =====

/// Account as returned by the login endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

/// A user reference that the API renders either as an id or as a nested object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Id(u64),
    Full(User),
}

impl UserRef {
    pub fn id(&self) -> u64 {
        match self {
            UserRef::Id(id) => *id,
            UserRef::Full(user) => user.id,
        }
    }
}

/// User profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: u64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial profile update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Per-channel notification switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    pub email_vehicle_approved: bool,
    pub email_new_bid: bool,
    pub email_quote_ready: bool,
    pub push_enabled: bool,
    pub whatsapp_enabled: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email_vehicle_approved: true,
            email_new_bid: true,
            email_quote_ready: true,
            push_enabled: false,
            whatsapp_enabled: false,
        }
    }
}

// ===== Auth payloads =====

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Token pair plus account, returned by login and Google login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    #[serde(default)]
    pub user: Option<User>,
}

/// Free-form acknowledgement (`{"detail": "..."}`) used by several auth endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

// ===== Vehicles =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    #[default]
    Pending,
    DigitallyVerified,
    PhysicallyVerified,
    Rejected,
    #[serde(other)]
    Unknown,
}

impl VehicleStatus {
    /// Digitally or physically verified
    pub fn is_verified(self) -> bool {
        matches!(
            self,
            VehicleStatus::DigitallyVerified | VehicleStatus::PhysicallyVerified
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VehicleStatus::Pending => "pending",
            VehicleStatus::DigitallyVerified => "digitally_verified",
            VehicleStatus::PhysicallyVerified => "physically_verified",
            VehicleStatus::Rejected => "rejected",
            VehicleStatus::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for VehicleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(VehicleStatus::Pending),
            "digitally_verified" => Ok(VehicleStatus::DigitallyVerified),
            "physically_verified" => Ok(VehicleStatus::PhysicallyVerified),
            "rejected" => Ok(VehicleStatus::Rejected),
            other => Err(format!("unknown vehicle status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingType {
    Marketplace,
    InstantSale,
}

impl ListingType {
    pub fn as_str(self) -> &'static str {
        match self {
            ListingType::Marketplace => "marketplace",
            ListingType::InstantSale => "instant_sale",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleImage {
    #[serde(default)]
    pub image: Option<String>,
}

/// Vehicle listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: u64,
    #[serde(default)]
    pub owner: Option<UserRef>,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub year: u32,
    #[serde(default)]
    pub vin: Option<String>,
    #[serde(default)]
    pub mileage: Option<u32>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub proposed_price: Option<Decimal>,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    #[serde(default)]
    pub status: VehicleStatus,
    #[serde(default)]
    pub listing_type: Option<ListingType>,
    #[serde(default)]
    pub fuel_type: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub images: Vec<VehicleImage>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub digital_verification_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub physical_verification_date: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl Vehicle {
    /// Price shown to buyers: the listing price, else the seller's proposal
    pub fn display_price(&self) -> Option<Decimal> {
        self.price.or(self.proposed_price)
    }
}

/// An image attached to a new vehicle
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// New vehicle submission (sent as multipart form data)
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub make: String,
    pub model: String,
    pub year: u32,
    pub vin: String,
    pub mileage: u32,
    pub listing_type: ListingType,
    pub price: Option<Decimal>,
    pub proposed_price: Option<Decimal>,
    pub fuel_type: Option<String>,
    pub images: Vec<ImageUpload>,
}

/// Partial vehicle update
#[derive(Debug, Clone, Default, Serialize)]
pub struct VehicleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mileage: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposed_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,
}

/// Admin verification decision
#[derive(Debug, Clone, Serialize)]
pub struct VerificationUpdate {
    pub status: VehicleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

/// Marketplace query filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketplaceFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_year: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_year: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

// ===== Bids =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub id: u64,
    pub vehicle: u64,
    #[serde(default)]
    pub bidder: Option<UserRef>,
    pub amount: Decimal,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: BidStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Bid submission
#[derive(Debug, Clone, Serialize)]
pub struct PlaceBid {
    pub vehicle_id: u64,
    pub amount: Decimal,
    pub message: String,
}

impl PlaceBid {
    pub const DEFAULT_MESSAGE: &'static str = "No message provided";

    pub fn new(vehicle_id: u64, amount: Decimal, message: Option<String>) -> Self {
        Self {
            vehicle_id,
            amount,
            message: message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| Self::DEFAULT_MESSAGE.to_string()),
        }
    }
}

// ===== Notifications =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Approval,
    Rejection,
    Registration,
    InstantSale,
    Bid,
    AdminAlert,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub notification_type: NotificationType,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub related_object_id: Option<u64>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UnreadCount {
    pub unread_count: u64,
}

// ===== Quotes =====

/// Contact details for a quote request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteForm {
    pub full_name: String,
    pub email: String,
    pub country: String,
    pub city: String,
    pub address: String,
    pub telephone: String,
    #[serde(default)]
    pub note: String,
}

/// Stored quote request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub quote_id: Option<u64>,
    #[serde(default)]
    pub vehicle: Option<u64>,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub telephone: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub is_processed: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl QuoteRequest {
    /// Identifier the API uses to refer back to this quote
    pub fn reference(&self) -> Option<u64> {
        self.quote_id.or(self.id)
    }
}

// ===== Saved searches =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    #[default]
    Active,
    Paused,
    Matched,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSearch {
    pub id: u64,
    pub make: String,
    pub model: String,
    pub min_year: u32,
    pub max_year: u32,
    pub max_price: Decimal,
    pub max_mileage: u32,
    #[serde(default)]
    pub status: SearchStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_matched: Option<DateTime<Utc>>,
    #[serde(default)]
    pub match_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewVehicleSearch {
    pub make: String,
    pub model: String,
    pub min_year: u32,
    pub max_year: u32,
    pub max_price: Decimal,
    pub max_mileage: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VehicleSearchUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SearchStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_mileage: Option<u32>,
}

// ===== AI assistant =====

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub context: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatReply {
    pub fn text(&self) -> &str {
        self.response
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiStatus {
    #[serde(default)]
    pub ai_enabled: Option<bool>,
}

impl AiStatus {
    /// Only an explicit `false` disables the assistant
    pub fn is_enabled(&self) -> bool {
        self.ai_enabled != Some(false)
    }
}

/// Answer from `GET /core/ai/vehicles/{id}/analyze/`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleAnalysis {
    #[serde(default)]
    pub analysis: String,
}

// ===== Analytics =====

/// Marketplace-wide counters; the set of metrics is decided by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceStats {
    #[serde(flatten)]
    pub metrics: BTreeMap<String, serde_json::Value>,
}

impl MarketplaceStats {
    pub fn count(&self, metric: &str) -> Option<u64> {
        self.metrics.get(metric).and_then(|v| v.as_u64())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleViews {
    #[serde(default)]
    pub views: u64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Answer from the VIN uniqueness check
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct VinCheck {
    #[serde(default)]
    pub exists: bool,
}

// ===== Reports and exports =====

/// Abuse/fraud report about a listing or a user
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub reason: String,
    pub reporter_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_vehicle: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_user: Option<u64>,
}

impl Report {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            reporter_email: None,
            reported_vehicle: None,
            reported_user: None,
        }
    }

    pub fn with_details(mut self, details: &str) -> Self {
        if !details.trim().is_empty() {
            self.reason = format!("{}\n\nAdditional details: {}", self.reason, details);
        }
        self
    }

    pub fn vehicle(mut self, vehicle_id: u64) -> Self {
        self.reported_vehicle = Some(vehicle_id);
        self
    }

    pub fn user(mut self, user_id: u64) -> Self {
        self.reported_user = Some(user_id);
        self
    }

    pub fn reporter(mut self, email: impl Into<String>) -> Self {
        self.reporter_email = Some(email.into());
        self
    }
}

/// Saved column selection for dashboard exports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    pub columns: Vec<String>,
    pub export_type: String,
    #[serde(default)]
    pub is_default: bool,
}

// ===== Pagination =====

/// DRF page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// List endpoints answer with either a bare array or a page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Page(Page<T>),
    Items(Vec<T>),
}

impl<T> Listing<T> {
    pub fn has_more(&self) -> bool {
        match self {
            Listing::Page(page) => page.next.is_some(),
            Listing::Items(_) => false,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Page(page) => page.results,
            Listing::Items(items) => items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_vehicle_accepts_string_decimals_and_nested_owner() {
        let vehicle: Vehicle = serde_json::from_value(json!({
            "id": 7,
            "owner": {"id": 3, "username": "tendai", "email": "t@example.com"},
            "make": "Toyota",
            "model": "Aqua",
            "year": 2015,
            "price": "12500.00",
            "status": "digitally_verified",
            "listing_type": "marketplace",
            "images": [{"image": "https://cdn/1.jpg"}]
        }))
        .unwrap();

        assert_eq!(vehicle.price, Some(dec!(12500.00)));
        assert_eq!(vehicle.owner.as_ref().map(UserRef::id), Some(3));
        assert!(vehicle.status.is_verified());
        assert!(vehicle.is_visible);
        assert_eq!(vehicle.images.len(), 1);
    }

    #[test]
    fn test_unknown_status_does_not_fail() {
        let vehicle: Vehicle =
            serde_json::from_value(json!({"id": 1, "status": "archived"})).unwrap();
        assert_eq!(vehicle.status, VehicleStatus::Unknown);
    }

    #[test]
    fn test_listing_accepts_both_shapes() {
        let page: Listing<u32> =
            serde_json::from_value(json!({"count": 2, "next": "p2", "results": [1, 2]})).unwrap();
        assert!(page.has_more());
        assert_eq!(page.into_items(), vec![1, 2]);

        let bare: Listing<u32> = serde_json::from_value(json!([3])).unwrap();
        assert!(!bare.has_more());
        assert_eq!(bare.into_items(), vec![3]);
    }

    #[test]
    fn test_place_bid_default_message() {
        assert_eq!(
            PlaceBid::new(1, dec!(100), None).message,
            PlaceBid::DEFAULT_MESSAGE
        );
        assert_eq!(
            PlaceBid::new(1, dec!(100), Some("  ".into())).message,
            PlaceBid::DEFAULT_MESSAGE
        );
        assert_eq!(PlaceBid::new(1, dec!(100), Some("hi".into())).message, "hi");
    }

    #[test]
    fn test_ai_status_only_explicit_false_disables() {
        assert!(AiStatus::default().is_enabled());
        assert!(AiStatus { ai_enabled: Some(true) }.is_enabled());
        assert!(!AiStatus { ai_enabled: Some(false) }.is_enabled());
    }

    #[test]
    fn test_report_details_are_appended() {
        let report = Report::new("Scam").with_details("asked for deposit").vehicle(4);
        assert_eq!(report.reason, "Scam\n\nAdditional details: asked for deposit");
        assert_eq!(report.reported_vehicle, Some(4));

        let body = serde_json::to_value(Report::new("Spam")).unwrap();
        assert_eq!(body, json!({"reason": "Spam", "reporter_email": null}));
    }

    #[test]
    fn test_marketplace_stats_keeps_unknown_metrics() {
        let stats: MarketplaceStats =
            serde_json::from_value(json!({"total_vehicles": 42, "top_make": "Toyota"})).unwrap();
        assert_eq!(stats.count("total_vehicles"), Some(42));
        assert_eq!(stats.count("top_make"), None);
        assert_eq!(stats.metrics.len(), 2);
    }

    #[test]
    fn test_chat_reply_prefers_response() {
        let reply = ChatReply {
            response: Some("a".into()),
            message: Some("b".into()),
        };
        assert_eq!(reply.text(), "a");
        assert_eq!(ChatReply::default().text(), "");
    }
}
