//! Per-resource slices and their reducers
//!
//! Reducers are plain synchronous methods so the store can apply them while
//! holding its lock, and tests can drive them without a server.

use super::Tracker;
use crate::error::{ApiError, ErrorBody};
use crate::types::{
    Acknowledgement, Bid, Listing, LoginResponse, MarketplaceStats, Notification,
    NotificationPreferences, Profile, QuoteRequest, User, Vehicle, VehicleSearch, VehicleViews,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of quotes kept in the local history
pub const QUOTE_HISTORY_LIMIT: usize = 10;

pub const CHAT_ERROR_MESSAGE: &str = "I'm sorry, I couldn't process your request. Please try again.";

fn replace_by_id<T>(items: &mut [T], updated: &T, id: impl Fn(&T) -> u64)
where
    T: Clone,
{
    let target = id(updated);
    if let Some(slot) = items.iter_mut().find(|item| id(item) == target) {
        *slot = updated.clone();
    }
}

// ===== Auth =====

#[derive(Debug, Clone, Default)]
pub struct AuthSlice {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub tracker: Tracker,
    pub registration: Option<Acknowledgement>,
    pub password_reset: Tracker,
    pub password_change: Tracker,
    pub email_change: Tracker,
    /// Set when the session expired and the state was reset
    pub session_notice: Option<String>,
}

impl AuthSlice {
    pub fn logged_in(&mut self, response: &LoginResponse) {
        self.user = response.user.clone();
        self.is_authenticated = true;
        self.session_notice = None;
    }

    pub fn logged_out(&mut self) {
        self.user = None;
        self.is_authenticated = false;
    }
}

// ===== Vehicles =====

#[derive(Debug, Clone, Default)]
pub struct VehiclesSlice {
    pub items: Vec<Vehicle>,
    pub user_vehicles: Vec<Vehicle>,
    pub pending_vehicles: Vec<Vehicle>,
    pub instant_sale_vehicles: Vec<Vehicle>,
    pub tracker: Tracker,
}

impl VehiclesSlice {
    pub fn added(&mut self, vehicle: &Vehicle) {
        self.items.push(vehicle.clone());
    }

    /// Admin decision came back; refresh the listing entry
    pub fn verified(&mut self, vehicle: &Vehicle) {
        replace_by_id(&mut self.items, vehicle, |v| v.id);
    }

    /// Owner edit or visibility toggle came back
    pub fn owner_updated(&mut self, vehicle: &Vehicle) {
        replace_by_id(&mut self.user_vehicles, vehicle, |v| v.id);
    }

    pub fn removed(&mut self, id: u64) {
        self.items.retain(|v| v.id != id);
        self.user_vehicles.retain(|v| v.id != id);
    }
}

// ===== Bids =====

#[derive(Debug, Clone, Default)]
pub struct BidsSlice {
    /// Bids of the logged-in user, plus any placed this session
    pub items: Vec<Bid>,
    pub all_bids: Vec<Bid>,
    pub bidders: HashMap<u64, User>,
    pub tracker: Tracker,
    pub placing: Tracker,
}

impl BidsSlice {
    pub fn is_placing(&self) -> bool {
        self.placing.is_loading()
    }

    pub fn placed(&mut self, bid: &Bid) {
        self.items.push(bid.clone());
    }

    pub fn removed(&mut self, id: u64) {
        self.all_bids.retain(|bid| bid.id != id);
    }
}

// ===== Notifications =====

#[derive(Debug, Clone)]
pub struct NotificationsSlice {
    pub items: Vec<Notification>,
    pub unread_count: u64,
    pub has_more: bool,
    pub tracker: Tracker,
}

impl Default for NotificationsSlice {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            unread_count: 0,
            has_more: true,
            tracker: Tracker::default(),
        }
    }
}

impl NotificationsSlice {
    pub fn loaded(&mut self, listing: &Listing<Notification>) {
        self.has_more = listing.has_more();
        self.items = listing.clone().into_items();
    }

    pub fn mark_read(&mut self, id: u64) {
        if let Some(notification) = self.items.iter_mut().find(|n| n.id == id && !n.is_read) {
            notification.is_read = true;
            self.unread_count = self.unread_count.saturating_sub(1);
        }
    }

    pub fn mark_all_read(&mut self) {
        for notification in &mut self.items {
            notification.is_read = true;
        }
        self.unread_count = 0;
    }

    pub fn removed(&mut self, id: u64) {
        if let Some(index) = self.items.iter().position(|n| n.id == id) {
            let was_unread = !self.items.remove(index).is_read;
            if was_unread {
                self.unread_count = self.unread_count.saturating_sub(1);
            }
        }
    }

    /// Server removed every read notification
    pub fn cleared_read(&mut self) {
        self.items.retain(|n| !n.is_read);
    }

    /// Pushed from a live feed
    pub fn add_notification(&mut self, notification: Notification) {
        self.items.insert(0, notification);
        self.unread_count += 1;
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.unread_count = 0;
    }
}

// ===== AI assistant =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub role: ChatRole,
    pub content: String,
    #[serde(default)]
    pub is_error: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AiSlice {
    pub messages: Vec<ChatMessage>,
    pub is_open: bool,
    pub is_enabled: bool,
    /// Vehicle the conversation is about, sent as chat context
    pub vehicle_context: Option<serde_json::Value>,
    pub tracker: Tracker,
    pub status_check: Tracker,
    next_id: u64,
}

impl Default for AiSlice {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            is_open: false,
            is_enabled: true,
            vehicle_context: None,
            tracker: Tracker::default(),
            status_check: Tracker::default(),
            next_id: 1,
        }
    }
}

impl AiSlice {
    fn push(&mut self, role: ChatRole, content: String, is_error: bool) {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id,
            role,
            content,
            is_error,
            timestamp: Utc::now(),
        });
    }

    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.push(ChatRole::User, content.into(), false);
    }

    pub fn add_assistant_message(&mut self, content: impl Into<String>) {
        self.push(ChatRole::Assistant, content.into(), false);
    }

    pub fn add_error_message(&mut self) {
        self.push(ChatRole::Assistant, CHAT_ERROR_MESSAGE.to_string(), true);
    }

    pub fn toggle(&mut self) {
        self.is_open = !self.is_open;
    }

    pub fn open(&mut self) {
        self.is_open = true;
    }

    pub fn close(&mut self) {
        self.is_open = false;
    }

    pub fn set_vehicle_context(&mut self, context: serde_json::Value) {
        self.vehicle_context = Some(context);
    }

    pub fn clear_vehicle_context(&mut self) {
        self.vehicle_context = None;
    }

    pub fn clear_chat(&mut self) {
        self.messages.clear();
        self.vehicle_context = None;
    }
}

// ===== Quotes =====

#[derive(Debug, Clone, Default)]
pub struct QuotesSlice {
    pub tracker: Tracker,
    pub success: bool,
    pub current_quote: Option<QuoteRequest>,
    pub quote_history: Vec<QuoteRequest>,
    pub last_submitted_email: Option<String>,
    pub submission_timestamp: Option<DateTime<Utc>>,
    pub download: Tracker,
    pub last_downloaded: HashMap<u64, DateTime<Utc>>,
}

impl QuotesSlice {
    pub fn submitted(&mut self, quote: &QuoteRequest) {
        self.success = true;
        self.current_quote = Some(quote.clone());
        self.last_submitted_email = Some(quote.email.clone());
        self.submission_timestamp = Some(Utc::now());
        if quote.reference().is_some() {
            self.add_to_history(quote.clone());
        }
    }

    /// Most recent first, capped at [`QUOTE_HISTORY_LIMIT`]
    pub fn add_to_history(&mut self, mut quote: QuoteRequest) {
        if quote.created_at.is_none() {
            quote.created_at = Some(Utc::now());
        }
        self.quote_history.insert(0, quote);
        self.quote_history.truncate(QUOTE_HISTORY_LIMIT);
    }

    pub fn downloaded(&mut self, quote_id: u64) {
        self.last_downloaded.insert(quote_id, Utc::now());
    }

    pub fn reset(&mut self) {
        *self = Self {
            quote_history: std::mem::take(&mut self.quote_history),
            ..Self::default()
        };
    }
}

/// Field errors are folded into one `detail` line
pub fn quote_error_body(err: &ApiError) -> ErrorBody {
    let body = err.to_body();
    if body.detail().is_some() {
        return body;
    }
    let fields = body.field_errors();
    if fields.is_empty() {
        return ErrorBody(serde_json::json!({ "detail": "Failed to submit quote request" }));
    }
    let joined = fields
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ");
    ErrorBody(serde_json::json!({ "detail": format!("Validation errors: {joined}") }))
}

// ===== Saved searches =====

#[derive(Debug, Clone, Default)]
pub struct SearchesSlice {
    pub items: Vec<VehicleSearch>,
    pub tracker: Tracker,
}

impl SearchesSlice {
    pub fn added(&mut self, search: &VehicleSearch) {
        self.items.push(search.clone());
    }

    pub fn replaced(&mut self, search: &VehicleSearch) {
        replace_by_id(&mut self.items, search, |s| s.id);
    }

    pub fn removed(&mut self, id: u64) {
        self.items.retain(|s| s.id != id);
    }
}

// ===== Profile and analytics =====

#[derive(Debug, Clone, Default)]
pub struct ProfileSlice {
    pub profile: Option<Profile>,
    pub preferences: Option<NotificationPreferences>,
    pub tracker: Tracker,
}

#[derive(Debug, Clone, Default)]
pub struct AnalyticsSlice {
    pub marketplace_stats: Option<MarketplaceStats>,
    pub vehicle_views: HashMap<u64, VehicleViews>,
    pub tracker: Tracker,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NotificationType, Page};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn notification(id: u64, is_read: bool) -> Notification {
        Notification {
            id,
            notification_type: NotificationType::Bid,
            message: format!("n{id}"),
            related_object_id: None,
            is_read,
            created_at: None,
        }
    }

    fn quote(id: u64) -> QuoteRequest {
        serde_json::from_value(json!({"id": id, "email": "q@example.com"})).unwrap()
    }

    #[test]
    fn test_mark_read_never_goes_below_zero() {
        let mut slice = NotificationsSlice {
            items: vec![notification(1, false), notification(2, true)],
            unread_count: 0,
            ..Default::default()
        };
        slice.mark_read(1);
        assert_eq!(slice.unread_count, 0);
        assert!(slice.items[0].is_read);

        // Already read: count untouched
        slice.unread_count = 3;
        slice.mark_read(2);
        assert_eq!(slice.unread_count, 3);
    }

    #[test]
    fn test_delete_unread_decrements() {
        let mut slice = NotificationsSlice {
            items: vec![notification(1, false), notification(2, true)],
            unread_count: 1,
            ..Default::default()
        };
        slice.removed(2);
        assert_eq!(slice.unread_count, 1);
        slice.removed(1);
        assert_eq!(slice.unread_count, 0);
        assert!(slice.items.is_empty());
    }

    #[test]
    fn test_clear_read_keeps_unread() {
        let mut slice = NotificationsSlice {
            items: vec![notification(1, false), notification(2, true), notification(3, false)],
            unread_count: 2,
            ..Default::default()
        };
        slice.cleared_read();
        let ids: Vec<u64> = slice.items.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_live_notification_prepends() {
        let mut slice = NotificationsSlice::default();
        slice.add_notification(notification(1, false));
        slice.add_notification(notification(2, false));
        assert_eq!(slice.items[0].id, 2);
        assert_eq!(slice.unread_count, 2);

        slice.mark_all_read();
        assert_eq!(slice.unread_count, 0);
        assert!(slice.items.iter().all(|n| n.is_read));
    }

    #[test]
    fn test_paginated_load_sets_has_more() {
        let mut slice = NotificationsSlice::default();
        slice.loaded(&Listing::Page(Page {
            count: Some(30),
            next: None,
            previous: None,
            results: vec![notification(1, false)],
        }));
        assert!(!slice.has_more);

        slice.loaded(&Listing::Items(vec![]));
        assert!(!slice.has_more);
        assert!(slice.items.is_empty());
    }

    #[test]
    fn test_quote_history_is_capped() {
        let mut slice = QuotesSlice::default();
        for id in 1..=12 {
            slice.submitted(&quote(id));
        }
        assert_eq!(slice.quote_history.len(), QUOTE_HISTORY_LIMIT);
        assert_eq!(slice.quote_history[0].id, Some(12));
        assert_eq!(slice.quote_history[9].id, Some(3));
        assert_eq!(slice.last_submitted_email.as_deref(), Some("q@example.com"));
        assert!(slice.success);
    }

    #[test]
    fn test_quote_without_reference_is_not_recorded() {
        let mut slice = QuotesSlice::default();
        slice.submitted(&serde_json::from_value(json!({"email": "x@example.com"})).unwrap());
        assert!(slice.quote_history.is_empty());
        assert!(slice.current_quote.is_some());

        slice.quote_history.push(quote(1));
        slice.reset();
        assert!(slice.current_quote.is_none());
        assert_eq!(slice.quote_history.len(), 1);
    }

    #[test]
    fn test_quote_field_errors_are_folded() {
        let err = ApiError::from_response(
            reqwest::StatusCode::BAD_REQUEST,
            ErrorBody(json!({"email": ["Enter a valid email address."]})),
        );
        assert_eq!(
            quote_error_body(&err).detail(),
            Some("Validation errors: email: Enter a valid email address.")
        );
    }

    #[test]
    fn test_chat_messages_get_increasing_ids() {
        let mut ai = AiSlice::default();
        ai.add_user_message("Is the Fit still available?");
        ai.add_error_message();
        assert_eq!(ai.messages[0].role, ChatRole::User);
        assert_eq!(ai.messages[1].content, CHAT_ERROR_MESSAGE);
        assert!(ai.messages[1].is_error);
        assert!(ai.messages[1].id > ai.messages[0].id);

        ai.set_vehicle_context(json!({"id": 4}));
        ai.clear_chat();
        assert!(ai.messages.is_empty());
        assert!(ai.vehicle_context.is_none());
    }

    #[test]
    fn test_vehicle_reducers_target_the_right_list() {
        let vehicle = |id: u64, make: &str| -> Vehicle {
            serde_json::from_value(json!({"id": id, "make": make})).unwrap()
        };
        let mut slice = VehiclesSlice {
            items: vec![vehicle(1, "Honda")],
            user_vehicles: vec![vehicle(1, "Honda"), vehicle(2, "Nissan")],
            ..Default::default()
        };

        slice.owner_updated(&vehicle(2, "Nissan X-Trail"));
        assert_eq!(slice.user_vehicles[1].make, "Nissan X-Trail");

        slice.verified(&vehicle(1, "Honda Fit"));
        assert_eq!(slice.items[0].make, "Honda Fit");
        assert_eq!(slice.user_vehicles[0].make, "Honda");

        slice.removed(1);
        assert!(slice.items.is_empty());
        assert_eq!(slice.user_vehicles.len(), 1);
    }
}
