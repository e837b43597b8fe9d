//! Client-side application state
//!
//! A single [`AppState`] tree split into per-resource slices. The [`Store`]
//! runs API calls and applies their outcome to the tree; [`selectors`] derive
//! views from it without touching the network.

pub mod selectors;
pub mod slices;
mod store;

pub use slices::{
    AiSlice, AnalyticsSlice, AuthSlice, BidsSlice, ChatMessage, ChatRole, NotificationsSlice,
    ProfileSlice, QuotesSlice, SearchesSlice, VehiclesSlice,
};
pub use store::Store;

use crate::error::ErrorBody;
use serde::{Deserialize, Serialize};

/// Lifecycle of the last request a slice issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Loading flag plus the last error body, per request kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tracker {
    pub status: Status,
    pub error: Option<ErrorBody>,
}

impl Tracker {
    pub fn pending(&mut self) {
        self.status = Status::Loading;
        self.error = None;
    }

    pub fn fulfilled(&mut self) {
        self.status = Status::Succeeded;
    }

    pub fn rejected(&mut self, error: ErrorBody) {
        self.status = Status::Failed;
        self.error = Some(error);
    }

    pub fn is_loading(&self) -> bool {
        self.status == Status::Loading
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().and_then(ErrorBody::message)
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub auth: AuthSlice,
    pub vehicles: VehiclesSlice,
    pub bids: BidsSlice,
    pub notifications: NotificationsSlice,
    pub ai: AiSlice,
    pub quotes: QuotesSlice,
    pub searches: SearchesSlice,
    pub profile: ProfileSlice,
    pub analytics: AnalyticsSlice,
}
