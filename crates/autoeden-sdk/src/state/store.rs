use super::slices::quote_error_body;
use super::{AppState, Tracker};
use crate::auth::{SessionExpiredHandler, SessionExpiredNotice};
use crate::client::AutoEdenClient;
use crate::error::{ApiError, ErrorBody, Result};
use crate::types::{
    Acknowledgement, AiStatus, Bid, ChatReply, Listing, LoginResponse, MarketplaceFilters,
    MarketplaceStats, NewVehicle, NewVehicleSearch, Notification, NotificationPreferences,
    Profile, ProfileUpdate, QuoteForm, QuoteRequest, RegisterRequest, User, Vehicle,
    VehicleSearch, VehicleSearchUpdate, VehicleUpdate, VehicleViews, VerificationUpdate,
};
use bytes::Bytes;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

type TrackerFn = fn(&mut AppState) -> &mut Tracker;

/// `detail` from the server when present, else `fallback`
fn detail_or(err: &ApiError, fallback: &str) -> ErrorBody {
    match err.body().and_then(ErrorBody::detail) {
        Some(detail) => ErrorBody(serde_json::json!({ "detail": detail })),
        None => ErrorBody(serde_json::json!({ "detail": fallback })),
    }
}

/// Wipes the state tree when the session expires
struct ResetOnExpiry {
    state: Arc<RwLock<AppState>>,
    resets: Arc<AtomicU64>,
}

impl SessionExpiredHandler for ResetOnExpiry {
    fn on_session_expired(&self, notice: &SessionExpiredNotice) {
        let mut state = self.state.write();
        *state = AppState::default();
        state.auth.session_notice = Some(notice.message.to_string());
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}

/// Application state bound to a client
///
/// Every operation marks its slice's tracker as loading, awaits the API call
/// and then applies the outcome. The state lock is never held across an
/// await.
#[derive(Clone)]
pub struct Store {
    client: Arc<AutoEdenClient>,
    state: Arc<RwLock<AppState>>,
    /// Bumped each time an expiry wipes the tree
    resets: Arc<AtomicU64>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("base_url", &self.client.base_url())
            .finish_non_exhaustive()
    }
}

impl Store {
    pub fn new(client: Arc<AutoEdenClient>) -> Self {
        let state = Arc::new(RwLock::new(AppState::default()));
        let resets = Arc::new(AtomicU64::new(0));
        client.on_session_expired(Arc::new(ResetOnExpiry {
            state: state.clone(),
            resets: resets.clone(),
        }));
        Self {
            client,
            state,
            resets,
        }
    }

    pub fn client(&self) -> &AutoEdenClient {
        &self.client
    }

    pub fn snapshot(&self) -> AppState {
        self.state.read().clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.state.read())
    }

    /// Apply a synchronous reducer
    pub fn update(&self, f: impl FnOnce(&mut AppState)) {
        f(&mut self.state.write())
    }

    async fn dispatch<T, Fut, R>(&self, tracker: TrackerFn, call: Fut, reduce: R) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
        R: FnOnce(&mut AppState, &T),
    {
        self.dispatch_with(tracker, call, reduce, |_, _| {}).await
    }

    async fn dispatch_with<T, Fut, R, E>(
        &self,
        tracker: TrackerFn,
        call: Fut,
        reduce: R,
        on_reject: E,
    ) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
        R: FnOnce(&mut AppState, &T),
        E: FnOnce(&mut AppState, &ApiError),
    {
        let epoch = self.resets.load(Ordering::SeqCst);
        tracker(&mut self.state.write()).pending();
        let outcome = call.await;
        let was_reset = self.resets.load(Ordering::SeqCst) != epoch;

        let mut state = self.state.write();
        match &outcome {
            Ok(value) => {
                tracker(&mut state).fulfilled();
                reduce(&mut state, value);
            }
            // The slice reducer still runs on the fresh tree, its tracker stays clean
            Err(err @ ApiError::SessionExpired(_)) if was_reset => {
                let clean = tracker(&mut state).clone();
                on_reject(&mut state, err);
                *tracker(&mut state) = clean;
            }
            Err(err) => {
                debug!("Request failed: {err}");
                tracker(&mut state).rejected(err.to_body());
                on_reject(&mut state, err);
            }
        }
        drop(state);
        outcome
    }

    // ===== Auth =====

    /// Load the persisted user into the tree
    pub async fn hydrate(&self) -> Result<()> {
        let session = self.client.session().current().await?;
        let mut state = self.state.write();
        match session {
            Some(auth) if auth.is_authenticated() => {
                state.auth.user = auth.user;
                state.auth.is_authenticated = true;
            }
            _ => state.auth.logged_out(),
        }
        Ok(())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        self.dispatch(
            |s| &mut s.auth.tracker,
            self.client.auth().login(email, password),
            |s, response| s.auth.logged_in(response),
        )
        .await
    }

    pub async fn google_login(&self, access_token: &str, id_token: Option<&str>) -> Result<LoginResponse> {
        self.dispatch(
            |s| &mut s.auth.tracker,
            self.client.auth().google_login(access_token, id_token),
            |s, response| s.auth.logged_in(response),
        )
        .await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<Acknowledgement> {
        self.dispatch(
            |s| &mut s.auth.tracker,
            self.client.auth().register(request),
            |s, ack| s.auth.registration = Some(ack.clone()),
        )
        .await
    }

    pub async fn logout(&self) -> Result<()> {
        self.client.auth().logout().await?;
        self.state.write().auth.logged_out();
        Ok(())
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<Acknowledgement> {
        self.dispatch(
            |s| &mut s.auth.password_reset,
            self.client.auth().request_password_reset(email),
            |_, _| {},
        )
        .await
    }

    pub async fn confirm_password_reset(
        &self,
        token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<Acknowledgement> {
        self.dispatch(
            |s| &mut s.auth.password_reset,
            self.client
                .auth()
                .confirm_password_reset(token, new_password, confirm_password),
            |_, _| {},
        )
        .await
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<Acknowledgement> {
        self.dispatch(
            |s| &mut s.auth.password_change,
            self.client
                .auth()
                .change_password(current_password, new_password, confirm_password),
            |_, _| {},
        )
        .await
    }

    pub async fn change_email(&self, new_email: &str, password: &str) -> Result<Acknowledgement> {
        self.dispatch(
            |s| &mut s.auth.email_change,
            self.client.auth().change_email(new_email, password),
            |s, ack| {
                if let Some(user) = s.auth.user.as_mut() {
                    user.email = ack.email.clone().unwrap_or_else(|| new_email.to_string());
                }
            },
        )
        .await
    }

    // ===== Vehicles =====

    pub async fn fetch_vehicles(&self) -> Result<Vec<Vehicle>> {
        self.dispatch(
            |s| &mut s.vehicles.tracker,
            self.client.vehicles().list(),
            |s, vehicles| s.vehicles.items = vehicles.clone(),
        )
        .await
    }

    pub async fn fetch_marketplace(&self, filters: &MarketplaceFilters) -> Result<Vec<Vehicle>> {
        self.dispatch(
            |s| &mut s.vehicles.tracker,
            self.client.vehicles().marketplace(filters),
            |s, vehicles| s.vehicles.items = vehicles.clone(),
        )
        .await
    }

    pub async fn fetch_my_vehicles(&self) -> Result<Vec<Vehicle>> {
        self.dispatch(
            |s| &mut s.vehicles.tracker,
            self.client.vehicles().mine(),
            |s, vehicles| s.vehicles.user_vehicles = vehicles.clone(),
        )
        .await
    }

    pub async fn fetch_pending_vehicles(&self) -> Result<Vec<Vehicle>> {
        self.dispatch(
            |s| &mut s.vehicles.tracker,
            self.client.vehicles().pending_review(),
            |s, vehicles| s.vehicles.pending_vehicles = vehicles.clone(),
        )
        .await
    }

    pub async fn fetch_instant_sales(&self) -> Result<Vec<Vehicle>> {
        self.dispatch(
            |s| &mut s.vehicles.tracker,
            self.client.vehicles().instant_sales(),
            |s, vehicles| s.vehicles.instant_sale_vehicles = vehicles.clone(),
        )
        .await
    }

    pub async fn create_vehicle(&self, vehicle: &NewVehicle) -> Result<Vehicle> {
        self.dispatch(
            |s| &mut s.vehicles.tracker,
            self.client.vehicles().create(vehicle),
            |s, created| s.vehicles.added(created),
        )
        .await
    }

    pub async fn update_vehicle(&self, id: u64, update: &VehicleUpdate) -> Result<Vehicle> {
        self.dispatch(
            |s| &mut s.vehicles.tracker,
            self.client.vehicles().update(id, update),
            |s, vehicle| s.vehicles.owner_updated(vehicle),
        )
        .await
    }

    pub async fn verify_vehicle(&self, id: u64, decision: &VerificationUpdate) -> Result<Vehicle> {
        self.dispatch(
            |s| &mut s.vehicles.tracker,
            self.client.vehicles().verify(id, decision),
            |s, vehicle| s.vehicles.verified(vehicle),
        )
        .await
    }

    pub async fn toggle_visibility(&self, id: u64) -> Result<Vehicle> {
        self.dispatch(
            |s| &mut s.vehicles.tracker,
            self.client.vehicles().toggle_visibility(id),
            |s, vehicle| s.vehicles.owner_updated(vehicle),
        )
        .await
    }

    pub async fn delete_vehicle(&self, id: u64) -> Result<()> {
        self.dispatch(
            |s| &mut s.vehicles.tracker,
            self.client.vehicles().delete(id),
            |s, _| s.vehicles.removed(id),
        )
        .await
    }

    // ===== Bids =====

    pub async fn fetch_all_bids(&self) -> Result<Vec<Bid>> {
        self.dispatch(
            |s| &mut s.bids.tracker,
            self.client.bids().all(),
            |s, bids| s.bids.all_bids = bids.clone(),
        )
        .await
    }

    pub async fn fetch_my_bids(&self) -> Result<Vec<Bid>> {
        self.dispatch(
            |s| &mut s.bids.tracker,
            self.client.bids().mine(),
            |s, bids| s.bids.items = bids.clone(),
        )
        .await
    }

    pub async fn place_bid(&self, vehicle_id: u64, amount: Decimal, message: Option<String>) -> Result<Bid> {
        self.dispatch(
            |s| &mut s.bids.placing,
            self.client.bids().place(vehicle_id, amount, message),
            |s, bid| s.bids.placed(bid),
        )
        .await
    }

    pub async fn delete_bid(&self, id: u64) -> Result<()> {
        self.dispatch(
            |s| &mut s.bids.tracker,
            self.client.bids().delete(id),
            |s, _| s.bids.removed(id),
        )
        .await
    }

    /// Cached per user for the lifetime of the store
    pub async fn bidder(&self, user_id: u64) -> Result<User> {
        if let Some(user) = self.read(|s| s.bids.bidders.get(&user_id).cloned()) {
            return Ok(user);
        }
        self.dispatch(
            |s| &mut s.bids.tracker,
            self.client.bids().bidder(user_id),
            |s, user| {
                s.bids.bidders.insert(user_id, user.clone());
            },
        )
        .await
    }

    // ===== Notifications =====

    /// `page` of `None` loads the first page
    pub async fn fetch_notifications(&self, page: Option<u32>) -> Result<Listing<Notification>> {
        let notifications = self.client.notifications();
        let call = async {
            match page {
                Some(page) => notifications.page(page).await,
                None => notifications.list().await,
            }
        };
        self.dispatch(
            |s| &mut s.notifications.tracker,
            call,
            |s, listing| s.notifications.loaded(listing),
        )
        .await
    }

    pub async fn fetch_unread_count(&self) -> Result<u64> {
        self.dispatch(
            |s| &mut s.notifications.tracker,
            self.client.notifications().unread_count(),
            |s, count| s.notifications.unread_count = *count,
        )
        .await
    }

    pub async fn mark_notification_read(&self, id: u64) -> Result<()> {
        self.dispatch(
            |s| &mut s.notifications.tracker,
            self.client.notifications().mark_read(id),
            |s, _| s.notifications.mark_read(id),
        )
        .await
    }

    pub async fn mark_all_notifications_read(&self) -> Result<()> {
        self.dispatch(
            |s| &mut s.notifications.tracker,
            self.client.notifications().mark_all_read(),
            |s, _| s.notifications.mark_all_read(),
        )
        .await
    }

    pub async fn delete_notification(&self, id: u64) -> Result<()> {
        self.dispatch(
            |s| &mut s.notifications.tracker,
            self.client.notifications().delete(id),
            |s, _| s.notifications.removed(id),
        )
        .await
    }

    pub async fn clear_read_notifications(&self) -> Result<()> {
        self.dispatch(
            |s| &mut s.notifications.tracker,
            self.client.notifications().clear_all(),
            |s, _| s.notifications.cleared_read(),
        )
        .await
    }

    // ===== AI assistant =====

    /// Records the user message, then the reply or an error message
    pub async fn send_chat_message(&self, message: &str) -> Result<ChatReply> {
        let context = {
            let mut state = self.state.write();
            state.ai.add_user_message(message.trim());
            state.ai.vehicle_context.clone()
        };
        self.dispatch_with(
            |s| &mut s.ai.tracker,
            self.client.ai().chat(message, context),
            |s, reply| s.ai.add_assistant_message(reply.text()),
            |s, err| {
                s.ai.tracker.rejected(detail_or(err, "Failed to get response"));
                s.ai.add_error_message();
            },
        )
        .await
    }

    /// A disabled or missing assistant turns the feature off without an error
    pub async fn check_ai_status(&self) -> Result<AiStatus> {
        self.dispatch_with(
            |s| &mut s.ai.status_check,
            self.client.ai().status(),
            |s, status| s.ai.is_enabled = status.is_enabled(),
            |s, err| {
                s.ai.is_enabled = false;
                if err.is_absent() {
                    s.ai.status_check.clear_error();
                }
            },
        )
        .await
    }

    pub async fn ask_about_vehicle(&self, vehicle_id: u64, question: &str) -> Result<ChatReply> {
        self.dispatch_with(
            |s| &mut s.ai.tracker,
            self.client.ai().ask_about_vehicle(vehicle_id, question),
            |s, reply| s.ai.add_assistant_message(reply.text()),
            |s, err| s.ai.tracker.rejected(detail_or(err, "Failed to get response")),
        )
        .await
    }

    // ===== Quotes =====

    pub async fn request_quote(&self, vehicle_id: u64, form: &QuoteForm) -> Result<QuoteRequest> {
        self.state.write().quotes.success = false;
        self.dispatch_with(
            |s| &mut s.quotes.tracker,
            self.client.quotes().request(vehicle_id, form),
            |s, quote| s.quotes.submitted(quote),
            |s, err| s.quotes.tracker.rejected(quote_error_body(err)),
        )
        .await
    }

    pub async fn download_quote_pdf(&self, quote_id: u64) -> Result<Bytes> {
        self.dispatch_with(
            |s| &mut s.quotes.download,
            self.client.quotes().download_pdf(quote_id),
            |s, _| s.quotes.downloaded(quote_id),
            |s, err| s.quotes.download.rejected(detail_or(err, "Failed to download PDF")),
        )
        .await
    }

    // ===== Saved searches =====

    pub async fn fetch_searches(&self) -> Result<Vec<VehicleSearch>> {
        self.dispatch(
            |s| &mut s.searches.tracker,
            self.client.searches().list(),
            |s, searches| s.searches.items = searches.clone(),
        )
        .await
    }

    pub async fn create_search(&self, search: &NewVehicleSearch) -> Result<VehicleSearch> {
        self.dispatch(
            |s| &mut s.searches.tracker,
            self.client.searches().create(search),
            |s, created| s.searches.added(created),
        )
        .await
    }

    pub async fn update_search(&self, id: u64, update: &VehicleSearchUpdate) -> Result<VehicleSearch> {
        self.dispatch(
            |s| &mut s.searches.tracker,
            self.client.searches().update(id, update),
            |s, search| s.searches.replaced(search),
        )
        .await
    }

    pub async fn delete_search(&self, id: u64) -> Result<()> {
        self.dispatch(
            |s| &mut s.searches.tracker,
            self.client.searches().delete(id),
            |s, _| s.searches.removed(id),
        )
        .await
    }

    // ===== Profile =====

    pub async fn fetch_profile(&self) -> Result<Profile> {
        self.dispatch(
            |s| &mut s.profile.tracker,
            self.client.profile().get(),
            |s, profile| s.profile.profile = Some(profile.clone()),
        )
        .await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile> {
        self.dispatch(
            |s| &mut s.profile.tracker,
            self.client.profile().update(update),
            |s, profile| s.profile.profile = Some(profile.clone()),
        )
        .await
    }

    pub async fn fetch_notification_preferences(&self) -> Result<NotificationPreferences> {
        self.dispatch(
            |s| &mut s.profile.tracker,
            self.client.profile().notification_preferences(),
            |s, prefs| s.profile.preferences = Some(prefs.clone()),
        )
        .await
    }

    pub async fn update_notification_preferences(
        &self,
        preferences: &NotificationPreferences,
    ) -> Result<NotificationPreferences> {
        self.dispatch(
            |s| &mut s.profile.tracker,
            self.client
                .profile()
                .update_notification_preferences(preferences),
            |s, prefs| s.profile.preferences = Some(prefs.clone()),
        )
        .await
    }

    // ===== Analytics =====

    pub async fn fetch_marketplace_stats(&self) -> Result<MarketplaceStats> {
        self.dispatch(
            |s| &mut s.analytics.tracker,
            self.client.analytics().marketplace_stats(),
            |s, stats| s.analytics.marketplace_stats = Some(stats.clone()),
        )
        .await
    }

    pub async fn fetch_vehicle_views(&self, vehicle_id: u64) -> Result<VehicleViews> {
        self.dispatch(
            |s| &mut s.analytics.tracker,
            self.client.analytics().vehicle_views(vehicle_id),
            |s, views| {
                s.analytics.vehicle_views.insert(vehicle_id, views.clone());
            },
        )
        .await
    }
}
