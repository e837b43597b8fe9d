use crate::client::AutoEdenClient;
use crate::error::{ApiError, Result};
use crate::request::ApiRequest;
use crate::types::{Bid, Listing, PlaceBid, User};
use rust_decimal::Decimal;

/// Bids under `/core/bids/`
pub struct BidsApi<'a> {
    pub(crate) client: &'a AutoEdenClient,
}

impl BidsApi<'_> {
    /// Place a bid; an empty message is replaced with the default text
    pub async fn place(&self, vehicle_id: u64, amount: Decimal, message: Option<String>) -> Result<Bid> {
        if amount <= Decimal::ZERO {
            return Err(ApiError::validation("amount", "Bid amount must be greater than zero"));
        }
        let bid = PlaceBid::new(vehicle_id, amount, message);
        self.client.post("/core/bids/", &bid).await
    }

    /// Bids placed by the logged-in user
    pub async fn mine(&self) -> Result<Vec<Bid>> {
        self.listing("/core/bids/my-bids/").await
    }

    /// Every bid (admin)
    pub async fn all(&self) -> Result<Vec<Bid>> {
        self.listing("/core/bids/all_bids/").await
    }

    pub async fn delete(&self, bid_id: u64) -> Result<()> {
        self.client.delete(&format!("/core/bids/{bid_id}/")).await
    }

    /// Public details of a bidder
    pub async fn bidder(&self, user_id: u64) -> Result<User> {
        self.client.get(&format!("/core/users/{user_id}/")).await
    }

    async fn listing(&self, path: &str) -> Result<Vec<Bid>> {
        let listing: Listing<Bid> = self.client.json(ApiRequest::get(path)).await?;
        Ok(listing.into_items())
    }
}
