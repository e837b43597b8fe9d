use crate::client::AutoEdenClient;
use crate::error::Result;
use crate::types::{MarketplaceStats, VehicleViews};

pub struct AnalyticsApi<'a> {
    pub(crate) client: &'a AutoEdenClient,
}

impl AnalyticsApi<'_> {
    pub async fn marketplace_stats(&self) -> Result<MarketplaceStats> {
        self.client.get("/core/analytics/marketplace-stats/").await
    }

    pub async fn vehicle_views(&self, vehicle_id: u64) -> Result<VehicleViews> {
        self.client
            .get(&format!("/core/analytics/vehicle-views/{vehicle_id}/"))
            .await
    }
}
