use crate::client::AutoEdenClient;
use crate::error::Result;
use crate::request::ApiRequest;
use crate::types::{Listing, Notification, UnreadCount};

/// Notifications under `/core/notifications/`
pub struct NotificationsApi<'a> {
    pub(crate) client: &'a AutoEdenClient,
}

impl NotificationsApi<'_> {
    /// First page of notifications, newest first
    pub async fn list(&self) -> Result<Listing<Notification>> {
        self.client.get("/core/notifications/").await
    }

    pub async fn page(&self, page: u32) -> Result<Listing<Notification>> {
        self.client
            .json(ApiRequest::get("/core/notifications/").param("page", page))
            .await
    }

    pub async fn unread_count(&self) -> Result<u64> {
        let count: UnreadCount = self.client.get("/core/notifications/unread_count/").await?;
        Ok(count.unread_count)
    }

    pub async fn mark_read(&self, id: u64) -> Result<()> {
        self.client
            .empty(ApiRequest::patch(format!("/core/notifications/{id}/read/")))
            .await
    }

    pub async fn mark_all_read(&self) -> Result<()> {
        self.client
            .empty(ApiRequest::post("/core/notifications/read_all/"))
            .await
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        self.client
            .delete(&format!("/core/notifications/{id}/"))
            .await
    }

    /// Remove every read notification
    pub async fn clear_all(&self) -> Result<()> {
        self.client.delete("/core/notifications/clear_all/").await
    }
}
