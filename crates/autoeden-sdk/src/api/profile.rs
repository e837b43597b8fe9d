use crate::client::AutoEdenClient;
use crate::error::{Result, ResultExt};
use crate::types::{NotificationPreferences, Profile, ProfileUpdate};

const PREFERENCES_PATH: &str = "/core/profile/notification-preferences/";

/// Profile of the logged-in user
pub struct ProfileApi<'a> {
    pub(crate) client: &'a AutoEdenClient,
}

impl ProfileApi<'_> {
    pub async fn get(&self) -> Result<Profile> {
        self.client.get("/core/profile/").await
    }

    pub async fn update(&self, update: &ProfileUpdate) -> Result<Profile> {
        self.client.patch("/core/profile/", update).await
    }

    /// Saved preferences, or the defaults when none were ever saved
    pub async fn notification_preferences(&self) -> Result<NotificationPreferences> {
        let saved: Option<NotificationPreferences> =
            self.client.get(PREFERENCES_PATH).await.optional()?;
        Ok(saved.unwrap_or_default())
    }

    pub async fn update_notification_preferences(
        &self,
        preferences: &NotificationPreferences,
    ) -> Result<NotificationPreferences> {
        self.client.put(PREFERENCES_PATH, preferences).await
    }
}

#[cfg(test)]
mod tests {
    use crate::client::ClientBuilder;
    use crate::error::ApiError;
    use crate::types::NotificationPreferences;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_missing_preferences_fall_back_to_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(super::PREFERENCES_PATH))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = ClientBuilder::new().base_url(server.uri()).build().unwrap();
        let prefs = client.profile().notification_preferences().await.unwrap();
        assert_eq!(prefs, NotificationPreferences::default());
    }

    #[tokio::test]
    async fn test_server_error_is_not_hidden() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(super::PREFERENCES_PATH))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = ClientBuilder::new().base_url(server.uri()).build().unwrap();
        let err = client.profile().notification_preferences().await.unwrap_err();
        assert!(matches!(err, ApiError::Internal { status: 500, .. }));
    }
}
