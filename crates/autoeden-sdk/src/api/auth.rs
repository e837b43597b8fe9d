use super::{require, require_email};
use crate::auth::AuthState;
use crate::client::AutoEdenClient;
use crate::error::{ApiError, Result};
use crate::request::ApiRequest;
use crate::types::{Acknowledgement, LoginRequest, LoginResponse, RegisterRequest, User};
use serde_json::json;
use tracing::info;

/// Account endpoints under `/core/auth/`
pub struct AuthApi<'a> {
    pub(crate) client: &'a AutoEdenClient,
}

impl AuthApi<'_> {
    /// Log in and persist the returned tokens and user
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        require_email("email", email)?;
        require("password", password, "Password is required")?;

        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.client.post("/core/auth/login/", &request).await?;
        self.persist(&response).await?;

        info!("Logged in as {}", request.email);
        Ok(response)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<Acknowledgement> {
        require("username", &request.username, "Username is required")?;
        require_email("email", &request.email)?;
        require("password", &request.password, "Password is required")?;

        let ack: Acknowledgement = self
            .client
            .json_or_default(ApiRequest::post("/core/auth/register/").json(request)?)
            .await?;

        Ok(Acknowledgement {
            detail: Some(ack.detail.unwrap_or_else(|| "Registration Successful".to_string())),
            email: Some(request.email.clone()),
        })
    }

    /// Exchange Google OAuth tokens for an Auto Eden session
    pub async fn google_login(&self, access_token: &str, id_token: Option<&str>) -> Result<LoginResponse> {
        require("access_token", access_token, "Google access token is required")?;

        let body = json!({ "access_token": access_token, "id_token": id_token });
        let response: LoginResponse = self.client.post("/core/auth/google/", &body).await?;
        self.persist(&response).await?;

        info!("Logged in with Google");
        Ok(response)
    }

    pub async fn resend_verification(&self) -> Result<Acknowledgement> {
        self.client
            .json_or_default(ApiRequest::post("/core/auth/resend-verification/"))
            .await
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<Acknowledgement> {
        require_email("email", email)?;
        let request = ApiRequest::post("/core/auth/password-reset/").json(&json!({ "email": email }))?;
        self.client.json_or_default(request).await
    }

    pub async fn confirm_password_reset(
        &self,
        token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<Acknowledgement> {
        require("token", token, "Reset token is required")?;
        check_new_password(new_password, confirm_password)?;

        let request = ApiRequest::post("/core/auth/password-reset/confirm/").json(&json!({
            "token": token,
            "new_password": new_password,
            "confirm_password": confirm_password,
        }))?;
        self.client.json_or_default(request).await
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<Acknowledgement> {
        require("current_password", current_password, "Current password is required")?;
        check_new_password(new_password, confirm_password)?;

        let request = ApiRequest::post("/core/auth/change-password/").json(&json!({
            "current_password": current_password,
            "new_password": new_password,
            "confirm_password": confirm_password,
        }))?;
        self.client.json_or_default(request).await
    }

    /// Change the account email; the stored user follows on success
    pub async fn change_email(&self, new_email: &str, password: &str) -> Result<Acknowledgement> {
        require_email("new_email", new_email)?;
        require("password", password, "Password is required")?;

        let request = ApiRequest::post("/core/auth/change-email/")
            .json(&json!({ "new_email": new_email, "password": password }))?;
        let ack: Acknowledgement = self.client.json_or_default(request).await?;

        let session = self.client.session();
        if let Some(mut state) = session.current().await? {
            if let Some(user) = state.user.as_mut() {
                user.email = ack.email.clone().unwrap_or_else(|| new_email.to_string());
                session.persist(&state).await?;
            }
        }
        Ok(ack)
    }

    /// Forget the local session; the API has no logout endpoint
    pub async fn logout(&self) -> Result<()> {
        self.client.session().clear().await?;
        info!("Logged out");
        Ok(())
    }

    /// User stored with the current session
    pub async fn current_user(&self) -> Result<Option<User>> {
        Ok(self.client.session().current().await?.and_then(|s| s.user))
    }

    async fn persist(&self, response: &LoginResponse) -> Result<()> {
        let state = AuthState {
            access: Some(response.access.clone()),
            refresh: Some(response.refresh.clone()),
            user: response.user.clone(),
        };
        self.client.session().persist(&state).await
    }
}

fn check_new_password(new_password: &str, confirm_password: &str) -> Result<()> {
    require("new_password", new_password, "New password is required")?;
    if new_password != confirm_password {
        return Err(ApiError::validation("confirm_password", "Passwords do not match"));
    }
    Ok(())
}
