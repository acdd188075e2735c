//! Authentication and account endpoints.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::client::{ApiClient, RequestOptions};
use crate::error::ClientError;
use crate::session::SessionTokens;

mod keys {
    pub const INFO: &str = "/info";
    pub const MARKETPLACE_INFO: &str = "/marketplace-info";
    pub const LOGIN: &str = "/login";
    pub const REGISTER: &str = "/register";
    pub const RESEND_VERIFICATION: &str = "/resend-verification";
    pub const VERIFY: &str = "/verify";
    pub const FORGOT_PASSWORD: &str = "/forgot-password";
    pub const RESET_PASSWORD: &str = "/reset-password";
    pub const CHANGE_PASSWORD: &str = "/change-password";
    pub const SIGN_OUT: &str = "/sign-out";
    pub const TWO_FA_SETUP: &str = "/2fa/setup";
    pub const TWO_FA_VERIFY: &str = "/2fa/verify";
    pub const TWO_FA_VERIFY_SETUP: &str = "/2fa/verify-setup";
    pub const TWO_FA_DISABLE: &str = "/2fa/disable";
}

/// Merchant account category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserType {
    Merchant,
    Marketplace,
}

/// Merchant account profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    #[serde(default)]
    pub balance: f64,
    #[serde(rename = "twoFAEnabled", default)]
    pub two_fa_enabled: bool,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(rename = "type")]
    pub user_type: UserType,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login payload. Tokens are absent when the account requires a second
/// factor before a session is issued.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_expires: Option<i64>,
    #[serde(default)]
    pub user: Option<UserInfo>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub code: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInfoRequest {
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    #[serde(rename = "twoFACode")]
    pub two_fa_code: String,
}

/// Marketplace accounts edit their profile through a dedicated endpoint
/// with the same field set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMarketplaceInfoRequest {
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    #[serde(rename = "twoFACode")]
    pub two_fa_code: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResendVerificationRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    pub message: String,
}

/// The new password itself travels separately through the reset flow; this
/// endpoint only confirms it under a fresh 2FA code.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub confirm_password: String,
    #[serde(rename = "twoFACode")]
    pub two_fa_code: String,
}

/// Secret material for enrolling an authenticator app.
#[derive(Debug, Clone, Deserialize)]
pub struct SetupTwoFaResponse {
    pub base32: String,
    pub otpauth_url: String,
    pub verified: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTwoFaRequest {
    pub email: String,
    pub password: String,
    pub code: String,
}

/// Tokens issued once the second factor checks out.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTwoFaResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTwoFaSetupRequest {
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTwoFaSessionRequest {
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisableTwoFaRequest {
    pub password: String,
    #[serde(rename = "twoFACode")]
    pub two_fa_code: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignOutRequest {
    refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyQuery {
    token: String,
}

/// Authentication endpoints.
pub struct AuthApi {
    client: Arc<ApiClient>,
}

impl AuthApi {
    /// Create a new auth surface over the given client.
    #[must_use]
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Log in with email and password.
    ///
    /// On success the returned tokens (when issued) are stored in the
    /// client's session, so subsequent requests authenticate immediately.
    ///
    /// # Errors
    ///
    /// Returns the business error body on rejection (wrong password,
    /// `NEED_TWO_FA`, ...).
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ClientError> {
        let response: LoginResponse = self.client.post(keys::LOGIN, request).await?;

        if response.access_token.is_some() {
            self.client
                .session()
                .set_tokens(SessionTokens {
                    access_token: response.access_token.clone(),
                    refresh_token: response.refresh_token.clone(),
                    expires_at: None,
                })
                .await;
            info!("login succeeded; session established");
        } else {
            debug!("login accepted without tokens (second factor pending)");
        }

        Ok(response)
    }

    /// Register a new merchant account.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<Value, ClientError> {
        self.client.post(keys::REGISTER, request).await
    }

    /// Re-send the account verification email.
    pub async fn resend_verification(
        &self,
        request: &ResendVerificationRequest,
    ) -> Result<(), ClientError> {
        self.client.post(keys::RESEND_VERIFICATION, request).await
    }

    /// Redeem an emailed verification token.
    pub async fn verify(&self, token: impl Into<String>) -> Result<VerifyResponse, ClientError> {
        let options = RequestOptions::query(&VerifyQuery { token: token.into() })?;
        self.client.get_with(keys::VERIFY, options).await
    }

    /// Fetch the current account profile.
    pub async fn user_info(&self) -> Result<UserInfo, ClientError> {
        self.client.get(keys::INFO).await
    }

    /// Update the account profile. Requires a fresh 2FA code.
    #[instrument(skip(self, request))]
    pub async fn update_user_info(
        &self,
        request: &UpdateUserInfoRequest,
    ) -> Result<UserInfo, ClientError> {
        self.client.put(keys::INFO, request).await
    }

    /// Update a marketplace account's profile. Requires a fresh 2FA code.
    #[instrument(skip(self, request))]
    pub async fn update_marketplace_info(
        &self,
        request: &UpdateMarketplaceInfoRequest,
    ) -> Result<UserInfo, ClientError> {
        self.client.put(keys::MARKETPLACE_INFO, request).await
    }

    /// Start the forgot-password flow.
    pub async fn forgot_password(
        &self,
        request: &ForgotPasswordRequest,
    ) -> Result<(), ClientError> {
        self.client.post(keys::FORGOT_PASSWORD, request).await
    }

    /// Complete the forgot-password flow with the emailed code.
    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<(), ClientError> {
        self.client.post(keys::RESET_PASSWORD, request).await
    }

    /// Change the password of a signed-in account.
    ///
    /// A current-password mismatch (`MATCH_CURRENT_PASSWORD`) rejects
    /// without a toast; the form renders it inline.
    pub async fn update_password(&self, request: &UpdatePasswordRequest) -> Result<(), ClientError> {
        self.client.put(keys::CHANGE_PASSWORD, request).await
    }

    /// Start authenticator enrollment: returns the shared secret and the
    /// provisioning URL to render as a QR code.
    #[instrument(skip(self))]
    pub async fn setup_two_fa(&self) -> Result<SetupTwoFaResponse, ClientError> {
        self.client.post(keys::TWO_FA_SETUP, &serde_json::json!({})).await
    }

    /// Complete a 2FA login challenge.
    ///
    /// On success the issued tokens are stored in the client's session,
    /// same as a plain [`Self::login`].
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn verify_two_fa(
        &self,
        request: &VerifyTwoFaRequest,
    ) -> Result<VerifyTwoFaResponse, ClientError> {
        let response: VerifyTwoFaResponse = self.client.post(keys::TWO_FA_VERIFY, request).await?;

        self.client
            .session()
            .set_tokens(SessionTokens {
                access_token: Some(response.access_token.clone()),
                refresh_token: Some(response.refresh_token.clone()),
                expires_at: None,
            })
            .await;
        info!("two-factor challenge passed; session established");

        Ok(response)
    }

    /// Confirm authenticator enrollment with a first code.
    pub async fn verify_two_fa_setup(
        &self,
        request: &VerifyTwoFaSetupRequest,
    ) -> Result<bool, ClientError> {
        self.client.post(keys::TWO_FA_VERIFY_SETUP, request).await
    }

    /// Re-confirm the second factor for the current session before a
    /// sensitive operation. Same endpoint as enrollment confirmation.
    pub async fn verify_two_fa_session(
        &self,
        request: &VerifyTwoFaSessionRequest,
    ) -> Result<bool, ClientError> {
        self.client.post(keys::TWO_FA_VERIFY_SETUP, request).await
    }

    /// Turn off 2FA. Requires the account password and a fresh code.
    #[instrument(skip(self, request))]
    pub async fn disable_two_fa(&self, request: &DisableTwoFaRequest) -> Result<(), ClientError> {
        self.client.post(keys::TWO_FA_DISABLE, request).await
    }

    /// Sign out: invalidate the refresh token server-side, then clear the
    /// local session either way.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<(), ClientError> {
        let session = self.client.session();
        let request = SignOutRequest { refresh_token: session.refresh_token().await };

        let result: Result<(), ClientError> = self.client.post(keys::SIGN_OUT, &request).await;
        session.reset().await;
        info!("signed out");
        result
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth wire types.
    use super::*;

    #[test]
    fn user_info_parses_camel_case() {
        let json = r#"{
            "id": "m-1",
            "email": "ops@example.com",
            "firstname": "Ada",
            "lastname": "Ops",
            "balance": 120.5,
            "twoFAEnabled": true,
            "type": "MERCHANT",
            "status": "ACTIVE",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-02T00:00:00Z"
        }"#;

        let info: UserInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.user_type, UserType::Merchant);
        assert!(info.two_fa_enabled);
        assert!(info.image_url.is_none());
    }

    #[test]
    fn login_response_tolerates_missing_tokens() {
        let response: LoginResponse = serde_json::from_str("{}").unwrap();
        assert!(response.access_token.is_none());
        assert!(response.user.is_none());
    }

    #[test]
    fn register_request_serializes_type_field() {
        let request = RegisterRequest {
            email: "ops@example.com".to_string(),
            firstname: "Ada".to_string(),
            lastname: "Ops".to_string(),
            password: "secret".to_string(),
            confirm_password: "secret".to_string(),
            user_type: UserType::Marketplace,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["type"], "MARKETPLACE");
        assert_eq!(value["confirmPassword"], "secret");
    }

    #[test]
    fn two_fa_requests_serialize_code_field_verbatim() {
        let disable = DisableTwoFaRequest {
            password: "secret".to_string(),
            two_fa_code: "123456".to_string(),
        };
        let value = serde_json::to_value(&disable).unwrap();
        assert_eq!(value["twoFACode"], "123456");
        assert_eq!(value["password"], "secret");

        let update = UpdatePasswordRequest {
            confirm_password: "new-secret".to_string(),
            two_fa_code: "654321".to_string(),
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value["twoFACode"], "654321");
        assert_eq!(value["confirmPassword"], "new-secret");
    }

    #[test]
    fn setup_response_keeps_provisioning_url_key() {
        let json = r#"{
            "base32": "JBSWY3DPEHPK3PXP",
            "otpauth_url": "otpauth://totp/Mintgate:ops@example.com?secret=JBSWY3DPEHPK3PXP",
            "verified": false
        }"#;

        let response: SetupTwoFaResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.base32, "JBSWY3DPEHPK3PXP");
        assert!(response.otpauth_url.starts_with("otpauth://totp/"));
        assert!(!response.verified);
    }

    #[test]
    fn verify_two_fa_response_requires_both_tokens() {
        let json = r#"{"accessToken":"at","refreshToken":"rt"}"#;
        let response: VerifyTwoFaResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.access_token, "at");

        assert!(serde_json::from_str::<VerifyTwoFaResponse>(r#"{"accessToken":"at"}"#).is_err());
    }
}
