//! Typed endpoint surfaces over the authenticated client
//!
//! Thin wrappers that pair each merchant API endpoint with its request and
//! response types. All transport concerns (bearer tokens, envelope
//! unwrapping, refresh, toasts) are handled by [`crate::client::ApiClient`]
//! underneath.

pub mod auth;
pub mod transactions;

pub use auth::{
    AuthApi, DisableTwoFaRequest, ForgotPasswordRequest, LoginRequest, LoginResponse,
    RegisterRequest, ResendVerificationRequest, ResetPasswordRequest, SetupTwoFaResponse,
    UpdateMarketplaceInfoRequest, UpdatePasswordRequest, UpdateUserInfoRequest, UserInfo, UserType,
    VerifyResponse, VerifyTwoFaRequest, VerifyTwoFaResponse, VerifyTwoFaSessionRequest,
    VerifyTwoFaSetupRequest,
};
pub use transactions::{Transaction, TransactionListQuery, TransactionsApi};
