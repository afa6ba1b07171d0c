pub mod http;

use async_trait::async_trait;

use crate::models::{
    Account, Booking, CarDetail, CarSearchQuery, CarSummary, CarVerification,
    ChangePasswordRequest, DashboardStats, FeedbackReport, OccupiedDateRange, PageRequest, Paged,
    TransactionQuery, UpdateProfileRequest, UserProfile, Wallet, WalletMutation,
    WalletTransaction,
};
use crate::services::checkout::CreateBookingRequest;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// The remote rental REST API. Every call forwards the caller's bearer token.
#[async_trait]
pub trait RentalApi: Send + Sync {
    async fn get_car(&self, token: &str, car_id: &str) -> Result<CarDetail, ApiError>;
    async fn search_cars(
        &self,
        token: &str,
        query: &CarSearchQuery,
    ) -> Result<Paged<CarSummary>, ApiError>;
    async fn get_car_calendar(
        &self,
        token: &str,
        car_id: &str,
    ) -> Result<Vec<OccupiedDateRange>, ApiError>;

    async fn get_profile(&self, token: &str) -> Result<UserProfile, ApiError>;
    async fn update_profile(
        &self,
        token: &str,
        update: &UpdateProfileRequest,
    ) -> Result<UserProfile, ApiError>;
    async fn change_password(
        &self,
        token: &str,
        request: &ChangePasswordRequest,
    ) -> Result<(), ApiError>;

    async fn get_booking(&self, token: &str, booking_id: &str) -> Result<Booking, ApiError>;
    async fn create_booking(
        &self,
        token: &str,
        request: &CreateBookingRequest,
    ) -> Result<Booking, ApiError>;
    async fn cancel_booking(&self, token: &str, booking_id: &str) -> Result<Booking, ApiError>;
    async fn confirm_pickup(&self, token: &str, booking_id: &str) -> Result<Booking, ApiError>;
    async fn return_car(&self, token: &str, booking_id: &str) -> Result<Booking, ApiError>;

    async fn get_wallet(&self, token: &str) -> Result<Wallet, ApiError>;
    async fn create_wallet(&self, token: &str) -> Result<Wallet, ApiError>;
    async fn mutate_wallet(
        &self,
        token: &str,
        mutation: WalletMutation,
        amount: i64,
    ) -> Result<Wallet, ApiError>;
    async fn list_transactions(
        &self,
        token: &str,
        query: &TransactionQuery,
    ) -> Result<Paged<WalletTransaction>, ApiError>;

    async fn feedback_reports(
        &self,
        token: &str,
        page: PageRequest,
    ) -> Result<Paged<FeedbackReport>, ApiError>;

    async fn dashboard_stats(&self, token: &str) -> Result<DashboardStats, ApiError>;
    async fn list_accounts(&self, token: &str, page: PageRequest)
        -> Result<Paged<Account>, ApiError>;
    async fn toggle_account_status(&self, token: &str, account_id: &str)
        -> Result<Account, ApiError>;
    async fn list_car_verifications(
        &self,
        token: &str,
        page: PageRequest,
    ) -> Result<Paged<CarVerification>, ApiError>;
    async fn toggle_car_verification(
        &self,
        token: &str,
        car_id: &str,
    ) -> Result<CarVerification, ApiError>;
}
