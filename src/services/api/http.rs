use anyhow::Context;
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::{ApiError, RentalApi};
use crate::models::{
    Account, Booking, CarDetail, CarSearchQuery, CarSummary, CarVerification,
    ChangePasswordRequest, DashboardStats, Envelope, EnvelopeStatus, FeedbackReport,
    OccupiedDateRange, PageRequest, Paged, Pagination, TransactionQuery, UpdateProfileRequest,
    UserProfile, Wallet, WalletMutation, WalletTransaction,
};
use crate::services::checkout::CreateBookingRequest;

pub struct HttpRentalApi {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpRentalApi {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid rental API base URL: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("rental API base URL cannot carry a path: {base_url}");
        }
        Ok(Self {
            base_url,
            client: reqwest::Client::new(),
        })
    }

    /// Appends `segments` to the base path, percent-encoding each one so an
    /// id can never climb out of its own path segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn get(&self, token: &str, segments: &[&str]) -> RequestBuilder {
        self.client.get(self.url(segments)).bearer_auth(token)
    }

    fn post(&self, token: &str, segments: &[&str]) -> RequestBuilder {
        self.client.post(self.url(segments)).bearer_auth(token)
    }

    fn put(&self, token: &str, segments: &[&str]) -> RequestBuilder {
        self.client.put(self.url(segments)).bearer_auth(token)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<Envelope<T>, ApiError> {
        let resp = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(format!("{what}: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ApiError::Transport(format!("{what}: {e}")))?;

        read_envelope(status, &body, what)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, ApiError> {
        require_data(self.send(request, what).await?, what)
    }

    async fn fetch_paged<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<Paged<T>, ApiError> {
        Ok(into_paged(self.send::<Vec<T>>(request, what).await?))
    }
}

/// Maps a response status and raw body onto the decoded envelope.
fn read_envelope<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
    what: &str,
) -> Result<Envelope<T>, ApiError> {
    match status {
        StatusCode::NOT_FOUND => return Err(ApiError::NotFound(what.to_string())),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(ApiError::Unauthorized),
        _ => {}
    }

    if !status.is_success() {
        let message = serde_json::from_str::<Envelope<serde_json::Value>>(body)
            .ok()
            .and_then(|env| env.message)
            .unwrap_or_else(|| format!("{what} failed with status {status}"));
        tracing::warn!(%status, what, message = %message, "rental API rejected request");
        return Err(ApiError::Rejected {
            status: status.as_u16(),
            message,
        });
    }

    let envelope: Envelope<T> =
        serde_json::from_str(body).map_err(|e| ApiError::Decode(format!("{what}: {e}")))?;

    if !envelope.is_success() {
        let code = match &envelope.status {
            Some(EnvelopeStatus::Code(code)) => *code,
            _ => StatusCode::BAD_REQUEST.as_u16(),
        };
        return Err(ApiError::Rejected {
            status: code,
            message: envelope
                .message
                .unwrap_or_else(|| format!("{what} was rejected")),
        });
    }

    Ok(envelope)
}

fn require_data<T>(envelope: Envelope<T>, what: &str) -> Result<T, ApiError> {
    envelope
        .data
        .ok_or_else(|| ApiError::Decode(format!("{what}: response carried no data")))
}

/// Unpaginated list responses count as one page holding everything.
fn into_paged<T>(envelope: Envelope<Vec<T>>) -> Paged<T> {
    let data = envelope.data.unwrap_or_default();
    let pagination = envelope
        .pagination
        .unwrap_or_else(|| Pagination::single_page(data.len()));
    Paged { data, pagination }
}

#[async_trait]
impl RentalApi for HttpRentalApi {
    async fn get_car(&self, token: &str, car_id: &str) -> Result<CarDetail, ApiError> {
        self.fetch(self.get(token, &["cars", car_id]), "car")
            .await
    }

    async fn search_cars(
        &self,
        token: &str,
        query: &CarSearchQuery,
    ) -> Result<Paged<CarSummary>, ApiError> {
        self.fetch_paged(self.get(token, &["cars", "search"]).query(query), "car search")
            .await
    }

    async fn get_car_calendar(
        &self,
        token: &str,
        car_id: &str,
    ) -> Result<Vec<OccupiedDateRange>, ApiError> {
        let envelope = self
            .send::<Vec<OccupiedDateRange>>(
                self.get(token, &["cars", car_id, "calendar"]),
                "car calendar",
            )
            .await?;
        Ok(envelope.data.unwrap_or_default())
    }

    async fn get_profile(&self, token: &str) -> Result<UserProfile, ApiError> {
        self.fetch(self.get(token, &["users", "profile"]), "user profile")
            .await
    }

    async fn update_profile(
        &self,
        token: &str,
        update: &UpdateProfileRequest,
    ) -> Result<UserProfile, ApiError> {
        self.fetch(self.put(token, &["users", "profile"]).json(update), "user profile")
            .await
    }

    async fn change_password(
        &self,
        token: &str,
        request: &ChangePasswordRequest,
    ) -> Result<(), ApiError> {
        self.send::<serde_json::Value>(self.put(token, &["users", "password"]).json(request), "password")
            .await?;
        Ok(())
    }

    async fn get_booking(&self, token: &str, booking_id: &str) -> Result<Booking, ApiError> {
        self.fetch(self.get(token, &["bookings", booking_id]), "booking")
            .await
    }

    async fn create_booking(
        &self,
        token: &str,
        request: &CreateBookingRequest,
    ) -> Result<Booking, ApiError> {
        self.fetch(self.post(token, &["bookings"]).json(request), "booking")
            .await
    }

    async fn cancel_booking(&self, token: &str, booking_id: &str) -> Result<Booking, ApiError> {
        self.fetch(
            self.put(token, &["bookings", booking_id, "cancel"]),
            "booking",
        )
        .await
    }

    async fn confirm_pickup(&self, token: &str, booking_id: &str) -> Result<Booking, ApiError> {
        self.fetch(
            self.put(token, &["bookings", booking_id, "confirm-pickup"]),
            "booking",
        )
        .await
    }

    async fn return_car(&self, token: &str, booking_id: &str) -> Result<Booking, ApiError> {
        self.fetch(
            self.put(token, &["bookings", booking_id, "return"]),
            "booking",
        )
        .await
    }

    async fn get_wallet(&self, token: &str) -> Result<Wallet, ApiError> {
        self.fetch(self.get(token, &["wallet"]), "wallet").await
    }

    async fn create_wallet(&self, token: &str) -> Result<Wallet, ApiError> {
        self.fetch(self.post(token, &["wallet"]), "wallet").await
    }

    async fn mutate_wallet(
        &self,
        token: &str,
        mutation: WalletMutation,
        amount: i64,
    ) -> Result<Wallet, ApiError> {
        let action = match mutation {
            WalletMutation::TopUp => "top-up",
            WalletMutation::Withdraw => "withdraw",
        };
        self.fetch(self.post(token, &["wallet", action]).json(&json!({ "amount": amount })), "wallet")
            .await
    }

    async fn list_transactions(
        &self,
        token: &str,
        query: &TransactionQuery,
    ) -> Result<Paged<WalletTransaction>, ApiError> {
        self.fetch_paged(
            self.get(token, &["wallet", "transactions"]).query(query),
            "wallet transactions",
        )
        .await
    }

    async fn feedback_reports(
        &self,
        token: &str,
        page: PageRequest,
    ) -> Result<Paged<FeedbackReport>, ApiError> {
        self.fetch_paged(
            self.get(token, &["feedback", "reports"]).query(&page),
            "feedback reports",
        )
        .await
    }

    async fn dashboard_stats(&self, token: &str) -> Result<DashboardStats, ApiError> {
        self.fetch(self.get(token, &["admin", "dashboard"]), "dashboard stats")
            .await
    }

    async fn list_accounts(
        &self,
        token: &str,
        page: PageRequest,
    ) -> Result<Paged<Account>, ApiError> {
        self.fetch_paged(self.get(token, &["admin", "accounts"]).query(&page), "accounts")
            .await
    }

    async fn toggle_account_status(
        &self,
        token: &str,
        account_id: &str,
    ) -> Result<Account, ApiError> {
        self.fetch(
            self.put(token, &["admin", "accounts", account_id, "status"]),
            "account",
        )
        .await
    }

    async fn list_car_verifications(
        &self,
        token: &str,
        page: PageRequest,
    ) -> Result<Paged<CarVerification>, ApiError> {
        self.fetch_paged(
            self.get(token, &["admin", "cars", "verifications"]).query(&page),
            "car verifications",
        )
        .await
    }

    async fn toggle_car_verification(
        &self,
        token: &str,
        car_id: &str,
    ) -> Result<CarVerification, ApiError> {
        self.fetch(
            self.put(token, &["admin", "cars", car_id, "verify"]),
            "car verification",
        )
        .await
    }
}
