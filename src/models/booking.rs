use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Location;

/// A booking record as returned by the rental API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    #[serde(default)]
    pub booking_number: Option<String>,
    pub car_id: String,
    #[serde(default)]
    pub driver_id: Option<String>,
    pub status: BookingStatus,
    pub pickup_date: DateTime<Utc>,
    pub return_date: DateTime<Utc>,
    #[serde(default)]
    pub pickup_location: Location,
    #[serde(default)]
    pub dropoff_location: Location,
    #[serde(default)]
    pub payment_type: Option<PaymentType>,
    #[serde(default)]
    pub deposit: Option<i64>,
    #[serde(default)]
    pub total_amount: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    PendingDeposit,
    Confirmed,
    InProgress,
    PendingPayment,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::PendingDeposit => "pending_deposit",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::PendingPayment => "pending_payment",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Unknown => "unknown",
        }
    }

    pub fn is_cancellable(&self) -> bool {
        matches!(self, BookingStatus::PendingDeposit | BookingStatus::Confirmed)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    #[default]
    Cash,
    Wallet,
    BankTransfer,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cash => "cash",
            PaymentType::Wallet => "wallet",
            PaymentType::BankTransfer => "bank_transfer",
        }
    }
}
