use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Pagination;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub balance: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    TopUp,
    Withdraw,
    PayDeposit,
    ReceiveDeposit,
    RefundDeposit,
    OffsetFinalPayment,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransaction {
    pub id: String,
    pub amount: i64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub booking_number: Option<String>,
    #[serde(default)]
    pub car_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// History filter: inclusive date range plus free-text search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl TransactionQuery {
    pub fn first_page() -> Self {
        Self {
            page_number: Some(1),
            page_size: Some(10),
            ..Self::default()
        }
    }

    pub fn normalized(mut self) -> Self {
        if let (Some(from), Some(to)) = (self.from_date, self.to_date) {
            if from > to {
                self.from_date = Some(to);
                self.to_date = Some(from);
            }
        }
        self.search = self
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self.page_number = Some(self.page_number.unwrap_or(1).max(1));
        self.page_size = Some(self.page_size.unwrap_or(10).clamp(1, 50));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletMutation {
    TopUp,
    Withdraw,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAmountRequest {
    pub amount: i64,
}

/// Last known balance and first page of history for one caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSnapshot {
    pub wallet: Wallet,
    pub transactions: Vec<WalletTransaction>,
    pub pagination: Option<Pagination>,
    pub refreshed_at: DateTime<Utc>,
}

impl WalletSnapshot {
    pub fn is_fresh(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        now - self.refreshed_at <= max_age
    }
}
