use serde::{Deserialize, Serialize};

use crate::models::{CarDetail, PaymentType};
use crate::services::booking_state::BookingState;

/// Figures shown on the summary and checkout steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub base_price: Option<i64>,
    pub rental_days: i64,
    /// `None` when the car has no price yet; the total is then unknown
    /// rather than zero or negative.
    pub total_amount: Option<i64>,
    pub deposit: i64,
    pub payment_type: PaymentType,
}

impl PaymentSummary {
    pub fn compute(car: Option<&CarDetail>, state: &BookingState) -> Self {
        let base_price = car.and_then(|c| c.base_price);
        let total_amount = base_price.and_then(|price| price.checked_mul(state.rental_days));
        let deposit = state
            .deposit
            .or_else(|| car.and_then(|c| c.deposit))
            .unwrap_or(0);

        Self {
            base_price,
            rental_days: state.rental_days,
            total_amount,
            deposit,
            payment_type: state.payment_type.unwrap_or_default(),
        }
    }
}
