use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::models::{Booking, Location, PaymentType};
use crate::services::api::{ApiError, RentalApi};
use crate::services::booking_state::{is_plausible_email, is_plausible_phone, BookingState};
use crate::services::validation::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("checkout form is incomplete")]
    InvalidForm,

    #[error("pick-up and return dates are required")]
    IncompleteTrip,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// The checkout step's form. Submission only proceeds when it validates.
pub trait CheckoutForm: Send + Sync {
    fn validate_form(&self) -> bool;
}

/// Driver details collected on the checkout step.
pub struct DriverDetailsForm<'a> {
    state: &'a BookingState,
}

impl<'a> DriverDetailsForm<'a> {
    pub fn new(state: &'a BookingState) -> Self {
        Self { state }
    }

    pub fn errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let required = [
            ("driver_name", &self.state.driver_name, "Please enter the driver's name."),
            ("driver_email", &self.state.driver_email, "Please enter an email address."),
            ("driver_phone", &self.state.driver_phone, "Please enter a phone number."),
            (
                "driver_national_id",
                &self.state.driver_national_id,
                "Please enter a national ID number.",
            ),
        ];
        for (field, value, message) in required {
            if value.as_deref().map(str::trim).unwrap_or("").is_empty() {
                errors.add(field, message);
            }
        }
        if let Some(email) = self.state.driver_email.as_deref() {
            if !email.trim().is_empty() && !is_plausible_email(email) {
                errors.add("driver_email", "Please enter a valid email address.");
            }
        }
        if let Some(phone) = self.state.driver_phone.as_deref() {
            if !phone.trim().is_empty() && !is_plausible_phone(phone) {
                errors.add("driver_phone", "Please enter a valid phone number.");
            }
        }
        errors
    }
}

impl CheckoutForm for DriverDetailsForm<'_> {
    fn validate_form(&self) -> bool {
        self.errors().is_empty()
    }
}

/// Body of the create-booking call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub car_id: String,
    pub driver_id: Option<String>,
    pub pickup_date: String,
    pub return_date: String,
    pub pickup_location: Location,
    pub dropoff_location: Location,
    pub payment_type: PaymentType,
    pub deposit: i64,
    pub driver_name: Option<String>,
    pub driver_dob: Option<String>,
    pub driver_email: Option<String>,
    pub driver_phone: Option<String>,
    pub driver_national_id: Option<String>,
    pub driver_license: Option<String>,
    pub driver_address: Option<String>,
}

impl CreateBookingRequest {
    pub fn from_state(state: &BookingState) -> Result<Self, SubmitError> {
        let (Some(pickup), Some(ret)) = (state.pickup_at, state.return_at) else {
            return Err(SubmitError::IncompleteTrip);
        };

        Ok(Self {
            car_id: state.car_id.clone(),
            driver_id: state.driver_id.clone(),
            pickup_date: pickup.to_rfc3339_opts(SecondsFormat::Millis, true),
            return_date: ret.to_rfc3339_opts(SecondsFormat::Millis, true),
            pickup_location: state.pickup_location.clone(),
            dropoff_location: state.dropoff_location.clone(),
            payment_type: state.payment_type.unwrap_or_default(),
            deposit: state.deposit.unwrap_or(0),
            driver_name: state.driver_name.clone(),
            driver_dob: state.driver_dob.map(|dob| dob.format("%Y-%m-%d").to_string()),
            driver_email: state.driver_email.clone(),
            driver_phone: state.driver_phone.clone(),
            driver_national_id: state.driver_national_id.clone(),
            driver_license: state.driver_license.clone(),
            driver_address: state.driver_address.clone(),
        })
    }
}

/// Validates the form and issues exactly one create-booking call.
pub async fn submit(
    api: &dyn RentalApi,
    token: &str,
    state: &BookingState,
    form: &dyn CheckoutForm,
) -> Result<Booking, SubmitError> {
    if !form.validate_form() {
        return Err(SubmitError::InvalidForm);
    }
    let request = CreateBookingRequest::from_state(state)?;

    tracing::info!(
        car_id = %request.car_id,
        days = state.rental_days,
        payment_type = request.payment_type.as_str(),
        "submitting booking"
    );
    let booking = api.create_booking(token, &request).await?;
    tracing::info!(booking_id = %booking.id, "booking created");
    Ok(booking)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn filled_state() -> BookingState {
        BookingState {
            car_id: "car-1".to_string(),
            pickup_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()),
            return_at: Some(Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap()),
            pickup_location: Location::in_province("Ha Noi"),
            dropoff_location: Location::in_province("Ha Noi"),
            rental_days: 4,
            driver_name: Some("Le C".to_string()),
            driver_email: Some("c@example.com".to_string()),
            driver_phone: Some("0987654321".to_string()),
            driver_national_id: Some("001099000123".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_payload_defaults() {
        let request = CreateBookingRequest::from_state(&filled_state()).unwrap();
        assert_eq!(request.payment_type, PaymentType::Cash);
        assert_eq!(request.deposit, 0);
        assert_eq!(request.driver_dob, None);
        assert_eq!(request.pickup_date, "2024-03-01T09:30:00.000Z");
        assert_eq!(request.return_date, "2024-03-05T09:30:00.000Z");
    }

    #[test]
    fn test_payload_wire_shape() {
        let mut state = filled_state();
        state.driver_dob = NaiveDate::from_ymd_opt(1995, 7, 14);
        state.payment_type = Some(PaymentType::Wallet);
        state.deposit = Some(5_000_000);

        let json = serde_json::to_value(CreateBookingRequest::from_state(&state).unwrap()).unwrap();
        assert_eq!(json["carId"], "car-1");
        assert_eq!(json["driverDob"], "1995-07-14");
        assert_eq!(json["paymentType"], "wallet");
        assert_eq!(json["deposit"], 5_000_000);
        assert_eq!(json["pickupLocation"]["province"], "Ha Noi");
        assert!(json["driverId"].is_null());
    }

    #[test]
    fn test_payload_requires_dates() {
        let mut state = filled_state();
        state.return_at = None;
        assert!(matches!(
            CreateBookingRequest::from_state(&state),
            Err(SubmitError::IncompleteTrip)
        ));
    }

    #[test]
    fn test_driver_form_reports_missing_fields() {
        let state = BookingState {
            driver_email: Some("nope".to_string()),
            ..Default::default()
        };
        let form = DriverDetailsForm::new(&state);
        let errors = form.errors();
        assert!(!form.validate_form());
        assert!(errors.contains("driver_name"));
        assert_eq!(
            errors.get("driver_email"),
            Some("Please enter a valid email address.")
        );
        assert!(errors.contains("driver_phone"));
        assert!(errors.contains("driver_national_id"));
    }

    #[test]
    fn test_driver_form_accepts_complete_details() {
        let state = filled_state();
        assert!(DriverDetailsForm::new(&state).validate_form());
    }
}
