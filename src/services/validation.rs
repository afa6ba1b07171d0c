use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::occupancy::{is_range_occupied, max_return_date};
use crate::models::OccupiedDateRange;
use crate::services::booking_state::BookingState;

pub const PICKUP_AT: &str = "pickup_at";
pub const RETURN_AT: &str = "return_at";
pub const PICKUP_LOCATION: &str = "pickup_location";
pub const DROPOFF_LOCATION: &str = "dropoff_location";

/// Field-scoped form errors, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the first message recorded for a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Gate for leaving the car-selection step.
pub fn validate_trip(
    state: &BookingState,
    occupied: &[OccupiedDateRange],
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    check_dates(state, occupied, &mut errors);

    if !state.pickup_location.has_region() {
        errors.add(PICKUP_LOCATION, "Please select a pick-up location.");
    }
    if !state.dropoff_location.has_region() {
        errors.add(DROPOFF_LOCATION, "Please select a drop-off location.");
    }

    errors.into_result()
}

fn check_dates(state: &BookingState, occupied: &[OccupiedDateRange], errors: &mut ValidationErrors) {
    let (pickup, ret) = match (state.pickup_at, state.return_at) {
        (Some(pickup), Some(ret)) => (pickup, ret),
        (pickup, ret) => {
            if pickup.is_none() {
                errors.add(PICKUP_AT, "Please select a pick-up date.");
            }
            if ret.is_none() {
                errors.add(RETURN_AT, "Please select a return date.");
            }
            return;
        }
    };

    if pickup > ret {
        errors.add(RETURN_AT, "Return date must be after the pick-up date.");
        return;
    }

    if is_range_occupied(pickup, ret, occupied) {
        errors.add(
            RETURN_AT,
            "The selected dates overlap an existing booking for this car.",
        );
        return;
    }

    if let Some(cutoff) = max_return_date(pickup, occupied) {
        let limit = cutoff.succ_opt().unwrap_or(cutoff);
        if ret.date_naive() > limit {
            errors.add(
                RETURN_AT,
                format!(
                    "This car is booked later on; return it by {}.",
                    cutoff.format("%Y-%m-%d")
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;
    use crate::services::booking_state::SeedParams;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn trip(pickup: Option<DateTime<Utc>>, ret: Option<DateTime<Utc>>) -> BookingState {
        let mut state = BookingState::seed(SeedParams {
            car_id: "car-1".to_string(),
            pickup_at: pickup,
            return_at: ret,
            ..Default::default()
        });
        state.pickup_location = Location::in_province("Ho Chi Minh");
        state.dropoff_location = Location::in_province("Ho Chi Minh");
        state
    }

    #[test]
    fn test_free_range_passes() {
        let state = trip(Some(at(2024, 3, 1)), Some(at(2024, 3, 5)));
        assert!(validate_trip(&state, &[]).is_ok());
        assert_eq!(state.rental_days, 4);
    }

    #[test]
    fn test_missing_dates_reported_per_field() {
        let errors = validate_trip(&trip(None, None), &[]).unwrap_err();
        assert_eq!(errors.get(PICKUP_AT), Some("Please select a pick-up date."));
        assert_eq!(errors.get(RETURN_AT), Some("Please select a return date."));

        let errors = validate_trip(&trip(Some(at(2024, 3, 1)), None), &[]).unwrap_err();
        assert!(!errors.contains(PICKUP_AT));
        assert!(errors.contains(RETURN_AT));
    }

    #[test]
    fn test_return_before_pickup() {
        let errors =
            validate_trip(&trip(Some(at(2024, 3, 5)), Some(at(2024, 3, 1))), &[]).unwrap_err();
        assert_eq!(
            errors.get(RETURN_AT),
            Some("Return date must be after the pick-up date.")
        );
    }

    #[test]
    fn test_overlap_blocks() {
        let occupied = vec![OccupiedDateRange::new(at(2024, 3, 3), at(2024, 3, 4))];
        let errors = validate_trip(&trip(Some(at(2024, 3, 1)), Some(at(2024, 3, 5))), &occupied)
            .unwrap_err();
        assert!(errors.get(RETURN_AT).unwrap().contains("overlap"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_return_before_next_booking_passes() {
        let occupied = vec![OccupiedDateRange::new(at(2024, 3, 10), at(2024, 3, 12))];
        let state = trip(Some(at(2024, 3, 1)), Some(at(2024, 3, 9)));
        assert!(validate_trip(&state, &occupied).is_ok());
    }

    #[test]
    fn test_missing_regions_reported_with_dates_ok() {
        let mut state = trip(Some(at(2024, 3, 1)), Some(at(2024, 3, 5)));
        state.pickup_location = Location::default();
        state.dropoff_location = Location {
            province: " ".to_string(),
            district: "District 1".to_string(),
            ward: String::new(),
        };
        let errors = validate_trip(&state, &[]).unwrap_err();
        assert!(errors.contains(PICKUP_LOCATION));
        assert!(errors.contains(DROPOFF_LOCATION));
        assert!(!errors.contains(RETURN_AT));
    }

    #[test]
    fn test_location_errors_accompany_date_errors() {
        let mut state = trip(None, None);
        state.pickup_location = Location::default();
        let errors = validate_trip(&state, &[]).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_first_message_per_field_wins() {
        let mut errors = ValidationErrors::new();
        errors.add(RETURN_AT, "first");
        errors.add(RETURN_AT, "second");
        assert_eq!(errors.get(RETURN_AT), Some("first"));
    }
}
