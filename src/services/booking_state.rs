use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::occupancy::rental_days;
use crate::models::{Location, PaymentType, UserProfile};
use crate::services::validation::ValidationErrors;

/// Query parameters a wizard is opened with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedParams {
    pub car_id: String,
    #[serde(default)]
    pub pickup_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub return_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pickup_province: Option<String>,
    #[serde(default)]
    pub dropoff_province: Option<String>,
}

/// The draft booking threaded through the wizard steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingState {
    pub car_id: String,
    pub driver_id: Option<String>,
    pub pickup_at: Option<DateTime<Utc>>,
    pub return_at: Option<DateTime<Utc>>,
    pub pickup_location: Location,
    pub dropoff_location: Location,
    /// 0 until both dates are chosen.
    pub rental_days: i64,
    pub payment_type: Option<PaymentType>,
    pub deposit: Option<i64>,
    pub driver_name: Option<String>,
    pub driver_dob: Option<NaiveDate>,
    pub driver_email: Option<String>,
    pub driver_phone: Option<String>,
    pub driver_national_id: Option<String>,
    pub driver_license: Option<String>,
    pub driver_address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripUpdate {
    #[serde(default)]
    pub pickup_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub return_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pickup_location: Option<Location>,
    #[serde(default)]
    pub dropoff_location: Option<Location>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverUpdate {
    #[serde(default)]
    pub driver_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dob: Option<NaiveDate>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub national_id: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentUpdate {
    #[serde(default)]
    pub payment_type: Option<PaymentType>,
    #[serde(default)]
    pub deposit: Option<i64>,
}

/// A partial update from one wizard step. Absent fields leave the state alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum BookingUpdate {
    Trip(TripUpdate),
    Driver(DriverUpdate),
    Payment(PaymentUpdate),
}

impl BookingUpdate {
    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match self {
            BookingUpdate::Trip(_) => {}
            BookingUpdate::Driver(driver) => {
                if let Some(name) = &driver.name {
                    if name.trim().is_empty() {
                        errors.add("driver_name", "Name cannot be blank.");
                    }
                }
                if let Some(email) = &driver.email {
                    if !is_plausible_email(email) {
                        errors.add("driver_email", "Please enter a valid email address.");
                    }
                }
                if let Some(phone) = &driver.phone {
                    if !is_plausible_phone(phone) {
                        errors.add("driver_phone", "Please enter a valid phone number.");
                    }
                }
                if let Some(dob) = driver.dob {
                    if dob > today {
                        errors.add("driver_dob", "Date of birth cannot be in the future.");
                    }
                }
            }
            BookingUpdate::Payment(payment) => {
                if payment.deposit.is_some_and(|d| d < 0) {
                    errors.add("deposit", "Deposit cannot be negative.");
                }
            }
        }
        errors.into_result()
    }
}

pub(crate) fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

pub(crate) fn is_plausible_phone(phone: &str) -> bool {
    let digits = phone.trim().strip_prefix('+').unwrap_or(phone.trim());
    let digits: String = digits.chars().filter(|c| *c != ' ').collect();
    (9..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

fn is_unset(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).map_or(true, str::is_empty)
}

/// Fills `slot` from `source` when the slot has never been populated.
fn backfill(slot: &mut Option<String>, source: &Option<String>) -> bool {
    if is_unset(slot) && !is_unset(source) {
        *slot = source.clone();
        true
    } else {
        false
    }
}

impl BookingState {
    pub fn seed(params: SeedParams) -> Self {
        let mut state = Self {
            car_id: params.car_id,
            pickup_at: params.pickup_at,
            return_at: params.return_at,
            pickup_location: params
                .pickup_province
                .as_deref()
                .map(Location::in_province)
                .unwrap_or_default(),
            dropoff_location: params
                .dropoff_province
                .as_deref()
                .map(Location::in_province)
                .unwrap_or_default(),
            ..Self::default()
        };
        state.resync_days();
        state
    }

    pub fn apply(&mut self, update: BookingUpdate) {
        match update {
            BookingUpdate::Trip(trip) => {
                if let Some(pickup) = trip.pickup_at {
                    self.pickup_at = Some(pickup);
                }
                if let Some(ret) = trip.return_at {
                    self.return_at = Some(ret);
                }
                if let Some(location) = trip.pickup_location {
                    self.pickup_location = location;
                }
                if let Some(location) = trip.dropoff_location {
                    self.dropoff_location = location;
                }
            }
            BookingUpdate::Driver(driver) => {
                if driver.driver_id.is_some() {
                    self.driver_id = driver.driver_id;
                }
                if driver.name.is_some() {
                    self.driver_name = driver.name;
                }
                if driver.dob.is_some() {
                    self.driver_dob = driver.dob;
                }
                if driver.email.is_some() {
                    self.driver_email = driver.email;
                }
                if driver.phone.is_some() {
                    self.driver_phone = driver.phone;
                }
                if driver.national_id.is_some() {
                    self.driver_national_id = driver.national_id;
                }
                if driver.license.is_some() {
                    self.driver_license = driver.license;
                }
                if driver.address.is_some() {
                    self.driver_address = driver.address;
                }
            }
            BookingUpdate::Payment(payment) => {
                if payment.payment_type.is_some() {
                    self.payment_type = payment.payment_type;
                }
                if payment.deposit.is_some() {
                    self.deposit = payment.deposit;
                }
            }
        }
        self.resync_days();
    }

    /// Copies profile details into driver fields the user has not filled in
    /// yet. Returns how many fields were filled.
    pub fn backfill_driver(&mut self, profile: &UserProfile) -> usize {
        let mut filled = 0;
        if self.driver_id.is_none() {
            self.driver_id = Some(profile.id.clone());
            filled += 1;
        }
        if self.driver_dob.is_none() && profile.dob.is_some() {
            self.driver_dob = profile.dob;
            filled += 1;
        }
        let pairs = [
            (&mut self.driver_name, &profile.name),
            (&mut self.driver_email, &profile.email),
            (&mut self.driver_phone, &profile.phone),
            (&mut self.driver_national_id, &profile.national_id),
            (&mut self.driver_license, &profile.driving_license),
            (&mut self.driver_address, &profile.address),
        ];
        for (slot, source) in pairs {
            if backfill(slot, source) {
                filled += 1;
            }
        }
        filled
    }

    pub fn resync_days(&mut self) {
        self.rental_days = match (self.pickup_at, self.return_at) {
            (Some(pickup), Some(ret)) => rental_days(pickup, ret),
            _ => 0,
        };
    }

    /// Seeds the deposit from the car listing unless one was chosen already.
    pub fn default_deposit(&mut self, deposit: Option<i64>) {
        if self.deposit.is_none() {
            self.deposit = deposit;
        }
    }
}
