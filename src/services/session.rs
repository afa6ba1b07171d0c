use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::occupancy::max_return_date;
use crate::models::{Booking, CarDetail, Loadable, OccupiedDateRange, UserProfile};
use crate::services::api::{ApiError, RentalApi};
use crate::services::booking_state::{BookingState, BookingUpdate, SeedParams};
use crate::services::checkout::{self, DriverDetailsForm, SubmitError};
use crate::services::pricing::PaymentSummary;
use crate::services::validation::{self, validate_trip, ValidationErrors};
use crate::services::wizard::{Direction, Step, Wizard};

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("validation failed")]
    Validation(ValidationErrors),

    #[error("{0} is not loaded yet")]
    NotReady(&'static str),

    #[error("confirm the booking to continue")]
    ConfirmRequired,

    #[error("confirm is only available on the checkout step")]
    WrongStep,

    #[error("this booking has already been submitted")]
    AlreadySubmitted,

    #[error(transparent)]
    Submit(ApiError),
}

/// One customer's pass through the booking wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardSession {
    pub id: String,
    /// Profile id of the user who opened the session; only they may touch it.
    pub owner_id: String,
    pub state: BookingState,
    pub wizard: Wizard,
    pub car: Loadable<CarDetail>,
    pub user: Loadable<UserProfile>,
    pub occupied: Loadable<Vec<OccupiedDateRange>>,
    /// Last submission failure, shown on the checkout step.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepInfo {
    pub id: Step,
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepContent {
    Loading {
        waiting_for: &'static str,
    },
    NotFound {
        missing: &'static str,
    },
    Selection {
        car: CarDetail,
        occupied: Option<Vec<OccupiedDateRange>>,
        max_return_date: Option<NaiveDate>,
        rental_days: i64,
    },
    Summary {
        car: CarDetail,
        user: UserProfile,
        payment: PaymentSummary,
    },
    Checkout {
        payment: PaymentSummary,
        driver_errors: ValidationErrors,
    },
    Confirmation {
        booking: Booking,
    },
    Placeholder {
        message: &'static str,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: String,
    pub step: Step,
    pub direction: Direction,
    pub title: &'static str,
    pub description: &'static str,
    pub steps: Vec<StepInfo>,
    pub state: BookingState,
    pub error: Option<String>,
    pub content: StepContent,
}

impl WizardSession {
    pub fn new(id: String, owner_id: String, seed: SeedParams) -> Self {
        Self {
            id,
            owner_id,
            state: BookingState::seed(seed),
            wizard: Wizard::new(),
            car: Loadable::Loading,
            user: Loadable::Loading,
            occupied: Loadable::Loading,
            error: None,
        }
    }

    /// Fetches whatever is still unresolved. Each call is isolated: one
    /// failure leaves the others untouched.
    pub async fn hydrate(&mut self, api: &dyn RentalApi, token: &str) {
        if self.car.ready().is_none() {
            self.car = self.resolve("car", api.get_car(token, &self.state.car_id).await);
            if let Loadable::Ready(car) = &self.car {
                self.state.default_deposit(car.deposit);
            }
        }

        if self.car.ready().is_some() && self.occupied.ready().is_none() {
            self.occupied = match api.get_car_calendar(token, &self.state.car_id).await {
                Err(ApiError::NotFound(_)) => Loadable::Ready(Vec::new()),
                result => self.resolve("calendar", result),
            };
        }

        if self.user.ready().is_none() {
            self.user = match api.get_profile(token).await {
                Err(ApiError::Unauthorized) => Loadable::NotFound,
                result => self.resolve("user", result),
            };
        }

        if let Loadable::Ready(user) = &self.user {
            let filled = self.state.backfill_driver(user);
            if filled > 0 {
                tracing::debug!(session = %self.id, filled, "backfilled driver details");
            }
        }
    }

    fn resolve<T>(&self, what: &'static str, result: Result<T, ApiError>) -> Loadable<T> {
        match result {
            Ok(value) => Loadable::Ready(value),
            Err(ApiError::NotFound(_)) => Loadable::NotFound,
            Err(e) => {
                tracing::warn!(session = %self.id, what, error = %e, "fetch failed");
                Loadable::Loading
            }
        }
    }

    pub fn update(&mut self, update: BookingUpdate, today: NaiveDate) -> Result<(), WizardError> {
        if self.wizard.created.is_some() {
            return Err(WizardError::AlreadySubmitted);
        }
        update.validate(today).map_err(WizardError::Validation)?;
        self.state.apply(update);
        Ok(())
    }

    fn check_trip(&self) -> Result<(), WizardError> {
        if self.car.ready().is_none() {
            return Err(WizardError::NotReady("car"));
        }
        let occupied = self
            .occupied
            .ready()
            .ok_or(WizardError::NotReady("calendar"))?;
        validate_trip(&self.state, occupied).map_err(WizardError::Validation)
    }

    /// What must hold before the user may move forward past `step`.
    fn check_leaving(&self, step: Step) -> Result<(), WizardError> {
        match step {
            Step::Selection => self.check_trip(),
            Step::Summary => match self.user.ready() {
                Some(_) => Ok(()),
                None => Err(WizardError::NotReady("user profile")),
            },
            Step::Checkout if self.wizard.created.is_none() => Err(WizardError::ConfirmRequired),
            Step::Checkout | Step::Confirmation => Ok(()),
        }
    }

    pub fn advance(&mut self) -> Result<(), WizardError> {
        self.check_leaving(self.wizard.step)?;
        self.wizard.next(None);
        Ok(())
    }

    pub fn back(&mut self) {
        self.wizard.prev();
    }

    /// Backward jumps are free. A forward jump must pass every step it skips,
    /// exactly as repeated `advance` calls would.
    pub fn jump(&mut self, target: Step) -> Result<(), WizardError> {
        for step in Step::ALL {
            if step >= self.wizard.step && step < target {
                self.check_leaving(step)?;
            }
        }
        self.wizard.go_to(target);
        Ok(())
    }

    /// Validates the checkout form and submits once. A failed call keeps the
    /// user on the checkout step with `error` set; confirming again retries.
    pub async fn confirm(&mut self, api: &dyn RentalApi, token: &str) -> Result<(), WizardError> {
        if self.wizard.created.is_some() {
            return Err(WizardError::AlreadySubmitted);
        }
        if self.wizard.step != Step::Checkout {
            return Err(WizardError::WrongStep);
        }

        let form = DriverDetailsForm::new(&self.state);
        let field_errors = form.errors();
        let result = checkout::submit(api, token, &self.state, &form).await;

        match result {
            Ok(booking) => {
                tracing::info!(session = %self.id, booking_id = %booking.id, "booking confirmed");
                self.error = None;
                self.wizard.next(Some(booking));
                Ok(())
            }
            Err(SubmitError::InvalidForm) => Err(WizardError::Validation(field_errors)),
            Err(SubmitError::IncompleteTrip) => {
                let mut errors = ValidationErrors::new();
                if self.state.pickup_at.is_none() {
                    errors.add(validation::PICKUP_AT, "Please select a pick-up date.");
                }
                if self.state.return_at.is_none() {
                    errors.add(validation::RETURN_AT, "Please select a return date.");
                }
                Err(WizardError::Validation(errors))
            }
            Err(SubmitError::Api(e)) => {
                tracing::warn!(session = %self.id, error = %e, "booking submission failed");
                self.error = Some(format!("Could not place the booking: {e}"));
                Err(WizardError::Submit(e))
            }
        }
    }

    pub fn view(&self) -> SessionView {
        let step = self.wizard.step;
        SessionView {
            id: self.id.clone(),
            step,
            direction: self.wizard.direction,
            title: step.title(),
            description: step.description(),
            steps: Step::ALL
                .iter()
                .map(|s| StepInfo {
                    id: *s,
                    title: s.title(),
                    description: s.description(),
                })
                .collect(),
            state: self.state.clone(),
            error: self.error.clone(),
            content: self.content(),
        }
    }

    fn content(&self) -> StepContent {
        match self.wizard.step {
            Step::Selection => match &self.car {
                Loadable::Ready(car) => {
                    let occupied = self.occupied.ready().cloned();
                    let max_return_date = match (self.state.pickup_at, occupied.as_deref()) {
                        (Some(pickup), Some(ranges)) => max_return_date(pickup, ranges),
                        _ => None,
                    };
                    StepContent::Selection {
                        car: car.clone(),
                        occupied,
                        max_return_date,
                        rental_days: self.state.rental_days,
                    }
                }
                Loadable::Loading => StepContent::Loading { waiting_for: "car" },
                Loadable::NotFound => StepContent::NotFound { missing: "car" },
            },
            Step::Summary => match (&self.car, &self.user) {
                (Loadable::Ready(car), Loadable::Ready(user)) => StepContent::Summary {
                    car: car.clone(),
                    user: user.clone(),
                    payment: PaymentSummary::compute(Some(car), &self.state),
                },
                (Loadable::NotFound, _) => StepContent::NotFound { missing: "car" },
                (_, Loadable::NotFound) => StepContent::NotFound { missing: "user" },
                (Loadable::Loading, _) => StepContent::Loading { waiting_for: "car" },
                (_, Loadable::Loading) => StepContent::Loading { waiting_for: "user" },
            },
            Step::Checkout => StepContent::Checkout {
                payment: PaymentSummary::compute(self.car.ready(), &self.state),
                driver_errors: DriverDetailsForm::new(&self.state).errors(),
            },
            Step::Confirmation => match &self.wizard.created {
                Some(booking) => StepContent::Confirmation {
                    booking: booking.clone(),
                },
                None => StepContent::Placeholder {
                    message: "No booking has been placed yet.",
                },
            },
        }
    }
}

/// Date used to validate dates of birth.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
