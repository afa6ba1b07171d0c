use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::models::Booking;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    Selection = 1,
    Summary = 2,
    Checkout = 3,
    Confirmation = 4,
}

impl Step {
    pub const ALL: [Step; 4] = [
        Step::Selection,
        Step::Summary,
        Step::Checkout,
        Step::Confirmation,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Step::Selection),
            2 => Some(Step::Summary),
            3 => Some(Step::Checkout),
            4 => Some(Step::Confirmation),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Selection => "Select car",
            Step::Summary => "Booking summary",
            Step::Checkout => "Checkout",
            Step::Confirmation => "Confirmation",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Step::Selection => "Choose pick-up and return dates and locations",
            Step::Summary => "Review the car, the trip and the driver details",
            Step::Checkout => "Pick a payment method and confirm",
            Step::Confirmation => "Your booking has been placed",
        }
    }

    fn following(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    fn preceding(self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }
}

impl Serialize for Step {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.number())
    }
}

impl<'de> Deserialize<'de> for Step {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let n = u8::deserialize(deserializer)?;
        Step::from_number(n)
            .ok_or_else(|| serde::de::Error::custom(format!("no wizard step {n}")))
    }
}

/// Which way the last transition went. Only drives the slide animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn sign(self) -> i8 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

impl Serialize for Direction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.sign())
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(if i8::deserialize(deserializer)? < 0 {
            Direction::Backward
        } else {
            Direction::Forward
        })
    }
}

/// Linear navigation over the four booking steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wizard {
    pub step: Step,
    pub direction: Direction,
    /// Booking returned by the create call; shown on the confirmation step.
    pub created: Option<Booking>,
}

impl Default for Wizard {
    fn default() -> Self {
        Self {
            step: Step::Selection,
            direction: Direction::Forward,
            created: None,
        }
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, payload: Option<Booking>) {
        if let Some(booking) = payload {
            self.created = Some(booking);
        }
        if let Some(step) = self.step.following() {
            self.step = step;
            self.direction = Direction::Forward;
        }
    }

    pub fn prev(&mut self) {
        if let Some(step) = self.step.preceding() {
            self.step = step;
            self.direction = Direction::Backward;
        }
    }

    pub fn go_to(&mut self, step: Step) {
        if step == self.step {
            return;
        }
        self.direction = if step > self.step {
            Direction::Forward
        } else {
            Direction::Backward
        };
        self.step = step;
    }
}
