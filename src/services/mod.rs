pub mod api;
pub mod booking_state;
pub mod checkout;
pub mod pricing;
pub mod session;
pub mod validation;
pub mod wallet;
pub mod wizard;
