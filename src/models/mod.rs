pub mod admin;
pub mod booking;
pub mod car;
pub mod envelope;
pub mod loadable;
pub mod location;
pub mod occupancy;
pub mod search;
pub mod user;
pub mod wallet;

pub use admin::{CarVerification, DashboardStats, FeedbackReport, PageRequest};
pub use booking::{Booking, BookingStatus, PaymentType};
pub use car::{CarDetail, CarSummary};
pub use envelope::{Envelope, EnvelopeStatus, Paged, Pagination};
pub use loadable::Loadable;
pub use location::Location;
pub use occupancy::OccupiedDateRange;
pub use search::{CarSearchQuery, SortOrder};
pub use user::{Account, ChangePasswordRequest, Role, UpdateProfileRequest, UserProfile};
pub use wallet::{
    TransactionKind, TransactionQuery, Wallet, WalletAmountRequest, WalletMutation,
    WalletSnapshot, WalletTransaction,
};
