pub mod bill;
pub mod booking;
pub mod roster;

pub use bill::{Bill, BillStatus, BillingBreakdown, BillingInputs, Payment};
pub use booking::{AssignmentSnapshot, Booking, BookingEvent, BookingStatus, TripType};
pub use roster::{Agent, Client, Driver, Vehicle};
