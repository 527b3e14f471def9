pub mod availability;
pub mod booking;
pub mod rating;
pub mod user;

pub use availability::{AvailabilitySlot, DayOfWeek};
pub use booking::{Booking, BookingStatus};
pub use rating::Rating;
pub use user::{Role, TherapistStatus, User};
