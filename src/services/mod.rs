pub mod auth;
pub mod booking;
pub mod scheduling;
