//! Client-side building blocks: the credential holder, the HTTP wrapper and
//! the screen-level flows (role routing, booking selection) with the UI
//! itself left to the embedding application.

pub mod booking;
pub mod http;
pub mod routing;
pub mod token;

pub use booking::{BookingPayload, EditorState, FetchGuard, SelectionError, SlotPicker, SubmitError};
pub use http::{ApiClient, RequestError};
pub use routing::{destination_for_role, Destination};
pub use token::TokenStore;
