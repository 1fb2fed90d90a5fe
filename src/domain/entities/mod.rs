//! # Domain Entities
//!
//! Client-side view of the session.
//!
//! - **Claims**: expiry and identity read from the bearer token
//! - **UserProfile / Role**: the signed-in account, cached beside the token
//! - **SessionState**: lifecycle state derived from storage and flags
//! - **ActivityKind**: interaction signals that keep a session fresh

mod activity;
mod profile;
mod session;
mod token;

pub use activity::ActivityKind;
pub use profile::{Role, UserProfile};
pub use session::{keys, ExpiryCheck, LogoutReason, RefreshOutcome, SessionState};
pub use token::{Claims, TokenError};
