//! # Domain Ports
//!
//! Traits at the edges of the session subsystem. Concrete adapters live in
//! the infrastructure layer; tests substitute fakes.

mod activity;
mod clock;
mod navigator;
mod storage;
mod transport;

pub use activity::{ActivityHandler, ActivitySource, Subscription};
pub use clock::Clock;
pub use navigator::Navigator;
pub use storage::SessionStore;
pub use transport::{
    ApiRequest, ApiResponse, Method, RequestBody, Transport, TransportError, DEFAULT_TIMEOUT,
};

#[cfg(test)]
pub use transport::MockTransport;
