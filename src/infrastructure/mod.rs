//! Infrastructure Layer
//!
//! Concrete adapters for the domain ports:
//! - Session storage (in-memory, JSON file)
//! - Clocks (system, tokio-anchored)
//! - Activity signal bus
//! - Navigator
//! - HTTP transport (reqwest)

pub mod activity_bus;
pub mod clock;
pub mod http;
pub mod navigator;
pub mod storage;

pub use activity_bus::ActivityBus;
pub use clock::{SystemClock, TokioClock};
pub use http::ReqwestTransport;
pub use navigator::{ChannelNavigator, LoginRedirect};
pub use storage::{open_store, JsonFileStore, MemoryStore};
