//! # Domain Layer
//!
//! The session as the client sees it: token claims, the cached profile,
//! lifecycle state, and the ports the lifecycle depends on.
//!
//! ## Structure
//!
//! - **entities**: Claims, UserProfile, Role, SessionState, ActivityKind
//! - **ports**: SessionStore, Clock, Navigator, ActivitySource, Transport
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or application layers
//! - Ports define the contracts adapters implement

pub mod entities;
pub mod ports;

// Re-export commonly used types
pub use entities::*;
pub use ports::*;
