//! # RAG Console Client Library
//!
//! Session handling for the RAG admin console:
//! - REST client that attaches the bearer token and forces logout on 401/403
//! - Activity-driven token refresh with a cooldown gate
//! - Periodic expiry checks against the token's `exp` claim
//!
//! ## Architecture
//!
//! - **Domain Layer**: Entities (claims, profile, session state) and port traits
//! - **Application Layer**: Session context, API client, lifecycle manager
//! - **Infrastructure Layer**: Storage, clocks, activity bus, reqwest transport
//!
//! ## Module Structure
//!
//! ```text
//! rag_console_client/
//! +-- config/         Configuration management
//! +-- domain/         Entities and port traits
//! +-- application/    Session services and DTOs
//! +-- infrastructure/ Adapters for the ports
//! +-- shared/         Errors and validation flattening
//! ```

// Configuration module
pub mod config;

// Domain layer - Entities and ports
pub mod domain;

// Application layer - Session services
pub mod application;

// Infrastructure layer - Port adapters
pub mod infrastructure;

// Shared utilities
pub mod shared;

// Wiring and console loop
pub mod startup;

// Logging setup
pub mod telemetry;
