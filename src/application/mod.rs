//! Application Layer
//!
//! Session services and the data transfer objects exchanged with the API.
//! This layer drives the domain ports; it never touches a concrete adapter.

pub mod services;
pub mod dto;
