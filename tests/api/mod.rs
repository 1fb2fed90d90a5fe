//! Client behaviour tests against a scripted API.

mod auth_tests;
mod interceptor_tests;
mod session_tests;
