//! # sonar-providers
//!
//! HTTP clients for the four provider contracts, plus the lenient JSON
//! repair parser for near-JSON LLM output. Every client implements the
//! corresponding trait from `sonar_core::traits`, carries its own per-call
//! timeout, and reports `is_configured()` so the route table can downgrade
//! without issuing doomed calls.

mod client;
mod fast;
mod internal;
mod reasoning;
pub mod repair;
mod web;

pub use client::ProviderClient;
pub use fast::FastClient;
pub use internal::IntelClient;
pub use reasoning::ReasoningClient;
pub use web::WebClient;
