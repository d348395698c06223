//! Itinerary query and normalization engine.
//!
//! Turns the heterogeneous responses of public-transport journey-planning
//! backends into one canonical model: trip queries, pagination,
//! departure boards with live reconciliation, and location search.

pub mod domain;
pub mod modes;
pub mod pagination;
pub mod parser;
pub mod polyline;
pub mod reconcile;
pub mod service;
pub mod tables;
pub mod wire;
