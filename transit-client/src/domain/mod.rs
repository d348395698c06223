//! Canonical domain model.
//!
//! Normalized, backend-agnostic representations of locations, lines,
//! stops, legs, trips, and departures. All types validate their
//! invariants at construction and are immutable afterwards; code
//! receiving them can trust their validity.

mod departure;
mod error;
mod leg;
mod line;
mod location;
mod point;
mod product;
mod stop;
mod time;
mod trip;

pub use departure::{Departure, LineDestination, StationDepartures};
pub use error::DomainError;
pub use leg::{IndividualLeg, IndividualMode, Leg, PublicLeg};
pub use line::{Line, Style};
pub use location::{Location, LocationKind};
pub use point::Point;
pub use product::Product;
pub use stop::Stop;
pub use time::{TimeError, from_day_seconds, from_epoch_seconds, parse_iso_datetime};
pub use trip::{Fare, Trip};
