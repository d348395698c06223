//! Trip leg types.
//!
//! A `Leg` is one uninterrupted segment of a trip: either a ride on a
//! transit line (`Public`) or a self-propelled connection (`Individual`).
//! The two variants form a sum type with exhaustive matching; there is no
//! third case.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Line, Location, Point, Stop};

/// Self-propelled mode for an individual leg.
///
/// Intentionally small and closed: the parser treats an unrecognized
/// backend token as a hard failure rather than defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndividualMode {
    /// On foot.
    Walk,
    /// By bicycle.
    Bike,
    /// By car.
    Car,
}

/// A ride on a transit line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicLeg {
    /// The operating line.
    pub line: Line,
    /// Headsign destination, if the feed carries one.
    pub destination: Option<Location>,
    /// Boarding stop.
    pub departure_stop: Stop,
    /// Alighting stop.
    pub arrival_stop: Stop,
    /// Stops strictly between boarding and alighting, in travel order.
    pub intermediate_stops: Vec<Stop>,
    /// Path geometry, in travel order.
    pub path: Vec<Point>,
    /// Free-text disruption or information message.
    pub message: Option<String>,
}

/// A walk, ride, or drive between two places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualLeg {
    /// How this leg is travelled.
    pub mode: IndividualMode,
    /// Start place.
    pub departure: Location,
    /// Start time.
    pub departure_time: NaiveDateTime,
    /// End place.
    pub arrival: Location,
    /// End time.
    pub arrival_time: NaiveDateTime,
    /// Path geometry, in travel order.
    pub path: Vec<Point>,
    /// Distance in metres, if the backend reports one.
    pub distance_m: Option<u32>,
}

/// One segment of a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Leg {
    /// Operated by a transit line.
    Public(PublicLeg),
    /// Self-propelled.
    Individual(IndividualLeg),
}

impl Leg {
    /// The place this leg departs from.
    pub fn departure_location(&self) -> &Location {
        match self {
            Leg::Public(leg) => &leg.departure_stop.location,
            Leg::Individual(leg) => &leg.departure,
        }
    }

    /// The place this leg arrives at.
    pub fn arrival_location(&self) -> &Location {
        match self {
            Leg::Public(leg) => &leg.arrival_stop.location,
            Leg::Individual(leg) => &leg.arrival,
        }
    }

    /// Best available departure time.
    ///
    /// Public legs may lack one if the feed omitted stop times.
    pub fn departure_time(&self) -> Option<NaiveDateTime> {
        match self {
            Leg::Public(leg) => leg.departure_stop.departure_time(),
            Leg::Individual(leg) => Some(leg.departure_time),
        }
    }

    /// Best available arrival time.
    pub fn arrival_time(&self) -> Option<NaiveDateTime> {
        match self {
            Leg::Public(leg) => leg.arrival_stop.arrival_time(),
            Leg::Individual(leg) => Some(leg.arrival_time),
        }
    }

    /// Returns the public leg if this is one.
    pub fn as_public(&self) -> Option<&PublicLeg> {
        match self {
            Leg::Public(leg) => Some(leg),
            Leg::Individual(_) => None,
        }
    }

    /// Returns the individual leg if this is one.
    pub fn as_individual(&self) -> Option<&IndividualLeg> {
        match self {
            Leg::Public(_) => None,
            Leg::Individual(leg) => Some(leg),
        }
    }

    /// True for transit-operated legs.
    pub fn is_public(&self) -> bool {
        matches!(self, Leg::Public(_))
    }
}
