//! Stop type: a location with times and a platform.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::Location;

/// A stop along a public leg.
///
/// Carries planned and (where the feed provides them) predicted times.
/// Boundary stops of a leg have one side only: the first stop a
/// departure, the last an arrival. Intermediate stops may have both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stop {
    /// Where this stop is.
    pub location: Location,
    /// Planned arrival time.
    pub planned_arrival: Option<NaiveDateTime>,
    /// Predicted (real-time) arrival time.
    pub predicted_arrival: Option<NaiveDateTime>,
    /// Planned departure time.
    pub planned_departure: Option<NaiveDateTime>,
    /// Predicted (real-time) departure time.
    pub predicted_departure: Option<NaiveDateTime>,
    /// Platform / bay label, if known.
    pub position: Option<String>,
}

impl Stop {
    /// Creates a stop with no times.
    pub fn new(location: Location) -> Self {
        Self {
            location,
            planned_arrival: None,
            predicted_arrival: None,
            planned_departure: None,
            predicted_departure: None,
            position: None,
        }
    }

    /// Best available arrival time: predicted when present, else planned.
    pub fn arrival_time(&self) -> Option<NaiveDateTime> {
        self.predicted_arrival.or(self.planned_arrival)
    }

    /// Best available departure time: predicted when present, else planned.
    pub fn departure_time(&self) -> Option<NaiveDateTime> {
        self.predicted_departure.or(self.planned_departure)
    }
}
