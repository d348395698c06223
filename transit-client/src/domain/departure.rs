//! Departure board types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Line, Location};

/// One departure from a station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Departure {
    /// Scheduled departure time.
    pub planned_time: NaiveDateTime,
    /// Real-time predicted departure, when a live feed supplied one.
    pub predicted_time: Option<NaiveDateTime>,
    /// The departing line.
    pub line: Line,
    /// Platform / bay label, if known.
    pub position: Option<String>,
    /// Headsign destination.
    pub destination: Location,
}

impl Departure {
    /// Best available departure time: predicted when present, else planned.
    pub fn time(&self) -> NaiveDateTime {
        self.predicted_time.unwrap_or(self.planned_time)
    }
}

/// A line and the destination it is headed to, as served at a station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineDestination {
    /// The serving line.
    pub line: Line,
    /// Its destination, when known.
    pub destination: Option<Location>,
}

/// All departures at one station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationDepartures {
    /// The station these departures belong to.
    pub location: Location,
    /// Departures, in board order.
    pub departures: Vec<Departure>,
    /// Lines serving this station, for display.
    pub lines: Vec<LineDestination>,
}
