//! Location type and the identified-location invariant.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Point;

/// What kind of place a [`Location`] denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationKind {
    /// A transit station or stop.
    Station,
    /// A point of interest.
    Poi,
    /// A street address.
    Address,
    /// Any kind; used in suggest queries that don't restrict the type.
    Any,
    /// A bare coordinate with no backend identity.
    Coordinate,
}

/// A place a trip can start at, pass through, or end at.
///
/// A `Station` location carrying an `id` is *identified*: it can be used
/// directly in backend queries. Unidentified locations (free text, bare
/// coordinates) must be resolved through suggest/autocomplete first.
///
/// # Examples
///
/// ```
/// use transit_client::domain::Location;
///
/// let station = Location::station("900100003", "Alexanderplatz");
/// assert!(station.is_identified());
///
/// let free_text = Location::any_name("Alexanderpl");
/// assert!(!free_text.is_identified());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Kind of place.
    pub kind: LocationKind,
    /// Backend-assigned identifier, if any.
    pub id: Option<String>,
    /// Coordinate, if known.
    pub coord: Option<Point>,
    /// Containing place (city/borough), if the backend distinguishes it.
    pub place: Option<String>,
    /// Display name.
    pub name: Option<String>,
}

impl Location {
    /// Creates an identified station location.
    pub fn station(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: LocationKind::Station,
            id: Some(id.into()),
            coord: None,
            place: None,
            name: Some(name.into()),
        }
    }

    /// Creates a bare coordinate location.
    pub fn coordinate(coord: Point) -> Self {
        Self {
            kind: LocationKind::Coordinate,
            id: None,
            coord: Some(coord),
            place: None,
            name: None,
        }
    }

    /// Creates an unidentified free-text location of any kind.
    pub fn any_name(name: impl Into<String>) -> Self {
        Self {
            kind: LocationKind::Any,
            id: None,
            coord: None,
            place: None,
            name: Some(name.into()),
        }
    }

    /// Attaches a coordinate.
    pub fn with_coord(mut self, coord: Point) -> Self {
        self.coord = Some(coord);
        self
    }

    /// Attaches a containing place name.
    pub fn with_place(mut self, place: impl Into<String>) -> Self {
        self.place = Some(place.into());
        self
    }

    /// Whether this location can be used directly in a backend query.
    ///
    /// Only stations with a backend id qualify; everything else has to go
    /// through the suggest step first.
    pub fn is_identified(&self) -> bool {
        self.kind == LocationKind::Station && self.id.is_some()
    }

    /// Whether this location carries a coordinate.
    pub fn has_coord(&self) -> bool {
        self.coord.is_some()
    }

    /// Whether this location denotes the same place as `other`.
    ///
    /// Compares ids when both locations are identified, otherwise falls
    /// back to coordinate proximity within `epsilon_m` metres.
    pub fn same_place(&self, other: &Location, epsilon_m: f64) -> bool {
        if self.is_identified() && other.is_identified() {
            return self.id == other.id;
        }
        match (self.coord, other.coord) {
            (Some(a), Some(b)) => a.distance_m(&b) <= epsilon_m,
            _ => false,
        }
    }

    /// Display label: "place, name", or whichever part exists.
    pub fn unique_name(&self) -> String {
        match (&self.place, &self.name) {
            (Some(place), Some(name)) => format!("{place}, {name}"),
            (None, Some(name)) => name.clone(),
            (Some(place), None) => place.clone(),
            (None, None) => self
                .coord
                .map(|c| c.to_string())
                .unwrap_or_else(|| "?".to_string()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.unique_name())
    }
}
