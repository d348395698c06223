//! Backend response DTOs.
//!
//! These types map directly to the JSON documents the journey-planning
//! backends return. They use `Option` liberally because agencies omit
//! fields rather than sending nulls. No validation happens here; the
//! parser module turns these into the canonical domain model.

use serde::Deserialize;

/// A time as it appears on the wire.
///
/// Agencies disagree on the shape: ISO-like strings, epoch seconds, or a
/// service day plus seconds since midnight. The untagged representation
/// lets one DTO absorb all three.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireTime {
    /// `"2024-03-15T10:30:00"` and friends.
    Iso(String),
    /// Seconds since the Unix epoch.
    Epoch(i64),
    /// Service day plus seconds since midnight (may exceed 86400).
    DaySeconds {
        /// Operating day, `YYYY-MM-DD`.
        day: String,
        /// Seconds since midnight of the operating day.
        seconds: i64,
    },
}

/// A backend-signalled error inside a structurally valid document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireError {
    /// Machine-readable code ("INVALID_DATE", "SERVICE_DOWN", ...).
    pub code: String,
    /// Optional human-readable detail.
    pub message: Option<String>,
}

/// A place as it appears inside legs, boards, and location lists.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireLocation {
    /// Backend id, when the place is identified.
    pub id: Option<String>,
    /// Raw display name (may still contain the place prefix).
    pub name: Option<String>,
    /// Location kind token ("station", "poi", "address").
    pub kind: Option<String>,
    /// Latitude in degrees.
    pub lat: Option<f64>,
    /// Longitude in degrees.
    pub lon: Option<f64>,
    /// Relevance rank in suggest responses; lower is better.
    pub rank: Option<u32>,
}

/// A line reference on a leg or departure.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireLine {
    /// Backend line id.
    pub id: Option<String>,
    /// Operating network code.
    pub network: Option<String>,
    /// Backend mode token.
    pub mode: Option<String>,
    /// Numeric route-type code, when the feed is GTFS-flavoured.
    pub route_type: Option<i32>,
    /// Short label ("U1").
    pub label: Option<String>,
    /// Long name.
    pub name: Option<String>,
}

/// A stop on a leg.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireStop {
    /// The place of this stop.
    #[serde(flatten)]
    pub location: WireLocation,
    /// Planned arrival.
    pub arrival: Option<WireTime>,
    /// Predicted arrival.
    pub predicted_arrival: Option<WireTime>,
    /// Planned departure.
    pub departure: Option<WireTime>,
    /// Predicted departure.
    pub predicted_departure: Option<WireTime>,
    /// Platform / bay label.
    pub platform: Option<String>,
}

/// One leg of an itinerary.
///
/// The discriminator is structural: a `line` makes the leg public, an
/// `individual` mode token makes it individual. Neither is a parse
/// failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireLeg {
    /// Operating line; present on public legs.
    pub line: Option<WireLine>,
    /// Individual mode token ("walk", "bike", "car").
    pub individual: Option<String>,
    /// Headsign destination name.
    pub headsign: Option<String>,
    /// Boarding stop.
    pub origin: WireStop,
    /// Alighting stop.
    pub destination: WireStop,
    /// All stops including the boundary ones, in travel order.
    pub stops: Option<Vec<WireStop>>,
    /// Encoded path polyline.
    pub polyline: Option<String>,
    /// Free-text message for this leg.
    pub message: Option<String>,
    /// Distance in metres (individual legs).
    pub distance: Option<u32>,
}

/// One itinerary.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireItinerary {
    /// Backend itinerary id.
    pub id: Option<String>,
    /// Legs in travel order.
    pub legs: Vec<WireLeg>,
    /// Opaque fare strings.
    pub fares: Option<Vec<String>>,
    /// Reported interchange count.
    pub num_changes: Option<u32>,
}

/// Trip-planning response document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripsDocument {
    /// Backend-signalled error, if any.
    pub error: Option<WireError>,
    /// The itinerary collection. Absent is a protocol mismatch; present
    /// but empty is a valid "no trips" outcome.
    pub itineraries: Option<Vec<WireItinerary>>,
    /// Server-issued pagination cursor, for backends that support one.
    pub cursor: Option<String>,
}

/// One departure on a station board.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDeparture {
    /// Scheduled time.
    pub planned: WireTime,
    /// Predicted time, on live boards.
    pub predicted: Option<WireTime>,
    /// The departing line.
    pub line: WireLine,
    /// Platform / bay label.
    pub platform: Option<String>,
    /// Headsign destination name.
    pub destination: Option<String>,
}

/// A station board.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireStationBoard {
    /// The station.
    pub station: WireLocation,
    /// Departures in board order.
    pub departures: Vec<WireDeparture>,
    /// Lines serving the station.
    pub lines: Option<Vec<WireLine>>,
}

/// Departures response document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeparturesDocument {
    /// Backend-signalled error, if any.
    pub error: Option<WireError>,
    /// Boards, one per (equivalent) station.
    pub stations: Option<Vec<WireStationBoard>>,
}

/// Suggest / nearby-locations response document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationsDocument {
    /// Backend-signalled error, if any.
    pub error: Option<WireError>,
    /// Matching locations.
    pub locations: Option<Vec<WireLocation>>,
}
