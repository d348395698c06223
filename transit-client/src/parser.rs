//! Wire-to-domain conversion.
//!
//! Turns the DTOs in [`crate::wire`] into the canonical model. A parse
//! failure here means the document's structure contradicts the protocol
//! and the whole call is aborted; it is never coerced into an empty
//! result. A structurally valid document with zero itineraries is not a
//! failure.

use chrono::NaiveDateTime;
use tracing::warn;

use crate::domain::{
    Departure, DomainError, Fare, IndividualLeg, IndividualMode, Leg, Line, LineDestination,
    Location, LocationKind, Point, PublicLeg, StationDepartures, Stop, TimeError, Trip,
    from_day_seconds, from_epoch_seconds, parse_iso_datetime,
};
use crate::polyline::{self, PolylineError};
use crate::tables::NetworkTables;
use crate::wire::{
    DeparturesDocument, LocationsDocument, TripsDocument, WireDeparture, WireLeg, WireLine,
    WireLocation, WireStationBoard, WireStop, WireTime,
};

/// Error during wire-to-domain conversion.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    /// The itinerary collection is absent (protocol mismatch; distinct
    /// from present-but-empty).
    #[error("response has no itinerary collection")]
    MissingItineraries,

    /// The station board collection is absent.
    #[error("response has no station board collection")]
    MissingBoards,

    /// The location collection is absent.
    #[error("response has no location collection")]
    MissingLocations,

    /// A leg carries neither a line nor an individual-mode marker.
    #[error("leg is neither public nor individual")]
    UnclassifiableLeg,

    /// An individual-mode token outside the closed walk/bike/car set.
    #[error("unknown individual mode: {0}")]
    UnknownIndividualMode(String),

    /// A required time is missing.
    #[error("missing required time: {0}")]
    MissingTime(&'static str),

    /// A wire time could not be normalized.
    #[error("invalid time: {0}")]
    InvalidTime(#[from] TimeError),

    /// Path geometry could not be decoded.
    #[error("invalid path geometry: {0}")]
    InvalidPath(#[from] PolylineError),

    /// The converted legs violate a domain invariant.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Parses a trip-planning document into canonical trips.
///
/// The returned trips carry the caller-supplied `from`/`to` locations,
/// preserving "the caller asked to go from X to Y" over the backend's
/// own, more granular endpoint representation.
///
/// # Errors
///
/// `MissingItineraries` when the collection is absent; leg-level errors
/// abort the whole call (no partial trip list).
pub fn parse_trips(
    doc: &TripsDocument,
    from: &Location,
    to: &Location,
    tables: &NetworkTables,
) -> Result<Vec<Trip>, ParseError> {
    let itineraries = doc
        .itineraries
        .as_ref()
        .ok_or(ParseError::MissingItineraries)?;

    let mut trips = Vec::with_capacity(itineraries.len());
    for itinerary in itineraries {
        let legs = itinerary
            .legs
            .iter()
            .map(|leg| parse_leg(leg, tables))
            .collect::<Result<Vec<_>, _>>()?;

        let fares = itinerary
            .fares
            .iter()
            .flatten()
            .map(|f| Fare(f.clone()))
            .collect();

        trips.push(Trip::new(
            itinerary.id.clone(),
            from.clone(),
            to.clone(),
            legs,
            fares,
            itinerary.num_changes,
        )?);
    }

    Ok(trips)
}

/// Classifies and converts one leg.
fn parse_leg(leg: &WireLeg, tables: &NetworkTables) -> Result<Leg, ParseError> {
    match (&leg.line, &leg.individual) {
        (Some(line), _) => parse_public_leg(leg, line, tables).map(Leg::Public),
        (None, Some(mode)) => parse_individual_leg(leg, mode, tables).map(Leg::Individual),
        (None, None) => Err(ParseError::UnclassifiableLeg),
    }
}

fn parse_public_leg(
    leg: &WireLeg,
    line: &WireLine,
    tables: &NetworkTables,
) -> Result<PublicLeg, ParseError> {
    let line = parse_line(line, tables);

    let departure_stop = parse_stop(&leg.origin, tables)?;
    let arrival_stop = parse_stop(&leg.destination, tables)?;

    // Intermediates are all sub-stops except the boundary pair.
    let intermediate_stops = match leg.stops.as_deref() {
        Some(stops) if stops.len() > 2 => stops[1..stops.len() - 1]
            .iter()
            .map(|s| parse_stop(s, tables))
            .collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };

    let destination = leg.headsign.as_deref().map(|raw| {
        let (place, name) = tables.places.split(raw);
        let mut loc = Location::any_name(name);
        if let Some(place) = place {
            loc = loc.with_place(place);
        }
        loc
    });

    let path = parse_path(leg, &departure_stop, &arrival_stop)?;

    Ok(PublicLeg {
        line,
        destination,
        departure_stop,
        arrival_stop,
        intermediate_stops,
        path,
        message: leg.message.clone(),
    })
}

fn parse_individual_leg(
    leg: &WireLeg,
    mode: &str,
    tables: &NetworkTables,
) -> Result<IndividualLeg, ParseError> {
    // Closed set; no silent default for unknown tokens.
    let mode = match mode {
        "walk" => IndividualMode::Walk,
        "bike" => IndividualMode::Bike,
        "car" => IndividualMode::Car,
        other => return Err(ParseError::UnknownIndividualMode(other.to_string())),
    };

    let departure_stop = parse_stop(&leg.origin, tables)?;
    let arrival_stop = parse_stop(&leg.destination, tables)?;

    let departure_time = departure_stop
        .departure_time()
        .ok_or(ParseError::MissingTime("individual leg departure"))?;
    let arrival_time = arrival_stop
        .arrival_time()
        .ok_or(ParseError::MissingTime("individual leg arrival"))?;

    let path = parse_path(leg, &departure_stop, &arrival_stop)?;

    Ok(IndividualLeg {
        mode,
        departure: departure_stop.location,
        departure_time,
        arrival: arrival_stop.location,
        arrival_time,
        path,
        distance_m: leg.distance,
    })
}

/// Resolves leg path geometry.
///
/// Prefers the encoded polyline when the backend supplies one; otherwise
/// synthesizes the path from the leg boundary coordinates.
fn parse_path(leg: &WireLeg, departure: &Stop, arrival: &Stop) -> Result<Vec<Point>, ParseError> {
    if let Some(encoded) = leg.polyline.as_deref() {
        return Ok(polyline::decode(encoded)?);
    }

    let boundary: Vec<Point> = [departure, arrival]
        .iter()
        .filter_map(|stop| stop.location.coord)
        .collect();
    Ok(boundary)
}

/// Converts a wire stop, normalizing all four time fields.
fn parse_stop(stop: &WireStop, tables: &NetworkTables) -> Result<Stop, ParseError> {
    let mut out = Stop::new(parse_location(&stop.location, tables));
    out.planned_arrival = stop.arrival.as_ref().map(wire_time).transpose()?;
    out.predicted_arrival = stop.predicted_arrival.as_ref().map(wire_time).transpose()?;
    out.planned_departure = stop.departure.as_ref().map(wire_time).transpose()?;
    out.predicted_departure = stop
        .predicted_departure
        .as_ref()
        .map(wire_time)
        .transpose()?;
    out.position = stop.platform.clone();
    Ok(out)
}

/// Converts a wire location, splitting the raw name into place and name.
pub(crate) fn parse_location(loc: &WireLocation, tables: &NetworkTables) -> Location {
    let coord = match (loc.lat, loc.lon) {
        (Some(lat), Some(lon)) => Some(Point::from_degrees(lat, lon)),
        _ => None,
    };

    let kind = match loc.kind.as_deref() {
        Some("station") => LocationKind::Station,
        Some("poi") => LocationKind::Poi,
        Some("address") => LocationKind::Address,
        // No kind token: an id implies a station, a bare coordinate a
        // coordinate location.
        None if loc.id.is_some() => LocationKind::Station,
        None if coord.is_some() && loc.name.is_none() => LocationKind::Coordinate,
        _ => LocationKind::Any,
    };

    let (place, name) = match loc.name.as_deref() {
        Some(raw) => {
            let (place, name) = tables.places.split(raw);
            (place, Some(name))
        }
        None => (None, None),
    };

    Location {
        kind,
        id: loc.id.clone(),
        coord,
        place,
        name,
    }
}

/// Converts a wire line, decoding its product and attaching a style.
fn parse_line(line: &WireLine, tables: &NetworkTables) -> Line {
    let product = line
        .mode
        .as_deref()
        .and_then(|mode| tables.modes.decode(mode, line.route_type))
        .or_else(|| {
            // A numeric code can still decode without any token.
            line.route_type
                .and_then(|code| tables.modes.decode("", Some(code)))
        });

    if product.is_none() {
        warn!(
            mode = line.mode.as_deref().unwrap_or(""),
            route_type = line.route_type,
            "unknown backend mode; carrying line without product"
        );
    }

    let style = line
        .label
        .as_deref()
        .and_then(|label| tables.styles.style(line.network.as_deref(), label));

    Line {
        id: line.id.clone(),
        network: line.network.clone(),
        product,
        label: line.label.clone(),
        name: line.name.clone(),
        style,
    }
}

/// Normalizes any wire time shape to a `NaiveDateTime`.
fn wire_time(time: &WireTime) -> Result<NaiveDateTime, TimeError> {
    match time {
        WireTime::Iso(s) => parse_iso_datetime(s),
        WireTime::Epoch(secs) => from_epoch_seconds(*secs),
        WireTime::DaySeconds { day, seconds } => from_day_seconds(day, *seconds),
    }
}

/// Parses a departures document into station boards.
pub fn parse_departures(
    doc: &DeparturesDocument,
    tables: &NetworkTables,
) -> Result<Vec<StationDepartures>, ParseError> {
    let stations = doc.stations.as_ref().ok_or(ParseError::MissingBoards)?;
    stations
        .iter()
        .map(|board| parse_station_board(board, tables))
        .collect()
}

fn parse_station_board(
    board: &WireStationBoard,
    tables: &NetworkTables,
) -> Result<StationDepartures, ParseError> {
    let departures = board
        .departures
        .iter()
        .map(|dep| parse_departure(dep, tables))
        .collect::<Result<Vec<_>, _>>()?;

    let lines = board
        .lines
        .iter()
        .flatten()
        .map(|line| LineDestination {
            line: parse_line(line, tables),
            destination: None,
        })
        .collect();

    Ok(StationDepartures {
        location: parse_location(&board.station, tables),
        departures,
        lines,
    })
}

fn parse_departure(dep: &WireDeparture, tables: &NetworkTables) -> Result<Departure, ParseError> {
    let destination = match dep.destination.as_deref() {
        Some(raw) => {
            let (place, name) = tables.places.split(raw);
            let mut loc = Location::any_name(name);
            if let Some(place) = place {
                loc = loc.with_place(place);
            }
            loc
        }
        None => Location::any_name("?"),
    };

    Ok(Departure {
        planned_time: wire_time(&dep.planned)?,
        predicted_time: dep.predicted.as_ref().map(wire_time).transpose()?,
        line: parse_line(&dep.line, tables),
        position: dep.platform.clone(),
        destination,
    })
}

/// A suggested location with its relevance rank (lower is better).
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestedLocation {
    /// The candidate.
    pub location: Location,
    /// Relevance rank; backends without ranks get list order.
    pub rank: u32,
}

/// Parses a locations document (suggest or nearby), preserving rank order.
pub fn parse_locations(
    doc: &LocationsDocument,
    tables: &NetworkTables,
) -> Result<Vec<SuggestedLocation>, ParseError> {
    let locations = doc.locations.as_ref().ok_or(ParseError::MissingLocations)?;

    let mut suggested: Vec<SuggestedLocation> = locations
        .iter()
        .enumerate()
        .map(|(index, loc)| SuggestedLocation {
            location: parse_location(loc, tables),
            rank: loc.rank.unwrap_or(index as u32),
        })
        .collect();
    suggested.sort_by_key(|s| s.rank);

    Ok(suggested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Product;
    use crate::tables::CommaSplit;

    fn tables() -> NetworkTables {
        NetworkTables {
            places: Box::new(CommaSplit),
            ..NetworkTables::default()
        }
    }

    fn from_to() -> (Location, Location) {
        (
            Location::station("1", "Origin"),
            Location::station("9", "Destination"),
        )
    }

    fn doc(json: &str) -> TripsDocument {
        serde_json::from_str(json).unwrap()
    }

    const SINGLE_RIDE: &str = r#"{
        "itineraries": [{
            "id": "it-1",
            "numChanges": 0,
            "legs": [{
                "line": {"id": "u1", "label": "U1", "mode": "subway"},
                "headsign": "Berlin, Warschauer Str.",
                "origin": {"id": "1", "name": "Berlin, A", "lat": 52.5, "lon": 13.4,
                           "departure": "2024-03-15T10:00:00", "platform": "2"},
                "destination": {"id": "9", "name": "Berlin, B", "lat": 52.51, "lon": 13.42,
                                "arrival": "2024-03-15T10:20:00"},
                "stops": [
                    {"id": "1", "name": "Berlin, A", "departure": "2024-03-15T10:00:00"},
                    {"id": "5", "name": "Berlin, Mitte", "arrival": "2024-03-15T10:10:00",
                     "departure": "2024-03-15T10:11:00"},
                    {"id": "9", "name": "Berlin, B", "arrival": "2024-03-15T10:20:00"}
                ]
            }]
        }]
    }"#;

    #[test]
    fn missing_itineraries_is_parse_failure() {
        let (from, to) = from_to();
        let result = parse_trips(&doc("{}"), &from, &to, &tables());
        assert!(matches!(result, Err(ParseError::MissingItineraries)));
    }

    #[test]
    fn empty_itineraries_is_no_trips() {
        let (from, to) = from_to();
        let trips = parse_trips(&doc(r#"{"itineraries": []}"#), &from, &to, &tables()).unwrap();
        assert!(trips.is_empty());
    }

    #[test]
    fn single_public_leg() {
        let (from, to) = from_to();
        let trips = parse_trips(&doc(SINGLE_RIDE), &from, &to, &tables()).unwrap();
        assert_eq!(trips.len(), 1);

        let trip = &trips[0];
        assert_eq!(trip.id.as_deref(), Some("it-1"));
        // Caller's endpoints, not the backend's.
        assert_eq!(trip.from, from);
        assert_eq!(trip.to, to);

        let leg = trip.legs()[0].as_public().unwrap();
        assert_eq!(leg.line.label.as_deref(), Some("U1"));
        assert_eq!(leg.line.product, Some(Product::Subway));
        assert_eq!(leg.departure_stop.position.as_deref(), Some("2"));

        // Place splitting applied to names and headsign.
        assert_eq!(leg.departure_stop.location.place.as_deref(), Some("Berlin"));
        assert_eq!(leg.departure_stop.location.name.as_deref(), Some("A"));
        let destination = leg.destination.as_ref().unwrap();
        assert_eq!(destination.name.as_deref(), Some("Warschauer Str."));

        // Sub-stops minus boundary pair.
        assert_eq!(leg.intermediate_stops.len(), 1);
        assert_eq!(
            leg.intermediate_stops[0].location.name.as_deref(),
            Some("Mitte")
        );

        // No polyline: path synthesized from boundary coordinates.
        assert_eq!(leg.path.len(), 2);
    }

    #[test]
    fn polyline_preferred_over_boundary() {
        let json = r#"{
            "itineraries": [{
                "legs": [{
                    "line": {"label": "U1", "mode": "subway"},
                    "polyline": "_p~iF~ps|U_ulLnnqC_mqNvxq`@",
                    "origin": {"id": "1", "name": "A", "lat": 52.5, "lon": 13.4,
                               "departure": "2024-03-15T10:00:00"},
                    "destination": {"id": "9", "name": "B", "lat": 52.51, "lon": 13.42,
                                    "arrival": "2024-03-15T10:20:00"}
                }]
            }]
        }"#;
        let (from, to) = from_to();
        let trips = parse_trips(&doc(json), &from, &to, &tables()).unwrap();
        let leg = trips[0].legs()[0].as_public().unwrap();
        assert_eq!(leg.path.len(), 3);
    }

    #[test]
    fn corrupt_polyline_is_parse_failure() {
        let json = r#"{
            "itineraries": [{
                "legs": [{
                    "line": {"label": "U1", "mode": "subway"},
                    "polyline": "_",
                    "origin": {"id": "1", "name": "A", "departure": "2024-03-15T10:00:00"},
                    "destination": {"id": "9", "name": "B", "arrival": "2024-03-15T10:20:00"}
                }]
            }]
        }"#;
        let (from, to) = from_to();
        let result = parse_trips(&doc(json), &from, &to, &tables());
        assert!(matches!(result, Err(ParseError::InvalidPath(_))));
    }

    #[test]
    fn walk_leg_parses() {
        let json = r#"{
            "itineraries": [{
                "legs": [{
                    "individual": "walk",
                    "distance": 450,
                    "origin": {"name": "Start", "lat": 52.5, "lon": 13.4,
                               "departure": "2024-03-15T09:50:00"},
                    "destination": {"id": "1", "name": "A", "lat": 52.5001, "lon": 13.4,
                                    "arrival": "2024-03-15T10:00:00"}
                }]
            }]
        }"#;
        let (from, to) = from_to();
        let trips = parse_trips(&doc(json), &from, &to, &tables()).unwrap();
        let leg = trips[0].legs()[0].as_individual().unwrap();
        assert_eq!(leg.mode, IndividualMode::Walk);
        assert_eq!(leg.distance_m, Some(450));
    }

    #[test]
    fn unknown_individual_mode_is_hard_failure() {
        let json = r#"{
            "itineraries": [{
                "legs": [{
                    "individual": "hoverboard",
                    "origin": {"name": "A", "departure": "2024-03-15T09:50:00"},
                    "destination": {"name": "B", "arrival": "2024-03-15T10:00:00"}
                }]
            }]
        }"#;
        let (from, to) = from_to();
        let result = parse_trips(&doc(json), &from, &to, &tables());
        assert!(matches!(
            result,
            Err(ParseError::UnknownIndividualMode(ref m)) if m == "hoverboard"
        ));
    }

    #[test]
    fn leg_without_discriminator_is_parse_failure() {
        let json = r#"{
            "itineraries": [{
                "legs": [{
                    "origin": {"name": "A"},
                    "destination": {"name": "B"}
                }]
            }]
        }"#;
        let (from, to) = from_to();
        let result = parse_trips(&doc(json), &from, &to, &tables());
        assert!(matches!(result, Err(ParseError::UnclassifiableLeg)));
    }

    #[test]
    fn epoch_and_day_seconds_times_normalize() {
        let json = r#"{
            "itineraries": [{
                "legs": [{
                    "line": {"label": "S1", "mode": "suburban_train"},
                    "origin": {"id": "1", "name": "A", "departure": 1710498600},
                    "destination": {"id": "9", "name": "B",
                                    "arrival": {"day": "2024-03-15", "seconds": 38700}}
                }]
            }]
        }"#;
        let (from, to) = from_to();
        let trips = parse_trips(&doc(json), &from, &to, &tables()).unwrap();
        let leg = trips[0].legs()[0].as_public().unwrap();
        assert_eq!(
            leg.departure_stop.departure_time().unwrap().to_string(),
            "2024-03-15 10:30:00"
        );
        assert_eq!(
            leg.arrival_stop.arrival_time().unwrap().to_string(),
            "2024-03-15 10:45:00"
        );
    }

    #[test]
    fn unknown_mode_token_keeps_line_without_product() {
        let json = r#"{
            "itineraries": [{
                "legs": [{
                    "line": {"label": "X9", "mode": "zeppelin"},
                    "origin": {"id": "1", "name": "A", "departure": "2024-03-15T10:00:00"},
                    "destination": {"id": "9", "name": "B", "arrival": "2024-03-15T10:20:00"}
                }]
            }]
        }"#;
        let (from, to) = from_to();
        let trips = parse_trips(&doc(json), &from, &to, &tables()).unwrap();
        let leg = trips[0].legs()[0].as_public().unwrap();
        assert_eq!(leg.line.product, None);
        assert_eq!(leg.line.label.as_deref(), Some("X9"));
    }

    #[test]
    fn route_type_disambiguates_generic_rail() {
        let json = r#"{
            "itineraries": [{
                "legs": [{
                    "line": {"label": "ICE 100", "mode": "rail", "routeType": 101},
                    "origin": {"id": "1", "name": "A", "departure": "2024-03-15T10:00:00"},
                    "destination": {"id": "9", "name": "B", "arrival": "2024-03-15T11:20:00"}
                }]
            }]
        }"#;
        let (from, to) = from_to();
        let trips = parse_trips(&doc(json), &from, &to, &tables()).unwrap();
        let leg = trips[0].legs()[0].as_public().unwrap();
        assert_eq!(leg.line.product, Some(Product::HighSpeedTrain));
    }

    #[test]
    fn departures_document_parses() {
        let json = r#"{
            "stations": [{
                "station": {"id": "900100003", "name": "Berlin, Alexanderplatz",
                            "lat": 52.5215, "lon": 13.4112},
                "departures": [{
                    "planned": "2024-03-15T10:00:00",
                    "predicted": "2024-03-15T10:02:00",
                    "line": {"label": "U1", "mode": "subway"},
                    "platform": "2",
                    "destination": "Berlin, Hauptbahnhof"
                }],
                "lines": [{"label": "U1", "mode": "subway"}]
            }]
        }"#;
        let doc: DeparturesDocument = serde_json::from_str(json).unwrap();
        let boards = parse_departures(&doc, &tables()).unwrap();
        assert_eq!(boards.len(), 1);
        assert_eq!(boards[0].departures.len(), 1);
        assert_eq!(boards[0].lines.len(), 1);

        let dep = &boards[0].departures[0];
        assert_eq!(dep.planned_time.to_string(), "2024-03-15 10:00:00");
        assert!(dep.predicted_time.is_some());
        assert_eq!(dep.destination.name.as_deref(), Some("Hauptbahnhof"));
    }

    #[test]
    fn departures_missing_boards_is_parse_failure() {
        let doc: DeparturesDocument = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            parse_departures(&doc, &tables()),
            Err(ParseError::MissingBoards)
        ));
    }

    #[test]
    fn locations_sorted_by_rank() {
        let json = r#"{
            "locations": [
                {"id": "2", "name": "Alexanderplatz/Memhardstr.", "kind": "station", "rank": 5},
                {"id": "1", "name": "Alexanderplatz", "kind": "station", "rank": 1}
            ]
        }"#;
        let doc: LocationsDocument = serde_json::from_str(json).unwrap();
        let suggested = parse_locations(&doc, &tables()).unwrap();
        assert_eq!(suggested.len(), 2);
        assert_eq!(suggested[0].location.id.as_deref(), Some("1"));
        assert_eq!(suggested[0].rank, 1);
    }

    #[test]
    fn locations_without_rank_keep_list_order() {
        let json = r#"{
            "locations": [
                {"id": "a", "name": "First"},
                {"id": "b", "name": "Second"}
            ]
        }"#;
        let doc: LocationsDocument = serde_json::from_str(json).unwrap();
        let suggested = parse_locations(&doc, &tables()).unwrap();
        assert_eq!(suggested[0].location.id.as_deref(), Some("a"));
        assert_eq!(suggested[1].location.id.as_deref(), Some("b"));
    }

    #[test]
    fn bare_coordinate_location_kind() {
        let loc = WireLocation {
            id: None,
            name: None,
            kind: None,
            lat: Some(52.5),
            lon: Some(13.4),
            rank: None,
        };
        let parsed = parse_location(&loc, &tables());
        assert_eq!(parsed.kind, LocationKind::Coordinate);
        assert!(parsed.has_coord());
    }
}
