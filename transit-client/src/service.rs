//! External interface of the engine.
//!
//! [`JourneyPlanner`] binds the per-agency tables to a [`Transport`]
//! collaborator and exposes the five query operations. The transport is
//! a blocking call boundary: it receives a normalized request, performs
//! I/O (including any retry policy of its own), and returns the raw
//! response body. The engine never retries.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{Location, LocationKind, StationDepartures, Trip};
use crate::pagination::{self, PaginationError, PlannedRequest, QueryContext, TripsQuery};
use crate::parser::{self, ParseError, SuggestedLocation};
use crate::reconcile;
use crate::tables::NetworkTables;
use crate::wire::{DeparturesDocument, LocationsDocument, TripsDocument};

/// Error from the transport collaborator.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Network-level failure (connect, timeout, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("backend returned status {0}")]
    Status(u16),
}

/// Top-level error for planner operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The transport collaborator failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body was not valid JSON.
    #[error("malformed response document: {0}")]
    Json(#[from] serde_json::Error),

    /// The document structure contradicts the protocol.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Pagination requested in a direction the context disallows.
    #[error(transparent)]
    Pagination(#[from] PaginationError),

    /// A location that is neither identified nor resolvable was passed
    /// where a usable one is required. Caller misuse; fails fast.
    #[error("location cannot be used or resolved: {0}")]
    UnresolvedLocation(String),

    /// The backend signalled an error this operation has no status for.
    #[error("backend error: {0}")]
    Backend(String),
}

/// A normalized request for the transport to execute.
///
/// The transport owns URL templates, authentication, and encoding; the
/// engine only says what is being asked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WireRequest {
    /// Trip planning (initial or follow-up page).
    Trips(PlannedRequest),
    /// Station departure board.
    Departures {
        /// Station id.
        station_id: String,
        /// Board start time.
        time: NaiveDateTime,
        /// Maximum departures to return.
        max_departures: usize,
        /// Include boards of equivalent (grouped) stations.
        include_equivalent: bool,
        /// Ask the live feed instead of the scheduled one.
        live: bool,
    },
    /// Locations near a point or station.
    NearbyLocations {
        /// Restrict to these kinds; empty means all.
        kinds: Vec<LocationKind>,
        /// Centre of the search.
        location: Location,
        /// Search radius in metres.
        max_distance_m: u32,
        /// Maximum results.
        max_results: usize,
    },
    /// Autocomplete on free text.
    SuggestLocations {
        /// The text fragment typed so far.
        fragment: String,
    },
}

/// The I/O collaborator.
///
/// Implementations perform the HTTP/SOAP exchange for one request and
/// return the raw response body. Retry and backoff, if any, happen
/// inside `exchange` before the engine sees a response.
pub trait Transport {
    /// Executes one request and returns the raw response body.
    fn exchange(&self, request: &WireRequest) -> Result<String, TransportError>;
}

/// Outcome of a trip query.
#[derive(Debug)]
pub enum QueryTripsResult {
    /// Itineraries were found.
    Found {
        /// The trips, in backend order.
        trips: Vec<Trip>,
        /// Continuation token for earlier/later pages.
        context: QueryContext,
    },
    /// Free-text endpoints matched more than one (or zero) places.
    Ambiguous {
        /// Candidates for `from`; empty when `from` resolved.
        from: Vec<Location>,
        /// Candidates for `via`.
        via: Vec<Location>,
        /// Candidates for `to`.
        to: Vec<Location>,
    },
    /// Valid query, no itineraries exist.
    NoTrips,
    /// The requested date lies outside the backend's timetable range.
    InvalidDate,
    /// The backend is down or answered with a service-level error.
    ServiceDown,
}

/// Outcome of a departures query.
#[derive(Debug)]
pub enum QueryDeparturesResult {
    /// Boards were found.
    Found(Vec<StationDepartures>),
    /// The station id is unknown to the backend.
    InvalidStation,
    /// The backend is down.
    ServiceDown,
}

/// Outcome of a nearby-locations query.
#[derive(Debug)]
pub enum NearbyLocationsResult {
    /// Locations were found (possibly none in range).
    Found(Vec<Location>),
    /// The given station id is unknown to the backend.
    InvalidId,
}

/// Outcome of a suggest query.
#[derive(Debug)]
pub struct SuggestLocationsResult {
    /// Candidates ordered by relevance rank.
    pub locations: Vec<SuggestedLocation>,
}

enum Resolution {
    One(Location),
    Candidates(Vec<Location>),
}

/// The journey-planning engine bound to one agency.
pub struct JourneyPlanner<T: Transport> {
    transport: T,
    tables: NetworkTables,
}

impl<T: Transport> JourneyPlanner<T> {
    /// Creates a planner from a transport and the agency's tables.
    pub fn new(transport: T, tables: NetworkTables) -> Self {
        Self { transport, tables }
    }

    /// The agency tables, for inspection.
    pub fn tables(&self) -> &NetworkTables {
        &self.tables
    }

    /// Plans trips between two places.
    ///
    /// Unidentified `from`/`via`/`to` locations are resolved through the
    /// suggest endpoint first; when any of them matches more than one
    /// (or zero) candidates, the result is `Ambiguous` with the
    /// candidate lists and no backend trip query is made. An empty
    /// product set requests the network's default products.
    ///
    /// # Errors
    ///
    /// Transport, JSON, and parse failures abort the call. A location
    /// with neither id, coordinate, nor name is caller misuse and fails
    /// fast with [`ClientError::UnresolvedLocation`].
    pub fn query_trips(&self, mut query: TripsQuery) -> Result<QueryTripsResult, ClientError> {
        if query.products.is_empty() {
            query.products = self.tables.default_products.clone();
        }

        let from = self.resolve_location(&query.from)?;
        let via = match &query.via {
            Some(via) => Some(self.resolve_location(via)?),
            None => None,
        };
        let to = self.resolve_location(&query.to)?;

        let ambiguous = matches!(from, Resolution::Candidates(_))
            || matches!(via, Some(Resolution::Candidates(_)))
            || matches!(to, Resolution::Candidates(_));
        if ambiguous {
            let candidates = |r: Resolution| match r {
                Resolution::One(_) => Vec::new(),
                Resolution::Candidates(c) => c,
            };
            return Ok(QueryTripsResult::Ambiguous {
                from: candidates(from),
                via: via.map(candidates).unwrap_or_default(),
                to: candidates(to),
            });
        }

        if let Resolution::One(loc) = from {
            query.from = loc;
        }
        if let (Some(Resolution::One(loc)), Some(via)) = (via, query.via.as_mut()) {
            *via = loc;
        }
        if let Resolution::One(loc) = to {
            query.to = loc;
        }

        let mode_string = self.tables.modes.encode(&query.products);
        let request = pagination::initial_request(query.clone(), mode_string);
        let body = self.transport.exchange(&WireRequest::Trips(request))?;
        let doc: TripsDocument = serde_json::from_str(&body)?;

        if let Some(error) = &doc.error {
            return Ok(match error.code.as_str() {
                "INVALID_DATE" => QueryTripsResult::InvalidDate,
                _ => QueryTripsResult::ServiceDown,
            });
        }

        let trips = parser::parse_trips(&doc, &query.from, &query.to, &self.tables)?;
        if trips.is_empty() {
            return Ok(QueryTripsResult::NoTrips);
        }
        let context = pagination::context_after(query, &trips, None, doc.cursor.clone());
        Ok(QueryTripsResult::Found { trips, context })
    }

    /// Fetches the earlier or later page of a previous result.
    ///
    /// An empty page still yields `Found` with a context inheriting the
    /// previous boundaries, so expansion stays possible.
    ///
    /// # Errors
    ///
    /// Requesting a direction the context disallows is a policy
    /// violation and fails fast with [`ClientError::Pagination`].
    pub fn query_more_trips(
        &self,
        context: &QueryContext,
        later: bool,
    ) -> Result<QueryTripsResult, ClientError> {
        let seed = context.seed().clone();
        let mode_string = self.tables.modes.encode(&seed.products);
        let request = pagination::continue_request(context, later, mode_string)?;

        let body = self.transport.exchange(&WireRequest::Trips(request))?;
        let doc: TripsDocument = serde_json::from_str(&body)?;

        if let Some(error) = &doc.error {
            return Ok(match error.code.as_str() {
                "INVALID_DATE" => QueryTripsResult::InvalidDate,
                _ => QueryTripsResult::ServiceDown,
            });
        }

        let trips = parser::parse_trips(&doc, &seed.from, &seed.to, &self.tables)?;
        let next = pagination::context_after(seed, &trips, Some(context), doc.cursor.clone());
        Ok(QueryTripsResult::Found {
            trips,
            context: next,
        })
    }

    /// Queries departures at a station, merging the scheduled and live
    /// feeds into one board with corrected predicted times.
    pub fn query_departures(
        &self,
        station_id: &str,
        time: NaiveDateTime,
        max_departures: usize,
        include_equivalent: bool,
    ) -> Result<QueryDeparturesResult, ClientError> {
        let request = |live: bool| WireRequest::Departures {
            station_id: station_id.to_string(),
            time,
            max_departures,
            include_equivalent,
            live,
        };

        let body = self.transport.exchange(&request(false))?;
        let doc: DeparturesDocument = serde_json::from_str(&body)?;
        if let Some(error) = &doc.error {
            return Ok(match error.code.as_str() {
                "INVALID_STATION" => QueryDeparturesResult::InvalidStation,
                _ => QueryDeparturesResult::ServiceDown,
            });
        }
        let mut boards = parser::parse_departures(&doc, &self.tables)?;

        let live_body = self.transport.exchange(&request(true))?;
        let live_doc: DeparturesDocument = serde_json::from_str(&live_body)?;
        if live_doc.error.is_none() {
            let live_boards = parser::parse_departures(&live_doc, &self.tables)?;
            for board in &mut boards {
                let Some(live_board) = live_boards
                    .iter()
                    .find(|lb| lb.location.same_place(&board.location, 0.0))
                else {
                    continue;
                };
                board.departures =
                    reconcile::reconcile(&board.departures, &live_board.departures, &self.tables);
            }
        }

        Ok(QueryDeparturesResult::Found(boards))
    }

    /// Finds locations near a coordinate or a station.
    ///
    /// # Errors
    ///
    /// The centre location must carry a coordinate or a station id;
    /// anything else is caller misuse and fails fast.
    pub fn query_nearby_locations(
        &self,
        kinds: Vec<LocationKind>,
        location: Location,
        max_distance_m: u32,
        max_results: usize,
    ) -> Result<NearbyLocationsResult, ClientError> {
        if !location.has_coord() && !location.is_identified() {
            return Err(ClientError::UnresolvedLocation(location.unique_name()));
        }

        let body = self.transport.exchange(&WireRequest::NearbyLocations {
            kinds,
            location,
            max_distance_m,
            max_results,
        })?;
        let doc: LocationsDocument = serde_json::from_str(&body)?;

        if let Some(error) = &doc.error {
            return match error.code.as_str() {
                "INVALID_ID" => Ok(NearbyLocationsResult::InvalidId),
                other => Err(ClientError::Backend(other.to_string())),
            };
        }

        let locations = parser::parse_locations(&doc, &self.tables)?
            .into_iter()
            .map(|s| s.location)
            .collect();
        Ok(NearbyLocationsResult::Found(locations))
    }

    /// Autocompletes free text into ranked location candidates.
    pub fn suggest_locations(
        &self,
        fragment: &str,
    ) -> Result<SuggestLocationsResult, ClientError> {
        let body = self.transport.exchange(&WireRequest::SuggestLocations {
            fragment: fragment.to_string(),
        })?;
        let doc: LocationsDocument = serde_json::from_str(&body)?;

        if let Some(error) = &doc.error {
            return Err(ClientError::Backend(error.code.clone()));
        }

        Ok(SuggestLocationsResult {
            locations: parser::parse_locations(&doc, &self.tables)?,
        })
    }

    /// Makes a location usable in a trip query.
    ///
    /// Identified stations and bare coordinates pass through; free text
    /// goes through suggest. Exactly one candidate resolves; any other
    /// count is ambiguity the caller must settle.
    fn resolve_location(&self, location: &Location) -> Result<Resolution, ClientError> {
        if location.is_identified()
            || (location.kind == LocationKind::Coordinate && location.has_coord())
        {
            return Ok(Resolution::One(location.clone()));
        }

        let Some(name) = &location.name else {
            return Err(ClientError::UnresolvedLocation(location.unique_name()));
        };

        let mut candidates: Vec<Location> = self
            .suggest_locations(name)?
            .locations
            .into_iter()
            .map(|s| s.location)
            .collect();

        if candidates.len() == 1 {
            Ok(Resolution::One(candidates.remove(0)))
        } else {
            Ok(Resolution::Candidates(candidates))
        }
    }
}

/// Transport double serving canned response bodies.
///
/// Useful for development and tests without backend access. Responses
/// are queued per endpoint and consumed in order, so multi-call flows
/// (resolution, pagination, scheduled + live boards) can be scripted.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<&'static str, VecDeque<String>>>,
}

impl MockTransport {
    /// Creates an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response body for an endpoint.
    ///
    /// Endpoints: `"trips"`, `"departures"`, `"departures-live"`,
    /// `"nearby"`, `"suggest"`.
    pub fn push(&self, endpoint: &'static str, body: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .entry(endpoint)
            .or_default()
            .push_back(body.into());
    }
}

fn endpoint_of(request: &WireRequest) -> &'static str {
    match request {
        WireRequest::Trips(_) => "trips",
        WireRequest::Departures { live: false, .. } => "departures",
        WireRequest::Departures { live: true, .. } => "departures-live",
        WireRequest::NearbyLocations { .. } => "nearby",
        WireRequest::SuggestLocations { .. } => "suggest",
    }
}

impl Transport for MockTransport {
    fn exchange(&self, request: &WireRequest) -> Result<String, TransportError> {
        let endpoint = endpoint_of(request);
        self.responses
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get_mut(endpoint)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| TransportError::Network(format!("no canned response for {endpoint}")))
    }
}
