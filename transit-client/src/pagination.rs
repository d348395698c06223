//! Pagination context engine.
//!
//! A trips result carries a [`QueryContext`]: an immutable, serializable
//! continuation token that lets the caller ask for earlier or later
//! itineraries without re-specifying the query. Contexts are never
//! mutated; every follow-up produces a fresh instance, so concurrent
//! holders of contexts derived from the same query never interfere.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Location, Product, Trip};

/// Walking speed assumption for footpath legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WalkSpeed {
    /// Slow walker.
    Slow,
    /// Default pace.
    #[default]
    Normal,
    /// Fast walker.
    Fast,
}

/// Accessibility requirement for the itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Accessibility {
    /// No requirement.
    #[default]
    Neutral,
    /// Avoid stairs where possible.
    Limited,
    /// Step-free access only.
    BarrierFree,
}

/// Optional query flags, replayed verbatim on follow-up queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TripOptions {
    /// Require bicycle carriage on public legs.
    pub bike_carriage: bool,
    /// Prefer fewer interchanges over shorter duration.
    pub minimize_changes: bool,
}

/// The caller's trip query, packaged as a replayable value object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripsQuery {
    /// Origin (must be identified by query time).
    pub from: Location,
    /// Optional via point.
    pub via: Option<Location>,
    /// Destination.
    pub to: Location,
    /// Reference time.
    pub time: NaiveDateTime,
    /// Whether `time` is a departure (true) or arrival (false) bound.
    pub is_departure: bool,
    /// Requested products.
    pub products: BTreeSet<Product>,
    /// Walking speed assumption.
    pub walk_speed: WalkSpeed,
    /// Accessibility requirement.
    pub accessibility: Accessibility,
    /// Additional flags.
    pub options: TripOptions,
}

/// A request the transport collaborator can execute.
///
/// The engine doesn't build URLs; it hands the collaborator the replayed
/// query, the encoded mode string, and the continuation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedRequest {
    /// The (possibly time-shifted) query.
    pub query: TripsQuery,
    /// Backend mode-request string from the mode table.
    pub mode_string: String,
    /// Server-issued cursor to replay, when the backend supports one.
    pub cursor: Option<String>,
    /// Pagination direction, absent on the initial request.
    pub later: Option<bool>,
}

/// Continuation token for earlier/later follow-up queries.
///
/// Immutable per result. Carries the replayable seed plus the boundary
/// times of the result set it was issued for, or a server cursor for
/// backends with true server-side pagination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryContext {
    seed: TripsQuery,
    /// Earliest arrival among the result's trips.
    earliest_arrival: Option<NaiveDateTime>,
    /// Latest departure among the result's trips.
    latest_departure: Option<NaiveDateTime>,
    /// Server-issued cursor; when present it is the sole continuation
    /// payload and boundary times are not used for the request.
    cursor: Option<String>,
    can_query_earlier: bool,
    can_query_later: bool,
}

/// Error from a pagination policy violation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// The context disallows the requested direction.
    #[error("context does not allow querying {direction}")]
    DirectionNotAllowed {
        /// "earlier" or "later".
        direction: &'static str,
    },
}

/// The minimal shift applied to a boundary time so the boundary trip
/// itself is not returned again.
fn boundary_shift() -> Duration {
    Duration::minutes(1)
}

impl QueryContext {
    /// Whether an earlier page may be requested.
    pub fn can_query_earlier(&self) -> bool {
        self.can_query_earlier
    }

    /// Whether a later page may be requested.
    pub fn can_query_later(&self) -> bool {
        self.can_query_later
    }

    /// The replayable seed, for inspection.
    pub fn seed(&self) -> &TripsQuery {
        &self.seed
    }
}

/// Builds the initial request. No time adjustment is performed; the
/// caller's parameters are packaged verbatim.
pub fn initial_request(query: TripsQuery, mode_string: String) -> PlannedRequest {
    PlannedRequest {
        query,
        mode_string,
        cursor: None,
        later: None,
    }
}

/// Builds a follow-up request from a previous result's context.
///
/// # Errors
///
/// `DirectionNotAllowed` when the context forbids the requested
/// direction. This is caller misuse, signaled, never fatal to the
/// context itself.
pub fn continue_request(
    context: &QueryContext,
    later: bool,
    mode_string: String,
) -> Result<PlannedRequest, PaginationError> {
    if later && !context.can_query_later {
        return Err(PaginationError::DirectionNotAllowed { direction: "later" });
    }
    if !later && !context.can_query_earlier {
        return Err(PaginationError::DirectionNotAllowed {
            direction: "earlier",
        });
    }

    // Server cursors supersede local window arithmetic entirely.
    if context.cursor.is_some() {
        return Ok(PlannedRequest {
            query: context.seed.clone(),
            mode_string,
            cursor: context.cursor.clone(),
            later: Some(later),
        });
    }

    // Derive the new window from the boundary of the previous result,
    // shifted one minimal unit so the boundary trip is not re-returned.
    let mut query = context.seed.clone();
    if later {
        if let Some(latest) = context.latest_departure {
            query.time = latest + boundary_shift();
            query.is_departure = true;
        }
    } else if let Some(earliest) = context.earliest_arrival {
        query.time = earliest - boundary_shift();
        query.is_departure = false;
    }
    debug!(
        later,
        time = %query.time,
        "derived pagination window from boundary"
    );

    Ok(PlannedRequest {
        query,
        mode_string,
        cursor: None,
        later: Some(later),
    })
}

/// Builds the context to attach to a freshly parsed result.
///
/// Boundary times are recomputed from the new trip set. An empty result
/// inherits the unresolved boundaries of the previous context unchanged,
/// so future expansion in either direction stays possible.
pub fn context_after(
    seed: TripsQuery,
    trips: &[Trip],
    previous: Option<&QueryContext>,
    cursor: Option<String>,
) -> QueryContext {
    let latest_departure = trips
        .iter()
        .filter_map(Trip::departure_time)
        .max()
        .or_else(|| previous.and_then(|p| p.latest_departure));
    let earliest_arrival = trips
        .iter()
        .filter_map(Trip::arrival_time)
        .min()
        .or_else(|| previous.and_then(|p| p.earliest_arrival));

    let has_cursor = cursor.is_some();
    QueryContext {
        seed,
        earliest_arrival,
        latest_departure,
        cursor,
        can_query_earlier: has_cursor || earliest_arrival.is_some(),
        can_query_later: has_cursor || latest_departure.is_some(),
    }
}
