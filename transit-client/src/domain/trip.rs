//! Trip type.
//!
//! A `Trip` is one complete itinerary from the caller's origin to the
//! caller's destination. Construction validates that the leg chain is
//! non-empty and contiguous, so downstream code can trust every trip it
//! receives.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{DomainError, Leg, Location};

/// Maximum distance between the arrival of one leg and the departure of
/// the next for them to count as the same place, when ids can't decide.
const CONTIGUITY_EPSILON_M: f64 = 10.0;

/// An opaque fare as reported by the backend.
///
/// Fare computation is out of scope; values pass through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fare(pub String);

/// A complete itinerary.
///
/// # Invariants
///
/// - At least one leg.
/// - For every adjacent leg pair, the arrival location of leg *i* and the
///   departure location of leg *i+1* denote the same real-world place
///   (by id when both identified, else within a small coordinate epsilon).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    /// Backend itinerary id, if any.
    pub id: Option<String>,
    /// The origin the caller asked for (not the backend's own endpoint).
    pub from: Location,
    /// The destination the caller asked for.
    pub to: Location,
    legs: Vec<Leg>,
    /// Fares as reported, pass-through.
    pub fares: Vec<Fare>,
    /// Number of interchanges, when the backend reports it.
    pub num_changes: Option<u32>,
}

impl Trip {
    /// Constructs a trip, validating the leg chain.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `legs` is empty or adjacent legs don't connect.
    pub fn new(
        id: Option<String>,
        from: Location,
        to: Location,
        legs: Vec<Leg>,
        fares: Vec<Fare>,
        num_changes: Option<u32>,
    ) -> Result<Self, DomainError> {
        if legs.is_empty() {
            return Err(DomainError::EmptyTrip);
        }

        for window in legs.windows(2) {
            let prev_arrival = window[0].arrival_location();
            let next_departure = window[1].departure_location();
            if !prev_arrival.same_place(next_departure, CONTIGUITY_EPSILON_M) {
                return Err(DomainError::LegsNotContiguous {
                    arrival: prev_arrival.unique_name(),
                    departure: next_departure.unique_name(),
                });
            }
        }

        Ok(Self {
            id,
            from,
            to,
            legs,
            fares,
            num_changes,
        })
    }

    /// All legs, in travel order.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// The first departure time among the legs.
    pub fn departure_time(&self) -> Option<NaiveDateTime> {
        self.legs.first().and_then(Leg::departure_time)
    }

    /// The last arrival time among the legs.
    pub fn arrival_time(&self) -> Option<NaiveDateTime> {
        self.legs.last().and_then(Leg::arrival_time)
    }

    /// Total duration, when both endpoint times are known.
    pub fn duration(&self) -> Option<Duration> {
        Some(self.arrival_time()? - self.departure_time()?)
    }

    /// Interchange count: reported value when present, else derived from
    /// the number of public legs.
    pub fn change_count(&self) -> u32 {
        self.num_changes.unwrap_or_else(|| {
            let public = self.legs.iter().filter(|l| l.is_public()).count() as u32;
            public.saturating_sub(1)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        IndividualLeg, IndividualMode, Line, Point, Product, PublicLeg, Stop,
    };
    use chrono::NaiveDate;

    fn t(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn public_leg(from: (&str, &str), to: (&str, &str), dep: NaiveDateTime, arr: NaiveDateTime) -> Leg {
        let mut dep_stop = Stop::new(Location::station(from.0, from.1));
        dep_stop.planned_departure = Some(dep);
        let mut arr_stop = Stop::new(Location::station(to.0, to.1));
        arr_stop.planned_arrival = Some(arr);

        Leg::Public(PublicLeg {
            line: Line::new(Some(Product::RegionalTrain), "RE 7"),
            destination: None,
            departure_stop: dep_stop,
            arrival_stop: arr_stop,
            intermediate_stops: vec![],
            path: vec![],
            message: None,
        })
    }

    #[test]
    fn single_leg_trip() {
        let leg = public_leg(("1", "A"), ("2", "B"), t(10, 0), t(10, 30));
        let trip = Trip::new(
            None,
            Location::station("1", "A"),
            Location::station("2", "B"),
            vec![leg],
            vec![],
            None,
        )
        .unwrap();

        assert_eq!(trip.legs().len(), 1);
        assert_eq!(trip.departure_time(), Some(t(10, 0)));
        assert_eq!(trip.arrival_time(), Some(t(10, 30)));
        assert_eq!(trip.duration(), Some(Duration::minutes(30)));
        assert_eq!(trip.change_count(), 0);
    }

    #[test]
    fn contiguous_by_id() {
        let leg1 = public_leg(("1", "A"), ("2", "B"), t(10, 0), t(10, 30));
        let leg2 = public_leg(("2", "B"), ("3", "C"), t(10, 40), t(11, 0));
        let trip = Trip::new(
            None,
            Location::station("1", "A"),
            Location::station("3", "C"),
            vec![leg1, leg2],
            vec![],
            None,
        )
        .unwrap();
        assert_eq!(trip.change_count(), 1);
    }

    #[test]
    fn discontiguous_legs_rejected() {
        let leg1 = public_leg(("1", "A"), ("2", "B"), t(10, 0), t(10, 30));
        let leg2 = public_leg(("9", "Z"), ("3", "C"), t(10, 40), t(11, 0));
        let result = Trip::new(
            None,
            Location::station("1", "A"),
            Location::station("3", "C"),
            vec![leg1, leg2],
            vec![],
            None,
        );
        assert!(matches!(result, Err(DomainError::LegsNotContiguous { .. })));
    }

    #[test]
    fn contiguous_by_coordinate() {
        // A walk ends on an unidentified coordinate right next to the
        // boarding stop's coordinate.
        let stop_coord = Point::from_degrees(50.0, 8.0);
        let walk = Leg::Individual(IndividualLeg {
            mode: IndividualMode::Walk,
            departure: Location::any_name("Home").with_coord(Point::from_degrees(50.001, 8.0)),
            departure_time: t(9, 50),
            arrival: Location::coordinate(stop_coord),
            arrival_time: t(10, 0),
            path: vec![],
            distance_m: None,
        });

        let mut dep_stop = Stop::new(
            Location::station("2", "B").with_coord(Point::from_degrees(50.000001, 8.0)),
        );
        dep_stop.planned_departure = Some(t(10, 5));
        let mut arr_stop = Stop::new(Location::station("3", "C"));
        arr_stop.planned_arrival = Some(t(10, 30));

        let ride = Leg::Public(PublicLeg {
            line: Line::new(Some(Product::Bus), "100"),
            destination: None,
            departure_stop: dep_stop,
            arrival_stop: arr_stop,
            intermediate_stops: vec![],
            path: vec![],
            message: None,
        });

        let trip = Trip::new(
            None,
            Location::any_name("Home"),
            Location::station("3", "C"),
            vec![walk, ride],
            vec![],
            None,
        );
        assert!(trip.is_ok());
    }

    #[test]
    fn empty_trip_rejected() {
        let result = Trip::new(
            None,
            Location::station("1", "A"),
            Location::station("2", "B"),
            vec![],
            vec![],
            None,
        );
        assert!(matches!(result, Err(DomainError::EmptyTrip)));
    }

    #[test]
    fn reported_change_count_wins() {
        let leg = public_leg(("1", "A"), ("2", "B"), t(10, 0), t(10, 30));
        let trip = Trip::new(
            None,
            Location::station("1", "A"),
            Location::station("2", "B"),
            vec![leg],
            vec![],
            Some(3),
        )
        .unwrap();
        assert_eq!(trip.change_count(), 3);
    }
}
