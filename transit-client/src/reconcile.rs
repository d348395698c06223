//! Departure reconciliation.
//!
//! The scheduled ("primary") feed has stable identity but little or no
//! real-time data; the live feed has predicted times but keys departures
//! loosely by line and destination text, under different naming
//! conventions. This module overlays the live predictions onto the
//! primary list.
//!
//! The matching is greedy, in feed order: each live departure picks the
//! primary candidate with the smallest absolute time delta, and a primary
//! entry's prediction is only overwritten by a strictly better delta. One
//! live departure may legitimately serve several primary entries
//! (duplicated real-time broadcasts); no one-to-one matching is enforced.

use std::collections::HashMap;

use chrono::Duration;

use crate::domain::Departure;
use crate::tables::NetworkTables;

/// A prediction may precede its schedule by at most this much and still
/// count as the same departure (feed clock jitter).
fn tolerance() -> Duration {
    Duration::seconds(60)
}

/// Merges live predictions into the primary departure list.
///
/// Returns a new list; the inputs are untouched. The result is always
/// the primary list, with predicted times populated where a live
/// departure matched. Live departures with no match are dropped.
pub fn reconcile(
    primary: &[Departure],
    live: &[Departure],
    tables: &NetworkTables,
) -> Vec<Departure> {
    let mut merged: Vec<Departure> = primary.to_vec();
    // Best absolute delta already assigned, per primary index.
    let mut best_delta: HashMap<usize, i64> = HashMap::new();

    for live_dep in live {
        let live_time = live_dep.time();

        // Best candidate for this live departure, scanning primary in
        // its given order so output stays deterministic.
        let mut best: Option<(usize, i64)> = None;
        for (index, prim) in merged.iter().enumerate() {
            if !destination_matches(prim, live_dep, tables) {
                continue;
            }
            let delta = live_time - prim.planned_time;
            if delta < -tolerance() {
                continue;
            }
            let abs = delta.num_seconds().abs();
            if best.is_none_or(|(_, best_abs)| abs < best_abs) {
                best = Some((index, abs));
            }
        }

        if let Some((index, abs)) = best {
            // Only a strictly better delta may displace an earlier
            // assignment to the same primary entry.
            let improved = best_delta.get(&index).is_none_or(|&prev| abs < prev);
            if improved {
                merged[index].predicted_time = Some(live_time);
                best_delta.insert(index, abs);
            }
        }
        // No match: the live departure is dropped, not an error.
    }

    merged
}

/// Whether a live departure plausibly describes a primary one.
fn destination_matches(primary: &Departure, live: &Departure, tables: &NetworkTables) -> bool {
    if !primary.line.same_line(&live.line) {
        return false;
    }

    let (Some(primary_name), Some(live_name)) =
        (primary.destination.name.as_deref(), live.destination.name.as_deref())
    else {
        return false;
    };

    let primary_norm = normalize(primary_name, tables);
    let live_norm = normalize(live_name, tables);

    if primary_norm == live_norm {
        return true;
    }

    // Shared 3-character prefix catches abbreviation variants
    // ("Hauptbahnhof" vs "Hauptbhf.").
    if shares_prefix(&primary_norm, &live_norm) {
        return true;
    }

    // "EV Hauptbahnhof" is a substitute service for "Hauptbahnhof".
    tables.substitute_prefixes.iter().any(|prefix| {
        live_name
            .strip_prefix(prefix.as_str())
            .is_some_and(|rest| normalize(rest, tables) == primary_norm)
    })
}

/// Uppercases and resolves through the alias table.
fn normalize(name: &str, tables: &NetworkTables) -> String {
    let upper = name.trim().to_uppercase();
    for (alias, canonical) in &tables.destination_aliases {
        if alias.to_uppercase() == upper {
            return canonical.to_uppercase();
        }
    }
    upper
}

fn shares_prefix(a: &str, b: &str) -> bool {
    let a3: String = a.chars().take(3).collect();
    let b3: String = b.chars().take(3).collect();
    a.chars().count() >= 3 && b.chars().count() >= 3 && a3 == b3
}
