//! Per-agency configuration tables.
//!
//! Everything agency-specific the engine consumes is injected here at
//! construction time: the mode vocabulary, the place/name splitting
//! heuristic, the line style lookup, the destination alias table used by
//! departure reconciliation, and the network's default product set.

use std::collections::{BTreeSet, HashMap};

use crate::domain::{Product, Style};
use crate::modes::ModeTable;

/// Splits a raw backend place-name into (place, name).
///
/// Agencies encode the containing city differently ("Berlin, Alexanderplatz",
/// "Alexanderplatz (Berlin)"); the collaborator knows the local convention.
pub trait PlaceSplitter: Send + Sync {
    /// Returns the containing place (if recognized) and the bare name.
    fn split(&self, raw: &str) -> (Option<String>, String);
}

/// Keeps names as-is; for agencies without a place prefix convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSplit;

impl PlaceSplitter for NoSplit {
    fn split(&self, raw: &str) -> (Option<String>, String) {
        (None, raw.to_string())
    }
}

/// Splits on the first ", " separator ("Berlin, Alexanderplatz").
#[derive(Debug, Clone, Copy, Default)]
pub struct CommaSplit;

impl PlaceSplitter for CommaSplit {
    fn split(&self, raw: &str) -> (Option<String>, String) {
        match raw.split_once(", ") {
            Some((place, name)) if !place.is_empty() && !name.is_empty() => {
                (Some(place.to_string()), name.to_string())
            }
            _ => (None, raw.to_string()),
        }
    }
}

/// Looks up the rendering style for a line.
///
/// Styles are opaque to the engine; this is a pass-through to a
/// per-agency color/style table.
pub trait StyleLookup: Send + Sync {
    /// Returns the style for a (network, label) pair, if the table has one.
    fn style(&self, network: Option<&str>, label: &str) -> Option<Style>;
}

/// Style lookup backed by a plain map from line label to style.
#[derive(Debug, Clone, Default)]
pub struct StyleMap {
    styles: HashMap<String, Style>,
}

impl StyleMap {
    /// Builds a map from (label, style) pairs.
    pub fn new<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Style)>,
        S: Into<String>,
    {
        Self {
            styles: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl StyleLookup for StyleMap {
    fn style(&self, _network: Option<&str>, label: &str) -> Option<Style> {
        self.styles.get(label).cloned()
    }
}

/// No styles; lines render with defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStyles;

impl StyleLookup for NoStyles {
    fn style(&self, _network: Option<&str>, _label: &str) -> Option<Style> {
        None
    }
}

/// All per-agency tables bundled together.
pub struct NetworkTables {
    /// Mode vocabulary and route-type rules.
    pub modes: ModeTable,
    /// Place/name splitting heuristic.
    pub places: Box<dyn PlaceSplitter>,
    /// Line style lookup.
    pub styles: Box<dyn StyleLookup>,
    /// Destination name aliases for reconciliation ("HAUPTBAHNHOF" and
    /// "Hbf" naming the same headsign). Keys and values are compared
    /// case-insensitively.
    pub destination_aliases: HashMap<String, String>,
    /// Prefixes marking substitute services in the live feed
    /// ("EV Hauptbahnhof" substituting for "Hauptbahnhof").
    pub substitute_prefixes: Vec<String>,
    /// Products requested when the caller doesn't restrict them.
    pub default_products: BTreeSet<Product>,
}

impl Default for NetworkTables {
    fn default() -> Self {
        Self {
            modes: ModeTable::default(),
            places: Box::new(NoSplit),
            styles: Box::new(NoStyles),
            destination_aliases: HashMap::new(),
            substitute_prefixes: vec!["EV ".to_string(), "SEV ".to_string()],
            default_products: Product::ALL.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_split() {
        let (place, name) = CommaSplit.split("Berlin, Alexanderplatz");
        assert_eq!(place.as_deref(), Some("Berlin"));
        assert_eq!(name, "Alexanderplatz");
    }

    #[test]
    fn comma_split_no_separator() {
        let (place, name) = CommaSplit.split("Alexanderplatz");
        assert_eq!(place, None);
        assert_eq!(name, "Alexanderplatz");
    }

    #[test]
    fn comma_split_empty_halves_left_alone() {
        let (place, name) = CommaSplit.split(", Alexanderplatz");
        assert_eq!(place, None);
        assert_eq!(name, ", Alexanderplatz");
    }

    #[test]
    fn no_split_passthrough() {
        let (place, name) = NoSplit.split("Berlin, Alexanderplatz");
        assert_eq!(place, None);
        assert_eq!(name, "Berlin, Alexanderplatz");
    }

    #[test]
    fn style_map_lookup() {
        let styles = StyleMap::new([("U1", Style("#7DAD4C".to_string()))]);
        assert_eq!(
            styles.style(None, "U1"),
            Some(Style("#7DAD4C".to_string()))
        );
        assert_eq!(styles.style(None, "U2"), None);
    }

    #[test]
    fn default_products_is_all() {
        let tables = NetworkTables::default();
        assert_eq!(tables.default_products.len(), Product::ALL.len());
    }
}
