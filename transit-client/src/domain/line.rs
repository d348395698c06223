//! Transit line type.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Product;

/// Rendering style for a line.
///
/// Opaque to the engine: it is produced by an injected per-agency lookup
/// and passed through to the caller untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Style(pub String);

/// A transit line (route) as operated by an agency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line {
    /// Backend-assigned line id, if any.
    pub id: Option<String>,
    /// Operating network/agency code.
    pub network: Option<String>,
    /// Canonical product, when the backend mode could be decoded.
    pub product: Option<Product>,
    /// Short display label ("U1", "RE 7").
    pub label: Option<String>,
    /// Long display name, if distinct from the label.
    pub name: Option<String>,
    /// Rendering style from the injected lookup.
    pub style: Option<Style>,
}

impl Line {
    /// Creates a line with just a product and label; the common case in
    /// departure feeds.
    pub fn new(product: Option<Product>, label: impl Into<String>) -> Self {
        Self {
            id: None,
            network: None,
            product,
            label: Some(label.into()),
            name: None,
            style: None,
        }
    }

    /// Whether two lines denote the same route.
    ///
    /// Ids win when both sides have one; otherwise label equality within
    /// the same product is the best available identity. Used by the
    /// departure reconciliation engine to match feeds that disagree on
    /// line ids.
    pub fn same_line(&self, other: &Line) -> bool {
        if let (Some(a), Some(b)) = (&self.id, &other.id) {
            return a == b;
        }
        self.product == other.product && self.label.is_some() && self.label == other.label
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.label, &self.name) {
            (Some(label), _) => f.write_str(label),
            (None, Some(name)) => f.write_str(name),
            (None, None) => f.write_str("?"),
        }
    }
}
