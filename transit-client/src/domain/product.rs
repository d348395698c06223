//! Canonical transport-mode taxonomy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical transport mode.
///
/// Closed set: every backend mode token must map onto exactly one member
/// or onto "unknown" (`None` at the mapping layer). Derives `Ord` so that
/// product sets iterate in a stable order, which keeps encoded mode
/// strings byte-stable across calls.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Product {
    /// Long-distance high-speed rail (ICE, TGV, ...).
    HighSpeedTrain,
    /// Long-distance and inter-regional rail.
    RegionalTrain,
    /// Suburban rail (S-Bahn, RER, ...).
    SuburbanTrain,
    /// Metro / underground.
    Subway,
    /// Tram / light rail.
    Tram,
    /// Bus.
    Bus,
    /// Ferry.
    Ferry,
    /// Cable car, funicular, aerial lift.
    Cablecar,
    /// Demand-responsive transport (dial-a-ride, shared taxi).
    OnDemand,
}

impl Product {
    /// All products, in canonical (stable) order.
    pub const ALL: [Product; 9] = [
        Product::HighSpeedTrain,
        Product::RegionalTrain,
        Product::SuburbanTrain,
        Product::Subway,
        Product::Tram,
        Product::Bus,
        Product::Ferry,
        Product::Cablecar,
        Product::OnDemand,
    ];
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Product::HighSpeedTrain => "high-speed train",
            Product::RegionalTrain => "regional train",
            Product::SuburbanTrain => "suburban train",
            Product::Subway => "subway",
            Product::Tram => "tram",
            Product::Bus => "bus",
            Product::Ferry => "ferry",
            Product::Cablecar => "cablecar",
            Product::OnDemand => "on-demand",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn all_is_complete_and_distinct() {
        let set: BTreeSet<_> = Product::ALL.iter().collect();
        assert_eq!(set.len(), 9);
    }

    #[test]
    fn ordering_is_stable() {
        // BTreeSet iteration must follow ALL's order; the mode encoder
        // depends on this for protocol stability.
        let set: BTreeSet<Product> = Product::ALL.into_iter().collect();
        let collected: Vec<Product> = set.into_iter().collect();
        assert_eq!(collected, Product::ALL.to_vec());
    }
}
