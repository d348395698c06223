//! Mode taxonomy mapping.
//!
//! Each backend speaks its own mode vocabulary. A [`ModeTable`] is the
//! per-agency configuration that maps the canonical [`Product`] taxonomy
//! onto that vocabulary and back, including the numeric route-type rules
//! that disambiguate generic tokens.
//!
//! Tables are plain runtime values injected at engine construction, so
//! the same engine code serves every backend.

use std::collections::BTreeSet;

use crate::domain::Product;

/// One numeric route-type rule.
///
/// Rules are consulted in source order and the first match wins; ranges
/// are allowed to overlap, with earlier rules shadowing later ones. That
/// ordering is the contract, not an accident to normalize away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTypeRule {
    /// Matches one exact code.
    Exact {
        /// The code.
        code: i32,
        /// The product it denotes.
        product: Product,
    },
    /// Matches a half-open range `[start, end)`.
    Range {
        /// Inclusive lower bound.
        start: i32,
        /// Exclusive upper bound.
        end: i32,
        /// The product the range denotes.
        product: Product,
    },
}

/// Per-agency mode vocabulary table.
#[derive(Debug, Clone)]
pub struct ModeTable {
    /// Canonical product to backend tokens. A product may own several
    /// tokens (e.g. Cablecar covering both "cable-car" and "funicular").
    pub to_backend: Vec<(Product, Vec<String>)>,
    /// Backend token to canonical product, for decoding.
    pub from_backend: Vec<(String, Product)>,
    /// Ordered numeric route-type rules; consulted before the token map.
    pub route_types: Vec<RouteTypeRule>,
    /// Fallbacks for tokens the inverse map resolves ambiguously
    /// (e.g. a generic "rail" defaulting to RegionalTrain).
    pub fallbacks: Vec<(String, Product)>,
    /// Separator between tokens in the encoded request string.
    pub separator: String,
}

impl ModeTable {
    /// Encodes a product set as the backend's mode-request string.
    ///
    /// Tokens are emitted deduplicated, in the canonical product order
    /// followed by each product's own token order, so identical requests
    /// always serialize identically.
    pub fn encode(&self, products: &BTreeSet<Product>) -> String {
        let mut seen = Vec::new();
        for (product, tokens) in &self.to_backend {
            if !products.contains(product) {
                continue;
            }
            for token in tokens {
                if !seen.iter().any(|t| t == token) {
                    seen.push(token.clone());
                }
            }
        }
        seen.join(&self.separator)
    }

    /// Decodes a backend mode token, optionally disambiguated by a
    /// numeric route-type code.
    ///
    /// `None` means "product unknown", which callers must treat as an
    /// unspecified product, never as a failure.
    pub fn decode(&self, token: &str, route_type: Option<i32>) -> Option<Product> {
        if let Some(code) = route_type
            && let Some(product) = self.decode_route_type(code)
        {
            return Some(product);
        }

        // The inverse map may carry a token more than once; that token is
        // ambiguous and resolved by the fallback table instead.
        let mut matches = self
            .from_backend
            .iter()
            .filter(|(t, _)| t == token)
            .map(|(_, p)| *p);
        let first = matches.next();
        let ambiguous = matches.next().is_some();

        if !ambiguous && first.is_some() {
            return first;
        }

        self.fallbacks
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, p)| *p)
    }

    /// Resolves a numeric route-type code through the ordered rule list.
    ///
    /// Exact-value rules are consulted before ranges; within each class
    /// the first matching rule wins.
    fn decode_route_type(&self, code: i32) -> Option<Product> {
        for rule in &self.route_types {
            if let RouteTypeRule::Exact { code: c, product } = rule
                && *c == code
            {
                return Some(*product);
            }
        }
        for rule in &self.route_types {
            if let RouteTypeRule::Range {
                start,
                end,
                product,
            } = rule
                && (*start..*end).contains(&code)
            {
                return Some(*product);
            }
        }
        None
    }
}

impl Default for ModeTable {
    /// A GTFS-flavoured table usable against backends that follow the
    /// extended route-type convention. Agencies with private vocabularies
    /// supply their own.
    fn default() -> Self {
        let pairs: &[(Product, &[&str])] = &[
            (Product::HighSpeedTrain, &["high_speed_train"]),
            (Product::RegionalTrain, &["regional_train"]),
            (Product::SuburbanTrain, &["suburban_train"]),
            (Product::Subway, &["subway"]),
            (Product::Tram, &["tram"]),
            (Product::Bus, &["bus"]),
            (Product::Ferry, &["ferry"]),
            (Product::Cablecar, &["cable_car", "funicular"]),
            (Product::OnDemand, &["on_demand"]),
        ];

        let to_backend = pairs
            .iter()
            .map(|(p, tokens)| (*p, tokens.iter().map(|t| t.to_string()).collect()))
            .collect::<Vec<_>>();

        let from_backend = pairs
            .iter()
            .flat_map(|(p, tokens)| tokens.iter().map(move |t| (t.to_string(), *p)))
            .chain([
                ("rail".to_string(), Product::HighSpeedTrain),
                ("rail".to_string(), Product::RegionalTrain),
            ])
            .collect();

        // Extended GTFS route types. Exact rules shadow the ranges below
        // them; the 1500 shared-taxi boundary deliberately overlaps the
        // taxi range that follows.
        let route_types = vec![
            RouteTypeRule::Exact {
                code: 0,
                product: Product::Tram,
            },
            RouteTypeRule::Exact {
                code: 1,
                product: Product::Subway,
            },
            RouteTypeRule::Exact {
                code: 2,
                product: Product::RegionalTrain,
            },
            RouteTypeRule::Exact {
                code: 3,
                product: Product::Bus,
            },
            RouteTypeRule::Exact {
                code: 4,
                product: Product::Ferry,
            },
            RouteTypeRule::Exact {
                code: 5,
                product: Product::Cablecar,
            },
            RouteTypeRule::Exact {
                code: 6,
                product: Product::Cablecar,
            },
            RouteTypeRule::Exact {
                code: 7,
                product: Product::Cablecar,
            },
            RouteTypeRule::Range {
                start: 100,
                end: 200,
                product: Product::RegionalTrain,
            },
            RouteTypeRule::Exact {
                code: 101,
                product: Product::HighSpeedTrain,
            },
            RouteTypeRule::Range {
                start: 200,
                end: 300,
                product: Product::Bus,
            },
            RouteTypeRule::Range {
                start: 400,
                end: 500,
                product: Product::Subway,
            },
            RouteTypeRule::Range {
                start: 700,
                end: 800,
                product: Product::Bus,
            },
            RouteTypeRule::Range {
                start: 900,
                end: 1000,
                product: Product::Tram,
            },
            RouteTypeRule::Range {
                start: 1000,
                end: 1100,
                product: Product::Ferry,
            },
            RouteTypeRule::Range {
                start: 1300,
                end: 1400,
                product: Product::Cablecar,
            },
            RouteTypeRule::Range {
                start: 1400,
                end: 1500,
                product: Product::Cablecar,
            },
            RouteTypeRule::Exact {
                code: 1500,
                product: Product::OnDemand,
            },
            RouteTypeRule::Range {
                start: 1500,
                end: 1600,
                product: Product::OnDemand,
            },
        ];

        let fallbacks = vec![("rail".to_string(), Product::RegionalTrain)];

        Self {
            to_backend,
            from_backend,
            route_types,
            fallbacks,
            separator: ",".to_string(),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// decode is a pure function of its inputs.
        #[test]
        fn decode_deterministic(code in -10i32..2000) {
            let table = ModeTable::default();
            let a = table.decode("rail", Some(code));
            let b = table.decode("rail", Some(code));
            prop_assert_eq!(a, b);
        }

        /// Encoding never produces duplicate tokens.
        #[test]
        fn encode_deduplicates(mask in 0u16..512) {
            let table = ModeTable::default();
            let set: BTreeSet<Product> = Product::ALL
                .into_iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, p)| p)
                .collect();
            let encoded = table.encode(&set);
            let tokens: Vec<&str> = encoded
                .split(&table.separator)
                .filter(|t| !t.is_empty())
                .collect();
            let mut deduped = tokens.clone();
            deduped.dedup();
            deduped.sort_unstable();
            deduped.dedup();
            prop_assert_eq!(tokens.len(), deduped.len());
        }
    }
}
