//! Domain error types.
//!
//! These represent construction-time validation failures in the canonical
//! model, distinct from wire parse errors and transport errors.

/// Domain-level validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DomainError {
    /// A trip must carry at least one leg.
    #[error("trip must have at least one leg")]
    EmptyTrip,

    /// Adjacent legs don't denote the same interchange place.
    #[error("legs not contiguous: arrival at {arrival}, next departure at {departure}")]
    LegsNotContiguous {
        /// Where the earlier leg arrives.
        arrival: String,
        /// Where the later leg departs.
        departure: String,
    },
}
