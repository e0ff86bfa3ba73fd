//! Trust Tiers
//!
//! Thresholds that sort a source's trust score (`1 - errors / total`) into
//! reporting tiers. Advisory only: detection never reads them.

/// Trust at or above this is reported as reliable.
///
/// Fewer than one error reading in twenty.
pub const TRUST_RELIABLE: f64 = 0.95;

/// Trust at or above this (and below reliable) is reported as moderate.
///
/// Anything lower means at least one reading in five was a lone-source error.
pub const TRUST_MODERATE: f64 = 0.80;

/// Trust of a source that has not reported yet.
pub const TRUST_UNSEEN: f64 = 1.0;
