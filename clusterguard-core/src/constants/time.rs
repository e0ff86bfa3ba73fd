//! Time-Related Constants
//!
//! Simulation time is a plain `f64` in seconds (see [`crate::time::SimTime`]).

// ===== TIMERS =====

/// Default interval between metrics log entries (s).
pub const DEFAULT_LOG_INTERVAL: f64 = 100.0;

/// Default interval between pull request rounds (s).
pub const DEFAULT_REQUEST_INTERVAL: f64 = 1.0;

// ===== PROCESSOR =====

/// MICA2 clock: ATmega128L at 8 MHz.
pub const MICA2_CLOCK_HZ: f64 = 8e6;

/// Cycles per floating-point operation in software (no FPU on the ATmega).
pub const MICA2_CYCLES_PER_FLOP: f64 = 100.0;
