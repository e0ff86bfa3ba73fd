//! Energy Model Constants
//!
//! First-order radio model from Heinzelman, Chandrakasan and Balakrishnan,
//! "An application-specific protocol architecture for wireless microsensor
//! networks" (IEEE Trans. Wireless Comm., 2002).
//!
//! ```text
//! E_tx(k, d) = E_elec·k + ε_fs·k·d²   if d < d0
//!            = E_elec·k + ε_mp·k·d⁴   otherwise
//! E_rx(k)    = E_elec·k
//! ```

// ===== RADIO =====

/// Electronics energy per bit, transmit or receive (J/bit).
pub const E_ELEC_J_PER_BIT: f64 = 50e-9;

/// Free-space amplifier energy (J/bit/m²).
pub const E_AMP_J_PER_BIT_M2: f64 = 100e-12;

/// Multipath amplifier energy (J/bit/m⁴).
pub const E_MP_J_PER_BIT_M4: f64 = 0.0013e-12;

/// Crossover distance between free-space and multipath models (m).
///
/// sqrt(ε_fs / ε_mp) ≈ 87.7 m, rounded down.
pub const CROSSOVER_DISTANCE_M: f64 = 87.0;

// ===== PROCESSING =====

/// Data aggregation energy per bit (J/bit).
pub const E_DA_J_PER_BIT: f64 = 5e-9;

/// CPU energy per floating-point operation (J/op).
pub const E_OP_J_PER_OP: f64 = 10e-9;

// ===== PACKETS =====

/// Sensor data packet: 32 bytes.
pub const DATA_PACKET_BITS: u32 = 256;

/// Pull request control packet: 8 bytes.
pub const CONTROL_PACKET_BITS: u32 = 64;

/// Cluster head to sink forwarding distance (m).
pub const FORWARD_DISTANCE_M: f64 = 30.0;

/// Member node to cluster head distance (m).
pub const MEMBER_DISTANCE_M: f64 = 20.0;

// ===== BUDGETS =====

/// Cluster head battery budget (J).
pub const CLUSTER_HEAD_ENERGY_J: f64 = 5.0;

/// Member node battery budget (J).
pub const SENSOR_NODE_ENERGY_J: f64 = 2.0;
