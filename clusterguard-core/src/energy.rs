//! Energy Accounting for Radio and CPU Work
//!
//! ## Model
//!
//! Heinzelman's first-order radio model charges every bit twice: once for
//! the electronics, once for the amplifier, with the amplifier term growing
//! as d² up to the crossover distance and as d⁴ beyond it:
//!
//! ```text
//! transmit(k, d) = E_elec·k + ε_fs·k·d²    d <  d0
//!                = E_elec·k + ε_mp·k·d⁴    d >= d0
//! receive(k)     = E_elec·k
//! aggregate(k)   = E_da·k
//! process(n)     = E_op·n
//! ```
//!
//! ## Accounting Rules
//!
//! - Every charge is added to `consumed`, which therefore never decreases
//! - `remaining` is floored at zero and never goes negative
//! - No charge is ever refused: a depleted accountant keeps counting
//!
//! Refusing to work on an empty battery is the caller's decision; sensor
//! nodes check [`EnergyAccountant::is_alive`] before answering a request,
//! the cluster head never does.
//!
//! ## Example
//!
//! ```rust
//! use clusterguard_core::EnergyAccountant;
//! use clusterguard_core::constants::{E_AMP_J_PER_BIT_M2, E_ELEC_J_PER_BIT};
//!
//! let mut energy = EnergyAccountant::new(2.0);
//! let cost = energy.transmit(256, 30.0);
//!
//! let expected = E_ELEC_J_PER_BIT * 256.0 + E_AMP_J_PER_BIT_M2 * 256.0 * 900.0;
//! assert!((cost - expected).abs() < 1e-15);
//! assert!((energy.consumed() - expected).abs() < 1e-15);
//! ```

use crate::constants::energy::{
    CROSSOVER_DISTANCE_M, E_AMP_J_PER_BIT_M2, E_DA_J_PER_BIT, E_ELEC_J_PER_BIT,
    E_MP_J_PER_BIT_M4, E_OP_J_PER_OP,
};
use crate::constants::time::{MICA2_CLOCK_HZ, MICA2_CYCLES_PER_FLOP};

/// Coefficients of the radio and CPU model
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnergyParameters {
    /// Electronics energy (J/bit)
    pub elec_per_bit: f64,
    /// Free-space amplifier (J/bit/m²)
    pub amp_per_bit_m2: f64,
    /// Multipath amplifier (J/bit/m⁴)
    pub multipath_per_bit_m4: f64,
    /// Aggregation (J/bit)
    pub aggregate_per_bit: f64,
    /// CPU (J/op)
    pub per_operation: f64,
    /// Free-space / multipath crossover (m)
    pub crossover_distance: f64,
}

impl Default for EnergyParameters {
    fn default() -> Self {
        Self {
            elec_per_bit: E_ELEC_J_PER_BIT,
            amp_per_bit_m2: E_AMP_J_PER_BIT_M2,
            multipath_per_bit_m4: E_MP_J_PER_BIT_M4,
            aggregate_per_bit: E_DA_J_PER_BIT,
            per_operation: E_OP_J_PER_OP,
            crossover_distance: CROSSOVER_DISTANCE_M,
        }
    }
}

/// Battery state and cost model for one node
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyAccountant {
    params: EnergyParameters,
    initial: f64,
    remaining: f64,
    consumed: f64,
}

impl EnergyAccountant {
    /// Create an accountant with `initial` joules and default coefficients
    pub fn new(initial: f64) -> Self {
        Self::with_parameters(initial, EnergyParameters::default())
    }

    /// Create an accountant with custom coefficients
    pub fn with_parameters(initial: f64, params: EnergyParameters) -> Self {
        let initial = initial.max(0.0);
        Self {
            params,
            initial,
            remaining: initial,
            consumed: 0.0,
        }
    }

    /// Charge transmitting `bits` over `distance` metres
    pub fn transmit(&mut self, bits: u32, distance: f64) -> f64 {
        let k = bits as f64;
        let amplifier = if distance < self.params.crossover_distance {
            self.params.amp_per_bit_m2 * k * distance * distance
        } else {
            let d2 = distance * distance;
            self.params.multipath_per_bit_m4 * k * d2 * d2
        };
        self.consume(self.params.elec_per_bit * k + amplifier)
    }

    /// Charge receiving `bits`
    pub fn receive(&mut self, bits: u32) -> f64 {
        self.consume(self.params.elec_per_bit * bits as f64)
    }

    /// Charge aggregating `bits`
    pub fn aggregate(&mut self, bits: u32) -> f64 {
        self.consume(self.params.aggregate_per_bit * bits as f64)
    }

    /// Charge `operations` CPU operations
    pub fn process(&mut self, operations: u32) -> f64 {
        self.consume(self.params.per_operation * operations as f64)
    }

    /// Charge an arbitrary amount (negative amounts are ignored)
    pub fn consume(&mut self, energy: f64) -> f64 {
        let energy = energy.max(0.0);
        self.consumed += energy;
        self.remaining = (self.remaining - energy).max(0.0);
        energy
    }

    /// Whether any energy is left
    pub fn is_alive(&self) -> bool {
        self.remaining > 0.0
    }

    /// Remaining energy (J)
    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    /// Total energy charged so far (J)
    pub fn consumed(&self) -> f64 {
        self.consumed
    }

    /// Total energy charged so far (mJ)
    pub fn consumed_millijoules(&self) -> f64 {
        self.consumed * 1000.0
    }

    /// Starting budget (J)
    pub fn initial(&self) -> f64 {
        self.initial
    }

    /// Remaining energy as a percentage of the starting budget
    pub fn remaining_percentage(&self) -> f64 {
        if self.initial <= 0.0 {
            return 0.0;
        }
        self.remaining / self.initial * 100.0
    }

    /// Restore the starting budget and forget all charges
    pub fn reset(&mut self) {
        self.remaining = self.initial;
        self.consumed = 0.0;
    }

    /// Model coefficients
    pub fn parameters(&self) -> &EnergyParameters {
        &self.params
    }

    /// Wall-clock delay of `operations` on a MICA2 mote (s)
    ///
    /// A 4x4 inversion (~1000 ops) takes 12.5 ms.
    pub fn processing_delay(operations: u32) -> f64 {
        operations as f64 * MICA2_CYCLES_PER_FLOP / MICA2_CLOCK_HZ
    }
}
