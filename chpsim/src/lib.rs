//! CHP stabilizer-circuit simulation.
//!
//! `chpsim` simulates Clifford circuits on `n` qubits in the
//! Aaronson-Gottesman tableau model: the state is tracked as the *inverse* of
//! the applied Clifford, gates rewrite the tableau in place over 256-bit
//! lanes, and Z-basis measurements distinguish deterministic outcomes (read
//! straight off the tableau) from random ones (resolved by pivoted
//! elimination on a block-transposed view, then a biased coin).
//!
//! # Quick start
//!
//! ```
//! use chpsim::ChpSimulator;
//!
//! let mut sim = ChpSimulator::with_seed(2, 7);
//! sim.h(0)?;
//! sim.cx(0, 1)?;
//! let bits = sim.measure_many(&[0, 1], 0.5)?;
//! assert_eq!(bits[0], bits[1]); // Bell pair collapses consistently
//! # Ok::<(), chpsim::Error>(())
//! ```
//!
//! Gates can also be dispatched by name through the process-wide gate table:
//!
//! ```
//! use chpsim::ChpSimulator;
//!
//! let mut sim = ChpSimulator::with_seed(3, 0);
//! sim.op("ISWAP", &[0, 2])?;
//! # Ok::<(), chpsim::Error>(())
//! ```
//!
//! # Performance
//!
//! Gate application and measurement are `O(n²/w)` for lane width `w = 256`.
//! A [`measure_many`](ChpSimulator::measure_many) call builds at most one
//! transposed view, shared by all its random targets.
//!
//! # Concurrency
//!
//! A simulator owns its tableau and RNG exclusively; distinct instances are
//! independent and may run on different threads. The gate-name table is
//! immutable after first use and safe to read concurrently.

use derive_more::Display;
use paulitab::{Tableau, TransposedTableau, gate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;

/// Why a simulator call was rejected. All variants are caller errors except
/// [`OutOfMemory`](Error::OutOfMemory).
#[derive(Debug, Display, Clone, PartialEq)]
pub enum Error {
    #[display("qubit index {qubit} is out of range for a {num_qubits}-qubit simulator")]
    QubitOutOfRange { qubit: usize, num_qubits: usize },
    #[display("multi-qubit gates need distinct targets")]
    DuplicateTargets,
    #[display("unrecognized gate name {_0:?}")]
    UnknownGate(String),
    #[display("gate expects {expected} target(s), got {provided}")]
    WrongTargetCount { expected: usize, provided: usize },
    #[display("measurement bias {_0} is outside [0, 1]")]
    BiasOutOfRange(f64),
    #[display("tableau allocation failed")]
    OutOfMemory,
}

impl std::error::Error for Error {}

/// A stabilizer-circuit simulator in the CHP model.
///
/// The simulator stores the inverse of the Clifford applied so far, so a
/// user-facing gate `G` is prepended as `G⁻¹`. Self-inverse gates are
/// unaffected; the `sqrt_*` methods prepend their daggers at this boundary.
#[must_use]
pub struct ChpSimulator {
    inv_state: Tableau,
    rng: StdRng,
}

impl ChpSimulator {
    /// A fresh `num_qubits`-qubit simulator in the all-zeros state, with an
    /// entropy-seeded RNG.
    pub fn new(num_qubits: usize) -> Self {
        Self {
            inv_state: Tableau::identity(num_qubits),
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded variant of [`new`](ChpSimulator::new), for reproducible runs.
    pub fn with_seed(num_qubits: usize, seed: u64) -> Self {
        Self {
            inv_state: Tableau::identity(num_qubits),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Fallible variant of [`new`](ChpSimulator::new); reports allocation
    /// failure instead of aborting.
    pub fn try_new(num_qubits: usize) -> Result<Self, Error> {
        Ok(Self {
            inv_state: Tableau::try_identity(num_qubits).map_err(|_| Error::OutOfMemory)?,
            rng: StdRng::from_entropy(),
        })
    }

    #[must_use]
    pub fn num_qubits(&self) -> usize {
        self.inv_state.num_qubits()
    }

    /// The tracked inverse tableau.
    pub fn inverse_tableau(&self) -> &Tableau {
        &self.inv_state
    }

    fn check_qubit(&self, qubit: usize) -> Result<(), Error> {
        if qubit < self.num_qubits() {
            Ok(())
        } else {
            Err(Error::QubitOutOfRange {
                qubit,
                num_qubits: self.num_qubits(),
            })
        }
    }

    fn check_pair(&self, qubit_a: usize, qubit_b: usize) -> Result<(), Error> {
        self.check_qubit(qubit_a)?;
        self.check_qubit(qubit_b)?;
        if qubit_a == qubit_b {
            return Err(Error::DuplicateTargets);
        }
        Ok(())
    }

    fn check_bias(bias: f64) -> Result<(), Error> {
        if (0.0..=1.0).contains(&bias) {
            Ok(())
        } else {
            Err(Error::BiasOutOfRange(bias))
        }
    }

    pub fn h(&mut self, qubit: usize) -> Result<(), Error> {
        self.check_qubit(qubit)?;
        self.inv_state.prepend_h(qubit);
        Ok(())
    }

    pub fn h_xy(&mut self, qubit: usize) -> Result<(), Error> {
        self.check_qubit(qubit)?;
        self.inv_state.prepend_h_xy(qubit);
        Ok(())
    }

    pub fn h_yz(&mut self, qubit: usize) -> Result<(), Error> {
        self.check_qubit(qubit)?;
        self.inv_state.prepend_h_yz(qubit);
        Ok(())
    }

    pub fn x(&mut self, qubit: usize) -> Result<(), Error> {
        self.check_qubit(qubit)?;
        self.inv_state.prepend_x(qubit);
        Ok(())
    }

    pub fn y(&mut self, qubit: usize) -> Result<(), Error> {
        self.check_qubit(qubit)?;
        self.inv_state.prepend_y(qubit);
        Ok(())
    }

    pub fn z(&mut self, qubit: usize) -> Result<(), Error> {
        self.check_qubit(qubit)?;
        self.inv_state.prepend_z(qubit);
        Ok(())
    }

    /// Applies `√Z` by prepending its dagger into the inverse tableau.
    pub fn sqrt_z(&mut self, qubit: usize) -> Result<(), Error> {
        self.check_qubit(qubit)?;
        self.inv_state.prepend_sqrt_z_dag(qubit);
        Ok(())
    }

    pub fn sqrt_z_dag(&mut self, qubit: usize) -> Result<(), Error> {
        self.check_qubit(qubit)?;
        self.inv_state.prepend_sqrt_z(qubit);
        Ok(())
    }

    /// Applies `√X` by prepending its dagger into the inverse tableau.
    pub fn sqrt_x(&mut self, qubit: usize) -> Result<(), Error> {
        self.check_qubit(qubit)?;
        self.inv_state.prepend_sqrt_x_dag(qubit);
        Ok(())
    }

    pub fn sqrt_x_dag(&mut self, qubit: usize) -> Result<(), Error> {
        self.check_qubit(qubit)?;
        self.inv_state.prepend_sqrt_x(qubit);
        Ok(())
    }

    /// Applies `√Y` by prepending its dagger into the inverse tableau.
    pub fn sqrt_y(&mut self, qubit: usize) -> Result<(), Error> {
        self.check_qubit(qubit)?;
        self.inv_state.prepend_sqrt_y_dag(qubit);
        Ok(())
    }

    pub fn sqrt_y_dag(&mut self, qubit: usize) -> Result<(), Error> {
        self.check_qubit(qubit)?;
        self.inv_state.prepend_sqrt_y(qubit);
        Ok(())
    }

    /// Alias for [`sqrt_z`](ChpSimulator::sqrt_z).
    pub fn s(&mut self, qubit: usize) -> Result<(), Error> {
        self.sqrt_z(qubit)
    }

    /// Alias for [`sqrt_z_dag`](ChpSimulator::sqrt_z_dag).
    pub fn s_dag(&mut self, qubit: usize) -> Result<(), Error> {
        self.sqrt_z_dag(qubit)
    }

    pub fn cx(&mut self, control: usize, target: usize) -> Result<(), Error> {
        self.check_pair(control, target)?;
        self.inv_state.prepend_cx(control, target);
        Ok(())
    }

    pub fn cy(&mut self, control: usize, target: usize) -> Result<(), Error> {
        self.check_pair(control, target)?;
        self.inv_state.prepend_cy(control, target);
        Ok(())
    }

    pub fn cz(&mut self, control: usize, target: usize) -> Result<(), Error> {
        self.check_pair(control, target)?;
        self.inv_state.prepend_cz(control, target);
        Ok(())
    }

    pub fn swap(&mut self, qubit_a: usize, qubit_b: usize) -> Result<(), Error> {
        self.check_pair(qubit_a, qubit_b)?;
        self.inv_state.prepend_swap(qubit_a, qubit_b);
        Ok(())
    }

    /// Apply a gate by name at the given targets.
    ///
    /// Recognized names are those of the process-wide gate table, e.g. `H`,
    /// `SQRT_X_DAG`, `CX`, `ISWAP`, `YCZ`. Dispatch agrees with the named
    /// methods: the table entry already holds the inverse tableau to prepend.
    pub fn op(&mut self, name: &str, targets: &[usize]) -> Result<(), Error> {
        let def = gate(name).ok_or_else(|| Error::UnknownGate(name.to_string()))?;
        if def.arity() != targets.len() {
            return Err(Error::WrongTargetCount {
                expected: def.arity(),
                provided: targets.len(),
            });
        }
        for (position, &target) in targets.iter().enumerate() {
            self.check_qubit(target)?;
            if targets[position + 1..].contains(&target) {
                return Err(Error::DuplicateTargets);
            }
        }
        self.inv_state.inplace_scatter_prepend(def.prepend_tableau(), targets);
        Ok(())
    }

    /// Whether measuring `qubit` in the Z basis has a predetermined outcome.
    ///
    /// Independent of any bias: the outcome is deterministic exactly when
    /// `Z_obs[qubit]` carries no X component.
    pub fn is_deterministic(&self, qubit: usize) -> Result<bool, Error> {
        self.check_qubit(qubit)?;
        Ok(!self.inv_state.z_observable_has_x_part(qubit))
    }

    /// Measure `target` in the Z basis.
    ///
    /// A deterministic outcome is read directly off the tableau. A random
    /// outcome is drawn as a Bernoulli sample with probability `bias` of
    /// being `true`, and the state collapses accordingly.
    pub fn measure(&mut self, target: usize, bias: f64) -> Result<bool, Error> {
        self.check_qubit(target)?;
        Self::check_bias(bias)?;
        if !self.inv_state.z_observable_has_x_part(target) {
            return Ok(self.inv_state.z_sign(target));
        }
        let mut transposed = TransposedTableau::new(&mut self.inv_state);
        Ok(Self::measure_while_transposed(
            &mut transposed,
            &mut self.rng,
            target,
            bias,
        ))
    }

    /// Measure several targets, sharing one transposed view.
    ///
    /// All deterministic outcomes are classified against the state *before*
    /// any collapse; remaining targets then collapse sequentially in index
    /// order, so a later random target sees earlier collapses.
    pub fn measure_many(&mut self, targets: &[usize], bias: f64) -> Result<Vec<bool>, Error> {
        for &target in targets {
            self.check_qubit(target)?;
        }
        Self::check_bias(bias)?;

        let mut results = vec![false; targets.len()];
        let mut pending: SmallVec<[usize; 16]> = SmallVec::new();
        for (position, &target) in targets.iter().enumerate() {
            if self.inv_state.z_observable_has_x_part(target) {
                pending.push(position);
            } else {
                results[position] = self.inv_state.z_sign(target);
            }
        }

        if !pending.is_empty() {
            let mut transposed = TransposedTableau::new(&mut self.inv_state);
            for &position in &pending {
                results[position] =
                    Self::measure_while_transposed(&mut transposed, &mut self.rng, targets[position], bias);
            }
        }
        Ok(results)
    }

    fn measure_while_transposed(
        transposed: &mut TransposedTableau<'_>,
        rng: &mut StdRng,
        target: usize,
        bias: f64,
    ) -> bool {
        let num_qubits = transposed.num_qubits();
        let pivot = (0..num_qubits).find(|&qubit| transposed.z_obs_x_bit(target, qubit));
        let Some(pivot) = pivot else {
            // An earlier collapse in this batch fixed the outcome.
            return transposed.z_sign(target);
        };

        // Cancel the other X / Y components against the pivot.
        for qubit in pivot + 1..num_qubits {
            if transposed.z_obs_x_bit(target, qubit) {
                transposed.append_cx(pivot, qubit);
            }
        }

        // Collapse the pivot onto a single Z generator.
        if transposed.z_obs_z_bit(target, pivot) {
            transposed.append_h_yz(pivot);
        } else {
            transposed.append_h(pivot);
        }

        let coin_flip = rng.gen_bool(bias);
        if transposed.z_sign(target) != coin_flip {
            transposed.append_x(pivot);
        }
        coin_flip
    }
}

impl std::fmt::Debug for ChpSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChpSimulator")
            .field("num_qubits", &self.num_qubits())
            .field("inv_state", &self.inv_state)
            .finish_non_exhaustive()
    }
}
