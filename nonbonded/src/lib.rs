// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! # Non-bonded pair-interaction kernels
//!
//! SIMD-accelerated evaluation of short-range non-bonded forces and
//! energies (electrostatics plus Lennard-Jones dispersion/repulsion)
//! between particles, driven by precomputed neighbor lists, periodic-shift
//! vectors and tabulated cubic-spline potentials. This is the hot path of
//! a molecular simulation step: it is written against a fixed-width
//! vector register type, handles neighbor counts not divisible by the
//! vector width through masked remainder batches, and shares one outer
//! index list across worker threads through a lock-free claim cursor.
//!
//! ## What lives here
//!
//! - [`simd`]: the 4-lane register type, reciprocal square root,
//!   gather/scatter transposes, CPU capability reporting
//! - [`table`]: shared cubic-spline potential tables with a batch lookup
//!   and a values-only fast path
//! - [`pairlist`] / [`system`]: the flat, index-addressed data model
//! - [`kernel`]: the per-outer-particle inner loop
//! - [`partition`]: the shrinking-chunk work queue
//! - [`driver`]: whole-pass orchestration with thread-private buffers
//!
//! Out of scope by design: neighbor-list construction, long-range
//! electrostatics, bonded forces, integrators, and all file I/O. Inputs
//! are validated once per pass; violations inside the hot loop (an
//! out-of-range neighbor index) abort rather than return errors, because
//! this core has no recoverable failure modes.
//!
//! ## Example
//!
//! ```rust
//! use nonbonded::driver::run_force_pass;
//! use nonbonded::kernel::NonbondedInput;
//! use nonbonded::pairlist::NeighborList;
//! use nonbonded::system::{Accumulators, PairParams};
//! use nonbonded::table::PotentialTable;
//!
//! // Two unit charges 1.5 apart, tabulated Coulomb + Lennard-Jones.
//! let positions = vec![0.0, 0.0, 0.0, 1.5, 0.0, 0.0];
//! let charges = vec![1.0, 1.0];
//! let type_ids = vec![0, 0];
//! let params = PairParams::new(1);
//! let shift_vectors = vec![0.0, 0.0, 0.0];
//! let table = PotentialTable::standard_coulomb_lj(200.0, 1024);
//!
//! let mut list = NeighborList::new();
//! list.push(0, 0, 0, &[1]);
//!
//! let input = NonbondedInput {
//!     list: &list,
//!     positions: &positions,
//!     charges: &charges,
//!     type_ids: &type_ids,
//!     params: &params,
//!     shift_vectors: &shift_vectors,
//!     coulomb_factor: 1.0,
//!     table: &table,
//! };
//!
//! let mut out = Accumulators::zeroed(2, 1, 1);
//! let stats = run_force_pass(&input, &mut out, 1);
//! assert_eq!(stats.inner_count, 1);
//! ```

#![warn(missing_docs)]

/// Vector math primitives and CPU capability reporting
pub mod simd;

/// Tabulated potential lookup
pub mod table;

/// Neighbor-list data model
pub mod pairlist;

/// Per-particle arrays, pair parameters and accumulators
pub mod system;

/// The pair-interaction kernel
pub mod kernel;

/// Work partitioning across threads
pub mod partition;

/// Whole-pass orchestration
pub mod driver;

pub use driver::{run_energy_pass, run_force_pass, KernelStats};
pub use kernel::NonbondedInput;
pub use pairlist::NeighborList;
pub use system::{Accumulators, PairParams};
pub use table::{PotentialTable, Term, TermSet};
