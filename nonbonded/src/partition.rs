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
//! Coarse-grained work partitioning across a fixed thread pool
//!
//! Outer indices are handed out as contiguous chunks from a shared atomic
//! cursor. Chunk size shrinks as work runs out,
//! `remaining / (2 * threads) + 3`, which approximates dynamic load
//! balancing without per-index synchronization: early claims are large to
//! keep cursor traffic low, late claims are small so no thread is left
//! holding a long tail while others idle. The `+ 3` floor biases toward
//! slightly larger minimum chunks to reduce claim frequency; it is a
//! scheduling heuristic, not a correctness requirement.

use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Shared claim cursor over a range of outer indices.
///
/// Any number of threads may call [`WorkQueue::claim`] concurrently; the
/// returned ranges are non-overlapping, monotonically increasing, and
/// together cover `0..total` exactly once.
#[derive(Debug)]
pub struct WorkQueue {
    cursor: AtomicUsize,
    total: usize,
    threads: usize,
}

impl WorkQueue {
    /// Create a queue over `0..total` tuned for `threads` workers.
    ///
    /// With one thread the first claim covers the whole range.
    pub fn new(total: usize, threads: usize) -> Self {
        assert!(threads >= 1, "at least one worker thread is required");
        WorkQueue {
            cursor: AtomicUsize::new(0),
            total,
            threads,
        }
    }

    /// Total number of work units.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Claim the next chunk, or `None` when the range is exhausted.
    ///
    /// Lock-free: the cursor advances by compare-exchange, so a claim
    /// costs one atomic round trip and never blocks other claimants
    /// across any arithmetic.
    pub fn claim(&self) -> Option<Range<usize>> {
        let mut start = self.cursor.load(Ordering::Relaxed);
        loop {
            if start >= self.total {
                return None;
            }
            let chunk = if self.threads == 1 {
                self.total - start
            } else {
                (self.total - start) / (2 * self.threads) + 3
            };
            let end = (start + chunk).min(self.total);
            match self
                .cursor
                .compare_exchange_weak(start, end, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return Some(start..end),
                Err(observed) => start = observed,
            }
        }
    }
}
