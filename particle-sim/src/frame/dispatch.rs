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
//! Per-frame fork/join
//!
//! With the `parallel` feature the two frame tasks run on a dedicated
//! two-thread Rayon pool that lives as long as the dispatcher, so no threads
//! are created per frame. Without it the tasks run one after the other on
//! the calling thread.

use crate::error::SimError;

/// Fork/join executor for the integrate and render tasks
pub struct Dispatcher {
    #[cfg(feature = "parallel")]
    pool: rayon::ThreadPool,
}

impl Dispatcher {
    /// Worker threads kept alive for the frame tasks
    pub const WORKERS: usize = 2;

    /// Create the dispatcher and its worker pool
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Workers`] if the pool cannot be started.
    pub fn new() -> Result<Self, SimError> {
        #[cfg(feature = "parallel")]
        {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(Self::WORKERS)
                .thread_name(|index| format!("frame-worker-{}", index))
                .build()
                .map_err(|e| SimError::Workers(e.to_string()))?;
            log::debug!("frame dispatcher started {} workers", Self::WORKERS);
            Ok(Dispatcher { pool })
        }

        #[cfg(not(feature = "parallel"))]
        {
            log::debug!("frame dispatcher running sequentially");
            Ok(Dispatcher {})
        }
    }

    /// Check if the tasks run concurrently
    pub fn is_parallel(&self) -> bool {
        cfg!(feature = "parallel")
    }

    /// Run both tasks and wait for both to finish
    ///
    /// No ordering between the tasks is promised. The sequential fallback
    /// runs `render` first.
    pub fn join<A, B, RA, RB>(&self, integrate: A, render: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        #[cfg(feature = "parallel")]
        {
            self.pool.join(integrate, render)
        }

        #[cfg(not(feature = "parallel"))]
        {
            let rendered = render();
            let integrated = integrate();
            (integrated, rendered)
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("parallel", &self.is_parallel())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_join_runs_both() {
        let dispatcher = Dispatcher::new().unwrap();
        let calls = AtomicUsize::new(0);
        let (a, b) = dispatcher.join(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                1
            },
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                "two"
            },
        );
        assert_eq!((a, b), (1, "two"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_dispatcher_is_reusable() {
        let dispatcher = Dispatcher::new().unwrap();
        let mut left = 0u64;
        let mut right = 0u64;
        for _ in 0..100 {
            dispatcher.join(|| left += 1, || right += 2);
        }
        assert_eq!(left, 100);
        assert_eq!(right, 200);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_tasks_run_off_caller_thread() {
        let dispatcher = Dispatcher::new().unwrap();
        let caller = std::thread::current().id();
        let (a, _) = dispatcher.join(|| std::thread::current().id(), || ());
        assert_ne!(a, caller);
    }
}
