//! Candidate pool and the shared "used" set.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use log::warn;

use super::manifest::FALLBACK_POOL;

/// A non-empty, de-duplicated list of video identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePool {
    ids: Vec<String>,
}

impl CandidatePool {
    /// Keeps the first occurrence of each id. `None` if nothing is left.
    pub fn new<I, S>(ids: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let ids: Vec<String> = ids
            .into_iter()
            .map(Into::into)
            .filter(|id| !id.trim().is_empty())
            .filter(|id| seen.insert(id.clone()))
            .collect();
        (!ids.is_empty()).then_some(Self { ids })
    }

    /// The built-in list.
    pub fn fallback() -> Self {
        Self {
            ids: FALLBACK_POOL.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|c| c == id)
    }
}

/// Pool plus used set; draw-and-mark happens under one lock.
#[derive(Debug)]
pub struct PoolState {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    pool: CandidatePool,
    used: HashSet<String>,
    rng: fastrand::Rng,
}

impl PoolState {
    pub fn new(pool: CandidatePool, rng: fastrand::Rng) -> Self {
        Self {
            inner: Mutex::new(Inner {
                pool,
                used: HashSet::new(),
                rng,
            }),
        }
    }

    /// Swap in a freshly loaded pool; the used set starts over.
    pub fn replace_pool(&self, pool: CandidatePool) {
        let mut inner = self.lock();
        inner.pool = pool;
        inner.used.clear();
    }

    /// Pick a not-yet-used candidate uniformly at random and mark it used.
    /// When every candidate is used the set is cleared first.
    pub fn draw(&self) -> String {
        let mut inner = self.lock();
        if inner.used.len() >= inner.pool.len() {
            warn!("video pool: all {} videos used, resetting pool", inner.pool.len());
            inner.used.clear();
        }

        let Inner { pool, used, rng } = &mut *inner;
        let fresh: Vec<&String> = pool.ids.iter().filter(|id| !used.contains(*id)).collect();
        let id = fresh[rng.usize(..fresh.len())].clone();
        used.insert(id.clone());
        id
    }

    pub fn pool(&self) -> CandidatePool {
        self.lock().pool.clone()
    }

    pub fn used_count(&self) -> usize {
        self.lock().used.len()
    }

    pub fn is_used(&self, id: &str) -> bool {
        self.lock().used.contains(id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // The set stays consistent even if a holder panicked mid-draw.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
