//! Per-open bookkeeping shared by every endpoint.
//!
//! Each open gets its own [SessionToken] recording the minor it was opened
//! against. The open counter is telemetry only: it is never consulted for
//! access control and carries no ordering guarantees between sessions.

use crate::{
    dev::chrdev::Minor,
    error::{Error, Result},
};
use core::sync::atomic::{AtomicIsize, Ordering};
use spin::Mutex;
use utils::slab::Slab;

/// Opaque per-open state. Not cloneable: one token per open.
#[derive(Debug, PartialEq, Eq)]
pub struct SessionToken {
    key: usize,
    minor: Minor,
}

impl SessionToken {
    pub fn minor(&self) -> Minor {
        self.minor
    }
}

pub struct SessionTracker {
    tokens: Mutex<Slab<Minor>>,
    open_counter: AtomicIsize,
    /// Most sessions that may be live at once.
    limit: usize,
}

impl SessionTracker {
    pub const fn new() -> SessionTracker {
        SessionTracker::with_limit(usize::MAX)
    }

    /// A tracker that refuses opens with [Error::OutOfMemory] once `limit`
    /// sessions are live.
    pub const fn with_limit(limit: usize) -> SessionTracker {
        SessionTracker {
            tokens: Mutex::new(Slab::new()),
            open_counter: AtomicIsize::new(0),
            limit,
        }
    }

    pub fn on_open(&self, minor: Minor) -> Result<SessionToken> {
        let mut tokens = self.tokens.lock();
        if tokens.len() >= self.limit {
            return Err(Error::OutOfMemory);
        }
        let key = tokens.try_insert(minor).map_err(|_| Error::OutOfMemory)?;
        drop(tokens);
        self.open_counter.fetch_add(1, Ordering::Relaxed);
        Ok(SessionToken { key, minor })
    }

    pub fn on_release(&self, token: SessionToken) {
        self.tokens.lock().remove(token.key);
        self.open_counter.fetch_sub(1, Ordering::Relaxed);
    }

    /// Opens minus releases so far.
    pub fn open_count(&self) -> isize {
        self.open_counter.load(Ordering::Relaxed)
    }

    pub fn live_sessions(&self) -> usize {
        self.tokens.lock().len()
    }

    pub fn sessions_on(&self, minor: Minor) -> usize {
        self.tokens
            .lock()
            .iter()
            .filter(|(_, open_minor)| **open_minor == minor)
            .count()
    }
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}
