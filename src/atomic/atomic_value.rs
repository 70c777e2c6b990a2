use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use parking_lot::RwLock;

/// Counter that only ever moves forward until explicitly reset.
#[derive(Debug, Default)]
pub struct AtomicMonotonicU64 {
    value: AtomicU64,
}

impl AtomicMonotonicU64 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }

    /// Stores `v` only if it is strictly greater than the current value.
    pub fn store(
        &self,
        v: u64,
    ) {
        self.value.fetch_max(v, Ordering::AcqRel);
    }

    pub fn reset(&self) {
        self.value.store(0, Ordering::Release);
    }
}

/// Wall-clock timestamp. The zero value is the Unix epoch.
#[derive(Debug)]
pub struct AtomicTime {
    time: RwLock<SystemTime>,
}

impl Default for AtomicTime {
    fn default() -> Self {
        Self {
            time: RwLock::new(UNIX_EPOCH),
        }
    }
}

impl AtomicTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(
        &self,
        t: SystemTime,
    ) {
        *self.time.write() = t;
    }

    pub fn load(&self) -> SystemTime {
        *self.time.read()
    }

    pub fn add(
        &self,
        d: Duration,
    ) {
        let mut guard = self.time.write();
        *guard += d;
    }

    /// Returns `self - other`, saturating at zero when `other` is later.
    ///
    /// Both values are read under their own locks, so the pair is not a
    /// consistent snapshot when either side is being written concurrently.
    pub fn sub(
        &self,
        other: &AtomicTime,
    ) -> Duration {
        let other = other.load();
        let this = self.load();
        this.duration_since(other).unwrap_or_default()
    }

    pub fn is_zero(&self) -> bool {
        *self.time.read() == UNIX_EPOCH
    }
}

/// Boolean flag backed by an atomic.
#[derive(Debug, Default)]
pub struct AtomicFlag {
    state: AtomicBool,
}

impl AtomicFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.state.store(true, Ordering::Release);
    }

    pub fn unset(&self) {
        self.state.store(false, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.state.load(Ordering::Acquire)
    }
}

#[derive(Debug, Default)]
pub struct AtomicString {
    value: RwLock<String>,
}

impl AtomicString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(
        &self,
        s: impl Into<String>,
    ) {
        *self.value.write() = s.into();
    }

    pub fn load(&self) -> String {
        self.value.read().clone()
    }
}
