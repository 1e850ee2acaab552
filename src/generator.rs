//! xid generator and related items.

#[cfg(not(feature = "std"))]
use core as std;

use crate::{Xid, MAX_COUNTER};
use std::{
    iter,
    sync::atomic::{AtomicU32, Ordering},
};

#[cfg(feature = "default_gen")]
mod default_gen;
#[cfg(feature = "default_gen")]
pub use default_gen::GeneratorError;
#[cfg(feature = "default_gen")]
pub(crate) use default_gen::{current_pid, fill_random};

/// Represents an xid generator that mints identifiers from the current time, a fixed machine
/// identity and process ID, and an atomic counter.
///
/// The counter is owned by the generator and advanced with a single atomic operation, so one
/// generator can be shared by reference between any number of threads. Each call returns an
/// ID with a counter value one greater (modulo 2^24) than the previous call, which rules out
/// duplicates within a process until the counter wraps around after 16,777,216 IDs.
///
/// # Examples
///
/// ```rust
/// # #[cfg(feature = "default_gen")]
/// # {
/// use xid::XidGenerator;
///
/// let g = XidGenerator::new();
/// let x = g.generate();
/// let y = g.generate();
/// assert_eq!((x.machine(), x.pid()), (y.machine(), y.pid()));
/// assert_eq!((x.counter() + 1) & xid::MAX_COUNTER, y.counter());
/// # }
/// ```
///
/// Each thread can use the same generator:
///
/// ```rust
/// # #[cfg(feature = "default_gen")]
/// # {
/// use xid::XidGenerator;
///
/// let g = XidGenerator::new();
/// std::thread::scope(|s| {
///     for _ in 0..4 {
///         s.spawn(|| {
///             for _ in 0..4 {
///                 println!("{}", g.generate());
///             }
///         });
///     }
/// });
/// # }
/// ```
#[derive(Debug)]
pub struct XidGenerator<T = StdSystemTime> {
    machine: [u8; 3],
    pid: u16,
    counter: AtomicU32,
    time_source: T,
}

impl<T> XidGenerator<T> {
    /// Creates a generator object with the specified identity, initial counter value, and time
    /// source.
    ///
    /// Only the lower 24 bits of `counter_seed` are used. The first ID generated carries
    /// `counter_seed + 1`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use xid::{TimeSource, XidGenerator};
    ///
    /// struct Fixed;
    /// impl TimeSource for Fixed {
    ///     fn unix_ts_secs(&self) -> u64 {
    ///         1300816219
    ///     }
    /// }
    ///
    /// let g = XidGenerator::with_parts([0x60, 0xf4, 0x86], 0xe428, 4271560, Fixed);
    /// assert_eq!(g.generate().to_string(), "9m4e2mr0ui3e8a215n4g");
    /// ```
    pub const fn with_parts(machine: [u8; 3], pid: u16, counter_seed: u32, time_source: T) -> Self {
        Self {
            machine,
            pid,
            counter: AtomicU32::new(counter_seed & MAX_COUNTER),
            time_source,
        }
    }

    /// Returns the `machine` field value embedded in every ID from this generator.
    pub const fn machine(&self) -> [u8; 3] {
        self.machine
    }

    /// Returns the `pid` field value embedded in every ID from this generator.
    pub const fn pid(&self) -> u16 {
        self.pid
    }

    /// Generates a new xid object from the `unix_ts_secs` passed.
    ///
    /// The timestamp is truncated to its lower 32 bits.
    pub fn generate_with_ts(&self, unix_ts_secs: u64) -> Xid {
        self.compose(unix_ts_secs, self.pid)
    }

    fn compose(&self, unix_ts_secs: u64, pid: u16) -> Xid {
        // fetch_add wraps around on overflow; the mask keeps the post-increment value in 24 bits
        let counter = self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1) & MAX_COUNTER;
        Xid::from_fields(unix_ts_secs as u32, self.machine, pid, counter)
    }
}

impl<T: TimeSource> XidGenerator<T> {
    /// Generates a new xid object from the current time.
    pub fn generate(&self) -> Xid {
        self.generate_with_ts(self.time_source.unix_ts_secs())
    }

    /// Generates a new xid object carrying `pid` in place of the one captured at creation.
    #[cfg(feature = "global_gen")]
    pub(crate) fn generate_for_pid(&self, pid: u16) -> Xid {
        self.compose(self.time_source.unix_ts_secs(), pid)
    }
}

impl<T: TimeSource> Iterator for XidGenerator<T> {
    type Item = Xid;

    /// Returns a new xid object for each call, infinitely.
    ///
    /// This method wraps the result of [`generate`](XidGenerator::generate) with [`Some`].
    fn next(&mut self) -> Option<Self::Item> {
        Some(self.generate())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl<T: TimeSource> iter::FusedIterator for XidGenerator<T> {}

impl<T: TimeSource> Iterator for &XidGenerator<T> {
    type Item = Xid;

    /// Returns a new xid object for each call, infinitely, from a shared generator.
    ///
    /// This lets several threads draw from one generator with iterator adapters.
    fn next(&mut self) -> Option<Self::Item> {
        Some(self.generate())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl<T: TimeSource> iter::FusedIterator for &XidGenerator<T> {}

/// A trait that defines the time source for the generator.
pub trait TimeSource {
    /// Returns the current Unix time in seconds.
    fn unix_ts_secs(&self) -> u64;
}

/// The default [`TimeSource`] that uses [`std::time::SystemTime`].
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Default)]
pub struct StdSystemTime;

#[cfg(feature = "std")]
impl TimeSource for StdSystemTime {
    /// Returns the current Unix time in seconds, or zero if the clock is set before the epoch.
    fn unix_ts_secs(&self) -> u64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs())
    }
}
