//! # xid: globally unique, k-sortable identifiers
//!
//! An xid is a 96-bit identifier that can be generated without any central coordination and
//! is ordered by the time of creation at one-second granularity. The binary representation is
//! compatible with 12-byte Mongo Object IDs:
//!
//! - 32-bit `timestamp`: seconds since the Unix epoch
//! - 24-bit `machine`: a hash of the host's machine identity, or random bytes
//! - 16-bit `pid`: the lower 16 bits of the process ID
//! - 24-bit `counter`: incremented by one for each new ID, starting at a random value
//!
//! The canonical text representation is 20 digits of lowercase Base32 "extended hex"
//! (`0-9a-v`), which sorts in the same order as the binary form.
//!
//! ```rust
//! # #[cfg(feature = "global_gen")]
//! # {
//! // generate a new identifier object
//! let x = xid::new();
//! println!("{}", x); // e.g., "csu7jt2n2rkg2b3hdqtg"
//! println!("{:?}", x.to_bytes()); // as a 12-byte big-endian array
//!
//! // generate a textual representation directly
//! println!("{}", xid::new_string()); // e.g., "csu7jt2n2rkg2b3hdqug"
//! # }
//! ```
//!
//! See [the xid repository](https://github.com/rs/xid) for the original design.
//!
//! # Crate features
//!
//! Default features:
//!
//! - `std` (implied by `default_gen`) enables, among others, the `String` conversions and
//!   [`StdSystemTime`].
//! - `default_gen` (implied by `global_gen`) enables [`XidGenerator::new`], which resolves the
//!   machine identity and seeds the counter from the operating system's random number
//!   generator.
//! - `global_gen` enables the [`new()`] and [`new_string()`] functions backed by a lazily
//!   initialized process-wide generator.
//!
//! Optional features:
//!
//! - `serde` enables serialization/deserialization of [`Xid`] via serde.
//! - `log` emits diagnostic records through the `log` facade.

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// The byte length of the binary representation.
pub const RAW_LEN: usize = 12;

/// The character length of the canonical text representation.
pub const ENCODED_LEN: usize = 20;

/// The maximum value of the 24-bit `counter` field.
pub const MAX_COUNTER: u32 = 0xff_ffff;

mod id;
pub use id::{InvalidIdError, Xid};

pub mod generator;
pub use generator::{StdSystemTime, TimeSource, XidGenerator};

#[cfg(feature = "default_gen")]
#[cfg_attr(docsrs, doc(cfg(feature = "default_gen")))]
pub mod hostid;

#[cfg(feature = "default_gen")]
pub use generator::GeneratorError;

#[cfg(feature = "global_gen")]
mod global_gen;
#[cfg(feature = "global_gen")]
pub use global_gen::{new, new_string};
