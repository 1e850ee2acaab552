use std::{error, fmt, process};

use rand09::{rand_core::OsError, rngs::OsRng, TryRngCore as _};

use super::{StdSystemTime, XidGenerator};
use crate::hostid;

impl XidGenerator<StdSystemTime> {
    /// Creates a generator object that embeds the machine identity and process ID of the current
    /// process and starts the counter at a value read from the operating system's random number
    /// generator.
    ///
    /// The machine identity falls back to random bytes if it cannot be resolved; see
    /// [`hostid::machine_identity_or_random`].
    ///
    /// # Errors
    ///
    /// Returns an error if the operating system's random number generator is unavailable when
    /// it is needed. No ID can be generated safely in that case.
    #[cfg_attr(docsrs, doc(cfg(feature = "default_gen")))]
    pub fn try_new() -> Result<Self, GeneratorError> {
        let machine = hostid::machine_identity_or_random()?;

        let mut seed = [0u8; 3];
        fill_random(&mut seed)?;
        let counter_seed = u32::from_be_bytes([0, seed[0], seed[1], seed[2]]);

        Ok(Self::with_parts(
            machine,
            current_pid(),
            counter_seed,
            StdSystemTime,
        ))
    }

    /// Creates a generator object for the current process.
    ///
    /// # Panics
    ///
    /// Panics in the highly unlikely event where the operating system's random number generator
    /// failed to provide secure entropy.
    #[cfg_attr(docsrs, doc(cfg(feature = "default_gen")))]
    pub fn new() -> Self {
        Self::try_new().unwrap_or_else(|err| panic!("could not initialize XidGenerator: {}", err))
    }
}

impl Default for XidGenerator<StdSystemTime> {
    /// Creates a generator object for the current process.
    ///
    /// # Panics
    ///
    /// Panics in the highly unlikely event where the operating system's random number generator
    /// failed to provide secure entropy.
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the process ID of the current process truncated to 16 bits.
pub(crate) fn current_pid() -> u16 {
    process::id() as u16
}

/// Fills `dst` with bytes from the operating system's random number generator.
pub(crate) fn fill_random(dst: &mut [u8]) -> Result<(), GeneratorError> {
    OsRng
        .try_fill_bytes(dst)
        .map_err(|source| GeneratorError { source })
}

/// An error creating a generator because the operating system could not provide secure
/// entropy.
#[derive(Debug)]
#[cfg_attr(docsrs, doc(cfg(feature = "default_gen")))]
pub struct GeneratorError {
    source: OsError,
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not read secure random bytes: {}", self.source)
    }
}

impl error::Error for GeneratorError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&self.source)
    }
}
