use crate::{Xid, XidGenerator};
use std::sync::OnceLock;

/// Returns the process-wide generator, creating it on first use.
fn global() -> &'static XidGenerator {
    static G: OnceLock<XidGenerator> = OnceLock::new();

    G.get_or_init(|| {
        let g = XidGenerator::try_new()
            .unwrap_or_else(|err| panic!("xid: could not initialize global generator: {}", err));
        #[cfg(feature = "log")]
        log::debug!(
            "xid: initialized global generator (machine: {:02x?}, pid: {})",
            g.machine(),
            g.pid()
        );
        g
    })
}

/// Generates a new xid object using the global generator.
///
/// This function is thread-safe; multiple threads in a process can call it concurrently and
/// each call receives a distinct counter value. On Unix, IDs generated after a fork carry the
/// process ID of the child process.
///
/// # Panics
///
/// Panics on first use if the operating system's random number generator cannot provide the
/// entropy needed to initialize the global generator.
#[cfg_attr(docsrs, doc(cfg(feature = "global_gen")))]
pub fn new() -> Xid {
    let g = global();

    #[cfg(unix)]
    {
        let pid = crate::generator::current_pid();
        if pid != g.pid() {
            return g.generate_for_pid(pid);
        }
    }

    g.generate()
}

/// Generates a new xid encoded in the 20-digit canonical string representation using the
/// global generator.
///
/// Use this to quickly get a new xid as a string.
///
/// # Examples
///
/// ```rust
/// let x = xid::new_string(); // e.g., "csu7jt2n2rkg2b3hdqtg"
///
/// assert!(regex::Regex::new(r"^[0-9a-v]{19}[0g]$").unwrap().is_match(&x));
/// ```
#[cfg_attr(docsrs, doc(cfg(feature = "global_gen")))]
pub fn new_string() -> String {
    new().into()
}
