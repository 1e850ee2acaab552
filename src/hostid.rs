//! Machine identity resolution.
//!
//! The `machine` field of an xid is the first three bytes of the SHA-256 digest of a stable
//! platform identifier: the systemd/D-Bus machine ID on Linux, the host UUID on macOS and the
//! BSDs, and the `MachineGuid` registry value on Windows. When no platform identifier is
//! available the host name is hashed instead, and when that fails too the caller is expected
//! to use random bytes.

use std::io;

use sha2::{Digest as _, Sha256};

use crate::generator::{fill_random, GeneratorError};

/// Resolves the 3-byte machine identity of the current host.
///
/// # Errors
///
/// Returns an error if neither the platform machine identifier nor the host name can be read.
///
/// # Examples
///
/// ```rust
/// match xid::hostid::resolve_machine_identity() {
///     Ok(machine) => println!("machine: {:02x?}", machine),
///     Err(err) => println!("no machine identity: {}", err),
/// }
/// ```
pub fn resolve_machine_identity() -> io::Result<[u8; 3]> {
    let id = non_empty(platform::read_machine_id()).or_else(|_| non_empty(read_hostname()))?;
    Ok(hash_machine_id(&id))
}

/// Resolves the machine identity, falling back to three random bytes if it cannot be resolved.
///
/// # Errors
///
/// Returns an error only if the fallback fails because the operating system's random number
/// generator is unavailable.
pub fn machine_identity_or_random() -> Result<[u8; 3], GeneratorError> {
    or_random(resolve_machine_identity())
}

/// Replaces a failed resolution with three bytes from the operating system's random number
/// generator.
fn or_random(resolved: io::Result<[u8; 3]>) -> Result<[u8; 3], GeneratorError> {
    match resolved {
        Ok(machine) => Ok(machine),
        Err(_err) => {
            #[cfg(feature = "log")]
            log::warn!("xid: could not resolve machine identity, using random bytes: {}", _err);

            let mut machine = [0u8; 3];
            fill_random(&mut machine)?;
            Ok(machine)
        }
    }
}

/// Derives the 3-byte machine identity from a platform identifier string.
pub fn hash_machine_id(id: &str) -> [u8; 3] {
    let digest = Sha256::digest(id.as_bytes());
    [digest[0], digest[1], digest[2]]
}

/// Trims surrounding whitespace and rejects an empty identifier.
fn non_empty(result: io::Result<String>) -> io::Result<String> {
    let id = result?;
    match id.trim() {
        "" => Err(io::Error::new(io::ErrorKind::InvalidData, "empty identifier")),
        trimmed => Ok(trimmed.to_owned()),
    }
}

/// Returns the standard output of a command that exited successfully.
#[cfg(not(target_os = "linux"))]
fn command_output(program: &str, args: &[&str]) -> io::Result<String> {
    let output = std::process::Command::new(program).args(args).output()?;
    if !output.status.success() {
        return Err(io::Error::other(format!(
            "`{}` exited with {}",
            program, output.status
        )));
    }
    String::from_utf8(output.stdout).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

/// Extracts the `MachineGuid` value from the output of
/// `reg query HKLM\SOFTWARE\Microsoft\Cryptography /v MachineGuid`.
#[cfg(any(windows, test))]
fn parse_reg_machine_guid(output: &str) -> io::Result<String> {
    // e.g., "    MachineGuid    REG_SZ    0d3cf4f6-..."
    output
        .lines()
        .map(str::split_whitespace)
        .find_map(|mut fields| match (fields.next(), fields.next(), fields.next()) {
            (Some("MachineGuid"), Some("REG_SZ"), Some(value)) => Some(value.to_owned()),
            _ => None,
        })
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "MachineGuid not found"))
}

#[cfg(target_os = "linux")]
fn read_hostname() -> io::Result<String> {
    std::fs::read_to_string("/proc/sys/kernel/hostname")
}

#[cfg(not(target_os = "linux"))]
fn read_hostname() -> io::Result<String> {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .or_else(|_| command_output("hostname", &[]))
        .map_err(|_| io::Error::new(io::ErrorKind::NotFound, "host name not found"))
}

#[cfg(target_os = "linux")]
mod platform {
    use super::{io, non_empty};
    use std::fs;

    pub fn read_machine_id() -> io::Result<String> {
        non_empty(fs::read_to_string("/etc/machine-id"))
            .or_else(|_| fs::read_to_string("/var/lib/dbus/machine-id"))
    }
}

#[cfg(target_os = "macos")]
mod platform {
    use super::{command_output, io};

    pub fn read_machine_id() -> io::Result<String> {
        command_output("sysctl", &["-n", "kern.uuid"])
    }
}

#[cfg(target_os = "freebsd")]
mod platform {
    use super::{command_output, io, non_empty};
    use std::fs;

    pub fn read_machine_id() -> io::Result<String> {
        non_empty(fs::read_to_string("/etc/hostid"))
            .or_else(|_| command_output("sysctl", &["-n", "kern.hostuuid"]))
    }
}

#[cfg(target_os = "openbsd")]
mod platform {
    use super::{command_output, io};

    pub fn read_machine_id() -> io::Result<String> {
        command_output("sysctl", &["-n", "hw.uuid"])
    }
}

#[cfg(windows)]
mod platform {
    use super::{command_output, io, parse_reg_machine_guid};

    pub fn read_machine_id() -> io::Result<String> {
        let output = command_output(
            "reg",
            &[
                "query",
                r"HKLM\SOFTWARE\Microsoft\Cryptography",
                "/v",
                "MachineGuid",
            ],
        )?;
        parse_reg_machine_guid(&output)
    }
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "macos",
    target_os = "freebsd",
    target_os = "openbsd",
    windows
)))]
mod platform {
    use super::io;

    pub fn read_machine_id() -> io::Result<String> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "machine identifier lookup is not supported on this platform",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::{
        hash_machine_id, machine_identity_or_random, non_empty, or_random, parse_reg_machine_guid,
        resolve_machine_identity,
    };
    use std::io;

    /// Hashes identifiers deterministically
    #[test]
    fn hashes_identifiers_deterministically() {
        let a = hash_machine_id("0123456789abcdef0123456789abcdef");
        assert_eq!(a, hash_machine_id("0123456789abcdef0123456789abcdef"));
        assert_ne!(a, hash_machine_id("0123456789abcdef0123456789abcdee"));

        // SHA-256("") = e3b0c442...
        assert_eq!(hash_machine_id(""), [0xe3, 0xb0, 0xc4]);
    }

    /// Rejects blank identifiers
    #[test]
    fn rejects_blank_identifiers() {
        assert!(non_empty(Ok(String::new())).is_err());
        assert!(non_empty(Ok(" \n\t".to_owned())).is_err());
        assert!(non_empty(Err(io::Error::new(io::ErrorKind::NotFound, "x"))).is_err());
        assert_eq!(non_empty(Ok("abc\n".to_owned())).unwrap(), "abc");
    }

    /// Resolves a stable identity
    #[test]
    fn resolves_a_stable_identity() {
        if let Ok(machine) = resolve_machine_identity() {
            assert_eq!(resolve_machine_identity().unwrap(), machine);
            assert_eq!(machine_identity_or_random().unwrap(), machine);
        } else {
            assert!(machine_identity_or_random().is_ok());
        }
    }

    /// Uses systemd machine ID if available
    #[cfg(target_os = "linux")]
    #[test]
    fn uses_systemd_machine_id_if_available() {
        if let Ok(id) = non_empty(std::fs::read_to_string("/etc/machine-id")) {
            assert_eq!(resolve_machine_identity().unwrap(), hash_machine_id(&id));
        }
    }

    /// Falls back to random bytes if resolution fails
    #[test]
    fn falls_back_to_random_bytes_if_resolution_fails() {
        use std::collections::HashSet;

        assert_eq!(or_random(Ok([1, 2, 3])).unwrap(), [1, 2, 3]);

        let mut s = HashSet::new();
        for _ in 0..8 {
            let err = io::Error::new(io::ErrorKind::NotFound, "no machine identity");
            s.insert(or_random(Err(err)).unwrap());
        }
        // eight 24-bit draws colliding into one value is practically impossible
        assert!(s.len() > 1);
    }

    /// Extracts MachineGuid from registry query output
    #[test]
    fn extracts_machine_guid_from_registry_query_output() {
        let output = "\r\nHKEY_LOCAL_MACHINE\\SOFTWARE\\Microsoft\\Cryptography\r\n    \
                      MachineGuid    REG_SZ    0d3cf4f6-5a1b-4c2d-9e8f-0123456789ab\r\n\r\n";
        assert_eq!(
            parse_reg_machine_guid(output).unwrap(),
            "0d3cf4f6-5a1b-4c2d-9e8f-0123456789ab"
        );

        let missing = "\r\nERROR: The system was unable to find the specified registry key or value.\r\n";
        assert!(parse_reg_machine_guid(missing).is_err());
        assert!(parse_reg_machine_guid("").is_err());
        assert!(parse_reg_machine_guid("    MachineGuid    REG_SZ\r\n").is_err());
    }
}
