//! Failure sentinels reported by the native client library.

use thiserror::Error;

/// Errno-style failure sentinel carried by every failing primitive.
///
/// The native library reports failures as negated POSIX errno values;
/// [`from_raw`](Errno::from_raw) normalizes either sign to the positive
/// code. Translation to text is a pure table lookup, no global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("{} (errno {})", self.description(), self.0)]
pub struct Errno(i32);

impl Errno {
    pub const EPERM: Errno = Errno(1);
    pub const ENOENT: Errno = Errno(2);
    pub const EIO: Errno = Errno(5);
    pub const ENOMEM: Errno = Errno(12);
    pub const EACCES: Errno = Errno(13);
    pub const EEXIST: Errno = Errno(17);
    pub const EINVAL: Errno = Errno(22);
    pub const EFBIG: Errno = Errno(27);
    pub const ENOSPC: Errno = Errno(28);
    pub const ERANGE: Errno = Errno(34);
    pub const EOVERFLOW: Errno = Errno(75);
    pub const ENOTCONN: Errno = Errno(107);
    pub const ESHUTDOWN: Errno = Errno(108);
    pub const ETIMEDOUT: Errno = Errno(110);
    pub const ECONNREFUSED: Errno = Errno(111);

    /// Wrap a sentinel as reported by the native library.
    pub fn from_raw(raw: i32) -> Self {
        Errno(raw.wrapping_abs())
    }

    /// The positive errno code.
    pub fn code(self) -> i32 {
        self.0
    }

    /// Human-readable text for the sentinel, strerror style.
    pub const fn description(self) -> &'static str {
        match self.0 {
            1 => "Operation not permitted",
            2 => "No such file or directory",
            5 => "Input/output error",
            12 => "Cannot allocate memory",
            13 => "Permission denied",
            17 => "File exists",
            22 => "Invalid argument",
            27 => "File too large",
            28 => "No space left on device",
            34 => "Numerical result out of range",
            75 => "Value too large for defined data type",
            107 => "Transport endpoint is not connected",
            108 => "Cannot send after transport endpoint shutdown",
            110 => "Connection timed out",
            111 => "Connection refused",
            _ => "Unknown error",
        }
    }

    /// Whether this sentinel means the named pool or object does not exist.
    pub fn is_not_found(self) -> bool {
        self == Self::ENOENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_normalizes_sign() {
        assert_eq!(Errno::from_raw(-2), Errno::ENOENT);
        assert_eq!(Errno::from_raw(2), Errno::ENOENT);
        assert_eq!(Errno::from_raw(-5).code(), 5);
    }

    #[test]
    fn description_table() {
        assert_eq!(Errno::ENOENT.description(), "No such file or directory");
        assert_eq!(Errno::EEXIST.description(), "File exists");
        assert_eq!(Errno::from_raw(-9999).description(), "Unknown error");
    }

    #[test]
    fn display_carries_code() {
        assert_eq!(
            Errno::EIO.to_string(),
            "Input/output error (errno 5)"
        );
    }

    #[test]
    fn not_found_helper() {
        assert!(Errno::ENOENT.is_not_found());
        assert!(!Errno::EIO.is_not_found());
    }
}
