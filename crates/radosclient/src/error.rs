//! Error types for cluster client operations.

use thiserror::Error;
use transport::Errno;

/// Errors surfaced by cluster, context, and object operations.
///
/// Every variant that wraps a native failure carries the raw sentinel as
/// its source plus the pool or object it concerned. [`EndOfObject`]
/// is a terminal signal for positional reads, not a failure of the remote
/// call itself; positional variants always carry the byte count that
/// completed before the transfer terminated.
///
/// [`EndOfObject`]: Error::EndOfObject
#[derive(Debug, Error)]
pub enum Error {
    /// Connecting failed while allocating the handle, reading the
    /// configuration source, or performing the network handshake.
    #[error("cluster connect ({stage}): {source}")]
    Connection {
        stage: &'static str,
        #[source]
        source: Errno,
    },

    /// The handle was released before the operation was issued.
    #[error("handle is not connected")]
    NotConnected,

    /// Pool creation or deletion was rejected.
    #[error("pool {op} {pool}: {source}")]
    Pool {
        op: &'static str,
        pool: String,
        #[source]
        source: Errno,
    },

    /// An I/O context could not be created for the pool.
    #[error("io context for pool {pool}: {source}")]
    Context {
        pool: String,
        #[source]
        source: Errno,
    },

    /// A cluster, pool, or object stat query failed.
    #[error("stat {target}: {source}")]
    Stat {
        target: String,
        #[source]
        source: Errno,
    },

    /// A whole-object or administrative primitive failed.
    #[error("{op} {oid}: {source}")]
    Io {
        op: &'static str,
        oid: String,
        #[source]
        source: Errno,
    },

    /// A positional read failed after `transferred` bytes had been moved.
    #[error("read {oid} at offset {offset}: {source} ({transferred} bytes transferred)")]
    Read {
        oid: String,
        offset: u64,
        transferred: usize,
        #[source]
        source: Errno,
    },

    /// A positional write failed after `transferred` bytes had been moved.
    #[error("write {oid} at offset {offset}: {source} ({transferred} bytes transferred)")]
    Write {
        oid: String,
        offset: u64,
        transferred: usize,
        #[source]
        source: Errno,
    },

    /// A positional read reached the end of the object's data before the
    /// buffer was filled.
    #[error("end of object {oid}: {transferred} bytes transferred")]
    EndOfObject { oid: String, transferred: usize },
}

impl Error {
    /// Bytes moved before a positional transfer terminated, if this error
    /// came out of `read_at` or `write_at`.
    pub fn transferred(&self) -> Option<usize> {
        match self {
            Error::Read { transferred, .. }
            | Error::Write { transferred, .. }
            | Error::EndOfObject { transferred, .. } => Some(*transferred),
            _ => None,
        }
    }

    /// Whether this is the end-of-object terminal signal.
    pub fn is_end_of_object(&self) -> bool {
        matches!(self, Error::EndOfObject { .. })
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;
