//! The primitive operations consumed from the native client library.
//!
//! Three traits mirror the three handle kinds the native library exposes:
//! [`Connector`] for the not-yet-connected cluster handle, [`ClusterBackend`]
//! for an established connection, and [`IoBackend`] for a per-pool I/O
//! handle. Every primitive blocks for the duration of a network round trip
//! and reports failure as an [`Errno`] sentinel.

use std::path::Path;

use crate::errno::Errno;
use crate::stats::{ClusterStat, ObjectStat, PoolStat};

/// Result of one native primitive call.
pub type BackendResult<T> = Result<T, Errno>;

/// A cluster handle that has been allocated but not yet connected.
///
/// The native connect sequence is a three-step handshake: allocate the
/// handle, point it at a configuration source, then connect. The typestate
/// here makes issuing I/O on an unconnected handle unrepresentable.
pub trait Connector: Sized {
    type Cluster: ClusterBackend;

    /// Allocate an unconnected handle.
    fn create() -> BackendResult<Self>;

    /// Read configuration from `source`, or from the default search path
    /// when `None`.
    fn configure(&mut self, source: Option<&Path>) -> BackendResult<()>;

    /// Perform the network handshake, consuming the unconnected handle.
    fn connect(self) -> BackendResult<Self::Cluster>;
}

/// An established cluster connection.
pub trait ClusterBackend: Send + Sync {
    type Io: IoBackend;

    /// Query cluster-wide usage.
    fn cluster_stat(&self) -> BackendResult<ClusterStat>;

    /// Create a pool under the default placement and ownership policy.
    fn pool_create(&self, pool: &str) -> BackendResult<()>;

    /// Delete a pool.
    fn pool_delete(&self, pool: &str) -> BackendResult<()>;

    /// Create a per-pool I/O handle. The pool must exist.
    fn io_context(&self, pool: &str) -> BackendResult<Self::Io>;

    /// Tear down the connection. Fire and forget: the native shutdown
    /// primitive has no error channel.
    fn shutdown(&self);
}

/// A per-pool I/O handle.
///
/// `read` and `write` may transfer fewer bytes than requested; callers own
/// the retry loop. `read` returning `Ok(0)` means the offset is at or past
/// the end of the object's data, never an error. `remove` and `truncate`
/// succeed or fail as a unit; their zero sentinel on the wire is a status,
/// not a byte count, and must not be read as one.
pub trait IoBackend: Send + Sync {
    /// Query usage for the pool this handle is bound to.
    fn pool_stat(&self) -> BackendResult<PoolStat>;

    /// Query size and modification time of one object.
    fn stat(&self, oid: &str) -> BackendResult<ObjectStat>;

    /// Delete an object.
    fn remove(&self, oid: &str) -> BackendResult<()>;

    /// Set an object's length exactly. Growing zero-fills, shrinking
    /// discards trailing bytes. Creates the object if absent.
    fn truncate(&self, oid: &str, size: u64) -> BackendResult<()>;

    /// Replace an object's entire body with `data` in one call. Creates
    /// the object if absent.
    fn write_full(&self, oid: &str, data: &[u8]) -> BackendResult<()>;

    /// Append `data` at the current end of the object. The native library
    /// assigns the append position atomically.
    fn append(&self, oid: &str, data: &[u8]) -> BackendResult<()>;

    /// Read into `buf` starting at `offset`, returning the number of bytes
    /// transferred. Never transfers more than `buf.len()`.
    fn read(&self, oid: &str, buf: &mut [u8], offset: u64) -> BackendResult<usize>;

    /// Write `data` at `offset`, returning the number of bytes transferred.
    /// Writing past the current end extends the object, zero-filling any
    /// gap. Creates the object if absent.
    fn write(&self, oid: &str, data: &[u8], offset: u64) -> BackendResult<usize>;

    /// Destroy the handle. Fire and forget, like
    /// [`shutdown`](ClusterBackend::shutdown).
    fn destroy(&self);
}
