//! I/O context scoping operations to one pool.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use transport::{Errno, IoBackend, PoolStat};

use crate::error::{Error, Result};
use crate::object::{Object, ObjectMetadata};

/// Usage snapshot for one pool.
///
/// Produced fresh by every [`IoCtx::pool_stat`] call; never cached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolInfo {
    pub bytes_used: u64,
    pub kbytes_used: u64,
    pub num_objects: u64,
    pub num_object_clones: u64,
    pub num_object_copies: u64,
    pub num_objects_missing_on_primary: u64,
    pub num_objects_unfound: u64,
    pub num_objects_degraded: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,
    pub kbytes_read: u64,
    pub kbytes_written: u64,
}

impl From<PoolStat> for PoolInfo {
    fn from(stat: PoolStat) -> Self {
        PoolInfo {
            bytes_used: stat.num_bytes,
            kbytes_used: stat.num_kb,
            num_objects: stat.num_objects,
            num_object_clones: stat.num_object_clones,
            num_object_copies: stat.num_object_copies,
            num_objects_missing_on_primary: stat.num_objects_missing_on_primary,
            num_objects_unfound: stat.num_objects_unfound,
            num_objects_degraded: stat.num_objects_degraded,
            bytes_read: stat.num_rd,
            bytes_written: stat.num_wr,
            kbytes_read: stat.num_rd_kb,
            kbytes_written: stat.num_wr_kb,
        }
    }
}

/// I/O context for one pool.
///
/// All object operations are issued through a context. The context owns its
/// per-pool native handle but remains logically dependent on the parent
/// [`Cluster`](crate::Cluster) connection staying open; it does not keep
/// the cluster handle alive. Several [`Object`] handles may borrow one
/// context at a time, which also means the context cannot be released
/// while any of them is alive.
pub struct IoCtx<Io: IoBackend> {
    pool: String,
    io: Io,
    released: bool,
}

impl<Io: IoBackend> IoCtx<Io> {
    pub(crate) fn new(pool: &str, io: Io) -> Self {
        IoCtx {
            pool: pool.to_string(),
            io,
            released: false,
        }
    }

    /// Name of the pool this context is bound to.
    pub fn pool(&self) -> &str {
        &self.pool
    }

    pub(crate) fn backend(&self) -> Result<&Io> {
        if self.released {
            Err(Error::NotConnected)
        } else {
            Ok(&self.io)
        }
    }

    /// Query current pool usage. Always a fresh snapshot, in contrast to
    /// the cluster-level cached figures.
    pub fn pool_stat(&self) -> Result<PoolInfo> {
        let io = self.backend()?;
        debug!("Pool stat for {}", self.pool);
        let stat = io.pool_stat().map_err(|source| Error::Stat {
            target: format!("pool {}", self.pool),
            source,
        })?;
        Ok(stat.into())
    }

    /// Create an empty object named `name` and return a handle to it.
    ///
    /// Writes a zero-length full body, which truncates any existing content
    /// to empty, then stats the object to populate the handle. Concurrent
    /// creators race; the last truncate wins.
    pub fn create(&self, name: &str) -> Result<Object<'_, Io>> {
        info!("Creating object {}", name);
        self.put(name, b"")?;
        let meta = self.stat(name)?;
        Ok(Object::from_parts(self, meta))
    }

    /// Return a handle to the object named `name`, creating an empty one if
    /// it does not exist.
    ///
    /// Stat-then-create, not atomic: a concurrent remove or create between
    /// the two steps races, and the last writer wins.
    pub fn open(&self, name: &str) -> Result<Object<'_, Io>> {
        match self.stat(name) {
            Ok(meta) => Ok(Object::from_parts(self, meta)),
            Err(_) => self.create(name),
        }
    }

    /// Query size and modification time of the object named `name`.
    pub fn stat(&self, name: &str) -> Result<ObjectMetadata> {
        let io = self.backend()?;
        debug!("Stat object {}", name);
        let stat = io.stat(name).map_err(|source| Error::Stat {
            target: name.to_string(),
            source,
        })?;
        ObjectMetadata::from_stat(name, stat)
    }

    /// Read the whole body of the object named `name`.
    ///
    /// Stats the object first to learn its current size; an empty object
    /// returns an empty buffer without a remote read. The read is a single
    /// call sized exactly to the stated length, so a concurrent writer that
    /// grows the object after the stat is not observed.
    pub fn get(&self, name: &str) -> Result<Bytes> {
        let meta = self.stat(name)?;
        self.read_full(name, meta.size())
    }

    pub(crate) fn read_full(&self, name: &str, size: i64) -> Result<Bytes> {
        if size == 0 {
            return Ok(Bytes::new());
        }
        let len = usize::try_from(size).map_err(|_| Error::Io {
            op: "get",
            oid: name.to_string(),
            source: Errno::EOVERFLOW,
        })?;
        let io = self.backend()?;
        debug!("Get {} ({} bytes)", name, len);
        let mut buf = vec![0u8; len];
        let n = io.read(name, &mut buf, 0).map_err(|source| Error::Io {
            op: "get",
            oid: name.to_string(),
            source,
        })?;
        buf.truncate(n);
        Ok(Bytes::from(buf))
    }

    /// Overwrite the whole body of the object named `name` with `data`,
    /// creating it if absent. Existing content is truncated first.
    pub fn put(&self, name: &str, data: impl AsRef<[u8]>) -> Result<()> {
        let data = data.as_ref();
        let io = self.backend()?;
        debug!("Put {} ({} bytes)", name, data.len());
        io.write_full(name, data).map_err(|source| Error::Io {
            op: "put",
            oid: name.to_string(),
            source,
        })
    }

    /// Append `data` at the current end of the object named `name`. The
    /// append position is assigned atomically on the native side.
    pub fn append(&self, name: &str, data: impl AsRef<[u8]>) -> Result<()> {
        let data = data.as_ref();
        let io = self.backend()?;
        debug!("Append {} ({} bytes)", name, data.len());
        io.append(name, data).map_err(|source| Error::Io {
            op: "append",
            oid: name.to_string(),
            source,
        })
    }

    /// Set the length of the object named `name` to exactly `size`.
    /// Growing zero-fills the new range, shrinking discards trailing bytes.
    pub fn truncate(&self, name: &str, size: u64) -> Result<()> {
        let io = self.backend()?;
        debug!("Truncate {} to {} bytes", name, size);
        io.truncate(name, size).map_err(|source| Error::Io {
            op: "truncate",
            oid: name.to_string(),
            source,
        })
    }

    /// Delete the object named `name` unconditionally.
    pub fn remove(&self, name: &str) -> Result<()> {
        let io = self.backend()?;
        info!("Removing object {}", name);
        io.remove(name).map_err(|source| Error::Io {
            op: "remove",
            oid: name.to_string(),
            source,
        })
    }

    /// Release the per-pool handle.
    ///
    /// Idempotent; destruction on the native side is fire and forget. Every
    /// later operation on this context fails with
    /// [`Error::NotConnected`].
    pub fn release(&mut self) {
        if !self.released {
            info!("Releasing io context for pool {}", self.pool);
            self.io.destroy();
            self.released = true;
        }
    }
}

impl<Io: IoBackend> Drop for IoCtx<Io> {
    fn drop(&mut self) {
        self.release();
    }
}
