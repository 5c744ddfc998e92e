//! Object handles and metadata.

use std::time::SystemTime;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::debug;
use transport::{Errno, IoBackend, ObjectStat};

use crate::error::{Error, Result};
use crate::ioctx::IoCtx;
use crate::progress::Progress;

/// Point-in-time name, size, and modification time of one object.
///
/// Objects carry no permission bits and are never directories;
/// [`mode`](ObjectMetadata::mode) and [`is_dir`](ObjectMetadata::is_dir)
/// return fixed values so the type can stand in where file-status fields
/// are expected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    name: String,
    size: i64,
    mtime: SystemTime,
}

impl ObjectMetadata {
    pub(crate) fn from_stat(name: &str, stat: ObjectStat) -> Result<Self> {
        // The wire size is unsigned; a value past i64::MAX cannot be
        // represented by the signed accessor and is rejected outright.
        let size = i64::try_from(stat.size).map_err(|_| Error::Stat {
            target: name.to_string(),
            source: Errno::EOVERFLOW,
        })?;
        Ok(ObjectMetadata {
            name: name.to_string(),
            size,
            mtime: stat.mtime,
        })
    }

    pub(crate) fn set_size(&mut self, size: i64) {
        self.size = size;
    }

    /// Name of the object.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Object length in bytes. Never negative.
    pub fn size(&self) -> i64 {
        self.size
    }

    /// Last modification time.
    pub fn mtime(&self) -> SystemTime {
        self.mtime
    }

    /// Objects have no permission bits.
    pub fn mode(&self) -> u32 {
        0
    }

    /// An object is never a directory.
    pub fn is_dir(&self) -> bool {
        false
    }
}

/// Handle to one named object, with cached metadata.
///
/// The handle borrows the [`IoCtx`] it was derived from and does not own
/// it; several handles may borrow the same context. The cached size and
/// modification time reflect the last stat-carrying operation on this
/// handle ([`stat`](Object::stat), [`get`](Object::get), creation) plus
/// the sizes [`put`](Object::put) and [`truncate`](Object::truncate) pin
/// exactly; they are not kept in sync with writes performed through other
/// handles or by other processes.
pub struct Object<'c, Io: IoBackend> {
    ctx: &'c IoCtx<Io>,
    meta: ObjectMetadata,
}

impl<'c, Io: IoBackend> Object<'c, Io> {
    pub(crate) fn from_parts(ctx: &'c IoCtx<Io>, meta: ObjectMetadata) -> Self {
        Object { ctx, meta }
    }

    /// Name of the object.
    pub fn name(&self) -> &str {
        self.meta.name()
    }

    /// Cached object size in bytes.
    pub fn size(&self) -> i64 {
        self.meta.size()
    }

    /// Cached modification time.
    pub fn mtime(&self) -> SystemTime {
        self.meta.mtime()
    }

    /// The cached metadata as a value.
    pub fn metadata(&self) -> ObjectMetadata {
        self.meta.clone()
    }

    /// Re-synchronize the cached metadata from the cluster.
    pub fn stat(&mut self) -> Result<()> {
        let meta = self.ctx.stat(&self.meta.name)?;
        self.meta = meta;
        Ok(())
    }

    /// Read the whole body. Stats first, refreshing the cached metadata;
    /// see [`IoCtx::get`] for the consistency window this opens.
    pub fn get(&mut self) -> Result<Bytes> {
        self.stat()?;
        self.ctx.read_full(&self.meta.name, self.meta.size())
    }

    /// Overwrite the whole body with `data`. The cached size is pinned to
    /// the payload length; the modification time stays stale until the
    /// next stat.
    pub fn put(&mut self, data: impl AsRef<[u8]>) -> Result<()> {
        let data = data.as_ref();
        self.ctx.put(&self.meta.name, data)?;
        self.meta.set_size(data.len() as i64);
        Ok(())
    }

    /// Append `data` at the current end of the object. The cached size is
    /// left untouched: the new length is not knowable without trusting a
    /// possibly stale cache.
    pub fn append(&self, data: impl AsRef<[u8]>) -> Result<()> {
        self.ctx.append(&self.meta.name, data)
    }

    /// Set the object's length to exactly `size`, zero-filling on growth.
    /// The cached size is pinned to `size`.
    pub fn truncate(&mut self, size: u64) -> Result<()> {
        let cached = i64::try_from(size).map_err(|_| Error::Io {
            op: "truncate",
            oid: self.meta.name.clone(),
            source: Errno::EOVERFLOW,
        })?;
        self.ctx.truncate(&self.meta.name, size)?;
        self.meta.set_size(cached);
        Ok(())
    }

    /// Delete the object, consuming the handle. A removed object's handle
    /// must not be reused, which the move enforces.
    pub fn remove(self) -> Result<()> {
        self.ctx.remove(&self.meta.name)
    }

    /// Read exactly `buf.len()` bytes starting at absolute `offset`.
    ///
    /// A single remote read may move fewer bytes than requested; the loop
    /// keeps issuing reads over the remaining window, advancing the
    /// destination and the offset by whatever each call transferred.
    /// `Ok(n)` is returned only when the buffer was filled completely.
    /// Reaching the end of the object's data first terminates with
    /// [`Error::EndOfObject`] carrying the count accumulated across the
    /// partial reads of this call; a failed remote call terminates with
    /// [`Error::Read`], likewise carrying the count.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        let io = self.ctx.backend()?;
        let mut window = Progress::new(buf.len(), offset);
        while !window.done() {
            debug!(
                "Read {} at offset {} ({} remaining)",
                self.meta.name,
                window.offset(),
                window.remaining()
            );
            let n = io
                .read(
                    &self.meta.name,
                    &mut buf[window.transferred()..],
                    window.offset(),
                )
                .map_err(|source| Error::Read {
                    oid: self.meta.name.clone(),
                    offset: window.offset(),
                    transferred: window.transferred(),
                    source,
                })?;
            if n == 0 {
                return Err(Error::EndOfObject {
                    oid: self.meta.name.clone(),
                    transferred: window.transferred(),
                });
            }
            window.advance(n);
        }
        Ok(window.transferred())
    }

    /// Write all of `data` starting at absolute `offset`.
    ///
    /// Mirrors [`read_at`](Object::read_at) without the end-of-object
    /// terminal: writing past the current end extends the object, zero-
    /// filling any gap. Terminates early only when a remote call fails,
    /// reporting the count transferred up to that point.
    pub fn write_at(&self, data: &[u8], offset: u64) -> Result<usize> {
        let io = self.ctx.backend()?;
        let mut window = Progress::new(data.len(), offset);
        while !window.done() {
            debug!(
                "Write {} at offset {} ({} remaining)",
                self.meta.name,
                window.offset(),
                window.remaining()
            );
            let n = io
                .write(
                    &self.meta.name,
                    &data[window.transferred()..],
                    window.offset(),
                )
                .map_err(|source| Error::Write {
                    oid: self.meta.name.clone(),
                    offset: window.offset(),
                    transferred: window.transferred(),
                    source,
                })?;
            if n == 0 {
                // A call that moves no bytes with data remaining would
                // loop forever; report it as an I/O failure instead.
                return Err(Error::Write {
                    oid: self.meta.name.clone(),
                    offset: window.offset(),
                    transferred: window.transferred(),
                    source: Errno::EIO,
                });
            }
            window.advance(n);
        }
        Ok(window.transferred())
    }
}
