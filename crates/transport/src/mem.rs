//! In-memory backend for tests and examples.
//!
//! Implements the backend traits over a process-local pool/object map with
//! the same edge semantics as the native library: writes, appends, and
//! truncates create missing objects, reads and removes of missing objects
//! fail with `ENOENT`, and pool creation of an existing name fails with
//! `EEXIST`. An optional transfer limit caps how many bytes a single
//! positional read or write call moves, forcing callers through their
//! partial-transfer loops.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;

use crate::backend::{BackendResult, ClusterBackend, Connector, IoBackend};
use crate::errno::Errno;
use crate::stats::{ClusterStat, ObjectStat, PoolStat};

/// Advertised cluster capacity in kilobytes.
const TOTAL_KB: u64 = 1 << 20;

struct StoredObject {
    data: Vec<u8>,
    mtime: SystemTime,
}

impl StoredObject {
    fn new() -> Self {
        StoredObject {
            data: Vec::new(),
            mtime: SystemTime::now(),
        }
    }

    fn touch(&mut self) {
        self.mtime = SystemTime::now();
    }
}

#[derive(Default)]
struct Pool {
    objects: HashMap<String, StoredObject>,
    num_rd: u64,
    num_rd_kb: u64,
    num_wr: u64,
    num_wr_kb: u64,
}

struct Shared {
    pools: Mutex<HashMap<String, Pool>>,
    transfer_limit: Option<usize>,
    down: AtomicBool,
}

impl Shared {
    fn pools(&self) -> MutexGuard<'_, HashMap<String, Pool>> {
        // A panicking test must not wedge every other handle on the map.
        self.pools.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Unconnected in-memory handle; [`connect`](Connector::connect) yields a
/// [`MemCluster`] with a fresh, empty pool map.
#[derive(Default)]
pub struct MemConnector {
    transfer_limit: Option<usize>,
}

impl MemConnector {
    /// Cap single positional read/write calls at `limit` bytes.
    pub fn with_transfer_limit(limit: usize) -> Self {
        MemConnector {
            transfer_limit: Some(limit),
        }
    }
}

impl Connector for MemConnector {
    type Cluster = MemCluster;

    fn create() -> BackendResult<Self> {
        Ok(MemConnector::default())
    }

    fn configure(&mut self, source: Option<&Path>) -> BackendResult<()> {
        match source {
            Some(path) if !path.exists() => Err(Errno::ENOENT),
            _ => Ok(()),
        }
    }

    fn connect(self) -> BackendResult<MemCluster> {
        Ok(MemCluster::new(self.transfer_limit))
    }
}

/// Connected in-memory cluster.
pub struct MemCluster {
    shared: Arc<Shared>,
}

impl MemCluster {
    fn new(transfer_limit: Option<usize>) -> Self {
        MemCluster {
            shared: Arc::new(Shared {
                pools: Mutex::new(HashMap::new()),
                transfer_limit,
                down: AtomicBool::new(false),
            }),
        }
    }

    fn guard(&self) -> BackendResult<()> {
        if self.shared.down.load(Ordering::SeqCst) {
            Err(Errno::ESHUTDOWN)
        } else {
            Ok(())
        }
    }
}

impl ClusterBackend for MemCluster {
    type Io = MemIo;

    fn cluster_stat(&self) -> BackendResult<ClusterStat> {
        self.guard()?;
        let pools = self.shared.pools();
        let mut bytes = 0u64;
        let mut objects = 0u64;
        for pool in pools.values() {
            objects += pool.objects.len() as u64;
            bytes += pool.objects.values().map(|o| o.data.len() as u64).sum::<u64>();
        }
        let kb_used = bytes.div_ceil(1024);
        Ok(ClusterStat {
            kb: TOTAL_KB,
            kb_used,
            kb_avail: TOTAL_KB.saturating_sub(kb_used),
            num_objects: objects,
        })
    }

    fn pool_create(&self, pool: &str) -> BackendResult<()> {
        self.guard()?;
        match self.shared.pools().entry(pool.to_string()) {
            Entry::Occupied(_) => Err(Errno::EEXIST),
            Entry::Vacant(slot) => {
                slot.insert(Pool::default());
                Ok(())
            }
        }
    }

    fn pool_delete(&self, pool: &str) -> BackendResult<()> {
        self.guard()?;
        self.shared.pools().remove(pool).map(|_| ()).ok_or(Errno::ENOENT)
    }

    fn io_context(&self, pool: &str) -> BackendResult<MemIo> {
        self.guard()?;
        if !self.shared.pools().contains_key(pool) {
            return Err(Errno::ENOENT);
        }
        Ok(MemIo {
            shared: Arc::clone(&self.shared),
            pool: pool.to_string(),
            down: AtomicBool::new(false),
        })
    }

    fn shutdown(&self) {
        self.shared.down.store(true, Ordering::SeqCst);
    }
}

/// Per-pool in-memory I/O handle.
pub struct MemIo {
    shared: Arc<Shared>,
    pool: String,
    down: AtomicBool,
}

impl MemIo {
    fn guard(&self) -> BackendResult<()> {
        if self.down.load(Ordering::SeqCst) || self.shared.down.load(Ordering::SeqCst) {
            Err(Errno::ESHUTDOWN)
        } else {
            Ok(())
        }
    }

    fn with_pool<T>(&self, f: impl FnOnce(&mut Pool) -> BackendResult<T>) -> BackendResult<T> {
        self.guard()?;
        let mut pools = self.shared.pools();
        let pool = pools.get_mut(&self.pool).ok_or(Errno::ENOENT)?;
        f(pool)
    }

    fn clamp(&self, len: usize) -> usize {
        match self.shared.transfer_limit {
            Some(limit) => len.min(limit),
            None => len,
        }
    }
}

impl IoBackend for MemIo {
    fn pool_stat(&self) -> BackendResult<PoolStat> {
        self.with_pool(|pool| {
            let num_bytes: u64 = pool.objects.values().map(|o| o.data.len() as u64).sum();
            let num_objects = pool.objects.len() as u64;
            Ok(PoolStat {
                num_bytes,
                num_kb: num_bytes.div_ceil(1024),
                num_objects,
                num_object_clones: 0,
                // Single replica: one stored copy per object.
                num_object_copies: num_objects,
                num_objects_missing_on_primary: 0,
                num_objects_unfound: 0,
                num_objects_degraded: 0,
                num_rd: pool.num_rd,
                num_rd_kb: pool.num_rd_kb,
                num_wr: pool.num_wr,
                num_wr_kb: pool.num_wr_kb,
            })
        })
    }

    fn stat(&self, oid: &str) -> BackendResult<ObjectStat> {
        self.with_pool(|pool| {
            let obj = pool.objects.get(oid).ok_or(Errno::ENOENT)?;
            Ok(ObjectStat {
                size: obj.data.len() as u64,
                mtime: obj.mtime,
            })
        })
    }

    fn remove(&self, oid: &str) -> BackendResult<()> {
        self.with_pool(|pool| pool.objects.remove(oid).map(|_| ()).ok_or(Errno::ENOENT))
    }

    fn truncate(&self, oid: &str, size: u64) -> BackendResult<()> {
        let size = usize::try_from(size).map_err(|_| Errno::EFBIG)?;
        self.with_pool(|pool| {
            let obj = pool.objects.entry(oid.to_string()).or_insert_with(StoredObject::new);
            obj.data.resize(size, 0);
            obj.touch();
            pool.num_wr += 1;
            Ok(())
        })
    }

    fn write_full(&self, oid: &str, data: &[u8]) -> BackendResult<()> {
        self.with_pool(|pool| {
            let obj = pool.objects.entry(oid.to_string()).or_insert_with(StoredObject::new);
            obj.data = data.to_vec();
            obj.touch();
            pool.num_wr += 1;
            pool.num_wr_kb += (data.len() as u64).div_ceil(1024);
            Ok(())
        })
    }

    fn append(&self, oid: &str, data: &[u8]) -> BackendResult<()> {
        self.with_pool(|pool| {
            let obj = pool.objects.entry(oid.to_string()).or_insert_with(StoredObject::new);
            obj.data.extend_from_slice(data);
            obj.touch();
            pool.num_wr += 1;
            pool.num_wr_kb += (data.len() as u64).div_ceil(1024);
            Ok(())
        })
    }

    fn read(&self, oid: &str, buf: &mut [u8], offset: u64) -> BackendResult<usize> {
        let n = self.with_pool(|pool| {
            let obj = pool.objects.get(oid).ok_or(Errno::ENOENT)?;
            if offset >= obj.data.len() as u64 {
                return Ok(0);
            }
            let start = offset as usize;
            let n = self.clamp(buf.len().min(obj.data.len() - start));
            buf[..n].copy_from_slice(&obj.data[start..start + n]);
            pool.num_rd += 1;
            pool.num_rd_kb += (n as u64).div_ceil(1024);
            Ok(n)
        })?;
        Ok(n)
    }

    fn write(&self, oid: &str, data: &[u8], offset: u64) -> BackendResult<usize> {
        let offset = usize::try_from(offset).map_err(|_| Errno::EFBIG)?;
        self.with_pool(|pool| {
            let obj = pool.objects.entry(oid.to_string()).or_insert_with(StoredObject::new);
            let n = self.clamp(data.len());
            let end = offset.checked_add(n).ok_or(Errno::EFBIG)?;
            if obj.data.len() < end {
                obj.data.resize(end, 0);
            }
            obj.data[offset..end].copy_from_slice(&data[..n]);
            obj.touch();
            pool.num_wr += 1;
            pool.num_wr_kb += (n as u64).div_ceil(1024);
            Ok(n)
        })
    }

    fn destroy(&self) {
        self.down.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster() -> MemCluster {
        MemConnector::create().unwrap().connect().unwrap()
    }

    fn io(cluster: &MemCluster) -> MemIo {
        cluster.pool_create("p").unwrap();
        cluster.io_context("p").unwrap()
    }

    #[test]
    fn duplicate_pool_create_fails() {
        let c = cluster();
        c.pool_create("p").unwrap();
        assert_eq!(c.pool_create("p"), Err(Errno::EEXIST));
    }

    #[test]
    fn delete_missing_pool_fails() {
        let c = cluster();
        assert_eq!(c.pool_delete("nope"), Err(Errno::ENOENT));
    }

    #[test]
    fn io_context_requires_pool() {
        let c = cluster();
        assert!(c.io_context("nope").is_err());
    }

    #[test]
    fn configure_rejects_missing_source() {
        let mut conn = MemConnector::create().unwrap();
        assert_eq!(
            conn.configure(Some(Path::new("/no/such/cluster.conf"))),
            Err(Errno::ENOENT)
        );
        assert_eq!(conn.configure(None), Ok(()));
    }

    #[test]
    fn write_creates_missing_object() {
        let c = cluster();
        let io = io(&c);
        assert_eq!(io.write("obj", b"xy", 3).unwrap(), 2);
        let stat = io.stat("obj").unwrap();
        assert_eq!(stat.size, 5);
        let mut buf = [0u8; 5];
        assert_eq!(io.read("obj", &mut buf, 0).unwrap(), 5);
        assert_eq!(&buf, b"\0\0\0xy");
    }

    #[test]
    fn read_missing_object_fails() {
        let c = cluster();
        let io = io(&c);
        let mut buf = [0u8; 4];
        assert_eq!(io.read("nope", &mut buf, 0), Err(Errno::ENOENT));
    }

    #[test]
    fn read_at_end_returns_zero() {
        let c = cluster();
        let io = io(&c);
        io.write_full("obj", b"abc").unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(io.read("obj", &mut buf, 3).unwrap(), 0);
        assert_eq!(io.read("obj", &mut buf, 10).unwrap(), 0);
    }

    #[test]
    fn transfer_limit_caps_each_call() {
        let c = MemConnector::with_transfer_limit(3).connect().unwrap();
        c.pool_create("p").unwrap();
        let io = c.io_context("p").unwrap();
        assert_eq!(io.write("obj", b"12345678", 0).unwrap(), 3);
        let mut buf = [0u8; 8];
        assert_eq!(io.read("obj", &mut buf, 0).unwrap(), 3);
    }

    #[test]
    fn truncate_grows_with_zeros() {
        let c = cluster();
        let io = io(&c);
        io.write_full("obj", b"ab").unwrap();
        io.truncate("obj", 4).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(io.read("obj", &mut buf, 0).unwrap(), 4);
        assert_eq!(&buf, b"ab\0\0");
        io.truncate("obj", 1).unwrap();
        assert_eq!(io.stat("obj").unwrap().size, 1);
    }

    #[test]
    fn pool_stat_tracks_traffic() {
        let c = cluster();
        let io = io(&c);
        io.write_full("obj", b"hello").unwrap();
        let mut buf = [0u8; 5];
        io.read("obj", &mut buf, 0).unwrap();
        let stat = io.pool_stat().unwrap();
        assert_eq!(stat.num_objects, 1);
        assert_eq!(stat.num_bytes, 5);
        assert_eq!(stat.num_kb, 1);
        assert_eq!(stat.num_wr, 1);
        assert_eq!(stat.num_rd, 1);
    }

    #[test]
    fn shutdown_rejects_operations() {
        let c = cluster();
        let io = io(&c);
        c.shutdown();
        assert_eq!(c.pool_create("q"), Err(Errno::ESHUTDOWN));
        assert_eq!(io.stat("obj"), Err(Errno::ESHUTDOWN));
    }

    #[test]
    fn destroy_rejects_io() {
        let c = cluster();
        let io = io(&c);
        io.destroy();
        assert_eq!(io.write_full("obj", b"x"), Err(Errno::ESHUTDOWN));
        // The cluster handle itself is unaffected.
        assert!(c.cluster_stat().is_ok());
    }

    #[test]
    fn cluster_stat_rounds_up_kilobytes() {
        let c = cluster();
        let io = io(&c);
        io.write_full("obj", &[7u8; 10]).unwrap();
        let stat = c.cluster_stat().unwrap();
        assert_eq!(stat.num_objects, 1);
        assert_eq!(stat.kb_used, 1);
        assert_eq!(stat.kb_avail, TOTAL_KB - 1);
    }
}
