//! Cluster handle: connection lifecycle, cached usage, pool management.

use std::path::Path;

use tracing::info;
use transport::{ClusterBackend, ClusterStat, Connector};

use crate::error::{Error, Result};
use crate::ioctx::IoCtx;

/// Handle for one cluster connection.
///
/// A `Cluster` owns its connection exclusively and is the root from which
/// per-pool [`IoCtx`] handles are derived. Cluster usage figures are cached
/// on the handle at connect time and replaced by
/// [`refresh_stats`](Cluster::refresh_stats); the accessors never touch the
/// network.
///
/// Contexts derived from a released cluster are on their own: the handle
/// does not track them, and releasing the cluster while contexts are still
/// in use is undefined on the native side. Release contexts first.
pub struct Cluster<B: ClusterBackend> {
    backend: B,
    stats: ClusterStat,
    released: bool,
}

impl<B: ClusterBackend> Cluster<B> {
    /// Connect to the cluster, reading configuration from `config` or from
    /// the default search path when `None`.
    ///
    /// Drives the native allocate → configure → connect sequence and then
    /// performs the initial cluster stat. If that stat fails the connection
    /// is torn down and the error surfaced; a half-initialized handle is
    /// never returned.
    pub fn connect<C>(config: Option<&Path>) -> Result<Self>
    where
        C: Connector<Cluster = B>,
    {
        let mut conn = C::create().map_err(|source| Error::Connection {
            stage: "create",
            source,
        })?;
        conn.configure(config).map_err(|source| Error::Connection {
            stage: "configure",
            source,
        })?;
        let backend = conn.connect().map_err(|source| Error::Connection {
            stage: "connect",
            source,
        })?;
        info!("Connected to cluster");
        Self::new(backend)
    }

    /// Connect using the default configuration search path.
    pub fn connect_default<C>() -> Result<Self>
    where
        C: Connector<Cluster = B>,
    {
        Self::connect::<C>(None)
    }

    /// Wrap an already-connected backend, performing the initial stat
    /// refresh. On failure the connection is shut down and no handle is
    /// returned.
    pub fn new(backend: B) -> Result<Self> {
        let mut cluster = Cluster {
            backend,
            stats: ClusterStat::default(),
            released: false,
        };
        if let Err(e) = cluster.refresh_stats() {
            cluster.release();
            return Err(e);
        }
        Ok(cluster)
    }

    fn guard(&self) -> Result<()> {
        if self.released {
            Err(Error::NotConnected)
        } else {
            Ok(())
        }
    }

    /// Re-query cluster usage and replace the cached snapshot in place.
    pub fn refresh_stats(&mut self) -> Result<()> {
        self.guard()?;
        self.stats = self.backend.cluster_stat().map_err(|source| Error::Stat {
            target: "cluster".to_string(),
            source,
        })?;
        Ok(())
    }

    /// Total cluster capacity in kilobytes, as of the last refresh.
    pub fn size(&self) -> u64 {
        self.stats.kb
    }

    /// Kilobytes in use, as of the last refresh.
    pub fn used(&self) -> u64 {
        self.stats.kb_used
    }

    /// Kilobytes still available, as of the last refresh.
    pub fn avail(&self) -> u64 {
        self.stats.kb_avail
    }

    /// Objects stored cluster-wide, as of the last refresh.
    pub fn num_objects(&self) -> u64 {
        self.stats.num_objects
    }

    /// Create `pool` under the default placement and ownership policy.
    pub fn pool_create(&self, pool: &str) -> Result<()> {
        self.guard()?;
        info!("Creating pool {}", pool);
        self.backend.pool_create(pool).map_err(|source| Error::Pool {
            op: "create",
            pool: pool.to_string(),
            source,
        })
    }

    /// Delete `pool`.
    pub fn pool_delete(&self, pool: &str) -> Result<()> {
        self.guard()?;
        info!("Deleting pool {}", pool);
        self.backend.pool_delete(pool).map_err(|source| Error::Pool {
            op: "delete",
            pool: pool.to_string(),
            source,
        })
    }

    /// Create an I/O context scoped to `pool`. The pool must exist.
    pub fn io_context(&self, pool: &str) -> Result<IoCtx<B::Io>> {
        self.guard()?;
        info!("Creating io context for pool {}", pool);
        let io = self.backend.io_context(pool).map_err(|source| Error::Context {
            pool: pool.to_string(),
            source,
        })?;
        Ok(IoCtx::new(pool, io))
    }

    /// Release the handle and disconnect.
    ///
    /// Idempotent. The native shutdown primitive is fire and forget, so
    /// release itself cannot fail; every later operation on this handle
    /// fails with [`Error::NotConnected`].
    pub fn release(&mut self) {
        if !self.released {
            info!("Releasing cluster handle");
            self.backend.shutdown();
            self.released = true;
        }
    }
}

impl<B: ClusterBackend> Drop for Cluster<B> {
    fn drop(&mut self) {
        self.release();
    }
}
