//! Usage and metadata records returned by the native stat primitives.

use std::time::SystemTime;

/// Cluster-wide usage. Sizes are in kilobytes, matching the native
/// convention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClusterStat {
    /// Total cluster capacity.
    pub kb: u64,
    /// Kilobytes in use.
    pub kb_used: u64,
    /// Kilobytes still available.
    pub kb_avail: u64,
    /// Objects stored cluster-wide.
    pub num_objects: u64,
}

/// Per-pool usage as reported by the pool stat primitive.
///
/// Field names follow the native record layout; the access layer maps them
/// onto its public snapshot type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStat {
    pub num_bytes: u64,
    pub num_kb: u64,
    pub num_objects: u64,
    pub num_object_clones: u64,
    pub num_object_copies: u64,
    pub num_objects_missing_on_primary: u64,
    pub num_objects_unfound: u64,
    pub num_objects_degraded: u64,
    pub num_rd: u64,
    pub num_rd_kb: u64,
    pub num_wr: u64,
    pub num_wr_kb: u64,
}

/// Size and modification time of one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectStat {
    /// Object length in bytes. Unsigned on the wire.
    pub size: u64,
    /// Last modification time.
    pub mtime: SystemTime,
}
