//! Client-side seam onto the native cluster transport.
//!
//! The wire protocol itself (placement, replication, authentication,
//! monitor/OSD RPC) lives in the native client library; this crate defines
//! the narrow surface the access layer consumes from it:
//!
//! - [`Errno`]: the errno-style failure sentinel every primitive reports,
//!   with a strerror-style description table
//! - [`ClusterStat`], [`PoolStat`], [`ObjectStat`]: the usage and metadata
//!   records returned by the stat primitives
//! - [`Connector`], [`ClusterBackend`], [`IoBackend`]: the primitive
//!   operations, grouped by the handle they act on
//! - [`mem`]: an in-memory backend with the same edge semantics, used by
//!   the test suite and examples

pub mod backend;
pub mod errno;
pub mod mem;
pub mod stats;

pub use backend::{BackendResult, ClusterBackend, Connector, IoBackend};
pub use errno::Errno;
pub use stats::{ClusterStat, ObjectStat, PoolStat};
