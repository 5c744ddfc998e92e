//! Client access layer for a RADOS-style object storage cluster.
//!
//! The crate exposes a handle-based API: connect to a cluster with
//! [`Cluster`], derive per-pool I/O contexts with
//! [`Cluster::io_context`], and perform object-level I/O either by name
//! through the [`IoCtx`] or through cached [`Object`] handles, which add
//! positional `read_at`/`write_at` loops over the native partial-transfer
//! read and write primitives.
//!
//! All calls are synchronous and block for the duration of a network round
//! trip; there is no internal scheduler, timeout, or retry beyond the
//! in-loop continuation on partial transfers. The wire protocol itself
//! lives behind the backend traits of the `transport` crate.
//!
//! # Example
//!
//! ```
//! use radosclient::Cluster;
//! use transport::mem::MemConnector;
//!
//! # fn main() -> Result<(), radosclient::Error> {
//! let cluster = Cluster::connect::<MemConnector>(None)?;
//! cluster.pool_create("data")?;
//!
//! let ctx = cluster.io_context("data")?;
//! ctx.put("greeting", b"hello")?;
//! assert_eq!(&ctx.get("greeting")?[..], b"hello");
//!
//! let obj = ctx.open("greeting")?;
//! assert_eq!(obj.size(), 5);
//! let mut word = [0u8; 4];
//! obj.read_at(&mut word, 1)?;
//! assert_eq!(&word, b"ello");
//! # Ok(())
//! # }
//! ```

pub mod cluster;
pub mod error;
pub mod ioctx;
pub mod object;
mod progress;

pub use cluster::Cluster;
pub use error::{Error, Result};
pub use ioctx::{IoCtx, PoolInfo};
pub use object::{Object, ObjectMetadata};
