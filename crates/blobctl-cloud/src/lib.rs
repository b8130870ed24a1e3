//! # blobctl-cloud
//!
//! Storage driver layer for blobctl. The [`Driver`] trait is the capability
//! contract (pull, push, list); [`AzureBlobDriver`] is the production
//! implementation, delegating all I/O to `object_store`'s Azure client.
//!
//! The drivers expose a synchronous API: each call is a one-shot operation
//! bridged onto an internal Tokio runtime owned by the driver. There is no
//! retrying, buffering, or concurrency of its own.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod azure;
mod driver;
mod error;

pub use azure::AzureBlobDriver;
pub use driver::{Driver, ObjectStoreDriver};
pub use error::{CloudError, Result};

// Re-export commonly used types from object_store
pub use object_store::{path::Path as ObjectPath, DynObjectStore, ObjectStore};
