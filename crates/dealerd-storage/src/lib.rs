//! Game record storage for dealerd.
//!
//! Sessions hand their finalized [`GameRecord`] here once a game
//! completes; the analytics layer reads them back through
//! [`GameStore::query`]. Storage is the one resource shared between
//! session tasks, so implementations must serialize concurrent writes
//! internally — callers get a plain handle and never coordinate.
//!
//! The store handle is injected into each session handler at
//! construction. There is no global instance.

mod error;
mod record;
mod store;

pub use error::StorageError;
pub use record::{GameRecord, RecordFilter};
pub use store::{GameStore, JsonStore, MemoryStore};
