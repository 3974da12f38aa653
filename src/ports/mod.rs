//! Port traits defining external boundaries.
//!
//! The export pipeline touches the outside world only through the
//! filesystem. Implementations live in `src/adapters/`.

pub mod filesystem;

pub use filesystem::{FileSystem, FsFuture, PortError};
