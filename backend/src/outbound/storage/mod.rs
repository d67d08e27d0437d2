//! Object storage adapters.

mod local;

pub use local::{LocalObjectStorage, LocalStorageError};
