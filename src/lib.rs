pub mod config;
pub mod core;
pub mod error;
pub mod repo;
pub mod stats;
pub mod storage;

pub use crate::core::{Chirp, Snapshot};
pub use error::{DbError, Result};
pub use repo::ChirpRepository;
pub use storage::{Database, DatabaseOptions};
