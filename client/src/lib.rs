/// Class Portal Client Library
/// Local-first storage of portal records with best-effort mirroring to a remote backend

pub mod backup;
pub mod cli;
pub mod cloud;
pub mod error;
pub mod models;
pub mod queue;
pub mod repository;
pub mod storage;
pub mod sync;
pub mod text_import;

pub use cloud::{CloudConfig, CloudSync};
pub use error::{PortalError, Result};
pub use queue::SyncQueue;
pub use repository::Repository;
pub use storage::LocalStore;
