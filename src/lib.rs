pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod manager;
pub mod models;
pub mod settings;
pub mod state;
pub mod stats;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::AppConfig;
pub use manager::{ActivityManager, LoadOutcome, StorageStatus};
pub use state::AppState;
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
