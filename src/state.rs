use crate::manager::ActivityManager;
use crate::storage::JsonFileStore;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared handle to the one activity manager of the process. The mutex
/// applies requests one at a time.
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<Mutex<ActivityManager<JsonFileStore>>>,
}

impl AppState {
    pub fn new(manager: ActivityManager<JsonFileStore>) -> Self {
        Self {
            manager: Arc::new(Mutex::new(manager)),
        }
    }
}
