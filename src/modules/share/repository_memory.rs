use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::modules::share::{repository::ShareRepository, schema::ShareRecord};

#[derive(Clone, Default)]
pub struct ShareRepositoryMemory {
    entries: Arc<RwLock<HashMap<String, ShareRecord>>>,
}

impl ShareRepositoryMemory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ShareRepository for ShareRepositoryMemory {
    async fn put(&self, code: &str, record: ShareRecord) {
        let previous = self.entries.write().await.insert(code.to_string(), record);
        if previous.is_some() {
            log::warn!("Share code {} was overwritten", code);
        }
    }

    async fn get(&self, code: &str) -> Option<ShareRecord> {
        self.entries.read().await.get(code).cloned()
    }

    async fn delete(&self, code: &str) -> Option<ShareRecord> {
        self.entries.write().await.remove(code)
    }

    async fn all_codes(&self) -> Vec<String> {
        self.entries.read().await.keys().cloned().collect()
    }
}
