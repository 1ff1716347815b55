use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use crate::media::{MediaError, MediaStore};

#[derive(Default)]
pub struct MemoryMediaStore {
    objects: Mutex<HashMap<String, Bytes>>,
    fail_uploads: AtomicBool,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn put(&self, key: &str, body: Bytes, _content_type: &str) -> Result<(), MediaError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(MediaError::Upload {
                key: key.to_string(),
                message: "bucket unavailable".to_string(),
            });
        }
        self.objects.lock().unwrap().insert(key.to_string(), body);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), MediaError> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}
