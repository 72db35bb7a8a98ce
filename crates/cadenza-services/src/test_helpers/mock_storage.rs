//! In-memory object store that records every call

use async_trait::async_trait;
use bytes::Bytes;
use cadenza_storage::{ByteStream, Storage, StorageBackend, StorageError, StorageResult};
use std::collections::{HashMap, HashSet};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncRead, AsyncReadExt};

#[derive(Clone, Default)]
pub struct MockStorage {
    objects: Arc<Mutex<HashMap<String, Bytes>>>,
    put_keys: Arc<Mutex<Vec<String>>>,
    deleted_keys: Arc<Mutex<Vec<String>>>,
    failing_extensions: Arc<Mutex<HashSet<String>>>,
    failing_deletes: Arc<Mutex<HashSet<String>>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_object(&self, key: &str, data: Bytes) {
        self.objects.lock().unwrap().insert(key.to_string(), data);
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).map(|b| b.to_vec())
    }

    /// Keys of successful puts, in completion order
    pub fn put_keys(&self) -> Vec<String> {
        self.put_keys.lock().unwrap().clone()
    }

    /// Every key passed to `delete`, failed attempts included
    pub fn deleted_keys(&self) -> Vec<String> {
        self.deleted_keys.lock().unwrap().clone()
    }

    /// Make puts of keys ending in `.{extension}` fail
    pub fn fail_puts_with_extension(&self, extension: &str) {
        self.failing_extensions
            .lock()
            .unwrap()
            .insert(extension.to_lowercase());
    }

    pub fn fail_delete(&self, key: &str) {
        self.failing_deletes.lock().unwrap().insert(key.to_string());
    }

    fn store(&self, key: &str, data: Bytes) -> StorageResult<String> {
        let extension = key.rsplit_once('.').map(|(_, ext)| ext.to_lowercase());
        if let Some(ext) = extension {
            if self.failing_extensions.lock().unwrap().contains(&ext) {
                return Err(StorageError::UploadFailed(format!("injected failure for {}", key)));
            }
        }
        self.objects.lock().unwrap().insert(key.to_string(), data);
        self.put_keys.lock().unwrap().push(key.to_string());
        Ok(key.to_string())
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn put(&self, key: &str, _content_type: &str, data: Bytes) -> StorageResult<String> {
        self.store(key, data)
    }

    async fn put_stream(
        &self,
        key: &str,
        _content_type: &str,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<String> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer).await?;
        self.store(key, Bytes::from(buffer))
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn get_stream(&self, key: &str) -> StorageResult<ByteStream> {
        let data = self.get(key).await?;
        Ok(Box::pin(futures::stream::once(async move { Ok(data) })))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.deleted_keys.lock().unwrap().push(key.to_string());
        if self.failing_deletes.lock().unwrap().contains(key) {
            return Err(StorageError::DeleteFailed(format!("injected failure for {}", key)));
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
