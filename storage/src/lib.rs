//! Sled-backed local batch store
//!
//! Batches are kept under `batch:<number>` as bincode-encoded
//! [`StoredBatch`] records.

use async_trait::async_trait;
use dac_core::{BatchStore, StoreError, StoredBatch};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SledBatchStore {
    db: sled::Db,
    path: PathBuf,
}

fn batch_key(batch_number: u64) -> String {
    format!("batch:{}", batch_number)
}

impl SledBatchStore {
    /// Open or create the database
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(&path)
            .map_err(|e| StoreError::Database(format!("Failed to open database: {}", e)))?;
        Ok(Self {
            db,
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Save a batch and flush it to disk
    pub fn put_batch(&self, batch: &StoredBatch) -> Result<(), StoreError> {
        let value = bincode::serialize(batch)
            .map_err(|e| StoreError::Serialization(format!("Failed to serialize batch: {}", e)))?;

        self.db
            .insert(batch_key(batch.batch_number).as_bytes(), value)
            .map_err(|e| StoreError::Database(format!("Failed to save batch: {}", e)))?;
        self.db
            .flush()
            .map_err(|e| StoreError::Database(format!("Failed to flush batch to disk: {}", e)))?;

        debug!(batch_number = batch.batch_number, "stored batch");
        Ok(())
    }

    pub fn load_batch(&self, batch_number: u64) -> Result<Option<StoredBatch>, StoreError> {
        let Some(data) = self
            .db
            .get(batch_key(batch_number).as_bytes())
            .map_err(|e| StoreError::Database(format!("Failed to load batch: {}", e)))?
        else {
            return Ok(None);
        };
        bincode::deserialize(&data)
            .map(Some)
            .map_err(|e| StoreError::Serialization(format!("Failed to deserialize batch: {}", e)))
    }

    pub fn remove_batch(&self, batch_number: u64) -> Result<(), StoreError> {
        self.db
            .remove(batch_key(batch_number).as_bytes())
            .map_err(|e| StoreError::Database(format!("Failed to remove batch: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl BatchStore for SledBatchStore {
    async fn get_batch_l2_data_by_number(
        &self,
        batch_number: u64,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.load_batch(batch_number)?.map(|b| b.batch_l2_data))
    }

    async fn get_batch_by_number(
        &self,
        batch_number: u64,
    ) -> Result<Option<StoredBatch>, StoreError> {
        self.load_batch(batch_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dac_crypto::Hash;
    use tempfile::tempdir;

    fn batch(number: u64) -> StoredBatch {
        StoredBatch {
            batch_number: number,
            acc_input_hash: Hash::new([number as u8; 32]),
            batch_l2_data: vec![number as u8; 3],
        }
    }

    #[test]
    fn test_put_and_load() {
        let dir = tempdir().unwrap();
        let store = SledBatchStore::open(dir.path()).unwrap();

        store.put_batch(&batch(4)).unwrap();
        assert_eq!(store.load_batch(4).unwrap(), Some(batch(4)));
        assert_eq!(store.load_batch(5).unwrap(), None);

        store.remove_batch(4).unwrap();
        assert_eq!(store.load_batch(4).unwrap(), None);
    }

    #[test]
    fn test_corrupt_record() {
        let dir = tempdir().unwrap();
        let store = SledBatchStore::open(dir.path()).unwrap();
        store.db.insert(batch_key(2).as_bytes(), &[0xffu8][..]).unwrap();

        assert!(matches!(
            store.load_batch(2),
            Err(StoreError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_batch_store_interface() {
        let dir = tempdir().unwrap();
        let store = SledBatchStore::open(dir.path()).unwrap();
        store.put_batch(&batch(8)).unwrap();

        assert_eq!(
            store.get_batch_l2_data_by_number(8).await.unwrap(),
            Some(vec![8u8; 3])
        );
        assert_eq!(
            store.get_batch_by_number(8).await.unwrap().map(|b| b.acc_input_hash),
            Some(Hash::new([8; 32]))
        );
        assert_eq!(store.get_batch_l2_data_by_number(9).await.unwrap(), None);
    }
}
