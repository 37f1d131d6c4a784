//! Local filesystem table backend.
//!
//! Each collection is one file under the root directory holding one JSON
//! array `["key","value"]` per line, in row order. An empty line is a blank
//! row. Every mutation rewrites the whole file through a temp file, fsync and
//! rename, so readers never observe a half-written table.

use crate::error::{StorageError, StorageResult};
use crate::traits::{AppendOutcome, TableStore};
use async_trait::async_trait;
use sheetkv_core::{Row, validate_collection_name};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::instrument;
use uuid::Uuid;

/// File extension of collection files.
const TABLE_EXTENSION: &str = "jsonl";

type Rows = Vec<(String, String)>;

/// Filesystem-backed table store.
pub struct FilesystemBackend {
    root: PathBuf,
    /// Serializes read-modify-write cycles on collection files.
    write_lock: Mutex<()>,
}

impl FilesystemBackend {
    /// Create a new filesystem backend rooted at `root`.
    pub async fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    /// Path of a collection file. The name is validated first so it cannot
    /// escape the root.
    fn table_path(&self, collection: &str) -> StorageResult<PathBuf> {
        validate_collection_name(collection)
            .map_err(|e| StorageError::InvalidName(e.to_string()))?;
        Ok(self.root.join(format!("{collection}.{TABLE_EXTENSION}")))
    }

    async fn load(&self, collection: &str) -> StorageResult<Rows> {
        let path = self.table_path(collection)?;
        let data = fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::CollectionNotFound(collection.to_string())
            } else {
                StorageError::Io(e)
            }
        })?;
        decode_rows(collection, &data)
    }

    async fn store(&self, collection: &str, rows: &[(String, String)]) -> StorageResult<()> {
        let path = self.table_path(collection)?;
        let data = encode_rows(collection, rows)?;

        // Unique temp name so a crashed writer never clobbers another file
        let temp_path = path.with_file_name(format!(
            "{collection}.{TABLE_EXTENSION}.tmp.{}",
            Uuid::new_v4()
        ));
        {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(data.as_bytes()).await?;
            file.sync_all().await?;
        }
        fs::rename(&temp_path, &path).await?;
        Ok(())
    }

    async fn exists(&self, collection: &str) -> StorageResult<bool> {
        let path = self.table_path(collection)?;
        fs::try_exists(&path).await.map_err(StorageError::Io)
    }
}

fn decode_rows(collection: &str, data: &str) -> StorageResult<Rows> {
    data.lines()
        .enumerate()
        .map(|(i, line)| {
            if line.is_empty() {
                return Ok((String::new(), String::new()));
            }
            serde_json::from_str::<(String, String)>(line).map_err(|e| {
                StorageError::Corrupt(format!("{collection} line {}: {e}", i + 1))
            })
        })
        .collect()
}

fn encode_rows(collection: &str, rows: &[(String, String)]) -> StorageResult<String> {
    let mut out = String::new();
    for row in rows {
        let line = serde_json::to_string(row)
            .map_err(|e| StorageError::Corrupt(format!("{collection}: {e}")))?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

fn row_index(rows: &Rows, row: Row) -> Option<usize> {
    let idx = usize::try_from(row).ok()?.checked_sub(1)?;
    (idx < rows.len()).then_some(idx)
}

fn out_of_range(collection: &str, row: Row) -> StorageError {
    StorageError::RowOutOfRange {
        collection: collection.to_string(),
        row,
    }
}

#[async_trait]
impl TableStore for FilesystemBackend {
    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn list_collections(&self) -> StorageResult<Vec<String>> {
        let suffix = format!(".{TABLE_EXTENSION}");
        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(name) = file_name.strip_suffix(&suffix)
                && validate_collection_name(name).is_ok()
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn read_key_column(&self, collection: &str) -> StorageResult<Vec<String>> {
        let rows = self.load(collection).await?;
        Ok(rows.into_iter().map(|(k, _)| k).collect())
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn read_cell(&self, collection: &str, row: Row) -> StorageResult<Option<String>> {
        let mut rows = self.load(collection).await?;
        Ok(row_index(&rows, row).map(|idx| rows.swap_remove(idx).1))
    }

    #[instrument(skip(self, value), fields(backend = "filesystem"))]
    async fn write_cell(&self, collection: &str, row: Row, value: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut rows = self.load(collection).await?;
        let idx = row_index(&rows, row).ok_or_else(|| out_of_range(collection, row))?;
        rows[idx].1 = value.to_string();
        self.store(collection, &rows).await
    }

    #[instrument(skip(self, value), fields(backend = "filesystem"))]
    async fn append_row(
        &self,
        collection: &str,
        key: &str,
        value: &str,
    ) -> StorageResult<AppendOutcome> {
        let _guard = self.write_lock.lock().await;
        let mut rows = self.load(collection).await?;
        rows.push((key.to_string(), value.to_string()));
        let row = Row::try_from(rows.len())
            .map_err(|_| StorageError::Corrupt(format!("{collection}: too many rows")))?;
        self.store(collection, &rows).await?;
        Ok(AppendOutcome::Row(row))
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn delete_row(&self, collection: &str, row: Row) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut rows = self.load(collection).await?;
        let idx = row_index(&rows, row).ok_or_else(|| out_of_range(collection, row))?;
        rows.remove(idx);
        self.store(collection, &rows).await
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn create_collection(&self, name: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        if self.exists(name).await? {
            return Err(StorageError::CollectionExists(name.to_string()));
        }
        self.store(name, &[]).await
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn delete_collection(&self, name: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let path = self.table_path(name)?;
        fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::CollectionNotFound(name.to_string())
            } else {
                StorageError::Io(e)
            }
        })
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn rename_collection(&self, old_name: &str, new_name: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let from = self.table_path(old_name)?;
        let to = self.table_path(new_name)?;
        if !self.exists(old_name).await? {
            return Err(StorageError::CollectionNotFound(old_name.to_string()));
        }
        if self.exists(new_name).await? {
            return Err(StorageError::CollectionExists(new_name.to_string()));
        }
        fs::rename(&from, &to).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }

    async fn health_check(&self) -> StorageResult<()> {
        let meta = fs::metadata(&self.root).await.map_err(|e| {
            StorageError::Unavailable(format!("{}: {e}", self.root.display()))
        })?;
        if !meta.is_dir() {
            return Err(StorageError::Unavailable(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }
        Ok(())
    }
}
