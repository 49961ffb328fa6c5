use axum::body::Bytes;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Flat on-disk store for uploaded images. Files are named by a generated
/// identifier plus the original extension; the database only ever records
/// the bare filename.
#[derive(Clone)]
pub struct LocalImageStorage {
    pub upload_dir: PathBuf,
    pub base_url: String,
}

impl LocalImageStorage {
    pub fn new(upload_dir: String, base_url: String) -> Self {
        Self {
            upload_dir: PathBuf::from(upload_dir),
            base_url,
        }
    }

    pub async fn save_image(
        &self,
        file_bytes: Bytes,
        original_filename: Option<String>,
    ) -> Result<String, io::Error> {
        let extension = original_filename
            .and_then(|name| {
                Path::new(&name)
                    .extension()
                    .and_then(|os_str| os_str.to_str())
                    .map(|s| s.to_owned())
            })
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        let unique_filename = format!("{}{}", Uuid::new_v4(), extension);
        let file_path = self.upload_dir.join(&unique_filename);

        fs::create_dir_all(&self.upload_dir).await?;

        fs::write(&file_path, file_bytes).await?;

        Ok(unique_filename)
    }

    pub async fn delete_image(&self, filename: &str) -> Result<(), io::Error> {
        // Stored filenames are generated identifiers; anything path-like did
        // not come from us.
        if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid image filename",
            ));
        }
        let file_path = self.upload_dir.join(filename);
        fs::remove_file(&file_path).await?;
        Ok(())
    }
}
