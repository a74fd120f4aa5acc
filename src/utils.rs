use crate::error::EtlError;
use log::info;
use std::io;
use std::path::Path;

/// Creates `path` (and parents) if needed. Fails if it exists as a non-directory.
pub async fn ensure_dir_exists(path: &Path) -> Result<(), EtlError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(EtlError::NotADirectory(path.to_path_buf()));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating directory: {}", path.display());
            tokio::fs::create_dir_all(path)
                .await
                .map_err(|e| EtlError::DirCreation(path.to_path_buf(), e))
        }
        Err(e) => Err(EtlError::DirMetadata(path.to_path_buf(), e)),
    }
}
