//! The file-save capability used by downloads.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::info;

use crate::encoder::DataUri;
use crate::error::ExportError;

/// Saves an exported image under a file name, without further interaction.
pub trait FileSaver: Send + Sync {
    /// Stores `uri` as `filename` and returns where it ended up.
    fn save(&self, filename: &str, uri: &DataUri) -> Result<PathBuf, ExportError>;
}

/// Writes downloads into a directory, creating it if it doesn't exist.
///
/// An existing file with the same name is overwritten.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    directory: PathBuf,
}

impl DirectorySaver {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        DirectorySaver {
            directory: directory.into(),
        }
    }
}

impl FileSaver for DirectorySaver {
    fn save(&self, filename: &str, uri: &DataUri) -> Result<PathBuf, ExportError> {
        let bytes = uri.decode()?;

        if !self.directory.exists() {
            fs::create_dir_all(&self.directory).map_err(|source| ExportError::Io {
                path: self.directory.clone(),
                source,
            })?;
        }

        let path = self.directory.join(filename);
        fs::write(&path, &bytes).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), bytes = bytes.len(), "saved QR code");
        Ok(path)
    }
}

/// Keeps downloads in memory. Useful for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySaver {
    saved: Mutex<Vec<(String, DataUri)>>,
}

impl MemorySaver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(filename, uri)` pair saved so far, oldest first.
    pub fn saved(&self) -> Vec<(String, DataUri)> {
        self.saved
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl FileSaver for MemorySaver {
    fn save(&self, filename: &str, uri: &DataUri) -> Result<PathBuf, ExportError> {
        self.saved
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((filename.to_string(), uri.clone()));
        Ok(PathBuf::from(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_saver_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("out");
        let saver = DirectorySaver::new(&target);

        let uri = DataUri::from_bytes("image/png", &[1, 2, 3]);
        let path = saver.save("qr-code.png", &uri).unwrap();

        assert_eq!(path, target.join("qr-code.png"));
        assert_eq!(fs::read(&path).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn directory_saver_writes_svg_text() {
        let dir = tempfile::tempdir().unwrap();
        let saver = DirectorySaver::new(dir.path());

        let uri = DataUri::from_svg("<svg></svg>\n");
        let path = saver.save("qr-code.svg", &uri).unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "<svg></svg>\n");
    }

    #[test]
    fn memory_saver_records_downloads() {
        let saver = MemorySaver::new();
        let uri = DataUri::from_bytes("image/jpeg", &[0xFF, 0xD8]);
        saver.save("qr-code.jpeg", &uri).unwrap();

        let saved = saver.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0, "qr-code.jpeg");
        assert_eq!(saved[0].1, uri);
    }
}
