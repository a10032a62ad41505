use serde_json::Value;
use std::fs::Metadata;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::ErrorKind;

use crate::atomic::AtomicFile;

/// One of the four fixed directories below the service root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Area {
    Data,
    Special,
    Images,
    SpecialImages,
}

impl Area {
    pub const ALL: [Area; 4] = [Area::Data, Area::Special, Area::Images, Area::SpecialImages];

    fn relative(self) -> &'static Path {
        match self {
            Area::Data => Path::new("data"),
            Area::Special => Path::new("special"),
            Area::Images => Path::new("images"),
            Area::SpecialImages => Path::new("images/special"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Creates any of the four directories that are missing.
    pub async fn ensure_layout(&self) -> io::Result<()> {
        for area in Area::ALL {
            fs::create_dir_all(self.dir(area)).await?;
        }
        Ok(())
    }

    pub fn root_path(&self) -> &Path {
        &self.root
    }

    pub fn dir(&self, area: Area) -> PathBuf {
        self.root.join(area.relative())
    }

    /// Joins `file_name` onto the area directory after checking that it is a
    /// single plain path component.
    pub fn resolve(&self, area: Area, file_name: &str) -> Result<PathBuf, StorageError> {
        validate_name(file_name)?;
        Ok(self.dir(area).join(file_name))
    }

    pub fn document_path(&self, area: Area, name: &str) -> Result<PathBuf, StorageError> {
        validate_name(name)?;
        self.resolve(area, &format!("{name}.json"))
    }

    pub async fn read_document(&self, area: Area, name: &str) -> Result<Value, StorageError> {
        let path = self.document_path(area, name)?;
        require_file(&path).await?;
        let content = fs::read(&path).await?;
        serde_json::from_slice(&content).map_err(StorageError::Parse)
    }

    /// Replaces the document with `value` pretty-printed at two spaces.
    pub async fn write_document(
        &self,
        area: Area,
        name: &str,
        value: &Value,
    ) -> Result<u64, StorageError> {
        let path = self.document_path(area, name)?;
        let content = serde_json::to_vec_pretty(value).map_err(StorageError::Parse)?;
        let mut atomic = AtomicFile::new(&path).await?;
        if let Err(err) = atomic.write(&content).await {
            atomic.cleanup().await;
            return Err(err.into());
        }
        let written = atomic.written();
        atomic.finalize().await?;
        Ok(written)
    }

    /// Returns the path and metadata of a stored regular file.
    pub async fn open_image(
        &self,
        area: Area,
        file_name: &str,
    ) -> Result<(PathBuf, Metadata), StorageError> {
        let path = self.resolve(area, file_name)?;
        let metadata = require_file(&path).await?;
        Ok((path, metadata))
    }
}

async fn require_file(path: &Path) -> Result<Metadata, StorageError> {
    let metadata = fs::metadata(path).await?;
    if !metadata.is_file() {
        return Err(StorageError::Io(io::Error::from(ErrorKind::NotFound)));
    }
    Ok(metadata)
}

fn validate_name(name: &str) -> Result<(), StorageError> {
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return Err(StorageError::InvalidName);
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(segment)), None) if segment.to_str() == Some(name) => Ok(()),
        _ => Err(StorageError::InvalidName),
    }
}

#[derive(Debug)]
pub enum StorageError {
    InvalidName,
    Io(io::Error),
    Parse(serde_json::Error),
}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        StorageError::Io(err)
    }
}
