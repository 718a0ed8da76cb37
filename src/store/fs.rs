//! Filesystem-backed image store

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{ImageRef, ImageStore, StoreError};

/// Disambiguates temp files written concurrently by this process
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Stores each artifact as one file in a flat directory
#[derive(Debug, Clone)]
pub struct FsImageStore {
    root: PathBuf,
}

impl FsImageStore {
    /// Open (and create if needed) the artifact directory
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// On-disk location of an artifact
    pub fn path_of(&self, reference: &ImageRef) -> PathBuf {
        self.root.join(reference.as_str())
    }

    fn temp_path(&self, reference: &ImageRef) -> PathBuf {
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.root
            .join(format!(".{reference}.{}.{n}.tmp", std::process::id()))
    }
}

impl ImageStore for FsImageStore {
    fn put(&self, stem: &str, file_name: &str, bytes: &[u8]) -> Result<ImageRef, StoreError> {
        let reference = ImageRef::for_content(stem, file_name, bytes);
        let target = self.path_of(&reference);
        let temp = self.temp_path(&reference);

        // Write-then-rename: readers never observe a partial file
        let written = fs::File::create(&temp).and_then(|mut f| {
            f.write_all(bytes)?;
            f.sync_all()
        });
        if let Err(e) = written.and_then(|()| fs::rename(&temp, &target)) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }

        Ok(reference)
    }

    fn get(&self, reference: &ImageRef) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(self.path_of(reference)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
