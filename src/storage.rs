//! Persisting composed images as picture files.

use crate::compose::{ComposeError, ComposedImage, Encoding};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Which surfaces an artifact shows. Used in the filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Main,
    Sub,
    Both,
}

impl ArtifactKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Main => "main",
            ArtifactKind::Sub => "sub",
            ArtifactKind::Both => "both",
        }
    }
}

/// Why a dual capture fell back to saving the primary alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoloReason {
    NoSecondaryDisplay,
    SecondaryCaptureFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactTag {
    Regular,
    Solo(SoloReason),
}

/// A written picture file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
    pub tag: ArtifactTag,
    pub width: u32,
    pub height: u32,
    pub encoding: Encoding,
}

impl Artifact {
    pub fn is_solo(&self) -> bool {
        matches!(self.tag, ArtifactTag::Solo(_))
    }
}

/// Platform media index. Notified after every write so the file shows up in
/// gallery-style browsers.
pub trait MediaIndex: Send + Sync {
    fn notify_written(&self, path: &Path);
}

pub struct ArtifactStore {
    dir: PathBuf,
    index: Arc<dyn MediaIndex>,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>, index: Arc<dyn MediaIndex>) -> Self {
        Self {
            dir: dir.into(),
            index,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `screenshot_<kind>_<YYYYMMDD_HHMMSS>.<ext>`
    pub fn file_name(kind: ArtifactKind, encoding: Encoding, at: &DateTime<Local>) -> String {
        format!(
            "screenshot_{}_{}.{}",
            kind.as_str(),
            at.format("%Y%m%d_%H%M%S"),
            encoding.extension()
        )
    }

    pub fn save(
        &self,
        image: &ComposedImage,
        kind: ArtifactKind,
        tag: ArtifactTag,
    ) -> Result<Artifact, StoreError> {
        self.save_at(image, kind, tag, Local::now())
    }

    /// Encode and write. An existing file with the same name is replaced.
    pub fn save_at(
        &self,
        image: &ComposedImage,
        kind: ArtifactKind,
        tag: ArtifactTag,
        at: DateTime<Local>,
    ) -> Result<Artifact, StoreError> {
        std::fs::create_dir_all(&self.dir)?;

        let bytes = image.encode()?;
        let path = self.dir.join(Self::file_name(kind, image.encoding, &at));
        std::fs::write(&path, &bytes)?;

        log::info!(
            "[STORE] Saved {} ({}x{}, {} bytes)",
            path.display(),
            image.width(),
            image.height(),
            bytes.len()
        );
        self.index.notify_written(&path);

        Ok(Artifact {
            path,
            kind,
            tag,
            width: image.width(),
            height: image.height(),
            encoding: image.encoding,
        })
    }
}

/// `<pictures dir>/DualShot`, falling back to the home directory.
pub fn default_pictures_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("DualShot")
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to write artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode artifact: {0}")]
    Encoding(String),
}

impl From<ComposeError> for StoreError {
    fn from(e: ComposeError) -> Self {
        StoreError::Encoding(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use image::RgbaImage;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingIndex {
        paths: Mutex<Vec<PathBuf>>,
    }

    impl MediaIndex for RecordingIndex {
        fn notify_written(&self, path: &Path) {
            self.paths.lock().unwrap().push(path.to_path_buf());
        }
    }

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap()
    }

    #[test]
    fn file_names_follow_pattern() {
        let at = fixed_time();
        assert_eq!(
            ArtifactStore::file_name(ArtifactKind::Main, Encoding::Png, &at),
            "screenshot_main_20240309_070501.png"
        );
        assert_eq!(
            ArtifactStore::file_name(ArtifactKind::Both, Encoding::Jpeg { quality: 80 }, &at),
            "screenshot_both_20240309_070501.jpg"
        );
    }

    #[test]
    fn save_writes_file_and_notifies_index() {
        let dir = std::env::temp_dir().join(format!("dualshot-store-{}", std::process::id()));
        let index = Arc::new(RecordingIndex::default());
        let store = ArtifactStore::new(dir.join("nested"), index.clone());

        let image = ComposedImage {
            image: RgbaImage::new(6, 4),
            encoding: Encoding::Png,
        };
        let artifact = store
            .save_at(&image, ArtifactKind::Sub, ArtifactTag::Regular, fixed_time())
            .unwrap();

        assert!(artifact.path.ends_with("screenshot_sub_20240309_070501.png"));
        assert_eq!((artifact.width, artifact.height), (6, 4));
        assert!(!artifact.is_solo());

        let decoded = image::open(&artifact.path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (6, 4));
        assert_eq!(index.paths.lock().unwrap().as_slice(), &[artifact.path.clone()]);

        std::fs::remove_dir_all(&dir).ok();
    }
}
