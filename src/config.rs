use clap::ValueEnum;
use std::path::PathBuf;

/// How the `" // "` face separator inside a card name is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SeparatorPolicy {
    /// Replace with `-+` ("Fire // Ice" -> "Fire-+Ice")
    #[default]
    Join,
    /// Remove it ("Fire // Ice" -> "FireIce")
    Delete,
}

/// Which set attribute names the per-set output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DirKey {
    /// Full set name, e.g. "Lord of the Rings"
    #[default]
    SetName,
    /// Set code, e.g. "ltr"
    SetCode,
}

/// File naming generation for multi-face cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FaceNaming {
    /// One file per face under the face's own name, `-bk` for reversible backs
    #[default]
    PerFace,
    /// Front face name with " front" / " rear" qualifiers
    FrontRear,
}

/// Image variant requested from the card catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ImageSize {
    Small,
    Normal,
    #[default]
    Large,
    Png,
    BorderCrop,
}

/// Settings for a single run, assembled from the command line.
#[derive(Debug, Clone)]
pub struct Config {
    pub output_root: PathBuf,
    pub image_size: ImageSize,
    pub separator: SeparatorPolicy,
    pub dir_key: DirKey,
    pub face_naming: FaceNaming,
    /// Create empty files instead of downloading images.
    pub touch_only: bool,
    pub progress: bool,
}

impl Config {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            image_size: ImageSize::default(),
            separator: SeparatorPolicy::default(),
            dir_key: DirKey::default(),
            face_naming: FaceNaming::default(),
            touch_only: false,
            progress: true,
        }
    }
}
