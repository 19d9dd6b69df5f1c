//! Layout-to-filename mapping.
//!
//! A card is turned into one or more [`PlannedName`]s. Each planned name is
//! a single allocation in the name registry and owns the files written under
//! it. The registry key is the sanitized name followed by `key_qualifier`;
//! each file appends its own qualifier after the collision suffix.

use crate::config::FaceNaming;
use crate::error::{Error, Result};
use crate::naming::FACE_SEPARATOR;
use crate::tcg::{Card, Face, Layout};

/// Qualifier marking the back of a reversible card.
pub const BACK_QUALIFIER: &str = "-bk";
pub const FRONT_QUALIFIER: &str = " front";
pub const REAR_QUALIFIER: &str = " rear";

/// Where a planned file's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Remote(String),
    /// The previous payload of the same card, turned 180 degrees.
    Rotated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTarget {
    pub qualifier: &'static str,
    pub source: ImageSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedName {
    /// Unsanitized name; may contain the face separator.
    pub raw_name: String,
    pub key_qualifier: &'static str,
    pub files: Vec<FileTarget>,
}

impl PlannedName {
    fn single(raw_name: impl Into<String>, key_qualifier: &'static str, source: ImageSource) -> Self {
        Self {
            raw_name: raw_name.into(),
            key_qualifier,
            files: vec![FileTarget {
                qualifier: key_qualifier,
                source,
            }],
        }
    }
}

/// Plan the files a card produces.
///
/// Fails with [`Error::MissingImageData`] when a required image is absent;
/// nothing is allocated or written for such a card.
pub fn plan_files(card: &Card, naming: FaceNaming) -> Result<Vec<PlannedName>> {
    match naming {
        FaceNaming::PerFace => plan_per_face(card),
        FaceNaming::FrontRear => plan_front_rear(card),
    }
}

fn remote(card: &Card, image: &Option<String>) -> Result<ImageSource> {
    image
        .clone()
        .map(ImageSource::Remote)
        .ok_or_else(|| Error::missing_image(card.name.as_str()))
}

fn face_source(card: &Card, face: &Face) -> Result<ImageSource> {
    remote(card, &face.image)
}

fn plan_per_face(card: &Card) -> Result<Vec<PlannedName>> {
    let plan = match &card.layout {
        Layout::Simple { image } => vec![PlannedName::single(&card.name, "", remote(card, image)?)],
        Layout::Transform { front, back } => vec![
            PlannedName::single(&front.name, "", face_source(card, front)?),
            PlannedName::single(&back.name, "", face_source(card, back)?),
        ],
        Layout::Split { left, right, image } => vec![PlannedName::single(
            format!("{}{}{}", left, FACE_SEPARATOR, right),
            "",
            remote(card, image)?,
        )],
        Layout::Adventure { main, image, .. } => {
            vec![PlannedName::single(main, "", remote(card, image)?)]
        }
        Layout::Flip { top, bottom, image } => vec![
            PlannedName::single(top, "", remote(card, image)?),
            PlannedName::single(bottom, "", ImageSource::Rotated),
        ],
        Layout::Reversible { front, back } => vec![
            PlannedName::single(&front.name, "", face_source(card, front)?),
            PlannedName::single(&back.name, BACK_QUALIFIER, face_source(card, back)?),
        ],
    };
    Ok(plan)
}

fn plan_front_rear(card: &Card) -> Result<Vec<PlannedName>> {
    let plan = match &card.layout {
        Layout::Simple { image }
        | Layout::Split { image, .. }
        | Layout::Flip { image, .. }
        | Layout::Adventure { image, .. } => {
            vec![PlannedName::single(&card.name, "", remote(card, image)?)]
        }
        Layout::Transform { front, back } | Layout::Reversible { front, back } => {
            vec![PlannedName {
                raw_name: front.name.clone(),
                key_qualifier: "",
                files: vec![
                    FileTarget {
                        qualifier: FRONT_QUALIFIER,
                        source: face_source(card, front)?,
                    },
                    FileTarget {
                        qualifier: REAR_QUALIFIER,
                        source: face_source(card, back)?,
                    },
                ],
            }]
        }
    };
    Ok(plan)
}
