use crate::error::Result;
use futures::future::BoxFuture;

/// The set a card was printed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetRef {
    pub code: String,
    pub name: String,
}

/// One printed side or half of a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    pub name: String,
    /// Absent when the face shares the card's single image.
    pub image: Option<String>,
}

impl Face {
    pub fn new(name: impl Into<String>, image: Option<String>) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }
}

/// Structural category of a card, carrying exactly the face data it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    Simple {
        image: Option<String>,
    },
    /// Double-faced: each face has its own image.
    Transform {
        front: Face,
        back: Face,
    },
    /// Two halves printed side by side on one image.
    Split {
        left: String,
        right: String,
        image: Option<String>,
    },
    /// Bottom half is the top half rotated 180 degrees.
    Flip {
        top: String,
        bottom: String,
        image: Option<String>,
    },
    /// The adventure shares the main card's image.
    Adventure {
        main: String,
        adventure: String,
        image: Option<String>,
    },
    /// Same card printed on both sides with different art.
    Reversible {
        front: Face,
        back: Face,
    },
}

impl Layout {
    pub fn tag(&self) -> &'static str {
        match self {
            Layout::Simple { .. } => "simple",
            Layout::Transform { .. } => "transform",
            Layout::Split { .. } => "split",
            Layout::Flip { .. } => "flip",
            Layout::Adventure { .. } => "adventure",
            Layout::Reversible { .. } => "reversible",
        }
    }
}

// Unified card structure handed from the metadata source to the materializer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub name: String,
    pub set: SetRef,
    pub layout: Layout,
}

impl Card {
    pub fn simple(name: &str, set: SetRef, image: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            set,
            layout: Layout::Simple {
                image: image.map(str::to_string),
            },
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default)]
pub struct CardPage {
    pub total_cards: usize,
    pub cards: Vec<Card>,
    pub next_page: Option<String>,
}

/// Set details returned by a set lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetInfo {
    pub code: String,
    pub name: String,
    pub card_count: usize,
    pub released_at: Option<String>,
}

/// Card-metadata source.
///
/// `search` returns [`Error::NotFound`](crate::Error::NotFound) when the query
/// has no results.
pub trait CardSource: Send + Sync {
    fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Result<CardPage>>;

    /// Follow a `next_page` link from a previous page.
    fn next_page<'a>(&'a self, uri: &'a str) -> BoxFuture<'a, Result<CardPage>>;

    fn lookup_set<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Result<Option<SetInfo>>>;
}

/// Image host.
pub trait ImageFetcher: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>>>;
}

pub mod mtg;
