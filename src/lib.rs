//! Magic: The Gathering card image downloader.
//!
//! Fetches card metadata from Scryfall and stores images as
//! `{output}/{set}/{name}.full.jpg`. Names are unique per set: the first
//! print of a name is written unsuffixed, and when a second print shows up
//! the first file is renamed to `name1` and the newcomer becomes `name2`.

pub mod config;
pub mod download;
pub mod error;
pub mod list;
pub mod materialize;
pub mod naming;
pub mod plan;
pub mod tcg;
pub mod utils;

pub use error::{Error, Result};
