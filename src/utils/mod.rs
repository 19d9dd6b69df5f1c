//! Utility modules for MTG Fetch
//!
//! This module contains various utility functions organized by functionality:
//! - `files`: Directory management, writes and retroactive renames
//! - `images`: Payload validation and rotation
//! - `http`: HTTP client utilities and rate limiting

pub mod files;
pub mod http;
pub mod images;
