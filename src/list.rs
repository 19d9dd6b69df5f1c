//! Card-list files.
//!
//! One entry per line, optionally followed by a `#` comment:
//!
//! ```text
//! Mountain [ltr] 300      # Mountain from LTR, collector number 300
//! Island [ltr]            # every Island in LTR
//! Lightning Bolt (m10) 146
//! Soldier                 # every Soldier in every set
//! [MOE]                   # the whole set
//! ```

use crate::error::Result;
use std::fs;
use std::path::Path;

/// One parsed card-list line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListEntry {
    pub name: Option<String>,
    pub set: Option<String>,
    pub number: Option<String>,
}

impl ListEntry {
    /// Parse a line; `None` for blank, comment-only and one-character lines.
    pub fn parse(line: &str) -> Option<Self> {
        let entry = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        }
        .trim();

        if entry.chars().count() < 2 {
            return None;
        }

        let Some((open, close)) = find_set_code(entry) else {
            return Some(Self {
                name: Some(entry.to_string()),
                ..Self::default()
            });
        };

        let set = entry[open + 1..close].trim();
        let name = entry[..open].trim();
        let number = entry[close + 1..].trim();

        Some(Self {
            name: (!name.is_empty()).then(|| name.to_string()),
            set: (!set.is_empty()).then(|| set.to_string()),
            number: (!number.is_empty() && number.chars().all(char::is_alphanumeric))
                .then(|| number.to_string()),
        })
    }

    /// Scryfall search query for this entry, e.g. `set:ltr name:"Mountain" number:300`.
    pub fn to_query(&self) -> String {
        let mut parts = Vec::new();
        if let Some(set) = &self.set {
            parts.push(format!("set:{}", set));
        }
        if let Some(name) = &self.name {
            parts.push(format!("name:\"{}\"", name.replace('"', "")));
        }
        if let Some(number) = &self.number {
            parts.push(format!("number:{}", number));
        }
        parts.join(" ")
    }
}

/// Byte offsets of the `[set]` or `(set)` delimiters in an entry.
fn find_set_code(entry: &str) -> Option<(usize, usize)> {
    for (open_char, close_char) in [('[', ']'), ('(', ')')] {
        if let Some(open) = entry.find(open_char) {
            if let Some(close) = entry.rfind(close_char) {
                if close > open + 1 {
                    return Some((open, close));
                }
            }
        }
    }
    None
}

/// A card-list line together with its parsed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListLine {
    pub text: String,
    pub entry: ListEntry,
}

/// Parse the contents of a card-list file, skipping ignored lines.
pub fn parse_list(contents: &str) -> Vec<ListLine> {
    contents
        .lines()
        .filter_map(|line| {
            ListEntry::parse(line).map(|entry| ListLine {
                text: line.trim().to_string(),
                entry,
            })
        })
        .collect()
}

pub fn read_list(path: &Path) -> Result<Vec<ListLine>> {
    let contents = fs::read_to_string(path)?;
    Ok(parse_list(&contents))
}
