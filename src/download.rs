//! Query, set and card-list downloads.
//!
//! Every function walks the search results page by page and hands each card
//! to the [`Materializer`] in order. Transport errors end the current query
//! and are reported; the counts gathered so far are kept.

use crate::error::{Error, Result};
use crate::list::read_list;
use crate::materialize::{Materializer, Tally};
use crate::tcg::{CardPage, CardSource, SetInfo};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{error, warn};

/// Asked once with the first page of a query; `false` skips the download.
pub type Confirm<'c> = &'c mut dyn FnMut(&CardPage) -> bool;

fn progress_bar(total: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

/// Run a search query and save every card it returns.
pub async fn run_query(
    source: &dyn CardSource,
    materializer: &mut Materializer<'_>,
    query: &str,
    show_progress: bool,
    confirm: Option<Confirm<'_>>,
) -> Result<Tally> {
    let mut tally = Tally::default();

    let mut page = match source.search(query).await {
        Ok(page) => page,
        Err(Error::NotFound(_)) => return Ok(tally),
        Err(e) => {
            error!("{}", e);
            return Ok(tally);
        }
    };

    if page.total_cards == 0 {
        return Ok(tally);
    }

    if let Some(confirm) = confirm {
        if !confirm(&page) {
            tally.not_saved += page.total_cards;
            return Ok(tally);
        }
    }

    let pb = progress_bar(page.total_cards, show_progress);
    loop {
        for card in &page.cards {
            let outcome = match materializer.save_card(card).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    pb.abandon();
                    return Err(e);
                }
            };
            tally.record(&outcome);
            pb.inc(1);
        }

        let Some(next) = page.next_page.take() else {
            break;
        };
        page = match source.next_page(&next).await {
            Ok(page) => page,
            Err(Error::NotFound(_)) => break,
            Err(e) => {
                error!("{}", e);
                break;
            }
        };
    }
    pb.finish_and_clear();

    Ok(tally)
}

/// Download every card of a set.
pub async fn download_set(
    source: &dyn CardSource,
    materializer: &mut Materializer<'_>,
    set_code: &str,
    show_progress: bool,
) -> Result<Tally> {
    let code = set_code.trim().to_lowercase();
    if code.is_empty() || !code.chars().all(char::is_alphanumeric) {
        warn!("Invalid set code: {}", set_code.trim());
        return Ok(Tally::default());
    }

    run_query(
        source,
        materializer,
        &format!("set:{}", code),
        show_progress,
        None,
    )
    .await
}

/// Download every entry of a card-list file.
///
/// A missing or unreadable file is reported and yields an empty tally.
/// Entries matching nothing count as one card not saved.
pub async fn download_list(
    source: &dyn CardSource,
    materializer: &mut Materializer<'_>,
    list_path: &Path,
    show_progress: bool,
) -> Result<Tally> {
    let lines = match read_list(list_path) {
        Ok(lines) => lines,
        Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            error!("File not found: {}", list_path.display());
            return Ok(Tally::default());
        }
        Err(e) => {
            error!("Error reading file {}: {}", list_path.display(), e);
            return Ok(Tally::default());
        }
    };

    let mut tally = Tally::default();
    for line in lines {
        let query = line.entry.to_query();
        let result = run_query(source, materializer, &query, show_progress, None).await?;
        tally += result;

        if result.saved == 0 {
            if result.not_saved == 0 {
                warn!("No cards match: {}", line.text);
                tally.not_saved += 1;
            } else {
                warn!("Failed to download cards for: {}", line.text);
            }
        }
    }

    Ok(tally)
}

/// Look up a set by code; `None` when it does not exist.
pub async fn check_set(source: &dyn CardSource, set_code: &str) -> Option<SetInfo> {
    match source.lookup_set(set_code.trim()).await {
        Ok(set) => set,
        Err(e) => {
            warn!("Set lookup failed: {}", e);
            None
        }
    }
}
