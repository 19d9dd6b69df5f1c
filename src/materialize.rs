//! Turns cards into files on disk.
//!
//! The [`Materializer`] owns the run's [`NameAllocator`]. Cards are handled
//! one at a time through `&mut self`, so allocation and the retroactive
//! rename for a key can never interleave with another card.

use crate::config::{Config, DirKey};
use crate::error::{Error, Result};
use crate::naming::{sanitize, NameAllocator};
use crate::plan::{plan_files, ImageSource, PlannedName};
use crate::tcg::{Card, ImageFetcher};
use crate::utils::files::{ensure_directory, image_file_name, reconcile, write_file};
use crate::utils::images::{rotate_half_turn, validate_image};
use std::ops::AddAssign;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// What happened to a single card.
#[derive(Debug)]
pub enum CardOutcome {
    Saved { files: Vec<PathBuf> },
    NotSaved { reason: Error },
}

impl CardOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, CardOutcome::Saved { .. })
    }
}

/// Running totals of saved and not saved cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub saved: usize,
    pub not_saved: usize,
}

impl Tally {
    pub fn new(saved: usize, not_saved: usize) -> Self {
        Self { saved, not_saved }
    }

    pub fn is_empty(&self) -> bool {
        self.saved == 0 && self.not_saved == 0
    }

    pub fn record(&mut self, outcome: &CardOutcome) {
        if outcome.is_saved() {
            self.saved += 1;
        } else {
            self.not_saved += 1;
        }
    }
}

impl AddAssign for Tally {
    fn add_assign(&mut self, other: Self) {
        self.saved += other.saved;
        self.not_saved += other.not_saved;
    }
}

/// Downloaded payloads for one planned name, in file order.
type Payloads = Vec<Option<Vec<u8>>>;

pub struct Materializer<'a> {
    config: &'a Config,
    fetcher: &'a dyn ImageFetcher,
    names: NameAllocator,
}

impl<'a> Materializer<'a> {
    pub fn new(config: &'a Config, fetcher: &'a dyn ImageFetcher) -> Self {
        Self {
            config,
            fetcher,
            names: NameAllocator::new(),
        }
    }

    pub fn names(&self) -> &NameAllocator {
        &self.names
    }

    /// Directory component for a card's set.
    pub fn set_dir_name(&self, card: &Card) -> String {
        match self.config.dir_key {
            DirKey::SetName => sanitize(&card.set.name, self.config.separator),
            DirKey::SetCode => sanitize(&card.set.code, self.config.separator),
        }
    }

    /// Download and store one card.
    ///
    /// Only filesystem errors (creating the set directory, writing a file)
    /// are returned; every other failure is reported as
    /// [`CardOutcome::NotSaved`].
    pub async fn save_card(&mut self, card: &Card) -> Result<CardOutcome> {
        let set_id = self.set_dir_name(card);
        let dir_path = self.config.output_root.join(&set_id);
        ensure_directory(&dir_path)?;

        let plan = match plan_files(card, self.config.face_naming) {
            Ok(plan) => plan,
            Err(reason) => {
                warn!("{}", reason);
                return Ok(CardOutcome::NotSaved { reason });
            }
        };

        // fetch everything before allocating so failed cards consume no names
        let payloads = match self.fetch_payloads(&plan).await {
            Ok(payloads) => payloads,
            Err(reason) => {
                warn!("Failed to download {}:{}: {}", set_id, card.name, reason);
                return Ok(CardOutcome::NotSaved { reason });
            }
        };

        let mut files = Vec::new();
        for (planned, payloads) in plan.iter().zip(payloads) {
            let base = sanitize(&planned.raw_name, self.config.separator);
            let key = format!("{}{}", base, planned.key_qualifier);
            let allocation = self.names.allocate(&set_id, &key);

            if allocation.previous_collision.is_some() {
                for target in &planned.files {
                    let old_name = image_file_name(&format!("{}{}", base, target.qualifier));
                    let new_name = image_file_name(&format!("{}1{}", base, target.qualifier));
                    match reconcile(&dir_path, &old_name, &new_name) {
                        Ok(path) => debug!("Renamed {} -> {}", old_name, path.display()),
                        Err(e) => debug!("Skipped rename of {}: {}", old_name, e),
                    }
                }
            }

            for (target, payload) in planned.files.iter().zip(payloads) {
                let stem = format!("{}{}{}", base, allocation.suffix(), target.qualifier);
                let file_path = dir_path.join(image_file_name(&stem));
                write_file(&file_path, payload.as_deref())?;
                files.push(file_path);
            }
            info!(" saved {}:{}", set_id, planned.raw_name);
        }

        Ok(CardOutcome::Saved { files })
    }

    async fn fetch_payloads(&self, plan: &[PlannedName]) -> Result<Vec<Payloads>> {
        let mut all = Vec::with_capacity(plan.len());
        let mut previous: Option<Vec<u8>> = None;

        for planned in plan {
            let mut payloads = Vec::with_capacity(planned.files.len());
            for target in &planned.files {
                let payload = if self.config.touch_only {
                    None
                } else {
                    let bytes = match &target.source {
                        ImageSource::Remote(url) => {
                            let bytes = self.fetcher.fetch(url).await?;
                            validate_image(&bytes)?;
                            bytes
                        }
                        ImageSource::Rotated => {
                            let source = previous
                                .as_deref()
                                .ok_or_else(|| Error::missing_image(planned.raw_name.as_str()))?;
                            rotate_half_turn(source)?
                        }
                    };
                    previous = Some(bytes.clone());
                    Some(bytes)
                };
                payloads.push(payload);
            }
            all.push(payloads);
        }

        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FaceNaming;
    use crate::tcg::{Face, Layout, SetRef};
    use crate::utils::images::tests::two_tone_jpeg;
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use std::collections::BTreeSet;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serves a fixed JPEG for every URL, failing for URLs containing "broken".
    struct FakeImages {
        payload: Vec<u8>,
        requested: Mutex<Vec<String>>,
    }

    impl FakeImages {
        fn new() -> Self {
            Self {
                payload: two_tone_jpeg(),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    impl ImageFetcher for FakeImages {
        fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
            self.requested.lock().unwrap().push(url.to_string());
            let result = if url.contains("broken") {
                Err(Error::transport(url, "HTTP 500 Internal Server Error"))
            } else {
                Ok(self.payload.clone())
            };
            async move { result }.boxed()
        }
    }

    fn set(name: &str) -> SetRef {
        SetRef {
            code: "tst".to_string(),
            name: name.to_string(),
        }
    }

    fn url(tag: &str) -> Option<String> {
        Some(format!("https://img.test/{}.jpg", tag))
    }

    fn listing(dir: &std::path::Path) -> BTreeSet<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    fn touch_config(root: &std::path::Path) -> Config {
        let mut config = Config::new(root);
        config.touch_only = true;
        config.progress = false;
        config
    }

    #[tokio::test]
    async fn test_duplicate_names_renamed_once() {
        let tmp = TempDir::new().unwrap();
        let config = touch_config(tmp.path());
        let images = FakeImages::new();
        let mut materializer = Materializer::new(&config, &images);
        let island = Card::simple("Island", set("Unit Test 2.2"), url("island").as_deref());
        let dir = tmp.path().join("Unit Test 2.2");

        materializer.save_card(&island).await.unwrap();
        assert_eq!(listing(&dir), BTreeSet::from(["Island.full.jpg".to_string()]));

        materializer.save_card(&island).await.unwrap();
        assert_eq!(
            listing(&dir),
            BTreeSet::from(["Island1.full.jpg".to_string(), "Island2.full.jpg".to_string()])
        );

        materializer.save_card(&island).await.unwrap();
        assert_eq!(
            listing(&dir),
            BTreeSet::from([
                "Island1.full.jpg".to_string(),
                "Island2.full.jpg".to_string(),
                "Island3.full.jpg".to_string(),
            ])
        );
        assert!(images.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sets_do_not_share_names() {
        let tmp = TempDir::new().unwrap();
        let config = touch_config(tmp.path());
        let images = FakeImages::new();
        let mut materializer = Materializer::new(&config, &images);

        for set_name in ["Unit Test 2.3.1", "Unit Test 2.3.2", "Unit Test 2.3.3"] {
            let plains = Card::simple("Plains", set(set_name), url("plains").as_deref());
            materializer.save_card(&plains).await.unwrap();
        }
        for set_name in ["Unit Test 2.3.1", "Unit Test 2.3.2", "Unit Test 2.3.3"] {
            assert!(tmp.path().join(set_name).join("Plains.full.jpg").is_file());
        }
    }

    #[tokio::test]
    async fn test_downloads_payloads() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::new(tmp.path());
        config.progress = false;
        let images = FakeImages::new();
        let mut materializer = Materializer::new(&config, &images);

        let card = Card::simple("Mountain", set("Alpha"), url("mountain").as_deref());
        let outcome = materializer.save_card(&card).await.unwrap();

        let path = tmp.path().join("Alpha").join("Mountain.full.jpg");
        match outcome {
            CardOutcome::Saved { files } => assert_eq!(files, vec![path.clone()]),
            other => panic!("expected saved, got {:?}", other),
        }
        assert_eq!(fs::read(&path).unwrap(), two_tone_jpeg());
        assert_eq!(
            *images.requested.lock().unwrap(),
            vec!["https://img.test/mountain.jpg".to_string()]
        );
    }

    #[tokio::test]
    async fn test_flip_card_writes_rotated_bottom() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::new(tmp.path());
        config.progress = false;
        let images = FakeImages::new();
        let mut materializer = Materializer::new(&config, &images);

        let card = Card {
            name: "Akki Lavarunner // Tok-Tok, Volcano Born".to_string(),
            set: set("Champions of Kamigawa"),
            layout: Layout::Flip {
                top: "Akki Lavarunner".to_string(),
                bottom: "Tok-Tok, Volcano Born".to_string(),
                image: url("akki"),
            },
        };
        materializer.save_card(&card).await.unwrap();

        let dir = tmp.path().join("Champions of Kamigawa");
        let bottom = fs::read(dir.join("Tok-Tok, Volcano Born.full.jpg")).unwrap();
        let img = image::load_from_memory(&bottom).unwrap().into_rgb8();
        assert!(img.get_pixel(10, 2)[2] > 200, "bottom face should be upside down");
        assert!(dir.join("Akki Lavarunner.full.jpg").is_file());
        assert_eq!(images.requested.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reversible_identical_faces() {
        let tmp = TempDir::new().unwrap();
        let config = touch_config(tmp.path());
        let images = FakeImages::new();
        let mut materializer = Materializer::new(&config, &images);

        let card = Card {
            name: "Blue Bird // Blue Bird".to_string(),
            set: set("Secret Lair"),
            layout: Layout::Reversible {
                front: Face::new("Blue Bird", url("a")),
                back: Face::new("Blue Bird", url("b")),
            },
        };
        materializer.save_card(&card).await.unwrap();
        let dir = tmp.path().join("Secret Lair");
        assert_eq!(
            listing(&dir),
            BTreeSet::from(["Blue Bird.full.jpg".to_string(), "Blue Bird-bk.full.jpg".to_string()])
        );

        materializer.save_card(&card).await.unwrap();
        assert_eq!(
            listing(&dir),
            BTreeSet::from([
                "Blue Bird1.full.jpg".to_string(),
                "Blue Bird1-bk.full.jpg".to_string(),
                "Blue Bird2.full.jpg".to_string(),
                "Blue Bird2-bk.full.jpg".to_string(),
            ])
        );
    }

    #[tokio::test]
    async fn test_transform_faces_counted_independently() {
        let tmp = TempDir::new().unwrap();
        let config = touch_config(tmp.path());
        let images = FakeImages::new();
        let mut materializer = Materializer::new(&config, &images);

        let card = Card {
            name: "Red Bandit // Crimson Zombie".to_string(),
            set: set("Unit Test 3"),
            layout: Layout::Transform {
                front: Face::new("Red Bandit", url("front")),
                back: Face::new("Crimson Zombie", url("back")),
            },
        };
        let zombie = Card::simple("Crimson Zombie", set("Unit Test 3"), url("z").as_deref());

        materializer.save_card(&card).await.unwrap();
        materializer.save_card(&zombie).await.unwrap();

        assert_eq!(materializer.names().count("Unit Test 3", "Red Bandit"), 1);
        assert_eq!(materializer.names().count("Unit Test 3", "Crimson Zombie"), 2);
        assert_eq!(
            listing(&tmp.path().join("Unit Test 3")),
            BTreeSet::from([
                "Red Bandit.full.jpg".to_string(),
                "Crimson Zombie1.full.jpg".to_string(),
                "Crimson Zombie2.full.jpg".to_string(),
            ])
        );
    }

    #[tokio::test]
    async fn test_front_rear_renames_both_files() {
        let tmp = TempDir::new().unwrap();
        let mut config = touch_config(tmp.path());
        config.face_naming = FaceNaming::FrontRear;
        let images = FakeImages::new();
        let mut materializer = Materializer::new(&config, &images);

        let card = Card {
            name: "Red Bandit // Crimson Zombie".to_string(),
            set: set("Unit Test 3"),
            layout: Layout::Reversible {
                front: Face::new("Red Bandit", url("front")),
                back: Face::new("Crimson Zombie", url("back")),
            },
        };
        materializer.save_card(&card).await.unwrap();
        let dir = tmp.path().join("Unit Test 3");
        assert_eq!(
            listing(&dir),
            BTreeSet::from([
                "Red Bandit front.full.jpg".to_string(),
                "Red Bandit rear.full.jpg".to_string(),
            ])
        );

        materializer.save_card(&card).await.unwrap();
        assert_eq!(
            listing(&dir),
            BTreeSet::from([
                "Red Bandit1 front.full.jpg".to_string(),
                "Red Bandit1 rear.full.jpg".to_string(),
                "Red Bandit2 front.full.jpg".to_string(),
                "Red Bandit2 rear.full.jpg".to_string(),
            ])
        );
    }

    #[tokio::test]
    async fn test_missing_image_consumes_no_name() {
        let tmp = TempDir::new().unwrap();
        let config = touch_config(tmp.path());
        let images = FakeImages::new();
        let mut materializer = Materializer::new(&config, &images);

        let card = Card::simple("Mountain", set("Alpha"), None);
        let outcome = materializer.save_card(&card).await.unwrap();

        assert!(matches!(
            outcome,
            CardOutcome::NotSaved {
                reason: Error::MissingImageData(_)
            }
        ));
        assert_eq!(materializer.names().count("Alpha", "Mountain"), 0);
        assert!(listing(&tmp.path().join("Alpha")).is_empty());
    }

    #[tokio::test]
    async fn test_failed_download_is_not_saved() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::new(tmp.path());
        config.progress = false;
        let images = FakeImages::new();
        let mut materializer = Materializer::new(&config, &images);

        let card = Card {
            name: "Delver of Secrets // Insectile Aberration".to_string(),
            set: set("Innistrad"),
            layout: Layout::Transform {
                front: Face::new("Delver of Secrets", url("front")),
                back: Face::new("Insectile Aberration", url("broken")),
            },
        };
        let outcome = materializer.save_card(&card).await.unwrap();

        assert!(matches!(
            outcome,
            CardOutcome::NotSaved {
                reason: Error::Transport { .. }
            }
        ));
        assert!(materializer.names().is_empty());
        assert!(listing(&tmp.path().join("Innistrad")).is_empty());
    }

    #[tokio::test]
    async fn test_set_code_directories_and_delete_separator() {
        let tmp = TempDir::new().unwrap();
        let mut config = touch_config(tmp.path());
        config.dir_key = DirKey::SetCode;
        config.separator = crate::config::SeparatorPolicy::Delete;
        let images = FakeImages::new();
        let mut materializer = Materializer::new(&config, &images);

        let card = Card {
            name: "Fire // Ice".to_string(),
            set: SetRef {
                code: "apc".to_string(),
                name: "Apocalypse".to_string(),
            },
            layout: Layout::Split {
                left: "Fire".to_string(),
                right: "Ice".to_string(),
                image: url("fireice"),
            },
        };
        materializer.save_card(&card).await.unwrap();
        assert!(tmp.path().join("apc").join("FireIce.full.jpg").is_file());
    }

    #[test]
    fn test_tally() {
        let mut tally = Tally::default();
        assert!(tally.is_empty());
        tally.record(&CardOutcome::Saved { files: Vec::new() });
        tally.record(&CardOutcome::NotSaved {
            reason: Error::missing_image("Mountain"),
        });
        tally += Tally::new(2, 3);
        assert_eq!(tally, Tally::new(3, 4));
    }
}
