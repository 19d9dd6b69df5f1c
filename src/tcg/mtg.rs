use crate::config::ImageSize;
use crate::error::{Error, Result};
use crate::tcg::{Card, CardPage, CardSource, Face, ImageFetcher, Layout, SetInfo, SetRef};
use crate::utils::http::{build_client, fetch_bytes, RateLimiter, SEARCH_CALLS_PER_SECOND};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

const SCRYFALL_API: &str = "https://api.scryfall.com";

/// Scryfall serves this image for cards whose scans are not available yet.
const PLACEHOLDER_IMAGE: &str = "errors.scryfall.com/soon.jpg";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    total_cards: usize,
    #[serde(default)]
    has_more: bool,
    next_page: Option<String>,
    #[serde(default)]
    data: Vec<ScryfallCard>,
}

#[derive(Debug, Deserialize)]
struct SetResponse {
    code: String,
    name: String,
    #[serde(default)]
    card_count: usize,
    released_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ImageUris {
    pub small: Option<String>,
    pub normal: Option<String>,
    pub large: Option<String>,
    pub png: Option<String>,
    pub border_crop: Option<String>,
}

impl ImageUris {
    fn pick(&self, size: ImageSize) -> Option<String> {
        let uri = match size {
            ImageSize::Small => &self.small,
            ImageSize::Normal => &self.normal,
            ImageSize::Large => &self.large,
            ImageSize::Png => &self.png,
            ImageSize::BorderCrop => &self.border_crop,
        };
        uri.clone().filter(|u| !u.contains(PLACEHOLDER_IMAGE))
    }
}

#[derive(Debug, Deserialize)]
pub struct ScryfallFace {
    pub name: String,
    pub image_uris: Option<ImageUris>,
}

/// Card object as returned by the Scryfall search endpoint.
#[derive(Debug, Deserialize)]
pub struct ScryfallCard {
    pub name: String,
    pub set: String,
    pub set_name: String,
    #[serde(default)]
    pub layout: String,
    pub image_uris: Option<ImageUris>,
    pub card_faces: Option<Vec<ScryfallFace>>,
}

impl ScryfallCard {
    /// Convert the loosely shaped payload into the closed card model.
    ///
    /// Missing images stay `None`; the materializer reports them per card.
    pub fn into_card(self, size: ImageSize) -> Card {
        let image = self.image_uris.as_ref().and_then(|uris| uris.pick(size));
        let faces: Vec<Face> = self
            .card_faces
            .unwrap_or_default()
            .into_iter()
            .map(|face| {
                let face_image = face.image_uris.as_ref().and_then(|uris| uris.pick(size));
                Face::new(face.name, face_image)
            })
            .collect();

        let layout = match (self.layout.as_str(), faces.as_slice()) {
            ("transform" | "modal_dfc" | "double_faced_token" | "art_series", [front, back, ..]) => {
                Layout::Transform {
                    front: front.clone(),
                    back: back.clone(),
                }
            }
            ("reversible_card", [front, back, ..]) => Layout::Reversible {
                front: front.clone(),
                back: back.clone(),
            },
            ("split", [left, right, ..]) => Layout::Split {
                left: left.name.clone(),
                right: right.name.clone(),
                image,
            },
            ("flip", [top, bottom, ..]) => Layout::Flip {
                top: top.name.clone(),
                bottom: bottom.name.clone(),
                image,
            },
            ("adventure", [main, adventure, ..]) => Layout::Adventure {
                main: main.name.clone(),
                adventure: adventure.name.clone(),
                image,
            },
            // unknown two-image layouts still carry one image per face
            (_, [front, back, ..])
                if image.is_none() && front.image.is_some() && back.image.is_some() =>
            {
                Layout::Transform {
                    front: front.clone(),
                    back: back.clone(),
                }
            }
            _ => Layout::Simple { image },
        };

        Card {
            name: self.name,
            set: SetRef {
                code: self.set,
                name: self.set_name,
            },
            layout,
        }
    }
}

/// Scryfall API client. Search and set calls are rate limited, image
/// downloads from the CDN are not.
pub struct ScryfallClient {
    client: reqwest::Client,
    limiter: RateLimiter,
    base_url: String,
    image_size: ImageSize,
}

impl ScryfallClient {
    pub fn new(image_size: ImageSize) -> Result<Self> {
        Self::with_base_url(SCRYFALL_API, image_size)
    }

    pub fn with_base_url(base_url: &str, image_size: ImageSize) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            limiter: RateLimiter::per_second(SEARCH_CALLS_PER_SECOND),
            base_url: base_url.trim_end_matches('/').to_string(),
            image_size,
        })
    }

    /// Full search URI for a query, selecting every print and variation.
    pub fn search_url(&self, query: &str) -> Result<Url> {
        Url::parse_with_params(
            &format!("{}/cards/search", self.base_url),
            &[
                ("q", query.trim()),
                ("unique", "prints"),
                ("include_variations", "true"),
                ("format", "json"),
            ],
        )
        .map_err(|e| Error::InvalidInput(format!("Bad search URL: {}", e)))
    }

    async fn get_page(&self, uri: &str) -> Result<CardPage> {
        self.limiter.wait().await;
        debug!("GET {}", uri);

        let response = self
            .client
            .get(uri)
            .header("Accept", "application/json")
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Err(Error::not_found(uri.to_string())),
            status => {
                return Err(Error::transport(
                    uri,
                    format!(
                        "{} {}",
                        status.as_u16(),
                        status.canonical_reason().unwrap_or("")
                    ),
                ))
            }
        }

        let text = response.text().await?;
        parse_search_page(&text, self.image_size)
    }

    async fn get_set(&self, code: &str) -> Result<Option<SetInfo>> {
        self.limiter.wait().await;
        let url = format!("{}/sets/{}", self.base_url, code.trim().to_lowercase());
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            debug!("Set lookup {} returned {}", url, response.status());
            return Ok(None);
        }

        let text = response.text().await?;
        Ok(parse_set(&text))
    }
}

/// Parse one page of a search response.
pub fn parse_search_page(json: &str, size: ImageSize) -> Result<CardPage> {
    let response: SearchResponse = serde_json::from_str(json)?;
    let next_page = if response.has_more {
        response.next_page
    } else {
        None
    };

    Ok(CardPage {
        total_cards: response.total_cards,
        cards: response
            .data
            .into_iter()
            .map(|card| card.into_card(size))
            .collect(),
        next_page,
    })
}

/// Parse a set object; malformed bodies count as an unknown set.
pub fn parse_set(json: &str) -> Option<SetInfo> {
    let set: SetResponse = serde_json::from_str(json).ok()?;
    Some(SetInfo {
        code: set.code,
        name: set.name,
        card_count: set.card_count,
        released_at: set.released_at,
    })
}

impl CardSource for ScryfallClient {
    fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Result<CardPage>> {
        async move {
            let url = self.search_url(query)?;
            self.get_page(url.as_str()).await
        }
        .boxed()
    }

    fn next_page<'a>(&'a self, uri: &'a str) -> BoxFuture<'a, Result<CardPage>> {
        self.get_page(uri).boxed()
    }

    fn lookup_set<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Result<Option<SetInfo>>> {
        self.get_set(code).boxed()
    }
}

impl ImageFetcher for ScryfallClient {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
        fetch_bytes(&self.client, url).boxed()
    }
}
