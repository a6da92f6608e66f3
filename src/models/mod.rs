use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

pub mod user;

pub use user::{Rating, WatchlistEntry};

/// Kind of catalog entry. Item ids are only unique within a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    /// Path segment used by the catalog provider
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaKind::Movie),
            "tv" => Ok(MediaKind::Tv),
            other => Err(format!("Unknown media type '{}', expected movie or tv", other)),
        }
    }
}

/// A movie or TV show as returned by the catalog provider
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem {
    pub id: u64,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub vote_average: f64,
    pub media_kind: MediaKind,
}

/// Pool entry: a catalog item with its description embedding attached
#[derive(Debug, Clone, PartialEq)]
pub struct PooledItem {
    pub item: CatalogItem,
    pub embedding: Vec<f32>,
}

impl PooledItem {
    pub fn new(item: CatalogItem, embedding: Vec<f32>) -> Self {
        Self { item, embedding }
    }

    pub fn key(&self) -> (MediaKind, u64) {
        (self.item.media_kind, self.item.id)
    }
}

/// Recommendation returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationItem {
    pub id: u64,
    pub title: String,
    pub overview: String,
    pub vote_average: f64,
    pub poster_path: Option<String>,
}

impl From<&CatalogItem> for RecommendationItem {
    fn from(item: &CatalogItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            overview: item.overview.clone(),
            vote_average: item.vote_average,
            poster_path: item.poster_path.clone(),
        }
    }
}

impl From<CatalogItem> for RecommendationItem {
    fn from(item: CatalogItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            overview: item.overview,
            vote_average: item.vote_average,
            poster_path: item.poster_path,
        }
    }
}

// ============================================================================
// Catalog (TMDB) API Types
// ============================================================================

/// Raw item from the catalog API. Movies carry `title`, TV shows carry `name`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiItem {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

impl ApiItem {
    /// Converts the raw item into a `CatalogItem` of the given kind
    pub fn into_catalog_item(self, media_kind: MediaKind) -> CatalogItem {
        let (primary, secondary) = match media_kind {
            MediaKind::Movie => (self.title, self.name),
            MediaKind::Tv => (self.name, self.title),
        };

        CatalogItem {
            id: self.id,
            title: primary.or(secondary).unwrap_or_default(),
            overview: self.overview.unwrap_or_default(),
            poster_path: self.poster_path,
            vote_average: self.vote_average.unwrap_or(0.0),
            media_kind,
        }
    }
}

/// Paginated listing from the catalog API
#[derive(Debug, Clone, Deserialize)]
pub struct ApiListResponse {
    pub results: Vec<ApiItem>,
}
