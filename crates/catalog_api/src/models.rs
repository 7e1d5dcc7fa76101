//! Typed records returned by the metadata API.
//!
//! Fields the API may omit or null out are `Option`s (or defaulted collections) so views never
//! probe for presence ad hoc.

use serde::{Deserialize, Deserializer, Serialize};

/// Maximum number of genre names shown for a movie.
const MAX_GENRE_NAMES: usize = 3;

fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|text| !text.trim().is_empty()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One catalog item as listed by popular/search/discover endpoints.
pub struct MovieSummary {
    /// Catalog identifier.
    pub id: u64,
    /// Localized title.
    #[serde(default)]
    pub title: String,
    /// Title in the original language.
    #[serde(default)]
    pub original_title: Option<String>,
    /// Plot summary.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub overview: Option<String>,
    /// Poster image path relative to the image CDN.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Backdrop image path relative to the image CDN.
    #[serde(default)]
    pub backdrop_path: Option<String>,
    /// Average rating on a 0-10 scale.
    #[serde(default)]
    pub vote_average: Option<f64>,
    /// Number of ratings.
    #[serde(default)]
    pub vote_count: Option<u32>,
    /// Release date (`YYYY-MM-DD`); blank strings from the API become `None`.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub release_date: Option<String>,
    /// Genre identifiers.
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// Popularity score.
    #[serde(default)]
    pub popularity: Option<f64>,
}

impl MovieSummary {
    /// Release year parsed from `release_date`.
    pub fn release_year(&self) -> Option<i32> {
        release_year(self.release_date.as_deref())
    }

    /// Rating formatted with one decimal, e.g. `8.4`.
    pub fn rating_label(&self) -> Option<String> {
        self.vote_average.map(|rating| format!("{rating:.1}"))
    }
}

fn release_year(date: Option<&str>) -> Option<i32> {
    date?.get(0..4)?.parse().ok()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One page of a paginated listing.
pub struct MoviePage {
    /// 1-based page number.
    #[serde(default = "first_page")]
    pub page: u32,
    /// Items on this page.
    #[serde(default)]
    pub results: Vec<MovieSummary>,
    /// Total pages available for the listing.
    #[serde(default)]
    pub total_pages: u32,
    /// Total items available for the listing.
    #[serde(default)]
    pub total_results: u32,
}

fn first_page() -> u32 {
    1
}

impl MoviePage {
    /// Empty first page, used for blank searches.
    pub fn empty() -> Self {
        Self {
            page: 1,
            results: Vec::new(),
            total_pages: 0,
            total_results: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Movie genre.
pub struct Genre {
    /// Genre identifier.
    pub id: u32,
    /// Localized genre name.
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenreList {
    #[serde(default)]
    pub(crate) genres: Vec<Genre>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Full record from the movie detail endpoint.
pub struct MovieDetail {
    /// Catalog identifier.
    pub id: u64,
    /// Localized title.
    #[serde(default)]
    pub title: String,
    /// Title in the original language.
    #[serde(default)]
    pub original_title: Option<String>,
    /// Plot summary.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub overview: Option<String>,
    /// Tagline.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub tagline: Option<String>,
    /// Poster image path.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Backdrop image path.
    #[serde(default)]
    pub backdrop_path: Option<String>,
    /// Release date (`YYYY-MM-DD`).
    #[serde(default, deserialize_with = "blank_as_none")]
    pub release_date: Option<String>,
    /// Runtime in minutes.
    #[serde(default)]
    pub runtime: Option<u32>,
    /// Average rating on a 0-10 scale.
    #[serde(default)]
    pub vote_average: Option<f64>,
    /// Number of ratings.
    #[serde(default)]
    pub vote_count: Option<u32>,
    /// Genres with names.
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Official homepage.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub homepage: Option<String>,
    /// Release status, e.g. `Released`.
    #[serde(default)]
    pub status: Option<String>,
}

impl MovieDetail {
    /// Release year parsed from `release_date`.
    pub fn release_year(&self) -> Option<i32> {
        release_year(self.release_date.as_deref())
    }

    /// Runtime formatted as `2h 28m`.
    pub fn runtime_label(&self) -> Option<String> {
        let minutes = self.runtime.filter(|minutes| *minutes > 0)?;
        Some(match (minutes / 60, minutes % 60) {
            (0, m) => format!("{m}m"),
            (h, 0) => format!("{h}h"),
            (h, m) => format!("{h}h {m}m"),
        })
    }

    /// Summary view of this record, e.g. for wishlisting from a detail page.
    pub fn summary(&self) -> MovieSummary {
        MovieSummary {
            id: self.id,
            title: self.title.clone(),
            original_title: self.original_title.clone(),
            overview: self.overview.clone(),
            poster_path: self.poster_path.clone(),
            backdrop_path: self.backdrop_path.clone(),
            vote_average: self.vote_average,
            vote_count: self.vote_count,
            release_date: self.release_date.clone(),
            genre_ids: self.genres.iter().map(|genre| genre.id).collect(),
            popularity: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Video attached to a movie (trailers, teasers, clips).
pub struct Video {
    /// Site-specific video key (YouTube id).
    pub key: String,
    /// Hosting site, e.g. `YouTube`.
    #[serde(default)]
    pub site: String,
    /// Video kind, e.g. `Trailer` or `Teaser`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoList {
    #[serde(default)]
    pub(crate) results: Vec<Video>,
}

#[derive(Debug, Clone, PartialEq)]
/// Detail page data fetched together.
pub struct MovieBundle {
    /// Movie detail record.
    pub detail: MovieDetail,
    /// Attached videos.
    pub videos: Vec<Video>,
    /// Recommended movies.
    pub recommendations: Vec<MovieSummary>,
}

impl MovieBundle {
    /// Trailer to play for this movie, if any.
    pub fn trailer(&self) -> Option<&Video> {
        pick_trailer(&self.videos)
    }
}

/// Resolves genre ids to names, keeping id order, skipping unknown ids, at most three.
pub fn genre_names(ids: &[u32], genres: &[Genre]) -> Vec<String> {
    ids.iter()
        .filter_map(|id| genres.iter().find(|genre| genre.id == *id))
        .take(MAX_GENRE_NAMES)
        .map(|genre| genre.name.clone())
        .collect()
}

/// First YouTube trailer or teaser.
pub fn pick_trailer(videos: &[Video]) -> Option<&Video> {
    videos.iter().find(|video| {
        video.site == "YouTube" && matches!(video.kind.as_str(), "Trailer" | "Teaser")
    })
}
