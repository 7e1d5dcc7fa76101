use serde::{Deserialize, Serialize};

/// Genres offered as one-click filters: `(genre id, label)`.
pub const QUICK_GENRES: [(u32, &str); 9] = [
    (28, "Action"),
    (12, "Adventure"),
    (35, "Comedy"),
    (80, "Crime"),
    (18, "Drama"),
    (27, "Horror"),
    (10749, "Romance"),
    (878, "Science Fiction"),
    (53, "Thriller"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Metadata API endpoints used by the catalog.
pub enum Endpoint {
    /// `/movie/popular`
    Popular,
    /// `/movie/now_playing`
    NowPlaying,
    /// `/movie/top_rated`
    TopRated,
    /// `/movie/upcoming`
    Upcoming,
    /// `/search/movie`
    Search,
    /// `/discover/movie`
    Discover,
    /// `/genre/movie/list`
    Genres,
    /// `/movie/{id}`
    Detail(u64),
    /// `/movie/{id}/videos`
    Videos(u64),
    /// `/movie/{id}/recommendations`
    Recommendations(u64),
}

impl Endpoint {
    /// Path relative to the API root.
    pub fn path(&self) -> String {
        match self {
            Self::Popular => "/movie/popular".to_string(),
            Self::NowPlaying => "/movie/now_playing".to_string(),
            Self::TopRated => "/movie/top_rated".to_string(),
            Self::Upcoming => "/movie/upcoming".to_string(),
            Self::Search => "/search/movie".to_string(),
            Self::Discover => "/discover/movie".to_string(),
            Self::Genres => "/genre/movie/list".to_string(),
            Self::Detail(id) => format!("/movie/{id}"),
            Self::Videos(id) => format!("/movie/{id}/videos"),
            Self::Recommendations(id) => format!("/movie/{id}/recommendations"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Endpoint plus request-specific query parameters.
///
/// The credential and language parameters are added by the client when the request is sent.
pub struct CatalogRequest {
    /// Target endpoint.
    pub endpoint: Endpoint,
    /// Query parameters in send order.
    pub params: Vec<(String, String)>,
}

impl CatalogRequest {
    /// Request without parameters.
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            params: Vec::new(),
        }
    }

    /// Request for one page of a listing endpoint.
    pub fn paged(endpoint: Endpoint, page: u32) -> Self {
        Self::new(endpoint).with_param("page", page.max(1).to_string())
    }

    /// Appends a query parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Value of the first parameter named `key`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Sort order accepted by the discover endpoint.
pub enum SortKey {
    /// Most popular first.
    #[default]
    #[serde(rename = "popularity.desc")]
    PopularityDesc,
    /// Least popular first.
    #[serde(rename = "popularity.asc")]
    PopularityAsc,
    /// Highest rated first.
    #[serde(rename = "vote_average.desc")]
    VoteAverageDesc,
    /// Lowest rated first.
    #[serde(rename = "vote_average.asc")]
    VoteAverageAsc,
    /// Newest releases first.
    #[serde(rename = "primary_release_date.desc")]
    ReleaseDateDesc,
    /// Oldest releases first.
    #[serde(rename = "primary_release_date.asc")]
    ReleaseDateAsc,
}

impl SortKey {
    /// Every sort key, in menu order.
    pub const ALL: [SortKey; 6] = [
        Self::PopularityDesc,
        Self::PopularityAsc,
        Self::VoteAverageDesc,
        Self::VoteAverageAsc,
        Self::ReleaseDateDesc,
        Self::ReleaseDateAsc,
    ];

    /// Wire value for the `sort_by` parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PopularityDesc => "popularity.desc",
            Self::PopularityAsc => "popularity.asc",
            Self::VoteAverageDesc => "vote_average.desc",
            Self::VoteAverageAsc => "vote_average.asc",
            Self::ReleaseDateDesc => "primary_release_date.desc",
            Self::ReleaseDateAsc => "primary_release_date.asc",
        }
    }

    /// Parses a wire value.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == raw)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
/// Filters for the discover endpoint. Defaults mean "no filter".
pub struct DiscoverFilters {
    /// Restrict to one genre.
    pub genre_id: Option<u32>,
    /// Minimum average rating; `0` disables the filter.
    pub min_rating: f32,
    /// Sort order.
    pub sort_by: SortKey,
    /// Primary release year.
    pub year: Option<i32>,
}

impl DiscoverFilters {
    /// Filters narrowed to a single genre.
    pub fn genre(genre_id: u32) -> Self {
        Self {
            genre_id: Some(genre_id),
            ..Self::default()
        }
    }

    /// Returns `true` when any filter differs from the defaults.
    pub fn is_active(&self) -> bool {
        self.genre_id.is_some()
            || self.min_rating > 0.0
            || self.sort_by != SortKey::default()
            || self.year.is_some()
    }

    /// Discover request for `page` with only the parameters that are set.
    pub fn request(&self, page: u32) -> CatalogRequest {
        let mut request = CatalogRequest::paged(Endpoint::Discover, page);
        if let Some(genre_id) = self.genre_id {
            request = request.with_param("with_genres", genre_id.to_string());
        }
        if self.min_rating > 0.0 {
            request = request.with_param("vote_average.gte", self.min_rating.to_string());
        }
        request = request.with_param("sort_by", self.sort_by.as_str());
        if let Some(year) = self.year {
            request = request.with_param("primary_release_year", year.to_string());
        }
        request
    }
}

#[derive(Debug, Clone, PartialEq)]
/// What a list view is showing.
pub enum CatalogQuery {
    /// Popular movies.
    Popular,
    /// Movies in theaters now.
    NowPlaying,
    /// Highest rated movies.
    TopRated,
    /// Upcoming releases.
    Upcoming,
    /// Free-text title search.
    Search(String),
    /// Filtered discovery.
    Discover(DiscoverFilters),
}

impl CatalogQuery {
    /// Chooses the listing for a search view: non-blank text searches, otherwise active filters
    /// discover, otherwise popular movies are shown.
    pub fn select(text: &str, filters: &DiscoverFilters) -> Self {
        let text = text.trim();
        if !text.is_empty() {
            Self::Search(text.to_string())
        } else if filters.is_active() {
            Self::Discover(*filters)
        } else {
            Self::Popular
        }
    }

    /// Request for `page` of this listing.
    pub fn request(&self, page: u32) -> CatalogRequest {
        match self {
            Self::Popular => CatalogRequest::paged(Endpoint::Popular, page),
            Self::NowPlaying => CatalogRequest::paged(Endpoint::NowPlaying, page),
            Self::TopRated => CatalogRequest::paged(Endpoint::TopRated, page),
            Self::Upcoming => CatalogRequest::paged(Endpoint::Upcoming, page),
            Self::Search(text) => {
                CatalogRequest::new(Endpoint::Search)
                    .with_param("query", text.trim())
                    .with_param("page", page.max(1).to_string())
            }
            Self::Discover(filters) => filters.request(page),
        }
    }

    /// Returns `true` for a search whose text is blank; such queries are answered locally.
    pub fn is_blank_search(&self) -> bool {
        matches!(self, Self::Search(text) if text.trim().is_empty())
    }
}
