//! Parallel loading of independent listing sections (home page rows).

use futures::future::join_all;

use crate::{
    CatalogClient, CatalogError, CatalogQuery, CatalogTransport, DiscoverFilters, MoviePage,
};

#[derive(Debug, Clone, PartialEq)]
/// One section's outcome. A failure stays local to its section.
pub struct SectionResult {
    /// Section heading.
    pub label: String,
    /// First page of the section, or the error shown inline in its place.
    pub outcome: Result<MoviePage, CatalogError>,
}

/// Default home page rows.
pub fn home_sections() -> Vec<(String, CatalogQuery)> {
    vec![
        ("Popular".to_string(), CatalogQuery::Popular),
        ("Now Playing".to_string(), CatalogQuery::NowPlaying),
        ("Top Rated".to_string(), CatalogQuery::TopRated),
        (
            "Action".to_string(),
            CatalogQuery::Discover(DiscoverFilters::genre(28)),
        ),
        (
            "Comedy".to_string(),
            CatalogQuery::Discover(DiscoverFilters::genre(35)),
        ),
        (
            "Romance".to_string(),
            CatalogQuery::Discover(DiscoverFilters::genre(10749)),
        ),
    ]
}

/// Loads the first page of every section concurrently, in input order.
pub async fn load_sections<T: CatalogTransport>(
    client: &CatalogClient<T>,
    sections: &[(String, CatalogQuery)],
) -> Vec<SectionResult> {
    join_all(sections.iter().map(|(label, query)| async move {
        SectionResult {
            label: label.clone(),
            outcome: client.fetch(query, 1).await,
        }
    }))
    .await
}
