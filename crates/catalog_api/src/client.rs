use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::{
    models::{GenreList, VideoList},
    CatalogConfig, CatalogError, CatalogQuery, CatalogRequest, CatalogTransport, DiscoverFilters,
    Endpoint, Genre, MovieBundle, MovieDetail, MoviePage, TransportResponse, Video,
};

/// Client for the metadata API, bound to one credential.
///
/// The credential is passed in explicitly (from the signed-in session) rather than read from
/// storage on every call.
#[derive(Debug, Clone)]
pub struct CatalogClient<T> {
    transport: T,
    config: CatalogConfig,
    api_key: String,
}

impl<T: CatalogTransport> CatalogClient<T> {
    /// Creates a client sending requests through `transport` with `api_key`.
    pub fn new(transport: T, config: CatalogConfig, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            config,
            api_key: api_key.into(),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Returns `true` when a non-blank credential is configured.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Sends `request` and decodes a success body as `R`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingApiKey`] without sending anything when no credential is set,
    /// otherwise the transport failure or the mapped non-success status.
    pub async fn execute<R: DeserializeOwned>(
        &self,
        request: &CatalogRequest,
    ) -> Result<R, CatalogError> {
        if !self.has_api_key() {
            return Err(CatalogError::MissingApiKey);
        }
        send(
            &self.transport,
            &self.config,
            &self.api_key,
            request,
            self.config.timeout,
        )
        .await
    }

    /// Popular movies.
    pub async fn popular(&self, page: u32) -> Result<MoviePage, CatalogError> {
        self.fetch(&CatalogQuery::Popular, page).await
    }

    /// Movies in theaters now.
    pub async fn now_playing(&self, page: u32) -> Result<MoviePage, CatalogError> {
        self.fetch(&CatalogQuery::NowPlaying, page).await
    }

    /// Highest rated movies.
    pub async fn top_rated(&self, page: u32) -> Result<MoviePage, CatalogError> {
        self.fetch(&CatalogQuery::TopRated, page).await
    }

    /// Upcoming releases.
    pub async fn upcoming(&self, page: u32) -> Result<MoviePage, CatalogError> {
        self.fetch(&CatalogQuery::Upcoming, page).await
    }

    /// Title search. Blank text yields an empty page without a request.
    pub async fn search(&self, text: &str, page: u32) -> Result<MoviePage, CatalogError> {
        self.fetch(&CatalogQuery::Search(text.to_string()), page).await
    }

    /// Filtered discovery.
    pub async fn discover(
        &self,
        filters: &DiscoverFilters,
        page: u32,
    ) -> Result<MoviePage, CatalogError> {
        self.fetch(&CatalogQuery::Discover(*filters), page).await
    }

    /// One page of any listing.
    pub async fn fetch(&self, query: &CatalogQuery, page: u32) -> Result<MoviePage, CatalogError> {
        if query.is_blank_search() {
            return Ok(MoviePage::empty());
        }
        self.execute(&query.request(page)).await
    }

    /// Detail record for one movie.
    pub async fn movie_detail(&self, id: u64) -> Result<MovieDetail, CatalogError> {
        self.execute(&CatalogRequest::new(Endpoint::Detail(id))).await
    }

    /// Videos attached to one movie.
    pub async fn movie_videos(&self, id: u64) -> Result<Vec<Video>, CatalogError> {
        let list: VideoList = self
            .execute(&CatalogRequest::new(Endpoint::Videos(id)))
            .await?;
        Ok(list.results)
    }

    /// Movies recommended for one movie.
    pub async fn recommendations(&self, id: u64) -> Result<MoviePage, CatalogError> {
        self.execute(&CatalogRequest::paged(Endpoint::Recommendations(id), 1))
            .await
    }

    /// Genre list.
    pub async fn genres(&self) -> Result<Vec<Genre>, CatalogError> {
        let list: GenreList = self.execute(&CatalogRequest::new(Endpoint::Genres)).await?;
        Ok(list.genres)
    }

    /// Detail, videos, and recommendations fetched concurrently; fails if any part fails.
    pub async fn movie_bundle(&self, id: u64) -> Result<MovieBundle, CatalogError> {
        let (detail, videos, recommendations) = futures::try_join!(
            self.movie_detail(id),
            self.movie_videos(id),
            self.recommendations(id)
        )?;
        Ok(MovieBundle {
            detail,
            videos,
            recommendations: recommendations.results,
        })
    }
}

async fn send<T: CatalogTransport + ?Sized, R: DeserializeOwned>(
    transport: &T,
    config: &CatalogConfig,
    api_key: &str,
    request: &CatalogRequest,
    timeout: Duration,
) -> Result<R, CatalogError> {
    let url = config.endpoint_url(&request.endpoint);
    let mut query = Vec::with_capacity(request.params.len() + 2);
    query.push(("api_key".to_string(), api_key.trim().to_string()));
    query.push(("language".to_string(), config.language.clone()));
    query.extend(
        request
            .params
            .iter()
            .filter(|(key, _)| key != "api_key" && key != "language")
            .cloned(),
    );

    let response = transport.get(&url, &query, timeout).await?;
    decode_response(response)
}

fn decode_response<R: DeserializeOwned>(response: TransportResponse) -> Result<R, CatalogError> {
    if !(200..300).contains(&response.status) {
        return Err(CatalogError::from_status(response.status, &response.body));
    }
    serde_json::from_str(&response.body).map_err(|err| CatalogError::Decode(err.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Outcome of checking a credential against the API.
pub struct ApiKeyValidation {
    /// Whether the credential was accepted.
    pub valid: bool,
    /// Text shown next to the credential field.
    pub message: String,
}

impl ApiKeyValidation {
    fn new(valid: bool, message: &str) -> Self {
        Self {
            valid,
            message: message.to_string(),
        }
    }
}

/// Checks `api_key` by requesting the genre list with the shorter validation timeout.
pub async fn validate_api_key<T: CatalogTransport + ?Sized>(
    transport: &T,
    config: &CatalogConfig,
    api_key: &str,
) -> ApiKeyValidation {
    if api_key.trim().is_empty() {
        return ApiKeyValidation::new(false, "Enter an API key.");
    }
    let request = CatalogRequest::new(Endpoint::Genres);
    match send::<_, GenreList>(transport, config, api_key, &request, config.validation_timeout)
        .await
    {
        Ok(_) => ApiKeyValidation::new(true, "API key is valid."),
        Err(CatalogError::Unauthorized) => ApiKeyValidation::new(false, "API key is not valid."),
        Err(_) => ApiKeyValidation::new(false, "API key validation failed. Try again."),
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::{MemoryTransport, SortKey};

    fn client(transport: &MemoryTransport) -> CatalogClient<MemoryTransport> {
        CatalogClient::new(transport.clone(), CatalogConfig::default(), "secret")
    }

    fn page_json(ids: &[u64], total_pages: u32) -> serde_json::Value {
        let results: Vec<serde_json::Value> = ids
            .iter()
            .map(|id| json!({"id": id, "title": format!("movie {id}")}))
            .collect();
        json!({
            "page": 1,
            "results": results,
            "total_pages": total_pages,
            "total_results": ids.len(),
        })
    }

    #[test]
    fn every_request_carries_credential_and_language_first() {
        let transport = MemoryTransport::default();
        transport.respond_json("/movie/popular", &page_json(&[1, 2], 5));

        let page = block_on(client(&transport).popular(3)).expect("popular");

        assert_eq!(page.results.len(), 2);
        assert_eq!(page.total_pages, 5);
        let sent = transport.requests();
        assert_eq!(sent[0].url, "https://api.themoviedb.org/3/movie/popular");
        assert_eq!(
            sent[0].query,
            vec![
                ("api_key".to_string(), "secret".to_string()),
                ("language".to_string(), "ko-KR".to_string()),
                ("page".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn missing_credential_fails_without_sending() {
        let transport = MemoryTransport::default();
        let client = CatalogClient::new(transport.clone(), CatalogConfig::default(), "  ");
        assert_eq!(
            block_on(client.top_rated(1)),
            Err(CatalogError::MissingApiKey)
        );
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn blank_search_is_answered_locally() {
        let transport = MemoryTransport::default();
        let page = block_on(client(&transport).search("   ", 1)).expect("search");
        assert_eq!(page, MoviePage::empty());
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn discover_sends_only_active_filters() {
        let transport = MemoryTransport::default();
        transport.respond_json("/discover/movie", &page_json(&[7], 1));
        let filters = DiscoverFilters {
            genre_id: Some(878),
            sort_by: SortKey::ReleaseDateDesc,
            ..DiscoverFilters::default()
        };

        block_on(client(&transport).discover(&filters, 1)).expect("discover");

        let sent = &transport.requests()[0];
        assert_eq!(sent.param("with_genres"), Some("878"));
        assert_eq!(sent.param("sort_by"), Some("primary_release_date.desc"));
        assert_eq!(sent.param("vote_average.gte"), None);
        assert_eq!(sent.param("primary_release_year"), None);
    }

    #[test]
    fn error_statuses_surface_as_taxonomy() {
        let transport = MemoryTransport::default();
        transport.respond(
            "/movie/upcoming",
            TransportResponse {
                status: 401,
                body: r#"{"status_code":7,"status_message":"Invalid API key"}"#.to_string(),
            },
        );
        assert_eq!(
            block_on(client(&transport).upcoming(1)),
            Err(CatalogError::Unauthorized)
        );
        assert_eq!(
            block_on(client(&transport).movie_detail(1)),
            Err(CatalogError::NotFound)
        );
    }

    #[test]
    fn malformed_success_body_is_a_decode_error() {
        let transport = MemoryTransport::default();
        transport.respond("/movie/now_playing", TransportResponse::ok("<html>"));
        assert!(matches!(
            block_on(client(&transport).now_playing(1)),
            Err(CatalogError::Decode(_))
        ));
    }

    #[test]
    fn bundle_joins_detail_videos_and_recommendations() {
        let transport = MemoryTransport::default();
        transport.respond_json(
            "/movie/27205",
            &json!({"id": 27205, "title": "Inception", "genres": [{"id": 28, "name": "Action"}]}),
        );
        transport.respond_json(
            "/movie/27205/videos",
            &json!({
                "results": [
                    {"key": "YoHD9XEInc0", "site": "YouTube", "type": "Trailer", "name": "Trailer"}
                ]
            }),
        );
        transport.respond_json("/movie/27205/recommendations", &page_json(&[155, 157336], 1));

        let bundle = block_on(client(&transport).movie_bundle(27205)).expect("bundle");

        assert_eq!(bundle.detail.title, "Inception");
        assert_eq!(bundle.trailer().map(|v| v.key.as_str()), Some("YoHD9XEInc0"));
        assert_eq!(
            bundle.recommendations.iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![155, 157336]
        );
    }

    #[test]
    fn bundle_fails_when_any_part_fails() {
        let transport = MemoryTransport::default();
        transport.respond_json("/movie/5", &json!({"id": 5, "title": "x"}));
        transport.respond_json("/movie/5/recommendations", &page_json(&[], 0));
        transport.fail("/movie/5/videos", CatalogError::Timeout);
        assert_eq!(
            block_on(client(&transport).movie_bundle(5)),
            Err(CatalogError::Timeout)
        );
    }

    #[test]
    fn genres_unwrap_the_list_envelope() {
        let transport = MemoryTransport::default();
        transport.respond_json(
            "/genre/movie/list",
            &json!({"genres": [{"id": 28, "name": "Action"}, {"id": 35, "name": "Comedy"}]}),
        );
        let genres = block_on(client(&transport).genres()).expect("genres");
        assert_eq!(genres.len(), 2);
        assert_eq!(genres[1].name, "Comedy");
    }

    #[test]
    fn api_key_validation_outcomes() {
        let config = CatalogConfig::default();
        let transport = MemoryTransport::default();
        assert!(!block_on(validate_api_key(&transport, &config, " ")).valid);
        assert!(transport.requests().is_empty());

        transport.respond(
            "/genre/movie/list",
            TransportResponse {
                status: 401,
                body: String::new(),
            },
        );
        let rejected = block_on(validate_api_key(&transport, &config, "bad"));
        assert_eq!(rejected.message, "API key is not valid.");

        let accepted_transport = MemoryTransport::default();
        accepted_transport.respond_json("/genre/movie/list", &json!({"genres": []}));
        let accepted = block_on(validate_api_key(&accepted_transport, &config, "good"));
        assert!(accepted.valid);
        assert_eq!(accepted_transport.requests()[0].param("api_key"), Some("good"));

        let flaky = MemoryTransport::default();
        flaky.fail("/genre/movie/list", CatalogError::Network("offline".into()));
        let failed = block_on(validate_api_key(&flaky, &config, "good"));
        assert!(!failed.valid);
        assert_eq!(failed.message, "API key validation failed. Try again.");
    }
}
