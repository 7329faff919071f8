use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use super::error::TmdbError;
use super::types::SearchResponse;
use crate::traits::{MovieCandidate, TitleSearch};

const BASE_URL: &str = "https://api.themoviedb.org/3";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// TMDB movie search client.
///
/// Requests carry a bounded timeout; expiry surfaces as a transport error,
/// never an unbounded wait.
pub struct TmdbClient {
    api_key: String,
    http: Client,
}

impl TmdbClient {
    pub fn new(api_key: String) -> Result<Self, TmdbError> {
        Self::with_timeout(api_key, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(api_key: String, timeout: Duration) -> Result<Self, TmdbError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { api_key, http })
    }

    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, TmdbError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Err(TmdbError::Api {
                status,
                message: body,
            })
        }
    }

    /// Search for a movie, returning the first result as the sole
    /// candidate. No ranking: the provider's ordering wins.
    pub async fn search_movie(&self, query: &str) -> Result<Option<MovieCandidate>, TmdbError> {
        if query.trim().is_empty() {
            return Ok(None);
        }

        let resp = self
            .http
            .get(format!("{BASE_URL}/search/movie"))
            .query(&[("api_key", self.api_key.as_str()), ("query", query)])
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        let body: SearchResponse = resp
            .json()
            .await
            .map_err(|e| TmdbError::Parse(e.to_string()))?;

        let Some(first) = body.results.into_iter().next() else {
            debug!(%query, "no search results");
            return Ok(None);
        };

        let year = first.year();
        Ok(Some(MovieCandidate {
            title: first.title.unwrap_or_default(),
            year,
            poster_path: first.poster_path,
        }))
    }
}

impl TitleSearch for TmdbClient {
    type Error = TmdbError;

    fn search(
        &self,
        query: &str,
    ) -> impl std::future::Future<Output = Result<Option<MovieCandidate>, TmdbError>> + Send {
        self.search_movie(query)
    }
}
