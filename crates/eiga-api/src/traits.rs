//! Trait boundary for title-metadata search providers.
//!
//! The classification pipeline only ever sees this interface, so tests can
//! substitute canned providers and the runtime stays provider-agnostic.

use std::future::Future;

/// A movie-metadata search service.
pub trait TitleSearch: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Search for the best candidate matching a cleaned query.
    ///
    /// `Ok(None)` means the provider returned no results (or the query was
    /// empty). `Err` means the provider could not be reached or answered
    /// with a failure; callers treat that as a distinct outcome from "no
    /// results".
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Option<MovieCandidate>, Self::Error>> + Send;
}

/// The single candidate extracted from a provider response.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MovieCandidate {
    pub title: String,
    /// Four-digit release year, empty when the provider gave no date.
    pub year: String,
    pub poster_path: Option<String>,
}
