use serde::Deserialize;

/// Response body of `GET /search/movie`.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchMovie>,
}

/// One entry in the results list. Only the fields the resolver reads.
#[derive(Debug, Deserialize)]
pub struct SearchMovie {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl SearchMovie {
    /// First four characters of the release date, empty when absent or
    /// too short.
    pub fn year(&self) -> String {
        self.release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .unwrap_or("")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search_response() {
        let json = r#"{
            "page": 1,
            "results": [
                {
                    "id": 603,
                    "title": "The Matrix",
                    "release_date": "1999-03-31",
                    "poster_path": "/poster.jpg",
                    "vote_average": 8.2
                },
                {
                    "id": 604,
                    "title": "The Matrix Reloaded",
                    "release_date": "2003-05-15",
                    "poster_path": null
                }
            ],
            "total_results": 2
        }"#;

        let body: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.results.len(), 2);
        assert_eq!(body.results[0].title.as_deref(), Some("The Matrix"));
        assert_eq!(body.results[0].year(), "1999");
        assert_eq!(body.results[0].poster_path.as_deref(), Some("/poster.jpg"));
        assert_eq!(body.results[1].poster_path, None);
    }

    #[test]
    fn missing_results_defaults_to_empty() {
        let body: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(body.results.is_empty());
    }

    #[test]
    fn year_handles_missing_and_short_dates() {
        let movie: SearchMovie = serde_json::from_str(r#"{"title": "X"}"#).unwrap();
        assert_eq!(movie.year(), "");

        let movie: SearchMovie =
            serde_json::from_str(r#"{"title": "X", "release_date": "19"}"#).unwrap();
        assert_eq!(movie.year(), "");

        let movie: SearchMovie =
            serde_json::from_str(r#"{"title": "X", "release_date": "2021-10-01"}"#).unwrap();
        assert_eq!(movie.year(), "2021");
    }
}
