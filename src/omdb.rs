//! HTTP client for the OMDb movie database.

use crate::config::OmdbConfig;
use crate::model::{Movie, MovieDetail};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OmdbError {
    #[error("empty query")]
    EmptyQuery,
    /// OMDb answered with `"Response": "False"`.
    #[error("{0}")]
    NotFound(String),
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Lookups against a remote movie database. Both calls are safe to repeat.
#[async_trait]
pub trait MovieService: Send + Sync {
    /// Searches by title. An empty list means the search went through but nothing matched.
    async fn search_by_title(&self, query: &str) -> Result<Vec<Movie>, OmdbError>;

    async fn fetch_by_id(&self, imdb_id: &str) -> Result<MovieDetail, OmdbError>;
}

pub struct OmdbClient {
    http: Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct SearchPage {
    #[serde(rename = "Search", default)]
    search: Vec<Movie>,
}

impl OmdbClient {
    pub fn new(config: &OmdbConfig) -> Result<Self, OmdbError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(OmdbClient {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    async fn query(&self, param: &str, value: &str) -> Result<Value, OmdbError> {
        debug!("omdb {}={}", param, value);
        let response = self
            .http
            .get(&self.base_url)
            .query(&[(param, value), ("apikey", self.api_key.as_str())])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(OmdbError::Status(response.status()));
        }
        let bytes = response.bytes().await?;
        check_response(serde_json::from_slice(&bytes)?)
    }
}

/// Unwraps OMDb's `Response` flag, turning `"False"` into `NotFound`.
fn check_response(body: Value) -> Result<Value, OmdbError> {
    match body.get("Response").and_then(Value::as_str) {
        Some("True") => Ok(body),
        _ => Err(OmdbError::NotFound(
            body.get("Error")
                .and_then(Value::as_str)
                .unwrap_or("No data")
                .to_owned(),
        )),
    }
}

#[async_trait]
impl MovieService for OmdbClient {
    async fn search_by_title(&self, query: &str) -> Result<Vec<Movie>, OmdbError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(OmdbError::EmptyQuery);
        }
        let body = self.query("s", query).await?;
        let page: SearchPage = serde_json::from_value(body)?;
        Ok(page.search)
    }

    async fn fetch_by_id(&self, imdb_id: &str) -> Result<MovieDetail, OmdbError> {
        let imdb_id = imdb_id.trim();
        if imdb_id.is_empty() {
            return Err(OmdbError::EmptyQuery);
        }
        let body = self.query("i", imdb_id).await?;
        Ok(serde_json::from_value(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{any, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> OmdbClient {
        OmdbClient::new(&OmdbConfig {
            base_url: format!("{}/", server.uri()),
            api_key: "secret".to_owned(),
            timeout_seconds: 5,
        })
        .unwrap()
    }

    #[actix_rt::test]
    async fn search_returns_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("s", "heat"))
            .and(query_param("apikey", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"Search":[{"Title":"Heat","Year":"1995","imdbID":"tt0113277","Type":"movie","Poster":"N/A"}],"totalResults":"1","Response":"True"}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let movies = client(&server).search_by_title("heat").await.unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].imdb_id, "tt0113277");
    }

    #[actix_rt::test]
    async fn search_trims_query() {
        let server = MockServer::start().await;
        Mock::given(query_param("s", "heat"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"Search":[],"Response":"True"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let movies = client(&server).search_by_title("  heat ").await.unwrap();
        assert!(movies.is_empty());
    }

    #[actix_rt::test]
    async fn blank_query_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client(&server);
        assert!(matches!(
            client.search_by_title("   ").await,
            Err(OmdbError::EmptyQuery)
        ));
        assert!(matches!(
            client.fetch_by_id("").await,
            Err(OmdbError::EmptyQuery)
        ));
    }

    #[actix_rt::test]
    async fn false_response_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"Response":"False","Error":"Movie not found!"}"#,
            ))
            .mount(&server)
            .await;

        let err = client(&server).search_by_title("zzzz").await.unwrap_err();
        match err {
            OmdbError::NotFound(message) => assert_eq!(message, "Movie not found!"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn server_error_is_status() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client(&server).search_by_title("heat").await.unwrap_err();
        assert!(matches!(err, OmdbError::Status(StatusCode::SERVICE_UNAVAILABLE)));
    }

    #[actix_rt::test]
    async fn garbage_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client(&server).fetch_by_id("tt1").await.unwrap_err();
        assert!(matches!(err, OmdbError::Decode(_)));
    }

    #[actix_rt::test]
    async fn fetch_by_id_returns_detail() {
        let server = MockServer::start().await;
        Mock::given(query_param("i", "tt0113277"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"Title":"Heat","Year":"1995","Genre":"Crime, Drama","Director":"Michael Mann","Plot":"A group of high-end professional thieves...","imdbRating":"8.3","imdbID":"tt0113277","Response":"True"}"#,
            ))
            .mount(&server)
            .await;

        let detail = client(&server).fetch_by_id("tt0113277").await.unwrap();
        assert_eq!(detail.director, "Michael Mann");
        assert_eq!(detail.imdb_rating, "8.3");
    }

    #[actix_rt::test]
    async fn unreachable_host_is_transport_error() {
        let client = OmdbClient::new(&OmdbConfig {
            base_url: "http://127.0.0.1:1/".to_owned(),
            api_key: String::new(),
            timeout_seconds: 1,
        })
        .unwrap();
        let err = client.search_by_title("heat").await.unwrap_err();
        assert!(matches!(err, OmdbError::Transport(_)));
    }
}
