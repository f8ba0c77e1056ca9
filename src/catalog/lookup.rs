use super::{MovieRecord, PLACEHOLDER_IMAGE, primary_genre};
use futures_util::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use urlencoding::encode;

/// Why a single title produced no record.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Response is missing the {0} field")]
    MissingField(&'static str),

    #[error("Movie not found: {0}")]
    NotFound(String),
}

impl LookupError {
    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            LookupError::Http(e) if e.is_timeout() => "Request timed out".to_string(),
            LookupError::Http(e) => format!("Network error: {}", e),
            LookupError::Status(status) => format!("Lookup service answered HTTP {}", status),
            LookupError::Malformed(_) | LookupError::MissingField(_) => {
                "Lookup service sent an unreadable answer".to_string()
            }
            LookupError::NotFound(reason) => format!("Not found ({})", reason),
        }
    }
}

/// Resolves a title into a movie record.
///
/// Implementations must be shareable across tasks: the loader issues every
/// lookup of a batch concurrently from its own task.
pub trait LookupService: Send + Sync + 'static {
    fn lookup<'a>(&'a self, title: &'a str) -> BoxFuture<'a, Result<MovieRecord, LookupError>>;
}

/// Body of an OMDb title lookup.
#[derive(Debug, Deserialize)]
struct OmdbResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "Genre")]
    genre: Option<String>,
    #[serde(rename = "Plot")]
    plot: Option<String>,
    #[serde(rename = "Poster")]
    poster: Option<String>,
    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,
    #[serde(rename = "Director")]
    director: Option<String>,
}

impl OmdbResponse {
    fn into_record(self) -> Result<MovieRecord, LookupError> {
        if self.response != "True" {
            return Err(LookupError::NotFound(
                self.error.unwrap_or_else(|| "Response was not True".to_string()),
            ));
        }

        let genre = self.genre.ok_or(LookupError::MissingField("Genre"))?;
        let image_url = match self.poster {
            Some(poster) if poster != "N/A" => poster,
            _ => PLACEHOLDER_IMAGE.to_string(),
        };

        Ok(MovieRecord {
            title: self.title.unwrap_or_default(),
            year: self.year.unwrap_or_default(),
            genre: primary_genre(&genre),
            description: self.plot.unwrap_or_default(),
            image_url,
            rating: self.imdb_rating.unwrap_or_default(),
            director: self.director.unwrap_or_default(),
        })
    }
}

/// Parse an OMDb lookup body into a record.
pub fn parse_response(body: &str) -> Result<MovieRecord, LookupError> {
    let response: OmdbResponse = serde_json::from_str(body)?;
    response.into_record()
}

/// OMDb client performing one GET per title.
#[derive(Debug, Clone)]
pub struct OmdbClient {
    client: Client,
    endpoint: String,
}

impl OmdbClient {
    /// `endpoint` already carries the access key, e.g.
    /// `https://www.omdbapi.com/?apikey=XXXX`.
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, LookupError> {
        let client = Client::builder()
            .user_agent(concat!("movie-explorer/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client, endpoint })
    }

    pub fn url_for(&self, title: &str) -> String {
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        format!("{}{}t={}", self.endpoint, separator, encode(title))
    }

    async fn fetch(&self, title: &str) -> Result<MovieRecord, LookupError> {
        let url = self.url_for(title);
        log::debug!("Fetching information for movie {}", title);

        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(LookupError::Status(resp.status().as_u16()));
        }
        let body = resp.text().await?;
        parse_response(&body)
    }
}

impl LookupService for OmdbClient {
    fn lookup<'a>(&'a self, title: &'a str) -> BoxFuture<'a, Result<MovieRecord, LookupError>> {
        Box::pin(self.fetch(title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DARK_KNIGHT: &str = r#"{
        "Title": "The Dark Knight",
        "Year": "2008",
        "Genre": "Action, Crime, Drama",
        "Director": "Christopher Nolan",
        "Plot": "When the menace known as the Joker wreaks havoc and chaos on the people of Gotham...",
        "Poster": "https://m.media-amazon.com/images/M/dark-knight.jpg",
        "imdbRating": "9.0",
        "Response": "True"
    }"#;

    #[test]
    fn test_parse_response_maps_fields() {
        let record = parse_response(DARK_KNIGHT).expect("valid body");
        assert_eq!(record.title, "The Dark Knight");
        assert_eq!(record.year, "2008");
        assert_eq!(record.genre, "Action");
        assert_eq!(record.director, "Christopher Nolan");
        assert_eq!(record.rating, "9.0");
        assert!(record.description.starts_with("When the menace"));
        assert!(record.has_poster());
    }

    #[test]
    fn test_parse_response_poster_na_uses_placeholder() {
        let body = r#"{"Title":"Up","Year":"2009","Genre":"Animation, Adventure",
            "Plot":"","Poster":"N/A","imdbRating":"8.3","Director":"Pete Docter","Response":"True"}"#;
        let record = parse_response(body).expect("valid body");
        assert_eq!(record.image_url, PLACEHOLDER_IMAGE);
        assert_eq!(record.genre, "Animation");
    }

    #[test]
    fn test_parse_response_false_is_not_found() {
        let body = r#"{"Response":"False","Error":"Movie not found!"}"#;
        match parse_response(body) {
            Err(LookupError::NotFound(reason)) => assert_eq!(reason, "Movie not found!"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_response_malformed_json() {
        assert!(matches!(
            parse_response("<html>rate limited</html>"),
            Err(LookupError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_response_without_genre_fails() {
        let body = r#"{"Title":"Mystery","Response":"True"}"#;
        assert!(matches!(
            parse_response(body),
            Err(LookupError::MissingField("Genre"))
        ));
    }

    #[test]
    fn test_url_for_escapes_title() {
        let client = OmdbClient::new(
            "https://www.omdbapi.com/?apikey=abc".to_string(),
            Duration::from_secs(1),
        )
        .expect("client");
        assert_eq!(
            client.url_for("Spider-Man: Into the Spider-Verse"),
            "https://www.omdbapi.com/?apikey=abc&t=Spider-Man%3A%20Into%20the%20Spider-Verse"
        );
        assert_eq!(
            client.url_for("Schindler's List"),
            "https://www.omdbapi.com/?apikey=abc&t=Schindler%27s%20List"
        );
    }

    #[test]
    fn test_url_for_endpoint_without_query() {
        let client = OmdbClient::new("http://localhost:8080/".to_string(), Duration::from_secs(1))
            .expect("client");
        assert_eq!(client.url_for("Up"), "http://localhost:8080/?t=Up");
    }

    /// Serve one canned HTTP response on a local port after `delay`.
    async fn serve_once(status: &str, body: &str, delay: Duration) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            tokio::time::sleep(delay).await;
            let _ = socket.write_all(response.as_bytes()).await;
        });
        format!("http://{}/?apikey=test", addr)
    }

    #[tokio::test]
    async fn test_lookup_success_over_http() {
        let endpoint = serve_once("200 OK", DARK_KNIGHT, Duration::ZERO).await;
        let client = OmdbClient::new(endpoint, Duration::from_secs(5)).unwrap();

        let record = client.lookup("The Dark Knight").await.unwrap();
        assert_eq!(record.title, "The Dark Knight");
        assert_eq!(record.genre, "Action");
    }

    #[tokio::test]
    async fn test_lookup_server_error_is_status_failure() {
        let endpoint = serve_once("500 Internal Server Error", "", Duration::ZERO).await;
        let client = OmdbClient::new(endpoint, Duration::from_secs(5)).unwrap();

        match client.lookup("Up").await {
            Err(LookupError::Status(500)) => {}
            other => panic!("expected Status(500), got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_lookup_slow_server_times_out() {
        let endpoint = serve_once("200 OK", DARK_KNIGHT, Duration::from_secs(3)).await;
        let client = OmdbClient::new(endpoint, Duration::from_millis(200)).unwrap();

        match client.lookup("The Dark Knight").await {
            Err(LookupError::Http(e)) => assert!(e.is_timeout(), "not a timeout: {}", e),
            other => panic!("expected a timeout, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_error_user_message() {
        let error = LookupError::Status(401);
        assert!(error.user_message().contains("401"));
        let error = LookupError::NotFound("Movie not found!".to_string());
        assert_eq!(error.user_message(), "Not found (Movie not found!)");
    }
}
