//! The Graph subgraph client for protocol participant discovery.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::fmt::Debug;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::{read_body, ApiError};

/// Aave v3 Polygon subgraph.
pub const DEFAULT_SUBGRAPH_URL: &str =
    "https://api.thegraph.com/subgraphs/name/aave/protocol-v3-polygon";

const USERS_QUERY: &str = r#"
query getUsers($first: Int!, $skip: Int!) {
  users(first: $first, skip: $skip) {
    id
  }
}
"#;

/// A paginated source of raw participant addresses.
///
/// Implementations return at most `first` identifiers starting at offset `skip`.
/// A page shorter than `first` signals that the source is exhausted.
#[async_trait]
pub trait AddressPageSource: Send + Sync + Debug {
    /// Fetch one page of raw address strings.
    async fn fetch_page(&self, skip: usize, first: usize) -> Result<Vec<String>, ApiError>;
}

/// GraphQL client for the lending protocol subgraph.
#[derive(Debug, Clone)]
pub struct SubgraphClient {
    client: reqwest::Client,
    url: String,
}

impl SubgraphClient {
    /// Create a client for the given subgraph endpoint.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        Ok(Self {
            client: crate::http_client(timeout)?,
            url: url.into(),
        })
    }

    /// Subgraph endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Build the `users(first, skip)` GraphQL POST for one page.
    fn page_request(&self, skip: usize, first: usize) -> Result<reqwest::Request, ApiError> {
        let body = json!({
            "query": USERS_QUERY,
            "variables": { "first": first, "skip": skip },
        });

        Ok(self.client.post(&self.url).json(&body).build()?)
    }
}

#[async_trait]
impl AddressPageSource for SubgraphClient {
    #[instrument(skip(self))]
    async fn fetch_page(&self, skip: usize, first: usize) -> Result<Vec<String>, ApiError> {
        let request = self.page_request(skip, first)?;
        let response = self.client.execute(request).await?;
        let text = read_body(response).await?;
        let users = parse_users_page(&text)?;

        debug!(skip = skip, fetched = users.len(), "Fetched subgraph users page");

        Ok(users)
    }
}

#[derive(Debug, Deserialize)]
struct GraphResponse {
    data: Option<UsersData>,
    #[serde(default)]
    errors: Vec<GraphError>,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct UsersData {
    users: Vec<UserEntry>,
}

#[derive(Debug, Deserialize)]
struct UserEntry {
    id: String,
}

/// Decode a `users` page, surfacing GraphQL errors instead of an empty page.
fn parse_users_page(text: &str) -> Result<Vec<String>, ApiError> {
    let response: GraphResponse = serde_json::from_str(text)?;

    if !response.errors.is_empty() {
        let messages: Vec<&str> = response.errors.iter().map(|e| e.message.as_str()).collect();
        return Err(ApiError::GraphQl(messages.join("; ")));
    }

    let data = response
        .data
        .ok_or_else(|| ApiError::GraphQl("response has no data".to_string()))?;

    Ok(data.users.into_iter().map(|u| u.id).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_users_page() {
        let json = r#"{
            "data": {
                "users": [
                    { "id": "0x0af3318c4060eac02d50e140de2fb0e492b59ecb" },
                    { "id": "0x9fdbda0a5e284c32744d2f17ee5c74b284993463" }
                ]
            }
        }"#;

        let users = parse_users_page(json).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0], "0x0af3318c4060eac02d50e140de2fb0e492b59ecb");
    }

    #[test]
    fn test_parse_graphql_errors() {
        let json = r#"{
            "errors": [
                { "message": "The `skip` argument must be between 0 and 5000" }
            ]
        }"#;

        match parse_users_page(json) {
            Err(ApiError::GraphQl(msg)) => assert!(msg.contains("skip")),
            other => panic!("expected GraphQL error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_missing_data() {
        assert!(matches!(
            parse_users_page(r#"{ "data": null }"#),
            Err(ApiError::GraphQl(_))
        ));
    }

    #[test]
    fn test_parse_malformed_body() {
        assert!(matches!(
            parse_users_page("<html>bad gateway</html>"),
            Err(ApiError::Decode(_))
        ));
    }

    #[test]
    fn test_page_request() {
        let client =
            SubgraphClient::new("https://subgraph.example/aave", Duration::from_secs(5)).unwrap();

        let request = client.page_request(2000, 1000).unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().as_str(), "https://subgraph.example/aave");
        assert_eq!(
            request.headers().get(reqwest::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let bytes = request.body().and_then(|b| b.as_bytes()).unwrap();
        let body: serde_json::Value = serde_json::from_slice(bytes).unwrap();
        assert_eq!(body["variables"]["first"], 1000);
        assert_eq!(body["variables"]["skip"], 2000);
        assert!(body["query"].as_str().unwrap().contains("users(first: $first, skip: $skip)"));
    }

    #[tokio::test]
    #[ignore] // Requires network
    async fn test_fetch_first_page() {
        let client = SubgraphClient::new(DEFAULT_SUBGRAPH_URL, Duration::from_secs(30)).unwrap();
        let page = client.fetch_page(0, 10).await;
        assert!(page.is_ok());
    }
}
