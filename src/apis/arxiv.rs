use std::time::Duration;

use super::{Catalog, SourceError};
use crate::config::Config;
use crate::feed;
use async_trait::async_trait;

const USER_AGENT: &str = concat!("arxiv-export/", env!("CARGO_PKG_VERSION"));

pub struct ArxivClient {
    client: reqwest::Client,
    base_url: String,
    probe_timeout: Duration,
    fetch_timeout: Duration,
}

impl ArxivClient {
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        Ok(Self {
            client: reqwest::Client::builder().user_agent(USER_AGENT).build()?,
            base_url: config.api_url.clone(),
            probe_timeout: config.probe_timeout,
            fetch_timeout: config.fetch_timeout,
        })
    }

    async fn get(
        &self,
        params: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<String, SourceError> {
        let body = self
            .client
            .get(&self.base_url)
            .query(params)
            .timeout(timeout)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

#[async_trait]
impl Catalog for ArxivClient {
    fn name(&self) -> &str {
        "arxiv"
    }

    async fn total_results(&self, query: &str) -> Result<u32, SourceError> {
        tracing::info!("Counting results for {}", query);
        let body = self
            .get(
                &[("search_query", query), ("start", "0"), ("max_results", "1")],
                self.probe_timeout,
            )
            .await?;
        feed::total_results(&body)
    }

    async fn fetch_feed(&self, query: &str, max_results: u32) -> Result<String, SourceError> {
        tracing::info!("Fetching up to {} entries for {}", max_results, query);
        let max = max_results.to_string();
        self.get(
            &[
                ("search_query", query),
                ("start", "0"),
                ("max_results", max.as_str()),
                ("sortBy", "submittedDate"),
                ("sortOrder", "descending"),
            ],
            self.fetch_timeout,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const COUNT_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <opensearch:totalResults xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">42</opensearch:totalResults>
  <entry><id>http://arxiv.org/abs/2301.12345v1</id><title>One</title></entry>
</feed>"#;

    fn client_for(server: &MockServer, timeout: Duration) -> ArxivClient {
        let config = Config {
            api_url: format!("{}/api/query", server.uri()),
            probe_timeout: timeout,
            fetch_timeout: timeout,
            ..Config::default()
        };
        ArxivClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_total_results_sends_probe_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/query"))
            .and(query_param("search_query", "ti:(graph)"))
            .and(query_param("max_results", "1"))
            .and(query_param("start", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(COUNT_FEED))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        assert_eq!(client.total_results("ti:(graph)").await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_fetch_feed_sorts_by_submission_date() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/query"))
            .and(query_param("search_query", "(au:(Doe)) AND (ti:(graph))"))
            .and(query_param("max_results", "25"))
            .and(query_param("sortBy", "submittedDate"))
            .and(query_param("sortOrder", "descending"))
            .respond_with(ResponseTemplate::new(200).set_body_string(COUNT_FEED))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let body = client
            .fetch_feed("(au:(Doe)) AND (ti:(graph))", 25)
            .await
            .unwrap();
        assert!(body.contains("2301.12345v1"));
    }

    #[tokio::test]
    async fn test_http_error_status_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let err = client.fetch_feed("all:(x)", 10).await.unwrap_err();
        assert!(matches!(err, SourceError::Http(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(COUNT_FEED)
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_millis(200));
        let err = client.total_results("all:(x)").await.unwrap_err();
        match err {
            SourceError::Http(e) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
