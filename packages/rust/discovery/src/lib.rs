//! Index page discovery.
//!
//! Before harvesting, the index page is fetched once and every item link on
//! it is collected. The resulting locations are the pool's task list.

mod parser;

use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;
use wikiharvest_shared::{HarvestError, Result};

pub use parser::ItemLinks;

/// Fetch the index page and collect its item locations.
///
/// Any failure here is fatal to the run: without the index there is
/// nothing to harvest.
#[instrument(skip_all, fields(url = %index_url))]
pub async fn discover(client: &Client, index_url: &Url) -> Result<ItemLinks> {
    let body = fetch_index(client, index_url).await?;
    let links = find_item_links(&body);

    if links.duplicates > 0 {
        debug!(duplicates = links.duplicates, "dropped repeated item links");
    }
    info!(items = links.locations.len(), "discovered item pages");

    Ok(links)
}

/// Collect item locations from index markup that is already in hand.
pub fn find_item_links(html: &str) -> ItemLinks {
    parser::find_item_links(html)
}

async fn fetch_index(client: &Client, url: &Url) -> Result<String> {
    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| HarvestError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(HarvestError::Network(format!("{url}: HTTP {status}")));
    }

    response
        .text()
        .await
        .map_err(|e| HarvestError::Network(format!("{url}: failed to read body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn index_fixture() -> String {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/html/imo_index.html");
        std::fs::read_to_string(path).expect("read index fixture")
    }

    #[tokio::test]
    async fn test_discover_with_mock_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wiki/index.php/IMO_Problems_and_Solutions"))
            .respond_with(ResponseTemplate::new(200).set_body_string(index_fixture()))
            .mount(&server)
            .await;

        let url = Url::parse(&format!(
            "{}/wiki/index.php/IMO_Problems_and_Solutions",
            server.uri()
        ))
        .unwrap();
        let links = discover(&Client::new(), &url).await.unwrap();

        assert_eq!(
            links.locations,
            vec![
                "/wiki/index.php/2019_IMO_Problems/Problem_1",
                "/wiki/index.php/2019_IMO_Problems/Problem_2",
                "/wiki/index.php/2018_IMO_Problems/Problem_1",
            ]
        );
        assert_eq!(links.duplicates, 1);
    }

    #[tokio::test]
    async fn test_discover_index_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/index", server.uri())).unwrap();
        let err = discover(&Client::new(), &url).await.unwrap_err();
        assert!(matches!(err, HarvestError::Network(_)));
    }

    #[tokio::test]
    async fn test_discover_page_without_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>Nothing here</p>"))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let links = discover(&Client::new(), &url).await.unwrap();
        assert!(links.locations.is_empty());
    }
}
