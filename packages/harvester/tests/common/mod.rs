//! Helpers shared by the integration tests.

#![allow(dead_code)]

use legaldata_harvester::{create_client, FetchConfig};
use reqwest::blocking::Client;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Run blocking harvester code off the async test runtime.
///
/// The blocking client must also be created and dropped there.
pub async fn blocking<T, F>(f: F) -> T
where
    T: Send + 'static,
    F: FnOnce(Client) -> T + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let client = create_client(&FetchConfig::default()).unwrap();
        f(client)
    })
    .await
    .unwrap()
}

/// Serve `body` as HTML at `route`.
pub async fn serve_html(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(body),
        )
        .mount(server)
        .await;
}

/// Serve raw bytes at `route`.
pub async fn serve_bytes(server: &MockServer, route: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

/// Answer `route` with a bare status.
pub async fn serve_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
