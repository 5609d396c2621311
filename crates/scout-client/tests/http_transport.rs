//! HTTP transport tests
//!
//! Exercise the reqwest transport against a local mock server.

use scout_client::{CreateServerOptions, ScoutClient, ScoutConfig, ScoutError, Server, ServerQuery};
use wiremock::matchers::{basic_auth, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SERVER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<client>
  <id type="integer">7</id>
  <name>Web 7</name>
  <hostname>web7.example.com</hostname>
</client>"#;

fn client_for(mock_server: &MockServer) -> ScoutClient {
    let config =
        ScoutConfig::new("acme", "ops@acme.test", "secret").with_base_url(mock_server.uri());
    ScoutClient::new(config).unwrap()
}

#[tokio::test]
async fn test_get_sends_basic_auth_and_accept_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/acme/clients/7.xml"))
        .and(basic_auth("ops@acme.test", "secret"))
        .and(header("accept", "application/xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SERVER_XML))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let server = Server::first(&client, 7_u64).await.unwrap();

    assert_eq!(server.id, 7);
    assert_eq!(server.hostname, "web7.example.com");
}

#[tokio::test]
async fn test_hostname_query_is_encoded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/acme/clients.xml"))
        .and(query_param("host", "web 7.example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<clients type="array"><client><id type="integer">7</id><hostname>web 7.example.com</hostname></client></clients>"#,
        ))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let servers = Server::all(&client, &ServerQuery::host("web 7.example.com"))
        .await
        .unwrap();

    assert_eq!(servers.len(), 1);
    assert_eq!(servers[0].id, 7);
}

#[tokio::test]
async fn test_create_posts_query_and_follows_id_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/acme/clients.xml"))
        .and(query_param("client[name]", "Web 7"))
        .and(query_param("client[copy_plugins_from_client_id]", "3"))
        .respond_with(ResponseTemplate::new(201).insert_header("id", "7"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/acme/clients/7.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SERVER_XML))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let server = Server::create(&client, "Web 7", &CreateServerOptions::copy_plugins_from(3))
        .await
        .unwrap();

    assert_eq!(server.name, "Web 7");
}

#[tokio::test]
async fn test_delete_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/acme/clients/8.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = Server::delete(&client, 8).await.unwrap_err();

    assert!(matches!(err, ScoutError::NotFound(_)));
}

#[tokio::test]
async fn test_server_error_is_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/acme/clients/7.xml"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = Server::first(&client, 7_u64).await.unwrap_err();

    assert!(matches!(err, ScoutError::Api(_)));
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    // Nothing listens on the discard port
    let config = ScoutConfig::new("acme", "ops@acme.test", "secret")
        .with_base_url("http://127.0.0.1:9");
    let client = ScoutClient::new(config).unwrap();

    let err = Server::first(&client, 7_u64).await.unwrap_err();
    assert!(matches!(err, ScoutError::Http(_)));
}
