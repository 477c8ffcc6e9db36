use natter::config::IpInfoConfig;
use natter::ipinfo::IpInfoClient;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> IpInfoClient {
    let config = IpInfoConfig {
        api_base: format!("{}/json", server.uri()),
        timeout_seconds: 5,
    };
    IpInfoClient::new(&config).expect("client construction failed")
}

fn success_body() -> serde_json::Value {
    serde_json::json!({
        "query": "8.8.8.8",
        "status": "success",
        "country": "United States",
        "countryCode": "US",
        "region": "VA",
        "regionName": "Virginia",
        "city": "Ashburn",
        "zip": "20149",
        "lat": 39.03,
        "lon": -77.5,
        "timezone": "America/New_York",
        "isp": "Google LLC",
        "org": "Google Public DNS",
        "as": "AS15169 Google LLC"
    })
}

#[tokio::test]
async fn test_fetch_own_ip_hits_bare_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let info = client.fetch().await.expect("fetch failed");

    assert!(info.is_success());
    assert_eq!(info.query, "8.8.8.8");
    assert_eq!(info.country_code, "US");
    assert_eq!(info.formatted_location(), "Ashburn, Virginia, United States");
}

#[tokio::test]
async fn test_fetch_for_specific_ip_uses_ip_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/8.8.8.8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let info = client.fetch_for("8.8.8.8").await.expect("fetch failed");

    assert_eq!(info.asn, "AS15169 Google LLC");
    assert!(info.has_valid_coordinates());
}

#[tokio::test]
async fn test_fail_status_becomes_error() {
    let server = MockServer::start().await;

    // ip-api.com reports lookup failures with HTTP 200 and a "fail" status
    Mock::given(method("GET"))
        .and(path("/json/10.0.0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "fail",
            "message": "private range",
            "query": "10.0.0.1"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .fetch_for("10.0.0.1")
        .await
        .expect_err("expected lookup failure");

    assert!(err.to_string().contains("private range"));
}

#[tokio::test]
async fn test_http_error_status_becomes_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.fetch().await.is_err());
}

#[tokio::test]
async fn test_sparse_success_payload_is_tolerated() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "query": "1.2.3.4"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let info = client.fetch().await.expect("fetch failed");

    assert_eq!(info.query, "1.2.3.4");
    assert!(info.country.is_empty());
    assert_eq!(info.lat, 0.0);
}
