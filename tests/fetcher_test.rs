use std::time::Duration;

use serde_json::json;
use sheet_search_cache::{RowSource, SheetError, SheetsConfig, SheetsFetcher};
use wiremock::matchers::{method, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher_for(server: &MockServer) -> SheetsFetcher {
    let config = SheetsConfig::new("sheet-123", "secret-key")
        .with_base_url(server.uri())
        .with_request_timeout(Duration::from_secs(2));
    SheetsFetcher::new(&config).unwrap()
}

async fn respond_with(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/sheet-123/values/"))
        .and(query_param("key", "secret-key"))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_rows_success() {
    let server = MockServer::start().await;
    respond_with(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "range": "Sheet1!A1:L3",
            "majorDimension": "ROWS",
            "values": [
                ["Account", "Customer Name", "Address"],
                ["A-1", "Alice", "1 Main St", "0711", null, 42],
                ["A-2"]
            ]
        })),
    )
    .await;

    let rows = fetcher_for(&server).fetch_rows().await.unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1], vec!["A-1", "Alice", "1 Main St", "0711", "", "42"]);
    assert_eq!(rows[2], vec!["A-2"]);
}

#[tokio::test]
async fn test_empty_range_has_no_rows() {
    let server = MockServer::start().await;
    respond_with(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"range": "Sheet1!A1:L1", "majorDimension": "ROWS"})),
    )
    .await;

    let rows = fetcher_for(&server).fetch_rows().await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_status_codes_are_classified() {
    let cases = [
        (403, SheetError::UpstreamAuth),
        (400, SheetError::UpstreamBadRequest),
        (404, SheetError::UpstreamNotFound),
        (429, SheetError::UpstreamRateLimited),
        (502, SheetError::UpstreamUnknown(502)),
    ];

    for (status, expected) in cases {
        let server = MockServer::start().await;
        respond_with(
            &server,
            ResponseTemplate::new(status).set_body_json(json!({"error": {"code": status}})),
        )
        .await;

        let err = fetcher_for(&server).fetch_rows().await.unwrap_err();
        assert_eq!(err, expected, "status {status}");
    }
}

#[tokio::test]
async fn test_malformed_body() {
    let server = MockServer::start().await;
    respond_with(&server, ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;

    let err = fetcher_for(&server).fetch_rows().await.unwrap_err();
    assert!(matches!(err, SheetError::UpstreamMalformed(_)));
}

#[tokio::test]
async fn test_connection_refused_is_unreachable() {
    // Nothing listens on the discard port locally.
    let config = SheetsConfig::new("sheet-123", "secret-key")
        .with_base_url("http://127.0.0.1:9")
        .with_request_timeout(Duration::from_secs(2));
    let fetcher = SheetsFetcher::new(&config).unwrap();

    let err = fetcher.fetch_rows().await.unwrap_err();
    assert!(matches!(err, SheetError::UpstreamUnreachable(_)), "got {err:?}");
}

#[tokio::test]
async fn test_one_request_per_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/sheet-123/values/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = fetcher_for(&server).fetch_rows().await.unwrap_err();
    assert_eq!(err, SheetError::UpstreamUnknown(500));
}
