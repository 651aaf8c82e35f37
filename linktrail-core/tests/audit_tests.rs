// Tests for audit request handling

use linktrail_core::audit::{
    AuditOptions, AuditOutcome, AuditRequest, RequestError, execute_audit, extract_url_path,
    handle_request,
};
use linktrail_scanner::{CancellationToken, CrawlConfig, LinkType};
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

// ============================================================================
// Request Parsing Tests
// ============================================================================

#[test]
fn test_from_json_applies_defaults() {
    let request = AuditRequest::from_json(r#"{"urls": ["https://a.test/"]}"#).unwrap();
    assert_eq!(request.urls, vec!["https://a.test/"]);
    assert!(!request.recursive);
    assert_eq!(request.max_urls, 100);
    assert_eq!(request.max_depth, 2);
    assert_eq!(request.rate_limit, 2.0);
    assert!(request.same_domain_only);
}

#[test]
fn test_from_json_reads_camel_case_fields() {
    let body = r#"{
        "urls": ["https://a.test/"],
        "recursive": true,
        "maxUrls": 25,
        "maxDepth": 4,
        "rateLimit": 0.5,
        "sameDomainOnly": false
    }"#;
    let request = AuditRequest::from_json(body).unwrap();
    assert!(request.recursive);
    assert_eq!(request.max_urls, 25);
    assert_eq!(request.max_depth, 4);
    assert_eq!(request.rate_limit, 0.5);
    assert!(!request.same_domain_only);
}

#[test]
fn test_from_json_missing_urls() {
    let err = AuditRequest::from_json(r#"{"recursive": true}"#).unwrap_err();
    assert_eq!(err, RequestError::MissingUrls);

    let err = AuditRequest::from_json(r#"{"urls": null}"#).unwrap_err();
    assert_eq!(err, RequestError::MissingUrls);
}

#[test]
fn test_from_json_malformed_urls() {
    for body in [
        r#"{"urls": "https://a.test/"}"#,
        r#"{"urls": [1, 2]}"#,
        r#"{"urls": ["https://a.test/", {"x": 1}]}"#,
    ] {
        let err = AuditRequest::from_json(body).unwrap_err();
        assert_eq!(err, RequestError::MalformedUrls, "body: {}", body);
    }
}

#[test]
fn test_from_json_not_json() {
    let err = AuditRequest::from_json("urls=https://a.test").unwrap_err();
    assert!(matches!(err, RequestError::Malformed(_)));
}

// ============================================================================
// Validation Tests
// ============================================================================

#[test]
fn test_validate_normalizes_and_dedups_seeds() {
    let request = AuditRequest::new(vec![
        "https://a.test/".to_string(),
        "https://a.test/#intro".to_string(),
        "not a url".to_string(),
        "https://b.test/x".to_string(),
    ]);
    let seeds = request.validate().unwrap();
    assert_eq!(seeds, vec!["https://a.test/", "https://b.test/x"]);
}

#[test]
fn test_validate_empty_urls() {
    let request = AuditRequest::new(vec![]);
    assert_eq!(request.validate().unwrap_err(), RequestError::MissingUrls);
}

#[test]
fn test_validate_no_usable_urls() {
    let request = AuditRequest::new(vec!["/relative".to_string(), "mailto:x@a.test".to_string()]);
    assert_eq!(request.validate().unwrap_err(), RequestError::NoValidUrls);
}

#[test]
fn test_validate_rate_limit() {
    let mut request = AuditRequest::new(vec!["https://a.test/".to_string()]);
    request.rate_limit = 0.0;
    assert!(matches!(
        request.validate(),
        Err(RequestError::InvalidRateLimit(_))
    ));
    request.rate_limit = f64::INFINITY;
    assert!(matches!(
        request.validate(),
        Err(RequestError::InvalidRateLimit(_))
    ));
}

#[test]
fn test_validate_max_urls() {
    let mut request = AuditRequest::new(vec!["https://a.test/".to_string()]);
    request.max_urls = 0;
    assert_eq!(request.validate().unwrap_err(), RequestError::InvalidMaxUrls);
}

#[test]
fn test_apply_to_overrides_request_fields_only() {
    let mut request = AuditRequest::new(vec!["https://a.test/".to_string()]);
    request.recursive = true;
    request.max_urls = 7;
    let base = CrawlConfig::default().with_max_redirects(3);
    let config = request.apply_to(base);

    assert!(config.recursive);
    assert_eq!(config.max_urls, 7);
    assert_eq!(config.max_redirects, 3);
}

// ============================================================================
// URL Path Extraction Tests
// ============================================================================

#[test]
fn test_extract_url_path() {
    assert_eq!(extract_url_path("http://example.com/"), "/");
    assert_eq!(extract_url_path("http://example.com"), "/");
    assert_eq!(extract_url_path("http://example.com/api/v1?x=1#y"), "/api/v1");
    assert_eq!(extract_url_path("not a valid url"), "not a valid url");
}

// ============================================================================
// End-to-end Tests
// ============================================================================

async fn site() -> MockServer {
    let server = MockServer::start().await;
    let root = r#"<html><body>
        <a href="/ok">OK</a>
        <a href="/old">Old</a>
        <a href="/missing">Missing</a>
    </body></html>"#;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(root, "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>ok</p>", "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(308).insert_header("location", "/ok"))
        .mount(&server)
        .await;
    server
}

fn fast_options(request: AuditRequest) -> AuditOptions {
    let mut options = AuditOptions::new(request);
    options.request_timeout = Duration::from_secs(2);
    options
}

#[tokio::test]
async fn test_execute_audit() {
    let server = site().await;
    let mut request = AuditRequest::new(vec![format!("{}/", server.uri())]);
    request.rate_limit = 500.0;

    let response = execute_audit(fast_options(request), None, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.results.len(), 3);
    assert_eq!(response.stats.total_links, 3);
    assert_eq!(response.stats.visited, 1);

    let statuses: Vec<u16> = response.results.iter().map(|r| r.status).collect();
    assert_eq!(statuses, vec![200, 200, 404]);
    assert_eq!(
        response.results[1].redirect_chain,
        format!("{0}/old (308) -> {0}/ok (200)", server.uri())
    );
    assert!(
        response
            .results
            .iter()
            .all(|r| r.link_type == LinkType::Internal)
    );
}

#[tokio::test]
async fn test_execute_audit_rejects_before_crawling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut request = AuditRequest::new(vec![format!("{}/", server.uri())]);
    request.rate_limit = -1.0;
    let result = execute_audit(fast_options(request), None, CancellationToken::new()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_handle_request_ok() {
    let server = site().await;
    let body = format!(r#"{{"urls": ["{}/"], "rateLimit": 500}}"#, server.uri());

    let outcome = handle_request(&body, None, CancellationToken::new()).await;
    let AuditOutcome::Ok(response) = outcome else {
        panic!("expected ok outcome");
    };
    assert_eq!(response.results.len(), 3);
}

#[tokio::test]
async fn test_handle_request_client_error_is_tagged() {
    let outcome = handle_request(r#"{"urls": []}"#, None, CancellationToken::new()).await;
    assert!(matches!(outcome, AuditOutcome::ClientError { .. }));

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["status"], "client_error");
    assert!(json["error"].as_str().unwrap().contains("urls"));
}

#[tokio::test]
async fn test_ok_outcome_serializes_response_shape() {
    let server = site().await;
    let body = format!(r#"{{"urls": ["{}/"], "rateLimit": 500}}"#, server.uri());

    let outcome = handle_request(&body, None, CancellationToken::new()).await;
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["stats"]["totalLinks"], 3);
    assert_eq!(json["stats"]["visited"], 1);
    assert_eq!(json["stats"]["remaining"], 0);
    assert_eq!(json["results"][2]["status"], 404);
    assert_eq!(json["results"][0]["type"], "internal");
}
