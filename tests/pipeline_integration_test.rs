//! End-to-end tests of the acquisition stages against a mock inventory API

use fleetpull::adapters::http::ApiClient;
use fleetpull::adapters::inventory::{InventoryApi, RestInventoryApi};
use fleetpull::config::{
    secret_string, DetailConfig, DetailMethod, HttpConfig, ListingConfig, ListingMode,
    RetryConfig, TenantConfig,
};
use fleetpull::core::pipeline::AcquisitionPipeline;
use fleetpull::domain::{AuthError, EntityId, InventoryError, TenantKey, TransportError};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::sync::Arc;

const TOKEN_BODY: &str = r#"{"access_token":"tok-123","token_type":"bearer","expires_in":1799}"#;
const OFFSET_PATH: &str = "/devices/queries/devices/v1";
const SCROLL_PATH: &str = "/devices/queries/devices-scroll/v1";
const DETAILS_PATH: &str = "/devices/entities/devices/v2";

fn tenant(server: &ServerGuard) -> TenantConfig {
    TenantConfig {
        display_name: "ACME".to_string(),
        base_url: server.url(),
        client_id: "client-id".to_string(),
        client_secret: secret_string("client-secret".to_string()),
    }
}

fn http_config() -> HttpConfig {
    HttpConfig {
        auth_timeout_seconds: 5,
        request_timeout_seconds: 5,
        connect_timeout_seconds: 2,
        tls_verify: true,
        retry: RetryConfig {
            max_attempts: 3,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            backoff_multiplier: 2.0,
        },
    }
}

fn api(mode: ListingMode, method: DetailMethod, batch_size: usize) -> RestInventoryApi {
    let listing = ListingConfig {
        mode,
        path: None,
        limit: 2,
        max_pages: 100,
    };
    let details = DetailConfig {
        path: DETAILS_PATH.to_string(),
        method,
        batch_size,
    };
    RestInventoryApi::new(ApiClient::new(&http_config()).unwrap(), listing, details)
}

fn ids(raw: &[&str]) -> Vec<EntityId> {
    raw.iter().map(|id| EntityId::new(*id).unwrap()).collect()
}

fn host(id: &str) -> serde_json::Value {
    json!({
        "device_id": id,
        "hostname": format!("host-{id}"),
        "device_policies": {"prevention": {"applied": true}}
    })
}

async fn mock_token(server: &mut ServerGuard) -> mockito::Mock {
    server
        .mock("POST", "/oauth2/token")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("client_id".into(), "client-id".into()),
            Matcher::UrlEncoded("client_secret".into(), "client-secret".into()),
            Matcher::UrlEncoded("grant_type".into(), "client_credentials".into()),
        ]))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(TOKEN_BODY)
        .create_async()
        .await
}

async fn mock_offset_page(server: &mut ServerGuard, offset: &str, resources: &[&str]) -> mockito::Mock {
    server
        .mock("GET", OFFSET_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("offset".into(), offset.into()),
            Matcher::UrlEncoded("limit".into(), "2".into()),
        ]))
        .match_header("authorization", "Bearer tok-123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"meta": {"pagination": {"total": 3}}, "resources": resources}).to_string())
        .create_async()
        .await
}

async fn mock_detail_batch(server: &mut ServerGuard, batch: &[&str]) -> mockito::Mock {
    let resources: Vec<_> = batch.iter().map(|id| host(id)).collect();
    server
        .mock("POST", DETAILS_PATH)
        .match_body(Matcher::Json(json!({ "ids": batch })))
        .match_header("authorization", "Bearer tok-123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"resources": resources}).to_string())
        .create_async()
        .await
}

#[tokio::test]
async fn test_three_hosts_in_two_batches() {
    let mut server = Server::new_async().await;
    let token = mock_token(&mut server).await;
    let page_0 = mock_offset_page(&mut server, "0", &["a", "b"]).await;
    let page_2 = mock_offset_page(&mut server, "2", &["c"]).await;
    let page_3 = mock_offset_page(&mut server, "3", &[]).await;
    let batch_1 = mock_detail_batch(&mut server, &["a", "b"]).await;
    let batch_2 = mock_detail_batch(&mut server, &["c"]).await;

    let pipeline = AcquisitionPipeline::new(Arc::new(api(ListingMode::Offset, DetailMethod::Post, 2)));
    let acquisition = pipeline
        .run(&TenantKey::new("acme").unwrap(), &tenant(&server))
        .await
        .unwrap();

    assert_eq!(acquisition.ids_listed, 3);
    assert_eq!(acquisition.table.len(), 3);
    let order: Vec<_> = acquisition
        .table
        .column_values("device_id")
        .filter_map(|v| v.as_str())
        .collect();
    assert_eq!(order, ["a", "b", "c"]);
    assert_eq!(
        acquisition.table.cell(2, "device_policies.prevention.applied"),
        Some(&json!(true))
    );

    for mock in [token, page_0, page_2, page_3, batch_1, batch_2] {
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn test_second_batch_failure_keeps_first_batch_rows() {
    let mut server = Server::new_async().await;
    let batch_1 = mock_detail_batch(&mut server, &["a", "b"]).await;
    let batch_2 = server
        .mock("POST", DETAILS_PATH)
        .match_body(Matcher::Json(json!({"ids": ["c"]})))
        .with_status(500)
        .with_body("internal error")
        .expect(3)
        .create_async()
        .await;

    let api = api(ListingMode::Offset, DetailMethod::Post, 2);
    let token = fleetpull::domain::AccessToken::new(secret_string("tok-123".into()), "bearer", None);
    let err = api
        .fetch_details(&tenant(&server), &token, &ids(&["a", "b", "c"]))
        .await
        .unwrap_err();

    match &err {
        InventoryError::PartialBatchFailure(failure) => {
            assert_eq!(failure.batch_index, 2);
            assert_eq!(failure.total_batches, 2);
            assert_eq!(failure.rows_accumulated, 2);
            assert_eq!(failure.partial.len(), 2);
            assert!(matches!(
                *failure.cause,
                InventoryError::Api { status: 500, .. }
            ));
        }
        other => panic!("expected PartialBatchFailure, got {other:?}"),
    }
    assert_eq!(err.partial_table().map(|t| t.len()), Some(2));

    batch_1.assert_async().await;
    batch_2.assert_async().await;
}

#[tokio::test]
async fn test_auth_rejection_makes_no_listing_request() {
    let mut server = Server::new_async().await;
    let token = server
        .mock("POST", "/oauth2/token")
        .with_status(403)
        .with_body(r#"{"errors":[{"code":403,"message":"access denied"}]}"#)
        .expect(1)
        .create_async()
        .await;
    let listing = server
        .mock("GET", OFFSET_PATH)
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let pipeline = AcquisitionPipeline::new(Arc::new(api(ListingMode::Offset, DetailMethod::Post, 2)));
    let err = pipeline
        .run(&TenantKey::new("acme").unwrap(), &tenant(&server))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        InventoryError::Auth(AuthError::Rejected { status: 403, .. })
    ));
    token.assert_async().await;
    listing.assert_async().await;
}

#[tokio::test]
async fn test_token_status_200_is_accepted() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/oauth2/token")
        .with_status(200)
        .with_body(TOKEN_BODY)
        .create_async()
        .await;

    let token = api(ListingMode::Offset, DetailMethod::Post, 2)
        .acquire_token(&tenant(&server))
        .await
        .unwrap();

    assert_eq!(token.secret(), "tok-123");
    assert_eq!(token.expires_in, Some(1799));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_token_without_access_token_is_malformed() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/oauth2/token")
        .with_status(201)
        .with_body(r#"{"token_type":"bearer"}"#)
        .create_async()
        .await;

    let err = api(ListingMode::Offset, DetailMethod::Post, 2)
        .acquire_token(&tenant(&server))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        InventoryError::Auth(AuthError::MalformedTokenResponse(_))
    ));
}

#[tokio::test]
async fn test_token_rate_limit_is_retried_then_rejected() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/oauth2/token")
        .with_status(429)
        .expect(3)
        .create_async()
        .await;

    let err = api(ListingMode::Offset, DetailMethod::Post, 2)
        .acquire_token(&tenant(&server))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        InventoryError::Auth(AuthError::Rejected { status: 429, .. })
    ));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_scroll_listing_follows_token_until_absent() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("GET", SCROLL_PATH)
        .match_query(Matcher::Exact("limit=2".into()))
        .with_status(200)
        .with_body(
            json!({"meta": {"pagination": {"offset": "scroll-1"}}, "resources": ["a", "b"]})
                .to_string(),
        )
        .create_async()
        .await;
    let second = server
        .mock("GET", SCROLL_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("limit".into(), "2".into()),
            Matcher::UrlEncoded("offset".into(), "scroll-1".into()),
        ]))
        .with_status(200)
        .with_body(json!({"meta": {"pagination": {"offset": ""}}, "resources": ["c"]}).to_string())
        .create_async()
        .await;

    let token = fleetpull::domain::AccessToken::new(secret_string("tok-123".into()), "bearer", None);
    let listed = api(ListingMode::Scroll, DetailMethod::Post, 2)
        .list_all_ids(&tenant(&server), &token)
        .await
        .unwrap();

    assert_eq!(listed, ids(&["a", "b", "c"]));
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_listing_that_never_ends_hits_the_cap() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", OFFSET_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({"resources": ["x", "y"]}).to_string())
        .expect(4)
        .create_async()
        .await;

    let listing = ListingConfig {
        mode: ListingMode::Offset,
        path: None,
        limit: 2,
        max_pages: 4,
    };
    let api = RestInventoryApi::new(
        ApiClient::new(&http_config()).unwrap(),
        listing,
        DetailConfig::default(),
    );
    let token = fleetpull::domain::AccessToken::new(secret_string("tok-123".into()), "bearer", None);

    let err = api.list_all_ids(&tenant(&server), &token).await.unwrap_err();

    assert!(matches!(
        err,
        InventoryError::PaginationNonTermination { pages: 4, cap: 4 }
    ));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_repeating_scroll_token_hits_the_cap() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", SCROLL_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!({"meta": {"pagination": {"offset": "same"}}, "resources": ["x"]}).to_string(),
        )
        .expect(3)
        .create_async()
        .await;

    let listing = ListingConfig {
        mode: ListingMode::Scroll,
        path: None,
        limit: 2,
        max_pages: 3,
    };
    let api = RestInventoryApi::new(
        ApiClient::new(&http_config()).unwrap(),
        listing,
        DetailConfig::default(),
    );
    let token = fleetpull::domain::AccessToken::new(secret_string("tok-123".into()), "bearer", None);

    let err = api.list_all_ids(&tenant(&server), &token).await.unwrap_err();

    assert!(matches!(
        err,
        InventoryError::PaginationNonTermination { pages: 3, cap: 3 }
    ));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_listing_server_error_after_retries() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", OFFSET_PATH)
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("unavailable")
        .expect(3)
        .create_async()
        .await;

    let token = fleetpull::domain::AccessToken::new(secret_string("tok-123".into()), "bearer", None);
    let err = api(ListingMode::Offset, DetailMethod::Post, 2)
        .list_all_ids(&tenant(&server), &token)
        .await
        .unwrap_err();

    match err {
        InventoryError::Api { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "unavailable");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_details_sends_ids_as_repeated_query_params() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("GET", DETAILS_PATH)
        .match_query(Matcher::Exact("ids=a&ids=b".into()))
        .with_status(200)
        .with_body(json!({"resources": [host("a"), host("b")]}).to_string())
        .create_async()
        .await;
    let second = server
        .mock("GET", DETAILS_PATH)
        .match_query(Matcher::Exact("ids=c".into()))
        .with_status(200)
        .with_body(json!({"resources": [host("c")]}).to_string())
        .create_async()
        .await;

    let token = fleetpull::domain::AccessToken::new(secret_string("tok-123".into()), "bearer", None);
    let table = api(ListingMode::Offset, DetailMethod::Get, 2)
        .fetch_details(&tenant(&server), &token, &ids(&["a", "b", "c"]))
        .await
        .unwrap();

    assert_eq!(table.len(), 3);
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_batch_count_is_ceiling_of_ids_over_batch_size() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", DETAILS_PATH)
        .with_status(200)
        .with_body(r#"{"resources": []}"#)
        .expect(3)
        .create_async()
        .await;

    let token = fleetpull::domain::AccessToken::new(secret_string("tok-123".into()), "bearer", None);
    let table = api(ListingMode::Offset, DetailMethod::Post, 2)
        .fetch_details(&tenant(&server), &token, &ids(&["a", "b", "c", "d", "e"]))
        .await
        .unwrap();

    assert!(table.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_id_list_makes_no_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", DETAILS_PATH)
        .expect(0)
        .create_async()
        .await;

    let token = fleetpull::domain::AccessToken::new(secret_string("tok-123".into()), "bearer", None);
    let table = api(ListingMode::Offset, DetailMethod::Post, 2)
        .fetch_details(&tenant(&server), &token, &[])
        .await
        .unwrap();

    assert!(table.is_empty());
    assert!(table.columns().is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_object_resource_fails_the_batch() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", DETAILS_PATH)
        .with_status(200)
        .with_body(r#"{"resources": ["not-an-object"]}"#)
        .create_async()
        .await;

    let token = fleetpull::domain::AccessToken::new(secret_string("tok-123".into()), "bearer", None);
    let err = api(ListingMode::Offset, DetailMethod::Post, 2)
        .fetch_details(&tenant(&server), &token, &ids(&["a"]))
        .await
        .unwrap_err();

    match err {
        InventoryError::PartialBatchFailure(failure) => {
            assert_eq!(failure.batch_index, 1);
            assert_eq!(failure.rows_accumulated, 0);
            assert!(matches!(*failure.cause, InventoryError::InvalidResponse(_)));
        }
        other => panic!("expected PartialBatchFailure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_refused_is_a_transport_error() {
    let tenant = TenantConfig {
        display_name: "Offline".to_string(),
        base_url: "http://127.0.0.1:1".to_string(),
        client_id: "client-id".to_string(),
        client_secret: secret_string("client-secret".to_string()),
    };

    let err = api(ListingMode::Offset, DetailMethod::Post, 2)
        .acquire_token(&tenant)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        InventoryError::Transport(TransportError::ConnectionFailed(_))
    ));
    assert!(err.is_retryable());
}
