//! SupabaseStore against a mock PostgREST endpoint.

use galeria_api::{ApplicationStore, StoreError, SupabaseStore};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_queries_table_newest_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/candidaturas"))
        .and(query_param("select", "*"))
        .and(query_param("order", "id.desc"))
        .and(header("apikey", "service-key"))
        .and(header("authorization", "Bearer service-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 3, "nome": "Ana", "idade": 30, "timestamp": "2024-05-01T12:30:00.000Z" },
            { "id": 1, "nome": "Bia", "idade": 22 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let store = SupabaseStore::new(server.uri(), "service-key");
    let records = store.list_newest_first().await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, 3);
    assert_eq!(records[0].timestamp(), Some("2024-05-01T12:30:00.000Z"));
    assert_eq!(records[1].fields.get("nome"), Some(&json!("Bia")));
}

#[tokio::test]
async fn test_postgrest_error_message_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Invalid API key",
            "hint": "Double check your Supabase `anon` or `service_role` API key."
        })))
        .mount(&server)
        .await;

    let err = SupabaseStore::new(server.uri(), "wrong")
        .list_newest_first()
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Rejected { status: 401, .. }));
    assert_eq!(err.to_string(), "Invalid API key");
}

#[tokio::test]
async fn test_non_json_error_body_passed_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = SupabaseStore::new(server.uri(), "key")
        .list_newest_first()
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "upstream unavailable");
}

#[tokio::test]
async fn test_unexpected_shape_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "rows": [] })))
        .mount(&server)
        .await;

    let err = SupabaseStore::new(server.uri(), "key")
        .list_newest_first()
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_store() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let err = SupabaseStore::new(format!("http://127.0.0.1:{port}"), "key")
        .list_newest_first()
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Unreachable(_)));
}
