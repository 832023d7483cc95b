//! Tests for the REST client against a mocked Unity Catalog server.

use std::{collections::HashMap, time::Duration};

use uchelper_models::{Catalog, Column, DataType, FileType, FullName, Schema, SchemaName, Table, TableType};
use uchelper_rest::{RestError, TableUpdate, UnityCatalogApi};
use wiremock::matchers::{body_partial_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API: &str = "/api/2.1/unity-catalog";

fn api(server: &MockServer) -> UnityCatalogApi {
    UnityCatalogApi::with_timeout(&server.uri(), Duration::from_secs(5)).unwrap()
}

fn table_json(comment: &str, properties: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "name": "numbers",
        "catalog_name": "unity",
        "schema_name": "default",
        "table_type": "EXTERNAL",
        "data_source_format": "DELTA",
        "columns": [
            {"name": "as_int", "type_name": "INT", "position": 0, "nullable": false},
            {"name": "as_double", "type_name": "DOUBLE", "position": 1, "nullable": false}
        ],
        "storage_location": "file:///tmp/numbers",
        "comment": comment,
        "properties": properties,
        "created_at": 1721234405571_i64,
        "table_id": "32025924-be53-4d67-ac39-501a86046c01"
    })
}

fn numbers() -> FullName {
    FullName::new("unity", "default", "numbers").unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Hello, Unity Catalog!"))
        .mount(&server)
        .await;

    assert!(api(&server).health_check().await.unwrap());
}

#[tokio::test]
async fn test_health_check_wrong_greeting() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("nginx"))
        .mount(&server)
        .await;

    assert!(!api(&server).health_check().await.unwrap());
}

#[tokio::test]
async fn test_health_check_unreachable() {
    let api = UnityCatalogApi::with_timeout("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
    assert!(!api.health_check().await.unwrap());
}

#[tokio::test]
async fn test_create_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{API}/catalogs")))
        .and(body_partial_json(serde_json::json!({
            "name": "test_cat",
            "comment": "testing",
            "properties": {"a": "b"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "test_cat",
            "comment": "testing",
            "properties": {"a": "b"},
            "created_at": 1721234405334_i64,
            "id": "f029b870-9468-4f10-badc-630b41e5690d"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let properties = HashMap::from([("a".to_string(), "b".to_string())]);
    let created = api(&server)
        .create_catalog(
            &Catalog::new("test_cat")
                .with_comment("testing")
                .with_properties(properties),
        )
        .await
        .unwrap();

    assert_eq!(created.name, "test_cat");
    assert!(created.created_at.is_some());
    assert!(created.id.is_some());
}

#[tokio::test]
async fn test_create_catalog_already_exists() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{API}/catalogs")))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "error_code": "ALREADY_EXISTS",
            "message": "Catalog already exists: unity"
        })))
        .mount(&server)
        .await;

    let err = api(&server)
        .create_catalog(&Catalog::new("unity"))
        .await
        .unwrap_err();
    assert!(err.is_already_exists());
    assert!(err.to_string().contains("Catalog already exists: unity"));
}

#[tokio::test]
async fn test_rejects_invalid_name_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = api(&server).get_catalog("a.b").await.unwrap_err();
    assert!(matches!(err, RestError::Model(_)));
}

#[tokio::test]
async fn test_delete_catalog_force_flag() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("{API}/catalogs/unity")))
        .and(query_param("force", "false"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error_code": "FAILED_PRECONDITION",
            "message": "Cannot delete catalog with schemas: unity"
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{API}/catalogs/unity")))
        .and(query_param("force", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let api = api(&server);
    assert!(!api.delete_catalog("unity", false).await.unwrap());
    assert!(api.delete_catalog("unity", true).await.unwrap());
}

#[tokio::test]
async fn test_delete_catalog_escapes_name() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("{API}/catalogs/prod")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{API}/catalogs/prod%23staging")))
        .and(query_param("force", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    assert!(api(&server).delete_catalog("prod#staging", true).await.unwrap());
}

#[tokio::test]
async fn test_get_table_escapes_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/tables/unity.default.a%3Fb")))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error_code": "NOT_FOUND",
            "message": "Table not found: unity.default.a?b"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let name = FullName::new("unity", "default", "a?b").unwrap();
    let err = api(&server).get_table(&name).await.unwrap_err();
    assert!(err.is_does_not_exist());
}

#[tokio::test]
async fn test_delete_catalog_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("{API}/catalogs/nope")))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error_code": "NOT_FOUND",
            "message": "Catalog not found: nope"
        })))
        .mount(&server)
        .await;

    let err = api(&server).delete_catalog("nope", false).await.unwrap_err();
    assert!(err.is_does_not_exist());
}

#[tokio::test]
async fn test_list_catalogs_follows_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/catalogs")))
        .and(query_param_is_missing("page_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "catalogs": [{"name": "unity"}],
            "next_page_token": "page-2"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/catalogs")))
        .and(query_param("page_token", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "catalogs": [{"name": "staging"}],
            "next_page_token": ""
        })))
        .mount(&server)
        .await;

    let catalogs = api(&server).list_catalogs().await.unwrap();
    let names: Vec<&str> = catalogs.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["unity", "staging"]);
}

#[tokio::test]
async fn test_list_schemas_null_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/schemas")))
        .and(query_param("catalog_name", "unity"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "schemas": null,
            "next_page_token": null
        })))
        .mount(&server)
        .await;

    assert!(api(&server).list_schemas("unity").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_schema_sends_new_name_only_when_renamed() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("{API}/schemas/unity.default")))
        .and(body_partial_json(serde_json::json!({"new_name": null, "comment": "c"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "default",
            "catalog_name": "unity",
            "comment": "c"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let updated = api(&server)
        .update_schema("unity", "default", &Schema::new("unity", "default").with_comment("c"))
        .await
        .unwrap();
    assert_eq!(updated.comment.as_deref(), Some("c"));
}

#[tokio::test]
async fn test_create_table_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{API}/tables")))
        .and(body_partial_json(serde_json::json!({
            "name": "numbers",
            "table_type": "EXTERNAL",
            "data_source_format": "DELTA",
            "storage_location": "file:///tmp/numbers",
            "columns": [
                {"name": "as_int", "type_name": "INT", "type_text": "int", "position": 0},
                {"name": "as_double", "type_name": "DOUBLE", "type_text": "double", "position": 1}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(table_json("", serde_json::json!({}))))
        .expect(1)
        .mount(&server)
        .await;

    let table = Table::new(
        &numbers(),
        TableType::External,
        FileType::Delta,
        vec![
            Column::new("as_int", DataType::Int, 0, false),
            Column::new("as_double", DataType::Double, 1, false),
        ],
    )
    .with_storage_location("file:///tmp/numbers");

    let created = api(&server).create_table(&table).await.unwrap();
    assert!(created.table_id.is_some());
    assert_eq!(created.columns.len(), 2);
}

#[tokio::test]
async fn test_get_table_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/tables/unity.default.missing")))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error_code": "NOT_FOUND",
            "message": "Table not found: unity.default.missing"
        })))
        .mount(&server)
        .await;

    let name = FullName::new("unity", "default", "missing").unwrap();
    assert!(api(&server).get_table(&name).await.unwrap_err().is_does_not_exist());
}

#[tokio::test]
async fn test_list_tables() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/tables")))
        .and(query_param("catalog_name", "unity"))
        .and(query_param("schema_name", "default"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "tables": [table_json("", serde_json::json!({}))],
            "next_page_token": null
        })))
        .mount(&server)
        .await;

    let tables = api(&server)
        .list_tables(&SchemaName::new("unity", "default").unwrap())
        .await
        .unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].file_type, FileType::Delta);
}

#[tokio::test]
async fn test_update_table_keeps_unset_fields() {
    let server = MockServer::start().await;
    let table_path = format!("{API}/tables/unity.default.numbers");
    Mock::given(method("GET"))
        .and(path(table_path.clone()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(table_json("old", serde_json::json!({"k": "v"}))),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(table_path))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{API}/tables")))
        .and(body_partial_json(serde_json::json!({
            "comment": "new",
            "properties": {"k": "v"}
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(table_json("new", serde_json::json!({"k": "v"}))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let updated = api(&server)
        .update_table(&numbers(), &TableUpdate::default().comment("new"))
        .await
        .unwrap();
    assert_eq!(updated.comment.as_deref(), Some("new"));
}

#[tokio::test]
async fn test_overwrite_table_restores_on_failure() {
    let server = MockServer::start().await;
    let table_path = format!("{API}/tables/unity.default.numbers");
    Mock::given(method("GET"))
        .and(path(table_path.clone()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(table_json("old", serde_json::json!({}))),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(table_path))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{API}/tables")))
        .and(body_partial_json(serde_json::json!({"comment": "broken"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error_code": "INVALID_ARGUMENT",
            "message": "bad column"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{API}/tables")))
        .and(body_partial_json(serde_json::json!({"comment": "old"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(table_json("old", serde_json::json!({}))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = api(&server);
    let mut table = api.get_table(&numbers()).await.unwrap();
    table.comment = Some("broken".to_string());

    let err = api.overwrite_table(&table).await.unwrap_err();
    assert!(matches!(err, RestError::Server { status: 400, .. }));
}

#[tokio::test]
async fn test_overwrite_table_rejects_invalid_name() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut table = Table::new(&numbers(), TableType::External, FileType::Delta, vec![]);
    table.name = "this.name.will.fail".to_string();
    assert!(api(&server).overwrite_table(&table).await.is_err());
}

#[tokio::test]
async fn test_set_default_merge_columns_validates_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/tables/unity.default.numbers")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(table_json("", serde_json::json!({}))),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = api(&server)
        .set_table_default_merge_columns(&numbers(), &["as_int".to_string(), "column3".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, RestError::InvalidArgument(ref m) if m.contains("column3")));
}

#[tokio::test]
async fn test_set_default_merge_columns_stored_in_properties() {
    let server = MockServer::start().await;
    let table_path = format!("{API}/tables/unity.default.numbers");
    Mock::given(method("GET"))
        .and(path(table_path.clone()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(table_json("", serde_json::json!({}))),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(table_path))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{API}/tables")))
        .and(body_partial_json(serde_json::json!({
            "properties": {"uchelper.default_merge_columns": "[\"as_int\",\"as_double\"]"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(table_json(
            "",
            serde_json::json!({"uchelper.default_merge_columns": "[\"as_int\",\"as_double\"]"}),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let table = api(&server)
        .set_table_default_merge_columns(&numbers(), &["as_int".to_string(), "as_double".to_string()])
        .await
        .unwrap();
    assert_eq!(table.default_merge_columns, vec!["as_int", "as_double"]);
    assert!(table.properties.is_empty());
}
