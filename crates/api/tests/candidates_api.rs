//! HTTP-level integration tests for the candidate record endpoints.

mod common;

use axum::http::StatusCode;
use common::{
    body_bytes, body_json, body_text, delete_auth, get_auth, post_auth, post_bytes_auth,
    post_csv_auth, post_json_auth, put_json_auth,
};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create(app: axum::Router, token: &str, body: Value) -> Value {
    let response = post_json_auth(app, "/api/v1/candidates", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

async fn list(app: axum::Router, token: &str, uri: &str) -> Vec<Value> {
    let response = get_auth(app, uri, token).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]
        .as_array()
        .expect("data array")
        .clone()
}

/// `order` must be the 1-based rank under descending total.
fn assert_ranked(records: &[Value]) {
    for (index, record) in records.iter().enumerate() {
        assert_eq!(record["order"], index + 1, "record {index} has wrong rank");
        if index > 0 {
            assert!(
                records[index - 1]["totalPayments"].as_f64() >= record["totalPayments"].as_f64()
            );
        }
    }
}

// ---------------------------------------------------------------------------
// CRUD and ranking
// ---------------------------------------------------------------------------

#[tokio::test]
async fn larger_total_ranks_first() {
    let app = common::build_test_app().await;
    let token = common::login(app.clone()).await;

    let big = create(
        app.clone(),
        &token,
        json!({ "name": "Big", "firstPayment": 100, "secondPayment": 50, "thirdPayment": 0 }),
    )
    .await;
    assert_eq!(big["totalPayments"], 150.0);
    assert_eq!(big["order"], 1);

    let small = create(
        app.clone(),
        &token,
        json!({ "name": "Small", "firstPayment": 10, "secondPayment": 0, "thirdPayment": 0 }),
    )
    .await;
    assert_eq!(small["order"], 2);

    let records = list(app, &token, "/api/v1/candidates").await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["id"], big["id"]);
    assert_eq!(records[1]["id"], small["id"]);
    assert_ranked(&records);
}

#[tokio::test]
async fn client_supplied_order_and_total_are_ignored() {
    let app = common::build_test_app().await;
    let token = common::login(app.clone()).await;

    let created = create(
        app,
        &token,
        json!({ "name": "Sara", "order": 99, "totalPayments": 1000, "firstPayment": "25" }),
    )
    .await;
    assert_eq!(created["order"], 1);
    assert_eq!(created["totalPayments"], 25.0);
    assert!(!created["id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn update_merges_fields_and_reranks() {
    let app = common::build_test_app().await;
    let token = common::login(app.clone()).await;

    let first = create(app.clone(), &token, json!({ "name": "A", "firstPayment": 50 })).await;
    let second = create(app.clone(), &token, json!({ "name": "B", "firstPayment": 10 })).await;
    assert_eq!(second["order"], 2);

    let uri = format!("/api/v1/candidates/{}", second["id"].as_str().unwrap());
    let response = put_json_auth(
        app.clone(),
        &uri,
        json!({ "thirdPayment": 100, "agent": "Rabat" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await["data"].clone();
    assert_eq!(updated["name"], "B");
    assert_eq!(updated["agent"], "Rabat");
    assert_eq!(updated["totalPayments"], 110.0);
    assert_eq!(updated["order"], 1);

    let uri = format!("/api/v1/candidates/{}", first["id"].as_str().unwrap());
    let fetched = body_json(get_auth(app, &uri, &token).await).await["data"].clone();
    assert_eq!(fetched["order"], 2);
}

#[tokio::test]
async fn missing_ids_return_404() {
    let app = common::build_test_app().await;
    let token = common::login(app.clone()).await;

    let response = get_auth(app.clone(), "/api/v1/candidates/nope", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");

    let response = put_json_auth(
        app.clone(),
        "/api/v1/candidates/nope",
        json!({ "name": "x" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(app, "/api/v1/candidates/nope", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_one_then_delete_all() {
    let app = common::build_test_app().await;
    let token = common::login(app.clone()).await;

    let a = create(app.clone(), &token, json!({ "name": "A", "firstPayment": 3 })).await;
    create(app.clone(), &token, json!({ "name": "B", "firstPayment": 2 })).await;
    create(app.clone(), &token, json!({ "name": "C", "firstPayment": 1 })).await;

    let uri = format!("/api/v1/candidates/{}", a["id"].as_str().unwrap());
    let response = delete_auth(app.clone(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let records = list(app.clone(), &token, "/api/v1/candidates").await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["name"], "B");
    assert_ranked(&records);

    let response = delete_auth(app.clone(), "/api/v1/candidates", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["count"], 2);

    assert!(list(app.clone(), &token, "/api/v1/candidates").await.is_empty());
    assert!(list(app, &token, "/api/v1/document").await.is_empty());
}

#[tokio::test]
async fn query_filters_over_any_field() {
    let app = common::build_test_app().await;
    let token = common::login(app.clone()).await;

    create(app.clone(), &token, json!({ "name": "Youssef", "agent": "Casablanca" })).await;
    create(app.clone(), &token, json!({ "name": "Meryem", "passportNumber": "AB1234" })).await;

    let records = list(app.clone(), &token, "/api/v1/candidates?q=casa").await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["name"], "Youssef");

    let records = list(app.clone(), &token, "/api/v1/candidates?q=ab12").await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["name"], "Meryem");

    assert_eq!(list(app, &token, "/api/v1/candidates?q=").await.len(), 2);
}

// ---------------------------------------------------------------------------
// Import / export
// ---------------------------------------------------------------------------

#[tokio::test]
async fn json_import_adds_rows_with_unique_ids() {
    let app = common::build_test_app().await;
    let token = common::login(app.clone()).await;
    create(app.clone(), &token, json!({ "name": "Existing", "firstPayment": 20 })).await;

    let rows = json!([
        { "name": "One", "firstPayment": 5 },
        { "name": "Two", "secondPayment": 40 },
        { "name": "Three" }
    ]);
    let response = post_json_auth(app.clone(), "/api/v1/candidates/import", rows, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["count"], 3);

    let records = list(app, &token, "/api/v1/candidates").await;
    assert_eq!(records.len(), 4);
    assert_eq!(records[0]["name"], "Two");
    assert_ranked(&records);

    let mut ids: Vec<_> = records.iter().map(|r| r["id"].as_str().unwrap()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 4);
}

#[tokio::test]
async fn csv_import_binds_columns_by_header() {
    let app = common::build_test_app().await;
    let token = common::login(app.clone()).await;

    let csv = "الاسم,firstPayment,Agent,unknown\r\nHamza,30,Tanger,x\r\n,,,\r\n\"Laila, B\",45,,\r\n";
    let response = post_csv_auth(app.clone(), "/api/v1/candidates/import/csv", csv, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["count"], 2);

    let records = list(app, &token, "/api/v1/candidates").await;
    assert_eq!(records[0]["name"], "Laila, B");
    assert_eq!(records[1]["name"], "Hamza");
    assert_eq!(records[1]["agent"], "Tanger");
    assert_ranked(&records);
}

#[tokio::test]
async fn malformed_csv_is_a_validation_error() {
    let app = common::build_test_app().await;
    let token = common::login(app.clone()).await;

    let response = post_csv_auth(app.clone(), "/api/v1/candidates/import/csv", "", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let csv = "name,firstPayment\nA,lots\n";
    let response = post_csv_auth(app.clone(), "/api/v1/candidates/import/csv", csv, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(list(app, &token, "/api/v1/candidates").await.is_empty());
}

#[tokio::test]
async fn export_downloads_filtered_csv() {
    let app = common::build_test_app().await;
    let token = common::login(app.clone()).await;

    create(app.clone(), &token, json!({ "name": "Omar", "notes": "=SUM(A1)", "firstPayment": 7 })).await;
    create(app.clone(), &token, json!({ "name": "Zineb" })).await;

    let response = get_auth(app, "/api/v1/candidates/export?q=omar", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"candidates.csv\""
    );

    let text = body_text(response).await;
    let text = text.strip_prefix('\u{feff}').expect("UTF-8 BOM");
    let lines: Vec<_> = text.split("\r\n").filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("id,order,name,"));
    assert!(lines[1].contains("Omar"));
    assert!(lines[1].contains("'=SUM(A1)"));
}

const XLSX_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[tokio::test]
async fn exported_workbook_imports_into_another_instance() {
    let app = common::build_test_app().await;
    let token = common::login(app.clone()).await;

    create(app.clone(), &token, json!({ "name": "Omar", "notes": "وثائق", "firstPayment": 7 })).await;
    create(app.clone(), &token, json!({ "name": "Zineb", "firstPayment": 3 })).await;

    let response = get_auth(app, "/api/v1/candidates/export/xlsx?q=omar", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], XLSX_TYPE);
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"candidates.xlsx\""
    );
    let workbook = body_bytes(response).await;

    let other = common::build_test_app().await;
    let other_token = common::login(other.clone()).await;
    let response = post_bytes_auth(
        other.clone(),
        "/api/v1/candidates/import/xlsx",
        XLSX_TYPE,
        workbook,
        &other_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["count"], 1);

    let records = list(other, &other_token, "/api/v1/candidates").await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["name"], "Omar");
    assert_eq!(records[0]["notes"], "وثائق");
    assert_eq!(records[0]["totalPayments"], 7.0);
}

#[tokio::test]
async fn unreadable_workbook_is_a_validation_error() {
    let app = common::build_test_app().await;
    let token = common::login(app.clone()).await;

    let response = post_bytes_auth(
        app.clone(),
        "/api/v1/candidates/import/xlsx",
        XLSX_TYPE,
        b"name,firstPayment\nA,1\n".to_vec(),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    assert!(list(app, &token, "/api/v1/candidates").await.is_empty());
}

#[tokio::test]
async fn out_of_range_payment_is_rejected() {
    let app = common::build_test_app().await;
    let token = common::login(app.clone()).await;

    let body = json!({ "name": "Big", "firstPayment": 1e308, "secondPayment": 1e308 });
    let response = post_json_auth(app.clone(), "/api/v1/candidates", body, &token).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(list(app, &token, "/api/v1/candidates").await.is_empty());
}

// ---------------------------------------------------------------------------
// Document, reload, sheet
// ---------------------------------------------------------------------------

#[tokio::test]
async fn document_replace_rederives_ranks() {
    let app = common::build_test_app().await;
    let token = common::login(app.clone()).await;
    create(app.clone(), &token, json!({ "name": "Old" })).await;

    let document = json!([
        { "id": "a", "order": 1, "name": "Low", "firstPayment": 1, "totalPayments": 999 },
        { "id": "b", "order": 2, "name": "High", "firstPayment": "80", "secondPayment": 20 },
        { "id": "b", "name": "Duplicate id" }
    ]);
    let response = post_json_auth(app.clone(), "/api/v1/document", document, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["count"], 3);

    let records = list(app, &token, "/api/v1/document").await;
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["id"], "b");
    assert_eq!(records[0]["totalPayments"], 100.0);
    assert_eq!(records[1]["id"], "a");
    assert_eq!(records[1]["totalPayments"], 1.0);
    assert_ne!(records[2]["id"], "b");
    assert_ranked(&records);
}

#[tokio::test]
async fn reload_rereads_backend() {
    let app = common::build_test_app().await;
    let token = common::login(app.clone()).await;
    create(app.clone(), &token, json!({ "name": "Kept" })).await;

    let response = post_auth(app, "/api/v1/candidates/reload", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["count"], 1);
}

#[tokio::test]
async fn sheet_append_without_service_account_is_rejected() {
    let app = common::build_test_app().await;
    let token = common::login(app.clone()).await;

    let response = post_json_auth(
        app,
        "/api/v1/sheet/append",
        json!({ "name": "Nour", "firstPayment": 10 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}
