use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

use configs::AppConfig;
use models::{id::new_id, Fields};
use server::{build_router, ServerState};

fn app_with(popular: Vec<Fields>) -> Router {
    let mut cfg = AppConfig::default();
    cfg.normalize_and_validate().unwrap();
    let state = ServerState::in_memory(&cfg, popular);
    build_router(state, CorsLayer::very_permissive())
}

fn app() -> Router {
    app_with(Vec::new())
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, headers, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_as(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder().uri(uri).header(header::COOKIE, cookie).body(Body::empty()).unwrap()
}

fn with_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

/// `token=...` pair from a login response, ready for a Cookie header.
async fn login(app: &Router, email: &str) -> String {
    let (status, headers, body) = send(app, with_json("POST", "/jwt", json!({ "email": email }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));
    let set_cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Path=/"));
    set_cookie.split(';').next().unwrap().to_string()
}

async fn create_service(app: &Router, body: Value) -> String {
    let (status, _, ack) = send(app, with_json("POST", "/services", body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["acknowledged"], true);
    ack["insertedId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn liveness_routes() {
    let app = app();
    let (status, _, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("Server is Running!".into()));

    let (status, _, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));

    let (status, _, body) = send(&app, get("/api-docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/services"].is_object());
}

#[tokio::test]
async fn dental_checkup_is_found_and_counted() {
    let app = app();
    create_service(&app, json!({ "serviceName": "Dental Checkup", "price": 50 })).await;
    create_service(&app, json!({ "serviceName": "Eye Exam", "price": 30 })).await;

    let (status, _, list) = send(&app, get("/services?search=dental")).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["serviceName"], "Dental Checkup");
    assert_eq!(list[0]["price"], json!(50));

    let (status, _, count) = send(&app, get("/services/count?search=dental")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count, json!({ "count": 1 }));
}

#[tokio::test]
async fn free_form_fields_round_trip() {
    let app = app();
    let id = create_service(&app, json!({ "serviceName": "Therapy", "price": 40, "area": "Dhaka", "tags": ["a", "b"] })).await;
    let (_, _, doc) = send(&app, get(&format!("/servicesDetails/{id}"))).await;
    assert_eq!(doc["_id"], id.as_str());
    assert_eq!(doc["area"], "Dhaka");
    assert_eq!(doc["tags"], json!(["a", "b"]));
}

#[tokio::test]
async fn pages_reassemble_the_sorted_listing() {
    let app = app();
    for (name, price) in [("A", 30), ("B", 10), ("C", 50), ("D", 20), ("E", 40)] {
        create_service(&app, json!({ "serviceName": name, "price": price })).await;
    }
    let (_, _, full) = send(&app, get("/services?sort=desc")).await;
    let (_, _, count) = send(&app, get("/services/count?sort=desc&page=2&size=2")).await;
    let n = count["count"].as_u64().unwrap();
    assert_eq!(n, 5);

    let mut pages = Vec::new();
    for page in 1..=n.div_ceil(2) {
        let (status, _, body) = send(&app, get(&format!("/services?sort=desc&size=2&page={page}"))).await;
        assert_eq!(status, StatusCode::OK);
        pages.extend(body.as_array().unwrap().iter().cloned());
    }
    assert_eq!(Value::Array(pages), full);
    let names: Vec<_> = full.as_array().unwrap().iter().map(|s| s["serviceName"].as_str().unwrap()).collect();
    assert_eq!(names, ["C", "E", "A", "D", "B"]);
}

#[tokio::test]
async fn documents_of_any_shape_are_accepted_and_listed() {
    let app = app();
    create_service(&app, json!({ "serviceName": 123 })).await;
    create_service(&app, json!({ "serviceName": "Eye Exam", "price": { "usd": 5 } })).await;
    let id = new_id();
    let (status, _, ack) = send(&app, with_json("PUT", &format!("/updateService/{id}"), json!({ "price": { "usd": 5 } }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["upsertedId"], id.as_str());

    let (status, _, list) = send(&app, get("/services?sort=asc")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 3);
    assert!(list.as_array().unwrap().iter().any(|d| d["serviceName"] == json!(123)));

    let (status, _, count) = send(&app, get("/services/count")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count, json!({ "count": 3 }));

    let (status, _, doc) = send(&app, get(&format!("/servicesDetails/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["price"], json!({ "usd": 5 }));
}

#[tokio::test]
async fn page_size_above_the_cap_is_rejected_not_truncated() {
    let app = app();
    for i in 0..150 {
        create_service(&app, json!({ "serviceName": format!("S{i}"), "price": i })).await;
    }
    let (_, _, count) = send(&app, get("/services/count")).await;
    assert_eq!(count["count"], 150);

    let (status, _, body) = send(&app, get("/services?size=200")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");

    let mut seen = 0;
    for page in 1..=150u64.div_ceil(100) {
        let (status, _, body) = send(&app, get(&format!("/services?size=100&page={page}"))).await;
        assert_eq!(status, StatusCode::OK);
        seen += body.as_array().unwrap().len();
    }
    assert_eq!(seen, 150);
}

#[tokio::test]
async fn malformed_json_bodies_get_a_json_error() {
    let app = app();
    let req = Request::builder()
        .method("POST")
        .uri("/booking")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"userEmail\": "))
        .unwrap();
    let (status, _, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");
    assert!(body["detail"].is_string());

    let req = Request::builder().method("POST").uri("/booking").body(Body::from("userEmail=a@x.com")).unwrap();
    let (status, _, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");

    let (status, _, body) = send(&app, with_json("POST", "/services", json!(["not", "an", "object"]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");

    let (status, _, body) = send(&app, with_json("POST", "/jwt", json!({ "email": 42 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");
}

#[tokio::test]
async fn malformed_listing_parameters_are_rejected() {
    let app = app();
    for uri in ["/services?size=abc", "/services?size=0", "/services?size=2&page=-1", "/services?sort=sideways"] {
        let (status, _, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "Validation Error");
    }
}

#[tokio::test]
async fn read_by_id_handles_missing_and_malformed() {
    let app = app();
    let (status, _, body) = send(&app, get(&format!("/servicesDetails/{}", new_id()))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    let (status, _, _) = send(&app, get("/servicesDetails/not-an-id")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_upserts_and_repeats_idempotently() {
    let app = app();
    let id = new_id();
    let uri = format!("/updateService/{id}");
    let patch = json!({ "serviceName": "Physio", "price": 70, "_id": "ignored" });

    let (status, _, first) = send(&app, with_json("PUT", &uri, patch.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["upsertedId"], id.as_str());
    let (_, _, before) = send(&app, get("/services")).await;

    let (_, _, second) = send(&app, with_json("PUT", &uri, patch)).await;
    assert_eq!(second["matchedCount"], 1);
    assert_eq!(second["modifiedCount"], 0);
    assert_eq!(second["upsertedId"], Value::Null);
    let (_, _, after) = send(&app, get("/services")).await;
    assert_eq!(before, after);

    let (_, _, third) = send(&app, with_json("PUT", &uri, json!({ "price": 75 }))).await;
    assert_eq!(third["modifiedCount"], 1);
    let (_, _, doc) = send(&app, get(&format!("/servicesDetails/{id}"))).await;
    assert_eq!(doc["serviceName"], "Physio");
    assert_eq!(doc["price"], json!(75));
}

#[tokio::test]
async fn delete_removes_once() {
    let app = app();
    let id = create_service(&app, json!({ "serviceName": "X-ray", "price": 90 })).await;
    let req = Request::builder().method("DELETE").uri(format!("/deleteService/{id}")).body(Body::empty()).unwrap();
    let (_, _, ack) = send(&app, req).await;
    assert_eq!(ack, json!({ "acknowledged": true, "deletedCount": 1 }));
    let req = Request::builder().method("DELETE").uri(format!("/deleteService/{id}")).body(Body::empty()).unwrap();
    let (_, _, ack) = send(&app, req).await;
    assert_eq!(ack["deletedCount"], 0);
}

#[tokio::test]
async fn popular_list_is_capped() {
    let popular = (1..=8)
        .map(|i| match json!({ "serviceName": format!("Popular {i}"), "price": i }) {
            Value::Object(m) => m,
            _ => unreachable!(),
        })
        .collect();
    let app = app_with(popular);
    let (status, _, body) = send(&app, get("/popularServices")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn duplicate_booking_is_a_conflict() {
    let app = app();
    let booking = json!({ "userEmail": "a@x.com", "serviceId": "S1", "providerEmail": "dr@x.com", "servicesStatus": "pending" });

    let (status, _, ack) = send(&app, with_json("POST", "/booking", booking.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(ack["insertedId"].is_string());

    let (status, _, body) = send(&app, with_json("POST", "/booking", booking)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "already booked");

    let cookie = login(&app, "a@x.com").await;
    let (_, _, mine) = send(&app, get_as("/booking/a@x.com", &cookie)).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn booking_without_key_fields_is_rejected() {
    let app = app();
    let (status, _, _) = send(&app, with_json("POST", "/booking", json!({ "userEmail": "a@x.com" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn owner_scoped_routes_check_the_session() {
    let app = app();
    send(&app, with_json("POST", "/booking", json!({ "userEmail": "a@x.com", "serviceId": "S1", "providerEmail": "dr@x.com" }))).await;

    for uri in ["/booking/a@x.com", "/servicesToDo/dr@x.com", "/manageService/dr@x.com"] {
        let (status, _, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["message"], "unauthorized access");
    }

    let (status, _, _) = send(&app, get_as("/booking/a@x.com", "token=garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let other = login(&app, "b@x.com").await;
    let (status, _, body) = send(&app, get_as("/booking/a@x.com", &other)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "forbidden access");

    let mine = login(&app, "a@x.com").await;
    let (status, _, body) = send(&app, get_as("/booking/a@x.com", &mine)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["serviceId"], "S1");

    let provider = login(&app, "dr@x.com").await;
    let (status, _, body) = send(&app, get_as("/servicesToDo/dr@x.com", &provider)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn bearer_header_is_accepted() {
    let app = app();
    let cookie = login(&app, "a@x.com").await;
    let token = cookie.trim_start_matches("token=");
    let req = Request::builder()
        .uri("/booking/a@x.com")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn manage_service_lists_and_counts_provider_entries() {
    let app = app();
    for (name, provider) in [("Dental Checkup", "dr@x.com"), ("Dental Cleaning", "dr@x.com"), ("Eye Exam", "eye@x.com")] {
        create_service(&app, json!({ "serviceName": name, "price": 10, "providerEmail": provider })).await;
    }
    let cookie = login(&app, "dr@x.com").await;
    let (status, _, page) = send(&app, get_as("/manageService/dr@x.com?size=1&page=2", &cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page.as_array().unwrap().len(), 1);

    let (status, _, count) = send(&app, get("/manageService/dr@x.com/count?search=clean")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count, json!({ "count": 1 }));
}

#[tokio::test]
async fn status_update_sets_field_without_upsert() {
    let app = app();
    let (_, _, ack) = send(&app, with_json("POST", "/booking", json!({ "userEmail": "a@x.com", "serviceId": "S1" }))).await;
    let id = ack["insertedId"].as_str().unwrap().to_string();

    let (status, _, upd) = send(&app, with_json("PATCH", &format!("/statusUpdate/{id}"), json!({ "servicesStatus": "completed" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(upd["matchedCount"], 1);
    assert_eq!(upd["modifiedCount"], 1);

    let (status, _, upd) = send(&app, with_json("PATCH", &format!("/statusUpdate/{}", new_id()), json!({ "status": "pending" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(upd["matchedCount"], 0);
    assert_eq!(upd["upsertedId"], Value::Null);

    let (status, _, _) = send(&app, with_json("PATCH", &format!("/statusUpdate/{id}"), json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let cookie = login(&app, "a@x.com").await;
    let (_, _, mine) = send(&app, get_as("/booking/a@x.com", &cookie)).await;
    assert_eq!(mine[0]["servicesStatus"], "completed");
}

#[tokio::test]
async fn jwt_requires_email_and_logout_expires_cookie() {
    let app = app();
    let (status, _, _) = send(&app, with_json("POST", "/jwt", json!({ "name": "nobody" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = Request::builder().method("POST").uri("/logout").body(Body::empty()).unwrap();
    let (status, headers, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));
    let set_cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.starts_with("token=;"));
    assert!(set_cookie.contains("Max-Age=0"));
}
