//! End-to-end tests against a live users API server.

use std::collections::HashSet;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

mod common;

use common::{client, spawn_server, test_config};

#[tokio::test]
async fn test_content_types_and_cors() {
    let server = spawn_server(test_config()).await;
    let client = client();

    let cases = [
        ("/", "text/html"),
        ("/about", "text/plain"),
        ("/contacts", "application/json"),
        ("/api/users", "application/json"),
        ("/api/health", "application/json"),
    ];

    for (path, content_type) in cases {
        let res = client.get(server.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{}", path);
        let headers = res.headers();
        assert_eq!(headers["content-type"], content_type, "{}", path);
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(
            headers["access-control-allow-methods"],
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        assert_eq!(
            headers["access-control-allow-headers"],
            "Content-Type, Authorization"
        );
        assert!(headers.contains_key("x-request-id"));
    }

    let about = client.get(server.url("/about")).send().await.unwrap();
    assert_eq!(
        about.text().await.unwrap(),
        "This is an HTTP server built without a web framework."
    );
}

#[tokio::test]
async fn test_preflight_on_any_path() {
    let server = spawn_server(test_config()).await;
    let client = client();

    for path in ["/api/users", "/anything/at/all"] {
        let res = client
            .request(reqwest::Method::OPTIONS, server.url(path))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()["access-control-allow-origin"], "*");
        assert!(res.bytes().await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_not_found_and_method_not_allowed() {
    let server = spawn_server(test_config()).await;
    let client = client();

    let res = client.get(server.url("/missing")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    assert_eq!(res.json::<Value>().await.unwrap(), json!({ "error": "Route not found" }));

    let res = client.patch(server.url("/api/users/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({ "error": "Method not allowed" }));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = spawn_server(test_config()).await;

    let res = client()
        .get(server.url("/api/health"))
        .header("x-request-id", "trace-me-123")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "trace-me-123");
}

#[tokio::test]
async fn test_user_lifecycle() {
    let server = spawn_server(test_config()).await;
    let client = client();

    let listed: Value = client
        .get(server.url("/api/users?page=2&sort=name"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed["users"].as_array().unwrap().len(), 3);
    assert_eq!(listed["query"], json!({ "page": "2", "sort": "name" }));

    let res = client
        .post(server.url("/api/users"))
        .json(&json!({ "name": "Ada", "email": "ada@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["message"], "User created");
    let id = created["user"]["id"].as_u64().unwrap();
    assert!(id > 3);

    let res = client
        .put(server.url(&format!("/api/users/{}", id)))
        .json(&json!({ "name": "Ada L.", "email": "ada@example.org" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["message"], "User updated");
    assert_eq!(updated["user"]["id"], id);
    assert_eq!(updated["user"]["name"], "Ada L.");

    let res = client
        .delete(server.url(&format!("/api/users/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let deleted: Value = res.json().await.unwrap();
    assert_eq!(
        deleted["message"],
        format!("User {} deleted successfully", id)
    );

    let listed: Value = client
        .get(server.url("/api/users"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed["users"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_update_and_delete_unknown_ids() {
    let server = spawn_server(test_config()).await;
    let client = client();

    let res = client
        .put(server.url("/api/users/42"))
        .json(&json!({ "name": "Z", "email": "z@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["user"]["id"], 42);

    let res = client
        .put(server.url("/api/users/43"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["user"]["id"], 43);
    assert!(body["user"].get("name").is_none());

    let res = client.delete(server.url("/api/users/7")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "User 7 deleted successfully");
}

#[tokio::test]
async fn test_invalid_bodies() {
    let server = spawn_server(test_config()).await;
    let client = client();

    let res = client
        .post(server.url("/api/users"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({ "error": "Invalid JSON" }));

    let res = client
        .post(server.url("/api/users"))
        .json(&json!({ "name": "No Email" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({ "error": "Name and email are required" })
    );
}

#[tokio::test]
async fn test_concurrent_creates_get_unique_ids() {
    let server = spawn_server(test_config()).await;
    let client = client();

    let mut tasks = Vec::new();
    for i in 0..20 {
        let client = client.clone();
        let url = server.url("/api/users");
        tasks.push(tokio::spawn(async move {
            let res = client
                .post(url)
                .json(&json!({ "name": format!("User {}", i), "email": format!("u{}@example.com", i) }))
                .send()
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::CREATED);
            let body: Value = res.json().await.unwrap();
            body["user"]["id"].as_u64().unwrap()
        }));
    }

    let mut ids = HashSet::new();
    for task in tasks {
        assert!(ids.insert(task.await.unwrap()));
    }
    assert_eq!(ids.len(), 20);
}

#[tokio::test]
async fn test_body_over_limit_rejected() {
    let mut config = test_config();
    config.security.max_body_size = 64;
    let server = spawn_server(config).await;

    let big = format!(r#"{{"name":"{}","email":"a@example.com"}}"#, "x".repeat(200));
    let res = client()
        .post(server.url("/api/users"))
        .header("content-type", "application/json")
        .body(big)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({ "error": "Payload too large" }));
}

#[tokio::test]
async fn test_stalled_body_times_out() {
    let mut config = test_config();
    config.timeouts.request_secs = 1;
    let server = spawn_server(config).await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream
        .write_all(b"POST /api/users HTTP/1.1\r\nHost: test\r\nContent-Length: 50\r\n\r\n{\"na")
        .await
        .unwrap();

    let mut buf = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut buf))
        .await
        .expect("server never answered")
        .unwrap();
    let text = String::from_utf8_lossy(&buf);
    assert!(text.starts_with("HTTP/1.1 408"), "got: {}", text);
}

#[tokio::test]
async fn test_client_abort_mid_body_leaves_store_untouched() {
    let server = spawn_server(test_config()).await;

    {
        let mut stream = TcpStream::connect(server.addr).await.unwrap();
        stream
            .write_all(b"POST /api/users HTTP/1.1\r\nHost: test\r\nContent-Length: 100\r\n\r\n{\"name\":\"Half")
            .await
            .unwrap();
        stream.shutdown().await.unwrap();
    }
    tokio::time::sleep(Duration::from_millis(100)).await;

    let listed: Value = client()
        .get(server.url("/api/users"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed["users"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_graceful_shutdown() {
    let server = spawn_server(test_config()).await;

    let res = client().get(server.url("/api/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    server.shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server did not stop in time")
        .unwrap();
    assert!(result.is_ok());

    assert!(TcpStream::connect(server.addr).await.is_err());
}

#[tokio::test]
async fn test_shutdown_lets_in_flight_request_finish() {
    let server = spawn_server(test_config()).await;
    let body = br#"{"name":"Late","email":"late@example.com"}"#;
    let (head, tail) = body.split_at(10);

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    let request_head = format!(
        "POST /api/users HTTP/1.1\r\nHost: test\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n",
        body.len()
    );
    stream.write_all(request_head.as_bytes()).await.unwrap();
    stream.write_all(head).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    server.shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(100)).await;
    stream.write_all(tail).await.unwrap();

    let mut buf = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut buf))
        .await
        .expect("in-flight request was not answered")
        .unwrap();
    let text = String::from_utf8_lossy(&buf);
    assert!(text.starts_with("HTTP/1.1 201"), "got: {}", text);
    assert!(text.contains("\"Late\""));

    let result = tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server did not stop in time")
        .unwrap();
    assert!(result.is_ok());
}
