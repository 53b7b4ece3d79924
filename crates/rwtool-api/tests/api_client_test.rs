// Integration tests for `ApiClient` using wiremock.
#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rwtool_api::types::{DomainBody, FavoriteBody, FileRef, UserGroupBody};
use rwtool_api::{ApiClient, Error, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = ApiClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_list_domains() {
    let (server, client) = setup().await;

    let body = json!([
        { "id": "d1", "name": "Finance", "description": "Finance reports", "createdDate": "2024-03-01T09:15:00" },
        { "id": "d2", "name": "Credit", "description": null, "createdDate": null },
    ]);

    Mock::given(method("GET"))
        .and(path("/api/domains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let domains = client.list_domains().await.unwrap();

    assert_eq!(domains.len(), 2);
    assert_eq!(domains[0].name, "Finance");
    assert_eq!(domains[0].created_date.as_deref(), Some("2024-03-01T09:15:00"));
    assert_eq!(domains[1].description, None);
}

#[tokio::test]
async fn test_create_domain_sends_name_and_description() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/domains"))
        .and(body_json(json!({ "name": "Loan", "description": "Loan book" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "d9", "name": "Loan", "description": "Loan book"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = client
        .create_domain(&DomainBody {
            name: "Loan".into(),
            description: "Loan book".into(),
        })
        .await
        .unwrap();

    assert_eq!(created.id, "d9");
}

#[tokio::test]
async fn test_reject_subscription_sends_reason() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/subscriptions/42/reject"))
        .and(body_json(json!({ "rejectionReason": "Domain access restricted" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "42",
            "status": "REJECTED",
            "rejectionReason": "Domain access restricted",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let updated = client
        .reject_subscription("42", "Domain access restricted")
        .await
        .unwrap();

    assert_eq!(updated.status, "REJECTED");
    assert_eq!(
        updated.rejection_reason.as_deref(),
        Some("Domain access restricted")
    );
}

#[tokio::test]
async fn test_approve_subscription_has_no_body() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/subscriptions/7/approve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "7", "status": "APPROVED"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let updated = client.approve_subscription("7").await.unwrap();
    assert_eq!(updated.status, "APPROVED");
}

#[tokio::test]
async fn test_cancel_subscription_passes_user_email() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/subscriptions/s1/cancel"))
        .and(query_param("userEmail", "tony@stark.com"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client
        .cancel_subscription("s1", "tony@stark.com")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_user_path_segments_are_encoded() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/subscriptions/user/a%20b@corp.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let list = client.list_user_subscriptions("a b@corp.com").await.unwrap();
    assert!(list.is_empty());
}

#[tokio::test]
async fn test_subscription_stats() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/subscriptions/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalRequests": 10,
            "pendingRequests": 2,
            "approvedRequests": 6,
            "rejectedRequests": 2,
            "approvalRate": 75.0,
        })))
        .mount(&server)
        .await;

    let stats = client.subscription_stats().await.unwrap();
    assert_eq!(stats.total_requests, 10);
    assert!((stats.approval_rate - 75.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_user_group_create_and_member_add() {
    let (server, client) = setup().await;

    let group = json!({
        "id": 3,
        "adGroupName": "Compliance",
        "associatedDomain": "Finance",
        "folderAccess": ["finance-daily"],
        "members": ["a@corp.com"],
    });

    Mock::given(method("POST"))
        .and(path("/api/user-groups"))
        .and(body_json(json!({
            "adGroupName": "Compliance",
            "folderAccess": ["finance-daily"],
            "associatedDomain": "Finance",
            "members": [],
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(&group))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/user-groups/3/members"))
        .and(body_string("a@corp.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&group))
        .expect(1)
        .mount(&server)
        .await;

    let created = client
        .create_user_group(&UserGroupBody {
            ad_group_name: "Compliance".into(),
            folder_access: vec!["finance-daily".into()],
            associated_domain: "Finance".into(),
            members: vec![],
        })
        .await
        .unwrap();
    assert_eq!(created.id, 3);

    let updated = client.add_group_member(3, "a@corp.com").await.unwrap();
    assert_eq!(updated.members, vec!["a@corp.com".to_owned()]);
}

#[tokio::test]
async fn test_folder_files_keep_unknown_fields() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/folders/finance-daily/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "q1.pdf", "folder": "finance-daily", "size": 2048, "owner": "ops" }
        ])))
        .mount(&server)
        .await;

    let files = client.list_folder_files("finance-daily").await.unwrap();
    assert_eq!(files[0].file_name, "q1.pdf");
    assert_eq!(files[0].size, Some(2048));
    assert_eq!(files[0].extra.get("owner"), Some(&json!("ops")));
}

#[tokio::test]
async fn test_favorites_roundtrip_bodies() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/favorites"))
        .and(query_param("userId", "u@corp.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "favorites": [{ "folder": "f", "fileName": "a.pdf" }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/favorites"))
        .and(body_json(json!({ "userId": "u@corp.com", "folder": "f", "fileName": "a.pdf" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let favorites = client.list_favorites("u@corp.com").await.unwrap();
    assert_eq!(
        favorites,
        vec![FileRef {
            folder: "f".into(),
            file_name: "a.pdf".into()
        }]
    );

    client
        .remove_favorite(&FavoriteBody {
            user_id: "u@corp.com".into(),
            folder: "f".into(),
            file_name: "a.pdf".into(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_download_returns_bytes() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/files/download"))
        .and(query_param("folder", "finance daily"))
        .and(query_param("fileName", "q1.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7".to_vec()))
        .mount(&server)
        .await;

    let bytes = client.download_report("finance daily", "q1.pdf").await.unwrap();
    assert_eq!(&bytes[..], b"%PDF-1.7");
}

#[tokio::test]
async fn test_preview_url_encodes_params() {
    let (_server, client) = setup().await;

    let url = client.preview_url("a&b", "r 1.pdf").unwrap();
    assert_eq!(url.path(), "/api/reports/preview");
    assert_eq!(url.query(), Some("folder=a%26b&fileName=r+1.pdf"));
}

#[tokio::test]
async fn test_presign_lives_outside_api_prefix() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/reports/r1/presign"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "http://localhost:8080/reports/stream?folder=f&fileName=a.pdf"
        })))
        .mount(&server)
        .await;

    let resp = client
        .presign_report(
            "r1",
            &rwtool_api::types::PresignBody {
                user_id: "u".into(),
                folder: "f".into(),
                file_name: "a.pdf".into(),
            },
        )
        .await
        .unwrap();
    assert!(resp.url.contains("/reports/stream"));
}

#[tokio::test]
async fn test_login_returns_token_and_bearer_is_sent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "email": "a@corp.com", "password": "secret1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "tok.en.sig" })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/domains"))
        .and(header("authorization", "Bearer tok.en.sig"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let anonymous = ApiClient::new(&server.uri(), &TransportConfig::default()).unwrap();
    let token = anonymous
        .login("a@corp.com", &SecretString::from("secret1"))
        .await
        .unwrap();
    assert_eq!(token.expose_secret(), "tok.en.sig");

    let authed = ApiClient::new(&server.uri(), &TransportConfig::default().with_token(token)).unwrap();
    authed.list_domains().await.unwrap();
}

// ── Error-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_plain_text_error_is_surfaced_verbatim() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/domains"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Domain with name Finance already exists"))
        .mount(&server)
        .await;

    let err = client
        .create_domain(&DomainBody {
            name: "Finance".into(),
            description: String::new(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(
        err.server_message(),
        Some("Domain with name Finance already exists")
    );
}

#[tokio::test]
async fn test_empty_error_body_has_no_message() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/domains/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client.delete_domain("missing").await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.server_message(), None);
}

#[tokio::test]
async fn test_json_error_message_is_surfaced() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/favorites"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Missing userId, folder or fileName"
        })))
        .mount(&server)
        .await;

    let err = client
        .add_favorite(&FavoriteBody {
            user_id: String::new(),
            folder: "f".into(),
            file_name: "a.pdf".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(
        err.server_message(),
        Some("Missing userId, folder or fileName")
    );
}

#[tokio::test]
async fn test_login_unauthorized_is_authentication_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client
        .login("a@corp.com", &SecretString::from("wrong-pass"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Authentication { .. }));
}

#[tokio::test]
async fn test_signup_email_exists_code() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/signup"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({ "error": "EMAIL_EXISTS" })))
        .mount(&server)
        .await;

    let err = client
        .signup(&rwtool_api::types::SignupBody {
            full_name: "Tony".into(),
            email: "tony@stark.com".into(),
            phone_number: "5551234567".into(),
            domain: Some("Finance".into()),
            password: "secret1".into(),
            role: "USER".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.api_error_code(), Some(rwtool_api::auth::EMAIL_EXISTS));
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/folders"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client.list_folders().await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }));
}

#[tokio::test]
async fn test_connection_refused_is_transient() {
    // Nothing listens on port 9 (discard) in the test environment.
    let client = ApiClient::from_reqwest("http://127.0.0.1:9", reqwest::Client::new()).unwrap();

    let err = client.list_domains().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert!(err.is_transient());
}
