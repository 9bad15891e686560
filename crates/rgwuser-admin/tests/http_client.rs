use rgwuser_admin::{
    AdminApi, AdminError, ClientSettings, EndpointContext, HttpAdminClient, NewUser,
    QuotaSettings, UserChanges,
};
use rgwuser_core::AccessLevel;
use wiremock::matchers::{header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER_JSON: &str = r#"{
    "user_id": "my-user",
    "display_name": "my-user",
    "max_buckets": 1000,
    "subusers": [],
    "keys": [{"user": "my-user", "access_key": "EOE7FYCNOBZJ5VFV909G", "secret_key": "qmIqpWm8HxCzmynCrD6U6vKWi4hnDBndOnmxXNsV"}],
    "caps": [],
    "user_quota": {"enabled": false, "max_size": -1, "max_objects": -1}
}"#;

const NO_SUCH_USER: &str =
    r#"{"Code":"NoSuchUser","RequestId":"tx0000000000000000005a9-00608957a2-10496-my-store","HostId":"10496-my-store-my-store"}"#;

fn client(server: &MockServer) -> HttpAdminClient {
    let ctx = EndpointContext {
        namespace: "rook-ceph".into(),
        store: "my-store".into(),
        endpoint: server.uri(),
        access_key: "53S6B9S809NUP19IJ2K3".into(),
        secret_key: "1bXPegzsGClvoGAiJdHQD1uOW2sQBLAZM9j9VtXR".into(),
    };
    HttpAdminClient::new(&ctx, &ClientSettings::default()).expect("client")
}

#[tokio::test]
async fn get_user_returns_record_and_signs_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/user"))
        .and(query_param("uid", "my-user"))
        .and(query_param("format", "json"))
        .and(header_exists("authorization"))
        .and(header_exists("x-amz-date"))
        .and(header_exists("x-amz-content-sha256"))
        .respond_with(ResponseTemplate::new(200).set_body_string(USER_JSON))
        .expect(1)
        .mount(&server)
        .await;

    let user = client(&server).get_user("my-user").await.unwrap().unwrap();
    assert_eq!(user.id, "my-user");
    assert_eq!(user.max_buckets, Some(1000));
}

#[tokio::test]
async fn get_user_maps_no_such_user_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/user"))
        .respond_with(ResponseTemplate::new(404).set_body_string(NO_SUCH_USER))
        .mount(&server)
        .await;

    assert!(client(&server).get_user("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn create_user_sends_display_name_and_max_buckets() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/admin/user"))
        .and(query_param("uid", "my-user"))
        .and(query_param("display-name", "my-user"))
        .and(query_param("max-buckets", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_string(USER_JSON))
        .expect(1)
        .mount(&server)
        .await;

    let created = client(&server)
        .create_user(&NewUser {
            id: "my-user".into(),
            display_name: "my-user".into(),
            max_buckets: 1000,
        })
        .await
        .unwrap();
    assert_eq!(created.keys.len(), 1);
}

#[tokio::test]
async fn modify_user_sends_only_changed_attributes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/user"))
        .and(query_param("uid", "my-user"))
        .and(query_param("max-buckets", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_string(USER_JSON))
        .expect(1)
        .mount(&server)
        .await;

    let changes = UserChanges {
        max_buckets: Some(200),
        ..Default::default()
    };
    client(&server).modify_user("my-user", &changes).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let query = requests[0].url.query().unwrap_or_default().to_string();
    assert!(!query.contains("display-name"), "unexpected query {query}");
}

#[tokio::test]
async fn set_user_quota_transmits_full_state() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/admin/user"))
        .and(query_param("quota", ""))
        .and(query_param("quota-type", "user"))
        .and(query_param("uid", "my-user"))
        .and(query_param("enabled", "true"))
        .and(query_param("max-objects", "10000"))
        .and(query_param("max-size", "10000000000"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let quota = QuotaSettings {
        enabled: true,
        max_objects: 10_000,
        max_size: 10_000_000_000,
    };
    client(&server).set_user_quota("my-user", &quota).await.unwrap();
}

#[tokio::test]
async fn remove_user_caps_sends_exact_string() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/admin/user"))
        .and(query_param("caps", ""))
        .and(query_param("uid", "my-user"))
        .and(query_param("user-caps", "users=read;buckets=read;"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&server)
        .await;

    let caps = client(&server)
        .remove_user_caps("my-user", "users=read;buckets=read;")
        .await
        .unwrap();
    assert!(caps.is_empty());

    let requests = server.received_requests().await.unwrap();
    let query = requests[0].url.query().unwrap_or_default().to_string();
    assert!(
        query.contains("user-caps=users%3Dread%3Bbuckets%3Dread%3B"),
        "unexpected query {query}"
    );
}

#[tokio::test]
async fn subuser_calls_use_expected_verbs() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(query_param("subuser", "swift"))
        .and(query_param("access", "read"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(query_param("subuser", "swift"))
        .and(query_param("access", "readwrite"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(query_param("subuser", "swift"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .expect(1)
        .mount(&server)
        .await;

    let admin = client(&server);
    admin
        .create_subuser("my-user", "swift", AccessLevel::Read)
        .await
        .unwrap();
    admin
        .modify_subuser("my-user", "swift", AccessLevel::ReadWrite)
        .await
        .unwrap();
    admin.remove_subuser("my-user", "swift").await.unwrap();
}

#[tokio::test]
async fn missing_subuser_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(
            ResponseTemplate::new(404).set_body_string(r#"{"Code":"NoSuchSubUser"}"#),
        )
        .mount(&server)
        .await;

    let err = client(&server)
        .remove_subuser("my-user", "swift")
        .await
        .unwrap_err();
    assert_eq!(err, AdminError::not_found("subuser", "my-user:swift"));
}

#[tokio::test]
async fn unexpected_status_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(
            ResponseTemplate::new(403).set_body_string(r#"{"Code":"AccessDenied"}"#),
        )
        .mount(&server)
        .await;

    let err = client(&server)
        .set_user_quota("my-user", &QuotaSettings::disabled())
        .await
        .unwrap_err();
    match err {
        AdminError::Http { status, code, .. } => {
            assert_eq!(status, 403);
            assert_eq!(code, "AccessDenied");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server).get_user("my-user").await.unwrap_err();
    assert!(matches!(err, AdminError::Decode(_)));
}
