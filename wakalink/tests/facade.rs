use wakalink::providers::wakatime::WakaTimeProvider;
use wakalink::{OAuth2Flow, OAuthProvider};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_facade_exposes_wakatime_flow() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "access_token=facade_token&token_type=bearer",
            "text/html",
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/current"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"id": "7", "username": "facade"}
        })))
        .mount(&server)
        .await;

    let provider = WakaTimeProvider::new(
        "client".to_string(),
        "secret".to_string(),
        "http://localhost/callback".to_string(),
    )
    .with_test_urls(server.uri(), format!("{}/api/v1", server.uri()));
    assert_eq!(provider.provider_id(), "wakatime");

    let flow = OAuth2Flow::new(provider);
    let (_, state) = flow.initiate_login(&["email"], None);
    let (identity, token) = flow
        .finalize_login("code", &state, &state, None)
        .await
        .unwrap();

    assert_eq!(identity.external_id, "7");
    assert_eq!(identity.username.as_deref(), Some("facade"));
    assert_eq!(token.token(), "facade_token");
}
