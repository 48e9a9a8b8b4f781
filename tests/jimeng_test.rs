//! Jimeng proxy image client against a mock proxy.

use genbridge::config::JimengProxyConfig;
use genbridge::error::GenerationError;
use genbridge::providers::JimengClient;
use genbridge::traits::ImageGenerationCapability;
use genbridge::types::{ImageOptions, TaskStatus};
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> JimengClient {
    let config = JimengProxyConfig {
        enabled: true,
        base_url: server.uri(),
        sessionid: Some(SecretString::from("sess-123".to_string())),
        ..JimengProxyConfig::default()
    };
    JimengClient::from_config(&config).expect("client should build")
}

fn images(urls: &[&str]) -> serde_json::Value {
    json!({
        "created": 1733837122,
        "data": urls.iter().map(|u| json!({"url": u})).collect::<Vec<_>>()
    })
}

#[tokio::test]
async fn text_to_image_returns_completed_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .and(header("cookie", "sessionid=sess-123"))
        .and(body_json(json!({
            "model": "jimeng-4.5",
            "prompt": "A lighthouse in fog",
            "negative_prompt": "text, watermark",
            "size": "1280x720"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(images(&[
            "https://cdn.example.com/a.png",
            "https://cdn.example.com/b.png",
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let options = ImageOptions::new()
        .with_negative_prompt("text, watermark")
        .with_size("1280x720");
    let result = client_for(&server)
        .generate_image("A lighthouse in fog", &options)
        .await
        .unwrap();

    assert!(result.completed);
    assert_eq!(result.status, TaskStatus::Success);
    assert_eq!(result.image_url.as_deref(), Some("https://cdn.example.com/a.png"));
    assert_eq!(result.image_urls.len(), 2);
    assert_eq!((result.width, result.height), (1280, 720));
    assert!(result.task_id.is_none());

    let normalized = result.into_generation_result();
    assert_eq!(normalized.image_url(), Some("https://cdn.example.com/a.png"));
}

#[tokio::test]
async fn reference_images_use_composition_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/images/compositions"))
        .and(body_json(json!({
            "model": "jimeng-4.5",
            "prompt": "Same character, rainy street",
            "images": ["https://cdn.example.com/ref.png"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(images(&["https://cdn.example.com/c.png"])))
        .expect(1)
        .mount(&server)
        .await;

    let options = ImageOptions::new().with_reference_image("https://cdn.example.com/ref.png");
    let result = client_for(&server)
        .generate_image("Same character, rainy street", &options)
        .await
        .unwrap();

    assert_eq!((result.width, result.height), (1024, 1024));
}

#[tokio::test]
async fn empty_data_is_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"created": 1, "data": []})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate_image("p", &ImageOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::EmptyResult { .. }));
}

#[tokio::test]
async fn expired_session_surfaces_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("session expired"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate_image("p", &ImageOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(401));
    assert!(err.to_string().contains("session expired"));
}

#[tokio::test]
async fn extra_params_cannot_override_typed_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(images(&["https://cdn.example.com/a.png"])))
        .expect(0)
        .mount(&server)
        .await;

    let options = ImageOptions::new()
        .with_extra_param("prompt", json!("something else"))
        .with_extra_param("sample_strength", json!(0.5));
    let err = client_for(&server)
        .generate_image("A lighthouse", &options)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GenerationError::InvalidParameter(ref msg) if msg.contains("prompt") && !msg.contains("sample_strength")
    ));
}
