//! Tests for the runtime client against a mock runtime.
//!
//! The client is blocking, so every call runs on the blocking pool.

mod common;

use base64::Engine;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

use common::fixtures::noise_image;
use common::mock_runtime::PIPELINE_ID;
use common::{assert_in_palette, MockRuntime};
use pixelsmith::error::{GenerationError, ModelLoadError, PixelsmithError};
use pixelsmith::models::{Device, GenerationConfig};
use pixelsmith::services::{GenerateOptions, PaletteChoice, Pixelsmith, RemoteRuntimeLoader};
use retro_palette::{Image, NES};

/// Run one generate call and unload afterwards, off the async workers
async fn generate(
    config: GenerationConfig,
    device: Device,
    options: GenerateOptions,
) -> Result<Image, PixelsmithError> {
    tokio::task::spawn_blocking(move || {
        let smith = Pixelsmith::new(Arc::new(RemoteRuntimeLoader::new()), device, config);
        let result = smith.generate(&options);
        smith.unload();
        result
    })
    .await
    .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_generate_through_runtime() {
    let runtime = MockRuntime::start().await;
    runtime
        .mock_load_expecting(
            json!({
                "base_model": "stabilityai/stable-diffusion-xl-base-1.0",
                "lora_repo": "nerijs/pixel-art-xl",
                "device": "cpu",
                "dtype": "float16",
                "enable_cpu_offload": false
            }),
            1,
        )
        .await;
    runtime.mock_generate(&noise_image(64, 64, 9)).await;
    runtime.mock_release(1).await;

    let options = GenerateOptions::new("a lighthouse")
        .size(16)
        .seed(Some(99))
        .palette(Some(PaletteChoice::from("nes")));
    let image = generate(runtime.config(), Device::Cpu, options)
        .await
        .unwrap();

    assert_eq!(image.dimensions(), (16, 16));
    assert_in_palette(&image, &NES);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_generate_request_body() {
    let runtime = MockRuntime::start().await;
    runtime.mock_load().await;
    runtime.mock_generate(&noise_image(64, 64, 1)).await;
    runtime.mock_release(1).await;

    let options = GenerateOptions::new("a lighthouse").seed(Some(42));
    generate(runtime.config(), Device::Cpu, options)
        .await
        .unwrap();

    let received = runtime.received().await;
    let inference = received
        .iter()
        .find(|r| r.url.path().ends_with("/generate"))
        .expect("no inference request");
    let body: serde_json::Value = serde_json::from_slice(&inference.body).unwrap();
    assert_eq!(body["prompt"], "a lighthouse");
    assert_eq!(body["seed"], 42);
    assert_eq!(body["width"], 64);
    assert_eq!(body["height"], 64);
    assert_eq!(body["num_inference_steps"], 30);
    assert_eq!(
        inference.url.path(),
        format!("/v1/pipelines/{PIPELINE_ID}/generate")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_seed_is_not_sent() {
    let runtime = MockRuntime::start().await;
    runtime.mock_load().await;
    runtime.mock_generate(&noise_image(64, 64, 1)).await;
    runtime.mock_release(1).await;

    generate(runtime.config(), Device::Cpu, GenerateOptions::new("a cat"))
        .await
        .unwrap();

    let received = runtime.received().await;
    let inference = received
        .iter()
        .find(|r| r.url.path().ends_with("/generate"))
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&inference.body).unwrap();
    assert!(body.get("seed").is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cuda_requests_cpu_offload() {
    let runtime = MockRuntime::start().await;
    runtime
        .mock_load_expecting(json!({ "device": "cuda", "enable_cpu_offload": true }), 1)
        .await;
    runtime.mock_generate(&noise_image(64, 64, 1)).await;
    runtime.mock_release(1).await;

    generate(runtime.config(), Device::Cuda, GenerateOptions::new("a cat"))
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_load_is_model_load_error() {
    let runtime = MockRuntime::start().await;
    runtime.mock_load_error(500, "out of disk space").await;

    let err = generate(runtime.config(), Device::Cpu, GenerateOptions::new("a cat"))
        .await
        .unwrap_err();

    match err {
        PixelsmithError::ModelLoad(ModelLoadError::Rejected { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "out of disk space");
        }
        other => panic!("expected rejected load, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_malformed_load_response() {
    let runtime = MockRuntime::start().await;
    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .and(wiremock::matchers::path("/v1/pipelines"))
        .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(json!({ "id": 1 })))
        .mount(&runtime.server)
        .await;

    let err = generate(runtime.config(), Device::Cpu, GenerateOptions::new("a cat"))
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            PixelsmithError::ModelLoad(ModelLoadError::InvalidResponse(_))
        ),
        "got {err:?}"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_inference_failure_is_runtime_error() {
    let runtime = MockRuntime::start().await;
    runtime.mock_load().await;
    runtime.mock_generate_error(500, "CUDA out of memory").await;
    runtime.mock_release(1).await;

    let err = generate(runtime.config(), Device::Cpu, GenerateOptions::new("a cat"))
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            PixelsmithError::Generation(GenerationError::Runtime { status: 500, .. })
        ),
        "got {err:?}"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_no_images_is_error() {
    let runtime = MockRuntime::start().await;
    runtime.mock_load().await;
    runtime.mock_generate_body(json!({ "images": [] })).await;

    let err = generate(runtime.config(), Device::Cpu, GenerateOptions::new("a cat"))
        .await
        .unwrap_err();

    assert!(
        matches!(err, PixelsmithError::Generation(GenerationError::NoImage)),
        "got {err:?}"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_base64_is_error() {
    let runtime = MockRuntime::start().await;
    runtime.mock_load().await;
    runtime
        .mock_generate_body(json!({ "images": ["!!not base64!!"] }))
        .await;

    let err = generate(runtime.config(), Device::Cpu, GenerateOptions::new("a cat"))
        .await
        .unwrap_err();

    assert!(
        matches!(err, PixelsmithError::Generation(GenerationError::Base64(_))),
        "got {err:?}"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_non_png_image_is_decode_error() {
    let runtime = MockRuntime::start().await;
    runtime.mock_load().await;
    let encoded = base64::engine::general_purpose::STANDARD.encode(b"GIF89a....");
    runtime
        .mock_generate_body(json!({ "images": [encoded] }))
        .await;

    let err = generate(runtime.config(), Device::Cpu, GenerateOptions::new("a cat"))
        .await
        .unwrap_err();

    assert!(
        matches!(err, PixelsmithError::Generation(GenerationError::Decode(_))),
        "got {err:?}"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_config_change_releases_and_reloads() {
    let runtime = MockRuntime::start().await;
    runtime.mock_load().await;
    runtime.mock_generate(&noise_image(64, 64, 1)).await;
    // Once for the config change, once for the final unload
    runtime.mock_release(2).await;

    let config = runtime.config();
    tokio::task::spawn_blocking(move || {
        let smith = Pixelsmith::new(
            Arc::new(RemoteRuntimeLoader::new()),
            Device::Cpu,
            config.clone(),
        );
        smith.generate(&GenerateOptions::new("one")).unwrap();
        smith.generate(&GenerateOptions::new("two")).unwrap();

        let stronger = GenerationConfig {
            lora_weight: 0.6,
            ..config
        };
        smith
            .generate(&GenerateOptions::new("three").config(Some(stronger)))
            .unwrap();
        assert!(smith.unload());
    })
    .await
    .unwrap();

    let loads = runtime
        .received()
        .await
        .iter()
        .filter(|r| r.method.as_str() == "POST" && r.url.path() == "/v1/pipelines")
        .count();
    assert_eq!(loads, 2);
}
