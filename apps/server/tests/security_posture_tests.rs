#![allow(unused)]
#[allow(unused)]
mod support;

use axum::http::{Method, StatusCode};
use pacientes_server::db::PatientStore;
use support::*;

#[tokio::test]
async fn security_headers_are_present() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, headers, _body) = app.request(Method::GET, "/health", None).await?;
            assert_status(status, StatusCode::OK, "health");

            for (name, expected) in [
                ("x-content-type-options", "nosniff"),
                ("x-frame-options", "DENY"),
                ("referrer-policy", "no-referrer"),
                ("content-security-policy", "default-src 'none'"),
                ("cache-control", "no-store"),
            ] {
                let got = headers
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("");
                assert_eq!(got, expected, "missing/incorrect header '{}'", name);
            }

            // HSTS should not be set for plain HTTP requests.
            assert!(headers.get("strict-transport-security").is_none());

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn hsts_is_set_behind_tls_proxy() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, headers, _body) = app
                .request_with_extra_headers(
                    Method::GET,
                    "/health",
                    None,
                    &[("x-forwarded-proto", "https")],
                )
                .await?;
            assert_status(status, StatusCode::OK, "health");
            assert!(headers.get("strict-transport-security").is_some());
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn error_responses_keep_security_headers() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, headers, body) = app
                .request_with_extra_headers(Method::GET, "/pacientes", None, &[])
                .await?;
            assert_status(status, StatusCode::UNAUTHORIZED, "no token");
            assert_eq!(
                headers
                    .get("x-content-type-options")
                    .and_then(|v| v.to_str().ok()),
                Some("nosniff")
            );
            assert_eq!(body["path"], "/pacientes");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn cors_is_not_permissive_by_default() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, headers, _body) = app
                .request_with_extra_headers(
                    Method::GET,
                    "/health",
                    None,
                    &[("origin", "https://evil.example")],
                )
                .await?;
            assert_status(status, StatusCode::OK, "health");
            assert!(
                headers.get("access-control-allow-origin").is_none(),
                "expected no permissive CORS by default"
            );
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn configured_origin_is_allowed() -> anyhow::Result<()> {
    with_test_app_with_config(
        |config| {
            config.server.cors_origins = vec!["https://app.sobrevidas.example".to_string()];
        },
        |app| {
            Box::pin(async move {
                let (_, headers, _) = app
                    .request_with_extra_headers(
                        Method::GET,
                        "/health",
                        None,
                        &[("origin", "https://app.sobrevidas.example")],
                    )
                    .await?;
                assert_eq!(
                    headers
                        .get("access-control-allow-origin")
                        .and_then(|v| v.to_str().ok()),
                    Some("https://app.sobrevidas.example")
                );
                Ok(())
            })
        },
    )
    .await
}

#[tokio::test]
async fn unknown_route_uses_error_body() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, _, body) = app.request(Method::GET, "/nope", None).await?;
            assert_status(status, StatusCode::NOT_FOUND, "unknown route");
            assert_eq!(body["status"], 404);
            assert_eq!(body["path"], "/nope");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn oversized_body_is_rejected() -> anyhow::Result<()> {
    with_test_app_with_config(
        |config| {
            config.server.max_request_body_size = 64;
        },
        |app| {
            Box::pin(async move {
                let (status, _, body) = app
                    .request(
                        Method::POST,
                        "/pacientes",
                        Some(valid_patient_json("12345678901")),
                    )
                    .await?;
                assert_status(status, StatusCode::PAYLOAD_TOO_LARGE, "oversized body");
                assert_eq!(body["status"], 413);
                assert_eq!(body["path"], "/pacientes");
                assert_eq!(app.store.count_all().await?, 0);
                Ok(())
            })
        },
    )
    .await
}

#[tokio::test]
async fn missing_content_type_is_415() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let token = token_with_roles(&["USER"]);
            let (status, _, body) = app
                .request_with_token(Method::POST, "/pacientes", None, Some(&token))
                .await?;
            assert_status(status, StatusCode::UNSUPPORTED_MEDIA_TYPE, "no content type");
            assert_eq!(body["status"], 415);
            assert_eq!(body["error"], "Unsupported Media Type");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn unsupported_method_uses_error_body() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let id = app.create_patient(valid_patient_json("12345678901")).await?;
            let path = format!("/pacientes/{id}");

            let (status, headers, body) = app
                .request(Method::POST, &path, Some(valid_patient_json("10987654321")))
                .await?;
            assert_status(status, StatusCode::METHOD_NOT_ALLOWED, "POST on an item");
            assert_eq!(body["status"], 405);
            assert_eq!(body["error"], "Method Not Allowed");
            assert_eq!(body["path"], path);
            assert_eq!(
                headers
                    .get("x-content-type-options")
                    .and_then(|v| v.to_str().ok()),
                Some("nosniff")
            );
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn unsupported_method_still_requires_a_token() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, _, body) = app
                .request_with_token(Method::POST, "/pacientes/1", None, None)
                .await?;
            assert_status(status, StatusCode::UNAUTHORIZED, "anonymous POST on an item");
            assert_eq!(body["status"], 401);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn unsupported_method_on_health() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, _, body) = app.request(Method::DELETE, "/health", None).await?;
            assert_status(status, StatusCode::METHOD_NOT_ALLOWED, "DELETE /health");
            assert_eq!(body["path"], "/health");
            Ok(())
        })
    })
    .await
}
