// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the HTTP client using wiremock.

mod common;

use std::time::Duration;

use serde_json::json;
use span_panel_lib::error::{Error, ProtocolError};
use span_panel_lib::protocol::{Auth, HttpClient, PanelConfig, PanelProtocol, RetryPolicy, endpoints};
use wiremock::matchers::{body_json, body_partial_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{SERIAL, TOKEN, host, status_json};

fn client(server: &MockServer) -> HttpClient {
    PanelConfig::new(host(server))
        .with_access_token(TOKEN)
        .with_timeout(Duration::from_millis(500))
        .into_client()
        .unwrap()
}

// ============================================================================
// Requests
// ============================================================================

mod requests {
    use super::*;

    #[tokio::test]
    async fn bearer_and_accept_headers_are_sent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/panel"))
            .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let response = client(&mock_server)
            .fetch(endpoints::PANEL, &[], Auth::Bearer)
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert!(response.body().contains("ok"));
    }

    #[tokio::test]
    async fn status_endpoint_is_unauthenticated() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/status"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .with_priority(1)
            .mount(&mock_server)
            .await;
        common::mount_get(&mock_server, "/api/v1/status", status_json(SERIAL, true)).await;

        let status = client(&mock_server).status().await.unwrap();

        assert_eq!(status.serial_number, SERIAL);
        assert_eq!(status.proximity_proven(), Some(true));
    }

    #[tokio::test]
    async fn query_parameters_are_encoded() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/circuits"))
            .and(wiremock::matchers::query_param("filter", "a b"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"circuits": {}})))
            .expect(1)
            .mount(&mock_server)
            .await;

        client(&mock_server)
            .fetch(endpoints::CIRCUITS, &[("filter", "a b")], Auth::Bearer)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn post_sends_json_body() {
        let mock_server = MockServer::start().await;
        let body = json!({"relayStateIn": {"relayState": "OPEN"}});

        Mock::given(method("POST"))
            .and(path("/api/v1/circuits/kitchen"))
            .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
            .and(body_json(&body))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&mock_server)
            .await;

        client(&mock_server)
            .post(&endpoints::circuit("kitchen"), &body, Auth::Bearer)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn token_can_be_replaced_at_runtime() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/panel"))
            .and(header("authorization", "Bearer rotated"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client(&mock_server);
        let clone = client.clone();
        client.set_access_token(Some("rotated".to_string()));

        assert!(clone.has_access_token());
        clone.fetch(endpoints::PANEL, &[], Auth::Bearer).await.unwrap();
    }
}

// ============================================================================
// Retry
// ============================================================================

mod retry {
    use super::*;

    #[tokio::test]
    async fn transport_failures_are_retried_until_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/status"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(status_json(SERIAL, false))
                    .set_delay(Duration::from_secs(2)),
            )
            .up_to_n_times(2)
            .with_priority(1)
            .expect(2)
            .mount(&mock_server)
            .await;
        common::mount_get(&mock_server, "/api/v1/status", status_json(SERIAL, false)).await;

        let status = client(&mock_server).status().await.unwrap();
        assert_eq!(status.serial_number, SERIAL);
    }

    #[tokio::test]
    async fn last_transport_error_after_all_attempts() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/panel"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .expect(3)
            .mount(&mock_server)
            .await;

        let err = client(&mock_server)
            .fetch(endpoints::PANEL, &[], Auth::Bearer)
            .await
            .unwrap_err();

        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn retry_policy_bounds_attempts() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/panel"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = PanelConfig::new(host(&mock_server))
            .with_timeout(Duration::from_millis(300))
            .with_retry(RetryPolicy::none())
            .into_client()
            .unwrap();

        let err = client
            .fetch(endpoints::PANEL, &[], Auth::Bearer)
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn server_errors_are_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/circuits"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let err = client(&mock_server)
            .fetch(endpoints::CIRCUITS, &[], Auth::Bearer)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), Some(500));
        assert_eq!(err.to_string(), "HTTP 500 - Internal Server Error");
    }

    #[tokio::test]
    async fn unauthorized_is_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/panel"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&mock_server)
            .await;

        let err = client(&mock_server)
            .fetch(endpoints::PANEL, &[], Auth::Bearer)
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert!(Error::from(err).is_authentication_required());
    }

    #[tokio::test]
    async fn post_is_never_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/circuits/kitchen"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let err = client(&mock_server)
            .post(&endpoints::circuit("kitchen"), &json!({}), Auth::Bearer)
            .await
            .unwrap_err();

        assert!(err.is_transport());
    }
}

// ============================================================================
// Authentication helpers
// ============================================================================

mod auth {
    use super::*;

    #[tokio::test]
    async fn register_returns_issued_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/auth/register"))
            .and(body_partial_json(json!({"name": "client-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accessToken": "issued.jwt",
                "tokenType": "Bearer",
                "iatMs": 1_700_000_000_000_i64
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let token = client(&mock_server)
            .register("client-1", "integration test")
            .await
            .unwrap();

        assert_eq!(token, "issued.jwt");
    }

    #[tokio::test]
    async fn register_refused_without_proximity() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/auth/register"))
            .respond_with(ResponseTemplate::new(412))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server)
            .register("client-1", "integration test")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::Status { code: 412, .. })
        ));
    }

    #[tokio::test]
    async fn ping_checks_status_endpoint() {
        let mock_server = MockServer::start().await;
        common::mount_get(&mock_server, "/api/v1/status", status_json(SERIAL, false)).await;

        assert!(client(&mock_server).ping().await);
    }

    #[tokio::test]
    async fn ping_fails_on_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/status"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        assert!(!client(&mock_server).ping().await);
    }

    #[tokio::test]
    async fn ping_with_auth_detects_rejected_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/panel"))
            .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/panel"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let client = client(&mock_server);
        assert!(client.ping_with_auth().await);

        client.set_access_token(Some("wrong".to_string()));
        assert!(!client.ping_with_auth().await);

        client.set_access_token(None);
        assert!(!client.ping_with_auth().await);
    }
}
