//! HTTP API handlers

use axum::{extract::State, Form};
use tracing::{debug, warn};

use wa_bridge::{relay, SendRequest};

use crate::error::Result;
use crate::server::AppState;

/// Help page served at `GET /`
pub const HELP: &str = "WhatsApp Webhook Proxy.

  GET   /                   This help page
  GET   /media/<uuid>       Media files are available here
  POST  /messages/create    Send a new message
        recipient=49123456789
        body=The body of the message.
";

/// Help page
pub async fn help() -> &'static str {
    HELP
}

/// Send a text message through the WhatsApp session
pub async fn create_message(
    State(state): State<AppState>,
    Form(req): Form<SendRequest>,
) -> Result<&'static str> {
    debug!("Send request: {:?}", req);

    relay(state.session.as_ref(), &req).await.map_err(|e| {
        warn!("Send to {} failed: {}", req.recipient, e);
        e
    })?;

    Ok("OK")
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use wa_bridge::{BridgeError, InboundMessage, MediaStore, SendOutcome, WhatsAppSession};

    use super::*;
    use crate::server::app;

    #[derive(Default)]
    struct RecordingSession {
        sent: Mutex<Vec<(String, String)>>,
        reject: bool,
    }

    #[async_trait]
    impl WhatsAppSession for RecordingSession {
        async fn send_text(&self, to: &str, body: &str) -> wa_bridge::Result<SendOutcome> {
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), body.to_string()));
            if self.reject {
                Ok(SendOutcome::Rejected)
            } else {
                Ok(SendOutcome::Sent("msg".to_string()))
            }
        }

        async fn download_media(&self, _message: &InboundMessage) -> wa_bridge::Result<Vec<u8>> {
            Err(BridgeError::Media("not supported".to_string()))
        }
    }

    fn test_app(session: Arc<RecordingSession>, media_dir: &Path) -> Router {
        app(AppState {
            session,
            media_dir: media_dir.to_path_buf(),
        })
    }

    fn send_request(form: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/messages/create")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_help() {
        let dir = TempDir::new().unwrap();
        let response = test_app(Arc::default(), dir.path())
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("/messages/create"));
    }

    #[tokio::test]
    async fn test_create_message_ok() {
        let dir = TempDir::new().unwrap();
        let session = Arc::new(RecordingSession::default());

        let response = test_app(Arc::clone(&session), dir.path())
            .oneshot(send_request("recipient=491234567&body=hi"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "OK");
        assert_eq!(
            *session.sent.lock().unwrap(),
            vec![("491234567@c.us".to_string(), "hi".to_string())]
        );
    }

    #[tokio::test]
    async fn test_create_message_with_plus() {
        let dir = TempDir::new().unwrap();
        let session = Arc::new(RecordingSession::default());

        let response = test_app(Arc::clone(&session), dir.path())
            .oneshot(send_request("recipient=%2B491234567&body=hi"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(session.sent.lock().unwrap()[0].0, "491234567@c.us");
    }

    #[tokio::test]
    async fn test_create_message_rejected() {
        let dir = TempDir::new().unwrap();
        let session = Arc::new(RecordingSession {
            reject: true,
            ..Default::default()
        });

        let response = test_app(session, dir.path())
            .oneshot(send_request("recipient=491234567&body=hi"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(response).await, "Wrong message format");
    }

    #[tokio::test]
    async fn test_create_message_invalid_recipient() {
        let dir = TempDir::new().unwrap();
        let session = Arc::new(RecordingSession::default());

        let response = test_app(Arc::clone(&session), dir.path())
            .oneshot(send_request("body=hi"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(session.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_media_served() {
        let dir = TempDir::new().unwrap();
        let store = MediaStore::new(dir.path(), "http://localhost/media/");
        let stored = store.store(b"\x00\x01binary").await.unwrap();

        let uri = format!("/media/{}", stored.filename);
        let response = test_app(Arc::default(), dir.path())
            .oneshot(Request::get(uri.as_str()).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"\x00\x01binary");
    }

    #[tokio::test]
    async fn test_media_missing() {
        let dir = TempDir::new().unwrap();

        let response = test_app(Arc::default(), dir.path())
            .oneshot(Request::get("/media/never-written").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
