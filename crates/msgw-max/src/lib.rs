//! MAX adapter (bot HTTP API over reqwest).
//!
//! Implements the `msgw-core` chat, files and acknowledgment capabilities against
//! `platform-api.max.ru` (or any compatible base url).

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use msgw_core::{
    domain::CallbackId,
    errors::Error,
    messaging::{
        port::{Acknowledger, ChatClient, ChatFilesClient},
        types::{SendFileRequest, SendResult, SendTextRequest},
    },
    Result,
};

mod payload;

pub const PROVIDER: &str = "max";

#[derive(Clone, Debug)]
pub struct MaxClient {
    base_url: Url,
    access_token: String,
    ack_notification: Option<String>,
    http: reqwest::Client,
}

impl MaxClient {
    pub fn new(base_url: Url, access_token: impl Into<String>, timeout: Duration) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "MAX base url '{base_url}' cannot carry a path"
            )));
        }
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(Error::Config("MAX access token is required".to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("MAX http client build failed: {e}")))?;
        Ok(Self {
            base_url,
            access_token,
            ack_notification: None,
            http,
        })
    }

    /// Text shown to the user when a callback is acknowledged.
    pub fn with_ack_notification(mut self, text: impl Into<String>) -> Self {
        self.ack_notification = Some(text.into());
        self
    }

    fn endpoint(&self, path: &str, query: (&str, &str)) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(path);
        }
        url.query_pairs_mut().append_pair(query.0, query.1);
        url
    }

    async fn post(&self, url: Url, body: Value, cancel: &CancellationToken) -> Result<Value> {
        debug!(provider = PROVIDER, path = url.path(), "MAX request");

        let call = async {
            let resp = self
                .http
                .post(url)
                .header(reqwest::header::AUTHORIZATION, &self.access_token)
                .json(&body)
                .send()
                .await
                .map_err(|e| Error::messaging("max_network", format!("max request error: {e}")))?;

            let status = resp.status();
            if !status.is_success() {
                let text = resp.text().await.unwrap_or_default();
                return Err(Error::messaging(
                    format!("max_http_{}", status.as_u16()),
                    text.chars().take(200).collect::<String>(),
                ));
            }

            resp.json::<Value>()
                .await
                .map_err(|e| Error::messaging("max_bad_response", format!("max json error: {e}")))
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            res = call => res,
        }
    }
}

#[async_trait]
impl ChatClient for MaxClient {
    async fn send_text(
        &self,
        request: &SendTextRequest,
        cancel: &CancellationToken,
    ) -> Result<SendResult> {
        let url = self.endpoint("messages", ("chat_id", request.chat_id().as_str()));
        let resp = self.post(url, payload::text_body(request), cancel).await?;
        Ok(SendResult {
            message_id: payload::message_id(resp)?,
        })
    }
}

#[async_trait]
impl ChatFilesClient for MaxClient {
    async fn send_file(
        &self,
        request: &SendFileRequest,
        cancel: &CancellationToken,
    ) -> Result<SendResult> {
        let body = payload::file_body(request)?;
        let url = self.endpoint("messages", ("chat_id", request.chat_id().as_str()));
        let resp = self.post(url, body, cancel).await?;
        Ok(SendResult {
            message_id: payload::message_id(resp)?,
        })
    }
}

#[async_trait]
impl Acknowledger for MaxClient {
    async fn acknowledge(
        &self,
        callback_id: &CallbackId,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let url = self.endpoint("answers", ("callback_id", callback_id.as_str()));
        let body = payload::answer_body(self.ack_notification.as_deref());
        self.post(url, body, cancel).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };

    use axum::{
        extract::{Query, State},
        http::{HeaderMap, StatusCode, Uri},
        routing::post,
        Json, Router,
    };
    use msgw_core::{domain::ChatId, messaging::builder::Message};
    use serde_json::json;

    use super::*;

    #[derive(Clone, Debug)]
    struct Seen {
        path: String,
        query: HashMap<String, String>,
        auth: Option<String>,
        body: Value,
    }

    type Log = Arc<Mutex<Vec<Seen>>>;

    async fn spawn_fake_api(status: StatusCode) -> (Url, Log) {
        let log: Log = Arc::default();

        async fn record(
            State((log, status)): State<(Log, StatusCode)>,
            uri: Uri,
            Query(query): Query<HashMap<String, String>>,
            headers: HeaderMap,
            Json(body): Json<Value>,
        ) -> (StatusCode, Json<Value>) {
            let path = uri.path().to_string();
            let reply = if !status.is_success() {
                json!({ "code": "chat.not.found" })
            } else if path == "/answers" {
                json!({ "success": true })
            } else {
                json!({ "message": { "body": { "mid": "mid.123" } } })
            };
            log.lock().unwrap().push(Seen {
                path,
                query,
                auth: headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string),
                body,
            });
            (status, Json(reply))
        }

        let app = Router::new()
            .route("/messages", post(record))
            .route("/answers", post(record))
            .with_state((log.clone(), status));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (Url::parse(&format!("http://{addr}")).unwrap(), log)
    }

    fn client(base: Url) -> MaxClient {
        MaxClient::new(base, "secret-token", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let c = client(Url::parse("https://example.com/bot/").unwrap());
        assert_eq!(
            c.endpoint("messages", ("chat_id", "-42")).as_str(),
            "https://example.com/bot/messages?chat_id=-42"
        );
        let c = client(Url::parse("https://platform-api.max.ru").unwrap());
        assert_eq!(
            c.endpoint("answers", ("callback_id", "a b")).as_str(),
            "https://platform-api.max.ru/answers?callback_id=a+b"
        );
    }

    #[test]
    fn blank_token_is_rejected() {
        let err = MaxClient::new(
            Url::parse("https://platform-api.max.ru").unwrap(),
            " ",
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn send_text_posts_to_messages_with_auth_header() {
        let (base, log) = spawn_fake_api(StatusCode::OK).await;
        let res = Message::to(ChatId::new("42").unwrap())
            .text("hello")
            .send(&client(base), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(res.message_id.as_str(), "mid.123");

        let seen = log.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].path, "/messages");
        assert_eq!(seen[0].query.get("chat_id").map(String::as_str), Some("42"));
        assert_eq!(seen[0].auth.as_deref(), Some("secret-token"));
        assert_eq!(seen[0].body, json!({ "text": "hello" }));
    }

    #[tokio::test]
    async fn acknowledge_posts_to_answers() {
        let (base, log) = spawn_fake_api(StatusCode::OK).await;
        client(base)
            .with_ack_notification("Got it")
            .acknowledge(
                &CallbackId::new("cb-1").unwrap(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let seen = log.lock().unwrap();
        assert_eq!(seen[0].path, "/answers");
        assert_eq!(
            seen[0].query.get("callback_id").map(String::as_str),
            Some("cb-1")
        );
        assert_eq!(seen[0].body, json!({ "notification": "Got it" }));
    }

    #[tokio::test]
    async fn http_errors_carry_status_code() {
        let (base, _log) = spawn_fake_api(StatusCode::NOT_FOUND).await;
        let err = Message::to(ChatId::new("42").unwrap())
            .text("hello")
            .send(&client(base), &CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            Error::Messaging { code, message } => {
                assert_eq!(code, "max_http_404");
                assert!(message.contains("chat.not.found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn cancelled_token_wins() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = client(Url::parse("http://127.0.0.1:9").unwrap())
            .acknowledge(&CallbackId::new("cb-1").unwrap(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }
}
