//! Shared test helpers: mock servers and recording doubles.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use webwatch::error::NotifyError;
use webwatch::models::Invocation;
use webwatch::runtime::{EventSource, InvocationError};
use webwatch::services::Notifier;

/// Serve `body` at `/page`, replacing whatever was mounted before.
pub async fn serve_page(server: &MockServer, body: &str) {
    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Notifier that records every URL it was asked to announce.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<String>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, url: &str) -> std::result::Result<(), NotifyError> {
        self.sent.lock().unwrap().push(url.to_string());
        if self.fail {
            Err(NotifyError::NoRecipients)
        } else {
            Ok(())
        }
    }
}

/// What the watcher reported back for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Success(String),
    Error { request_id: String, message: String },
}

/// Event source replaying a fixed script of invocations.
#[derive(Default)]
pub struct ScriptedSource {
    script: Mutex<VecDeque<std::result::Result<Invocation, InvocationError>>>,
    reports: Mutex<Vec<Report>>,
}

impl ScriptedSource {
    pub fn push(&self, next: std::result::Result<Invocation, InvocationError>) {
        self.script.lock().unwrap().push_back(next);
    }

    pub fn push_payload(&self, request_id: &str, payload: &str) {
        self.push(Ok(Invocation::new(request_id, payload)));
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn next(&self) -> std::result::Result<Invocation, InvocationError> {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("script exhausted")
    }

    async fn report_success(&self, request_id: &str) {
        self.reports
            .lock()
            .unwrap()
            .push(Report::Success(request_id.to_string()));
    }

    async fn report_error(&self, message: &str, request_id: &str) {
        self.reports.lock().unwrap().push(Report::Error {
            request_id: request_id.to_string(),
            message: message.to_string(),
        });
    }
}

/// In-memory bucket speaking just enough of the S3 path-style API.
///
/// `HEAD`, `GET` and `PUT` on `/{bucket}/{key}`. Keys listed in `forbidden`
/// answer 403 to everything.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct FakeBucket {
    pub objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    pub forbidden: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl FakeBucket {
    pub async fn mount(&self, server: &MockServer) {
        Mock::given(wiremock::matchers::any())
            .respond_with(self.clone())
            .mount(server)
            .await;
    }

    pub fn forbid(&self, path: &str) {
        self.forbidden.lock().unwrap().push(path.to_string());
    }
}

impl Respond for FakeBucket {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let key = request.url.path().to_string();
        if self.forbidden.lock().unwrap().contains(&key) {
            return ResponseTemplate::new(403);
        }

        let mut objects = self.objects.lock().unwrap();
        match request.method.as_str() {
            "HEAD" => match objects.get(&key) {
                Some(_) => ResponseTemplate::new(200),
                None => ResponseTemplate::new(404),
            },
            "GET" => match objects.get(&key) {
                Some(data) => ResponseTemplate::new(200).set_body_bytes(data.clone()),
                None => ResponseTemplate::new(404)
                    .insert_header("content-type", "application/xml")
                    .set_body_string(
                        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
                         <Error><Code>NoSuchKey</Code><Message>missing</Message></Error>",
                    ),
            },
            "PUT" => {
                objects.insert(key, request.body.clone());
                ResponseTemplate::new(200)
            }
            _ => ResponseTemplate::new(405),
        }
    }
}
