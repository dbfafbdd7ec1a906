use firestash::api::ApiClient;
use firestash::config::PollingConfig;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use wiremock::{MockServer, Request, Respond, ResponseTemplate};

/// Client pointed at a mock server
pub fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::with_client(reqwest::Client::new(), &server.uri(), None)
}

/// Fast polling so tests do not wait on the production cadence
pub fn fast_polling(max_attempts: u32) -> PollingConfig {
    PollingConfig {
        interval_ms: 5,
        max_attempts,
    }
}

/// Answers with each body in turn, then repeats the last one
pub struct Sequence {
    bodies: Vec<Value>,
    served: AtomicUsize,
}

impl Sequence {
    pub fn new(bodies: Vec<Value>) -> Self {
        Self {
            bodies,
            served: AtomicUsize::new(0),
        }
    }
}

impl Respond for Sequence {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let index = self.served.fetch_add(1, Ordering::SeqCst);
        let body = self
            .bodies
            .get(index)
            .or_else(|| self.bodies.last())
            .cloned()
            .unwrap_or(Value::Null);
        ResponseTemplate::new(200).set_body_json(body)
    }
}
