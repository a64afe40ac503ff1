//! Scripted transport for exercising the client and collector offline.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::transport::{HttpResponse, Transport, TransportError};

type Handler =
    Box<dyn Fn(&str, &[(String, String)]) -> Result<HttpResponse, TransportError> + Send + Sync>;

/// A request as seen by the transport.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl Recorded {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

pub struct ScriptedTransport {
    handler: Handler,
    requests: Mutex<Vec<Recorded>>,
}

impl ScriptedTransport {
    /// Answer each request with `handler(url, query)`.
    pub fn routed(
        handler: impl Fn(&str, &[(String, String)]) -> Result<HttpResponse, TransportError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer requests from a fixed queue, in order.
    pub fn sequence(responses: Vec<Result<HttpResponse, TransportError>>) -> Self {
        let queue = Mutex::new(VecDeque::from(responses));
        Self::routed(move |_, _| {
            queue
                .lock()
                .unwrap()
                .pop_front()
                .expect("scripted transport ran out of responses")
        })
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<HttpResponse, TransportError> {
        let query: Vec<(String, String)> =
            query.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        self.requests.lock().unwrap().push(Recorded {
            url: url.to_string(),
            query: query.clone(),
        });
        (self.handler)(url, &query)
    }
}

pub fn ok(body: serde_json::Value) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status: 200,
        body: body.to_string(),
    })
}

pub fn status(code: u16) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status: code,
        body: serde_json::json!({
            "error": { "code": code, "message": format!("status {code}"), "errors": [] }
        })
        .to_string(),
    })
}
