use std::{fmt, time::Duration};

use log::{debug, error, warn};
use serde::{Serialize, de::DeserializeOwned};

use crate::{config::ApiSettings, error::TransportError};

const JSON: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        })
    }
}

/// One outgoing request, already resolved against the base url.
#[derive(Debug)]
pub struct ApiRequest<'a> {
    pub method: Method,
    /// Path relative to the base url, e.g. `/musicas/3`.
    pub path: &'a str,
    pub url: &'a str,
    pub body: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// The wire. Any status code is a successful exchange here; only a missing
/// response is an error.
pub trait Transport: Send + Sync {
    fn send(&self, request: &ApiRequest<'_>) -> Result<RawResponse, TransportError>;
}

/// Blocking transport backed by a `ureq` agent with a global timeout.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        UreqTransport { agent }
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &ApiRequest<'_>) -> Result<RawResponse, TransportError> {
        let url = request.url;
        let body = request.body.unwrap_or_default();

        let response = match request.method {
            Method::Get => self
                .agent
                .get(url)
                .header("Content-Type", JSON)
                .header("Accept", JSON)
                .call(),
            Method::Delete => self
                .agent
                .delete(url)
                .header("Content-Type", JSON)
                .header("Accept", JSON)
                .call(),
            Method::Post => self
                .agent
                .post(url)
                .header("Content-Type", JSON)
                .header("Accept", JSON)
                .send(body),
            Method::Put => self
                .agent
                .put(url)
                .header("Content-Type", JSON)
                .header("Accept", JSON)
                .send(body),
        }
        .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(RawResponse { status, body })
    }
}

/// Receives every request and its outcome. Purely observational.
pub trait RequestObserver: Send + Sync {
    fn request_sent(&self, method: Method, url: &str);
    fn response_received(&self, method: Method, url: &str, status: u16);
    fn request_failed(&self, method: Method, url: &str, error: &TransportError);
}

/// Default observer, writes to the `log` facade.
pub struct LogObserver;

impl RequestObserver for LogObserver {
    fn request_sent(&self, method: Method, url: &str) {
        debug!("Request sent: {} {}", method, url);
    }

    fn response_received(&self, method: Method, url: &str, status: u16) {
        debug!("Response received: {} {} {}", status, method, url);
    }

    fn request_failed(&self, method: Method, url: &str, err: &TransportError) {
        match err {
            TransportError::NotFound => warn!("{} {}: resource not found", method, url),
            TransportError::Server { status: 500 } => {
                error!("{} {}: internal server error", method, url)
            }
            TransportError::Server { status } => {
                error!("{} {}: unexpected status {}", method, url, status)
            }
            TransportError::Network(reason) => {
                error!("{} {}: no response from server ({})", method, url, reason)
            }
            other => error!("{} {}: {}", method, url, other),
        }
    }
}

/// Observer that drops everything.
pub struct NoopObserver;

impl RequestObserver for NoopObserver {
    fn request_sent(&self, _: Method, _: &str) {}
    fn response_received(&self, _: Method, _: &str, _: u16) {}
    fn request_failed(&self, _: Method, _: &str, _: &TransportError) {}
}

/// JSON client bound to one backend base url.
pub struct ApiClient {
    base_url: String,
    transport: Box<dyn Transport>,
    observer: Box<dyn RequestObserver>,
}

impl ApiClient {
    pub fn new(base_url: &str, transport: impl Transport + 'static) -> Self {
        ApiClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport: Box::new(transport),
            observer: Box::new(LogObserver),
        }
    }

    /// Client talking to the configured backend over `ureq`.
    pub fn from_settings(settings: &ApiSettings) -> Self {
        ApiClient::new(
            &settings.base_url,
            UreqTransport::new(Duration::from_secs(settings.timeout_secs)),
        )
    }

    pub fn with_observer(mut self, observer: impl RequestObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportError> {
        let response = self.execute(Method::Get, path, None)?;
        serde_json::from_str(&response.body).map_err(TransportError::Decode)
    }

    pub fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_string(body).map_err(TransportError::Encode)?;
        let response = self.execute(Method::Post, path, Some(&body))?;
        serde_json::from_str(&response.body).map_err(TransportError::Decode)
    }

    pub fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_string(body).map_err(TransportError::Encode)?;
        let response = self.execute(Method::Put, path, Some(&body))?;
        serde_json::from_str(&response.body).map_err(TransportError::Decode)
    }

    /// DELETE ignores whatever body comes back.
    pub fn delete(&self, path: &str) -> Result<(), TransportError> {
        self.execute(Method::Delete, path, None).map(|_| ())
    }

    fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&str>,
    ) -> Result<RawResponse, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        self.observer.request_sent(method, &url);

        let request = ApiRequest {
            method,
            path,
            url: &url,
            body,
        };

        let outcome = self
            .transport
            .send(&request)
            .and_then(|response| match response.status {
                200..=299 => Ok(response),
                404 => Err(TransportError::NotFound),
                status => Err(TransportError::Server { status }),
            });

        match &outcome {
            Ok(response) => self.observer.response_received(method, &url, response.status),
            Err(e) => self.observer.request_failed(method, &url, e),
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingObserver, ScriptedTransport};

    #[test]
    fn base_url_is_joined_without_double_slash() {
        let transport = ScriptedTransport::new(vec![Ok(RawResponse {
            status: 200,
            body: "[]".to_string(),
        })]);
        let seen = transport.requests();
        let client = ApiClient::new("http://localhost:3001/", transport).with_observer(NoopObserver);

        let list: Vec<serde_json::Value> = client.get_json("/musicas").unwrap();
        assert!(list.is_empty());
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[(Method::Get, "http://localhost:3001/musicas".to_string(), None)]
        );
    }

    #[test]
    fn status_codes_map_to_transport_errors() {
        let transport = ScriptedTransport::new(vec![
            Ok(RawResponse {
                status: 404,
                body: "{}".to_string(),
            }),
            Ok(RawResponse {
                status: 503,
                body: String::new(),
            }),
            Err(TransportError::Network("connection refused".to_string())),
        ]);
        let client = ApiClient::new("http://api", transport).with_observer(NoopObserver);

        let not_found = client.get_json::<serde_json::Value>("/musicas/9");
        assert!(matches!(not_found, Err(TransportError::NotFound)));

        let server = client.delete("/musicas/9");
        assert!(matches!(server, Err(TransportError::Server { status: 503 })));

        let network = client.get_json::<serde_json::Value>("/musicas");
        assert!(matches!(network, Err(TransportError::Network(_))));
    }

    #[test]
    fn bad_body_is_a_decode_error() {
        let transport = ScriptedTransport::new(vec![Ok(RawResponse {
            status: 200,
            body: "<html>".to_string(),
        })]);
        let client = ApiClient::new("http://api", transport).with_observer(NoopObserver);

        let result = client.get_json::<Vec<serde_json::Value>>("/albuns");
        assert!(matches!(result, Err(TransportError::Decode(_))));
    }

    #[test]
    fn observer_sees_one_outcome_per_call() {
        let transport = ScriptedTransport::new(vec![
            Ok(RawResponse {
                status: 201,
                body: "{\"id\":1}".to_string(),
            }),
            Ok(RawResponse {
                status: 500,
                body: String::new(),
            }),
        ]);
        let observer = RecordingObserver::default();
        let events = observer.events();
        let client = ApiClient::new("http://api", transport).with_observer(observer);

        let _: serde_json::Value = client
            .post_json("/albuns", &serde_json::json!({"titulo": "x"}))
            .unwrap();
        assert!(client.delete("/albuns/1").is_err());

        assert_eq!(
            events.lock().unwrap().as_slice(),
            &[
                "sent POST http://api/albuns".to_string(),
                "ok 201 POST http://api/albuns".to_string(),
                "sent DELETE http://api/albuns/1".to_string(),
                "failed DELETE http://api/albuns/1: server answered with status 500".to_string(),
            ]
        );
    }

    #[test]
    fn request_body_is_json_text() {
        let transport = ScriptedTransport::new(vec![Ok(RawResponse {
            status: 200,
            body: "{}".to_string(),
        })]);
        let seen = transport.requests();
        let client = ApiClient::new("http://api", transport).with_observer(NoopObserver);

        let _: serde_json::Value = client
            .put_json("/musicas/2", &serde_json::json!({"ano": 1999}))
            .unwrap();
        assert_eq!(
            seen.lock().unwrap()[0].2.as_deref(),
            Some("{\"ano\":1999}")
        );
    }
}
