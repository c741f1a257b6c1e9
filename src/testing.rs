//! Test doubles for the transport and observer seams.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
        mpsc::{Receiver, Sender, channel},
    },
};

use serde_json::Value;

use crate::{
    error::TransportError,
    http::{ApiClient, ApiRequest, Method, NoopObserver, RawResponse, RequestObserver, Transport},
    record::Id,
};

pub type SeenRequests = Arc<Mutex<Vec<(Method, String, Option<String>)>>>;

/// Replays canned responses in order and records what was sent.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    seen: SeenRequests,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<RawResponse, TransportError>>) -> Self {
        ScriptedTransport {
            script: Mutex::new(script.into()),
            seen: Arc::default(),
        }
    }

    pub fn requests(&self) -> SeenRequests {
        Arc::clone(&self.seen)
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &ApiRequest<'_>) -> Result<RawResponse, TransportError> {
        self.seen.lock().unwrap().push((
            request.method,
            request.url.to_string(),
            request.body.map(str::to_string),
        ));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted transport ran out of responses")
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.events)
    }
}

impl RequestObserver for RecordingObserver {
    fn request_sent(&self, method: Method, url: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("sent {} {}", method, url));
    }

    fn response_received(&self, method: Method, url: &str, status: u16) {
        self.events
            .lock()
            .unwrap()
            .push(format!("ok {} {} {}", status, method, url));
    }

    fn request_failed(&self, method: Method, url: &str, error: &TransportError) {
        self.events
            .lock()
            .unwrap()
            .push(format!("failed {} {}: {}", method, url, error));
    }
}

#[derive(Default)]
struct Db {
    collections: HashMap<String, Vec<Value>>,
    next_id: u64,
    fail_next: Option<u16>,
    offline: bool,
}

/// In-memory stand-in for json-server.
///
/// Clones share the same data so a test can keep a handle for inspection
/// while the client owns another.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    db: Arc<Mutex<Db>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        let backend = MemoryBackend::default();
        backend.db.lock().unwrap().next_id = 1;
        backend
    }

    /// Seed a collection; records are stored as given.
    pub fn seed(&self, collection: &str, records: Vec<Value>) {
        let mut db = self.db.lock().unwrap();
        let max_id = records
            .iter()
            .filter_map(|r| r.get("id").and_then(Value::as_u64))
            .max()
            .unwrap_or(0);
        db.next_id = db.next_id.max(max_id + 1);
        db.collections.insert(collection.to_string(), records);
    }

    pub fn records(&self, collection: &str) -> Vec<Value> {
        self.db
            .lock()
            .unwrap()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Answer the next request with this status and no body.
    pub fn fail_next(&self, status: u16) {
        self.db.lock().unwrap().fail_next = Some(status);
    }

    pub fn set_offline(&self, offline: bool) {
        self.db.lock().unwrap().offline = offline;
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new("http://mock.local", self.clone()).with_observer(NoopObserver)
    }

    fn handle(db: &mut Db, method: Method, path: &str, body: Option<&str>) -> RawResponse {
        let mut segments = path.trim_start_matches('/').splitn(2, '/');
        let collection = segments.next().unwrap_or_default().to_string();
        let id = segments.next().map(str::to_string);

        let next_id = db.next_id;
        let records = db.collections.entry(collection).or_default();
        match (method, id) {
            (Method::Get, None) => json(200, &Value::Array(records.clone())),
            (Method::Get, Some(id)) => match position(records, &id) {
                Some(i) => json(200, &records[i]),
                None => empty(404),
            },
            (Method::Post, None) => {
                let Some(Value::Object(mut object)) = body.and_then(|b| serde_json::from_str::<Value>(b).ok())
                else {
                    return empty(400);
                };
                if object.contains_key("id") {
                    return empty(400);
                }
                object.insert("id".to_string(), Value::from(next_id));
                let record = Value::Object(object);
                records.push(record.clone());
                db.next_id += 1;
                json(201, &record)
            }
            (Method::Put, Some(id)) => {
                let Some(i) = position(records, &id) else {
                    return empty(404);
                };
                let Some(Value::Object(mut object)) = body.and_then(|b| serde_json::from_str::<Value>(b).ok())
                else {
                    return empty(400);
                };
                object.insert("id".to_string(), records[i]["id"].clone());
                records[i] = Value::Object(object);
                json(200, &records[i])
            }
            (Method::Delete, Some(id)) => match position(records, &id) {
                Some(i) => {
                    records.remove(i);
                    json(200, &Value::Object(Default::default()))
                }
                None => empty(404),
            },
            _ => empty(405),
        }
    }
}

impl Transport for MemoryBackend {
    fn send(&self, request: &ApiRequest<'_>) -> Result<RawResponse, TransportError> {
        let mut db = self.db.lock().unwrap();
        if db.offline {
            return Err(TransportError::Network("connection refused".to_string()));
        }
        if let Some(status) = db.fail_next.take() {
            return Ok(empty(status));
        }
        Ok(MemoryBackend::handle(
            &mut db,
            request.method,
            request.path,
            request.body,
        ))
    }
}

/// Transport that parks the first `parked` requests until the test releases
/// them, so a test can act while a request is in flight. Later requests pass
/// straight through.
pub struct GatedTransport {
    inner: MemoryBackend,
    parked: AtomicUsize,
    after_response: bool,
    arrived: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

pub struct Gate {
    pub arrived: Receiver<()>,
    pub release: Sender<()>,
}

impl GatedTransport {
    /// Parks the first `parked` requests before they reach the backend.
    pub fn new(inner: MemoryBackend, parked: usize) -> (Self, Gate) {
        Self::build(inner, parked, false)
    }

    /// Lets the first `parked` requests hit the backend, then holds their
    /// responses until released.
    pub fn holding_responses(inner: MemoryBackend, parked: usize) -> (Self, Gate) {
        Self::build(inner, parked, true)
    }

    fn build(inner: MemoryBackend, parked: usize, after_response: bool) -> (Self, Gate) {
        let (arrived_tx, arrived_rx) = channel();
        let (release_tx, release_rx) = channel();
        (
            GatedTransport {
                inner,
                parked: AtomicUsize::new(parked),
                after_response,
                arrived: Mutex::new(arrived_tx),
                release: Mutex::new(release_rx),
            },
            Gate {
                arrived: arrived_rx,
                release: release_tx,
            },
        )
    }
}

impl Transport for GatedTransport {
    fn send(&self, request: &ApiRequest<'_>) -> Result<RawResponse, TransportError> {
        let park = self
            .parked
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if !park {
            return self.inner.send(request);
        }
        let response = self.after_response.then(|| self.inner.send(request));
        self.arrived.lock().unwrap().send(()).unwrap();
        self.release.lock().unwrap().recv().unwrap();
        response.unwrap_or_else(|| self.inner.send(request))
    }
}

fn position(records: &[Value], id: &str) -> Option<usize> {
    records.iter().position(|r| {
        r.get("id")
            .and_then(|v| serde_json::from_value::<Id>(v.clone()).ok())
            .is_some_and(|rid| rid.to_string() == id)
    })
}

fn json(status: u16, value: &Value) -> RawResponse {
    RawResponse {
        status,
        body: value.to_string(),
    }
}

fn empty(status: u16) -> RawResponse {
    RawResponse {
        status,
        body: String::new(),
    }
}
