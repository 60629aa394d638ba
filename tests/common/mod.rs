//! Scripted in-memory transport shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use media_resolver::adapters::{Payload, Transport};
use media_resolver::identifiers::codec;
use media_resolver::{Error, Location, MediaClient, Result, Session};

pub const MEDIA_PK: u64 = 2110901750722920960;
pub const OWNER_PK: u64 = 1903424587;
pub const ACTING_USER: u64 = 555;

/// The one media item the mock platform knows about
#[derive(Debug, Clone)]
pub struct Fixture {
    pub pk: u64,
    pub owner: u64,
    pub product_type: &'static str,
    pub caption: &'static str,
    pub location: Option<Value>,
}

impl Default for Fixture {
    fn default() -> Self {
        Self {
            pk: MEDIA_PK,
            owner: OWNER_PK,
            product_type: "feed",
            caption: "Graph caption",
            location: None,
        }
    }
}

impl Fixture {
    pub fn igtv() -> Self {
        Self {
            product_type: "igtv",
            ..Default::default()
        }
    }

    fn is_video(&self) -> bool {
        self.product_type == "igtv"
    }

    pub fn media_id(&self) -> String {
        format!("{}_{}", self.pk, self.owner)
    }

    /// Graph-shaped payload (`data` of a graph query)
    pub fn gql(&self) -> Value {
        let typename = if self.is_video() { "GraphVideo" } else { "GraphImage" };
        json!({
            "shortcode_media": {
                "__typename": typename,
                "id": self.pk.to_string(),
                "shortcode": codec::encode(self.pk),
                "product_type": self.product_type,
                "taken_at_timestamp": 1566000000,
                "owner": {"id": self.owner.to_string(), "username": "owner"},
                "edge_media_to_caption": {"edges": [{"node": {"text": self.caption}}]},
                "edge_media_preview_like": {"count": 10},
                "location": self.location.clone().unwrap_or(Value::Null),
            }
        })
    }

    /// Private-API payload (`media/<pk>/info/`)
    pub fn v1(&self) -> Value {
        let media_type = if self.is_video() { 2 } else { 1 };
        json!({
            "items": [{
                "pk": self.pk,
                "id": self.media_id(),
                "code": codec::encode(self.pk),
                "taken_at": 1566000000,
                "media_type": media_type,
                "product_type": self.product_type,
                "user": {"pk": self.owner, "username": "owner"},
                "caption": {"text": "Private caption"},
                "like_count": 11,
            }],
            "status": "ok"
        })
    }
}

type Responder = Box<dyn Fn(&Fixture, &str) -> Result<Value> + Send + Sync>;

/// One request channel: scripted responses first, then the default responder
struct Channel {
    calls: AtomicUsize,
    script: Mutex<VecDeque<Result<Value>>>,
    default: Responder,
}

impl Channel {
    fn new(default: Responder) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            script: Mutex::new(VecDeque::new()),
            default,
        }
    }

    fn respond(&self, fixture: &Fixture, key: &str) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().unwrap().pop_front() {
            Some(scripted) => scripted,
            None => (self.default)(fixture, key),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Mock platform counting every call per channel
pub struct MockTransport {
    fixture: Fixture,
    graph: Channel,
    anonymous: Channel,
    private: Channel,
    private_requests: Mutex<Vec<(String, Option<Payload>)>>,
    elevation_available: bool,
    elevation_calls: AtomicUsize,
    location_calls: AtomicUsize,
}

impl MockTransport {
    pub fn new(fixture: Fixture) -> Self {
        Self {
            fixture,
            graph: Channel::new(Box::new(|f: &Fixture, shortcode: &str| {
                if shortcode == codec::encode(f.pk) {
                    Ok(f.gql())
                } else {
                    Ok(json!({"shortcode_media": null}))
                }
            })),
            anonymous: Channel::new(Box::new(|f: &Fixture, path: &str| {
                if path == format!("/p/{}/", codec::encode(f.pk)) {
                    Ok(f.gql())
                } else {
                    Ok(json!({}))
                }
            })),
            private: Channel::new(Box::new(default_private)),
            private_requests: Mutex::new(Vec::new()),
            elevation_available: true,
            elevation_calls: AtomicUsize::new(0),
            location_calls: AtomicUsize::new(0),
        }
    }

    pub fn without_elevation(mut self) -> Self {
        self.elevation_available = false;
        self
    }

    /// Queue the next graph response
    pub fn push_graph(&self, response: Result<Value>) {
        self.graph.script.lock().unwrap().push_back(response);
    }

    /// Queue the next anonymous response
    pub fn push_anonymous(&self, response: Result<Value>) {
        self.anonymous.script.lock().unwrap().push_back(response);
    }

    /// Queue the next private response
    pub fn push_private(&self, response: Result<Value>) {
        self.private.script.lock().unwrap().push_back(response);
    }

    pub fn graph_calls(&self) -> usize {
        self.graph.calls()
    }

    pub fn anonymous_calls(&self) -> usize {
        self.anonymous.calls()
    }

    pub fn private_calls(&self) -> usize {
        self.private.calls()
    }

    pub fn elevation_calls(&self) -> usize {
        self.elevation_calls.load(Ordering::SeqCst)
    }

    pub fn location_calls(&self) -> usize {
        self.location_calls.load(Ordering::SeqCst)
    }

    /// Total network round-trips
    pub fn fetch_calls(&self) -> usize {
        self.graph_calls() + self.anonymous_calls() + self.private_calls()
    }

    pub fn private_requests(&self) -> Vec<(String, Option<Payload>)> {
        self.private_requests.lock().unwrap().clone()
    }

    /// Last POST body sent to an endpoint containing `fragment`
    pub fn last_payload(&self, fragment: &str) -> Option<Payload> {
        self.private_requests()
            .into_iter()
            .rev()
            .find(|(endpoint, _)| endpoint.contains(fragment))
            .and_then(|(_, payload)| payload)
    }
}

fn default_private(f: &Fixture, endpoint: &str) -> Result<Value> {
    let media_id = f.media_id();

    if endpoint == format!("media/{}/info/", f.pk) {
        Ok(f.v1())
    } else if endpoint == format!("media/{}/delete/", media_id) {
        Ok(json!({"did_delete": true, "status": "ok"}))
    } else if endpoint == format!("media/{}/edit_media/", media_id) {
        Ok(json!({"media": {"pk": f.pk}, "status": "ok"}))
    } else if endpoint == format!("media/{}/like/", media_id)
        || endpoint == format!("media/{}/unlike/", media_id)
    {
        Ok(json!({"status": "ok"}))
    } else if endpoint.starts_with("oembed?url=") {
        Ok(json!({
            "media_id": media_id,
            "author_name": "owner",
            "title": f.caption,
            "provider_name": "Instagram",
            "html": "<blockquote></blockquote>",
        }))
    } else {
        Err(Error::NotFound(endpoint.to_string()))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn public_anonymous_fetch(&self, path: &str, _params: &[(&str, &str)]) -> Result<Value> {
        self.anonymous.respond(&self.fixture, path)
    }

    async fn public_graph_fetch(&self, variables: &Value, _query_hash: &str) -> Result<Value> {
        let shortcode = variables["shortcode"].as_str().unwrap_or_default().to_string();
        self.graph.respond(&self.fixture, &shortcode)
    }

    async fn private_fetch(&self, endpoint: &str, data: Option<&Payload>) -> Result<Value> {
        self.private_requests
            .lock()
            .unwrap()
            .push((endpoint.to_string(), data.cloned()));
        self.private.respond(&self.fixture, endpoint)
    }

    async fn resolve_location(&self, mut location: Location) -> Result<Location> {
        self.location_calls.fetch_add(1, Ordering::SeqCst);
        location.lat = Some(55.752);
        location.lng = Some(37.617);
        location.address = Some("Red Square".to_string());
        Ok(location)
    }

    async fn inject_ambient_session(&self) -> bool {
        self.elevation_calls.fetch_add(1, Ordering::SeqCst);
        self.elevation_available
    }
}

/// Logged-in client over a fresh mock
pub fn client(fixture: Fixture) -> (Arc<MockTransport>, MediaClient) {
    client_with(MockTransport::new(fixture), Session::new(ACTING_USER))
}

pub fn client_with(transport: MockTransport, session: Session) -> (Arc<MockTransport>, MediaClient) {
    let transport = Arc::new(transport);
    let client = MediaClient::new(transport.clone(), session);
    (transport, client)
}

pub fn login_required() -> Result<Value> {
    Err(Error::LoginRequired("login_required".to_string()))
}
