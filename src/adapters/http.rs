//! HTTP transport over the platform's public web and private mobile APIs.
//!
//! Private requests always carry the configured `sessionid` cookie. Public
//! requests are anonymous until [`Transport::inject_ambient_session`] copies
//! the session over.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::debug;

use super::{Payload, Transport};
use crate::config::{ApiSettings, ResolvedConfig};
use crate::domain::Location;
use crate::error::{Error, Result};
use crate::extract::extract_location;

/// Error message the platform uses for session-gated endpoints
const LOGIN_REQUIRED_MESSAGE: &str = "login_required";

/// reqwest-backed [`Transport`]
pub struct HttpTransport {
    api: ApiSettings,
    /// Session cookie value for the private API
    sessionid: Option<String>,
    /// Set once the session has been injected into public requests
    public_authenticated: AtomicBool,
    client: Client,
}

impl HttpTransport {
    /// Create a transport for the given endpoints and session
    pub fn new(api: ApiSettings, sessionid: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(api.user_agent.clone())
            .timeout(Duration::from_secs(api.timeout_seconds))
            .build()?;

        Ok(Self {
            api,
            sessionid,
            public_authenticated: AtomicBool::new(false),
            client,
        })
    }

    /// Create from resolved configuration
    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        Self::new(config.api.clone(), config.session.sessionid.clone())
    }

    /// Build a private API URL
    fn private_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.api.private_base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Build a public web URL
    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api.public_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn with_session(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.sessionid {
            Some(sessionid) => request.header(header::COOKIE, format!("sessionid={}", sessionid)),
            None => request,
        }
    }

    fn public_request(&self, url: &str) -> RequestBuilder {
        let request = self
            .client
            .get(url)
            .header("X-IG-App-ID", &self.api.app_id)
            .header("X-Requested-With", "XMLHttpRequest");

        if self.public_authenticated.load(Ordering::Acquire) {
            self.with_session(request)
        } else {
            request
        }
    }

    /// Turn a response into JSON, mapping platform failures to [`Error`].
    ///
    /// `gated` marks endpoints that answer logged-out callers with a denial
    /// or a redirect to the login page instead of an error body.
    async fn read_json(response: Response, gated: bool) -> Result<Value> {
        let status = response.status();
        let landed_on_login = response.url().path().starts_with("/accounts/login");
        let text = response.text().await?;
        let body: Option<Value> = serde_json::from_str(&text).ok();

        let message = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string);

        if message.as_deref() == Some(LOGIN_REQUIRED_MESSAGE) {
            return Err(Error::LoginRequired(LOGIN_REQUIRED_MESSAGE.to_string()));
        }
        if gated
            && (landed_on_login
                || status == StatusCode::UNAUTHORIZED
                || status == StatusCode::FORBIDDEN
                || (status.is_success() && body.is_none()))
        {
            return Err(Error::LoginRequired(format!(
                "public endpoint denied access ({})",
                status.as_u16()
            )));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(message.unwrap_or_else(|| "not found".to_string())));
        }
        if !status.is_success() {
            return Err(Error::Transport {
                status: Some(status.as_u16()),
                message: message.unwrap_or_else(|| truncate(&text, 200)),
            });
        }

        let body = match body {
            Some(body) => body,
            None => serde_json::from_str(&text)?,
        };

        if body.get("status").and_then(Value::as_str) == Some("fail") {
            return Err(Error::Transport {
                status: Some(status.as_u16()),
                message: message.unwrap_or_else(|| "request failed".to_string()),
            });
        }

        Ok(body)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[async_trait]
impl Transport for HttpTransport {
    async fn public_anonymous_fetch(&self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
        let url = self.public_url(path);
        debug!(%url, "Public anonymous request");

        let response = self
            .public_request(&url)
            .query(&[("__a", "1"), ("__d", "dis")])
            .query(params)
            .send()
            .await?;

        let mut body = Self::read_json(response, false).await?;
        if let Some(graphql) = body.get_mut("graphql") {
            return Ok(graphql.take());
        }
        Ok(body)
    }

    async fn public_graph_fetch(&self, variables: &Value, query_hash: &str) -> Result<Value> {
        let url = self.public_url("graphql/query/");
        debug!(%url, query_hash, "Public graph request");

        let variables = variables.to_string();
        let response = self
            .public_request(&url)
            .query(&[("query_hash", query_hash), ("variables", variables.as_str())])
            .send()
            .await?;

        let mut body = Self::read_json(response, true).await?;
        if let Some(data) = body.get_mut("data") {
            return Ok(data.take());
        }
        Ok(body)
    }

    async fn private_fetch(&self, endpoint: &str, data: Option<&Payload>) -> Result<Value> {
        let url = self.private_url(endpoint);
        debug!(%url, post = data.is_some(), "Private request");

        let request = match data {
            Some(data) => {
                let signed = format!("SIGNATURE.{}", Value::Object(data.clone()));
                self.client.post(&url).form(&[("signed_body", signed)])
            }
            None => self.client.get(&url),
        };

        let response = self
            .with_session(request.header("X-IG-App-ID", &self.api.app_id))
            .send()
            .await?;

        Self::read_json(response, false).await
    }

    async fn resolve_location(&self, location: Location) -> Result<Location> {
        let Some(pk) = location.pk.filter(|_| !location.is_complete()) else {
            return Ok(location);
        };

        let body = self
            .private_fetch(&format!("locations/{}/location_info/", pk), None)
            .await?;
        let info = extract_location(body.get("location").unwrap_or(&body))?;

        Ok(Location {
            pk: Some(pk),
            name: if location.name.is_empty() { info.name } else { location.name },
            address: location.address.or(info.address),
            city: location.city.or(info.city),
            lat: location.lat.or(info.lat),
            lng: location.lng.or(info.lng),
            external_id: location.external_id.or(info.external_id),
            external_id_source: location.external_id_source.or(info.external_id_source),
        })
    }

    async fn inject_ambient_session(&self) -> bool {
        if self.sessionid.is_none() {
            return false;
        }
        self.public_authenticated.store(true, Ordering::Release);
        true
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("private_base_url", &self.api.private_base_url)
            .field("public_base_url", &self.api.public_base_url)
            .field("sessionid", &self.sessionid.as_ref().map(|_| "[REDACTED]"))
            .field(
                "public_authenticated",
                &self.public_authenticated.load(Ordering::Relaxed),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(sessionid: Option<&str>) -> HttpTransport {
        HttpTransport::new(ApiSettings::default(), sessionid.map(str::to_string)).unwrap()
    }

    #[test]
    fn test_urls() {
        let t = transport(None);
        assert_eq!(
            t.private_url("media/1/info/"),
            "https://i.instagram.com/api/v1/media/1/info/"
        );
        assert_eq!(t.public_url("/p/B1LbfVPlwIA/"), "https://www.instagram.com/p/B1LbfVPlwIA/");
        assert_eq!(
            t.public_url("graphql/query/"),
            "https://www.instagram.com/graphql/query/"
        );
    }

    #[tokio::test]
    async fn test_inject_requires_session() {
        let t = transport(None);
        assert!(!t.inject_ambient_session().await);
        assert!(!t.public_authenticated.load(Ordering::Relaxed));

        let t = transport(Some("abc"));
        assert!(t.inject_ambient_session().await);
        assert!(t.public_authenticated.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn test_resolve_location_without_pk_is_passthrough() {
        let t = transport(None);
        let loc = Location::new("Nowhere");
        assert_eq!(t.resolve_location(loc.clone()).await.unwrap(), loc);
    }

    #[tokio::test]
    async fn test_complete_location_skips_lookup() {
        // Nothing listens here, so any request would fail
        let api = ApiSettings {
            private_base_url: "http://127.0.0.1:9/api/v1".to_string(),
            timeout_seconds: 1,
            ..ApiSettings::default()
        };
        let t = HttpTransport::new(api, None).unwrap();
        let loc = Location {
            pk: Some(213385402),
            name: "Kremlin".to_string(),
            lat: Some(55.752),
            lng: Some(37.617),
            ..Default::default()
        };

        assert_eq!(t.resolve_location(loc.clone()).await.unwrap(), loc);

        let partial = Location {
            lat: None,
            ..loc
        };
        assert!(t.resolve_location(partial).await.is_err());
    }

    #[test]
    fn test_debug_redacts_session() {
        let t = transport(Some("secret-session"));
        let rendered = format!("{:?}", t);
        assert!(!rendered.contains("secret-session"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
