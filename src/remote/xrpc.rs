/*!
xrpc.rs - HTTP implementation of `Remote`.

Each call is a single XRPC request (`GET|POST <service>/xrpc/<nsid>`)
issued through an async `reqwest` client and driven to completion on a
current-thread Tokio runtime owned by the client, so callers stay
synchronous.

Endpoints used:
  com.atproto.server.createSession   (login)
  com.atproto.server.getSession      (resume: validate access token)
  com.atproto.server.refreshSession  (resume: token expired)
  com.atproto.repo.createRecord      (post / reply / like)
  app.bsky.feed.getTimeline
  app.bsky.feed.getPostThread
  app.bsky.feed.searchPosts
  app.bsky.actor.getProfile
*/

use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, trace};
use url::Url;

use super::{
    FeedViewPost, PostView, ProfileView, Remote, RemoteError, ReplyRef, Session, StrongRef,
    ThreadNode, ThreadViewPost, uri::POST_COLLECTION,
};

const LIKE_COLLECTION: &str = "app.bsky.feed.like";

/* ---- Wire Shapes ---- */

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionResponse {
    did: String,
    handle: String,
    access_jwt: String,
    refresh_jwt: String,
    #[serde(default)]
    did_doc: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetSessionResponse {
    did: String,
    handle: String,
    #[serde(default)]
    did_doc: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TimelineResponse {
    feed: Vec<FeedViewPost>,
}

#[derive(Debug, Deserialize)]
struct ThreadResponse {
    thread: ThreadNode,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    posts: Vec<PostView>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Clone, Copy)]
enum Auth {
    Anonymous,
    Access,
    Refresh,
}

/* ---- Client ---- */

pub struct XrpcClient {
    rt: tokio::runtime::Runtime,
    http: reqwest::Client,
    service: Url,
    session: Option<Session>,
}

impl XrpcClient {
    pub fn new(service: Url, timeout: Duration) -> Result<Self, RemoteError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(RemoteError::Runtime)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bsky-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            rt,
            http,
            service,
            session: None,
        })
    }

    /// Base URL for requests: the account's PDS once known, else the entryway.
    fn base(&self) -> Url {
        self.session
            .as_ref()
            .and_then(|s| s.pds.as_deref())
            .and_then(|p| Url::parse(p).ok())
            .unwrap_or_else(|| self.service.clone())
    }

    fn endpoint(&self, nsid: &str) -> Result<Url, RemoteError> {
        Ok(self.base().join(&format!("xrpc/{nsid}"))?)
    }

    fn token(&self, auth: Auth) -> Result<Option<&str>, RemoteError> {
        match auth {
            Auth::Anonymous => Ok(None),
            Auth::Access => self
                .session
                .as_ref()
                .map(|s| Some(s.access_jwt.as_str()))
                .ok_or(RemoteError::NoSession),
            Auth::Refresh => self
                .session
                .as_ref()
                .map(|s| Some(s.refresh_jwt.as_str()))
                .ok_or(RemoteError::NoSession),
        }
    }

    fn query<T: DeserializeOwned>(
        &self,
        nsid: &str,
        params: &[(&str, String)],
    ) -> Result<T, RemoteError> {
        let url = self.endpoint(nsid)?;
        let mut req = self.http.get(url).query(params);
        if let Some(token) = self.token(Auth::Access)? {
            req = req.bearer_auth(token);
        }
        debug!(nsid, "xrpc query");
        self.rt.block_on(dispatch(req))
    }

    fn procedure<T: DeserializeOwned>(
        &self,
        nsid: &str,
        body: Option<serde_json::Value>,
        auth: Auth,
    ) -> Result<T, RemoteError> {
        let url = self.endpoint(nsid)?;
        let mut req = self.http.post(url);
        if let Some(token) = self.token(auth)? {
            req = req.bearer_auth(token);
        }
        if let Some(b) = body {
            req = req.json(&b);
        }
        debug!(nsid, "xrpc procedure");
        self.rt.block_on(dispatch(req))
    }

    fn did(&self) -> Result<&str, RemoteError> {
        self.session
            .as_ref()
            .map(|s| s.did.as_str())
            .ok_or(RemoteError::NoSession)
    }

    fn create_record(
        &self,
        collection: &str,
        record: serde_json::Value,
    ) -> Result<StrongRef, RemoteError> {
        let repo = self.did()?;
        let body = json!({
            "repo": repo,
            "collection": collection,
            "record": record,
        });
        self.procedure("com.atproto.repo.createRecord", Some(body), Auth::Access)
    }

    /// Check the access token; refresh once if it has expired.
    fn validate_or_refresh(&mut self) -> Result<(), RemoteError> {
        match self.check_session() {
            Ok(()) => Ok(()),
            Err(e) if e.is_expired_token() => {
                debug!("access token expired; refreshing session");
                let refreshed: CreateSessionResponse = self.procedure(
                    "com.atproto.server.refreshSession",
                    None,
                    Auth::Refresh,
                )?;
                self.adopt(refreshed);
                self.check_session()
            }
            Err(e) => Err(e),
        }
    }

    fn check_session(&mut self) -> Result<(), RemoteError> {
        let current: GetSessionResponse = self.query("com.atproto.server.getSession", &[])?;
        let session = self.session.as_mut().ok_or(RemoteError::NoSession)?;
        session.did = current.did;
        session.handle = current.handle;
        if let Some(pds) = current.did_doc.as_ref().and_then(pds_endpoint) {
            session.pds = Some(pds);
        }
        Ok(())
    }

    fn adopt(&mut self, resp: CreateSessionResponse) {
        let pds = resp
            .did_doc
            .as_ref()
            .and_then(pds_endpoint)
            .or_else(|| self.session.as_ref().and_then(|s| s.pds.clone()));
        self.session = Some(Session {
            did: resp.did,
            handle: resp.handle,
            access_jwt: resp.access_jwt,
            refresh_jwt: resp.refresh_jwt,
            pds,
        });
    }
}

impl Remote for XrpcClient {
    fn login(&mut self, identifier: &str, password: &str) -> Result<Session, RemoteError> {
        self.session = None;
        let resp: CreateSessionResponse = self.procedure(
            "com.atproto.server.createSession",
            Some(json!({ "identifier": identifier, "password": password })),
            Auth::Anonymous,
        )?;
        self.adopt(resp);
        self.session.clone().ok_or(RemoteError::NoSession)
    }

    fn resume(&mut self, session: Session) -> Result<Session, RemoteError> {
        self.session = Some(session);
        if let Err(e) = self.validate_or_refresh() {
            self.session = None;
            return Err(e);
        }
        self.session.clone().ok_or(RemoteError::NoSession)
    }

    fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn send_post(&self, text: &str, reply: Option<&ReplyRef>) -> Result<StrongRef, RemoteError> {
        let mut record = json!({
            "$type": POST_COLLECTION,
            "text": text,
            "createdAt": now(),
        });
        if let Some(r) = reply {
            record["reply"] = serde_json::to_value(r)?;
        }
        self.create_record(POST_COLLECTION, record)
    }

    fn like(&self, subject: &StrongRef) -> Result<StrongRef, RemoteError> {
        let record = json!({
            "$type": LIKE_COLLECTION,
            "subject": subject,
            "createdAt": now(),
        });
        self.create_record(LIKE_COLLECTION, record)
    }

    fn get_timeline(&self, limit: u32) -> Result<Vec<FeedViewPost>, RemoteError> {
        let resp: TimelineResponse =
            self.query("app.bsky.feed.getTimeline", &[("limit", limit.to_string())])?;
        Ok(resp.feed)
    }

    fn get_post_thread(&self, uri: &str) -> Result<ThreadViewPost, RemoteError> {
        let resp: ThreadResponse =
            self.query("app.bsky.feed.getPostThread", &[("uri", uri.to_string())])?;
        resp.thread.into_post(uri)
    }

    fn search_posts(&self, query: &str, limit: u32) -> Result<Vec<PostView>, RemoteError> {
        let resp: SearchResponse = self.query(
            "app.bsky.feed.searchPosts",
            &[("q", query.to_string()), ("limit", limit.to_string())],
        )?;
        Ok(resp.posts)
    }

    fn get_profile(&self, actor: &str) -> Result<ProfileView, RemoteError> {
        self.query("app.bsky.actor.getProfile", &[("actor", actor.to_string())])
    }
}

/* ---- Helpers ---- */

async fn dispatch<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, RemoteError> {
    let resp = req.send().await?;
    let status = resp.status();
    let body = resp.bytes().await?;
    trace!(status = status.as_u16(), bytes = body.len(), "xrpc response");
    if !status.is_success() {
        return Err(api_error(status, &body));
    }
    Ok(serde_json::from_slice(&body)?)
}

fn api_error(status: StatusCode, body: &[u8]) -> RemoteError {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let fallback_message = || {
        let text = String::from_utf8_lossy(body).trim().to_string();
        if text.is_empty() {
            format!("HTTP {}", status.as_u16())
        } else {
            text
        }
    };
    RemoteError::Api {
        status: status.as_u16(),
        error: parsed
            .error
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Error").to_string()),
        message: parsed.message.unwrap_or_else(fallback_message),
    }
}

/// Extract the `#atproto_pds` service endpoint from a DID document.
fn pds_endpoint(did_doc: &serde_json::Value) -> Option<String> {
    did_doc
        .get("service")?
        .as_array()?
        .iter()
        .find(|svc| {
            svc.get("id")
                .and_then(|v| v.as_str())
                .is_some_and(|id| id.ends_with("#atproto_pds"))
        })?
        .get("serviceEndpoint")?
        .as_str()
        .map(|s| s.to_string())
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
