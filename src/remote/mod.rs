//! Remote collaborator: the AT Protocol service seen through the `Remote` trait.
//!
//! Commands only ever talk to `Remote`; `xrpc::XrpcClient` is the HTTP
//! implementation and `mock::MockRemote` stands in for it under test.
//!
//! Key items:
//!   Remote            (login / resume / content calls)
//!   Session           (export / import of the opaque session token)
//!   PostView / ThreadNode / ProfileView  (read-only response views)
//!   RemoteError

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod uri;
pub mod xrpc;

#[cfg(test)]
pub mod mock;

pub use uri::{PostRef, UriError};
pub use xrpc::XrpcClient;

/* ---- Errors ---- */

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// Error body returned by an XRPC endpoint (`{"error": .., "message": ..}`).
    #[error("{error}: {message}")]
    Api {
        status: u16,
        error: String,
        message: String,
    },

    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid service URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid session token: {0}")]
    BadToken(String),

    #[error("not authenticated")]
    NoSession,

    #[error("post not found: {0}")]
    NotFound(String),

    #[error("post is blocked: {0}")]
    Blocked(String),

    #[error("failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl RemoteError {
    /// True when the server reports the access token as expired.
    pub fn is_expired_token(&self) -> bool {
        matches!(self, RemoteError::Api { error, .. } if error == "ExpiredToken")
    }
}

/* ---- Session ---- */

/// Authenticated session. Exported as an opaque string and cached on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub did: String,
    pub handle: String,
    pub access_jwt: String,
    pub refresh_jwt: String,
    /// Personal data server endpoint advertised in the DID document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pds: Option<String>,
}

impl Session {
    pub fn export(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn import(raw: &str) -> Result<Self, RemoteError> {
        serde_json::from_str(raw.trim()).map_err(|e| RemoteError::BadToken(e.to_string()))
    }
}

/* ---- Response Views ---- */

/// Reference to a specific version of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrongRef {
    pub uri: String,
    pub cid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyRef {
    pub root: StrongRef,
    pub parent: StrongRef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub did: String,
    pub handle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Author {
    pub fn display_name_or_handle(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.handle,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<ReplyRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub uri: String,
    pub cid: String,
    pub author: Author,
    #[serde(default)]
    pub record: PostRecord,
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub repost_count: Option<u64>,
    #[serde(default)]
    pub reply_count: Option<u64>,
}

impl PostView {
    pub fn strong_ref(&self) -> StrongRef {
        StrongRef {
            uri: self.uri.clone(),
            cid: self.cid.clone(),
        }
    }

    /// Reply reference for a new post answering this one. The root is
    /// inherited when this post is itself a reply.
    pub fn reply_ref_for_child(&self) -> ReplyRef {
        let parent = self.strong_ref();
        let root = self
            .record
            .reply
            .as_ref()
            .map(|r| r.root.clone())
            .unwrap_or_else(|| parent.clone());
        ReplyRef { root, parent }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedViewPost {
    pub post: PostView,
}

/// Node of a post thread as returned by `getPostThread`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum ThreadNode {
    #[serde(rename = "app.bsky.feed.defs#threadViewPost")]
    Post(ThreadViewPost),
    #[serde(rename = "app.bsky.feed.defs#notFoundPost")]
    NotFound { uri: String },
    #[serde(rename = "app.bsky.feed.defs#blockedPost")]
    Blocked { uri: String },
    #[serde(other)]
    Unknown,
}

impl ThreadNode {
    pub fn as_post(&self) -> Option<&ThreadViewPost> {
        match self {
            ThreadNode::Post(p) => Some(p),
            _ => None,
        }
    }

    /// Unwrap the thread root, mapping placeholder nodes to errors.
    pub fn into_post(self, requested: &str) -> Result<ThreadViewPost, RemoteError> {
        match self {
            ThreadNode::Post(p) => Ok(p),
            ThreadNode::NotFound { uri } => Err(RemoteError::NotFound(uri)),
            ThreadNode::Blocked { uri } => Err(RemoteError::Blocked(uri)),
            ThreadNode::Unknown => Err(RemoteError::NotFound(requested.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadViewPost {
    pub post: PostView,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<ThreadNode>>,
    #[serde(default)]
    pub replies: Vec<ThreadNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub did: String,
    pub handle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub followers_count: Option<u64>,
    #[serde(default)]
    pub follows_count: Option<u64>,
    #[serde(default)]
    pub posts_count: Option<u64>,
}

/* ---- Collaborator Trait ---- */

/// Everything the CLI needs from the protocol service.
///
/// `login` and `resume` establish the session held by the client; every
/// other call requires one and fails with `RemoteError::NoSession` without it.
pub trait Remote {
    /// Fresh credential login (handle or email + app password).
    fn login(&mut self, identifier: &str, password: &str) -> Result<Session, RemoteError>;

    /// Adopt a previously exported session, validating it remotely and
    /// refreshing tokens if the access token expired.
    fn resume(&mut self, session: Session) -> Result<Session, RemoteError>;

    fn session(&self) -> Option<&Session>;

    fn send_post(&self, text: &str, reply: Option<&ReplyRef>) -> Result<StrongRef, RemoteError>;

    fn like(&self, subject: &StrongRef) -> Result<StrongRef, RemoteError>;

    fn get_timeline(&self, limit: u32) -> Result<Vec<FeedViewPost>, RemoteError>;

    fn get_post_thread(&self, uri: &str) -> Result<ThreadViewPost, RemoteError>;

    fn search_posts(&self, query: &str, limit: u32) -> Result<Vec<PostView>, RemoteError>;

    fn get_profile(&self, actor: &str) -> Result<ProfileView, RemoteError>;
}
