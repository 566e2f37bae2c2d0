//! In-memory `Remote` used by unit tests. Records every call it receives.

use std::cell::RefCell;
use std::rc::Rc;

use super::{
    Author, FeedViewPost, PostRecord, PostView, ProfileView, Remote, RemoteError, ReplyRef,
    Session, StrongRef, ThreadViewPost,
};

#[derive(Debug, Default)]
pub struct MockRemote {
    /// Whether `resume` accepts the cached session.
    pub accept_resume: bool,
    /// Access token handed back by `resume`, simulating a refresh.
    pub refreshed_access: Option<String>,
    /// Credentials `login` accepts.
    pub credentials: Option<(String, String)>,
    /// When set, every content call fails with this `(error, message)`.
    pub fail_with: Option<(String, String)>,
    pub posts: Vec<PostView>,
    pub thread: Option<ThreadViewPost>,
    pub profile: Option<ProfileView>,
    pub session: Option<Session>,
    /// Shared so a test can keep a handle after the mock moves into a command.
    pub calls: Rc<RefCell<Vec<String>>>,
    pub sent: Rc<RefCell<Vec<(String, Option<ReplyRef>)>>>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock that already holds an authenticated session.
    pub fn signed_in() -> Self {
        Self {
            session: Some(sample_session("alice.bsky.social")),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, name: &str) {
        self.calls.borrow_mut().push(name.to_string());
    }

    fn check(&self, name: &str) -> Result<(), RemoteError> {
        self.record(name);
        if self.session.is_none() {
            return Err(RemoteError::NoSession);
        }
        match &self.fail_with {
            Some((error, message)) => Err(RemoteError::Api {
                status: 400,
                error: error.clone(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl Remote for MockRemote {
    fn login(&mut self, identifier: &str, password: &str) -> Result<Session, RemoteError> {
        self.record("login");
        match &self.credentials {
            Some((id, pw)) if id == identifier && pw == password => {
                let session = sample_session(identifier);
                self.session = Some(session.clone());
                Ok(session)
            }
            _ => Err(RemoteError::Api {
                status: 401,
                error: "AuthenticationRequired".into(),
                message: "Invalid identifier or password".into(),
            }),
        }
    }

    fn resume(&mut self, mut session: Session) -> Result<Session, RemoteError> {
        self.record("resume");
        if !self.accept_resume {
            return Err(RemoteError::Api {
                status: 400,
                error: "ExpiredToken".into(),
                message: "Token has been revoked".into(),
            });
        }
        if let Some(access) = &self.refreshed_access {
            session.access_jwt = access.clone();
        }
        self.session = Some(session.clone());
        Ok(session)
    }

    fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn send_post(&self, text: &str, reply: Option<&ReplyRef>) -> Result<StrongRef, RemoteError> {
        self.check("send_post")?;
        self.sent
            .borrow_mut()
            .push((text.to_string(), reply.cloned()));
        Ok(StrongRef {
            uri: "at://did:plc:mock/app.bsky.feed.post/new".into(),
            cid: "bafy-new".into(),
        })
    }

    fn like(&self, _subject: &StrongRef) -> Result<StrongRef, RemoteError> {
        self.check("like")?;
        Ok(StrongRef {
            uri: "at://did:plc:mock/app.bsky.feed.like/new".into(),
            cid: "bafy-like".into(),
        })
    }

    fn get_timeline(&self, limit: u32) -> Result<Vec<FeedViewPost>, RemoteError> {
        self.check("get_timeline")?;
        Ok(self
            .posts
            .iter()
            .take(limit as usize)
            .cloned()
            .map(|post| FeedViewPost { post })
            .collect())
    }

    fn get_post_thread(&self, uri: &str) -> Result<ThreadViewPost, RemoteError> {
        self.check("get_post_thread")?;
        self.thread
            .clone()
            .ok_or_else(|| RemoteError::NotFound(uri.to_string()))
    }

    fn search_posts(&self, _query: &str, limit: u32) -> Result<Vec<PostView>, RemoteError> {
        self.check("search_posts")?;
        Ok(self.posts.iter().take(limit as usize).cloned().collect())
    }

    fn get_profile(&self, actor: &str) -> Result<ProfileView, RemoteError> {
        self.check("get_profile")?;
        let mut profile = self
            .profile
            .clone()
            .ok_or_else(|| RemoteError::NotFound(actor.to_string()))?;
        profile.handle = actor.to_string();
        Ok(profile)
    }
}

pub fn sample_session(handle: &str) -> Session {
    Session {
        did: "did:plc:mock".into(),
        handle: handle.into(),
        access_jwt: "access-1".into(),
        refresh_jwt: "refresh-1".into(),
        pds: None,
    }
}

pub fn sample_post(handle: &str, text: &str) -> PostView {
    PostView {
        uri: format!("at://{handle}/app.bsky.feed.post/3k1"),
        cid: "bafy-post".into(),
        author: Author {
            did: "did:plc:author".into(),
            handle: handle.into(),
            display_name: None,
        },
        record: PostRecord {
            text: text.into(),
            created_at: "2024-05-01T12:34:56.789Z".into(),
            reply: None,
        },
        like_count: Some(5),
        repost_count: Some(2),
        reply_count: None,
    }
}
