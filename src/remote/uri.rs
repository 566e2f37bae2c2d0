//! Post reference parsing (AT URI vs web link).
//!
//! PostRef::parse -> PostRef { authority, rkey }
//! Accepted forms:
//!   at://<did-or-handle>/app.bsky.feed.post/<rkey>
//!   https://bsky.app/profile/<did-or-handle>/post/<rkey>
//!
use std::fmt;
use thiserror::Error;
use url::Url;

pub const POST_COLLECTION: &str = "app.bsky.feed.post";

const AT_SCHEME: &str = "at://";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UriError {
    #[error("post URI is empty")]
    Empty,
    #[error("invalid post URI '{0}': expected at://<actor>/app.bsky.feed.post/<id>")]
    MalformedAt(String),
    #[error("invalid post link '{0}': expected https://bsky.app/profile/<actor>/post/<id>")]
    MalformedLink(String),
    #[error("'{0}' is not a post URI (use an at:// URI or a bsky.app post link)")]
    Unsupported(String),
}

/// A post addressed by author (DID or handle) and record key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRef {
    pub authority: String,
    pub rkey: String,
}

impl PostRef {
    /// Parse a user-supplied post reference.
    ///
    /// Web links are rewritten to the equivalent AT URI so the service only
    /// ever sees `at://` form.
    pub fn parse(raw: &str) -> Result<Self, UriError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UriError::Empty);
        }

        if let Some(rest) = trimmed.strip_prefix(AT_SCHEME) {
            let parts: Vec<&str> = rest.trim_end_matches('/').split('/').collect();
            return match parts.as_slice() {
                [authority, collection, rkey]
                    if is_authority(authority) && *collection == POST_COLLECTION && is_rkey(rkey) =>
                {
                    Ok(PostRef {
                        authority: authority.to_string(),
                        rkey: rkey.to_string(),
                    })
                }
                _ => Err(UriError::MalformedAt(raw.to_string())),
            };
        }

        if let Ok(url) = Url::parse(trimmed)
            && matches!(url.scheme(), "http" | "https")
        {
            let segments: Vec<&str> = url
                .path_segments()
                .map(|s| s.filter(|seg| !seg.is_empty()).collect())
                .unwrap_or_default();
            return match segments.as_slice() {
                ["profile", authority, "post", rkey] if is_authority(authority) && is_rkey(rkey) => {
                    Ok(PostRef {
                        authority: authority.to_string(),
                        rkey: rkey.to_string(),
                    })
                }
                _ => Err(UriError::MalformedLink(raw.to_string())),
            };
        }

        Err(UriError::Unsupported(raw.to_string()))
    }

    pub fn at_uri(&self) -> String {
        format!("{AT_SCHEME}{}/{POST_COLLECTION}/{}", self.authority, self.rkey)
    }
}

impl fmt::Display for PostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.at_uri())
    }
}

fn is_authority(s: &str) -> bool {
    if let Some(method) = s.strip_prefix("did:") {
        return method.contains(':') && !s.ends_with(':');
    }
    s.contains('.') && !s.starts_with('.') && !s.ends_with('.')
}

fn is_rkey(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ':' | '~'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_at_uri_with_did() {
        let r = PostRef::parse("at://did:plc:abc123/app.bsky.feed.post/3kabc").unwrap();
        assert_eq!(r.authority, "did:plc:abc123");
        assert_eq!(r.rkey, "3kabc");
        assert_eq!(r.at_uri(), "at://did:plc:abc123/app.bsky.feed.post/3kabc");
    }

    #[test]
    fn parse_at_uri_with_handle() {
        let r = PostRef::parse(" at://alice.bsky.social/app.bsky.feed.post/3kabc ").unwrap();
        assert_eq!(r.authority, "alice.bsky.social");
    }

    #[test]
    fn web_link_becomes_at_uri() {
        let r = PostRef::parse("https://bsky.app/profile/alice.bsky.social/post/3kxyz").unwrap();
        assert_eq!(r.to_string(), "at://alice.bsky.social/app.bsky.feed.post/3kxyz");
    }

    #[test]
    fn web_link_with_did_and_trailing_slash() {
        let r = PostRef::parse("https://bsky.app/profile/did:plc:abc/post/3k/").unwrap();
        assert_eq!(r.at_uri(), "at://did:plc:abc/app.bsky.feed.post/3k");
    }

    #[test]
    fn wrong_collection_rejected() {
        let err = PostRef::parse("at://did:plc:abc/app.bsky.feed.like/3k").unwrap_err();
        assert!(matches!(err, UriError::MalformedAt(_)));
    }

    #[test]
    fn profile_link_is_not_a_post() {
        let err = PostRef::parse("https://bsky.app/profile/alice.bsky.social").unwrap_err();
        assert!(matches!(err, UriError::MalformedLink(_)));
    }

    #[test]
    fn plain_text_unsupported() {
        let err = PostRef::parse("hello world").unwrap_err();
        assert!(matches!(err, UriError::Unsupported(_)));
    }

    #[test]
    fn empty_rejected() {
        assert_eq!(PostRef::parse("   ").unwrap_err(), UriError::Empty);
    }
}
