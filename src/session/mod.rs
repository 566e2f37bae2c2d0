//! Session cache and client resolution.
//!
//! resolve_client: cached token -> remote validation -> (fallback) fresh
//! credential login -> persist token.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::cmd::format::{StyleOptions, with_emoji};
use crate::error::{CliError, CliResult};
use crate::remote::{Remote, RemoteError, Session};

pub const HANDLE_ENV: &str = "BLUESKY_HANDLE";
pub const PASSWORD_ENV: &str = "BLUESKY_APP_PASSWORD";

/* ---- Store ---- */

/// On-disk home of the exported session token.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Stored token, or `None` if absent, unreadable or blank.
    pub fn load(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "session file unreadable");
                None
            }
        }
    }

    pub fn save(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token)?;
        restrict_permissions(&self.path)?;
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    /// Delete the token. Returns whether a file was removed.
    pub fn clear(&self) -> io::Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "session cleared");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}

/* ---- Credentials ---- */

#[derive(Clone)]
pub struct Credentials {
    pub identifier: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Both values must be present and non-blank.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let identifier = lookup(HANDLE_ENV).filter(|v| !v.trim().is_empty())?;
        let password = lookup(PASSWORD_ENV).filter(|v| !v.trim().is_empty())?;
        Some(Self {
            identifier: identifier.trim().to_string(),
            password,
        })
    }
}

/* ---- Resolution ---- */

/// Produce an authenticated client.
///
/// A cached session is tried first; `credentials` is only consulted when no
/// usable session exists. A rejected session is cleared before the single
/// fallback to fresh login.
pub fn resolve_client<R, F>(mut remote: R, store: &SessionStore, credentials: F) -> CliResult<R>
where
    R: Remote,
    F: FnOnce() -> Option<Credentials>,
{
    if let Some(token) = store.load() {
        match restore(&mut remote, &token) {
            Ok(session) => {
                debug!(handle = %session.handle, "restored cached session");
                // Tokens may have been refreshed during validation.
                if let Err(e) = persist(store, &session) {
                    warn!(error = %e, "could not update cached session");
                }
                return Ok(remote);
            }
            Err(e) => {
                debug!(error = %e, "cached session rejected; falling back to fresh login");
                if let Err(e) = store.clear() {
                    warn!(error = %e, "could not remove stale session");
                }
            }
        }
    }

    let creds = credentials().ok_or(CliError::MissingCredentials)?;
    let session = remote
        .login(&creds.identifier, &creds.password)
        .map_err(CliError::Login)?;
    persist(store, &session)?;
    eprintln!("{}", login_notice(&session.handle, &StyleOptions::detect()));
    Ok(remote)
}

fn login_notice(handle: &str, style: &StyleOptions) -> String {
    with_emoji(
        "success",
        format!("Logged in as @{handle} (session cached)"),
        style,
    )
}

fn restore<R: Remote>(remote: &mut R, token: &str) -> Result<Session, RemoteError> {
    let session = Session::import(token)?;
    remote.resume(session)
}

fn persist(store: &SessionStore, session: &Session) -> CliResult<()> {
    let token = session.export()?;
    store.save(&token)?;
    Ok(())
}
