/*!
`account.rs` - `bsky whoami` and `bsky logout`.

`logout` never touches the network: it only removes the cached session.
*/

use std::io::Write;

use serde_json::json;

use crate::cmd::format::with_emoji;
use crate::cmd::shared::Output;
use crate::error::{CliError, CliResult};
use crate::remote::{Remote, RemoteError};
use crate::session::SessionStore;

pub fn execute_whoami<R: Remote>(
    connect: impl FnOnce() -> CliResult<R>,
    store: &SessionStore,
    out: &mut Output<impl Write>,
) -> CliResult<()> {
    let client = connect()?;
    let session = client
        .session()
        .ok_or(RemoteError::NoSession)
        .map_err(CliError::remote("read session"))?;
    let cached = store.exists();

    if out.is_json() {
        return out.json(&json!({
            "status": "ok",
            "handle": session.handle,
            "did": session.did,
            "session_file": cached.then(|| store.path().display().to_string()),
        }));
    }

    out.line(format!("Logged in as: @{}", session.handle))?;
    out.line(format!("DID: {}", session.did))?;
    if cached {
        out.line(format!("Session cached at: {}", store.path().display()))?;
    }
    Ok(())
}

pub fn execute_logout(store: &SessionStore, out: &mut Output<impl Write>) -> CliResult<()> {
    let removed = store.clear()?;

    if out.is_json() {
        return out.json(&json!({ "status": "ok", "cleared": removed }));
    }
    if removed {
        let line = with_emoji("success", "Session cleared", out.style());
        out.line(line)
    } else {
        out.line("No cached session found")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::shared::testing;
    use crate::remote::mock::MockRemote;
    use tempfile::TempDir;

    #[test]
    fn logout_twice() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("session.txt"));
        store.save("token").unwrap();

        let mut out = testing::human();
        execute_logout(&store, &mut out).unwrap();
        assert_eq!(testing::text(out), "✓ Session cleared\n");
        assert!(!store.exists());

        let mut out = testing::human();
        execute_logout(&store, &mut out).unwrap();
        assert_eq!(testing::text(out), "No cached session found\n");
    }

    #[test]
    fn whoami_lists_identity_and_cache_path() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("session.txt"));
        store.save("token").unwrap();

        let mut out = testing::human();
        execute_whoami(|| Ok(MockRemote::signed_in()), &store, &mut out).unwrap();
        let text = testing::text(out);
        assert_eq!(
            text,
            format!(
                "Logged in as: @alice.bsky.social\nDID: did:plc:mock\nSession cached at: {}\n",
                store.path().display()
            )
        );
    }

    #[test]
    fn whoami_omits_path_when_not_cached() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("session.txt"));
        let mut out = testing::json();
        execute_whoami(|| Ok(MockRemote::signed_in()), &store, &mut out).unwrap();
        let v = testing::value(out);
        assert_eq!(v["did"], "did:plc:mock");
        assert!(v["session_file"].is_null());
    }
}
