/*!
`profile.rs` - `bsky profile [HANDLE]`.

Without HANDLE the authenticated account's own profile is shown. A leading
`@` on the handle is accepted.
*/

use std::io::Write;

use clap::Args;
use serde_json::json;

use crate::cmd::format::format_profile;
use crate::cmd::shared::Output;
use crate::error::{CliError, CliResult};
use crate::remote::{Remote, RemoteError};

#[derive(Args, Debug)]
pub struct ProfileArgs {
    /// Handle or DID (e.g. alice.bsky.social). Omit to show your own
    #[arg(value_name = "HANDLE")]
    pub handle: Option<String>,
}

pub fn execute_profile<R: Remote>(
    args: &ProfileArgs,
    connect: impl FnOnce() -> CliResult<R>,
    out: &mut Output<impl Write>,
) -> CliResult<()> {
    let requested = args
        .handle
        .as_deref()
        .map(|h| h.trim().trim_start_matches('@'))
        .filter(|h| !h.is_empty());

    let client = connect()?;
    let actor = match requested {
        Some(h) => h.to_string(),
        None => client
            .session()
            .map(|s| s.handle.clone())
            .ok_or(RemoteError::NoSession)
            .map_err(CliError::remote("get profile"))?,
    };
    let profile = client
        .get_profile(&actor)
        .map_err(CliError::remote("get profile"))?;

    if out.is_json() {
        return out.json(&json!({ "status": "ok", "profile": profile }));
    }
    let rendered = format_profile(&profile, out.style());
    out.line(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::shared::testing;
    use crate::remote::ProfileView;
    use crate::remote::mock::MockRemote;

    fn with_profile() -> MockRemote {
        MockRemote {
            profile: Some(ProfileView {
                did: "did:plc:x".into(),
                handle: String::new(),
                display_name: Some("Someone".into()),
                description: Some("bio".into()),
                followers_count: Some(1),
                follows_count: Some(2),
                posts_count: Some(3),
            }),
            ..MockRemote::signed_in()
        }
    }

    #[test]
    fn own_profile_when_handle_omitted() {
        let mut out = testing::human();
        execute_profile(&ProfileArgs { handle: None }, || Ok(with_profile()), &mut out).unwrap();
        let text = testing::text(out);
        assert!(text.starts_with("# @alice.bsky.social\n  Someone\n  bio\n"));
        assert!(text.ends_with("  Posts: 3\n"));
    }

    #[test]
    fn at_prefix_is_stripped() {
        let args = ProfileArgs {
            handle: Some("@bob.test".into()),
        };
        let mut out = testing::json();
        execute_profile(&args, || Ok(with_profile()), &mut out).unwrap();
        let v = testing::value(out);
        assert_eq!(v["profile"]["handle"], "bob.test");
        assert_eq!(v["profile"]["followersCount"], 1);
    }
}
