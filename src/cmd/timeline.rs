/*!
`timeline.rs` - `bsky timeline [-n N] [--uri]`.

Fetches one page of the home timeline (default 20, max 100 posts).
*/

use std::io::Write;

use clap::Args;
use serde_json::json;

use crate::cmd::format::format_post;
use crate::cmd::shared::{DEFAULT_LIMIT, Output, validate_limit};
use crate::error::{CliError, CliResult};
use crate::remote::Remote;

#[derive(Args, Debug)]
pub struct TimelineArgs {
    /// Number of posts to show (1-100)
    #[arg(short = 'n', long = "limit", default_value_t = DEFAULT_LIMIT)]
    pub limit: u32,

    /// Show post URIs (for replying)
    #[arg(long)]
    pub uri: bool,
}

pub fn execute_timeline<R: Remote>(
    args: &TimelineArgs,
    connect: impl FnOnce() -> CliResult<R>,
    out: &mut Output<impl Write>,
) -> CliResult<()> {
    validate_limit(args.limit)?;

    let client = connect()?;
    let feed = client
        .get_timeline(args.limit)
        .map_err(CliError::remote("get timeline"))?;

    if out.is_json() {
        let posts: Vec<_> = feed.iter().map(|item| &item.post).collect();
        return out.json(&json!({
            "status": "ok",
            "count": posts.len(),
            "posts": posts,
        }));
    }

    out.line(format!("# Timeline ({} posts)", feed.len()))?;
    out.blank()?;
    for item in &feed {
        let rendered = format_post(&item.post, args.uri, out.style());
        out.line(rendered)?;
        out.blank()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::shared::testing;
    use crate::remote::mock::{MockRemote, sample_post};

    fn feed_of(n: usize) -> MockRemote {
        MockRemote {
            posts: (0..n)
                .map(|i| sample_post(&format!("u{i}.test"), &format!("post {i}")))
                .collect(),
            ..MockRemote::signed_in()
        }
    }

    #[test]
    fn zero_limit_rejected_before_connecting() {
        let args = TimelineArgs { limit: 0, uri: false };
        let mut out = testing::human();
        let err = execute_timeline(
            &args,
            || -> CliResult<MockRemote> { panic!("must not connect") },
            &mut out,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Validation(_)));
    }

    #[test]
    fn header_counts_posts_and_uri_flag_applies() {
        let args = TimelineArgs { limit: 2, uri: true };
        let mut out = testing::human();
        execute_timeline(&args, || Ok(feed_of(5)), &mut out).unwrap();
        let text = testing::text(out);
        assert!(text.starts_with("# Timeline (2 posts)\n\n@u0.test (u0.test)\n"));
        assert_eq!(text.matches("  URI: ").count(), 2);
        assert!(!text.contains("u2.test"));
    }

    #[test]
    fn empty_timeline() {
        let args = TimelineArgs { limit: 20, uri: false };
        let mut out = testing::human();
        execute_timeline(&args, || Ok(feed_of(0)), &mut out).unwrap();
        assert_eq!(testing::text(out), "# Timeline (0 posts)\n\n");
    }

    #[test]
    fn json_lists_posts() {
        let args = TimelineArgs { limit: 3, uri: false };
        let mut out = testing::json();
        execute_timeline(&args, || Ok(feed_of(3)), &mut out).unwrap();
        let v = testing::value(out);
        assert_eq!(v["count"], 3);
        assert_eq!(v["posts"][1]["author"]["handle"], "u1.test");
        assert_eq!(v["posts"][0]["likeCount"], 5);
    }
}
