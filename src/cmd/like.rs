/*!
`like.rs` - `bsky like POST_URI`.

Looks up the post (for its CID and author) and creates a like record.
*/

use std::io::Write;

use clap::Args;
use serde_json::json;

use crate::cmd::format::with_emoji;
use crate::cmd::shared::{Output, parse_post_ref};
use crate::error::{CliError, CliResult};
use crate::remote::Remote;

#[derive(Args, Debug)]
pub struct LikeArgs {
    /// at:// URI (or bsky.app link) of the post to like
    #[arg(value_name = "POST_URI")]
    pub post_uri: String,
}

pub fn execute_like<R: Remote>(
    args: &LikeArgs,
    connect: impl FnOnce() -> CliResult<R>,
    out: &mut Output<impl Write>,
) -> CliResult<()> {
    let target = parse_post_ref(&args.post_uri)?;

    let client = connect()?;
    let post = client
        .get_post_thread(&target.at_uri())
        .map_err(CliError::remote("like"))?
        .post;
    let like = client
        .like(&post.strong_ref())
        .map_err(CliError::remote("like"))?;

    if out.is_json() {
        return out.json(&json!({
            "status": "ok",
            "uri": like.uri,
            "subject": post.strong_ref(),
            "author": post.author.handle,
        }));
    }
    let line = with_emoji(
        "success",
        format!("Liked post by @{}", post.author.handle),
        out.style(),
    );
    out.line(line)
}
