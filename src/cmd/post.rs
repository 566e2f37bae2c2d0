/*!
`post.rs`

`bsky post TEXT` and `bsky reply POST_URI TEXT`.

Text is checked locally (non-empty, at most 300 characters) before a client
is resolved. A reply first looks up the parent to obtain its CID and thread
root, then creates the post.

JSON output:
{ "status": "ok", "uri": "...", "cid": "...", "text": "..." }
(reply adds "parent" and "root")
*/

use std::io::Write;

use clap::Args;
use serde_json::json;

use crate::cmd::format::{PREVIEW_CHARS, preview, with_emoji};
use crate::cmd::shared::{Output, parse_post_ref, validate_text};
use crate::error::{CliError, CliResult};
use crate::remote::{Remote, StrongRef};

#[derive(Args, Debug)]
pub struct PostArgs {
    /// Content of the post (max 300 characters)
    #[arg(value_name = "TEXT")]
    pub text: String,
}

#[derive(Args, Debug)]
pub struct ReplyArgs {
    /// at:// URI (or bsky.app link) of the post to reply to
    #[arg(value_name = "POST_URI")]
    pub post_uri: String,

    /// Content of the reply (max 300 characters)
    #[arg(value_name = "TEXT")]
    pub text: String,
}

pub fn execute_post<R: Remote>(
    args: &PostArgs,
    connect: impl FnOnce() -> CliResult<R>,
    out: &mut Output<impl Write>,
) -> CliResult<()> {
    validate_text("Post", &args.text)?;

    let client = connect()?;
    let created = client
        .send_post(&args.text, None)
        .map_err(CliError::remote("post"))?;

    if out.is_json() {
        return out.json(&json!({
            "status": "ok",
            "uri": created.uri,
            "cid": created.cid,
            "text": args.text,
        }));
    }
    report(out, "Posted", &args.text, &created)
}

pub fn execute_reply<R: Remote>(
    args: &ReplyArgs,
    connect: impl FnOnce() -> CliResult<R>,
    out: &mut Output<impl Write>,
) -> CliResult<()> {
    validate_text("Reply", &args.text)?;
    let target = parse_post_ref(&args.post_uri)?;

    let client = connect()?;
    let parent = client
        .get_post_thread(&target.at_uri())
        .map_err(CliError::remote("reply"))?
        .post;
    let reply = parent.reply_ref_for_child();
    let created = client
        .send_post(&args.text, Some(&reply))
        .map_err(CliError::remote("reply"))?;

    if out.is_json() {
        return out.json(&json!({
            "status": "ok",
            "uri": created.uri,
            "cid": created.cid,
            "text": args.text,
            "parent": reply.parent,
            "root": reply.root,
        }));
    }
    report(out, "Replied", &args.text, &created)
}

fn report(
    out: &mut Output<impl Write>,
    verb: &str,
    text: &str,
    created: &StrongRef,
) -> CliResult<()> {
    let headline = with_emoji(
        "success",
        format!("{verb}: {}", preview(text, PREVIEW_CHARS)),
        out.style(),
    );
    out.line(headline)?;
    out.line(format!("  URI: {}", created.uri))
}
