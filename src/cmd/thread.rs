/*!
`thread.rs` - `bsky thread POST_URI`.
*/

use std::io::Write;

use clap::Args;
use serde_json::json;

use crate::cmd::format::format_thread;
use crate::cmd::shared::{Output, parse_post_ref};
use crate::error::{CliError, CliResult};
use crate::remote::Remote;

#[derive(Args, Debug)]
pub struct ThreadArgs {
    /// at:// URI (or bsky.app link) of the post
    #[arg(value_name = "POST_URI")]
    pub post_uri: String,
}

pub fn execute_thread<R: Remote>(
    args: &ThreadArgs,
    connect: impl FnOnce() -> CliResult<R>,
    out: &mut Output<impl Write>,
) -> CliResult<()> {
    let target = parse_post_ref(&args.post_uri)?;

    let client = connect()?;
    let thread = client
        .get_post_thread(&target.at_uri())
        .map_err(CliError::remote("get thread"))?;

    if out.is_json() {
        return out.json(&json!({ "status": "ok", "thread": thread }));
    }
    let rendered = format_thread(&thread, out.style());
    out.line(rendered)
}
