/*!
`search.rs` - `bsky search QUERY [-n N]`.
*/

use std::io::Write;

use clap::Args;
use serde_json::json;

use crate::cmd::format::format_search_hit;
use crate::cmd::shared::{DEFAULT_LIMIT, Output, validate_limit};
use crate::error::{CliError, CliResult};
use crate::remote::Remote;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search term
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Number of results (1-100)
    #[arg(short = 'n', long = "limit", default_value_t = DEFAULT_LIMIT)]
    pub limit: u32,
}

pub fn execute_search<R: Remote>(
    args: &SearchArgs,
    connect: impl FnOnce() -> CliResult<R>,
    out: &mut Output<impl Write>,
) -> CliResult<()> {
    let query = args.query.trim();
    if query.is_empty() {
        return Err(CliError::Validation("search query is empty".into()));
    }
    validate_limit(args.limit)?;

    let client = connect()?;
    let posts = client
        .search_posts(query, args.limit)
        .map_err(CliError::remote("search"))?;

    if out.is_json() {
        return out.json(&json!({
            "status": "ok",
            "query": query,
            "count": posts.len(),
            "posts": posts,
        }));
    }

    out.line(format!("# Search: '{query}' ({} results)", posts.len()))?;
    out.blank()?;
    for post in &posts {
        let rendered = format_search_hit(post, out.style());
        out.line(rendered)?;
        out.blank()?;
    }
    Ok(())
}
