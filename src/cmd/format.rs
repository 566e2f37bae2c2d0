/*!
format.rs

Human-readable rendering for `bsky` output.

  - StyleOptions::detect() honours NO_COLOR / NO_EMOJI
  - color(role, text, &StyleOptions) / emoji(tag, &StyleOptions)
  - format_post / format_thread / format_search_hit / format_profile
  - preview / truncate_chars / format_timestamp

Every renderer returns a String; printing is left to the caller. JSON output
paths never use these helpers.
*/

use chrono::DateTime;

use crate::remote::{PostView, ProfileView, ThreadNode, ThreadViewPost};

/// Characters of post text echoed back after post / reply.
pub const PREVIEW_CHARS: usize = 50;
/// Characters of text shown for thread replies and search hits.
pub const SNIPPET_CHARS: usize = 100;
/// Replies rendered by `format_thread`.
pub const MAX_THREAD_REPLIES: usize = 10;

/* -------------------------------------------------------------------------- */
/* Style Options                                                              */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
    pub use_emoji: bool,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self::detect()
    }
}

impl StyleOptions {
    pub fn detect() -> Self {
        StyleOptions {
            use_color: std::env::var_os("NO_COLOR").is_none(),
            use_emoji: std::env::var_os("NO_EMOJI").is_none(),
        }
    }

    /// No ANSI codes, glyphs kept.
    #[cfg(test)]
    pub fn plain() -> Self {
        StyleOptions {
            use_color: false,
            use_emoji: true,
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Color / Emoji                                                              */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Primary,
    Secondary,
    Dim,
    Bold,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Primary => "38;5;45",    // cyan-ish
        Role::Secondary => "38;5;250", // gray
        Role::Dim => "2",
        Role::Bold => "1",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

pub fn emoji(tag: &str, style: &StyleOptions) -> &'static str {
    if !style.use_emoji {
        return "";
    }
    match tag {
        "success" => "✓",
        "like" => "♥",
        "repost" => "🔁",
        "reply" => "💬",
        _ => "",
    }
}

/// `"<glyph> text"`, or just `text` when emoji are disabled.
pub fn with_emoji(tag: &str, text: impl AsRef<str>, style: &StyleOptions) -> String {
    match emoji(tag, style) {
        "" => text.as_ref().to_string(),
        e => format!("{e} {}", text.as_ref()),
    }
}

/* -------------------------------------------------------------------------- */
/* Text Helpers                                                               */
/* -------------------------------------------------------------------------- */

/// First `max_chars` characters, no marker.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// First `max_chars` characters, `...` appended when something was cut.
pub fn preview(s: &str, max_chars: usize) -> String {
    let cut = truncate_chars(s, max_chars);
    if cut.len() < s.len() {
        format!("{cut}...")
    } else {
        cut.to_string()
    }
}

/// `YYYY-MM-DD HH:MM` for RFC 3339 input; anything else is returned as-is.
pub fn format_timestamp(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}

/* -------------------------------------------------------------------------- */
/* Posts                                                                      */
/* -------------------------------------------------------------------------- */

fn engagement(post: &PostView, style: &StyleOptions) -> String {
    let likes = post.like_count.unwrap_or(0);
    let reposts = post.repost_count.unwrap_or(0);
    let replies = post.reply_count.unwrap_or(0);
    if style.use_emoji {
        format!(
            "{} {likes}  {} {reposts}  {} {replies}",
            emoji("like", style),
            emoji("repost", style),
            emoji("reply", style)
        )
    } else {
        format!("likes {likes}  reposts {reposts}  replies {replies}")
    }
}

fn author_line(post: &PostView, style: &StyleOptions) -> String {
    format!(
        "{} ({})",
        color(Role::Primary, format!("@{}", post.author.handle), style),
        post.author.display_name_or_handle()
    )
}

/// Render a post: author, text, timestamp, engagement, then URI on request.
pub fn format_post(post: &PostView, show_uri: bool, style: &StyleOptions) -> String {
    let mut lines = vec![
        author_line(post, style),
        format!("  {}", post.record.text),
        format!(
            "  {}",
            color(Role::Dim, format_timestamp(&post.record.created_at), style)
        ),
        format!("  {}", engagement(post, style)),
    ];
    if show_uri {
        lines.push(format!("  URI: {}", post.uri));
    }
    lines.join("\n")
}

/// One search result: author + snippet, then likes and URI.
pub fn format_search_hit(post: &PostView, style: &StyleOptions) -> String {
    let likes = post.like_count.unwrap_or(0);
    let like_label = match emoji("like", style) {
        "" => format!("likes {likes}"),
        e => format!("{e} {likes}"),
    };
    format!(
        "{}: {}\n  {like_label}  URI: {}",
        color(Role::Primary, format!("@{}", post.author.handle), style),
        preview(&post.record.text, SNIPPET_CHARS),
        post.uri
    )
}

fn handle_line(post: &PostView, text: &str, style: &StyleOptions) -> String {
    format!(
        "{}: {text}",
        color(Role::Primary, format!("@{}", post.author.handle), style)
    )
}

/// Reply line; text cut to `SNIPPET_CHARS`.
fn short_line(post: &PostView, style: &StyleOptions) -> String {
    handle_line(post, truncate_chars(&post.record.text, SNIPPET_CHARS), style)
}

fn placeholder(node: &ThreadNode) -> Option<String> {
    match node {
        ThreadNode::Post(_) => None,
        ThreadNode::NotFound { .. } => Some("(post not found)".to_string()),
        ThreadNode::Blocked { .. } => Some("(blocked post)".to_string()),
        ThreadNode::Unknown => Some("(unavailable post)".to_string()),
    }
}

/// Parent (if any, full text), the post itself, then up to ten replies.
pub fn format_thread(thread: &ThreadViewPost, style: &StyleOptions) -> String {
    let mut out: Vec<String> = Vec::new();

    if let Some(parent) = thread.parent.as_deref() {
        out.push(color(Role::Secondary, "--- Parent ---", style));
        match parent {
            ThreadNode::Post(p) => {
                out.push(handle_line(&p.post, &p.post.record.text, style))
            }
            other => out.extend(placeholder(other)),
        }
        out.push(String::new());
    }

    out.push(color(Role::Secondary, "--- Post ---", style));
    out.push(format_post(&thread.post, false, style));
    out.push(String::new());

    let replies: Vec<&ThreadViewPost> = thread
        .replies
        .iter()
        .filter_map(ThreadNode::as_post)
        .take(MAX_THREAD_REPLIES)
        .collect();
    if !replies.is_empty() {
        out.push(color(Role::Secondary, "--- Replies ---", style));
        for r in replies {
            out.push(short_line(&r.post, style));
            out.push(String::new());
        }
    }

    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

/* -------------------------------------------------------------------------- */
/* Profiles                                                                   */
/* -------------------------------------------------------------------------- */

pub fn format_profile(profile: &ProfileView, style: &StyleOptions) -> String {
    let mut lines = vec![color(Role::Bold, format!("# @{}", profile.handle), style)];
    if let Some(name) = profile.display_name.as_deref().filter(|s| !s.is_empty()) {
        lines.push(format!("  {name}"));
    }
    if let Some(desc) = profile.description.as_deref().filter(|s| !s.is_empty()) {
        lines.push(format!("  {desc}"));
    }
    lines.push(String::new());
    lines.push(format!(
        "  Followers: {}",
        profile.followers_count.unwrap_or(0)
    ));
    lines.push(format!("  Following: {}", profile.follows_count.unwrap_or(0)));
    lines.push(format!("  Posts: {}", profile.posts_count.unwrap_or(0)));
    lines.join("\n")
}

/* -------------------------------------------------------------------------- */
/* Tests                                                                      */
/* -------------------------------------------------------------------------- */
