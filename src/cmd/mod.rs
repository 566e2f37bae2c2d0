/*!
Command dispatcher modules.

Layout:
  src/cmd/
    mod.rs       (this file: module declarations + re-exports)
    post.rs      (PostArgs, ReplyArgs + execute_post / execute_reply)
    like.rs      (LikeArgs + execute_like)
    timeline.rs  (TimelineArgs + execute_timeline)
    thread.rs    (ThreadArgs + execute_thread)
    search.rs    (SearchArgs + execute_search)
    profile.rs   (ProfileArgs + execute_profile)
    account.rs   (execute_whoami / execute_logout)
    shared.rs    (local validation, Output sink)
    format.rs    (human-readable rendering)

Conventions:
  - Each `execute_*` runs its local validation first, then calls `connect`
    to obtain an authenticated `Remote`, issues its request, and writes to
    an `Output`. Every one returns `CliResult<()>`.
  - Argument structs derive `clap::Args` and are kept minimal.
*/

pub mod account;
pub mod format;
pub mod like;
pub mod post;
pub mod profile;
pub mod search;
pub mod shared;
pub mod thread;
pub mod timeline;

pub use account::{execute_logout, execute_whoami};
pub use like::{LikeArgs, execute_like};
pub use post::{PostArgs, ReplyArgs, execute_post, execute_reply};
pub use profile::{ProfileArgs, execute_profile};
pub use search::{SearchArgs, execute_search};
pub use shared::Output;
pub use thread::{ThreadArgs, execute_thread};
pub use timeline::{TimelineArgs, execute_timeline};
