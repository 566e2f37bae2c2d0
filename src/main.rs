use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;
mod error;
mod remote;
mod session;
mod utils;

use cmd::{LikeArgs, PostArgs, ProfileArgs, ReplyArgs, SearchArgs, ThreadArgs, TimelineArgs};
use error::{CliError, CliResult};
use remote::XrpcClient;
use session::{Credentials, SessionStore};

/// bsky - post, read, and interact with Bluesky from the command line.
///
///   bsky post "hello from the terminal"
///   bsky timeline -n 10 --uri
///   bsky reply at://did:plc:.../app.bsky.feed.post/3k... "agreed"
///   bsky like https://bsky.app/profile/alice.bsky.social/post/3k...
///   bsky thread <POST_URI>
///   bsky search rust -n 5
///   bsky profile alice.bsky.social
///   bsky whoami | bsky logout
///
/// Authentication:
///   A cached session (~/.cache/bsky/session.txt) is reused when still valid.
///   Otherwise BLUESKY_HANDLE and BLUESKY_APP_PASSWORD are used for a fresh
///   login and the new session is cached.
///
/// Global flags / env:
///   -v / -vv        Increase verbosity (RUST_LOG refines)
///   -q / --quiet    Errors only
///   --json          Machine-readable output
///   --service URL   Service endpoint (or BLUESKY_SERVICE)
///   --config PATH   YAML config (default: <config dir>/bsky/config.yaml)
///   BSKY_SESSION_FILE  Session cache location override
#[derive(Parser, Debug)]
#[command(
    name = "bsky",
    version,
    about = "bsky - post, read, and interact with Bluesky from the command line",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error diagnostics
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,

    /// Service URL (defaults to https://bsky.social)
    #[arg(long, global = true, value_name = "URL")]
    service: Option<String>,

    /// Path to a YAML config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new post
    Post(PostArgs),

    /// Reply to a post
    Reply(ReplyArgs),

    /// Like a post
    Like(LikeArgs),

    /// Show your home timeline
    Timeline(TimelineArgs),

    /// Show a post thread
    Thread(ThreadArgs),

    /// Search for posts
    Search(SearchArgs),

    /// Show a user's profile
    Profile(ProfileArgs),

    /// Show your authenticated account info
    Whoami,

    /// Clear cached session (forces fresh login on next command)
    Logout,
}

fn main() {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    if let Err(e) = run(cli) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = config::load(cli.config.as_deref(), cli.service.as_deref())?;
    tracing::debug!(service = %config.service, session = %config.session_file.display(), "configuration loaded");

    let store = SessionStore::new(&config.session_file);
    let mut out = cmd::Output::stdout(cli.json);

    let connect = || -> CliResult<XrpcClient> {
        let remote = XrpcClient::new(config.service.clone(), config.timeout)
            .map_err(CliError::remote("initialize client"))?;
        session::resolve_client(remote, &store, Credentials::from_env)
    };

    match cli.command {
        Commands::Post(args) => cmd::execute_post(&args, connect, &mut out)?,
        Commands::Reply(args) => cmd::execute_reply(&args, connect, &mut out)?,
        Commands::Like(args) => cmd::execute_like(&args, connect, &mut out)?,
        Commands::Timeline(args) => cmd::execute_timeline(&args, connect, &mut out)?,
        Commands::Thread(args) => cmd::execute_thread(&args, connect, &mut out)?,
        Commands::Search(args) => cmd::execute_search(&args, connect, &mut out)?,
        Commands::Profile(args) => cmd::execute_profile(&args, connect, &mut out)?,
        Commands::Whoami => cmd::execute_whoami(connect, &store, &mut out)?,
        Commands::Logout => cmd::execute_logout(&store, &mut out)?,
    }
    Ok(())
}
