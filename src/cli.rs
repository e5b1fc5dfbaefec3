//! CLI surface for wikigit.
//!
//! None of these options affect the reconciliation/replay algorithm; they
//! only select credentials, targets, and logging.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::config;
use crate::convert::CommandConverter;
use crate::git::CommitWriter;
use crate::mirror::{self, MirrorOptions};
use crate::remote::{HttpRemote, Remote, RetryPolicy};
use crate::{Error, Result};

#[derive(Parser, Debug)]
#[command(
    name = "wikigit",
    version,
    about = "Mirror a wiki space into a git repository, one commit per revision"
)]
pub struct Cli {
    /// Space to mirror. Omit to list available spaces.
    pub space: Option<String>,

    /// Base link of the wiki, e.g. https://wiki.example.com
    #[arg(long, value_name = "URL")]
    pub base: Option<String>,

    /// User for basic authentication.
    #[arg(long, value_name = "USER")]
    pub user: Option<String>,

    /// Password for basic authentication (prefer WIKIGIT_PASSWORD).
    #[arg(long, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Target repository directory (default: current directory).
    #[arg(long, value_name = "PATH")]
    pub repo: Option<PathBuf>,

    /// Print per-event progress.
    #[arg(long, default_value_t = false)]
    pub progress: bool,

    /// Errors only.
    #[arg(short = 'q', long, default_value_t = false)]
    pub quiet: bool,

    /// Debug output (repeat for more).
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,
}

pub fn parse_from<I, T>(args: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::parse_from(args)
}

pub fn run(cli: Cli) -> Result<()> {
    let cfg = config::load()?;
    let base = cli.base.or(cfg.base).ok_or_else(|| {
        Error::Config("no base link configured (--base or WIKIGIT_BASE)".into())
    })?;
    let user = cli.user.or(cfg.user).unwrap_or_default();
    let password = cli.password.or(cfg.password).unwrap_or_default();

    let api = HttpRemote::new(&base, &user, &password, RetryPolicy::default());

    // No space selected: print what is available and stop.
    let Some(space) = cli.space else {
        for space in api.spaces()? {
            println!("{}\t{}", space.key, space.name);
        }
        return Ok(());
    };

    let repo_dir = cli.repo.or(cfg.repo).unwrap_or_else(|| PathBuf::from("."));
    let git = CommitWriter::open_or_init(&repo_dir)?;
    let converter = CommandConverter::new(cfg.converter.program, cfg.converter.args);

    let summary = mirror::run(
        &api,
        &converter,
        &git,
        &MirrorOptions {
            base,
            space,
            progress: cli.progress,
        },
    )?;
    println!(
        "mirrored: {} commits ({} new pages, {} renames, {} moved, {} deleted)",
        summary.commits, summary.new_pages, summary.renames, summary.moved, summary.deleted
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_space_and_flags() {
        let cli = parse_from([
            "wikigit",
            "DOC",
            "--base",
            "https://wiki.example.com",
            "--user",
            "jane",
            "--progress",
            "-vv",
        ]);
        assert_eq!(cli.space.as_deref(), Some("DOC"));
        assert_eq!(cli.base.as_deref(), Some("https://wiki.example.com"));
        assert!(cli.progress);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn space_is_optional() {
        let cli = parse_from(["wikigit"]);
        assert!(cli.space.is_none());
    }
}
