//! One mirror run: scan → plan → reconcile → replay.
//!
//! The unit of resumability is one committed event. An interrupted run
//! loses only uncommitted in-memory state; the next run rebuilds the old
//! snapshot from disk and resumes from the head commit's timestamp.

use tracing::info;

use crate::Result;
use crate::convert::Converter;
use crate::git::CommitWriter;
use crate::plan;
use crate::reconcile;
use crate::remote::Remote;
use crate::replay::Replayer;
use crate::scan;

pub struct MirrorOptions {
    /// Base link of the wiki, e.g. `https://wiki.example.com`.
    pub base: String,
    /// Space to mirror.
    pub space: String,
    /// Print per-event progress.
    pub progress: bool,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub moved: usize,
    pub deleted: usize,
    pub commits: usize,
    pub renames: usize,
    pub new_pages: usize,
}

/// Mirror one space into the repository behind `git`.
pub fn run(
    api: &dyn Remote,
    converter: &dyn Converter,
    git: &CommitWriter,
    opts: &MirrorOptions,
) -> Result<RunSummary> {
    git.backup_head()?;
    let checkpoint = git.head_info()?.map(|head| head.at);

    let (mut old, mut titles) = scan::scan_workdir(git.workdir())?;
    info!(
        pages = old.len(),
        checkpoint = ?checkpoint,
        "recovered snapshot from working directory"
    );

    let mail_domain = host_of(&opts.base);
    let plan = plan::build(api, &opts.space, &old, checkpoint, &mail_domain)?;

    let pass = reconcile::reconcile_pass(&mut old, &plan.tree, &titles, git, &mail_domain)?;

    let replayer = Replayer {
        api,
        converter,
        git,
        base: &opts.base,
        mail_domain: &mail_domain,
        progress: opts.progress,
    };
    let outcome = replayer.replay(&mut old, &mut titles, &plan)?;

    Ok(RunSummary {
        moved: pass.moved + outcome.moved,
        deleted: pass.deleted + outcome.deleted,
        commits: outcome.commits,
        renames: outcome.renames,
        new_pages: outcome.new_pages,
    })
}

/// Host component of the base link, for synthesized mail addresses.
pub fn host_of(base: &str) -> String {
    let rest = base.split_once("://").map_or(base, |(_, rest)| rest);
    rest.split('/').next().unwrap_or(rest).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_of_strips_scheme_and_path() {
        assert_eq!(host_of("https://wiki.example.com/extra"), "wiki.example.com");
        assert_eq!(host_of("wiki.example.com"), "wiki.example.com");
    }
}
