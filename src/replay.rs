//! Chronological history replay: one commit per version event.
//!
//! Timestamps ascend globally; within a timestamp, discovery order holds.
//! Replay interleaves with reconciliation: the moment a brand-new page is
//! committed, a full reconcile pass runs so any move blocked on that page's
//! existence resolves before the next event.

use std::fs;

use tracing::{debug, info, warn};

use crate::Result;
use crate::convert::{Converter, with_source_footer};
use crate::core::{PageId, PageTree, Parent, TitleMap, path as page_path, sanitize_title};
use crate::git::{CommitIdentity, CommitWriter};
use crate::plan::RemotePlan;
use crate::reconcile;
use crate::remote::Remote;

#[derive(Debug, Default)]
pub struct ReplayOutcome {
    pub commits: usize,
    pub renames: usize,
    pub new_pages: usize,
    /// Mutations applied by replay-triggered reconcile passes.
    pub moved: usize,
    pub deleted: usize,
}

pub struct Replayer<'a> {
    pub api: &'a dyn Remote,
    pub converter: &'a dyn Converter,
    pub git: &'a CommitWriter,
    /// Base link of the wiki, for canonical page URLs.
    pub base: &'a str,
    /// Mail domain for synthesized identities.
    pub mail_domain: &'a str,
    /// Print per-event progress to stderr.
    pub progress: bool,
}

impl Replayer<'_> {
    /// Replay `plan.history` oldest-first, mutating `old` and `titles` in
    /// lockstep with the working tree and the commit chain.
    pub fn replay(
        &self,
        old: &mut PageTree,
        titles: &mut TitleMap,
        plan: &RemotePlan,
    ) -> Result<ReplayOutcome> {
        let total = plan.history.len();
        let mut outcome = ReplayOutcome::default();

        // Titles must cover every page a path lookup can touch, including
        // new-snapshot ancestors that have not been spliced yet. Disk
        // titles win over first-seen remote titles.
        for (id, title) in &plan.titles {
            titles.entry(id.clone()).or_insert_with(|| title.clone());
        }

        for (done, event) in plan.history.iter().enumerate() {
            if self.progress {
                eprintln!(
                    "[{}/{total}] page {} v{}",
                    done + 1,
                    event.page,
                    event.number
                );
            }

            // A page seen for the first time this run is spliced in under
            // its new-snapshot parent. Provisional: a later reconcile pass
            // corrects placement if needed.
            let inserted_new = !old.contains_key(&event.page);
            if inserted_new {
                let parent = plan
                    .tree
                    .get(&event.page)
                    .cloned()
                    .unwrap_or(Parent::Root);
                old.insert(event.page.clone(), parent);
                outcome.new_pages += 1;
            }

            // The exact content of this version, never the live content.
            let content = self.api.content_at(&event.page, event.number)?;

            let title_now = sanitize_title(&content.title, &event.page);
            let title_changed = titles
                .get(&event.page)
                .is_some_and(|recorded| *recorded != title_now);
            if title_changed {
                self.rename(&event.page, title_now, old, &plan.tree, titles)?;
                outcome.renames += 1;
            }

            let canonical = format!("{}/pages/{}", self.base, event.page);
            let converted = self.converter.convert(content.markup(), &canonical)?;
            if converted.trim().is_empty() {
                warn!(
                    page = %event.page,
                    version = event.number,
                    "converted body is empty, committing footer only"
                );
            }
            let text = with_source_footer(&converted, &canonical);

            let page_rel = page_path::resolve(&event.page, old, titles, Some(&plan.tree))?;
            let doc_rel = page_path::doc_file(&page_rel);
            let doc_abs = self.git.workdir().join(&doc_rel);
            if let Some(dir) = doc_abs.parent() {
                fs::create_dir_all(dir)?;
            }
            fs::write(&doc_abs, text)?;
            self.git.stage(&doc_rel)?;

            let identity = CommitIdentity {
                name: event.author.name.clone(),
                email: event.author.email.clone(),
                at: event.at,
            };
            self.git.commit(&identity, &event.message)?;
            outcome.commits += 1;
            debug!(
                page = %event.page,
                version = event.number,
                path = %doc_rel.display(),
                "replayed"
            );

            if inserted_new {
                // The page now exists; deferred moves waiting on it can
                // complete before the next event lands.
                let pass =
                    reconcile::reconcile_pass(old, &plan.tree, titles, self.git, self.mail_domain)?;
                outcome.moved += pass.moved;
                outcome.deleted += pass.deleted;
            }
        }

        info!(
            commits = outcome.commits,
            renames = outcome.renames,
            new_pages = outcome.new_pages,
            "history replayed"
        );
        Ok(outcome)
    }

    /// In-place rename discovered from version content: move the document
    /// (and its child subdirectory) before the new content is written.
    fn rename(
        &self,
        id: &PageId,
        new_title: String,
        old: &PageTree,
        new_tree: &PageTree,
        titles: &mut TitleMap,
    ) -> Result<()> {
        let workdir = self.git.workdir();
        let src_rel = page_path::resolve(id, old, titles, Some(new_tree))?;
        titles.insert(id.clone(), new_title);
        let dst_rel = page_path::resolve(id, old, titles, Some(new_tree))?;

        let src_doc = page_path::doc_file(&src_rel);
        let dst_doc = page_path::doc_file(&dst_rel);
        if workdir.join(&src_doc).exists() {
            fs::rename(workdir.join(&src_doc), workdir.join(&dst_doc))?;
            self.git.stage_removal(&src_doc)?;
            self.git.stage(&dst_doc)?;
        }
        let src_dir = workdir.join(&src_rel);
        if src_dir.is_dir() {
            fs::rename(&src_dir, workdir.join(&dst_rel))?;
            self.git.stage_removal(&src_rel)?;
            self.git.stage_all(&dst_rel)?;
        }
        debug!(page = %id, from = %src_doc.display(), to = %dst_doc.display(), "renamed");
        Ok(())
    }
}
