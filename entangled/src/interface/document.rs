//! Tangle, stitch and sync pipelines.
//!
//! Each pipeline loads every input document into one shared reference
//! map, stages its mutations on a transaction, and commits. Stitch and
//! tangle may share a transaction (`sync`): the stitched reference map
//! feeds the tangler directly, so the updated markdown never has to be
//! re-read from disk.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::errors::Result;
use crate::input_stream::InputStream;
use crate::io::{CommitReport, Transaction, TransactionMode};
use crate::model::{tangle_target, ReferenceId, ReferenceMap};
use crate::readers::{parse_markdown, read_code, ParsedDocument, RawBlock};

use super::context::Context;

/// A loaded input document with its effective configuration.
#[derive(Debug, Clone)]
pub struct Document {
    /// The parsed token stream.
    pub parsed: ParsedDocument,
    /// Project configuration with the document's YAML override applied.
    pub config: Config,
}

/// All loaded documents and the shared reference map.
#[derive(Debug, Clone, Default)]
pub struct Project {
    /// Documents in input order.
    pub documents: Vec<Document>,
    /// Blocks of every document, in document order.
    pub refs: ReferenceMap,
}

impl Project {
    /// Loads every input file of the context.
    ///
    /// Each loaded source is recorded on the transaction, so stitch
    /// writes to it classify as in-sync.
    pub fn load(ctx: &Context, tx: &mut Transaction) -> Result<Self> {
        let mut project = Project::default();
        for path in ctx.input_files()? {
            tx.record_stat(&path)?;
            let text = ctx.fs.read(&path)?;
            let parsed = parse_markdown(&path, &text, &mut project.refs)?;
            let config = match parsed.config_update.clone() {
                Some(update) => update.merge(&ctx.config),
                None => ctx.config.clone(),
            };
            project.documents.push(Document { parsed, config });
        }
        Ok(project)
    }

    /// Effective configuration of the document at `source`.
    fn config_for(&self, source: &Path) -> Option<&Config> {
        self.documents
            .iter()
            .find(|d| d.parsed.path.as_path() == source)
            .map(|d| &d.config)
    }

    /// Stages a write for every declared target.
    pub fn stage_tangle(&self, tx: &mut Transaction) -> Result<()> {
        for (target, init_id) in self.refs.targets() {
            let config = self.config_for(&init_id.source).ok_or_else(|| {
                crate::errors::EntangledError::Internal(format!(
                    "target `{}` declared by unloaded document `{}`",
                    target.display(),
                    init_id.source.display()
                ))
            })?;

            let comment = if config.annotation.has_markers() {
                let language = self.refs.get(init_id).and_then(|b| b.language.clone());
                Some(
                    language
                        .and_then(|l| config.find_language(&l))
                        .map(|l| l.comment)
                        .unwrap_or_default(),
                )
            } else {
                None
            };

            let content = tangle_target(&self.refs, target, comment.as_ref())?;
            tx.create_target(target.clone(), content);
        }
        Ok(())
    }

    /// Back-reads edited targets and stages markdown updates.
    ///
    /// Edits are folded into the reference map first; a document is then
    /// re-rendered and staged only when its text actually changed. The
    /// stat of every back-read target is recorded: its edits are
    /// absorbed and no longer count as out-of-band.
    pub fn stage_stitch(&mut self, ctx: &Context, tx: &mut Transaction) -> Result<()> {
        let targets: Vec<(PathBuf, ReferenceId)> = self
            .refs
            .targets()
            .map(|(p, id)| (p.clone(), id.clone()))
            .collect();

        for (target, init_id) in &targets {
            let annotated = self
                .config_for(&init_id.source)
                .map(|c| c.annotation.has_markers())
                .unwrap_or(false);
            if !annotated || !ctx.fs.exists(target) {
                continue;
            }

            let text = ctx.fs.read(target)?;
            let mut input = InputStream::new(target, &text);
            for raw in read_code(&mut input)? {
                let RawBlock { ref_id, content } = raw;
                let changed = match self.refs.get(&ref_id) {
                    Some(block) => block.source != content,
                    None => {
                        tracing::warn!(
                            "`{}` refers to unknown block {}",
                            target.display(),
                            ref_id
                        );
                        false
                    }
                };
                if changed {
                    tracing::info!("block {} edited in `{}`", ref_id, target.display());
                    self.refs.set_content(&ref_id, content);
                }
            }

            tx.record_stat(target)?;
        }

        for doc in &self.documents {
            let rendered = doc.parsed.render(&self.refs);
            let original = ctx.fs.read(&doc.parsed.path)?;
            if rendered != original {
                tx.write(doc.parsed.path.clone(), rendered);
            }
        }
        Ok(())
    }
}

/// Runs the tangle pipeline: markdown in, code files out.
pub fn tangle(ctx: &Context, mode: TransactionMode) -> Result<CommitReport> {
    let mut tx = Transaction::open(ctx.fs.clone(), mode)?;
    let project = Project::load(ctx, &mut tx)?;
    project.stage_tangle(&mut tx)?;
    tx.clear_orphans();
    let report = tx.commit()?;

    if mode != TransactionMode::Show {
        for hook in &ctx.hooks {
            hook.post_tangle(&project.refs, &*ctx.fs)?;
        }
    }
    Ok(report)
}

/// Runs the stitch pipeline: edited code files back into markdown.
pub fn stitch(ctx: &Context, mode: TransactionMode) -> Result<CommitReport> {
    let mut tx = Transaction::open(ctx.fs.clone(), mode)?;
    let mut project = Project::load(ctx, &mut tx)?;
    project.stage_stitch(ctx, &mut tx)?;
    tx.commit()
}

/// Runs stitch then tangle in one transaction.
pub fn sync(ctx: &Context, mode: TransactionMode) -> Result<CommitReport> {
    let mut tx = Transaction::open(ctx.fs.clone(), mode)?;
    let mut project = Project::load(ctx, &mut tx)?;
    project.stage_stitch(ctx, &mut tx)?;
    project.stage_tangle(&mut tx)?;
    tx.clear_orphans();
    let report = tx.commit()?;

    if mode != TransactionMode::Show {
        for hook in &ctx.hooks {
            hook.post_tangle(&project.refs, &*ctx.fs)?;
        }
    }
    Ok(report)
}
