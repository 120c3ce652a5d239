use crate::domain::encoding::{Encoding, LoadOutcome};
use crate::domain::model::{AddOutcome, BookmarkStore, Node, RemoveOutcome};
use crate::domain::traits::FormatConverter;
use crate::infrastructure::backup::create_timestamped_backup;
use crate::infrastructure::locator::StoreLocation;
use crate::usecase::emit;
use crate::usecase::event::AppEvent;
use crate::usecase::load::load_store;
use crate::usecase::locate::locate_store;
use crate::usecase::persist::persist_store;
use crate::usecase::plan::EditPlan;
use crate::usecase::stats::EditStats;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::info;

#[derive(Debug, Clone, Copy, Default)]
pub struct EditOptions {
    /// Copy an existing store aside before it is touched.
    pub backup: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditReport {
    pub path: PathBuf,
    pub created: bool,
    pub backup: Option<PathBuf>,
    pub outcome: LoadOutcome,
    pub written_as: Encoding,
    pub stats: EditStats,
}

/// One full run: locate, load, apply the plan, write back once.
pub async fn edit_bookmarks<C: FormatConverter>(
    location: &StoreLocation,
    converter: &C,
    plan: &EditPlan,
    options: EditOptions,
    sink: Option<mpsc::Sender<AppEvent>>,
) -> Result<EditReport> {
    phase_started(&sink, "locate").await;
    let located = locate_store(location, converter, &sink)
        .await
        .context("locating bookmark store")?;

    let backup = if options.backup && !located.created {
        let backup = create_timestamped_backup(&located.path)
            .await
            .with_context(|| format!("creating backup for: {}", located.path.display()))?;
        info!(backup = %backup.display(), "backed up bookmark store");
        emit(
            &sink,
            AppEvent::BackupCreated {
                path: backup.display().to_string(),
            },
        )
        .await;
        Some(backup)
    } else {
        None
    };
    phase_finished(&sink, "locate").await;

    phase_started(&sink, "load").await;
    let (mut store, outcome) = load_store(&located.path, converter, &sink)
        .await
        .with_context(|| format!("reading bookmark store: {}", located.path.display()))?;
    phase_finished(&sink, "load").await;

    phase_started(&sink, "apply").await;
    let stats = apply_plan(&mut store, plan, &sink).await;
    phase_finished(&sink, "apply").await;

    phase_started(&sink, "persist").await;
    let written_as = outcome.write_back_encoding();
    info!(path = %located.path.display(), encoding = %written_as, "writing bookmark store");
    persist_store(&store, &located.path, written_as, converter)
        .await
        .with_context(|| format!("writing bookmark store: {}", located.path.display()))?;
    emit(
        &sink,
        AppEvent::StorePersisted {
            path: located.path.display().to_string(),
            encoding: written_as,
        },
    )
    .await;
    phase_finished(&sink, "persist").await;

    emit(
        &sink,
        AppEvent::Finished {
            stats: stats.clone(),
        },
    )
    .await;

    Ok(EditReport {
        path: located.path,
        created: located.created,
        backup,
        outcome,
        written_as,
        stats,
    })
}

/// Applies clear, then removals, then additions. Skips are reported, never fatal.
pub async fn apply_plan(
    store: &mut BookmarkStore,
    plan: &EditPlan,
    sink: &Option<mpsc::Sender<AppEvent>>,
) -> EditStats {
    let mut stats = EditStats::default();
    if plan.is_empty() {
        info!("nothing to add or remove, rewriting store as is");
    }

    if plan.remove_all {
        info!("removing all bookmarks");
        let removed = store.remove_all();
        for node in &removed {
            info!(title = node.title(), "removed bookmark");
        }
        stats.cleared = removed.len();
        emit(
            sink,
            AppEvent::BookmarksCleared {
                titles: removed.iter().map(Node::title).map(str::to_string).collect(),
            },
        )
        .await;
    }

    for title in &plan.remove {
        match store.remove(title) {
            RemoveOutcome::Removed => {
                info!(title = %title, "bookmark found and removed");
                stats.removed += 1;
                emit(sink, AppEvent::BookmarkRemoved { title: title.clone() }).await;
            }
            RemoveOutcome::NotFound => {
                info!(title = %title, "could not find bookmark, skipping");
                stats.not_found += 1;
                emit(sink, AppEvent::TitleNotFound { title: title.clone() }).await;
            }
        }
    }

    for spec in &plan.add {
        match store.add(&spec.title, &spec.url) {
            AddOutcome::Added => {
                info!(title = %spec.title, url = %spec.url, "added bookmark");
                stats.added += 1;
                emit(
                    sink,
                    AppEvent::BookmarkAdded {
                        title: spec.title.clone(),
                        url: spec.url.clone(),
                    },
                )
                .await;
            }
            AddOutcome::DuplicateSkipped => {
                info!(title = %spec.title, "found preexisting bookmark, skipping");
                stats.duplicates_skipped += 1;
                emit(
                    sink,
                    AppEvent::DuplicateSkipped {
                        title: spec.title.clone(),
                    },
                )
                .await;
            }
        }
    }

    stats
}

async fn phase_started(sink: &Option<mpsc::Sender<AppEvent>>, name: &str) {
    emit(sink, AppEvent::PhaseStarted { name: name.into() }).await;
}

async fn phase_finished(sink: &Option<mpsc::Sender<AppEvent>>, name: &str) {
    emit(sink, AppEvent::PhaseFinished { name: name.into() }).await;
}
