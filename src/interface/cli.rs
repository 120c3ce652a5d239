use crate::infrastructure::event_ndjson::spawn_ndjson_printer;
use crate::infrastructure::locator::{default_search_root, well_known_store_path, StoreLocation};
use crate::interface::config::{load_config, Config, ConverterChoice};
use crate::usecase::edit::{edit_bookmarks, EditOptions};
use crate::usecase::event::AppEvent;
use crate::usecase::plan::{BookmarkSpec, EditPlan};
use anyhow::{anyhow, Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use std::env;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "safari-bookmark-editor",
    version,
    about = "Command line tool for adding and removing Safari bookmarks in the context of the currently logged in user."
)]
struct Cli {
    /// Double-colon separated title and url of bookmark(s) to add,
    /// e.g. --add MyWebsite::http://www.mywebsite.com Other::http://other.example
    #[arg(long, value_name = "TITLE::URL", num_args = 1..)]
    add: Vec<BookmarkSpec>,

    /// Title(s) of bookmark(s) to remove, e.g. --remove MyWebsite Other
    #[arg(long, value_name = "TITLE", num_args = 1..)]
    remove: Vec<String>,

    /// Remove all current bookmarks
    #[arg(long)]
    removeall: bool,

    /// Edit this store instead of ~/Library/Safari/Bookmarks.plist
    #[arg(long, value_name = "PATH", conflicts_with_all = ["search", "search_root"])]
    plist: Option<PathBuf>,

    /// Search ~/Library for exactly one bookmark store
    #[arg(long)]
    search: bool,

    /// Search this directory for exactly one bookmark store
    #[arg(long, value_name = "DIR")]
    search_root: Option<PathBuf>,

    /// Property list conversion backend
    #[arg(long, value_enum)]
    converter: Option<ConverterChoice>,

    /// Copy the store to <name>.bak.<millis> before editing it
    #[arg(long)]
    backup: bool,

    /// Write NDJSON progress events to stdout
    #[arg(long)]
    emit_events: bool,

    /// Configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

impl Cli {
    fn plan(&self) -> EditPlan {
        EditPlan {
            remove_all: self.removeall,
            remove: self.remove.clone(),
            add: self.add.clone(),
        }
    }

    fn location(&self, config: &Config) -> Result<StoreLocation> {
        let search = |root: PathBuf| StoreLocation::Search {
            root,
            file_name: config.store.file_name.clone(),
        };

        if let Some(path) = &self.plist {
            return Ok(StoreLocation::Fixed(path.clone()));
        }
        if let Some(root) = &self.search_root {
            return Ok(search(root.clone()));
        }
        if self.search {
            let root = config
                .store
                .search_root
                .clone()
                .or_else(default_search_root)
                .context("cannot determine the home directory to search")?;
            return Ok(search(root));
        }
        if let Some(path) = &config.store.path {
            return Ok(StoreLocation::Fixed(path.clone()));
        }
        if let Some(root) = &config.store.search_root {
            return Ok(search(root.clone()));
        }

        well_known_store_path()
            .map(StoreLocation::Fixed)
            .context("cannot determine the home directory holding Safari bookmarks")
    }
}

pub async fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    run_with_args(&args).await
}

pub async fn run_with_args(args: &[String]) -> Result<()> {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{e}");
            return Ok(());
        }
        Err(e) => return Err(anyhow!(e.to_string())),
    };

    let config = load_config(cli.config.as_deref())?;
    let location = cli.location(&config)?;
    let converter = cli.converter.unwrap_or(config.conversion.converter).build();
    let options = EditOptions {
        backup: cli.backup || config.store.backup,
    };

    let (tx, rx) = mpsc::channel::<AppEvent>(1024);
    let printer = if cli.emit_events {
        Some(spawn_ndjson_printer(rx))
    } else {
        drop(rx);
        None
    };

    let result = edit_bookmarks(&location, &converter, &cli.plan(), options, Some(tx)).await;

    if let Some(handle) = printer {
        handle.await.ok();
    }

    let report = result?;
    info!(
        path = %report.path.display(),
        encoding = %report.written_as,
        cleared = report.stats.cleared,
        removed = report.stats.removed,
        not_found = report.stats.not_found,
        added = report.stats.added,
        duplicates_skipped = report.stats.duplicates_skipped,
        "done"
    );
    Ok(())
}
