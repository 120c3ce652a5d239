use crate::domain::encoding::Encoding;
use crate::domain::error::StoreResult;
use crate::domain::model::BookmarkStore;
use crate::domain::traits::FormatConverter;
use crate::infrastructure::locator::{find_unique, is_file, StoreLocation};
use crate::infrastructure::plist_codec::write_xml_store;
use crate::usecase::emit;
use crate::usecase::event::AppEvent;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedStore {
    pub path: PathBuf,
    /// The store did not exist and the default skeleton was written.
    pub created: bool,
}

/// Writes the default skeleton to `path` in binary form.
///
/// Failing to create the file is fatal. A failed binary conversion only
/// leaves the skeleton as XML, which Safari reads as well.
pub async fn synthesize_default<C: FormatConverter>(path: &Path, converter: &C) -> StoreResult<()> {
    write_xml_store(path, &BookmarkStore::default_skeleton()).await?;

    if let Err(e) = converter.convert(path, Encoding::Binary).await {
        warn!(path = %path.display(), error = %e, "leaving generated store as XML");
    }
    Ok(())
}

pub async fn locate_store<C: FormatConverter>(
    location: &StoreLocation,
    converter: &C,
    sink: &Option<mpsc::Sender<AppEvent>>,
) -> StoreResult<LocatedStore> {
    let located = match location {
        StoreLocation::Fixed(path) => {
            if is_file(path).await {
                LocatedStore {
                    path: path.clone(),
                    created: false,
                }
            } else {
                info!(path = %path.display(), "bookmark store doesn't exist, generating a new one");
                synthesize_default(path, converter).await?;
                emit(
                    sink,
                    AppEvent::StoreCreated {
                        path: path.display().to_string(),
                    },
                )
                .await;
                LocatedStore {
                    path: path.clone(),
                    created: true,
                }
            }
        }
        StoreLocation::Search { root, file_name } => LocatedStore {
            path: find_unique(root, file_name).await?,
            created: false,
        },
    };

    info!(path = %located.path.display(), "using bookmark store");
    emit(
        sink,
        AppEvent::StoreLocated {
            path: located.path.display().to_string(),
        },
    )
    .await;
    Ok(located)
}
