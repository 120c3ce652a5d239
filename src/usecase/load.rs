use crate::domain::encoding::{Encoding, LoadOutcome};
use crate::domain::error::StoreResult;
use crate::domain::model::BookmarkStore;
use crate::domain::traits::FormatConverter;
use crate::infrastructure::plist_codec::{parse_xml_store, read_store_bytes};
use crate::usecase::emit;
use crate::usecase::event::AppEvent;
use crate::usecase::locate::synthesize_default;
use std::path::Path;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Loads the store, converting or regenerating the file in place when needed.
///
/// 1. parse as XML;
/// 2. otherwise convert the file to XML and parse again;
/// 3. otherwise replace it with the default skeleton.
///
/// I/O failures on the location itself are returned; content failures are not.
pub async fn load_store<C: FormatConverter>(
    path: &Path,
    converter: &C,
    sink: &Option<mpsc::Sender<AppEvent>>,
) -> StoreResult<(BookmarkStore, LoadOutcome)> {
    let result = load_or_recover(path, converter, sink).await;
    if let Ok((_, outcome)) = &result {
        emit(sink, AppEvent::StoreLoaded { outcome: *outcome }).await;
    }
    result
}

async fn load_or_recover<C: FormatConverter>(
    path: &Path,
    converter: &C,
    sink: &Option<mpsc::Sender<AppEvent>>,
) -> StoreResult<(BookmarkStore, LoadOutcome)> {
    let bytes = read_store_bytes(path).await?;
    let first = match parse_xml_store(&bytes) {
        Ok(store) => return Ok((store, LoadOutcome::Text)),
        Err(e) => e,
    };
    debug!(
        path = %path.display(),
        detected = %Encoding::sniff(&bytes),
        error = %first,
        "store is not readable as XML, converting"
    );

    let reason = match reparse_as_xml(path, converter).await {
        Ok(store) => return Ok((store, LoadOutcome::ConvertedFromBinary)),
        Err(e) if e.is_recoverable() => e,
        Err(e) => return Err(e),
    };

    warn!(
        path = %path.display(),
        reason = %reason,
        "bookmark store appears to be corrupted, generating a new one"
    );
    emit(
        sink,
        AppEvent::StoreRecovered {
            path: path.display().to_string(),
            reason: reason.to_string(),
        },
    )
    .await;

    synthesize_default(path, converter).await?;
    let store = reparse_as_xml(path, converter).await?;
    Ok((store, LoadOutcome::RecoveredFromCorrupt))
}

async fn reparse_as_xml<C: FormatConverter>(path: &Path, converter: &C) -> StoreResult<BookmarkStore> {
    converter.convert(path, Encoding::Xml).await?;
    let bytes = read_store_bytes(path).await?;
    parse_xml_store(&bytes)
}
