use crate::domain::encoding::Encoding;
use crate::domain::error::StoreResult;
use crate::domain::model::BookmarkStore;
use crate::domain::traits::FormatConverter;
use crate::infrastructure::plist_codec::write_xml_store;
use std::path::Path;
use tracing::debug;

/// Writes the store as XML, then converts the file on disk when `encoding` is binary.
pub async fn persist_store<C: FormatConverter>(
    store: &BookmarkStore,
    path: &Path,
    encoding: Encoding,
    converter: &C,
) -> StoreResult<()> {
    debug!(path = %path.display(), "writing store as XML");
    write_xml_store(path, store).await?;

    if encoding == Encoding::Binary {
        debug!(path = %path.display(), "converting store back to binary");
        converter.convert(path, Encoding::Binary).await?;
    }
    Ok(())
}
