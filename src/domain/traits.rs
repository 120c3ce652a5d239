use crate::domain::encoding::Encoding;
use crate::domain::error::StoreResult;
use std::path::Path;

/// Rewrites a property-list file in place into the requested encoding.
#[allow(async_fn_in_trait)]
pub trait FormatConverter {
    async fn convert(&self, path: &Path, target: Encoding) -> StoreResult<()>;
}
