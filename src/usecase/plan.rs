use std::str::FromStr;
use thiserror::Error;

/// Separator between title and url in an add token.
pub const TITLE_URL_SEPARATOR: &str = "::";

/// A bookmark to add, parsed from `TITLE::URL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkSpec {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("expected TITLE::URL, got {0:?}")]
pub struct MalformedBookmarkSpec(pub String);

impl FromStr for BookmarkSpec {
    type Err = MalformedBookmarkSpec;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        // Split on the first separator; the url may contain `::` itself.
        let (title, url) = token
            .split_once(TITLE_URL_SEPARATOR)
            .ok_or_else(|| MalformedBookmarkSpec(token.to_string()))?;

        Ok(Self {
            title: title.to_string(),
            url: url.to_string(),
        })
    }
}

/// Operations for one run. Applied as: clear, then removals, then additions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditPlan {
    pub remove_all: bool,
    pub remove: Vec<String>,
    pub add: Vec<BookmarkSpec>,
}

impl EditPlan {
    pub fn is_empty(&self) -> bool {
        !self.remove_all && self.remove.is_empty() && self.add.is_empty()
    }
}
