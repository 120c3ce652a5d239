use crate::domain::encoding::{Encoding, LoadOutcome};
use crate::usecase::stats::EditStats;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    PhaseStarted {
        name: String,
    },
    PhaseFinished {
        name: String,
    },

    StoreLocated {
        path: String,
    },
    StoreCreated {
        path: String,
    },
    BackupCreated {
        path: String,
    },

    StoreLoaded {
        outcome: LoadOutcome,
    },
    StoreRecovered {
        path: String,
        reason: String,
    },

    BookmarksCleared {
        titles: Vec<String>,
    },
    BookmarkRemoved {
        title: String,
    },
    TitleNotFound {
        title: String,
    },
    BookmarkAdded {
        title: String,
        url: String,
    },
    DuplicateSkipped {
        title: String,
    },

    StorePersisted {
        path: String,
        encoding: Encoding,
    },

    Finished {
        stats: EditStats,
    },
}
