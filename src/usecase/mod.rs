//! Usecase layer: application workflows + events.

pub mod edit;
pub mod event;
pub mod load;
pub mod locate;
pub mod persist;
pub mod plan;
pub mod stats;

use crate::usecase::event::AppEvent;
use tokio::sync::mpsc;

pub(crate) async fn emit(sink: &Option<mpsc::Sender<AppEvent>>, ev: AppEvent) {
    if let Some(tx) = sink {
        let _ = tx.send(ev).await;
    }
}
