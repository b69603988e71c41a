use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, TryRecvError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::data::{self, ImageSource};
use crate::state::{Action, GridImage};

#[derive(Debug, Clone, Copy, Default)]
pub struct LoaderOptions {
    /// Fixed seed for the shuffle; `None` draws from the thread RNG.
    pub shuffle_seed: Option<u64>,
}

/// The one-shot image pipeline: fetch the catalog, shuffle it, and hand the
/// result back as an action. Runs on its own thread; the owner polls.
pub struct ImageLoader {
    rx: Receiver<Result<Vec<GridImage>>>,
    finished: bool,
}

impl ImageLoader {
    pub fn spawn(source: Arc<dyn ImageSource>, options: LoaderOptions) -> Self {
        let (tx, rx) = bounded(1);
        thread::spawn(move || {
            let result = source.load_images().map(|images| match options.shuffle_seed {
                Some(seed) => data::shuffled(&images, &mut StdRng::seed_from_u64(seed)),
                None => data::shuffled(&images, &mut rand::thread_rng()),
            });
            let _ = tx.send(result);
        });
        Self {
            rx,
            finished: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Non-blocking. Yields the action to dispatch exactly once, when the
    /// worker has finished; `None` before that and forever after.
    pub fn try_complete(&mut self) -> Option<Action> {
        if self.finished {
            return None;
        }
        match self.rx.try_recv() {
            Ok(result) => Some(self.finish(result)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(self.finish_disconnected()),
        }
    }

    /// Like [`try_complete`](Self::try_complete) but waits up to `timeout`.
    pub fn wait(&mut self, timeout: Duration) -> Option<Action> {
        if self.finished {
            return None;
        }
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Some(self.finish(result)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(self.finish_disconnected()),
        }
    }

    fn finish(&mut self, result: Result<Vec<GridImage>>) -> Action {
        self.finished = true;
        match result {
            Ok(images) => {
                info!(count = images.len(), "catalog loaded");
                Action::InitGridImages { images }
            }
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(error = %reason, "catalog load failed");
                Action::CatalogFailed { reason }
            }
        }
    }

    fn finish_disconnected(&mut self) -> Action {
        self.finished = true;
        warn!("catalog loader exited without a result");
        Action::CatalogFailed {
            reason: "catalog loader exited without a result".into(),
        }
    }
}
