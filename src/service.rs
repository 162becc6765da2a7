//! Worker-thread export service that serializes requests from any thread

use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use tokio::sync::oneshot;

use crate::document::DocumentAssembler;
use crate::export::{ExportOutcome, ExportRequest, ExportStatus, Exporter};
use crate::rendering::Rasterizer;
use crate::tree::StyleTree;
use crate::{Error, Result};

enum Command {
    Export(Box<StyleTree>, ExportRequest, oneshot::Sender<Result<ExportOutcome>>),
    Close(oneshot::Sender<Result<()>>),
}

/// An async-friendly export handle backed by a dedicated worker thread.
///
/// The worker owns the [`Exporter`] (and with it the color normalizer,
/// which must stay on one thread) and runs exports one at a time in the
/// order they were requested. Clones of the handle share the same worker.
#[derive(Clone)]
pub struct ExportService {
    cmd_tx: Sender<Command>,
    status: Arc<Mutex<ExportStatus>>,
}

impl ExportService {
    /// Spawn the worker and build the exporter on it with `factory`.
    pub async fn new<R, D, F>(factory: F) -> Result<Self>
    where
        R: Rasterizer + 'static,
        D: DocumentAssembler + 'static,
        F: FnOnce() -> Result<Exporter<R, D>> + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx) = oneshot::channel::<Result<()>>();
        let status = Arc::new(Mutex::new(ExportStatus::Idle));
        let shared = status.clone();

        thread::spawn(move || {
            let mut exporter = match factory() {
                Ok(e) => e,
                Err(err) => {
                    let _ = init_tx.send(Err(err));
                    return;
                }
            };
            exporter.on_status(move |s| {
                if let Ok(mut slot) = shared.lock() {
                    *slot = s;
                }
            });
            let _ = init_tx.send(Ok(()));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    Command::Export(tree, request, resp) => {
                        let res = futures::executor::block_on(exporter.export(&tree, &request));
                        let _ = resp.send(res);
                    }
                    Command::Close(resp) => {
                        let _ = resp.send(Ok(()));
                        break;
                    }
                }
            }
            log::debug!("Export worker stopped");
        });

        init_rx
            .await
            .map_err(|e| Error::Other(format!("Worker init canceled: {}", e)))??;

        Ok(Self { cmd_tx, status })
    }

    /// Queue an export of `tree` and wait for its outcome.
    pub async fn export(&self, tree: StyleTree, request: ExportRequest) -> Result<ExportOutcome> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Export(Box::new(tree), request, tx))
            .map_err(|_| Error::Other("Export worker has shut down".into()))?;
        rx.await
            .map_err(|e| Error::Other(format!("Export canceled: {}", e)))?
    }

    /// Current status of the worker's exporter.
    pub fn status(&self) -> ExportStatus {
        match self.status.lock() {
            Ok(s) => *s,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Stop the worker after any exports already queued.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Close(tx))
            .map_err(|_| Error::Other("Export worker has shut down".into()))?;
        rx.await
            .map_err(|e| Error::Other(format!("Close canceled: {}", e)))?
    }
}
