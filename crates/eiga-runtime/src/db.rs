use std::path::Path;

use tokio::sync::{mpsc, oneshot};

use eiga_core::classify::Thresholds;
use eiga_core::error::EigaError;
use eiga_core::models::CatalogEntry;
use eiga_core::storage::Storage;

/// Async handle to the SQLite store.
///
/// The connection lives on a dedicated actor thread; commands cross over
/// an unbounded channel and answers come back on oneshot channels, so the
/// async executor never blocks on database work.
#[derive(Clone)]
pub struct DbHandle {
    tx: mpsc::UnboundedSender<DbCommand>,
}

enum DbCommand {
    InsertMovie {
        title: String,
        year: String,
        file_ref: String,
        reply: oneshot::Sender<Result<i64, EigaError>>,
    },
    FindMovie {
        query: String,
        reply: oneshot::Sender<Result<Option<CatalogEntry>, EigaError>>,
    },
    MovieCount {
        reply: oneshot::Sender<Result<i64, EigaError>>,
    },
    AddJunkWord {
        word: String,
        reply: oneshot::Sender<Result<(), EigaError>>,
    },
    RemoveJunkWord {
        word: String,
        reply: oneshot::Sender<Result<usize, EigaError>>,
    },
    ListJunkWords {
        reply: oneshot::Sender<Result<Vec<String>, EigaError>>,
    },
    LoadThresholds {
        defaults: Thresholds,
        reply: oneshot::Sender<Result<Thresholds, EigaError>>,
    },
    SaveThresholds {
        thresholds: Thresholds,
        reply: oneshot::Sender<Result<(), EigaError>>,
    },
}

impl DbHandle {
    /// Open the database at the given path and spawn the actor thread.
    pub fn open(path: &Path) -> Option<Self> {
        let storage = Storage::open(path)
            .map_err(|e| tracing::error!("Failed to open database: {e}"))
            .ok()?;
        Self::spawn(storage)
    }

    /// In-memory database (for tests).
    pub fn open_memory() -> Option<Self> {
        let storage = Storage::open_memory()
            .map_err(|e| tracing::error!("Failed to open database: {e}"))
            .ok()?;
        Self::spawn(storage)
    }

    fn spawn(storage: Storage) -> Option<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::Builder::new()
            .name("db-actor".into())
            .spawn(move || actor_loop(storage, rx))
            .map_err(|e| tracing::error!("Failed to spawn DB thread: {e}"))
            .ok()?;

        Some(Self { tx })
    }

    pub async fn insert_movie(
        &self,
        title: String,
        year: String,
        file_ref: String,
    ) -> Result<i64, EigaError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::InsertMovie {
            title,
            year,
            file_ref,
            reply,
        });
        rx.await
            .unwrap_or_else(|_| Err(EigaError::Config("DB actor closed".into())))
    }

    pub async fn find_movie(&self, query: String) -> Result<Option<CatalogEntry>, EigaError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::FindMovie { query, reply });
        rx.await
            .unwrap_or_else(|_| Err(EigaError::Config("DB actor closed".into())))
    }

    pub async fn movie_count(&self) -> Result<i64, EigaError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::MovieCount { reply });
        rx.await
            .unwrap_or_else(|_| Err(EigaError::Config("DB actor closed".into())))
    }

    pub async fn add_junk_word(&self, word: String) -> Result<(), EigaError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::AddJunkWord { word, reply });
        rx.await
            .unwrap_or_else(|_| Err(EigaError::Config("DB actor closed".into())))
    }

    pub async fn remove_junk_word(&self, word: String) -> Result<usize, EigaError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::RemoveJunkWord { word, reply });
        rx.await
            .unwrap_or_else(|_| Err(EigaError::Config("DB actor closed".into())))
    }

    pub async fn list_junk_words(&self) -> Result<Vec<String>, EigaError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::ListJunkWords { reply });
        rx.await
            .unwrap_or_else(|_| Err(EigaError::Config("DB actor closed".into())))
    }

    pub async fn load_thresholds(&self, defaults: Thresholds) -> Result<Thresholds, EigaError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::LoadThresholds { defaults, reply });
        rx.await
            .unwrap_or_else(|_| Err(EigaError::Config("DB actor closed".into())))
    }

    pub async fn save_thresholds(&self, thresholds: Thresholds) -> Result<(), EigaError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::SaveThresholds { thresholds, reply });
        rx.await
            .unwrap_or_else(|_| Err(EigaError::Config("DB actor closed".into())))
    }
}

fn actor_loop(storage: Storage, mut rx: mpsc::UnboundedReceiver<DbCommand>) {
    while let Some(cmd) = rx.blocking_recv() {
        match cmd {
            DbCommand::InsertMovie {
                title,
                year,
                file_ref,
                reply,
            } => {
                let _ = reply.send(storage.insert_movie(&title, &year, &file_ref));
            }
            DbCommand::FindMovie { query, reply } => {
                let _ = reply.send(storage.find_movie(&query));
            }
            DbCommand::MovieCount { reply } => {
                let _ = reply.send(storage.movie_count());
            }
            DbCommand::AddJunkWord { word, reply } => {
                let _ = reply.send(storage.add_junk_word(&word));
            }
            DbCommand::RemoveJunkWord { word, reply } => {
                let _ = reply.send(storage.remove_junk_word(&word));
            }
            DbCommand::ListJunkWords { reply } => {
                let _ = reply.send(storage.junk_words());
            }
            DbCommand::LoadThresholds { defaults, reply } => {
                let _ = reply.send(storage.load_thresholds(defaults));
            }
            DbCommand::SaveThresholds { thresholds, reply } => {
                let _ = reply.send(storage.save_thresholds(&thresholds));
            }
        }
    }
}
