//! Event-facing runtime: wires the cleaning, resolution, scoring, and
//! routing stages together and turns every outcome into a reply.

mod db;
pub mod events;
pub mod session;

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use eiga_api::traits::{MovieCandidate, TitleSearch};
use eiga_core::classify::{self, Classification, Thresholds};
use eiga_core::config::AppConfig;
use eiga_core::models::UNKNOWN_YEAR;
use eiga_core::{normalize, score};

pub use db::DbHandle;
use events::{
    FileUploadEvent, InteractiveAction, InteractiveActionEvent, Outbound, TextCommandEvent,
};
use session::ReviewSessions;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(String),
    #[error("database error: {0}")]
    Database(String),
}

const MSG_PROVIDER_UNAVAILABLE: &str =
    "The title search service is unavailable right now. Try again later.";
const MSG_NO_RESULTS: &str = "No results found for this file. Use rename to classify it manually.";
const MSG_LOW_CONFIDENCE: &str =
    "Could not confidently identify this file. Use rename to classify it manually.";
const MSG_EXPIRED: &str = "This prompt has expired. Upload the file again.";
const MSG_UNAUTHORIZED: &str = "You are not allowed to use this command.";
const MSG_IGNORED: &str = "Ignored. Nothing was saved.";
const MSG_RENAME_PROMPT: &str = "Reply with the correct title.";
const MSG_INTERNAL: &str = "Something went wrong. Try again later.";

/// The classification runtime, generic over the metadata provider.
///
/// Safe to share across concurrent event handlers: the database lives on
/// its own actor thread, thresholds sit behind a `RwLock` (changes apply
/// to subsequent classifications), and review sessions have their own
/// lock.
pub struct Runtime<P: TitleSearch> {
    db: DbHandle,
    provider: P,
    config: AppConfig,
    thresholds: Arc<RwLock<Thresholds>>,
    sessions: ReviewSessions,
}

impl<P: TitleSearch> Runtime<P> {
    /// Open the runtime against the default database path.
    pub async fn open(config: AppConfig, provider: P) -> Result<Self, RuntimeError> {
        let db_path =
            AppConfig::ensure_db_path().map_err(|e| RuntimeError::Config(e.to_string()))?;
        let db = DbHandle::open(&db_path)
            .ok_or_else(|| RuntimeError::Database("failed to open database".into()))?;
        Self::with_db(db, config, provider).await
    }

    /// Build the runtime on an existing database handle.
    ///
    /// Thresholds come from the settings table when persisted, else from
    /// the config defaults.
    pub async fn with_db(db: DbHandle, config: AppConfig, provider: P) -> Result<Self, RuntimeError> {
        let defaults = config
            .confidence
            .thresholds()
            .map_err(|e| RuntimeError::Config(e.to_string()))?;
        let thresholds = db
            .load_thresholds(defaults)
            .await
            .map_err(|e| RuntimeError::Database(e.to_string()))?;
        let ttl = std::time::Duration::from_secs(config.review.ttl_secs);

        Ok(Self {
            db,
            provider,
            config,
            thresholds: Arc::new(RwLock::new(thresholds)),
            sessions: ReviewSessions::new(ttl),
        })
    }

    /// Currently active thresholds.
    pub async fn current_thresholds(&self) -> Thresholds {
        *self.thresholds.read().await
    }

    // ── File uploads ────────────────────────────────────────────

    /// Run the classification pipeline for an uploaded file.
    ///
    /// Returns `None` for uploads from chats outside the allow-list.
    pub async fn handle_upload(&self, event: FileUploadEvent) -> Option<Outbound> {
        if !self.config.access.allows_chat(event.chat_id) {
            debug!(chat_id = event.chat_id, "ignoring upload from unlisted chat");
            return None;
        }
        Some(self.classify_upload(event).await)
    }

    async fn classify_upload(&self, event: FileUploadEvent) -> Outbound {
        let junk = match self.db.list_junk_words().await {
            Ok(words) => words,
            Err(e) => {
                error!(%e, "failed to load junk words");
                return Outbound::Text(MSG_INTERNAL.into());
            }
        };

        let caption = event.caption.as_deref().unwrap_or("");
        let query = normalize::clean_query(&event.filename, caption, &junk);
        if query.is_empty() {
            debug!(filename = %event.filename, "cleaning left no query");
            return Outbound::Text(MSG_NO_RESULTS.into());
        }

        let candidate = match self.provider.search(&query).await {
            Ok(c) => c,
            Err(e) => {
                warn!(%e, %query, "title search failed");
                return Outbound::Text(MSG_PROVIDER_UNAVAILABLE.into());
            }
        };
        let Some(candidate) = candidate else {
            info!(%query, "no candidates from provider");
            return Outbound::Text(MSG_NO_RESULTS.into());
        };

        let confidence = score::confidence(&query, &candidate.title);
        let thresholds = *self.thresholds.read().await;

        match classify::route(confidence, &thresholds) {
            Classification::Accept => self.accept(&candidate, &event.file_ref, confidence).await,
            Classification::Review => {
                self.sessions
                    .insert(
                        event.file_ref.clone(),
                        candidate.title.clone(),
                        candidate.year.clone(),
                        event.file_ref.clone(),
                        event.chat_id,
                    )
                    .await;
                info!(title = %candidate.title, confidence, "asking for confirmation");
                Outbound::Prompt {
                    text: format!(
                        "Not sure. Detected: {} ({}) [{:.0}%]",
                        candidate.title,
                        display_year(&candidate.year),
                        confidence
                    ),
                    poster: candidate.poster_path.clone(),
                    actions: vec![
                        InteractiveAction::Confirm,
                        InteractiveAction::Rename,
                        InteractiveAction::Ignore,
                    ],
                }
            }
            Classification::Reject => {
                info!(%query, confidence, "rejected low-confidence candidate");
                Outbound::Text(MSG_LOW_CONFIDENCE.into())
            }
        }
    }

    async fn accept(&self, candidate: &MovieCandidate, file_ref: &str, confidence: f64) -> Outbound {
        match self
            .db
            .insert_movie(
                candidate.title.clone(),
                candidate.year.clone(),
                file_ref.to_string(),
            )
            .await
        {
            Ok(_) => {
                info!(title = %candidate.title, confidence, "saved catalog entry");
                Outbound::Text(format!(
                    "Saved: {} ({}) [{:.0}%]",
                    candidate.title,
                    display_year(&candidate.year),
                    confidence
                ))
            }
            Err(e) => {
                error!(%e, "failed to insert catalog entry");
                Outbound::Text(MSG_INTERNAL.into())
            }
        }
    }

    // ── Review prompt actions ───────────────────────────────────

    pub async fn handle_action(&self, event: InteractiveActionEvent) -> Outbound {
        match event.action {
            InteractiveAction::Confirm => match self.sessions.claim(&event.origin).await {
                Some(pending) => {
                    match self
                        .db
                        .insert_movie(
                            pending.title.clone(),
                            pending.year.clone(),
                            pending.file_ref.clone(),
                        )
                        .await
                    {
                        Ok(_) => {
                            info!(title = %pending.title, "confirmed catalog entry");
                            Outbound::Text(format!(
                                "Saved: {} ({})",
                                pending.title,
                                display_year(&pending.year)
                            ))
                        }
                        Err(e) => {
                            error!(%e, "failed to insert catalog entry");
                            Outbound::Text(MSG_INTERNAL.into())
                        }
                    }
                }
                None => Outbound::Text(MSG_EXPIRED.into()),
            },
            InteractiveAction::Rename => {
                if self.sessions.begin_rename(&event.origin).await {
                    Outbound::Text(MSG_RENAME_PROMPT.into())
                } else {
                    Outbound::Text(MSG_EXPIRED.into())
                }
            }
            InteractiveAction::Ignore => match self.sessions.claim(&event.origin).await {
                Some(pending) => {
                    info!(title = %pending.title, "review prompt ignored");
                    Outbound::Text(MSG_IGNORED.into())
                }
                None => Outbound::Text(MSG_EXPIRED.into()),
            },
        }
    }

    /// Free-text reply to a rename invitation. The supplied title is
    /// trusted verbatim; resolver and scorer are bypassed.
    pub async fn handle_rename_reply(&self, origin: &str, title: &str) -> Outbound {
        let title = title.trim();
        if title.is_empty() {
            return Outbound::Text("Title cannot be empty.".into());
        }
        match self.sessions.claim_rename(origin).await {
            Some(pending) => match self
                .db
                .insert_movie(title.to_string(), UNKNOWN_YEAR.to_string(), pending.file_ref)
                .await
            {
                Ok(_) => {
                    info!(%title, "renamed catalog entry saved");
                    Outbound::Text(format!("Saved: {title} ({UNKNOWN_YEAR})"))
                }
                Err(e) => {
                    error!(%e, "failed to insert catalog entry");
                    Outbound::Text(MSG_INTERNAL.into())
                }
            },
            None => Outbound::Text(MSG_EXPIRED.into()),
        }
    }

    // ── Text commands ───────────────────────────────────────────

    pub async fn handle_command(&self, event: TextCommandEvent) -> Outbound {
        match event.command.as_str() {
            "get" => self.cmd_get(&event.args).await,
            "addjunk" | "removejunk" | "listjunk" | "setconfidence"
                if !self.config.access.is_admin(event.sender_id) =>
            {
                warn!(sender_id = event.sender_id, command = %event.command, "unauthorized");
                Outbound::Text(MSG_UNAUTHORIZED.into())
            }
            "addjunk" => self.cmd_addjunk(&event.args).await,
            "removejunk" => self.cmd_removejunk(&event.args).await,
            "listjunk" => self.cmd_listjunk().await,
            "setconfidence" => self.cmd_setconfidence(&event.args).await,
            other => Outbound::Text(format!("Unknown command: {other}")),
        }
    }

    async fn cmd_get(&self, args: &[String]) -> Outbound {
        let query = args.join(" ");
        if query.trim().is_empty() {
            return Outbound::Text("Usage: get <movie name>".into());
        }
        match self.db.find_movie(query.clone()).await {
            Ok(Some(entry)) => {
                let mut caption = entry.display();
                let promo = self.config.general.promo_text.trim();
                if !promo.is_empty() {
                    caption.push_str("\n\n");
                    caption.push_str(promo);
                }
                Outbound::Media {
                    file_ref: entry.file_ref,
                    caption,
                }
            }
            Ok(None) => Outbound::Text(format!("Nothing in the catalog matches \"{query}\".")),
            Err(e) => {
                error!(%e, "catalog lookup failed");
                Outbound::Text(MSG_INTERNAL.into())
            }
        }
    }

    async fn cmd_addjunk(&self, args: &[String]) -> Outbound {
        let word = args.join(" ");
        if word.trim().is_empty() {
            return Outbound::Text("Usage: addjunk <word>".into());
        }
        match self.db.add_junk_word(word.clone()).await {
            Ok(()) => Outbound::Text(format!("Added junk word: {word}")),
            Err(e) => {
                error!(%e, "failed to add junk word");
                Outbound::Text(MSG_INTERNAL.into())
            }
        }
    }

    async fn cmd_removejunk(&self, args: &[String]) -> Outbound {
        let word = args.join(" ");
        if word.trim().is_empty() {
            return Outbound::Text("Usage: removejunk <word>".into());
        }
        match self.db.remove_junk_word(word.clone()).await {
            Ok(0) => Outbound::Text(format!("Junk word not found: {word}")),
            Ok(_) => Outbound::Text(format!("Removed junk word: {word}")),
            Err(e) => {
                error!(%e, "failed to remove junk word");
                Outbound::Text(MSG_INTERNAL.into())
            }
        }
    }

    async fn cmd_listjunk(&self) -> Outbound {
        match self.db.list_junk_words().await {
            Ok(words) if words.is_empty() => Outbound::Text("No junk words configured.".into()),
            Ok(words) => Outbound::Text(format!("Current junk words: {}", words.join(", "))),
            Err(e) => {
                error!(%e, "failed to list junk words");
                Outbound::Text(MSG_INTERNAL.into())
            }
        }
    }

    async fn cmd_setconfidence(&self, args: &[String]) -> Outbound {
        let (Some(high), Some(low)) = (args.first(), args.get(1)) else {
            return Outbound::Text("Usage: setconfidence <high> <low>".into());
        };
        let (Ok(high), Ok(low)) = (high.parse::<f64>(), low.parse::<f64>()) else {
            return Outbound::Text("Usage: setconfidence <high> <low>".into());
        };

        let new = match Thresholds::new(high, low) {
            Ok(t) => t,
            Err(e) => return Outbound::Text(e.to_string()),
        };

        // Persist first; memory only changes once the write stuck.
        if let Err(e) = self.db.save_thresholds(new).await {
            error!(%e, "failed to persist thresholds");
            return Outbound::Text(MSG_INTERNAL.into());
        }
        *self.thresholds.write().await = new;
        info!(high, low, "confidence thresholds updated");
        Outbound::Text(format!(
            "Confidence thresholds updated: high {high}, low {low}"
        ))
    }
}

fn display_year(year: &str) -> &str {
    if year.trim().is_empty() {
        UNKNOWN_YEAR
    } else {
        year
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Provider that always answers with the same candidate set.
    struct StaticSearch {
        candidate: Option<MovieCandidate>,
    }

    impl TitleSearch for StaticSearch {
        type Error = std::convert::Infallible;

        async fn search(&self, _query: &str) -> Result<Option<MovieCandidate>, Self::Error> {
            Ok(self.candidate.clone())
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("provider offline")]
    struct OfflineError;

    /// Provider that always fails, as if the network were down.
    struct OfflineSearch;

    impl TitleSearch for OfflineSearch {
        type Error = OfflineError;

        async fn search(&self, _query: &str) -> Result<Option<MovieCandidate>, Self::Error> {
            Err(OfflineError)
        }
    }

    fn candidate(title: &str, year: &str) -> MovieCandidate {
        MovieCandidate {
            title: title.into(),
            year: year.into(),
            poster_path: Some("/poster.jpg".into()),
        }
    }

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.access.admin_ids = vec![1];
        config.general.promo_text = "Join our channel!".into();
        config
    }

    async fn runtime_with<P: TitleSearch>(config: AppConfig, provider: P) -> (Runtime<P>, DbHandle) {
        let db = DbHandle::open_memory().unwrap();
        let runtime = Runtime::with_db(db.clone(), config, provider).await.unwrap();
        (runtime, db)
    }

    fn upload(filename: &str) -> FileUploadEvent {
        FileUploadEvent {
            filename: filename.into(),
            caption: None,
            file_ref: "file-1".into(),
            sender_id: 2,
            chat_id: 10,
        }
    }

    fn cmd(sender_id: i64, command: &str, args: &[&str]) -> TextCommandEvent {
        TextCommandEvent {
            command: command.into(),
            args: args.iter().map(|s| s.to_string()).collect(),
            sender_id,
        }
    }

    fn action(kind: InteractiveAction) -> InteractiveActionEvent {
        InteractiveActionEvent {
            action: kind,
            origin: "file-1".into(),
        }
    }

    fn text(outbound: &Outbound) -> &str {
        match outbound {
            Outbound::Text(t) => t,
            other => panic!("Expected Text, got {other:?}"),
        }
    }

    // ── Upload pipeline ───────────────────────────────────────────

    #[tokio::test]
    async fn exact_match_is_auto_accepted() {
        let provider = StaticSearch {
            candidate: Some(candidate("The Matrix", "1999")),
        };
        let (runtime, db) = runtime_with(test_config(), provider).await;
        runtime.handle_command(cmd(1, "addjunk", &["1999"])).await;

        let reply = runtime
            .handle_upload(upload("The.Matrix.1999.mkv"))
            .await
            .unwrap();
        assert_eq!(text(&reply), "Saved: The Matrix (1999) [100%]");

        let entry = db.find_movie("Matrix".into()).await.unwrap().unwrap();
        assert_eq!(entry.title, "The Matrix");
        assert_eq!(entry.year, "1999");
        assert_eq!(entry.file_ref, "file-1");
    }

    #[tokio::test]
    async fn get_returns_stored_media_with_promo() {
        let provider = StaticSearch {
            candidate: Some(candidate("The Matrix", "1999")),
        };
        let (runtime, _db) = runtime_with(test_config(), provider).await;
        runtime.handle_upload(upload("The.Matrix.mkv")).await.unwrap();

        match runtime.handle_command(cmd(2, "get", &["matrix"])).await {
            Outbound::Media { file_ref, caption } => {
                assert_eq!(file_ref, "file-1");
                assert!(caption.contains("The Matrix (1999)"));
                assert!(caption.contains("Join our channel!"));
            }
            other => panic!("Expected Media, got {other:?}"),
        }

        let reply = runtime.handle_command(cmd(2, "get", &["xyz123"])).await;
        assert!(text(&reply).contains("Nothing in the catalog matches"));
    }

    #[tokio::test]
    async fn mid_confidence_prompts_for_review() {
        // Token-sorted: "matrix the" vs "abc matrix the" scores ~71,
        // inside the default [70, 82) review band.
        let provider = StaticSearch {
            candidate: Some(candidate("abc matrix the", "1999")),
        };
        let (runtime, db) = runtime_with(test_config(), provider).await;

        let reply = runtime.handle_upload(upload("The.Matrix.mkv")).await.unwrap();
        match reply {
            Outbound::Prompt {
                text,
                poster,
                actions,
            } => {
                assert!(text.contains("abc matrix the"));
                assert_eq!(poster.as_deref(), Some("/poster.jpg"));
                assert_eq!(
                    actions,
                    vec![
                        InteractiveAction::Confirm,
                        InteractiveAction::Rename,
                        InteractiveAction::Ignore,
                    ]
                );
            }
            other => panic!("Expected Prompt, got {other:?}"),
        }

        // Nothing written until a decision is made.
        assert_eq!(db.movie_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn ignore_discards_the_candidate() {
        let provider = StaticSearch {
            candidate: Some(candidate("abc matrix the", "1999")),
        };
        let (runtime, db) = runtime_with(test_config(), provider).await;
        runtime.handle_upload(upload("The.Matrix.mkv")).await.unwrap();

        let reply = runtime.handle_action(action(InteractiveAction::Ignore)).await;
        assert_eq!(text(&reply), MSG_IGNORED);
        assert_eq!(db.movie_count().await.unwrap(), 0);

        // The session was consumed.
        let reply = runtime.handle_action(action(InteractiveAction::Ignore)).await;
        assert_eq!(text(&reply), MSG_EXPIRED);
    }

    #[tokio::test]
    async fn confirm_promotes_the_candidate() {
        let provider = StaticSearch {
            candidate: Some(candidate("abc matrix the", "1999")),
        };
        let (runtime, db) = runtime_with(test_config(), provider).await;
        runtime.handle_upload(upload("The.Matrix.mkv")).await.unwrap();

        let reply = runtime.handle_action(action(InteractiveAction::Confirm)).await;
        assert_eq!(text(&reply), "Saved: abc matrix the (1999)");

        let entry = db.find_movie("abc".into()).await.unwrap().unwrap();
        assert_eq!(entry.file_ref, "file-1");
    }

    #[tokio::test]
    async fn rename_takes_the_user_title_verbatim() {
        let provider = StaticSearch {
            candidate: Some(candidate("abc matrix the", "1999")),
        };
        let (runtime, db) = runtime_with(test_config(), provider).await;
        runtime.handle_upload(upload("The.Matrix.mkv")).await.unwrap();

        let reply = runtime.handle_action(action(InteractiveAction::Rename)).await;
        assert_eq!(text(&reply), MSG_RENAME_PROMPT);

        let reply = runtime.handle_rename_reply("file-1", "  ").await;
        assert_eq!(text(&reply), "Title cannot be empty.");

        let reply = runtime.handle_rename_reply("file-1", "The Matrix").await;
        assert_eq!(text(&reply), "Saved: The Matrix (Unknown)");

        let entry = db.find_movie("Matrix".into()).await.unwrap().unwrap();
        assert_eq!(entry.year, "Unknown");
        assert_eq!(entry.file_ref, "file-1");
    }

    #[tokio::test]
    async fn rename_reply_without_invitation_is_rejected() {
        let provider = StaticSearch {
            candidate: Some(candidate("abc matrix the", "1999")),
        };
        let (runtime, db) = runtime_with(test_config(), provider).await;
        runtime.handle_upload(upload("The.Matrix.mkv")).await.unwrap();

        // Rename was never pressed.
        let reply = runtime.handle_rename_reply("file-1", "The Matrix").await;
        assert_eq!(text(&reply), MSG_EXPIRED);
        assert_eq!(db.movie_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn low_confidence_is_rejected() {
        let provider = StaticSearch {
            candidate: Some(candidate("qqq www zzz", "2000")),
        };
        let (runtime, db) = runtime_with(test_config(), provider).await;

        let reply = runtime.handle_upload(upload("The.Matrix.mkv")).await.unwrap();
        assert_eq!(text(&reply), MSG_LOW_CONFIDENCE);
        assert_eq!(db.movie_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn no_results_is_rejected_with_distinct_message() {
        let provider = StaticSearch { candidate: None };
        let (runtime, db) = runtime_with(test_config(), provider).await;

        let reply = runtime.handle_upload(upload("The.Matrix.mkv")).await.unwrap();
        assert_eq!(text(&reply), MSG_NO_RESULTS);
        assert_ne!(MSG_NO_RESULTS, MSG_LOW_CONFIDENCE);
        assert_eq!(db.movie_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn provider_failure_is_not_fatal() {
        let (runtime, db) = runtime_with(test_config(), OfflineSearch).await;

        let reply = runtime.handle_upload(upload("The.Matrix.mkv")).await.unwrap();
        assert_eq!(text(&reply), MSG_PROVIDER_UNAVAILABLE);
        assert_ne!(MSG_PROVIDER_UNAVAILABLE, MSG_NO_RESULTS);
        assert_eq!(db.movie_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn junk_only_filename_skips_the_provider() {
        // The provider would auto-accept, so reaching it would save an
        // entry; an empty query must reject first.
        let provider = StaticSearch {
            candidate: Some(candidate("The Matrix", "1999")),
        };
        let (runtime, db) = runtime_with(test_config(), provider).await;
        runtime.handle_command(cmd(1, "addjunk", &["1080p"])).await;

        let reply = runtime.handle_upload(upload("1080p.mkv")).await.unwrap();
        assert_eq!(text(&reply), MSG_NO_RESULTS);
        assert_eq!(db.movie_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unlisted_chat_is_ignored() {
        let mut config = test_config();
        config.access.allowed_chat_ids = vec![99];
        let provider = StaticSearch {
            candidate: Some(candidate("The Matrix", "1999")),
        };
        let (runtime, db) = runtime_with(config, provider).await;

        assert!(runtime.handle_upload(upload("The.Matrix.mkv")).await.is_none());
        assert_eq!(db.movie_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_candidate_title_scores_zero_and_rejects() {
        let provider = StaticSearch {
            candidate: Some(candidate("", "1999")),
        };
        let (runtime, db) = runtime_with(test_config(), provider).await;

        let reply = runtime.handle_upload(upload("The.Matrix.mkv")).await.unwrap();
        assert_eq!(text(&reply), MSG_LOW_CONFIDENCE);
        assert_eq!(db.movie_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn expired_prompt_cannot_be_confirmed() {
        let mut config = test_config();
        config.review.ttl_secs = 0;
        let provider = StaticSearch {
            candidate: Some(candidate("abc matrix the", "1999")),
        };
        let (runtime, db) = runtime_with(config, provider).await;
        runtime.handle_upload(upload("The.Matrix.mkv")).await.unwrap();

        let reply = runtime.handle_action(action(InteractiveAction::Confirm)).await;
        assert_eq!(text(&reply), MSG_EXPIRED);
        assert_eq!(db.movie_count().await.unwrap(), 0);
    }

    // ── Commands ──────────────────────────────────────────────────

    #[tokio::test]
    async fn non_admin_cannot_change_thresholds() {
        let provider = StaticSearch { candidate: None };
        let (runtime, _db) = runtime_with(test_config(), provider).await;

        let reply = runtime
            .handle_command(cmd(2, "setconfidence", &["90", "80"]))
            .await;
        assert_eq!(text(&reply), MSG_UNAUTHORIZED);

        let t = runtime.current_thresholds().await;
        assert_eq!(t.high, Thresholds::DEFAULT_HIGH);
        assert_eq!(t.low, Thresholds::DEFAULT_LOW);
    }

    #[tokio::test]
    async fn non_admin_cannot_touch_junk_words() {
        let provider = StaticSearch { candidate: None };
        let (runtime, db) = runtime_with(test_config(), provider).await;

        let reply = runtime.handle_command(cmd(2, "addjunk", &["1080p"])).await;
        assert_eq!(text(&reply), MSG_UNAUTHORIZED);
        assert!(db.list_junk_words().await.unwrap().is_empty());

        let reply = runtime.handle_command(cmd(2, "listjunk", &[])).await;
        assert_eq!(text(&reply), MSG_UNAUTHORIZED);
    }

    #[tokio::test]
    async fn setconfidence_updates_and_persists() {
        let provider = StaticSearch { candidate: None };
        let (runtime, db) = runtime_with(test_config(), provider).await;

        let reply = runtime
            .handle_command(cmd(1, "setconfidence", &["90", "80"]))
            .await;
        assert!(text(&reply).contains("high 90"));

        let t = runtime.current_thresholds().await;
        assert_eq!(t.high, 90.0);
        assert_eq!(t.low, 80.0);

        // Survives a restart on the same database.
        let loaded = db.load_thresholds(Thresholds::default()).await.unwrap();
        assert_eq!(loaded.high, 90.0);
        assert_eq!(loaded.low, 80.0);
    }

    #[tokio::test]
    async fn setconfidence_rejects_inverted_pair() {
        let provider = StaticSearch { candidate: None };
        let (runtime, _db) = runtime_with(test_config(), provider).await;

        let reply = runtime
            .handle_command(cmd(1, "setconfidence", &["70", "82"]))
            .await;
        assert!(text(&reply).contains("invalid thresholds"));

        let t = runtime.current_thresholds().await;
        assert_eq!(t.high, Thresholds::DEFAULT_HIGH);
        assert_eq!(t.low, Thresholds::DEFAULT_LOW);
    }

    #[tokio::test]
    async fn setconfidence_requires_two_numbers() {
        let provider = StaticSearch { candidate: None };
        let (runtime, _db) = runtime_with(test_config(), provider).await;

        let reply = runtime.handle_command(cmd(1, "setconfidence", &["90"])).await;
        assert!(text(&reply).starts_with("Usage:"));

        let reply = runtime
            .handle_command(cmd(1, "setconfidence", &["high", "low"]))
            .await;
        assert!(text(&reply).starts_with("Usage:"));
    }

    #[tokio::test]
    async fn junk_word_commands_roundtrip() {
        let provider = StaticSearch { candidate: None };
        let (runtime, _db) = runtime_with(test_config(), provider).await;

        let reply = runtime.handle_command(cmd(1, "listjunk", &[])).await;
        assert_eq!(text(&reply), "No junk words configured.");

        runtime.handle_command(cmd(1, "addjunk", &["1080p"])).await;
        runtime
            .handle_command(cmd(1, "addjunk", &["directors", "cut"]))
            .await;

        let reply = runtime.handle_command(cmd(1, "listjunk", &[])).await;
        assert_eq!(text(&reply), "Current junk words: 1080p, directors cut");

        let reply = runtime.handle_command(cmd(1, "removejunk", &["1080p"])).await;
        assert_eq!(text(&reply), "Removed junk word: 1080p");

        let reply = runtime.handle_command(cmd(1, "removejunk", &["1080p"])).await;
        assert_eq!(text(&reply), "Junk word not found: 1080p");
    }

    #[tokio::test]
    async fn command_argument_validation() {
        let provider = StaticSearch { candidate: None };
        let (runtime, _db) = runtime_with(test_config(), provider).await;

        let reply = runtime.handle_command(cmd(1, "addjunk", &[])).await;
        assert_eq!(text(&reply), "Usage: addjunk <word>");

        let reply = runtime.handle_command(cmd(2, "get", &[])).await;
        assert_eq!(text(&reply), "Usage: get <movie name>");

        let reply = runtime.handle_command(cmd(2, "bogus", &[])).await;
        assert_eq!(text(&reply), "Unknown command: bogus");
    }

    #[tokio::test]
    async fn duplicate_accepts_create_duplicate_entries() {
        let provider = StaticSearch {
            candidate: Some(candidate("The Matrix", "1999")),
        };
        let (runtime, db) = runtime_with(test_config(), provider).await;

        runtime.handle_upload(upload("The.Matrix.mkv")).await.unwrap();
        runtime.handle_upload(upload("The.Matrix.mkv")).await.unwrap();
        assert_eq!(db.movie_count().await.unwrap(), 2);
    }
}
