//! RecoveryEngine - replays upstream events missing from the Event Store.
//!
//! Both modes are strictly sequential so ordering checks stay meaningful.
//! A listing failure aborts the run; a failure on one event is counted and
//! the scan continues.

use std::sync::Arc;
use uuid::Uuid;

use crate::config::ProcessingConfig;
use crate::domain::recovery::{
    chunk_count, chunk_windows, RecoveryError, RecoveryMode, RecoveryStats, TimeWindow,
};
use crate::domain::webhook::{ValidationOutcome, WebhookEvent};
use crate::ports::{EventListQuery, EventPage, EventSource};

use super::{EventDispatcher, EventValidator};

/// Command to run one recovery pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoverEventsCommand {
    pub start_time: i64,
    pub end_time: i64,
    pub mode: RecoveryMode,
    /// Page budget for chunked mode; the profile's `max_pages` when absent.
    pub max_pages: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RecoverySettings {
    page_size: u32,
    chunk_size_secs: u64,
    max_pages: u32,
}

pub struct RecoveryEngine {
    source: Arc<dyn EventSource>,
    validator: Arc<EventValidator>,
    dispatcher: Arc<EventDispatcher>,
    settings: RecoverySettings,
}

impl RecoveryEngine {
    pub fn new(
        source: Arc<dyn EventSource>,
        validator: Arc<EventValidator>,
        dispatcher: Arc<EventDispatcher>,
        config: &ProcessingConfig,
    ) -> Self {
        Self {
            source,
            validator,
            dispatcher,
            settings: RecoverySettings {
                page_size: config.page_size,
                chunk_size_secs: config.chunk_size_secs,
                max_pages: config.max_pages,
            },
        }
    }

    pub async fn handle(&self, cmd: RecoverEventsCommand) -> Result<RecoveryStats, RecoveryError> {
        match cmd.mode {
            RecoveryMode::Simple => self.recover(cmd.start_time, cmd.end_time).await,
            RecoveryMode::Chunked => {
                self.recover_chunked(cmd.start_time, cmd.end_time, cmd.max_pages)
                    .await
            }
        }
    }

    /// Replay one page of events created in `[start_time, end_time]`.
    pub async fn recover(
        &self,
        start_time: i64,
        end_time: i64,
    ) -> Result<RecoveryStats, RecoveryError> {
        let window = checked_window(start_time, end_time)?;
        let run_id = Uuid::new_v4();
        let mut stats = RecoveryStats::default();

        tracing::info!(
            %run_id,
            start_time,
            end_time,
            page_size = self.settings.page_size,
            "Starting simple recovery"
        );

        let query = EventListQuery::for_window(window, self.settings.page_size);
        let page = self.fetch(run_id, &query).await?;
        if page.has_more {
            tracing::warn!(
                %run_id,
                fetched = page.events.len(),
                "Window holds more than one page; use chunked recovery for the rest"
            );
        }

        self.replay(run_id, page.events, &mut stats).await;

        tracing::info!(%run_id, ?stats, "Simple recovery completed");
        Ok(stats)
    }

    /// Replay `[start_time, end_time]` chunk by chunk, following pagination.
    ///
    /// `max_pages` bounds the pages fetched by the whole run. Chunks not
    /// reached once it is spent are counted in `skipped_chunks`.
    pub async fn recover_chunked(
        &self,
        start_time: i64,
        end_time: i64,
        max_pages: Option<u32>,
    ) -> Result<RecoveryStats, RecoveryError> {
        checked_window(start_time, end_time)?;
        let chunk_size =
            i64::try_from(self.settings.chunk_size_secs).map_err(|_| RecoveryError::InvalidChunkSize)?;
        if chunk_size == 0 {
            return Err(RecoveryError::InvalidChunkSize);
        }

        let max_pages = max_pages.unwrap_or(self.settings.max_pages);
        let run_id = Uuid::new_v4();
        let mut stats = RecoveryStats::default();
        let mut pages_fetched: u32 = 0;

        tracing::info!(
            %run_id,
            start_time,
            end_time,
            chunk_size,
            chunks = chunk_count(start_time, end_time, chunk_size),
            max_pages,
            "Starting chunked recovery"
        );

        for (index, window) in chunk_windows(start_time, end_time, chunk_size).enumerate() {
            if pages_fetched >= max_pages {
                stats.skipped_chunks = chunk_count(window.start, end_time, chunk_size);
                tracing::warn!(
                    %run_id,
                    pages_fetched,
                    skipped_chunks = stats.skipped_chunks,
                    resume_from = window.start,
                    "Page budget exhausted, stopping"
                );
                break;
            }

            let events = self
                .fetch_chunk(run_id, window, max_pages, &mut pages_fetched)
                .await?;
            let fetched = events.len();
            self.replay(run_id, events, &mut stats).await;
            stats.processed_chunks += 1;

            tracing::debug!(
                %run_id,
                chunk = index,
                chunk_start = window.start,
                chunk_end = window.end,
                fetched,
                "Chunk processed"
            );
        }

        tracing::info!(%run_id, pages_fetched, ?stats, "Chunked recovery completed");
        Ok(stats)
    }

    /// All pages of one chunk, within the remaining page budget.
    async fn fetch_chunk(
        &self,
        run_id: Uuid,
        window: TimeWindow,
        max_pages: u32,
        pages_fetched: &mut u32,
    ) -> Result<Vec<WebhookEvent>, RecoveryError> {
        let mut query = EventListQuery::for_window(window, self.settings.page_size);
        let mut events = Vec::new();

        loop {
            let page = self.fetch(run_id, &query).await?;
            *pages_fetched += 1;

            let cursor = page.events.last().map(|e| e.id.clone());
            events.extend(page.events);

            let Some(cursor) = cursor.filter(|_| page.has_more) else {
                break;
            };
            if *pages_fetched >= max_pages {
                tracing::warn!(
                    %run_id,
                    chunk_start = window.start,
                    chunk_end = window.end,
                    "Page budget exhausted inside chunk, chunk truncated"
                );
                break;
            }
            query = query.next_page(cursor);
        }

        Ok(events)
    }

    async fn fetch(
        &self,
        run_id: Uuid,
        query: &EventListQuery,
    ) -> Result<EventPage, RecoveryError> {
        self.source.list_events(query).await.map_err(|e| {
            tracing::error!(
                %run_id,
                created_gte = query.created_gte,
                created_lte = query.created_lte,
                starting_after = ?query.starting_after,
                error = %e,
                "Failed to list events, aborting recovery"
            );
            RecoveryError::Source(e)
        })
    }

    /// Replay events oldest first.
    async fn replay(&self, run_id: Uuid, mut events: Vec<WebhookEvent>, stats: &mut RecoveryStats) {
        events.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));

        for event in &events {
            stats.total_events += 1;

            match self.validator.is_recorded(&event.id).await {
                Ok(true) => continue,
                Ok(false) => stats.missing_events += 1,
                Err(e) => {
                    tracing::warn!(%run_id, event_id = %event.id, error = %e, "Could not check event");
                    stats.failed_replays += 1;
                    continue;
                }
            }

            if self.replay_one(run_id, event).await {
                stats.replayed_events += 1;
            } else {
                stats.failed_replays += 1;
            }
        }
    }

    async fn replay_one(&self, run_id: Uuid, event: &WebhookEvent) -> bool {
        let outcome = match self.validator.validate(event).await {
            Ok(outcome) => outcome,
            Err(_) => return false,
        };

        match outcome {
            ValidationOutcome::Accepted => match self.dispatcher.dispatch(event).await {
                Ok(true) => {
                    tracing::info!(
                        %run_id,
                        event_id = %event.id,
                        event_type = %event.event_type,
                        created = event.created,
                        "Replayed missing event"
                    );
                    true
                }
                Ok(false) | Err(_) => false,
            },
            ValidationOutcome::Rejected(rejection) => {
                tracing::warn!(
                    %run_id,
                    event_id = %event.id,
                    classification = %rejection.failure_kind(),
                    "Replay rejected by validation"
                );
                false
            }
        }
    }
}

fn checked_window(start_time: i64, end_time: i64) -> Result<TimeWindow, RecoveryError> {
    if start_time > end_time {
        return Err(RecoveryError::InvalidWindow {
            start: start_time,
            end: end_time,
        });
    }
    Ok(TimeWindow::new(start_time, end_time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::event_store::InMemoryEventStore;
    use crate::adapters::handlers::RecordingEventHandler;
    use crate::adapters::stripe::InMemoryEventSource;
    use serde_json::json;

    const CHUNK: i64 = 300;

    fn event(id: &str, object_id: &str, created: i64) -> WebhookEvent {
        WebhookEvent {
            id: id.to_string(),
            event_type: "invoice.payment_succeeded".to_string(),
            created,
            payload: json!({ "object": { "id": object_id } }),
            account: None,
            api_version: None,
            livemode: false,
        }
    }

    struct Fixture {
        engine: RecoveryEngine,
        validator: Arc<EventValidator>,
        source: Arc<InMemoryEventSource>,
        handler: Arc<RecordingEventHandler>,
    }

    fn fixture(events: Vec<WebhookEvent>, config: ProcessingConfig) -> Fixture {
        let source = Arc::new(InMemoryEventSource::new(events));
        let handler = Arc::new(RecordingEventHandler::new());
        let validator = Arc::new(EventValidator::new(
            Arc::new(InMemoryEventStore::new()),
            &config,
        ));
        let dispatcher = Arc::new(EventDispatcher::new(handler.clone()));
        let engine = RecoveryEngine::new(source.clone(), validator.clone(), dispatcher, &config);
        Fixture {
            engine,
            validator,
            source,
            handler,
        }
    }

    fn config() -> ProcessingConfig {
        ProcessingConfig {
            chunk_size_secs: CHUNK as u64,
            page_size: 10,
            max_pages: 50,
            ..ProcessingConfig::development()
        }
    }

    #[tokio::test]
    async fn simple_mode_replays_only_missing_events() {
        let f = fixture(
            vec![event("evt_1", "in_1", 10), event("evt_2", "in_2", 20), event("evt_3", "in_3", 30)],
            config(),
        );
        f.validator.validate(&event("evt_2", "in_2", 20)).await.unwrap();

        let stats = f.engine.recover(0, 100).await.unwrap();

        assert_eq!(stats.total_events, 3);
        assert_eq!(stats.missing_events, 2);
        assert_eq!(stats.replayed_events, 2);
        assert_eq!(stats.failed_replays, 0);
        assert_eq!(f.handler.handled_ids(), vec!["evt_1", "evt_3"]);
    }

    #[tokio::test]
    async fn simple_mode_replays_oldest_first() {
        let f = fixture(
            vec![event("evt_new", "in_1", 50), event("evt_old", "in_1", 40)],
            config(),
        );

        let stats = f.engine.recover(0, 100).await.unwrap();

        assert_eq!(stats.replayed_events, 2);
        assert_eq!(f.handler.handled_ids(), vec!["evt_old", "evt_new"]);
    }

    #[tokio::test]
    async fn simple_mode_reads_one_page() {
        let events = (0..15).map(|i| event(&format!("evt_{}", i), "in_1", i)).collect();
        let f = fixture(events, config());

        let stats = f.engine.recover(0, 100).await.unwrap();

        assert_eq!(stats.total_events, 10);
        assert_eq!(f.source.queries().len(), 1);
    }

    #[tokio::test]
    async fn handler_failure_is_counted_and_scan_continues() {
        let f = fixture(
            vec![event("evt_1", "in_1", 10), event("evt_2", "in_2", 20), event("evt_3", "in_3", 30)],
            config(),
        );
        f.handler.fail_for("evt_2");

        let stats = f.engine.recover(0, 100).await.unwrap();

        assert_eq!(stats.failed_replays, 1);
        assert_eq!(stats.replayed_events, 2);
        assert_eq!(f.handler.count(), 3);
    }

    #[tokio::test]
    async fn fetch_failure_aborts_run() {
        let f = fixture(vec![event("evt_1", "in_1", 10)], config());
        f.source.fail_on_call(0);

        let result = f.engine.recover(0, 100).await;

        assert!(matches!(result, Err(RecoveryError::Source(_))));
        assert_eq!(f.handler.count(), 0);
    }

    #[tokio::test]
    async fn inverted_window_is_rejected() {
        let f = fixture(vec![], config());
        assert!(matches!(
            f.engine.recover(100, 0).await,
            Err(RecoveryError::InvalidWindow { start: 100, end: 0 })
        ));
        assert!(matches!(
            f.engine.recover_chunked(100, 0, None).await,
            Err(RecoveryError::InvalidWindow { .. })
        ));
    }

    #[tokio::test]
    async fn chunked_mode_counts_chunks() {
        let f = fixture(
            vec![event("evt_1", "in_1", 10), event("evt_2", "in_2", 400), event("evt_3", "in_3", 899)],
            config(),
        );

        let stats = f.engine.recover_chunked(0, 3 * CHUNK, None).await.unwrap();

        assert_eq!(stats.processed_chunks, 3);
        assert_eq!(stats.skipped_chunks, 0);
        assert_eq!(stats.replayed_events, 3);
    }

    #[tokio::test]
    async fn chunked_mode_follows_pagination() {
        let events = (0..25).map(|i| event(&format!("evt_{:02}", i), "in_1", i)).collect();
        let f = fixture(events, config());

        let stats = f.engine.recover_chunked(0, 100, None).await.unwrap();

        assert_eq!(stats.total_events, 25);
        assert_eq!(stats.replayed_events, 25);
        assert_eq!(f.source.queries().len(), 3);
    }

    #[tokio::test]
    async fn page_budget_skips_remaining_chunks() {
        let f = fixture(
            vec![event("evt_1", "in_1", 10), event("evt_2", "in_2", 400), event("evt_3", "in_3", 899)],
            config(),
        );

        let stats = f.engine.recover_chunked(0, 3 * CHUNK, Some(2)).await.unwrap();

        assert_eq!(stats.processed_chunks, 2);
        assert_eq!(stats.skipped_chunks, 1);
        assert_eq!(stats.replayed_events, 2);
    }

    #[tokio::test]
    async fn page_budget_bounds_work_on_very_wide_window() {
        let f = fixture(vec![], config());

        let stats = f
            .engine
            .recover_chunked(0, CHUNK * 40_000_000, Some(1))
            .await
            .unwrap();

        assert_eq!(f.source.queries().len(), 1);
        assert_eq!(stats.processed_chunks, 1);
        assert_eq!(stats.skipped_chunks, 39_999_999);

        let widest = fixture(vec![], config());
        let stats = widest.engine.recover_chunked(0, i64::MAX, Some(1)).await.unwrap();

        assert_eq!(widest.source.queries().len(), 1);
        assert_eq!(stats.skipped_chunks, chunk_count(CHUNK, i64::MAX, CHUNK));
    }

    #[tokio::test]
    async fn chunk_fetch_failure_aborts_run() {
        let f = fixture(vec![event("evt_1", "in_1", 10)], config());
        f.source.fail_on_call(1);

        let result = f.engine.recover_chunked(0, 3 * CHUNK, None).await;

        assert!(matches!(result, Err(RecoveryError::Source(_))));
        assert_eq!(f.handler.count(), 1);
    }
}
