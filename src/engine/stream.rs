//! Resource stream pull loop
//!
//! A `ResourceStream` reads one API resource page by page. The loop is an
//! explicit state machine driven by `futures::stream::unfold`:
//!
//! ```text
//! Ready -> FetchingPage -> EmittingRecords -> FetchingPage | Done
//! ```
//!
//! Consumers pull messages one at a time and may drop the stream at any
//! point. State is only ever emitted after every record it covers.

use super::descriptor::StreamDescriptor;
use super::types::{Message, MessageStream, SyncConfig, SyncStats};
use crate::config::SourceConfig;
use crate::error::Result;
use crate::extract::RecordExtractor;
use crate::http::{HttpClient, RequestConfig};
use crate::pagination::{PageToken, Paginator};
use crate::partition::{PartitionRouter, PartitionValue};
use crate::state::{Cursor, StreamState};
use crate::types::{JsonValue, Record};
use futures::StreamExt;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// One API resource behind a resumable pull loop
#[derive(Clone)]
pub struct ResourceStream {
    descriptor: Arc<StreamDescriptor>,
    client: HttpClient,
    paginator: Arc<dyn Paginator>,
    extractor: Arc<dyn RecordExtractor>,
    cursor: Option<Cursor>,
    partitions: Vec<PartitionValue>,
    state: StreamState,
    sync: SyncConfig,
}

impl ResourceStream {
    /// Build the stream described by `descriptor`
    pub fn new(descriptor: StreamDescriptor, client: HttpClient, config: &SourceConfig) -> Result<Self> {
        descriptor.validate()?;

        let start = config.start_watermark()?;
        let cursor = descriptor.cursor(&start);
        let partitions = match descriptor.router(config) {
            Some(router) => router.partitions()?,
            None => Vec::new(),
        };

        Ok(Self {
            paginator: Arc::new(descriptor.paginator()),
            extractor: Arc::new(descriptor.extractor()),
            descriptor: Arc::new(descriptor),
            client,
            cursor,
            partitions,
            state: StreamState::new(),
            sync: SyncConfig::new().with_checkpoint_interval(config.checkpoint_interval),
        })
    }

    /// Replace the sync settings
    #[must_use]
    pub fn with_sync_config(mut self, sync: SyncConfig) -> Self {
        self.sync = sync;
        self
    }

    /// Stream name
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Static metadata
    pub fn descriptor(&self) -> &StreamDescriptor {
        &self.descriptor
    }

    /// Whether the stream tracks a cursor
    pub fn is_incremental(&self) -> bool {
        self.cursor.is_some()
    }

    /// Stream-level cursor, for incremental streams
    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    /// Partitions the next read walks through, in order
    pub fn partitions(&self) -> &[PartitionValue] {
        &self.partitions
    }

    /// Seed the stream from persisted state
    ///
    /// Full-refresh streams ignore state.
    pub fn set_state(&mut self, state: &StreamState) {
        if let Some(cursor) = &mut self.cursor {
            cursor.set_state(&state.cursor);
            self.state = state.clone();
        }
    }

    /// Read everything from the start date and persist nothing
    ///
    /// A full refresh must not overwrite a higher stored watermark, so the
    /// run emits no state at all.
    pub fn set_full_refresh(&mut self) {
        self.state = StreamState::new();
        self.sync.emit_state = false;
    }

    /// State the next read starts from
    pub fn state(&self) -> StreamState {
        let mut state = self.state.clone();
        if let Some(cursor) = &self.cursor {
            if self.partitions.is_empty() {
                state.cursor = cursor.state();
            }
        }
        state
    }

    /// Read the stream
    ///
    /// Each call starts over from the seeded state. Any error ends the
    /// stream; checkpoints emitted before it remain valid.
    pub fn read(&self) -> MessageStream {
        let run = Run::new(self.clone());
        Box::pin(futures::stream::unfold(run, |mut run| async move {
            run.next().await.map(|item| (item, run))
        }))
    }

    /// Up to `limit` records from the start of the stream
    pub async fn sample(&self, limit: usize) -> Result<Vec<Record>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let sampler = self
            .clone()
            .with_sync_config(self.sync.clone().with_max_records(limit));
        let mut messages = sampler.read();
        let mut records = Vec::new();
        while let Some(message) = messages.next().await {
            if let Message::Record { data, .. } = message? {
                records.push(data);
            }
        }
        Ok(records)
    }
}

impl std::fmt::Debug for ResourceStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceStream")
            .field("descriptor", &self.descriptor)
            .field("cursor", &self.cursor)
            .field("partitions", &self.partitions.len())
            .field("sync", &self.sync)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Pull Loop
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Ready,
    FetchingPage,
    EmittingRecords,
    Done,
    Closed,
}

/// Mutable state of one read
struct Run {
    stream: ResourceStream,
    phase: Phase,
    partitions: VecDeque<PartitionValue>,
    partition: Option<PartitionValue>,
    cursor: Option<Cursor>,
    /// Incremental filter, fixed when the partition starts
    filter_value: Option<String>,
    token: Option<PageToken>,
    next_token: Option<PageToken>,
    records: VecDeque<Record>,
    pending: VecDeque<Message>,
    state: StreamState,
    since_checkpoint: usize,
    stats: SyncStats,
    started: Instant,
}

impl Run {
    fn new(stream: ResourceStream) -> Self {
        let state = stream.state.clone();
        Self {
            stream,
            phase: Phase::Ready,
            partitions: VecDeque::new(),
            partition: None,
            cursor: None,
            filter_value: None,
            token: None,
            next_token: None,
            records: VecDeque::new(),
            pending: VecDeque::new(),
            state,
            since_checkpoint: 0,
            stats: SyncStats::new(),
            started: Instant::now(),
        }
    }

    async fn next(&mut self) -> Option<Result<Message>> {
        loop {
            if let Some(message) = self.pending.pop_front() {
                return Some(Ok(message));
            }

            let step = match self.phase {
                Phase::Ready => {
                    self.start();
                    Ok(())
                }
                Phase::FetchingPage => self.fetch_page().await,
                Phase::EmittingRecords => self.emit_record(),
                Phase::Done => {
                    self.finish();
                    Ok(())
                }
                Phase::Closed => return None,
            };

            if let Err(e) = step {
                warn!(
                    stream = %self.stream.name(),
                    records = self.stats.records_synced,
                    pages = self.stats.pages_fetched,
                    retryable = e.is_retryable(),
                    error = %e,
                    "Stream failed"
                );
                self.phase = Phase::Closed;
                return Some(Err(e));
            }
        }
    }

    fn start(&mut self) {
        self.partitions = self.stream.partitions.iter().cloned().collect();
        info!(
            stream = %self.stream.name(),
            incremental = self.stream.is_incremental(),
            partitions = self.partitions.len(),
            "Starting stream"
        );
        let first = self.partitions.pop_front();
        self.begin_partition(first);
    }

    fn begin_partition(&mut self, partition: Option<PartitionValue>) {
        let prior = match &partition {
            Some(p) => self.state.get_partition(&p.id).cloned().unwrap_or_default(),
            None => self.state.cursor.clone(),
        };

        self.cursor = self.stream.cursor.clone().map(|mut cursor| {
            cursor.set_state(&prior);
            cursor
        });
        self.filter_value = self.cursor.as_ref().map(|c| c.filter_value().to_string());

        if let Some(p) = &partition {
            debug!(stream = %self.stream.name(), partition = %p.id, "Starting partition");
        }
        self.partition = partition;
        self.token = None;
        self.next_token = None;
        self.phase = Phase::FetchingPage;
    }

    async fn fetch_page(&mut self) -> Result<()> {
        let mut params = self.stream.paginator.request_params(self.token.as_ref())?;
        if let Some(partition) = &self.partition {
            params.extend(partition.params.clone());
        }
        if let (Some(incremental), Some(value)) =
            (&self.stream.descriptor.incremental, &self.filter_value)
        {
            params.insert(incremental.cursor_filter.clone(), value.clone());
        }

        debug!(
            stream = %self.stream.name(),
            page = self.stats.pages_fetched + 1,
            ?params,
            "Fetching page"
        );

        let body = self
            .stream
            .client
            .get_json_with_config(&self.stream.descriptor.path, RequestConfig::new().params(params))
            .await?;
        self.stats.add_page();

        if !matches!(
            body.get("data"),
            Some(JsonValue::Array(_) | JsonValue::Object(_))
        ) {
            warn!(
                stream = %self.stream.name(),
                page = self.stats.pages_fetched,
                "Response has no data array, treating page as empty"
            );
        }

        self.records = self.stream.extractor.extract(&body).into();
        self.next_token = self.stream.paginator.next_page_token(&body);
        self.phase = Phase::EmittingRecords;
        Ok(())
    }

    fn emit_record(&mut self) -> Result<()> {
        let Some(record) = self.records.pop_front() else {
            match self.next_token.take() {
                Some(token) => {
                    self.token = Some(token);
                    self.phase = Phase::FetchingPage;
                }
                None => self.end_partition(),
            }
            return Ok(());
        };

        if let Some(cursor) = &mut self.cursor {
            cursor.observe(&record)?;
        }

        self.stats.add_record();
        self.pending
            .push_back(Message::record(self.stream.name(), record));

        if self.cursor.is_some() && self.stream.sync.emit_state {
            self.since_checkpoint += 1;
            if self.since_checkpoint >= self.stream.sync.checkpoint_interval {
                self.checkpoint();
            }
        }

        let max = self.stream.sync.max_records;
        if max > 0 && self.stats.records_synced >= max {
            debug!(stream = %self.stream.name(), max, "Record limit reached");
            self.records.clear();
            self.next_token = None;
            self.partitions.clear();
        }

        Ok(())
    }

    fn end_partition(&mut self) {
        self.commit_cursor();
        if self.partition.is_some() {
            self.stats.add_partition();
        }

        match self.partitions.pop_front() {
            Some(next) => self.begin_partition(Some(next)),
            None => self.phase = Phase::Done,
        }
    }

    /// Copy the live cursor into the stream state
    fn commit_cursor(&mut self) {
        let Some(cursor) = &self.cursor else {
            return;
        };
        match &self.partition {
            Some(p) => self.state.set_partition(&p.id, cursor.state()),
            None => self.state.cursor = cursor.state(),
        }
    }

    fn checkpoint(&mut self) {
        self.commit_cursor();
        self.pending
            .push_back(Message::state(self.stream.name(), self.state.clone()));
        self.stats.add_checkpoint();
        self.since_checkpoint = 0;
    }

    fn finish(&mut self) {
        if self.stream.is_incremental() && self.stream.sync.emit_state {
            self.checkpoint();
        }

        self.stats
            .set_duration(u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX));
        info!(
            stream = %self.stream.name(),
            records = self.stats.records_synced,
            pages = self.stats.pages_fetched,
            partitions = self.stats.partitions_synced,
            checkpoints = self.stats.checkpoints,
            duration_ms = self.stats.duration_ms,
            "Finished stream"
        );
        self.pending.push_back(Message::info(format!(
            "Finished stream '{}': {}",
            self.stream.name(),
            self.stats
        )));
        self.phase = Phase::Closed;
    }
}

