//! Resumable batch rehosting of JSONL records.

use crate::photo::{Attempt, attempt};
use crate::{
    PhotoFilter, RecordReader, RecordWriter, RehostConfig, truncate_to_complete_records,
};
use futures::future::join_all;
use rehost_cache::MediaCache;
use rehost_core::{PhotoReference, Record};
use rehost_error::RehostResult;
use rehost_retry::ConcurrencyLimiter;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// Options for one [`BatchRehoster::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// JSONL input, never modified
    pub input: PathBuf,
    /// JSONL output
    pub output: PathBuf,
    /// Records to process in this run (0 = all)
    pub limit: usize,
    /// In-flight resolutions across the run (minimum 1)
    pub concurrency: usize,
    /// Append to `output`, skipping as many input records as it holds
    pub resume: bool,
    /// Log counters every N records (0 disables)
    pub progress_every: usize,
}

/// Counters reported at the end of a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, derive_more::Display)]
#[display(
    "records_resumed: {records_resumed}\nrecords_processed: {records_processed}\nphotos_rehosted: {photos_rehosted}\nphotos_failed: {photos_failed}\nphotos_skipped: {photos_skipped}"
)]
pub struct BatchSummary {
    /// Input records skipped because the output already held them
    pub records_resumed: usize,
    /// Records written by this run
    pub records_processed: usize,
    /// Photos now pointing at the mirror
    pub photos_rehosted: usize,
    /// Photos left with a `rehostError`
    pub photos_failed: usize,
    /// Photo references that needed no work
    pub photos_skipped: usize,
}

/// Rewrites vendor photo URLs in JSONL records to mirrored URLs.
///
/// Records are handled one at a time and written in input order. Within a
/// record all photos resolve concurrently, each holding a slot of a
/// run-wide [`ConcurrencyLimiter`]. A failed photo keeps its URL and gains a
/// `rehostError`; it never aborts the record or the run.
#[derive(Debug, Clone)]
pub struct BatchRehoster {
    cache: MediaCache,
    filter: PhotoFilter,
    entity_id_fields: Vec<String>,
}

impl BatchRehoster {
    /// Create a driver around `cache`.
    pub fn new(cache: MediaCache, filter: PhotoFilter, entity_id_fields: Vec<String>) -> Self {
        Self {
            cache,
            filter,
            entity_id_fields,
        }
    }

    /// Driver with the filter and id fields from `config`.
    pub fn from_config(cache: MediaCache, config: &RehostConfig) -> Self {
        Self::new(
            cache,
            PhotoFilter::from_config(config),
            config.vendor.entity_id_fields.clone(),
        )
    }

    /// Process `options.input` into `options.output`.
    ///
    /// # Errors
    ///
    /// Fails on unreadable input, unwritable output, or a malformed input
    /// line. Per-photo failures are recorded in the output instead.
    #[instrument(skip(self), fields(input = %options.input.display(), output = %options.output.display()))]
    pub async fn run(&self, options: &BatchOptions) -> RehostResult<BatchSummary> {
        let mut summary = BatchSummary::default();

        let done = if options.resume {
            truncate_to_complete_records(&options.output).await?
        } else {
            0
        };

        let mut reader = RecordReader::open(&options.input).await?;
        summary.records_resumed = reader.skip_records(done).await?;
        if summary.records_resumed < done {
            warn!(
                output_records = done,
                input_records = summary.records_resumed,
                "Output holds more records than the input"
            );
        }

        let mut writer = if options.resume {
            RecordWriter::append(&options.output).await?
        } else {
            RecordWriter::create(&options.output).await?
        };

        let limiter = ConcurrencyLimiter::new(options.concurrency);
        info!(
            resumed = summary.records_resumed,
            concurrency = limiter.max_concurrent(),
            limit = options.limit,
            "Starting batch"
        );

        while options.limit == 0 || summary.records_processed < options.limit {
            let Some(mut record) = reader.next_record().await? else {
                break;
            };

            self.process_record(&mut record, &limiter, &mut summary)
                .await;
            writer.write(&record).await?;
            summary.records_processed += 1;

            if options.progress_every > 0 && summary.records_processed % options.progress_every == 0 {
                info!(
                    records = summary.records_processed,
                    photos_rehosted = summary.photos_rehosted,
                    photos_failed = summary.photos_failed,
                    "Progress"
                );
            }
        }

        info!(
            records = summary.records_processed,
            photos_rehosted = summary.photos_rehosted,
            photos_failed = summary.photos_failed,
            photos_skipped = summary.photos_skipped,
            "Batch complete"
        );
        Ok(summary)
    }

    async fn process_record(
        &self,
        record: &mut Record,
        limiter: &ConcurrencyLimiter,
        summary: &mut BatchSummary,
    ) {
        let entity_id = record.entity_id(&self.entity_id_fields);

        let mut pending = Vec::new();
        for photo in record.photo_references_mut() {
            if self.filter.needs_rehost(photo) {
                pending.push(self.rehost_photo(photo, &entity_id, limiter));
            } else {
                summary.photos_skipped += 1;
            }
        }

        for rehosted in join_all(pending).await {
            if rehosted {
                summary.photos_rehosted += 1;
            } else {
                summary.photos_failed += 1;
            }
        }
    }

    async fn rehost_photo(
        &self,
        photo: &mut PhotoReference,
        entity_id: &str,
        limiter: &ConcurrencyLimiter,
    ) -> bool {
        match attempt(&self.cache, limiter, photo, entity_id).await {
            Attempt::Resolved(public_url) => {
                photo.mark_rehosted(public_url);
                true
            }
            Attempt::Gone(diagnostic) | Attempt::Failed(diagnostic) => {
                photo.mark_failed(&diagnostic);
                false
            }
        }
    }
}
