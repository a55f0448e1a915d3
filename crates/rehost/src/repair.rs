//! Second pass over rehosted output.

use crate::photo::{Attempt, attempt};
use crate::{PhotoFilter, RecordReader, RecordWriter, RehostConfig};
use futures::future::join_all;
use rehost_cache::MediaCache;
use rehost_core::{PhotoReference, Record};
use rehost_error::RehostResult;
use rehost_retry::ConcurrencyLimiter;
use std::path::PathBuf;
use tracing::{info, instrument};

/// Options for one [`Repairer::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairOptions {
    /// Output of an earlier batch run
    pub input: PathBuf,
    /// Fresh output file; truncated if present
    pub output: PathBuf,
    /// Records to process (0 = all)
    pub limit: usize,
    /// In-flight resolutions across the run (minimum 1)
    pub concurrency: usize,
    /// Log counters every N records (0 disables)
    pub progress_every: usize,
}

/// Counters reported at the end of a repair run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, derive_more::Display)]
#[display(
    "records_processed: {records_processed}\nphotos_repaired: {photos_repaired}\nphotos_marked_missing: {photos_marked_missing}\nphotos_still_failed: {photos_still_failed}"
)]
pub struct RepairSummary {
    /// Records written
    pub records_processed: usize,
    /// Photos resolved, including those marked missing
    pub photos_repaired: usize,
    /// Photos whose source is confirmed gone
    pub photos_marked_missing: usize,
    /// Photos that failed again
    pub photos_still_failed: usize,
}

/// How a single photo came out of a repair attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repaired {
    Mirrored,
    Missing,
    StillFailed,
}

/// Re-attempts photos that a batch run left on the vendor or with an error.
///
/// A vendor 404 is final: the URL is blanked and `missing` set, which is a
/// different outcome from a photo that is still failing.
#[derive(Debug, Clone)]
pub struct Repairer {
    cache: MediaCache,
    filter: PhotoFilter,
    entity_id_fields: Vec<String>,
}

impl Repairer {
    /// Create a repairer around `cache`.
    pub fn new(cache: MediaCache, filter: PhotoFilter, entity_id_fields: Vec<String>) -> Self {
        Self {
            cache,
            filter,
            entity_id_fields,
        }
    }

    /// Repairer with the filter and id fields from `config`.
    pub fn from_config(cache: MediaCache, config: &RehostConfig) -> Self {
        Self::new(
            cache,
            PhotoFilter::from_config(config),
            config.vendor.entity_id_fields.clone(),
        )
    }

    /// Repair `options.input` into `options.output`.
    ///
    /// # Errors
    ///
    /// Fails on unreadable input, unwritable output, or a malformed input
    /// line.
    #[instrument(skip(self), fields(input = %options.input.display(), output = %options.output.display()))]
    pub async fn run(&self, options: &RepairOptions) -> RehostResult<RepairSummary> {
        let mut reader = RecordReader::open(&options.input).await?;
        let mut writer = RecordWriter::create(&options.output).await?;
        let limiter = ConcurrencyLimiter::new(options.concurrency);
        let mut summary = RepairSummary::default();

        info!(concurrency = limiter.max_concurrent(), limit = options.limit, "Starting repair");

        while options.limit == 0 || summary.records_processed < options.limit {
            let Some(mut record) = reader.next_record().await? else {
                break;
            };

            self.repair_record(&mut record, &limiter, &mut summary).await;
            writer.write(&record).await?;
            summary.records_processed += 1;

            if options.progress_every > 0 && summary.records_processed % options.progress_every == 0 {
                info!(
                    records = summary.records_processed,
                    repaired = summary.photos_repaired,
                    missing = summary.photos_marked_missing,
                    still_failed = summary.photos_still_failed,
                    "Progress"
                );
            }
        }

        info!(
            records = summary.records_processed,
            repaired = summary.photos_repaired,
            missing = summary.photos_marked_missing,
            still_failed = summary.photos_still_failed,
            "Repair complete"
        );
        Ok(summary)
    }

    async fn repair_record(
        &self,
        record: &mut Record,
        limiter: &ConcurrencyLimiter,
        summary: &mut RepairSummary,
    ) {
        let entity_id = record.entity_id(&self.entity_id_fields);

        let pending: Vec<_> = record
            .photo_references_mut()
            .filter(|photo| self.filter.needs_repair(photo))
            .map(|photo| self.repair_photo(photo, &entity_id, limiter))
            .collect();

        for outcome in join_all(pending).await {
            match outcome {
                Repaired::Mirrored => summary.photos_repaired += 1,
                Repaired::Missing => {
                    summary.photos_repaired += 1;
                    summary.photos_marked_missing += 1;
                }
                Repaired::StillFailed => summary.photos_still_failed += 1,
            }
        }
    }

    async fn repair_photo(
        &self,
        photo: &mut PhotoReference,
        entity_id: &str,
        limiter: &ConcurrencyLimiter,
    ) -> Repaired {
        match attempt(&self.cache, limiter, photo, entity_id).await {
            Attempt::Resolved(public_url) => {
                photo.mark_rehosted(public_url);
                Repaired::Mirrored
            }
            Attempt::Gone(_) => {
                photo.mark_missing();
                Repaired::Missing
            }
            Attempt::Failed(diagnostic) => {
                photo.mark_failed(&diagnostic);
                Repaired::StillFailed
            }
        }
    }
}
