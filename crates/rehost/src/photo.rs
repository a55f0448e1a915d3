//! Which photos a driver touches, and one bounded resolution attempt.

use crate::RehostConfig;
use rehost_cache::MediaCache;
use rehost_core::{PhotoReference, is_mirrored_url, is_vendor_url};
use rehost_retry::ConcurrencyLimiter;
use tracing::warn;

/// Decides which photo references need work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoFilter {
    vendor_domain: String,
    mirror_host: String,
}

impl PhotoFilter {
    /// Filter for URLs hosted under `vendor_domain`, treating URLs that
    /// contain `mirror_host` as already mirrored.
    pub fn new(vendor_domain: impl Into<String>, mirror_host: impl Into<String>) -> Self {
        Self {
            vendor_domain: vendor_domain.into(),
            mirror_host: mirror_host.into(),
        }
    }

    /// Filter built from the `[vendor]` and `[store]` sections.
    pub fn from_config(config: &RehostConfig) -> Self {
        Self::new(&config.vendor.domain, &config.store.mirror_host)
    }

    /// True for a non-empty vendor URL that is not mirrored yet.
    pub fn needs_rehost(&self, photo: &PhotoReference) -> bool {
        let url = photo.trimmed_url();
        !url.is_empty()
            && !is_mirrored_url(url, &self.mirror_host)
            && is_vendor_url(url, &self.vendor_domain)
    }

    /// True for a non-empty URL that is still on the vendor or that failed
    /// last time. Mirrored URLs without an error are left alone.
    pub fn needs_repair(&self, photo: &PhotoReference) -> bool {
        let url = photo.trimmed_url();
        if url.is_empty() {
            return false;
        }
        if is_mirrored_url(url, &self.mirror_host) && !photo.has_error() {
            return false;
        }
        is_vendor_url(url, &self.vendor_domain) || photo.has_error()
    }
}

/// Result of one resolution attempt for a photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Attempt {
    /// Mirrored; carries the public URL
    Resolved(String),
    /// The vendor answered 404; carries the diagnostic
    Gone(String),
    /// Anything else; carries the diagnostic
    Failed(String),
}

/// Resolve `photo`'s URL while holding a limiter slot.
pub(crate) async fn attempt(
    cache: &MediaCache,
    limiter: &ConcurrencyLimiter,
    photo: &PhotoReference,
    entity_id: &str,
) -> Attempt {
    let url = photo.trimmed_url();

    let result = match limiter.acquire().await {
        Ok(_guard) => cache.resolve(url, entity_id).await,
        Err(e) => return Attempt::Failed(e.to_string()),
    };

    match result {
        Ok(public_url) => Attempt::Resolved(public_url),
        Err(e) if e.is_source_gone() => {
            warn!(url, entity_id, "Source image is gone");
            Attempt::Gone(e.diagnostic())
        }
        Err(e) => {
            warn!(url, entity_id, error = %e, "Photo rehost failed");
            Attempt::Failed(e.diagnostic())
        }
    }
}
