//! Source URL canonicalization and classification.

/// Strip query, fragment and `;params` from a URL.
///
/// Vendor CDNs append resize parameters (`?width=100`) to the same logical
/// image. Dropping everything after the path collapses those variants onto a
/// single cache key. Never fails: input that does not parse as a URL is cut
/// at the first `?` or `#`.
///
/// # Examples
///
/// ```
/// use rehost_core::canonicalize_url;
///
/// assert_eq!(
///     canonicalize_url("https://cdn.vendor.example/a/b.jpg?width=100#top"),
///     "https://cdn.vendor.example/a/b.jpg"
/// );
/// ```
pub fn canonicalize_url(url: &str) -> String {
    let Ok(mut parsed) = url::Url::parse(url) else {
        let end = url.find(['?', '#']).unwrap_or(url.len());
        return url[..end].to_string();
    };

    parsed.set_query(None);
    parsed.set_fragment(None);

    // Params belong to the last path segment only
    let path = parsed.path();
    let segment_start = path.rfind('/').map_or(0, |idx| idx + 1);
    if let Some(offset) = path[segment_start..].find(';') {
        let trimmed = path[..segment_start + offset].to_string();
        parsed.set_path(&trimmed);
    }

    parsed.into()
}

/// Lower-cased host of an absolute URL, if it has one.
pub fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
}

/// True when the URL's host is `domain` or a subdomain of it.
///
/// # Examples
///
/// ```
/// use rehost_core::is_vendor_url;
///
/// assert!(is_vendor_url("https://cdn.rescuegroups.org/x.jpg", "rescuegroups.org"));
/// assert!(!is_vendor_url("https://example.com/x.jpg", "rescuegroups.org"));
/// ```
pub fn is_vendor_url(url: &str, domain: &str) -> bool {
    host_of(url).is_some_and(|host| host.ends_with(&domain.to_ascii_lowercase()))
}

/// True when the URL already points at the mirror.
pub fn is_mirrored_url(url: &str, mirror_host: &str) -> bool {
    !url.is_empty() && !mirror_host.is_empty() && url.contains(mirror_host)
}
