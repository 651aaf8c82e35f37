use url::Url;

/// Canonicalize `raw` against `base` for dedup.
///
/// Seeds pass `None` and must already be absolute. The fragment is dropped;
/// everything else is kept exactly as `Url` parsing produces it, so
/// `example.com:443` and `example.com` stay distinct. Anything that is not a
/// parseable `http`/`https` URL yields `None`.
pub fn normalize_url(raw: &str, base: Option<&Url>) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let mut url = match base {
        Some(base) => base.join(raw).ok()?,
        None => Url::parse(raw).ok()?,
    };

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }

    url.set_fragment(None);
    Some(url)
}

/// Hostname of an already-normalized URL string.
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
}
