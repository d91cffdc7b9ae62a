// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Building request URLs from configurable base endpoints

use url::Url;

/// Append path segments to `base`, percent-encoding each one.
///
/// Unlike `Url::join`, the base path is always kept, whether or not it ends
/// with a slash.
pub fn join_segments(base: &Url, segments: &[&str]) -> Option<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(segments);
    Some(url)
}

/// Parse a base URL, returning `None` for anything that cannot carry a path
pub fn parse_base(base: &str) -> Option<Url> {
    Url::parse(base).ok().filter(|url| !url.cannot_be_a_base())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_segments_keeps_base_path() {
        let base = Url::parse("http://127.0.0.1:9000/mock").unwrap();

        let url = join_segments(&base, &["api", "v1", "events"]).unwrap();

        assert_eq!(url.as_str(), "http://127.0.0.1:9000/mock/api/v1/events");
    }

    #[test]
    fn test_join_segments_on_root() {
        let base = Url::parse("https://management.azure.com").unwrap();

        let url = join_segments(&base, &["subscriptions"]).unwrap();

        assert_eq!(url.as_str(), "https://management.azure.com/subscriptions");
    }

    #[test]
    fn test_join_segments_encodes_segments() {
        let base = Url::parse("https://example.com/").unwrap();

        let url = join_segments(&base, &["a b", "c/d"]).unwrap();

        assert_eq!(url.as_str(), "https://example.com/a%20b/c%2Fd");
    }

    #[test]
    fn test_parse_base_rejects_non_base_urls() {
        assert!(parse_base("mailto:ops@example.com").is_none());
        assert!(parse_base("not a url").is_none());
        assert!(parse_base("https://api.datadoghq.com").is_some());
    }
}
