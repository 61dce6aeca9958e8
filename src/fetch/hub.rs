//! Live-update hub discovery
//!
//! The API advertises its hub with a `Link` header such as
//! `<https://example.com/.well-known/mercure>; rel="mercure"`.

use regex::Regex;
use reqwest::header::{HeaderMap, LINK};
use reqwest::Url;
use std::sync::OnceLock;

fn hub_link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"<([^>]+)>\s*;\s*rel=(?:mercure|"[^"]*mercure[^"]*")"#)
            .expect("hub link pattern is valid")
    })
}

/// Extract the hub URL from the response headers, resolved against `base`
pub fn extract_hub_url(headers: &HeaderMap, base: &Url) -> Option<String> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| {
            hub_link_pattern()
                .captures(value)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
        .and_then(|target| base.join(&target).ok())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn base() -> Url {
        Url::parse("https://api.example.com").unwrap()
    }

    fn headers(values: &[&str]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for v in values {
            map.append(LINK, HeaderValue::from_str(v).unwrap());
        }
        map
    }

    #[test]
    fn test_absent_header() {
        assert_eq!(extract_hub_url(&HeaderMap::new(), &base()), None);
    }

    #[test]
    fn test_quoted_relation_among_others() {
        let h = headers(&[
            r#"<https://api.example.com/docs.jsonld>; rel="http://www.w3.org/ns/hydra/core#apiDocumentation",<https://hub.example.com/.well-known/mercure>; rel="mercure""#,
        ]);
        assert_eq!(
            extract_hub_url(&h, &base()).as_deref(),
            Some("https://hub.example.com/.well-known/mercure")
        );
    }

    #[test]
    fn test_relative_hub_is_resolved() {
        let h = headers(&[
            r#"</docs.jsonld>; rel="http://www.w3.org/ns/hydra/core#apiDocumentation""#,
            "</.well-known/mercure>; rel=mercure",
        ]);
        assert_eq!(
            extract_hub_url(&h, &base()).as_deref(),
            Some("https://api.example.com/.well-known/mercure")
        );
    }

    #[test]
    fn test_other_relations_ignored() {
        let h = headers(&[r#"</docs.jsonld>; rel="http://www.w3.org/ns/hydra/core#apiDocumentation""#]);
        assert_eq!(extract_hub_url(&h, &base()), None);
    }
}
