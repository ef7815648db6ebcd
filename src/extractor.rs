// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Subdomain Extractor
 * Domain-anchored extraction of DNS names from free-form text
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use regex::Regex;

use crate::errors::ErrorKind;

/// Extracts names equal to or below a target domain from arbitrary text.
///
/// Input can be anything a provider hands back: an HTML fragment, a CSV
/// row, a raw URL, JSON flattened to a line. Matches come back lowercase,
/// in appearance order, with surrounding punctuation already shed; the
/// extractor does not deduplicate, the engine does.
pub struct SubdomainExtractor {
    domain: String,
    pattern: Regex,
}

impl SubdomainExtractor {
    /// Build an extractor anchored to `domain`.
    ///
    /// Fails when the domain itself is not a well-formed DNS name, since
    /// every candidate is validated against it.
    pub fn new(domain: &str) -> Result<Self, ErrorKind> {
        let domain = domain.trim().trim_matches('.').to_lowercase();
        if domain.is_empty() || !domain.split('.').all(is_valid_label) {
            return Err(ErrorKind::InvalidDomain(domain));
        }

        // Each label is 1-63 chars of [a-z0-9-] with no hyphen at either
        // end, anchored on the escaped target domain as suffix.
        let pattern = Regex::new(&format!(
            r"(?i)(?:[a-z0-9](?:[a-z0-9-]{{0,61}}[a-z0-9])?\.)*{}",
            regex::escape(&domain)
        ))
        .map_err(|_| ErrorKind::InvalidDomain(domain.clone()))?;

        Ok(Self { domain, pattern })
    }

    /// The normalized target domain this extractor is anchored on.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Scan `text` and return every match, lowercase, in appearance order.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let bytes = text.as_bytes();
        let mut matches = Vec::new();

        for found in self.pattern.find_iter(text) {
            // A hostname character just before the match means the
            // candidate is the tail of a longer label ("badexample.com"
            // must not yield "example.com").
            if found.start() > 0 && is_name_byte(bytes[found.start() - 1]) {
                continue;
            }

            // Same on the right edge; a trailing dot is allowed only when
            // it terminates the name ("api.example.com." is fine,
            // "api.example.com.evil.com" is somebody else's subdomain).
            match bytes.get(found.end()) {
                Some(&b) if is_name_byte(b) => continue,
                Some(b'.') => {
                    if let Some(&after) = bytes.get(found.end() + 1) {
                        if is_name_byte(after) {
                            continue;
                        }
                    }
                }
                _ => {}
            }

            matches.push(found.as_str().to_lowercase());
        }

        matches
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= 63
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> SubdomainExtractor {
        SubdomainExtractor::new("example.com").unwrap()
    }

    #[test]
    fn test_rejects_invalid_domain() {
        assert!(SubdomainExtractor::new("").is_err());
        assert!(SubdomainExtractor::new("exa mple.com").is_err());
        assert!(SubdomainExtractor::new("-bad.com").is_err());
    }

    #[test]
    fn test_extracts_bare_domain_and_subdomains() {
        let found = extractor().extract("see example.com and api.example.com here");
        assert_eq!(found, vec!["example.com", "api.example.com"]);
    }

    #[test]
    fn test_lowercases_matches() {
        let found = extractor().extract("API.Example.COM");
        assert_eq!(found, vec!["api.example.com"]);
    }

    #[test]
    fn test_preserves_appearance_order_and_duplicates() {
        let found = extractor().extract("a.example.com b.example.com a.example.com");
        assert_eq!(found, vec!["a.example.com", "b.example.com", "a.example.com"]);
    }

    #[test]
    fn test_ignores_lookalike_suffix() {
        assert!(extractor().extract("badexample.com").is_empty());
        assert!(extractor().extract("example.community").is_empty());
    }

    #[test]
    fn test_ignores_foreign_parent_domain() {
        assert!(extractor().extract("api.example.com.evil.com").is_empty());
    }

    #[test]
    fn test_accepts_trailing_dot() {
        let found = extractor().extract("ns1.example.com.");
        assert_eq!(found, vec!["ns1.example.com"]);
    }

    #[test]
    fn test_strips_wildcard_and_leading_dot() {
        assert_eq!(extractor().extract("*.api.example.com"), vec!["api.example.com"]);
        assert_eq!(extractor().extract(".www.example.com"), vec!["www.example.com"]);
    }

    #[test]
    fn test_extracts_from_url_and_html() {
        let found = extractor().extract(
            r#"<a href="https://cdn.example.com/asset.js">x</a>,203.0.113.9"#,
        );
        assert_eq!(found, vec!["cdn.example.com"]);
    }

    #[test]
    fn test_rejects_invalid_labels() {
        assert!(extractor().extract("-lead.example.com").is_empty());
        let long = format!("{}.example.com", "a".repeat(64));
        assert!(extractor().extract(&long).is_empty());
    }

    #[test]
    fn test_rejects_underscore_labels() {
        assert!(extractor().extract("_dmarc.example.com").is_empty());
    }

    #[test]
    fn test_consecutive_dots_break_the_name() {
        let found = extractor().extract("api..example.com");
        assert_eq!(found, vec!["example.com"]);
    }
}
