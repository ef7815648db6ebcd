// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use reqwest::StatusCode;
use serde::Deserialize;

use super::{once_batch, Finding, FindingKind, FindingStream, Source, SourceContext};
use crate::errors::{ErrorKind, SourceError};
use crate::extractor::SubdomainExtractor;

const NAME: &str = "hudsonrock";

/// The HudsonRock OSINT endpoint for URLs seen in infostealer data.
pub(super) fn source() -> Source {
    Source::new(NAME, FindingKind::SUBDOMAIN | FindingKind::URL, run)
}

#[derive(Debug, Deserialize)]
struct UrlsByDomain {
    data: UrlLists,
}

#[derive(Debug, Deserialize)]
struct UrlLists {
    #[serde(default)]
    employees_urls: Vec<UrlEntry>,
    #[serde(default)]
    clients_urls: Vec<UrlEntry>,
}

#[derive(Debug, Deserialize)]
struct UrlEntry {
    url: String,
}

fn run(ctx: SourceContext) -> FindingStream {
    once_batch(async move {
        let url = format!(
            "https://cavalier.hudsonrock.com/api/json/v2/osint-tools/urls-by-domain?domain={}",
            ctx.domain
        );

        let response = ctx
            .client
            .send(ctx.client.get(&url))
            .await
            .map_err(|err| SourceError::new(NAME, err))?;

        if response.status() != StatusCode::OK {
            return Err(SourceError::new(
                NAME,
                ErrorKind::UnexpectedStatus(response.status()),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| SourceError::new(NAME, err))?;
        let parsed: UrlsByDomain =
            serde_json::from_slice(&body).map_err(|err| SourceError::new(NAME, err))?;

        let extractor =
            SubdomainExtractor::new(&ctx.domain).map_err(|err| SourceError::new(NAME, err))?;

        let mut findings = Vec::new();
        let urls = parsed
            .data
            .employees_urls
            .into_iter()
            .chain(parsed.data.clients_urls);

        for entry in urls {
            let url = entry.url.trim();
            if url.is_empty() {
                continue;
            }
            findings.push(Finding::url(NAME, url));
            for sub in extractor.extract(url) {
                findings.push(Finding::subdomain(NAME, sub));
            }
        }

        Ok(findings)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_both_url_lists() {
        let parsed: UrlsByDomain = serde_json::from_str(
            r#"{"data":{"employees_urls":[{"url":"https://portal.example.com/login"}],"clients_urls":[{"url":"https://shop.example.com"}]}}"#,
        )
        .unwrap();

        assert_eq!(parsed.data.employees_urls.len(), 1);
        assert_eq!(parsed.data.clients_urls.len(), 1);
    }

    #[test]
    fn test_missing_lists_default_empty() {
        let parsed: UrlsByDomain = serde_json::from_str(r#"{"data":{}}"#).unwrap();

        assert!(parsed.data.employees_urls.is_empty());
        assert!(parsed.data.clients_urls.is_empty());
    }
}
