// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use reqwest::StatusCode;
use serde::Deserialize;

use super::{paginated, Finding, FindingKind, FindingStream, Source, SourceContext};
use crate::errors::{ErrorKind, SourceError};
use crate::extractor::SubdomainExtractor;

const NAME: &str = "alienvault";

/// The AlienVault OTX URL list endpoint. No key required.
pub(super) fn source() -> Source {
    Source::new(NAME, FindingKind::SUBDOMAIN | FindingKind::URL, run)
}

#[derive(Debug, Deserialize)]
struct UrlListPage {
    url_list: Vec<UrlEntry>,
    has_next: bool,
}

#[derive(Debug, Deserialize)]
struct UrlEntry {
    url: String,
}

fn run(ctx: SourceContext) -> FindingStream {
    paginated(Some(1u32), move |state| {
        let ctx = ctx.clone();
        async move {
            let Some(page) = state else { return Ok(None) };
            if ctx.cancel.is_cancelled() {
                return Ok(None);
            }

            let url = format!(
                "https://otx.alienvault.com/api/v1/indicators/domain/{}/url_list?page={}",
                ctx.domain, page
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
            let parsed: UrlListPage =
                serde_json::from_slice(&body).map_err(|err| SourceError::new(NAME, err))?;

            let extractor = SubdomainExtractor::new(&ctx.domain)
                .map_err(|err| SourceError::new(NAME, err))?;

            let mut findings = Vec::new();
            for entry in parsed.url_list {
                if entry.url.is_empty() {
                    continue;
                }
                findings.push(Finding::url(NAME, entry.url.clone()));
                for sub in extractor.extract(&entry.url) {
                    findings.push(Finding::subdomain(NAME, sub));
                }
            }

            let next = parsed.has_next.then(|| page + 1);
            Ok(Some((findings, next)))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_parses_url_list_and_cursor() {
        let page: UrlListPage = serde_json::from_str(
            r#"{"url_list":[{"url":"https://api.example.com/v1","date":"2026-01-01"}],"has_next":true,"page_num":1}"#,
        )
        .unwrap();

        assert_eq!(page.url_list.len(), 1);
        assert_eq!(page.url_list[0].url, "https://api.example.com/v1");
        assert!(page.has_next);
    }
}
