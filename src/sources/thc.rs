// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{paginated, Finding, FindingKind, FindingStream, Source, SourceContext};
use crate::errors::{ErrorKind, SourceError};

const NAME: &str = "thc";

const PAGE_LIMIT: u32 = 1000;

/// The THC subdomain lookup API, paged via an opaque page state.
pub(super) fn source() -> Source {
    Source::new(NAME, FindingKind::SUBDOMAIN, run)
}

#[derive(Debug, Serialize)]
struct LookupRequest<'a> {
    domain: &'a str,
    page_state: &'a str,
    limit: u32,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    domains: Vec<DomainEntry>,
    #[serde(default)]
    next_page_state: String,
}

#[derive(Debug, Deserialize)]
struct DomainEntry {
    domain: String,
}

fn run(ctx: SourceContext) -> FindingStream {
    paginated(Some(String::new()), move |state| {
        let ctx = ctx.clone();
        async move {
            let Some(page_state) = state else { return Ok(None) };
            if ctx.cancel.is_cancelled() {
                return Ok(None);
            }

            let request = ctx
                .client
                .post("https://ip.thc.org/api/v1/lookup/subdomains")
                .json(&LookupRequest {
                    domain: &ctx.domain,
                    page_state: &page_state,
                    limit: PAGE_LIMIT,
                });

            let response = ctx
                .client
                .send(request)
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
            let parsed: LookupResponse =
                serde_json::from_slice(&body).map_err(|err| SourceError::new(NAME, err))?;

            let findings = parsed
                .domains
                .into_iter()
                .filter(|entry| !entry.domain.is_empty())
                .map(|entry| Finding::subdomain(NAME, entry.domain))
                .collect();

            let next = (!parsed.next_page_state.is_empty()).then_some(parsed.next_page_state);
            Ok(Some((findings, next)))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parses_domains_and_cursor() {
        let parsed: LookupResponse = serde_json::from_str(
            r#"{"domains":[{"domain":"a.example.com"},{"domain":"b.example.com"}],"next_page_state":"abc"}"#,
        )
        .unwrap();

        assert_eq!(parsed.domains.len(), 2);
        assert_eq!(parsed.next_page_state, "abc");
    }

    #[test]
    fn test_last_page_has_empty_cursor() {
        let parsed: LookupResponse =
            serde_json::from_str(r#"{"domains":[{"domain":"a.example.com"}]}"#).unwrap();

        assert!(parsed.next_page_state.is_empty());
    }
}
