// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use futures::stream::{self, StreamExt};
use reqwest::StatusCode;
use serde::Deserialize;

use super::{paginated, Finding, FindingKind, FindingStream, Source, SourceContext};
use crate::errors::{ErrorKind, SourceError};
use crate::extractor::SubdomainExtractor;

const NAME: &str = "certspotter";

/// The Cert Spotter issuance API. Requires an API key; without one the
/// source yields nothing.
pub(super) fn source() -> Source {
    Source::new(NAME, FindingKind::SUBDOMAIN, run)
}

#[derive(Debug, Deserialize)]
struct Issuance {
    id: String,
    #[serde(default)]
    dns_names: Vec<String>,
}

fn run(ctx: SourceContext) -> FindingStream {
    if ctx.api_key.is_empty() {
        return stream::empty().boxed();
    }

    // Cursor is the id of the last issuance seen; empty on the first page.
    paginated(Some(String::new()), move |state| {
        let ctx = ctx.clone();
        async move {
            let Some(after) = state else { return Ok(None) };
            if ctx.cancel.is_cancelled() {
                return Ok(None);
            }

            let mut url = format!(
                "https://api.certspotter.com/v1/issuances?domain={}&include_subdomains=true&expand=dns_names",
                ctx.domain
            );
            if !after.is_empty() {
                url.push_str("&after=");
                url.push_str(&after);
            }

            let request = ctx
                .client
                .get(&url)
                .header("Authorization", format!("Bearer {}", ctx.api_key));

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
            let issuances: Vec<Issuance> =
                serde_json::from_slice(&body).map_err(|err| SourceError::new(NAME, err))?;

            if issuances.is_empty() {
                return Ok(None);
            }

            let extractor = SubdomainExtractor::new(&ctx.domain)
                .map_err(|err| SourceError::new(NAME, err))?;

            let mut findings = Vec::new();
            for issuance in &issuances {
                for name in &issuance.dns_names {
                    for sub in extractor.extract(name) {
                        findings.push(Finding::subdomain(NAME, sub));
                    }
                }
            }

            let next = issuances.last().map(|issuance| issuance.id.clone());
            Ok(Some((findings, next)))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issuance_parses_dns_names() {
        let issuances: Vec<Issuance> = serde_json::from_str(
            r#"[{"id":"12345","dns_names":["api.example.com","*.example.com"]}]"#,
        )
        .unwrap();

        assert_eq!(issuances[0].id, "12345");
        assert_eq!(issuances[0].dns_names.len(), 2);
    }
}
