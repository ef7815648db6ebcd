// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use reqwest::StatusCode;

use super::{once_batch, Finding, FindingKind, FindingStream, Source, SourceContext};
use crate::errors::{ErrorKind, SourceError};
use crate::extractor::SubdomainExtractor;

const NAME: &str = "hackertarget";

/// The HackerTarget host search API.
///
/// Works without an API key but is tightly rate limited; a key raises the
/// limits.
pub(super) fn source() -> Source {
    Source::new(NAME, FindingKind::SUBDOMAIN, run)
}

fn run(ctx: SourceContext) -> FindingStream {
    once_batch(async move {
        let mut url = format!("https://api.hackertarget.com/hostsearch/?q={}", ctx.domain);
        if !ctx.api_key.is_empty() {
            url.push_str("&apikey=");
            url.push_str(&ctx.api_key);
        }

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
            .text()
            .await
            .map_err(|err| SourceError::new(NAME, err))?;

        let extractor =
            SubdomainExtractor::new(&ctx.domain).map_err(|err| SourceError::new(NAME, err))?;

        // Response is CSV-like, one "subdomain,ip" pair per line.
        let mut findings = Vec::new();
        for line in body.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            for sub in extractor.extract(line) {
                findings.push(Finding::subdomain(NAME, sub));
            }
        }

        Ok(findings)
    })
}
