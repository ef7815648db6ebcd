// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use reqwest::StatusCode;

use super::{once_batch, Finding, FindingKind, FindingStream, Source, SourceContext};
use crate::errors::{ErrorKind, SourceError};
use crate::extractor::SubdomainExtractor;

const NAME: &str = "digitorus";

/// The Digitorus certificate details site.
pub(super) fn source() -> Source {
    Source::new(NAME, FindingKind::SUBDOMAIN, run)
}

fn run(ctx: SourceContext) -> FindingStream {
    once_batch(async move {
        let url = format!("https://certificatedetails.com/{}", ctx.domain);

        let response = ctx
            .client
            .send(ctx.client.get(&url))
            .await
            .map_err(|err| SourceError::new(NAME, err))?;

        // The 404 page still lists certificate names, treat it as success.
        if response.status() != StatusCode::OK && response.status() != StatusCode::NOT_FOUND {
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
