// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;

use super::{paginated, Finding, FindingKind, FindingStream, Source, SourceContext};
use crate::errors::{ErrorKind, SourceError};
use crate::extractor::SubdomainExtractor;

const NAME: &str = "sitedossier";

/// The SiteDossier parent-domain listing, following "next" links.
pub(super) fn source() -> Source {
    Source::new(NAME, FindingKind::SUBDOMAIN, run)
}

static NEXT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<a href="([A-Za-z0-9/.]+)"><b>"#).expect("sitedossier next pattern"));

fn run(ctx: SourceContext) -> FindingStream {
    let start = format!("http://www.sitedossier.com/parentdomain/{}", ctx.domain);

    paginated(Some(start), move |state| {
        let ctx = ctx.clone();
        async move {
            let Some(url) = state else { return Ok(None) };
            if ctx.cancel.is_cancelled() {
                return Ok(None);
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

            let extractor = SubdomainExtractor::new(&ctx.domain)
                .map_err(|err| SourceError::new(NAME, err))?;

            let findings = extractor
                .extract(&body)
                .into_iter()
                .map(|sub| Finding::subdomain(NAME, sub))
                .collect();

            let next = next_path_in(&body)
                .map(|path| format!("http://www.sitedossier.com{}", path));

            Ok(Some((findings, next)))
        }
    })
}

fn next_path_in(body: &str) -> Option<String> {
    NEXT_PATTERN
        .captures(body)
        .map(|captures| captures[1].to_string())
}
