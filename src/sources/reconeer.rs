// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use reqwest::StatusCode;
use serde::Deserialize;

use super::{once_batch, Finding, FindingKind, FindingStream, Source, SourceContext};
use crate::errors::{ErrorKind, SourceError};

const NAME: &str = "reconeer";

/// The Reconeer domain API. Works without a key; a key raises limits.
pub(super) fn source() -> Source {
    Source::new(NAME, FindingKind::SUBDOMAIN, run)
}

#[derive(Debug, Deserialize)]
struct DomainReport {
    subdomains: Vec<SubdomainEntry>,
}

#[derive(Debug, Deserialize)]
struct SubdomainEntry {
    subdomain: String,
}

fn run(ctx: SourceContext) -> FindingStream {
    once_batch(async move {
        let url = format!("https://www.reconeer.com/api/domain/{}", ctx.domain);

        let mut request = ctx.client.get(&url).header("Accept", "application/json");
        if !ctx.api_key.is_empty() {
            request = request.header("X-API-KEY", &ctx.api_key);
        }

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
        let report: DomainReport =
            serde_json::from_slice(&body).map_err(|err| SourceError::new(NAME, err))?;

        Ok(report
            .subdomains
            .into_iter()
            .filter(|entry| !entry.subdomain.is_empty())
            .map(|entry| Finding::subdomain(NAME, entry.subdomain))
            .collect())
    })
}
