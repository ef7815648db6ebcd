// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use reqwest::StatusCode;

use super::{once_batch, Finding, FindingKind, FindingStream, Source, SourceContext};
use crate::errors::{ErrorKind, SourceError};

const NAME: &str = "anubis";

/// The Anubis subdomain database.
pub(super) fn source() -> Source {
    Source::new(NAME, FindingKind::SUBDOMAIN, run)
}

fn run(ctx: SourceContext) -> FindingStream {
    once_batch(async move {
        let url = format!("https://jonlu.ca/anubis/subdomains/{}", ctx.domain);

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
        let subdomains: Vec<String> =
            serde_json::from_slice(&body).map_err(|err| SourceError::new(NAME, err))?;

        Ok(subdomains
            .into_iter()
            .filter(|sub| !sub.is_empty())
            .map(|sub| Finding::subdomain(NAME, sub))
            .collect())
    })
}
