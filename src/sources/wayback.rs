// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use reqwest::StatusCode;
use serde::Deserialize;

use super::{once_batch, Finding, FindingKind, FindingStream, Source, SourceContext};
use crate::errors::{ErrorKind, SourceError};
use crate::extractor::SubdomainExtractor;

const NAME: &str = "wayback";

/// The Internet Archive CDX index of captured URLs.
pub(super) fn source() -> Source {
    Source::new(NAME, FindingKind::SUBDOMAIN | FindingKind::URL, run)
}

/// The CDX JSON output is an array of rows; the first row is the header.
#[derive(Debug, Deserialize)]
struct CdxRows(Vec<Vec<String>>);

fn run(ctx: SourceContext) -> FindingStream {
    once_batch(async move {
        let url = format!(
            "https://web.archive.org/cdx/search/cdx?url=*.{}/*&output=json&collapse=urlkey&fl=original",
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
        let rows: CdxRows =
            serde_json::from_slice(&body).map_err(|err| SourceError::new(NAME, err))?;

        let extractor =
            SubdomainExtractor::new(&ctx.domain).map_err(|err| SourceError::new(NAME, err))?;

        let mut findings = Vec::new();
        for row in rows.0.into_iter().skip(1) {
            let Some(original) = row.into_iter().next() else {
                continue;
            };
            if original.is_empty() {
                continue;
            }
            findings.push(Finding::url(NAME, original.clone()));
            for sub in extractor.extract(&original) {
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
    fn test_rows_skip_header() {
        let rows: CdxRows = serde_json::from_str(
            r#"[["original"],["https://www.example.com/"],["https://api.example.com/v1"]]"#,
        )
        .unwrap();

        let originals: Vec<_> = rows
            .0
            .into_iter()
            .skip(1)
            .filter_map(|row| row.into_iter().next())
            .collect();

        assert_eq!(
            originals,
            vec!["https://www.example.com/", "https://api.example.com/v1"]
        );
    }
}
