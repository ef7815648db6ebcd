// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use reqwest::StatusCode;
use serde::Deserialize;

use super::{once_batch, Finding, FindingKind, FindingStream, Source, SourceContext};
use crate::errors::{ErrorKind, SourceError};
use crate::extractor::SubdomainExtractor;

const NAME: &str = "crtsh";

/// The crt.sh certificate transparency database.
pub(super) fn source() -> Source {
    Source::new(NAME, FindingKind::SUBDOMAIN, run)
}

#[derive(Debug, Deserialize)]
struct CrtShRecord {
    name_value: String,
}

fn run(ctx: SourceContext) -> FindingStream {
    once_batch(async move {
        let url = format!("https://crt.sh/?q=%25.{}&output=json", ctx.domain);

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
        let records: Vec<CrtShRecord> =
            serde_json::from_slice(&body).map_err(|err| SourceError::new(NAME, err))?;

        let extractor =
            SubdomainExtractor::new(&ctx.domain).map_err(|err| SourceError::new(NAME, err))?;

        let mut findings = Vec::new();
        for record in records {
            // name_value may pack several names separated by newlines
            for line in record.name_value.lines() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                for sub in extractor.extract(line) {
                    findings.push(Finding::subdomain(NAME, sub));
                }
            }
        }

        Ok(findings)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_parses_multiline_name_value() {
        let records: Vec<CrtShRecord> = serde_json::from_str(
            r#"[{"name_value":"api.example.com\n*.example.com","issuer_ca_id":1}]"#,
        )
        .unwrap();

        assert_eq!(records.len(), 1);
        let lines: Vec<_> = records[0].name_value.lines().collect();
        assert_eq!(lines, vec!["api.example.com", "*.example.com"]);
    }
}
