// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use chrono::Datelike;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use super::{paginated, Finding, FindingKind, FindingStream, Source, SourceContext};
use crate::errors::{ErrorKind, SourceError};
use crate::extractor::SubdomainExtractor;

const NAME: &str = "commoncrawl";

/// The Common Crawl CDX indexes, limited to the last two years of crawls.
pub(super) fn source() -> Source {
    Source::new(NAME, FindingKind::SUBDOMAIN | FindingKind::URL, run)
}

#[derive(Debug, Deserialize)]
struct CollInfo {
    id: String,
    #[serde(rename = "cdx-api")]
    cdx_api: String,
}

#[derive(Debug, Clone)]
struct CdxIndex {
    id: String,
    cdx_api: String,
}

enum Step {
    FetchIndexes,
    QueryIndexes(Vec<CdxIndex>),
}

fn run(ctx: SourceContext) -> FindingStream {
    paginated(Some(Step::FetchIndexes), move |state| {
        let ctx = ctx.clone();
        async move {
            let Some(step) = state else { return Ok(None) };
            if ctx.cancel.is_cancelled() {
                return Ok(None);
            }

            match step {
                Step::FetchIndexes => {
                    let indexes = fetch_indexes(&ctx).await?;
                    if indexes.is_empty() {
                        return Ok(None);
                    }
                    Ok(Some((Vec::new(), Some(Step::QueryIndexes(indexes)))))
                }
                Step::QueryIndexes(mut remaining) => {
                    if remaining.is_empty() {
                        return Ok(None);
                    }
                    let index = remaining.remove(0);
                    let findings = query_index(&ctx, &index).await?;
                    Ok(Some((findings, Some(Step::QueryIndexes(remaining)))))
                }
            }
        }
    })
}

async fn fetch_indexes(ctx: &SourceContext) -> Result<Vec<CdxIndex>, SourceError> {
    let response = ctx
        .client
        .send(ctx.client.get("https://index.commoncrawl.org/collinfo.json"))
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
    let raw: Vec<CollInfo> =
        serde_json::from_slice(&body).map_err(|err| SourceError::new(NAME, err))?;

    let cutoff_year = chrono::Utc::now().year() - 2;

    Ok(raw
        .into_iter()
        .filter(|info| parse_index_year(&info.id).is_some_and(|year| year >= cutoff_year))
        .map(|info| CdxIndex {
            id: info.id,
            cdx_api: info.cdx_api,
        })
        .collect())
}

async fn query_index(ctx: &SourceContext, index: &CdxIndex) -> Result<Vec<Finding>, SourceError> {
    let endpoint = format!(
        "{}?url=*.{}&output=text&fl=url",
        index.cdx_api, ctx.domain
    );

    let request = ctx
        .client
        .get(&endpoint)
        .header("Host", "index.commoncrawl.org");

    let response = ctx
        .client
        .send(request)
        .await
        .map_err(|err| SourceError::new(NAME, err))?;

    // Individual indexes come and go; skip the unavailable ones.
    if response.status() != StatusCode::OK {
        debug!(index = %index.id, status = %response.status(), "skipping index");
        return Ok(Vec::new());
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
        let decoded = decode_url(line);
        if decoded.is_empty() {
            continue;
        }
        findings.push(Finding::url(NAME, decoded.clone()));
        for sub in extractor.extract(&decoded) {
            findings.push(Finding::subdomain(NAME, sub));
        }
    }

    Ok(findings)
}

// Index ids look like "CC-MAIN-2026-04".
fn parse_index_year(id: &str) -> Option<i32> {
    let year: i32 = id.split('-').nth(2)?.parse().ok()?;
    (2000..=2100).contains(&year).then_some(year)
}

/// Decode percent-encoding and the double-encoding artifacts the index
/// tends to leave behind.
fn decode_url(raw: &str) -> String {
    let decoded = match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    };

    decoded
        .replace("%25", "%")
        .replace("%2f", "/")
        .replace("%2F", "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_index_year() {
        assert_eq!(parse_index_year("CC-MAIN-2026-04"), Some(2026));
        assert_eq!(parse_index_year("CC-MAIN-1999-52"), None);
        assert_eq!(parse_index_year("bogus"), None);
    }

    #[test]
    fn test_decode_url_strips_artifacts() {
        assert_eq!(
            decode_url("https%3A%2F%2Fwww.example.com%2Fpath"),
            "https://www.example.com/path"
        );
        assert_eq!(decode_url("https://a.example.com/%252f"), "https://a.example.com//");
    }

    #[test]
    fn test_collinfo_parses_cdx_api_field() {
        let raw: Vec<CollInfo> = serde_json::from_str(
            r#"[{"id":"CC-MAIN-2026-04","name":"January 2026","cdx-api":"https://index.commoncrawl.org/CC-MAIN-2026-04-index"}]"#,
        )
        .unwrap();

        assert_eq!(raw[0].id, "CC-MAIN-2026-04");
        assert!(raw[0].cdx_api.ends_with("-index"));
    }
}
