// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use futures::stream::{self, StreamExt};
use reqwest::StatusCode;
use serde::Deserialize;

use super::{paginated, Finding, FindingKind, FindingStream, Source, SourceContext};
use crate::errors::{ErrorKind, SourceError};

const NAME: &str = "virustotal";

/// The VirusTotal v3 subdomain relationship. Requires an API key; without
/// one the source yields nothing.
pub(super) fn source() -> Source {
    Source::new(NAME, FindingKind::SUBDOMAIN, run)
}

#[derive(Debug, Deserialize)]
struct SubdomainsPage {
    #[serde(default)]
    data: Vec<DomainObject>,
    #[serde(default)]
    meta: Meta,
}

#[derive(Debug, Deserialize)]
struct DomainObject {
    id: String,
}

#[derive(Debug, Default, Deserialize)]
struct Meta {
    #[serde(default)]
    cursor: String,
}

fn run(ctx: SourceContext) -> FindingStream {
    if ctx.api_key.is_empty() {
        return stream::empty().boxed();
    }

    paginated(Some(String::new()), move |state| {
        let ctx = ctx.clone();
        async move {
            let Some(cursor) = state else { return Ok(None) };
            if ctx.cancel.is_cancelled() {
                return Ok(None);
            }

            let mut url = format!(
                "https://www.virustotal.com/api/v3/domains/{}/subdomains?limit=40",
                ctx.domain
            );
            if !cursor.is_empty() {
                url.push_str("&cursor=");
                url.push_str(&cursor);
            }

            let request = ctx.client.get(&url).header("x-apikey", &ctx.api_key);

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
            let page: SubdomainsPage =
                serde_json::from_slice(&body).map_err(|err| SourceError::new(NAME, err))?;

            let findings = page
                .data
                .into_iter()
                .filter(|object| !object.id.is_empty())
                .map(|object| Finding::subdomain(NAME, object.id))
                .collect();

            let next = (!page.meta.cursor.is_empty()).then_some(page.meta.cursor);
            Ok(Some((findings, next)))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_parses_data_and_cursor() {
        let page: SubdomainsPage = serde_json::from_str(
            r#"{"data":[{"id":"api.example.com","type":"domain"}],"meta":{"cursor":"next123","count":41}}"#,
        )
        .unwrap();

        assert_eq!(page.data.len(), 1);
        assert_eq!(page.meta.cursor, "next123");
    }

    #[test]
    fn test_last_page_has_no_cursor() {
        let page: SubdomainsPage =
            serde_json::from_str(r#"{"data":[{"id":"a.example.com"}],"meta":{"count":1}}"#)
                .unwrap();

        assert!(page.meta.cursor.is_empty());
    }
}
