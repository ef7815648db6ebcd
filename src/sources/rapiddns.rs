// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;

use super::{paginated, Finding, FindingKind, FindingStream, Source, SourceContext};
use crate::errors::{ErrorKind, SourceError};
use crate::extractor::SubdomainExtractor;

const NAME: &str = "rapiddns";

/// The RapidDNS web interface, scraped page by page.
pub(super) fn source() -> Source {
    Source::new(NAME, FindingKind::SUBDOMAIN, run)
}

static PAGE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"class="page-link"\s+href="/subdomain/[^?]+\?page=(\d+)""#)
        .expect("rapiddns page pattern")
});

fn run(ctx: SourceContext) -> FindingStream {
    // State is (next page to fetch, last page reported by the first response).
    paginated(Some((1u32, 1u32)), move |state| {
        let ctx = ctx.clone();
        async move {
            let Some((page, mut max_page)) = state else {
                return Ok(None);
            };
            if ctx.cancel.is_cancelled() {
                return Ok(None);
            }

            let body = fetch_page(&ctx, page).await?;

            // Pagination links only appear on the listing itself, so the
            // first page establishes how far to walk.
            if page == 1 {
                max_page = max_page_in(&body);
            }

            let extractor = SubdomainExtractor::new(&ctx.domain)
                .map_err(|err| SourceError::new(NAME, err))?;

            let findings = extractor
                .extract(&body)
                .into_iter()
                .map(|sub| Finding::subdomain(NAME, sub))
                .collect();

            let next = (page < max_page).then_some((page + 1, max_page));
            Ok(Some((findings, next)))
        }
    })
}

async fn fetch_page(ctx: &SourceContext, page: u32) -> Result<String, SourceError> {
    let url = format!(
        "https://rapiddns.io/subdomain/{}?page={}&full=1",
        ctx.domain, page
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

    response
        .text()
        .await
        .map_err(|err| SourceError::new(NAME, err))
}

fn max_page_in(body: &str) -> u32 {
    PAGE_PATTERN
        .captures_iter(body)
        .filter_map(|captures| captures[1].parse::<u32>().ok())
        .max()
        .unwrap_or(1)
        .max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_page_single_link() {
        let html = r#"<a class="page-link" href="/subdomain/example.com?page=2">"#;
        assert_eq!(max_page_in(html), 2);
    }

    #[test]
    fn test_max_page_takes_largest() {
        let html = concat!(
            r#"<a class="page-link" href="/subdomain/example.com?page=1">"#,
            r#"<a class="page-link" href="/subdomain/example.com?page=5">"#,
        );
        assert_eq!(max_page_in(html), 5);
    }

    #[test]
    fn test_max_page_defaults_to_one() {
        assert_eq!(max_page_in(r#"<a href="/other">No pagination</a>"#), 1);
    }
}
