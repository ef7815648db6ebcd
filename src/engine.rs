// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Aggregation Engine
 * Concurrent fan-out over the source registry with deduplicated streaming
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use std::collections::HashSet;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::future;
use futures::stream::{Stream, StreamExt};
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

use crate::errors::{ErrorKind, SourceError};
use crate::http_client::SourceClient;
use crate::options::QueryOptions;
use crate::rate_limiter::RequestLimiter;
use crate::sources::{self, Finding, FindingKind, Source, SourceContext};

/// Capacity of the results channel. Kept minimal so a slow consumer
/// backpressures every source instead of letting findings pile up.
const RESULTS_CHANNEL_CAPACITY: usize = 1;

/// Run sources against a domain and stream back findings.
///
/// By default every registered source is queried; use
/// [`QueryOptions::with_sources`] to narrow the selection. Successful
/// findings are deduplicated case-insensitively across all sources;
/// errors pass through untouched, attributed to their source.
///
/// The stream is cold: no source runs until it is first polled. Dropping
/// it, or cancelling `ctx`, unwinds every source task and aborts their
/// in-flight requests. Ordering between sources is not specified.
pub fn query(
    ctx: &CancellationToken,
    domain: impl Into<String>,
    opts: QueryOptions,
) -> QueryStream {
    QueryStream {
        state: State::Pending {
            cancel: ctx.clone(),
            domain: domain.into(),
            opts,
        },
    }
}

/// Stream only the subdomains discovered for a domain.
///
/// When the caller has not picked sources explicitly, only sources that
/// can yield subdomains are queried; an explicit `with_sources` wins, and
/// output is still filtered to subdomains either way.
pub fn subdomains(
    ctx: &CancellationToken,
    domain: impl Into<String>,
    opts: QueryOptions,
) -> impl Stream<Item = Result<String, SourceError>> {
    filtered(ctx, domain.into(), opts, FindingKind::SUBDOMAIN)
}

/// Stream only the URLs discovered for a domain.
///
/// Source selection behaves as in [`subdomains`], anchored on URL-capable
/// sources.
pub fn urls(
    ctx: &CancellationToken,
    domain: impl Into<String>,
    opts: QueryOptions,
) -> impl Stream<Item = Result<String, SourceError>> {
    filtered(ctx, domain.into(), opts, FindingKind::URL)
}

fn filtered(
    ctx: &CancellationToken,
    domain: String,
    mut opts: QueryOptions,
    kind: FindingKind,
) -> impl Stream<Item = Result<String, SourceError>> {
    if opts.sources.is_none() {
        opts = opts.with_sources(sources::by_kind(kind));
    }

    query(ctx, domain, opts).filter_map(move |item| {
        future::ready(match item {
            Err(err) => Some(Err(err)),
            Ok(finding) if finding.kind == kind => Some(Ok(finding.value)),
            Ok(_) => None,
        })
    })
}

/// The lazy result sequence returned by [`query`].
pub struct QueryStream {
    state: State,
}

enum State {
    /// Nothing has run yet; sources start on the first poll.
    Pending {
        cancel: CancellationToken,
        domain: String,
        opts: QueryOptions,
    },
    Running {
        rx: mpsc::Receiver<Result<Finding, SourceError>>,
        dedupe: Deduplicator,
        /// Cancels the child context when the stream is dropped or ends,
        /// so no source task outlives its consumer.
        _guard: DropGuard,
    },
    Done,
}

impl Stream for QueryStream {
    type Item = Result<Finding, SourceError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            match &mut this.state {
                State::Pending { .. } => {
                    let State::Pending { cancel, domain, opts } =
                        std::mem::replace(&mut this.state, State::Done)
                    else {
                        unreachable!("state checked above");
                    };

                    if cancel.is_cancelled() {
                        return Poll::Ready(None);
                    }

                    this.state = start(cancel, domain, opts);
                }
                State::Running { rx, dedupe, .. } => match rx.poll_recv(cx) {
                    Poll::Ready(Some(Err(err))) => return Poll::Ready(Some(Err(err))),
                    Poll::Ready(Some(Ok(finding))) => {
                        if dedupe.seen(&finding.value) {
                            continue;
                        }
                        return Poll::Ready(Some(Ok(finding)));
                    }
                    Poll::Ready(None) => {
                        this.state = State::Done;
                        return Poll::Ready(None);
                    }
                    Poll::Pending => return Poll::Pending,
                },
                State::Done => return Poll::Ready(None),
            }
        }
    }
}

/// Compose the effective client, then launch one task per source.
fn start(parent: CancellationToken, domain: String, opts: QueryOptions) -> State {
    let cancel = parent.child_token();
    let guard = cancel.clone().drop_guard();

    let base = opts
        .http_client
        .clone()
        .unwrap_or_else(SourceClient::default_transport);

    let mut client = SourceClient::new(base);
    if !opts.user_agent.is_empty() {
        client = client.with_user_agent(opts.user_agent.clone());
    }
    if opts.global_rate_limit > 0.0 {
        client = client.with_global_limit(Arc::new(RequestLimiter::per_second(
            opts.global_rate_limit,
        )));
    }

    let selected = opts.sources.clone().unwrap_or_else(sources::all);
    let (tx, rx) = mpsc::channel(RESULTS_CHANNEL_CAPACITY);
    let semaphore = Arc::new(Semaphore::new(opts.parallelism.max(1)));

    debug!(domain = %domain, sources = selected.len(), "dispatching query");

    for source in selected {
        let source_client = match opts.source_rate_limits.get(source.name) {
            Some(&rps) => client
                .clone()
                .with_source_limit(Arc::new(RequestLimiter::per_second(rps))),
            None => client.clone(),
        };
        let api_key = opts.api_keys.get(source.name).cloned().unwrap_or_default();

        tokio::spawn(run_source(
            source,
            source_client,
            domain.clone(),
            api_key,
            opts.timeout,
            cancel.clone(),
            semaphore.clone(),
            tx.clone(),
        ));
    }

    // The receiver observes end-of-stream once the last task drops its
    // sender; the channel needs no separate closer.
    State::Running {
        rx,
        dedupe: Deduplicator::default(),
        _guard: guard,
    }
}

/// Drive one source: acquire a permit, run it under its deadline, and
/// forward its items into the results channel.
#[allow(clippy::too_many_arguments)]
async fn run_source(
    source: Source,
    client: SourceClient,
    domain: String,
    api_key: String,
    timeout: Duration,
    cancel: CancellationToken,
    semaphore: Arc<Semaphore>,
    tx: mpsc::Sender<Result<Finding, SourceError>>,
) {
    let _permit = tokio::select! {
        _ = cancel.cancelled() => return,
        permit = semaphore.clone().acquire_owned() => match permit {
            Ok(permit) => permit,
            Err(_) => return,
        },
    };

    let source_cancel = cancel.child_token();
    let mut findings = source.run(SourceContext {
        cancel: source_cancel.clone(),
        client,
        domain,
        api_key,
    });

    debug!(source = source.name, "source started");

    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);

    loop {
        let item = tokio::select! {
            _ = cancel.cancelled() => break,
            _ = &mut deadline => {
                // Cancel this source only; siblings keep their own clocks.
                source_cancel.cancel();
                drop(findings);
                let timed_out = SourceError::new(source.name, ErrorKind::DeadlineExceeded(timeout));
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tx.send(Err(timed_out)) => {}
                }
                debug!(source = source.name, "source deadline exceeded");
                return;
            }
            item = findings.next() => match item {
                Some(item) => item,
                None => break,
            },
        };

        tokio::select! {
            _ = cancel.cancelled() => break,
            sent = tx.send(item) => {
                if sent.is_err() {
                    break;
                }
            }
        }
    }

    debug!(source = source.name, "source finished");
}

/// Tracks normalized values already delivered within one query.
#[derive(Default)]
struct Deduplicator {
    values: HashSet<String>,
}

impl Deduplicator {
    /// True when the value was already seen; marks it seen otherwise.
    fn seen(&mut self, value: &str) -> bool {
        !self.values.insert(value.trim().to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deduplicator_first_occurrence() {
        let mut dedupe = Deduplicator::default();
        assert!(!dedupe.seen("test"));
    }

    #[test]
    fn test_deduplicator_repeat_occurrence() {
        let mut dedupe = Deduplicator::default();
        dedupe.seen("test");
        assert!(dedupe.seen("test"));
    }

    #[test]
    fn test_deduplicator_case_insensitive() {
        let mut dedupe = Deduplicator::default();
        dedupe.seen("test");
        assert!(dedupe.seen("TEST"));
    }

    #[test]
    fn test_deduplicator_trims_whitespace() {
        let mut dedupe = Deduplicator::default();
        dedupe.seen("test");
        assert!(dedupe.seen("  test  "));
    }

    #[test]
    fn test_deduplicator_distinct_values() {
        let mut dedupe = Deduplicator::default();
        dedupe.seen("test");
        assert!(!dedupe.seen("other"));
    }
}
