// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Source Contract and Registry
 * Finding model, source descriptors, and the process-wide source registry
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

mod alienvault;
mod anubis;
mod certspotter;
mod commoncrawl;
mod crtsh;
mod digitorus;
mod hackertarget;
mod hudsonrock;
mod rapiddns;
mod reconeer;
mod sitedossier;
mod thc;
mod virustotal;
mod wayback;

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bitflags::bitflags;
use futures::stream::{self, BoxStream, StreamExt};
use once_cell::sync::Lazy;
use tokio_util::sync::CancellationToken;

use crate::errors::SourceError;
use crate::http_client::SourceClient;

bitflags! {
    /// What kinds of findings a source can produce.
    ///
    /// Sources advertise a set of these and callers select by them; a
    /// future third kind extends the set without touching existing
    /// sources.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FindingKind: u8 {
        /// A DNS name at or below the target domain.
        const SUBDOMAIN = 1 << 0;

        /// A full URL beginning with http:// or https://.
        const URL = 1 << 1;
    }
}

/// A single discovery reported by a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// What kind of value this is.
    pub kind: FindingKind,

    /// The subdomain or URL.
    pub value: String,

    /// Name of the source that produced it.
    pub source: &'static str,
}

impl Finding {
    pub fn subdomain(source: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind: FindingKind::SUBDOMAIN,
            value: value.into(),
            source,
        }
    }

    pub fn url(source: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind: FindingKind::URL,
            value: value.into(),
            source,
        }
    }
}

/// The lazy sequence a source produces: findings and in-band errors.
///
/// Streams are cold; nothing runs until the consumer polls, and dropping
/// the stream is the stop signal.
pub type FindingStream = BoxStream<'static, Result<Finding, SourceError>>;

/// Everything a source invocation receives from the engine.
#[derive(Clone)]
pub struct SourceContext {
    /// Cancelled when the caller stops consuming or the per-source
    /// deadline expires. Checked between network round-trips.
    pub cancel: CancellationToken,

    /// Client already layered with user-agent and rate limits. Sources
    /// must not replace it.
    pub client: SourceClient,

    /// The bare target domain, never a URL.
    pub domain: String,

    /// API key for this source; empty when none is configured.
    pub api_key: String,
}

impl fmt::Debug for SourceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceContext")
            .field("domain", &self.domain)
            .field("has_api_key", &!self.api_key.is_empty())
            .finish()
    }
}

type RunFn = Arc<dyn Fn(SourceContext) -> FindingStream + Send + Sync>;

/// A reconnaissance data source: a name, a capability set, and an entry
/// point. The entry point is a plain function of its context, safe to run
/// concurrently with itself on different domains.
#[derive(Clone)]
pub struct Source {
    /// Process-unique identifier, e.g. "crtsh".
    pub name: &'static str,

    /// Kinds of findings this source may emit.
    pub yields: FindingKind,

    run: RunFn,
}

impl Source {
    pub fn new(
        name: &'static str,
        yields: FindingKind,
        run: impl Fn(SourceContext) -> FindingStream + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            yields,
            run: Arc::new(run),
        }
    }

    /// Start the source. Returns its cold finding stream.
    pub fn run(&self, ctx: SourceContext) -> FindingStream {
        (self.run)(ctx)
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("name", &self.name)
            .field("yields", &self.yields)
            .finish()
    }
}

static REGISTRY: Lazy<RwLock<HashMap<&'static str, Source>>> = Lazy::new(|| {
    let mut registry = HashMap::new();
    for source in builtins() {
        registry.insert(source.name, source);
    }
    RwLock::new(registry)
});

fn builtins() -> Vec<Source> {
    vec![
        alienvault::source(),
        anubis::source(),
        certspotter::source(),
        commoncrawl::source(),
        crtsh::source(),
        digitorus::source(),
        hackertarget::source(),
        hudsonrock::source(),
        rapiddns::source(),
        reconeer::source(),
        sitedossier::source(),
        thc::source(),
        virustotal::source(),
        wayback::source(),
    ]
}

fn read_registry() -> RwLockReadGuard<'static, HashMap<&'static str, Source>> {
    REGISTRY.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_registry() -> RwLockWriteGuard<'static, HashMap<&'static str, Source>> {
    REGISTRY.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Add a source to the registry, replacing any source of the same name.
pub fn register(source: Source) {
    write_registry().insert(source.name, source);
}

/// Look a source up by name.
pub fn by_name(name: &str) -> Option<Source> {
    read_registry().get(name).cloned()
}

/// Names of all registered sources, in unspecified order.
pub fn names() -> Vec<&'static str> {
    read_registry().keys().copied().collect()
}

/// All registered sources, in unspecified order.
pub fn all() -> Vec<Source> {
    read_registry().values().cloned().collect()
}

/// Sources matching the given names, in the order requested. Unknown
/// names are silently omitted.
pub fn by_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<Source> {
    let registry = read_registry();
    names
        .into_iter()
        .filter_map(|name| registry.get(name).cloned())
        .collect()
}

/// Sources whose capability set intersects `want`.
pub fn by_kind(want: FindingKind) -> Vec<Source> {
    read_registry()
        .values()
        .filter(|source| source.yields.intersects(want))
        .cloned()
        .collect()
}

/// Lazily run one fetch producing a batch of items.
///
/// The future is not polled until the consumer starts iterating; its
/// items are then streamed out one by one, or its error as a single
/// terminal item.
pub(crate) fn once_batch(
    fetch: impl Future<Output = Result<Vec<Finding>, SourceError>> + Send + 'static,
) -> FindingStream {
    stream::once(fetch).flat_map(flatten_batch).boxed()
}

/// Lazily run a paginated fetch.
///
/// `step` maps a page cursor to a batch of items plus the next cursor,
/// `None` when the last page is done. A failed step yields its error and
/// ends the stream; the consumer stopping between pages prevents the next
/// fetch from ever starting.
pub(crate) fn paginated<S, F, Fut>(init: S, step: F) -> FindingStream
where
    S: Send + 'static,
    F: FnMut(S) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Option<(Vec<Finding>, S)>, SourceError>> + Send + 'static,
{
    stream::try_unfold(init, step).flat_map(flatten_batch).boxed()
}

fn flatten_batch(
    batch: Result<Vec<Finding>, SourceError>,
) -> stream::Iter<std::vec::IntoIter<Result<Finding, SourceError>>> {
    let items = match batch {
        Ok(items) => items.into_iter().map(Ok).collect::<Vec<_>>(),
        Err(err) => vec![Err(err)],
    };
    stream::iter(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_source(name: &'static str, yields: FindingKind) -> Source {
        Source::new(name, yields, |_ctx| stream::iter(Vec::new()).boxed())
    }

    #[test]
    fn test_register_and_lookup() {
        register(noop_source("test-register-source", FindingKind::SUBDOMAIN));

        let got = by_name("test-register-source").expect("registered source");
        assert_eq!(got.name, "test-register-source");
        assert_eq!(got.yields, FindingKind::SUBDOMAIN);
    }

    #[test]
    fn test_by_name_missing() {
        assert!(by_name("nonexistent-source").is_none());
    }

    #[test]
    fn test_register_replaces_same_name() {
        register(noop_source("test-replace-source", FindingKind::SUBDOMAIN));
        register(noop_source("test-replace-source", FindingKind::URL));

        let got = by_name("test-replace-source").expect("registered source");
        assert_eq!(got.yields, FindingKind::URL);
    }

    #[test]
    fn test_names_and_all_contain_registered() {
        register(noop_source("test-names-source", FindingKind::SUBDOMAIN));

        assert!(names().contains(&"test-names-source"));
        assert!(all().iter().any(|s| s.name == "test-names-source"));
    }

    #[test]
    fn test_by_names_preserves_order_and_omits_missing() {
        register(noop_source("test-order-b", FindingKind::SUBDOMAIN));
        register(noop_source("test-order-a", FindingKind::SUBDOMAIN));

        let got = by_names(["test-order-a", "no-such-source", "test-order-b"]);
        let names: Vec<_> = got.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["test-order-a", "test-order-b"]);
    }

    #[test]
    fn test_by_kind_intersects_capability_sets() {
        register(noop_source("test-kind-sub", FindingKind::SUBDOMAIN));
        register(noop_source("test-kind-url", FindingKind::URL));
        register(noop_source(
            "test-kind-both",
            FindingKind::SUBDOMAIN | FindingKind::URL,
        ));

        let subs: Vec<_> = by_kind(FindingKind::SUBDOMAIN)
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert!(subs.contains(&"test-kind-sub"));
        assert!(subs.contains(&"test-kind-both"));
        assert!(!subs.contains(&"test-kind-url"));

        let urls: Vec<_> = by_kind(FindingKind::URL).into_iter().map(|s| s.name).collect();
        assert!(urls.contains(&"test-kind-url"));
        assert!(urls.contains(&"test-kind-both"));
        assert!(!urls.contains(&"test-kind-sub"));

        // The union filter covers both narrower filters.
        let both: Vec<_> = by_kind(FindingKind::SUBDOMAIN | FindingKind::URL)
            .into_iter()
            .map(|s| s.name)
            .collect();
        for name in subs.iter().chain(urls.iter()) {
            assert!(both.contains(name));
        }
    }

    #[test]
    fn test_finding_kind_flags_are_distinct() {
        assert!((FindingKind::SUBDOMAIN & FindingKind::URL).is_empty());
        let both = FindingKind::SUBDOMAIN | FindingKind::URL;
        assert!(both.contains(FindingKind::SUBDOMAIN));
        assert!(both.contains(FindingKind::URL));
    }

    #[test]
    fn test_builtins_are_registered_with_expected_capabilities() {
        for (name, yields) in [
            ("alienvault", FindingKind::SUBDOMAIN | FindingKind::URL),
            ("anubis", FindingKind::SUBDOMAIN),
            ("certspotter", FindingKind::SUBDOMAIN),
            ("commoncrawl", FindingKind::SUBDOMAIN | FindingKind::URL),
            ("crtsh", FindingKind::SUBDOMAIN),
            ("digitorus", FindingKind::SUBDOMAIN),
            ("hackertarget", FindingKind::SUBDOMAIN),
            ("hudsonrock", FindingKind::SUBDOMAIN | FindingKind::URL),
            ("rapiddns", FindingKind::SUBDOMAIN),
            ("reconeer", FindingKind::SUBDOMAIN),
            ("sitedossier", FindingKind::SUBDOMAIN),
            ("thc", FindingKind::SUBDOMAIN),
            ("virustotal", FindingKind::SUBDOMAIN),
            ("wayback", FindingKind::SUBDOMAIN | FindingKind::URL),
        ] {
            let source = by_name(name).unwrap_or_else(|| panic!("{name} not registered"));
            assert_eq!(source.yields, yields, "{name} capabilities");
        }
    }
}
