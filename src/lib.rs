// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - scout
 * Passive reconnaissance aggregator: concurrent subdomain and URL
 * discovery across certificate transparency logs, passive DNS indexes,
 * and web archives
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

pub mod engine;
pub mod errors;
pub mod extractor;
pub mod http_client;
pub mod options;
pub mod rate_limiter;
pub mod sources;

pub use engine::{query, subdomains, urls, QueryStream};
pub use errors::{ErrorKind, SourceError};
pub use extractor::SubdomainExtractor;
pub use http_client::SourceClient;
pub use options::QueryOptions;
pub use sources::{Finding, FindingKind, FindingStream, Source, SourceContext};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
