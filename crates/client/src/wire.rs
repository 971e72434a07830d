//! HTTP method and URL construction for document operations
//!
//! The produced URL shape is part of the wire contract: path segments are
//! percent-encoded with path-segment rules, and query parameters appear in
//! a fixed order.

use feedarc_domain::{Document, DocumentId, FeedError, Operation};
use reqwest::Method;
use url::Url;

use crate::client::ClientOptions;

pub(crate) fn method_for(operation: Operation) -> Method {
    match operation {
        Operation::Put => Method::POST,
        Operation::Update => Method::PUT,
        Operation::Remove => Method::DELETE,
    }
}

/// The `/document/v1/` path for `id`, appended to `base`.
pub(crate) fn document_url(base: &Url, id: &DocumentId) -> Result<Url, FeedError> {
    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| FeedError::Prepare(format!("base url {base} cannot carry a path")))?;
        segments.pop_if_empty();
        segments.push("document");
        segments.push("v1");
        segments.push(&id.namespace);
        segments.push(&id.doc_type);
        if let Some(number) = id.number {
            segments.push("number");
            segments.push(&number.to_string());
        } else if let Some(group) = &id.group {
            segments.push("group");
            segments.push(group);
        } else {
            segments.push("docid");
        }
        segments.push(&id.user_specific);
    }
    Ok(url)
}

/// The HTTP method and fully qualified URL for `document`.
///
/// Query parameters are appended in a fixed order: timeout, route,
/// tracelevel, dryRun, condition, create. The timeout and tracelevel
/// values are plain; route and condition values are query-escaped.
pub(crate) fn method_and_url(
    options: &ClientOptions,
    base: &Url,
    document: &Document,
) -> Result<(Method, Url), FeedError> {
    let method = method_for(document.operation);
    let mut url = document_url(base, &document.id)?;
    {
        let mut query = url.query_pairs_mut();
        if let Some(timeout) = options.timeout.filter(|t| !t.is_zero()) {
            query.append_pair("timeout", &format!("{}ms", timeout.as_millis()));
        }
        if let Some(route) = &options.route {
            query.append_pair("route", route);
        }
        if options.trace_level > 0 {
            query.append_pair("tracelevel", &options.trace_level.to_string());
        }
        if options.speedtest {
            query.append_pair("dryRun", "true");
        }
        if let Some(condition) = &document.condition {
            query.append_pair("condition", condition);
        }
        if document.create {
            query.append_pair("create", "true");
        }
    }
    if url.query() == Some("") {
        url.set_query(None);
    }
    Ok((method, url))
}
