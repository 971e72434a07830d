//! Background request preparation
//!
//! Submissions are queued on a bounded channel shared by a pool of worker
//! tasks that build the method, URL and (optionally compressed) body, then
//! signal the submitter through a single-use channel. Preparation overlaps
//! with in-flight HTTP calls.

use std::sync::Arc;

use feedarc_domain::{Document, FeedError};
use tokio::sync::{mpsc, oneshot, Mutex};

use crate::client::ClientCore;
use crate::compression::should_compress;
use crate::transport::FeedRequest;
use crate::wire::method_and_url;

/// A submission waiting for a preparer worker.
pub(crate) struct PendingDocument {
    pub(crate) document: Document,
    /// Completed exactly once, by the worker that prepared the request.
    pub(crate) prepared: oneshot::Sender<Prepared>,
}

pub(crate) struct Prepared {
    pub(crate) request: Result<FeedRequest, FeedError>,
}

pub(crate) type PendingReceiver = Arc<Mutex<mpsc::Receiver<PendingDocument>>>;

/// Worker loop: turn queued submissions into ready requests and hand them
/// back to the submitter. Exits when the submission channel closes.
pub(crate) async fn run_preparer(core: Arc<ClientCore>, pending: PendingReceiver) {
    loop {
        let submission = pending.lock().await.recv().await;
        let Some(PendingDocument { document, prepared }) = submission else {
            break;
        };
        let request = build_request(&core, document);
        if let Err(unclaimed) = prepared.send(Prepared { request }) {
            // The submitter went away; reclaim the pooled buffer.
            if let Ok(request) = unclaimed.request {
                core.release_request(request);
            }
        }
    }
}

fn build_request(core: &ClientCore, document: Document) -> Result<FeedRequest, FeedError> {
    let (method, url) = method_and_url(&core.options, &core.base_url, &document)?;
    let body = document.body;
    if body.is_empty() {
        return Ok(FeedRequest { method, url, body, gzipped: false });
    }
    if should_compress(core.options.compression, body.len()) {
        let mut buf = core.buffers.get();
        let mut compressor = core.compressors.get();
        let compressed = compressor.compress_into(&body, &mut buf);
        core.compressors.put(compressor);
        match compressed {
            Ok(()) => Ok(FeedRequest { method, url, body: buf, gzipped: true }),
            Err(err) => {
                core.buffers.put(buf);
                Err(err)
            }
        }
    } else {
        Ok(FeedRequest { method, url, body, gzipped: false })
    }
}
