use crate::endpoint::{
    Endpoint, EndpointEnvelope, EndpointError, EndpointProvider, EndpointRequest,
    EndpointResponse, ResponseKind,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use ras_types::ClusterSummary;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub(crate) const CREATED_ID: &str = "ib-created";

#[derive(Debug, Default)]
struct Script {
    acquires: AtomicUsize,
    sent: Mutex<Vec<EndpointRequest>>,
    acquire_error: Mutex<Option<EndpointError>>,
    replies: Mutex<VecDeque<Result<EndpointResponse, EndpointError>>>,
    cancel_during_acquire: Mutex<Option<CancellationToken>>,
    hang_on_send: AtomicBool,
}

/// An endpoint provider that records every interaction and answers from a
/// script. Unscripted sends get a plausible reply of the requested kind.
#[derive(Clone, Debug, Default)]
pub(crate) struct ScriptedRas {
    script: Arc<Script>,
}

impl ScriptedRas {
    pub(crate) fn reply(&self, reply: Result<EndpointResponse, EndpointError>) -> &Self {
        self.script.replies.lock().push_back(reply);
        self
    }

    pub(crate) fn fail_with(&self, message: &str) -> &Self {
        self.reply(Err(EndpointError::new(message)))
    }

    pub(crate) fn fail_acquire(&self, message: &str) {
        *self.script.acquire_error.lock() = Some(EndpointError::new(message));
    }

    pub(crate) fn cancel_during_acquire(&self, cancel: CancellationToken) {
        *self.script.cancel_during_acquire.lock() = Some(cancel);
    }

    pub(crate) fn hang_on_send(&self) {
        self.script.hang_on_send.store(true, Ordering::SeqCst);
    }

    pub(crate) fn acquires(&self) -> usize {
        self.script.acquires.load(Ordering::SeqCst)
    }

    pub(crate) fn sent(&self) -> Vec<EndpointRequest> {
        self.script.sent.lock().clone()
    }

    pub(crate) fn interactions(&self) -> usize {
        self.acquires() + self.sent().len()
    }
}

fn default_reply(envelope: &EndpointEnvelope) -> EndpointResponse {
    match (&envelope.request, envelope.respond) {
        (EndpointRequest::CreateInfobase(info), ResponseKind::Infobase) => {
            let mut created = info.clone();
            created.uuid = Some(CREATED_ID.to_string());
            EndpointResponse::Infobase(created)
        }
        (
            EndpointRequest::UpdateInfobase(info) | EndpointRequest::UnregisterInfobase(info),
            ResponseKind::Infobase,
        ) => EndpointResponse::Infobase(info.clone()),
        (EndpointRequest::TerminateSession(session), ResponseKind::Session) => {
            EndpointResponse::Session(session.clone())
        }
        (EndpointRequest::GetClusterInfo { cluster_id }, ResponseKind::Cluster) => {
            EndpointResponse::Cluster(ClusterSummary {
                uuid: cluster_id.clone(),
                ..Default::default()
            })
        }
        (_, ResponseKind::Authenticated) => EndpointResponse::Authenticated,
        (_, ResponseKind::Clusters) => EndpointResponse::Clusters(vec![]),
        (_, ResponseKind::Cluster) => EndpointResponse::Cluster(Default::default()),
        (_, ResponseKind::Sessions) => EndpointResponse::Sessions(vec![]),
        (_, ResponseKind::InfobaseSummaries) => EndpointResponse::InfobaseSummaries(vec![]),
        (_, ResponseKind::Infobase) => EndpointResponse::Infobase(Default::default()),
        (_, ResponseKind::Session) => EndpointResponse::Session(Default::default()),
    }
}

#[async_trait]
impl EndpointProvider for ScriptedRas {
    async fn acquire(
        &self,
        _cancel: &CancellationToken,
    ) -> Result<Arc<dyn Endpoint>, EndpointError> {
        self.script.acquires.fetch_add(1, Ordering::SeqCst);
        if let Some(cancel) = self.script.cancel_during_acquire.lock().take() {
            cancel.cancel();
        }
        if let Some(err) = self.script.acquire_error.lock().clone() {
            return Err(err);
        }
        Ok(Arc::new(self.clone()))
    }
}

#[async_trait]
impl Endpoint for ScriptedRas {
    async fn send(
        &self,
        envelope: EndpointEnvelope,
        _cancel: &CancellationToken,
    ) -> Result<EndpointResponse, EndpointError> {
        self.script.sent.lock().push(envelope.request.clone());
        if self.script.hang_on_send.load(Ordering::SeqCst) {
            futures::future::pending::<()>().await;
        }
        let scripted = self.script.replies.lock().pop_front();
        scripted.unwrap_or_else(|| Ok(default_reply(&envelope)))
    }
}
