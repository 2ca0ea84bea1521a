//! Ordered interceptor stages that wrap every gRPC handler.
//!
//! Stages run in registration order around the handler. Security stages
//! must come before observability stages, so nothing observable ever sees
//! a request before its credentials were dealt with.

mod audit;
mod fields;
mod sanitize;

pub use audit::{AuditStage, DESTRUCTIVE_METHODS};
pub use fields::{AuditFields, AuditMetadata, InboundMessage, MASK};
pub use sanitize::SanitizeStage;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use ras_error::{ErrorCodes, RasError};
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tonic::Status;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageKind {
    Security,
    Observability,
    Other,
}

/// What a stage can see of a unary request.
#[derive(Clone, Copy, Debug)]
pub enum RequestView<'a> {
    Message(&'a dyn InboundMessage),
    Unstructured,
}

#[derive(Clone, Copy, Debug)]
pub enum CallKind<'a> {
    Unary(RequestView<'a>),
    Stream {
        is_client_stream: bool,
        is_server_stream: bool,
    },
}

#[derive(Clone, Copy, Debug)]
pub struct CallInfo<'a> {
    pub method: &'static str,
    pub kind: CallKind<'a>,
}

/// The remainder of the chain. A stage runs it at most once.
pub struct Next<'a> {
    stages: &'a [Arc<dyn Interceptor>],
    handler: BoxFuture<'a, Result<(), Status>>,
}

impl Next<'_> {
    pub async fn run(self, call: &CallInfo<'_>) -> Result<(), Status> {
        match self.stages.split_first() {
            Some((stage, rest)) => {
                stage
                    .intercept(
                        call,
                        Next {
                            stages: rest,
                            handler: self.handler,
                        },
                    )
                    .await
            }
            None => self.handler.await,
        }
    }
}

#[async_trait]
pub trait Interceptor: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn kind(&self) -> StageKind;

    async fn intercept(&self, call: &CallInfo<'_>, next: Next<'_>) -> Result<(), Status>;
}

#[derive(Debug, Error)]
#[error("observability stage {observability} is registered before security stage {security}")]
pub struct ChainOrderError {
    observability: &'static str,
    security: &'static str,
}

impl RasError for ChainOrderError {
    fn code(&self) -> ErrorCodes {
        ErrorCodes::InvalidArgument
    }
}

#[derive(Clone, Debug)]
pub struct InterceptorChain {
    stages: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn new(stages: Vec<Arc<dyn Interceptor>>) -> Result<Self, ChainOrderError> {
        let mut first_observability = None;
        for stage in &stages {
            match stage.kind() {
                StageKind::Observability if first_observability.is_none() => {
                    first_observability = Some(stage.name());
                }
                StageKind::Security => {
                    if let Some(observability) = first_observability {
                        return Err(ChainOrderError {
                            observability,
                            security: stage.name(),
                        });
                    }
                }
                _ => {}
            }
        }
        Ok(Self { stages })
    }

    /// Sanitizing logger first, then the audit stage.
    pub fn standard() -> Self {
        Self {
            stages: vec![Arc::new(SanitizeStage), Arc::new(AuditStage)],
        }
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    pub async fn unary<T, F>(
        &self,
        method: &'static str,
        request: RequestView<'_>,
        handler: F,
    ) -> Result<T, Status>
    where
        T: Send,
        F: Future<Output = Result<T, Status>> + Send,
    {
        let call = CallInfo {
            method,
            kind: CallKind::Unary(request),
        };
        self.run(&call, handler).await
    }

    pub async fn stream<T, F>(
        &self,
        method: &'static str,
        is_client_stream: bool,
        is_server_stream: bool,
        handler: F,
    ) -> Result<T, Status>
    where
        T: Send,
        F: Future<Output = Result<T, Status>> + Send,
    {
        let call = CallInfo {
            method,
            kind: CallKind::Stream {
                is_client_stream,
                is_server_stream,
            },
        };
        self.run(&call, handler).await
    }

    async fn run<T, F>(&self, call: &CallInfo<'_>, handler: F) -> Result<T, Status>
    where
        T: Send,
        F: Future<Output = Result<T, Status>> + Send,
    {
        let mut slot = None;
        let output = &mut slot;
        let handler = async move {
            *output = Some(handler.await?);
            Ok(())
        }
        .boxed();
        Next {
            stages: &self.stages,
            handler,
        }
        .run(call)
        .await?;
        slot.ok_or_else(|| Status::internal(format!("{} was not handled", call.method)))
    }
}
