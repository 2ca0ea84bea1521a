use http::HeaderValue;
use tracing::instrument::Instrumented;
use tracing::Instrument;

pub const REQUEST_ID_HEADER_KEY: &str = "x-request-id";

/// Opens one span per inbound gRPC request, tagged with the method path and a
/// request id. A request id supplied by the caller is kept; otherwise a fresh
/// one is generated and inserted into the request headers so that handlers
/// and the response path see the same value.
#[derive(Clone, Debug, Default)]
pub struct GrpcServerTraceLayer;

impl<S> tower::Layer<S> for GrpcServerTraceLayer {
    type Service = GrpcServerTraceService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GrpcServerTraceService { inner }
    }
}

#[derive(Clone, Debug)]
pub struct GrpcServerTraceService<S> {
    inner: S,
}

impl<S, ReqBody> tower::Service<http::Request<ReqBody>> for GrpcServerTraceService<S>
where
    S: tower::Service<http::Request<ReqBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Instrumented<S::Future>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: http::Request<ReqBody>) -> Self::Future {
        let request_id = ensure_request_id(req.headers_mut());
        let span = tracing::info_span!(
            "grpc_request",
            otel.name = format!("Request {}", req.uri().path()),
            grpc.method = %req.uri().path(),
            request_id = %request_id,
        );

        let fut = self.inner.call(req);
        fut.instrument(span)
    }
}

fn ensure_request_id(headers: &mut http::HeaderMap) -> String {
    if let Some(existing) = headers
        .get(REQUEST_ID_HEADER_KEY)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
    {
        return existing.to_string();
    }
    let generated = uuid::Uuid::new_v4().to_string();
    if let Ok(value) = HeaderValue::from_str(&generated) {
        headers.insert(REQUEST_ID_HEADER_KEY, value);
    }
    generated
}
