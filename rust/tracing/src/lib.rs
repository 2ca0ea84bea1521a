#[cfg(feature = "grpc")]
pub mod grpc_server_trace_layer;
pub mod init_tracer;
#[cfg(feature = "testing")]
pub mod testing;

#[cfg(feature = "grpc")]
pub use grpc_server_trace_layer::*;
pub use init_tracer::{init_gateway_tracing, LogFilter, LogFilterLevel};
