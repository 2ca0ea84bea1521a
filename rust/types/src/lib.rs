mod cluster;
mod infobase;
mod requests;

pub use cluster::*;
pub use infobase::*;
pub use requests::*;

#[allow(clippy::all)]
pub mod ras_proto;
