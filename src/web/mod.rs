//! Web UI module: server-rendered pages over the domain operations.

mod server;
pub mod templates;

pub use server::{BoardServer, build_router, start_server};
