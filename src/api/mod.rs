pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use server::{build_router, start_server};
