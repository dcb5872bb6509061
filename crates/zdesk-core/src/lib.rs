//! Request dispatch and server lifecycle for zdesk.

pub mod dispatch;
pub mod server;

pub use dispatch::dispatch;
pub use server::{Server, ServerConfig};
