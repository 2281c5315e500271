//! JSON-lines transport for the Quill evaluation service.

mod server;

pub use server::{serve, Request};
