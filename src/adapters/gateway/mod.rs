//! Gateway adapters - HTTP implementation of the dispatch gateway.

mod http_gateway;

pub use http_gateway::{HttpToolGateway, ServerRecord};
