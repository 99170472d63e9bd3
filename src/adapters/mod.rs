// Adapters layer: concrete implementations for external systems (http backend, session storage).

pub mod backend;
pub mod http;
pub mod retry;
pub mod session;
