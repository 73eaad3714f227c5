// Adapters layer: concrete implementations for external systems (record stores, http).

pub mod http;
pub mod storage;
