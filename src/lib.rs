pub mod analyzer;
pub mod candle;
pub mod candle_store;
pub mod config;
pub mod error;
pub mod indicator;
pub mod model;

/// 설정 로더
pub mod config_loader;
