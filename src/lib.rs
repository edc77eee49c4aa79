// Library exports for testing

pub mod bridge;
pub mod config;
pub mod debounce;
pub mod headless;
pub mod host;
pub mod ports;
pub mod readiness;
pub mod worker;

// Re-export commonly used types for tests
pub use bridge::{Bridge, CoreBoot};
pub use config::{AppConfig, AttachStrategy, BridgeSettings, FetchPolicy, WorkerSettings};
pub use ports::{CoreMessage, PageMessage, PlaybackCommand};
pub use worker::{CacheWorker, Fetcher};
