use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Startup configuration handed to the application core exactly once.
///
/// Both fields are injected at build time; either or both may be absent.
/// Immutable after hand-off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub data_path: Option<String>,
    pub title: Option<String>,
}

impl AppConfig {
    /// Read the injected build variables from the process environment.
    pub fn from_env() -> Self {
        Self {
            data_path: std::env::var("GANGWAY_DATA_PATH").ok(),
            title: std::env::var("GANGWAY_TITLE").ok(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data_path.is_none() && self.title.is_none()
    }
}

/// How the bridge waits for its dependent elements to appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachStrategy {
    /// Sleep a constant interval, then check once. Loses the race silently
    /// if the core renders slower than the delay.
    FixedDelay,
    /// Re-check on every tree mutation until both elements exist, then stop
    /// watching.
    WatchMutations,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeSettings {
    /// Element the application core is mounted on.
    pub mount_id: String,
    pub audio_id: String,
    pub container_id: String,
    /// Query parameter naming an element to scroll into view on first attach.
    pub anchor_param: String,
    /// Class added to the document root at startup.
    pub root_class: String,
    pub strategy: AttachStrategy,
    /// Delay used by [`AttachStrategy::FixedDelay`].
    pub startup_delay: Duration,
    /// Quiescence window for outbound scroll reports.
    pub debounce_window: Duration,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            mount_id: String::from("app"),
            audio_id: String::from("audio"),
            container_id: String::from("page-container"),
            anchor_param: String::from("anchor"),
            root_class: String::from("gangway__container"),
            strategy: AttachStrategy::WatchMutations,
            startup_delay: Duration::from_millis(200),
            debounce_window: Duration::from_millis(200),
        }
    }
}

/// Serving policy for requests that do not match the manifest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchPolicy {
    /// Always hit the network, falling back to cache on failure.
    NetworkFirst,
    /// Serve unlisted assets from cache when present; manifest assets still
    /// refresh from the network.
    #[default]
    CacheFirstUnlisted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerSettings {
    /// Build-time title the cache name derives from.
    pub title: String,
    /// Manifest version; bumping it retires the previous named cache.
    pub version: u32,
    /// Origin the relative manifest entries resolve against.
    pub scope: Url,
    /// Externally injected data asset, pre-cached alongside the fixed entries.
    pub data_path: Option<String>,
    pub policy: FetchPolicy,
}

impl WorkerSettings {
    pub fn new(title: impl Into<String>, version: u32, scope: Url) -> Self {
        Self {
            title: title.into(),
            version,
            scope,
            data_path: None,
            policy: FetchPolicy::default(),
        }
    }

    pub fn with_data_path(mut self, path: impl Into<String>) -> Self {
        self.data_path = Some(path.into());
        self
    }

    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }
}
