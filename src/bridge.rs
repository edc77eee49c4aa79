//! Bootstrap bridge between the application core and the page.
//!
//! Initializes the core with its startup configuration, forwards debounced
//! scroll ratios outbound, and applies the core's UI-effect commands (scroll
//! position, audio playback, clipboard writes) to the page. Missing page
//! targets silently disable the dependent feature; nothing here surfaces
//! errors to the user.

use std::sync::{Arc, Mutex};

use keyboard_types::{Code, Modifiers};
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::config::{AppConfig, AttachStrategy, BridgeSettings};
use crate::debounce::Debouncer;
use crate::host::{KeyInput, PageHost, ScrollMetrics};
use crate::ports::{self, CoreEndpoint, CoreMessage, PageMessage};
use crate::readiness;

/// Hand-off produced by a successful [`Bridge::initialize`]: the startup
/// configuration plus the core's half of the port pair.
pub struct CoreBoot {
    pub config: AppConfig,
    pub ports: CoreEndpoint,
}

pub struct Bridge<H: PageHost + Send + 'static> {
    host: Arc<Mutex<H>>,
    settings: BridgeSettings,
    to_core: Option<mpsc::UnboundedSender<PageMessage>>,
    from_core: Option<mpsc::UnboundedReceiver<CoreMessage>>,
}

impl<H: PageHost + Send + 'static> Bridge<H> {
    /// Create the bridge and install the page-lifetime keyboard shortcut.
    ///
    /// Shift+P toggles audio play/pause independent of focus. The listener
    /// lives as long as the page; there is no teardown.
    pub fn new(host: Arc<Mutex<H>>, settings: BridgeSettings) -> Self {
        let keys = host.lock().unwrap().subscribe_keys();
        let bridge = Self {
            host,
            settings,
            to_core: None,
            from_core: None,
        };
        bridge.spawn_keyboard(keys);
        bridge
    }

    pub fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    /// Start the application core against the mount node, passing `config`.
    ///
    /// Returns None when the mount node is absent; the page simply runs
    /// without a core, matching the observed behavior.
    pub fn initialize(&mut self, config: AppConfig) -> Option<CoreBoot> {
        {
            let mut host = self.host.lock().unwrap();
            if !host.element_exists(&self.settings.mount_id) {
                trace!(
                    target: "bridge",
                    mount = %self.settings.mount_id,
                    "mount node missing; core not started"
                );
                return None;
            }
            host.add_root_class(&self.settings.root_class);
        }

        let (bridge_end, core_end) = ports::channel();
        self.to_core = Some(bridge_end.to_core);
        self.from_core = Some(bridge_end.from_core);

        debug!(target: "bridge", empty_config = config.is_empty(), "core initialised");
        Some(CoreBoot {
            config,
            ports: core_end,
        })
    }

    /// Wait for the audio element and scroll container, then wire everything
    /// up once. Returns false when readiness never occurred (fixed-delay
    /// race lost, or the mutation stream closed); the dependent features
    /// stay silently disabled.
    pub async fn attach(&mut self) -> bool {
        let ready = match self.settings.strategy {
            AttachStrategy::FixedDelay => {
                let check = self.presence_check();
                readiness::after_delay(self.settings.startup_delay, check).await
            }
            AttachStrategy::WatchMutations => {
                let events = self.host.lock().unwrap().subscribe_mutations();
                readiness::watch_until(events, self.presence_check()).await
            }
        };

        if !ready {
            debug!(
                target: "bridge",
                audio = %self.settings.audio_id,
                container = %self.settings.container_id,
                "dependent elements never appeared; bridge features disabled"
            );
            return false;
        }

        self.reveal_anchor();
        self.spawn_scroll_pump();
        self.spawn_core_loop();
        true
    }

    fn presence_check(&self) -> impl FnMut() -> bool + Send + 'static {
        let host = Arc::clone(&self.host);
        let audio_id = self.settings.audio_id.clone();
        let container_id = self.settings.container_id.clone();
        move || {
            let host = host.lock().unwrap();
            host.element_exists(&audio_id) && host.element_exists(&container_id)
        }
    }

    /// Deep-link: scroll the element named by the anchor query parameter
    /// into view. Runs at most once, on first successful attach.
    fn reveal_anchor(&self) {
        let mut host = self.host.lock().unwrap();
        let location = host.location();
        let anchor = location
            .query_pairs()
            .find(|(key, _)| key == self.settings.anchor_param.as_str())
            .map(|(_, value)| value.into_owned());

        if let Some(id) = anchor {
            if host.reveal(&id) {
                debug!(target: "bridge", anchor = %id, "revealed deep-link anchor");
            } else {
                trace!(target: "bridge", anchor = %id, "anchor element missing");
            }
        }
    }

    /// Forward container scroll events outbound as debounced ratios.
    ///
    /// The ratio divides the scroll offset by the container *width*, not its
    /// height; the core expects width-relative ratios.
    fn spawn_scroll_pump(&self) {
        let Some(to_core) = self.to_core.clone() else {
            return;
        };
        let Some(mut scroll_rx) = self
            .host
            .lock()
            .unwrap()
            .subscribe_scroll(&self.settings.container_id)
        else {
            return;
        };

        let debouncer = Debouncer::new(self.settings.debounce_window, move |m: ScrollMetrics| {
            let ratio = m.scroll_top / m.client_width;
            let _ = to_core.send(PageMessage::ScrollRatio(ratio));
        });

        tokio::spawn(async move {
            while let Some(metrics) = scroll_rx.recv().await {
                debouncer.call(metrics);
            }
        });
    }

    /// Apply the core's UI-effect commands to the page.
    fn spawn_core_loop(&mut self) {
        let Some(mut from_core) = self.from_core.take() else {
            return;
        };
        let host = Arc::clone(&self.host);
        let audio_id = self.settings.audio_id.clone();
        let container_id = self.settings.container_id.clone();

        tokio::spawn(async move {
            while let Some(message) = from_core.recv().await {
                let mut host = host.lock().unwrap();
                match message {
                    CoreMessage::ActiveHeight(ratio) => {
                        if let Some(region) = host.scroll_region(&container_id) {
                            let width = region.client_width();
                            region.set_scroll_top(ratio * width);
                        }
                    }
                    CoreMessage::Playback(cmd) => {
                        if let Some(audio) = host.audio(&audio_id) {
                            audio.set_source(&cmd.path);
                            audio.seek(cmd.time);
                            audio.set_rate(cmd.rate);
                            audio.play();
                        }
                    }
                    CoreMessage::CopyText(text) => {
                        host.clipboard().write_text(&text);
                    }
                }
            }
        });
    }

    fn spawn_keyboard(&self, mut keys: mpsc::UnboundedReceiver<KeyInput>) {
        let host = Arc::clone(&self.host);
        let audio_id = self.settings.audio_id.clone();

        tokio::spawn(async move {
            while let Some(key) = keys.recv().await {
                if key.code != Code::KeyP || !key.modifiers.contains(Modifiers::SHIFT) {
                    continue;
                }
                let mut host = host.lock().unwrap();
                if let Some(audio) = host.audio(&audio_id) {
                    if audio.is_paused() {
                        audio.play();
                    } else {
                        audio.pause();
                    }
                }
            }
        });
    }
}
