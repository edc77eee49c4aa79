//! In-memory page host and fetcher for tests and the demo binary.

use std::collections::HashMap;

use keyboard_types::{Code, Modifiers};
use tokio::sync::mpsc;
use url::Url;

use crate::host::{
    AudioHandle, Clipboard, KeyInput, MutationEvent, PageHost, ScrollMetrics, ScrollRegion,
};
use crate::worker::{AssetResponse, FetchError, Fetcher};

#[derive(Debug, Default)]
pub struct SimAudio {
    pub source: Option<String>,
    pub current_time: f64,
    pub rate: f64,
    pub paused: bool,
    pub play_count: u32,
}

impl SimAudio {
    fn new() -> Self {
        Self {
            paused: true,
            rate: 1.0,
            ..Self::default()
        }
    }
}

impl AudioHandle for SimAudio {
    fn set_source(&mut self, path: &str) {
        self.source = Some(path.to_string());
    }

    fn seek(&mut self, time: f64) {
        self.current_time = time;
    }

    fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    fn play(&mut self) {
        self.paused = false;
        self.play_count += 1;
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}

#[derive(Debug)]
pub struct SimScroll {
    pub scroll_top: f64,
    pub client_width: f64,
}

impl ScrollRegion for SimScroll {
    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn set_scroll_top(&mut self, offset: f64) {
        self.scroll_top = offset;
    }

    fn client_width(&self) -> f64 {
        self.client_width
    }
}

#[derive(Debug, Default)]
pub struct SimClipboard {
    pub writes: Vec<String>,
}

impl Clipboard for SimClipboard {
    fn write_text(&mut self, text: &str) {
        self.writes.push(text.to_string());
    }
}

/// Simulated page: elements are bare ids, mutations are broadcast on insert,
/// and audio/scroll/clipboard state stays inspectable after the fact.
pub struct SimPage {
    location: Url,
    elements: Vec<String>,
    pub root_classes: Vec<String>,
    pub revealed: Vec<String>,
    audio: Option<(String, SimAudio)>,
    scroll: Option<(String, SimScroll)>,
    clipboard: SimClipboard,
    mutation_subscribers: Vec<mpsc::UnboundedSender<MutationEvent>>,
    scroll_subscribers: Vec<mpsc::UnboundedSender<ScrollMetrics>>,
    key_subscribers: Vec<mpsc::UnboundedSender<KeyInput>>,
}

impl SimPage {
    pub fn new(location: &str) -> Self {
        Self {
            location: Url::parse(location).expect("valid location URL"),
            elements: Vec::new(),
            root_classes: Vec::new(),
            revealed: Vec::new(),
            audio: None,
            scroll: None,
            clipboard: SimClipboard::default(),
            mutation_subscribers: Vec::new(),
            scroll_subscribers: Vec::new(),
            key_subscribers: Vec::new(),
        }
    }

    /// Add a plain element and notify mutation watchers.
    pub fn insert_element(&mut self, id: &str) {
        self.elements.push(id.to_string());
        self.notify_mutation();
    }

    /// Add an audio element under `id`.
    pub fn insert_audio(&mut self, id: &str) {
        self.audio = Some((id.to_string(), SimAudio::new()));
        self.elements.push(id.to_string());
        self.notify_mutation();
    }

    /// Add a scrollable container under `id`.
    pub fn insert_scroll_region(&mut self, id: &str, client_width: f64) {
        self.scroll = Some((
            id.to_string(),
            SimScroll {
                scroll_top: 0.0,
                client_width,
            },
        ));
        self.elements.push(id.to_string());
        self.notify_mutation();
    }

    /// Dispatch a scroll event carrying the container's current metrics.
    pub fn emit_scroll(&mut self, scroll_top: f64) {
        let Some((_, region)) = self.scroll.as_mut() else {
            return;
        };
        region.scroll_top = scroll_top;
        let metrics = ScrollMetrics {
            scroll_top: region.scroll_top,
            client_width: region.client_width,
        };
        self.scroll_subscribers
            .retain(|tx| tx.send(metrics).is_ok());
    }

    pub fn press_key(&mut self, code: Code, modifiers: Modifiers) {
        let input = KeyInput::new(code, modifiers);
        self.key_subscribers.retain(|tx| tx.send(input).is_ok());
    }

    pub fn audio_state(&self) -> Option<&SimAudio> {
        self.audio.as_ref().map(|(_, audio)| audio)
    }

    pub fn scroll_state(&self) -> Option<&SimScroll> {
        self.scroll.as_ref().map(|(_, region)| region)
    }

    pub fn clipboard_writes(&self) -> &[String] {
        &self.clipboard.writes
    }

    fn notify_mutation(&mut self) {
        self.mutation_subscribers
            .retain(|tx| tx.send(MutationEvent).is_ok());
    }
}

impl PageHost for SimPage {
    fn location(&self) -> Url {
        self.location.clone()
    }

    fn element_exists(&self, id: &str) -> bool {
        self.elements.iter().any(|e| e == id)
    }

    fn reveal(&mut self, id: &str) -> bool {
        if !self.element_exists(id) {
            return false;
        }
        self.revealed.push(id.to_string());
        true
    }

    fn add_root_class(&mut self, class: &str) {
        self.root_classes.push(class.to_string());
    }

    fn audio(&mut self, id: &str) -> Option<&mut dyn AudioHandle> {
        match self.audio.as_mut() {
            Some((audio_id, audio)) if audio_id == id => Some(audio),
            _ => None,
        }
    }

    fn scroll_region(&mut self, id: &str) -> Option<&mut dyn ScrollRegion> {
        match self.scroll.as_mut() {
            Some((region_id, region)) if region_id == id => Some(region),
            _ => None,
        }
    }

    fn clipboard(&mut self) -> &mut dyn Clipboard {
        &mut self.clipboard
    }

    fn subscribe_mutations(&mut self) -> mpsc::UnboundedReceiver<MutationEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.mutation_subscribers.push(tx);
        rx
    }

    fn subscribe_scroll(&mut self, id: &str) -> Option<mpsc::UnboundedReceiver<ScrollMetrics>> {
        match self.scroll.as_ref() {
            Some((region_id, _)) if region_id == id => {
                let (tx, rx) = mpsc::unbounded_channel();
                self.scroll_subscribers.push(tx);
                Some(rx)
            }
            _ => None,
        }
    }

    fn subscribe_keys(&mut self) -> mpsc::UnboundedReceiver<KeyInput> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.key_subscribers.push(tx);
        rx
    }
}

/// Scripted network fetcher: canned responses or failures per URL, with a
/// call log for asserting which requests actually went out.
#[derive(Default)]
pub struct FixtureFetcher {
    routes: std::sync::Mutex<HashMap<String, Result<AssetResponse, String>>>,
    calls: std::sync::Mutex<Vec<String>>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, body: &[u8]) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(AssetResponse::ok(body.to_vec())));
    }

    pub fn fail(&self, url: &str, reason: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(reason.to_string()));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == url).count()
    }
}

impl Fetcher for FixtureFetcher {
    async fn fetch(&self, url: &Url) -> Result<AssetResponse, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.routes.lock().unwrap().get(url.as_str()) {
            Some(Ok(response)) => Ok(response.clone()),
            Some(Err(reason)) => Err(FetchError::Network(reason.clone())),
            None => Err(FetchError::Network(format!("no route for {url}"))),
        }
    }
}
