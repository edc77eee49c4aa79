use std::sync::{Arc, Mutex};

use anyhow::Context;
use keyboard_types::{Code, Modifiers};
use tokio::time::{sleep, Duration};
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use gangway::bridge::Bridge;
use gangway::config::{AppConfig, BridgeSettings, WorkerSettings};
use gangway::headless::{FixtureFetcher, SimPage};
use gangway::ports::{CoreMessage, PageMessage, PlaybackCommand};
use gangway::worker::CacheWorker;

fn main() {
    let subscriber_result = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .try_init();
    if subscriber_result.is_err() {
        // tracing was already initialised; continue silently
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();

    if let Err(err) = rt.block_on(run()) {
        eprintln!("demo session failed: {err:#}");
        std::process::exit(1);
    }
}

/// Scripted session against the simulated page: boot the core, let the
/// bridge attach as elements appear, exchange a few messages, then exercise
/// the cache worker.
async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    let settings = BridgeSettings::default();

    let host = Arc::new(Mutex::new(SimPage::new(
        "http://localhost:5555/?anchor=intro",
    )));
    host.lock().unwrap().insert_element(&settings.mount_id);

    let mut bridge = Bridge::new(Arc::clone(&host), settings.clone());
    let boot = bridge
        .initialize(config)
        .context("mount node missing; core not started")?;
    info!(title = ?boot.config.title, "application core booted");

    // Stand-in application core: log scroll reports, issue a few commands.
    let mut core_ports = boot.ports;
    let core = tokio::spawn(async move {
        core_ports
            .to_bridge
            .send(CoreMessage::Playback(PlaybackCommand {
                path: "/audio/chapter-1.mp3".into(),
                time: 4.5,
                rate: 1.25,
            }))
            .ok();
        core_ports
            .to_bridge
            .send(CoreMessage::ActiveHeight(0.5))
            .ok();
        core_ports
            .to_bridge
            .send(CoreMessage::CopyText("gangway demo".into()))
            .ok();

        if let Some(PageMessage::ScrollRatio(ratio)) = core_ports.from_bridge.recv().await {
            info!(ratio, "core received scroll report");
        }
    });

    let attach = tokio::spawn(async move {
        bridge.attach().await;
        bridge
    });

    // The core "renders" its elements after a beat; the mutation watcher
    // picks them up.
    sleep(Duration::from_millis(50)).await;
    {
        let mut page = host.lock().unwrap();
        page.insert_element("intro");
        page.insert_audio(&settings.audio_id);
        page.insert_scroll_region(&settings.container_id, 800.0);
    }

    let _bridge = attach.await?;

    {
        let mut page = host.lock().unwrap();
        page.emit_scroll(120.0);
        page.emit_scroll(200.0);
        page.press_key(Code::KeyP, Modifiers::SHIFT);
    }

    sleep(settings.debounce_window + Duration::from_millis(100)).await;
    {
        let page = host.lock().unwrap();
        info!(revealed = ?page.revealed, clipboard = ?page.clipboard_writes(), "page state");
        if let Some(audio) = page.audio_state() {
            info!(source = ?audio.source, paused = audio.paused, "audio state");
        }
    }

    // Offline cache worker over a scripted network.
    let scope = Url::parse("http://localhost:5555/")?;
    let fetcher = Arc::new(FixtureFetcher::new());
    for path in ["/", "/index.html", "/bundle.css", "/bundle.js"] {
        fetcher.respond(&format!("http://localhost:5555{path}"), b"asset");
    }
    fetcher.respond("http://localhost:5555/book.json", b"{}");

    let worker = CacheWorker::new(
        WorkerSettings::new("gangway", 1, scope.clone()).with_data_path("/book.json"),
        Arc::clone(&fetcher),
    );
    worker.install().await?;
    worker.activate().await;

    let bundle = scope.join("/bundle.js")?;
    let response = worker.handle_fetch(&bundle).await?;
    info!(url = %bundle, status = response.status, "served through worker");

    // Network goes away; the cached copy still answers.
    fetcher.fail(bundle.as_str(), "offline");
    let offline = worker.handle_fetch(&bundle).await?;
    info!(status = offline.status, "served from cache while offline");

    core.await?;
    Ok(())
}
