use anyhow::Result;
use image::RgbaImage;
use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use tracing::{info, warn};

use crate::fetch::{HttpClient, fetch_image};
use crate::source::ImageSource;

/// Upper bound on concurrent loads.
const DEFAULT_WORKERS: usize = 4;

/// Result of one background load, keyed by the item's `image` string.
#[derive(Debug)]
pub struct LoadedImage {
    pub source: String,
    pub image: Result<Arc<RgbaImage>>,
}

/// Decodes images on a small worker pool so the frame loop never blocks.
/// Each distinct source is requested at most once. Workers start with the
/// first request and exit when the loader is dropped.
pub struct ImageLoader {
    jobs: Option<Sender<String>>,
    results_tx: Sender<LoadedImage>,
    results_rx: Receiver<LoadedImage>,
    requested: HashSet<String>,
    http: HttpClient,
    workers: usize,
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageLoader {
    pub fn new() -> Self {
        Self::with_workers(DEFAULT_WORKERS)
    }

    pub fn with_workers(workers: usize) -> Self {
        let (results_tx, results_rx) = mpsc::channel();
        Self {
            jobs: None,
            results_tx,
            results_rx,
            requested: HashSet::new(),
            http: HttpClient::default(),
            workers: workers.max(1),
        }
    }

    /// Queues `source` unless it was already requested.
    pub fn request(&mut self, source: &str) -> bool {
        if self.requested.contains(source) {
            return false;
        }
        let Some(jobs) = self.jobs() else {
            return false;
        };
        if jobs.send(source.to_string()).is_err() {
            warn!(%source, "image workers are gone");
            return false;
        }
        self.requested.insert(source.to_string());
        true
    }

    /// Drains every load that finished since the last call.
    pub fn poll(&self) -> Vec<LoadedImage> {
        self.results_rx.try_iter().collect()
    }

    fn jobs(&mut self) -> Option<&Sender<String>> {
        if self.jobs.is_none() {
            self.jobs = self.spawn_workers();
        }
        self.jobs.as_ref()
    }

    fn spawn_workers(&self) -> Option<Sender<String>> {
        let (tx, rx) = mpsc::channel::<String>();
        let rx = Arc::new(Mutex::new(rx));
        let mut spawned = 0;
        for index in 0..self.workers {
            let rx = Arc::clone(&rx);
            let results = self.results_tx.clone();
            let http = self.http.clone();
            let worker = thread::Builder::new()
                .name(format!("orbit-image-{index}"))
                .spawn(move || run_worker(&rx, &results, &http));
            match worker {
                Ok(_) => spawned += 1,
                Err(err) => warn!("failed to spawn image worker: {err}"),
            }
        }
        (spawned > 0).then_some(tx)
    }
}

fn run_worker(jobs: &Mutex<Receiver<String>>, results: &Sender<LoadedImage>, http: &HttpClient) {
    loop {
        let job = match jobs.lock() {
            Ok(rx) => rx.recv(),
            Err(_) => return,
        };
        let Ok(source) = job else {
            return;
        };
        let image = fetch_image(&ImageSource::parse(&source), http).map(Arc::new);
        match &image {
            Ok(image) => {
                info!(%source, width = image.width(), height = image.height(), "image ready")
            }
            Err(err) => warn!(%source, "image failed to load: {err:#}"),
        }
        // The receiver may be gone if the gallery was torn down.
        if results.send(LoadedImage { source, image }).is_err() {
            return;
        }
    }
}
