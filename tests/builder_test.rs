//! Invoice builder end to end, with in-memory photo loaders and sinks.

use image::{DynamicImage, Rgb, RgbImage};
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use garage_invoice::config::AppConfig;
use garage_invoice::error::AppError;
use garage_invoice::invoice::{
    BuildOutcome, DirectorySink, DocumentBuilder, FinalizePolicy, ImageLoader, InvoiceBuilder, MemorySink,
};
use garage_invoice::listing::ListingRecord;

/// What a scripted load does before returning.
#[derive(Clone, Copy)]
enum Load {
    After(u64),
    FailAfter(u64),
}

struct ScriptedLoader {
    script: HashMap<String, Load>,
}

impl ScriptedLoader {
    fn new(script: &[(&str, Load)]) -> Self {
        ScriptedLoader {
            script: script.iter().map(|(s, l)| (s.to_string(), *l)).collect(),
        }
    }
}

impl ImageLoader for ScriptedLoader {
    fn load(&self, source: &str) -> Result<DynamicImage, AppError> {
        match self.script.get(source).copied().unwrap_or(Load::After(0)) {
            Load::After(ms) => {
                thread::sleep(Duration::from_millis(ms));
                Ok(photo())
            }
            Load::FailAfter(ms) => {
                thread::sleep(Duration::from_millis(ms));
                Err(AppError::Image(format!("{source}: 404 Not Found")))
            }
        }
    }
}

fn photo() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 12, Rgb([20, 90, 160])))
}

/// Loads every photo at once except `held`, which waits until the test
/// drops the returned sender and then fails or succeeds as asked.
struct GatedLoader {
    held: String,
    fail_held: bool,
    gate: Mutex<Receiver<()>>,
}

impl GatedLoader {
    fn new(held: &str, fail_held: bool) -> (Arc<Self>, Sender<()>) {
        let (open, gate) = mpsc::channel();
        let loader = GatedLoader {
            held: held.to_string(),
            fail_held,
            gate: Mutex::new(gate),
        };
        (Arc::new(loader), open)
    }
}

impl ImageLoader for GatedLoader {
    fn load(&self, source: &str) -> Result<DynamicImage, AppError> {
        if source == self.held {
            // returns once the sender is dropped
            let _ = self.gate.lock().map(|gate| gate.recv());
            if self.fail_held {
                return Err(AppError::Image(format!("{source}: connection reset")));
            }
        }
        Ok(photo())
    }
}

/// Polls until `done` reports true or `limit` passes.
fn wait_for(limit: Duration, done: impl Fn() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < limit {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    done()
}

fn listing(images: &[&str]) -> ListingRecord {
    ListingRecord {
        id: "6f1c2d3e-4a5b-4c6d-8e9f-0a1b2c3d4e5f".to_string(),
        listing_title: "1998 E-One Hurricane Rescue Pumper".to_string(),
        listing_description: "Kept indoors, full service records available.".to_string(),
        item_brand: "E-One".to_string(),
        selling_price: 38500.0,
        item_weight: Some(36000.0),
        is_shippable: false,
        address_primary: "455 County Line Rd".to_string(),
        address_city: "Lancaster".to_string(),
        address_state: "PA".to_string(),
        address_zip: "17601".to_string(),
        image_urls: images.iter().map(|s| s.to_string()).collect(),
    }
}

fn config(policy: FinalizePolicy) -> AppConfig {
    AppConfig {
        finalize: policy,
        ..AppConfig::default()
    }
}

#[test]
fn listing_without_photos_is_saved_once() {
    let sink = MemorySink::new();
    let loader = Arc::new(ScriptedLoader::new(&[]));
    let builder = InvoiceBuilder::new(&config(FinalizePolicy::AllSettled), loader, &sink);

    let outcome = builder.build(Some(&listing(&[])), "Ada", "ada@example.com").unwrap();

    assert_eq!(
        outcome,
        BuildOutcome::Saved {
            file_name: "GarageInvoice-Ada.pdf".to_string(),
            pages: 1,
            images_placed: 0,
        }
    );
    let saved = sink.saved();
    assert_eq!(saved.len(), 1);
    assert!(saved[0].bytes.starts_with(b"%PDF"));
    assert!(saved[0].bytes.len() > 1000);
}

#[test]
fn all_settled_places_photos_in_any_arrival_order() {
    let sink = MemorySink::new();
    let loader = Arc::new(ScriptedLoader::new(&[
        ("a.jpg", Load::After(120)),
        ("b.jpg", Load::After(60)),
        ("c.jpg", Load::After(0)),
    ]));
    let builder = InvoiceBuilder::new(&config(FinalizePolicy::AllSettled), loader, &sink);

    let outcome = builder
        .build(Some(&listing(&["a.jpg", "b.jpg", "c.jpg"])), "Ada", "ada@example.com")
        .unwrap();

    assert!(
        matches!(outcome, BuildOutcome::Saved { images_placed: 3, .. }),
        "got {outcome:?}"
    );
    assert_eq!(sink.saved().len(), 1);
}

#[test]
fn all_settled_saves_when_every_photo_fails() {
    let sink = MemorySink::new();
    let loader = Arc::new(ScriptedLoader::new(&[("a.jpg", Load::FailAfter(0)), ("b.jpg", Load::FailAfter(10))]));
    let builder = InvoiceBuilder::new(&config(FinalizePolicy::AllSettled), loader, &sink);

    let outcome = builder
        .build(Some(&listing(&["a.jpg", "b.jpg"])), "Ada", "ada@example.com")
        .unwrap();

    assert!(
        matches!(outcome, BuildOutcome::Saved { images_placed: 0, .. }),
        "got {outcome:?}"
    );
    assert_eq!(sink.saved().len(), 1);
}

#[test]
fn last_index_saves_as_soon_as_last_photo_arrives() {
    let sink = MemorySink::new();
    let loader = Arc::new(ScriptedLoader::new(&[
        ("a.jpg", Load::After(300)),
        ("b.jpg", Load::After(300)),
        ("c.jpg", Load::After(0)),
    ]));
    let builder = InvoiceBuilder::new(&config(FinalizePolicy::LastIndex), loader, &sink);

    let outcome = builder
        .build(Some(&listing(&["a.jpg", "b.jpg", "c.jpg"])), "Ada", "ada@example.com")
        .unwrap();

    // the two slower photos finish after the save and are left out
    assert!(
        matches!(outcome, BuildOutcome::Saved { images_placed: 1, .. }),
        "got {outcome:?}"
    );
    assert_eq!(sink.saved().len(), 1);
}

#[test]
fn last_index_failure_leaves_invoice_unsaved() {
    let sink = MemorySink::new();
    let loader = Arc::new(ScriptedLoader::new(&[("c.jpg", Load::FailAfter(20))]));
    let builder = InvoiceBuilder::new(&config(FinalizePolicy::LastIndex), loader, &sink);

    let outcome = builder
        .build(Some(&listing(&["a.jpg", "b.jpg", "c.jpg"])), "Ada", "ada@example.com")
        .unwrap();

    assert_eq!(outcome, BuildOutcome::Abandoned { images_placed: 2 });
    assert!(sink.saved().is_empty());
}

#[test]
fn directory_sink_receives_sanitized_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let sink = DirectorySink::new(dir.path());
    let loader = Arc::new(ScriptedLoader::new(&[]));
    let builder = InvoiceBuilder::new(&config(FinalizePolicy::AllSettled), loader, &sink);

    let outcome = builder
        .build(Some(&listing(&[])), "R/D Team", "team@example.com")
        .unwrap();

    match outcome {
        BuildOutcome::Saved { file_name, .. } => {
            assert_eq!(file_name, "GarageInvoice-R_D Team.pdf");
            let written = std::fs::read(dir.path().join(&file_name)).unwrap();
            assert!(written.starts_with(b"%PDF"));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn last_index_returns_without_waiting_for_earlier_photos() {
    let sink = MemorySink::new();
    let cfg = config(FinalizePolicy::LastIndex);
    let (loader, gate) = GatedLoader::new("a.jpg", false);
    let listing = listing(&["a.jpg", "b.jpg", "c.jpg"]);

    thread::scope(|s| {
        let build = s.spawn(|| InvoiceBuilder::new(&cfg, loader, &sink).build(Some(&listing), "Ada", "ada@example.com"));

        assert!(
            wait_for(Duration::from_secs(5), || build.is_finished()),
            "build is still blocked on a.jpg after saving"
        );
        let outcome = build.join().unwrap().unwrap();
        // b.jpg may land before or after c.jpg; a.jpg never does
        assert!(
            matches!(outcome, BuildOutcome::Saved { images_placed: 1..=2, .. }),
            "got {outcome:?}"
        );
        assert_eq!(sink.saved().len(), 1);
    });
    drop(gate);
}

#[test]
fn last_index_never_saves_while_last_photo_is_pending() {
    let sink = MemorySink::new();
    let cfg = config(FinalizePolicy::LastIndex);
    let (loader, gate) = GatedLoader::new("c.jpg", true);
    let listing = listing(&["a.jpg", "b.jpg", "c.jpg"]);

    thread::scope(|s| {
        let build = s.spawn(|| InvoiceBuilder::new(&cfg, loader, &sink).build(Some(&listing), "Ada", "ada@example.com"));

        thread::sleep(Duration::from_millis(300));
        assert!(!build.is_finished());
        assert!(sink.saved().is_empty());

        // the last photo finally fails: the trigger never fires
        drop(gate);
        let outcome = build.join().unwrap().unwrap();
        assert_eq!(outcome, BuildOutcome::Abandoned { images_placed: 2 });
    });
    assert!(sink.saved().is_empty());
}

#[test]
fn all_settled_waits_for_a_slow_photo() {
    let sink = MemorySink::new();
    let cfg = config(FinalizePolicy::AllSettled);
    let (loader, gate) = GatedLoader::new("b.jpg", false);
    let listing = listing(&["a.jpg", "b.jpg", "c.jpg"]);

    thread::scope(|s| {
        let build = s.spawn(|| InvoiceBuilder::new(&cfg, loader, &sink).build(Some(&listing), "Ada", "ada@example.com"));

        thread::sleep(Duration::from_millis(300));
        assert!(sink.saved().is_empty());

        drop(gate);
        let outcome = build.join().unwrap().unwrap();
        assert!(
            matches!(outcome, BuildOutcome::Saved { images_placed: 3, .. }),
            "got {outcome:?}"
        );
    });
    assert_eq!(sink.saved().len(), 1);
}
