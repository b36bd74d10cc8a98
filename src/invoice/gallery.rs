// Item photo gallery: concurrent image loads and their placement/finalization

use ::image::DynamicImage;
use std::io::Read;
use tracing::{debug, warn};

use super::canvas::{PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use crate::error::AppError;

/// At most this many photos are shown
pub const MAX_GALLERY_IMAGES: usize = 3;

/// Photo cell size and spacing in mm
pub const IMAGE_WIDTH_MM: f32 = 60.0;
pub const IMAGE_HEIGHT_MM: f32 = 50.0;
pub const IMAGE_GAP_MM: f32 = 10.0;

pub const IMAGE_OPACITY: f32 = 0.6;

/// Vertical gap between the "Item Photos" title and the photo row
pub const TITLE_TO_ROW_MM: f32 = 10.0;

/// Where the title and photo row go after a page break
pub const CONTINUATION_TITLE_Y: f32 = 20.0;
pub const CONTINUATION_ROW_Y: f32 = 30.0;

/// Photos must end this far above the bottom edge
const ROW_BOTTOM_CLEARANCE_MM: f32 = 20.0;

/// When the document is handed to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FinalizePolicy {
    /// Count every completion, success or failure; save once all have
    /// settled.
    #[default]
    AllSettled,
    /// Save when the last-indexed image has loaded, whatever the state of
    /// the others. Failed loads are not observed, so a failure at the last
    /// index means the document is never saved.
    LastIndex,
}

/// Fetches and decodes one image. Called from detached worker threads,
/// which may outlive the build that started them.
pub trait ImageLoader: Send + Sync {
    fn load(&self, source: &str) -> Result<DynamicImage, AppError>;
}

/// Loads `http(s)://` URLs over the network and anything else from disk.
pub struct HttpImageLoader {
    agent: ureq::Agent,
}

impl HttpImageLoader {
    pub fn new(agent: ureq::Agent) -> Self {
        HttpImageLoader { agent }
    }
}

impl ImageLoader for HttpImageLoader {
    fn load(&self, source: &str) -> Result<DynamicImage, AppError> {
        let image_bytes = if source.starts_with("http://") || source.starts_with("https://") {
            let response = self
                .agent
                .get(source)
                .call()
                .map_err(|e| AppError::Image(format!("Failed to fetch URL: {}", e)))?;

            let mut bytes = Vec::new();
            response
                .into_reader()
                .read_to_end(&mut bytes)
                .map_err(|e| AppError::Image(format!("Failed to read response: {}", e)))?;
            bytes
        } else {
            std::fs::read(source).map_err(|e| AppError::Image(format!("{}: {}", source, e)))?
        };

        ::image::load_from_memory(&image_bytes)
            .map_err(|e| AppError::Image(format!("Failed to decode image: {}", e)))
    }
}

/// Top-left corner of a photo cell, and whether a fresh page (with the
/// section title repeated) must be started before drawing it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub x: f32,
    pub y: f32,
    pub new_page: bool,
}

/// What the builder should do with one completion.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Step {
    pub place: Option<Slot>,
    pub finalize: bool,
}

/// Tracks completions for a fixed set of image loads and decides placement
/// and the moment of finalization. Pure state; the builder does the drawing.
#[derive(Debug)]
pub struct GalleryAssembler {
    policy: FinalizePolicy,
    total: usize,
    settled: usize,
    row_y: f32,
    start_x: f32,
    finalized: bool,
}

impl GalleryAssembler {
    /// `row_y` is the top of the photo row on the current page.
    pub fn new(policy: FinalizePolicy, total: usize, row_y: f32) -> Self {
        let row_width = IMAGE_WIDTH_MM * MAX_GALLERY_IMAGES as f32
            + IMAGE_GAP_MM * (MAX_GALLERY_IMAGES - 1) as f32;
        GalleryAssembler {
            policy,
            total,
            settled: 0,
            row_y,
            start_x: (PAGE_WIDTH_MM - row_width) / 2.0,
            finalized: false,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Records that the load for `index` finished, successfully or not.
    pub fn on_complete(&mut self, index: usize, loaded: bool) -> Step {
        if self.finalized {
            debug!("Image {} completed after finalization; ignored", index);
            return Step::default();
        }

        let finalize = match self.policy {
            FinalizePolicy::AllSettled => {
                self.settled += 1;
                self.settled >= self.total
            }
            FinalizePolicy::LastIndex => {
                if !loaded {
                    return Step::default();
                }
                index + 1 == self.total
            }
        };

        let place = loaded.then(|| self.slot(index));
        self.finalized = finalize;
        Step { place, finalize }
    }

    fn slot(&mut self, index: usize) -> Slot {
        let x = self.start_x + index as f32 * (IMAGE_WIDTH_MM + IMAGE_GAP_MM);
        let mut new_page = false;
        if self.row_y + IMAGE_HEIGHT_MM > PAGE_HEIGHT_MM - ROW_BOTTOM_CLEARANCE_MM {
            new_page = true;
            self.row_y = CONTINUATION_ROW_Y;
        }
        Slot { x, y: self.row_y, new_page }
    }
}

/// Logs a failed load; the completion still flows to the assembler.
pub(crate) fn report_failure(index: usize, source: &str, err: &AppError) {
    warn!("Image {} ({}) could not be loaded: {}", index, source, err);
}
