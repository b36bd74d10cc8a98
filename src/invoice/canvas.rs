// Drawing surface over printpdf using top-left millimetre coordinates

use ::image::{DynamicImage, Rgba, RgbImage};
use printpdf::path::PaintMode;
use printpdf::*;
use std::io::{BufWriter, Cursor};
use tracing::debug;

use super::metrics::{text_width_mm, FontWeight};
use crate::error::AppError;

/// A4 portrait dimensions in mm
pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

/// Resolution images are embedded at before scaling into their cell
const IMAGE_DPI: f32 = 300.0;

/// Longest edge an embedded image is reduced to
const MAX_IMAGE_EDGE_PX: u32 = 800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb8(pub u8, pub u8, pub u8);

impl Rgb8 {
    pub const BLACK: Rgb8 = Rgb8(0, 0, 0);

    fn to_color(self) -> Color {
        Color::Rgb(Rgb::new(
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
            None,
        ))
    }
}

/// A line of text as placed on the page, in the same top-left mm
/// coordinates the caller used. `page` is zero-based.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub page: usize,
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub font_size: f32,
    pub weight: FontWeight,
}

pub struct Canvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font_regular: IndirectFontRef,
    font_bold: IndirectFontRef,
    pages: usize,
    runs: Vec<TextRun>,
}

impl Canvas {
    pub fn new(title: &str) -> Result<Self, AppError> {
        let (doc, page1, layer1) = PdfDocument::new(
            title,
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Layer 1",
        );
        let layer = doc.get_page(page1).get_layer(layer1);

        let font_regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AppError::Pdf(e.to_string()))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| AppError::Pdf(e.to_string()))?;

        Ok(Canvas {
            doc,
            layer,
            font_regular,
            font_bold,
            pages: 1,
            runs: Vec::new(),
        })
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Every line of text drawn so far, in drawing order.
    pub fn text_runs(&self) -> &[TextRun] {
        &self.runs
    }

    pub fn add_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.pages += 1;
        debug!("Started page {}", self.pages);
    }

    /// Draws one line of text with its baseline at `y` (mm from the top).
    /// `x` is the left edge, centre or right edge depending on `align`.
    pub fn text(&mut self, text: &str, font_size: f32, weight: FontWeight, x: f32, y: f32, align: Align) {
        let width = text_width_mm(text, weight, font_size);
        let left = match align {
            Align::Left => x,
            Align::Center => x - width / 2.0,
            Align::Right => x - width,
        };
        let font = match weight {
            FontWeight::Regular => &self.font_regular,
            FontWeight::Bold => &self.font_bold,
        };
        self.layer
            .use_text(text, font_size, Mm(left), Mm(PAGE_HEIGHT_MM - y), font);
        self.runs.push(TextRun {
            page: self.pages - 1,
            x: left,
            y,
            text: text.to_string(),
            font_size,
            weight,
        });
    }

    pub fn fill_rect(&self, x: f32, y_top: f32, width: f32, height: f32, color: Rgb8) {
        self.layer.set_fill_color(color.to_color());
        let rect = Rect::new(
            Mm(x),
            Mm(PAGE_HEIGHT_MM - y_top - height),
            Mm(x + width),
            Mm(PAGE_HEIGHT_MM - y_top),
        )
        .with_mode(PaintMode::Fill);
        self.layer.add_rect(rect);
        // text shares the fill colour
        self.layer.set_fill_color(Rgb8::BLACK.to_color());
    }

    /// Places `img` stretched to `width` x `height` mm with its top-left
    /// corner at (`x`, `y_top`), faded to `opacity` over the white page.
    pub fn image(&self, img: &DynamicImage, x: f32, y_top: f32, width: f32, height: f32, opacity: f32) {
        let img = if img.width() > MAX_IMAGE_EDGE_PX || img.height() > MAX_IMAGE_EDGE_PX {
            img.thumbnail(MAX_IMAGE_EDGE_PX, MAX_IMAGE_EDGE_PX)
        } else {
            img.clone()
        };
        let rgb_image = composite_on_white(&img, opacity);
        let (width_px, height_px) = rgb_image.dimensions();

        let image = Image::from(ImageXObject {
            width: Px(width_px as usize),
            height: Px(height_px as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: true,
            image_data: rgb_image.into_raw(),
            image_filter: None,
            clipping_bbox: None,
            smask: None,
        });

        // Natural size at IMAGE_DPI, then stretched into the cell
        let natural_width = width_px as f32 / IMAGE_DPI * 25.4;
        let natural_height = height_px as f32 / IMAGE_DPI * 25.4;

        image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(x)),
                translate_y: Some(Mm(PAGE_HEIGHT_MM - y_top - height)),
                dpi: Some(IMAGE_DPI),
                scale_x: Some(width / natural_width),
                scale_y: Some(height / natural_height),
                ..Default::default()
            },
        );
    }

    /// Serializes the document. Nothing is written anywhere yet.
    pub fn finish(self) -> Result<Vec<u8>, AppError> {
        let mut buf = Vec::new();
        {
            let mut writer = BufWriter::new(Cursor::new(&mut buf));
            self.doc
                .save(&mut writer)
                .map_err(|e| AppError::Pdf(e.to_string()))?;
        }
        Ok(buf)
    }
}

/// Flattens transparency and the requested opacity against a white
/// background, since the page behind every image is blank.
pub fn composite_on_white(img: &DynamicImage, opacity: f32) -> RgbImage {
    let rgba_image = img.to_rgba8();
    let (width_px, height_px) = rgba_image.dimensions();
    let opacity = opacity.clamp(0.0, 1.0);

    let mut rgb_image = RgbImage::new(width_px, height_px);
    for (x, y, pixel) in rgba_image.enumerate_pixels() {
        let Rgba([r, g, b, a]) = *pixel;
        let alpha = a as f32 / 255.0 * opacity;
        let bg = 255.0;
        let out_r = (r as f32 * alpha + bg * (1.0 - alpha)).round() as u8;
        let out_g = (g as f32 * alpha + bg * (1.0 - alpha)).round() as u8;
        let out_b = (b as f32 * alpha + bg * (1.0 - alpha)).round() as u8;
        rgb_image.put_pixel(x, y, ::image::Rgb([out_r, out_g, out_b]));
    }
    rgb_image
}
