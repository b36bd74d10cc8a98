// Text measurement for the built-in Helvetica faces

/// Points to millimetres.
pub const PT_TO_MM: f32 = 25.4 / 72.0;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.15;

/// Cap height of Helvetica relative to font size; used to place the first
/// baseline inside a cell.
const CAP_HEIGHT_FACTOR: f32 = 0.72;

/// Width for anything outside printable ASCII (1/1000 em).
const DEFAULT_WIDTH: u16 = 556;

/// Helvetica glyph widths, ASCII 32..=126, in 1/1000 em (Adobe AFM).
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A..M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N..Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a..m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n..z
    334, 260, 334, 584, // {..~
];

/// Helvetica-Bold glyph widths, ASCII 32..=126, in 1/1000 em.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    333, 333, 584, 584, 584, 611, 975, // :..@
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // A..M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N..Z
    333, 278, 333, 584, 556, 333, // [..`
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // a..m
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // n..z
    389, 280, 389, 584, // {..~
];

/// Regular or bold Helvetica.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

fn char_width(weight: FontWeight, ch: char) -> u16 {
    let code = ch as u32;
    if !(32..=126).contains(&code) {
        return DEFAULT_WIDTH;
    }
    let index = (code - 32) as usize;
    match weight {
        FontWeight::Regular => HELVETICA_WIDTHS[index],
        FontWeight::Bold => HELVETICA_BOLD_WIDTHS[index],
    }
}

/// Rendered width of `text` in millimetres.
pub fn text_width_mm(text: &str, weight: FontWeight, font_size: f32) -> f32 {
    let units: u32 = text.chars().map(|ch| char_width(weight, ch) as u32).sum();
    units as f32 * font_size / 1000.0 * PT_TO_MM
}

pub fn line_height_mm(font_size: f32) -> f32 {
    font_size * LINE_HEIGHT_FACTOR * PT_TO_MM
}

/// Distance from the top of a line box to its baseline.
pub fn baseline_offset_mm(font_size: f32) -> f32 {
    let line = line_height_mm(font_size);
    let cap = font_size * CAP_HEIGHT_FACTOR * PT_TO_MM;
    (line + cap) / 2.0
}

/// Word-wraps `text` to `max_width` millimetres. Explicit newlines start a
/// new line; words wider than the line are broken between characters.
pub fn wrap_text(text: &str, max_width: f32, weight: FontWeight, font_size: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let space = text_width_mm(" ", weight, font_size);

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in paragraph.split_whitespace() {
            let word_width = text_width_mm(word, weight, font_size);
            let needed = if current.is_empty() { word_width } else { current_width + space + word_width };

            if needed <= max_width {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                current_width = needed;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }

            if word_width <= max_width {
                current.push_str(word);
                current_width = word_width;
            } else {
                // Oversized word: emit full pieces, keep the tail open
                for ch in word.chars() {
                    let w = char_width(weight, ch) as f32 * font_size / 1000.0 * PT_TO_MM;
                    if current_width + w > max_width && !current.is_empty() {
                        lines.push(std::mem::take(&mut current));
                        current_width = 0.0;
                    }
                    current.push(ch);
                    current_width += w;
                }
            }
        }
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
