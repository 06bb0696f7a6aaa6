//! Text layout engine
//!
//! Renders variable-length text into fixed-size single-channel masks. Color
//! is applied when the mask is stamped onto a card, so the same machinery
//! serves the white calendar strings and the black address/marker stamps.

use image::{GrayImage, Luma, Rgb, RgbImage};
use rusttype::{Font, Scale, point};

use crate::types::Rotation;

/// Top padding inside a wrapped text box, in pixels.
const WRAP_TOP_PADDING: u32 = 50;
/// Extra pixels between wrapped lines.
const WRAP_LINE_PADDING: u32 = 10;
/// Fixed line spacing for pre-formatted (multi-line) text.
const PREFORMATTED_SPACING: u32 = 20;

/// Input to [`render_text_box`]: either lines produced by [`wrap_text`] that
/// need centring, or a pre-formatted block with embedded newlines drawn
/// left-aligned.
#[derive(Debug, Clone, Copy)]
pub enum TextFlow<'a> {
    Wrapped(&'a [String]),
    Preformatted(&'a str),
}

/// Greedy word wrap to at most `width` characters per line.
///
/// Words are never split, so a single word longer than `width` gets a line
/// of its own. Whitespace runs inside a line are preserved; the run at a
/// break point is consumed by the break. Rejoining the lines therefore
/// reconstructs the input up to the wrap points.
///
/// The default width of 7 is tuned to the calendar card artwork; if the
/// display strings change shape the width needs re-tuning.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut pending_ws = String::new();

    for token in whitespace_runs(text) {
        if token.chars().all(char::is_whitespace) {
            if !current.is_empty() {
                pending_ws.push_str(token);
            }
            continue;
        }

        if current.is_empty() {
            current.push_str(token);
        } else {
            let candidate_len =
                current.chars().count() + pending_ws.chars().count() + token.chars().count();
            if candidate_len <= width {
                current.push_str(&pending_ws);
                current.push_str(token);
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(token);
            }
        }
        pending_ws.clear();
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Split into alternating word / whitespace-run slices.
fn whitespace_runs(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let first_is_ws = rest.chars().next().is_some_and(char::is_whitespace);
        let end = rest
            .char_indices()
            .find(|(_, c)| c.is_whitespace() != first_is_ws)
            .map_or(rest.len(), |(i, _)| i);
        let (run, tail) = rest.split_at(end);
        rest = tail;
        Some(run)
    })
}

/// Pixel measurements needed to place lines inside a box. Implemented for
/// rasterized fonts; placement itself is pure arithmetic over these numbers.
trait LineMetrics {
    fn line_width(&self, line: &str) -> u32;
    fn line_height(&self) -> u32;
}

struct FontMetrics<'f, 'a> {
    font: &'f Font<'a>,
    scale: Scale,
}

impl LineMetrics for FontMetrics<'_, '_> {
    fn line_width(&self, line: &str) -> u32 {
        line_width_px(line, self.font, self.scale)
    }

    fn line_height(&self) -> u32 {
        line_height_px(self.font, self.scale)
    }
}

/// One line positioned inside a text box, top-left at `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PlacedLine<'a> {
    text: &'a str,
    x: u32,
    y: u32,
}

/// Compute every line's position for a box of the given width.
///
/// Wrapped lines stack from [`WRAP_TOP_PADDING`] and are each centred
/// horizontally (clamped to the left edge when a line overflows the box);
/// pre-formatted text is left-aligned from the top with
/// [`PREFORMATTED_SPACING`] between lines. Empty input places nothing.
fn place_lines<'a>(
    flow: TextFlow<'a>,
    width: u32,
    metrics: &impl LineMetrics,
) -> Vec<PlacedLine<'a>> {
    let line_height = metrics.line_height();
    let mut placed = Vec::new();

    match flow {
        TextFlow::Wrapped(lines) => {
            let mut y = WRAP_TOP_PADDING;
            for line in lines {
                let line_width = metrics.line_width(line);
                let x = width.saturating_sub(line_width) / 2;
                placed.push(PlacedLine { text: line, x, y });
                y += line_height + WRAP_LINE_PADDING;
            }
        }
        TextFlow::Preformatted(text) => {
            let mut y = 0;
            for line in text.lines() {
                placed.push(PlacedLine { text: line, x: 0, y });
                y += line_height + PREFORMATTED_SPACING;
            }
        }
    }

    placed
}

/// Apply the requested rotation to a finished mask. 180° keeps the box
/// dimensions, so expand-to-fit is a no-op.
fn orient_mask(mask: GrayImage, rotation: Rotation) -> GrayImage {
    match rotation {
        Rotation::None => mask,
        Rotation::Half => image::imageops::rotate180(&mask),
    }
}

/// Render text into a `width` x `height` intensity mask, placing lines per
/// [`place_lines`] and rotating the finished mask as requested.
pub fn render_text_box(
    flow: TextFlow<'_>,
    width: u32,
    height: u32,
    rotation: Rotation,
    font: &Font<'_>,
    size: f32,
) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    let scale = Scale::uniform(size);
    let metrics = FontMetrics { font, scale };

    for line in place_lines(flow, width, &metrics) {
        draw_line(&mut mask, line.text, line.x, line.y, font, scale);
    }

    orient_mask(mask, rotation)
}

/// Rendered pixel width of a single line.
fn line_width_px(line: &str, font: &Font<'_>, scale: Scale) -> u32 {
    let v_metrics = font.v_metrics(scale);
    let mut width = 0.0f32;
    for glyph in font.layout(line, scale, point(0.0, v_metrics.ascent)) {
        if let Some(bb) = glyph.pixel_bounding_box() {
            width = width.max(bb.max.x as f32);
        }
        width = width.max(glyph.position().x + glyph.unpositioned().h_metrics().advance_width);
    }
    width.ceil() as u32
}

fn line_height_px(font: &Font<'_>, scale: Scale) -> u32 {
    let v_metrics = font.v_metrics(scale);
    (v_metrics.ascent - v_metrics.descent).ceil() as u32
}

/// Rasterize one line with its baseline at `top + ascent`, clipped to the
/// mask bounds.
fn draw_line(mask: &mut GrayImage, line: &str, x: u32, top: u32, font: &Font<'_>, scale: Scale) {
    let v_metrics = font.v_metrics(scale);
    for glyph in font.layout(line, scale, point(x as f32, top as f32 + v_metrics.ascent)) {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                let px = gx as i64 + i64::from(bb.min.x);
                let py = gy as i64 + i64::from(bb.min.y);
                if px < 0 || py < 0 || px >= i64::from(mask.width()) || py >= i64::from(mask.height())
                {
                    return;
                }
                let value = (v * 255.0) as u8;
                let pixel = mask.get_pixel_mut(px as u32, py as u32);
                // Overlapping glyph edges keep the stronger coverage
                pixel.0[0] = pixel.0[0].max(value);
            });
        }
    }
}

/// Stamp an intensity mask onto a card in a single solid color, using the
/// mask value as alpha.
pub fn stamp(base: &mut RgbImage, mask: &GrayImage, x: u32, y: u32, color: Rgb<u8>) {
    for my in 0..mask.height() {
        for mx in 0..mask.width() {
            let Luma([alpha]) = *mask.get_pixel(mx, my);
            if alpha == 0 {
                continue;
            }
            let bx = x + mx;
            let by = y + my;
            if bx >= base.width() || by >= base.height() {
                continue;
            }
            let a = f32::from(alpha) / 255.0;
            let inv = 1.0 - a;
            let dst = base.get_pixel_mut(bx, by);
            for channel in 0..3 {
                dst.0[channel] =
                    (f32::from(color.0[channel]) * a + f32::from(dst.0[channel]) * inv) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_respects_width() {
        let lines = wrap_text("Wednesday   from   13 June 2018", 7);
        assert_eq!(lines, vec!["Wednesday", "from", "13 June", "2018"]);
        for line in &lines[1..] {
            assert!(line.chars().count() <= 7);
        }
    }

    #[test]
    fn wrap_never_splits_words() {
        let lines = wrap_text("extraordinarily long", 7);
        // A word longer than the width gets its own overlong line
        assert_eq!(lines, vec!["extraordinarily", "long"]);
    }

    #[test]
    fn wrap_preserves_internal_whitespace() {
        let lines = wrap_text("a  b c", 6);
        assert_eq!(lines, vec!["a  b c"]);
    }

    #[test]
    fn wrap_round_trips_up_to_break_points() {
        let input = "Monday   from   11 June 2018";
        let lines = wrap_text(input, 7);
        // Every line appears verbatim in the input, in order
        let mut cursor = 0;
        for line in &lines {
            let at = input[cursor..]
                .find(line.as_str())
                .expect("line missing from input");
            cursor += at + line.len();
        }
    }

    #[test]
    fn wrap_empty_input_yields_no_lines() {
        assert!(wrap_text("", 7).is_empty());
        assert!(wrap_text("   ", 7).is_empty());
    }

    /// Synthetic metrics: 10 px per character, 40 px tall lines.
    struct FixedMetrics;

    impl LineMetrics for FixedMetrics {
        fn line_width(&self, line: &str) -> u32 {
            line.chars().count() as u32 * 10
        }

        fn line_height(&self) -> u32 {
            40
        }
    }

    #[test]
    fn preformatted_lines_stack_left_aligned() {
        let placed = place_lines(
            TextFlow::Preformatted("1 High St\nOldtown\nAB1 2CD"),
            1900,
            &FixedMetrics,
        );
        // One placement per newline-separated line, all at the left edge
        assert_eq!(placed.len(), 3);
        assert!(placed.iter().all(|line| line.x == 0));
        // Fixed spacing: line height plus the pre-formatted gap
        assert_eq!(
            placed.iter().map(|line| line.y).collect::<Vec<_>>(),
            vec![0, 60, 120]
        );
        assert_eq!(placed[0].text, "1 High St");
        assert_eq!(placed[2].text, "AB1 2CD");
    }

    #[test]
    fn wrapped_lines_centre_below_top_padding() {
        let lines = vec!["13 June".to_string(), "2018".to_string()];
        let placed = place_lines(TextFlow::Wrapped(&lines), 300, &FixedMetrics);
        assert_eq!(placed.len(), 2);
        // Centred: (box width - line width) / 2
        assert_eq!(placed[0].x, (300 - 70) / 2);
        assert_eq!(placed[1].x, (300 - 40) / 2);
        // First line sits at the top padding, then height + line gap
        assert_eq!(placed[0].y, WRAP_TOP_PADDING);
        assert_eq!(placed[1].y, WRAP_TOP_PADDING + 40 + WRAP_LINE_PADDING);
    }

    #[test]
    fn overlong_wrapped_line_clamps_to_left_edge() {
        let lines = vec!["Wednesday".to_string()];
        let placed = place_lines(TextFlow::Wrapped(&lines), 80, &FixedMetrics);
        assert_eq!(placed[0].x, 0);
    }

    #[test]
    fn empty_text_places_nothing() {
        assert!(place_lines(TextFlow::Wrapped(&[]), 300, &FixedMetrics).is_empty());
        assert!(place_lines(TextFlow::Preformatted(""), 300, &FixedMetrics).is_empty());
    }

    #[test]
    fn blank_mask_leaves_region_untouched() {
        // A region whose text was suppressed gets an all-zero mask; stamping
        // it must not disturb a single background pixel.
        let mut base = RgbImage::from_pixel(30, 45, Rgb([10, 120, 240]));
        let mask = GrayImage::new(30, 45);
        stamp(&mut base, &mask, 0, 0, Rgb([255, 255, 255]));
        assert!(base.pixels().all(|p| *p == Rgb([10, 120, 240])));
    }

    #[test]
    fn half_rotation_maps_pixels_through_the_centre() {
        let mut mask = GrayImage::new(4, 3);
        mask.put_pixel(0, 0, Luma([200]));
        mask.put_pixel(1, 2, Luma([90]));
        let turned = orient_mask(mask, Rotation::Half);
        assert_eq!((turned.width(), turned.height()), (4, 3));
        assert_eq!(*turned.get_pixel(3, 2), Luma([200]));
        assert_eq!(*turned.get_pixel(2, 0), Luma([90]));
        assert_eq!(*turned.get_pixel(0, 0), Luma([0]));
    }

    #[test]
    fn no_rotation_is_identity() {
        let mut mask = GrayImage::new(2, 2);
        mask.put_pixel(1, 0, Luma([77]));
        let same = orient_mask(mask.clone(), Rotation::None);
        assert_eq!(same, mask);
    }

    #[test]
    fn stamp_blends_solid_color() {
        let mut base = RgbImage::from_pixel(4, 4, Rgb([100, 100, 100]));
        let mut mask = GrayImage::new(2, 2);
        mask.put_pixel(0, 0, Luma([255]));
        stamp(&mut base, &mask, 1, 1, Rgb([255, 255, 255]));
        assert_eq!(*base.get_pixel(1, 1), Rgb([255, 255, 255]));
        // Zero-alpha mask pixels leave the background untouched
        assert_eq!(*base.get_pixel(2, 2), Rgb([100, 100, 100]));
    }

    #[test]
    fn stamp_clips_at_card_edge() {
        let mut base = RgbImage::from_pixel(3, 3, Rgb([0, 0, 0]));
        let mask = GrayImage::from_pixel(4, 4, Luma([255]));
        stamp(&mut base, &mask, 2, 2, Rgb([255, 0, 0]));
        assert_eq!(*base.get_pixel(2, 2), Rgb([255, 0, 0]));
    }
}
