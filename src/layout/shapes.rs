//! Reusable drawing routines shared by the layout nodes.

use crate::canvas::{Baseline, Canvas, Gradient, Paint, Rgb, Stroke, TextRun};
use crate::fonts::TextMeasure;

use super::{LINE_HEIGHT, text::wrap};

const OUTLINE_WIDTH: f32 = 0.5;

/// Height of the pointed part of a callout; also the radius of its shading.
const CALLOUT_ARROW_HEIGHT: f32 = 30.0;

/// Horizontal offset of the shading centre from the left edge.
const SHADING_INSET: f32 = 20.0;

fn corner_shading(canvas: &mut Canvas, x: f32, y: f32, width: f32, color: Rgb) -> Paint {
    let x_scale = width / CALLOUT_ARROW_HEIGHT;
    let gradient = Gradient::radial(x + SHADING_INSET, y, CALLOUT_ARROW_HEIGHT, x_scale)
        .stop(0.0, color)
        .stop(1.0, Rgb::WHITE);
    Paint::Gradient(canvas.add_gradient(gradient))
}

/// Banner with a notched left edge and a pointed right edge.
pub(crate) fn half_chevron(
    canvas: &mut Canvas,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    arrow_depth: f32,
    color: Rgb,
) {
    let fill = corner_shading(canvas, x, y, width, color);
    let points = vec![
        (x, y),
        (x + width - arrow_depth, y),
        (x + width, y + height / 2.0),
        (x + width - arrow_depth, y + height),
        (x + arrow_depth, y + height),
        (x + arrow_depth, y + height / 2.0),
    ];
    canvas.polygon(points, Some(fill), Some(Stroke::new(color, OUTLINE_WIDTH)));
}

/// Box whose top-left corner is drawn out into a tab pointing left.
pub(crate) fn callout(
    canvas: &mut Canvas,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    arrow_depth: f32,
    color: Rgb,
) {
    let fill = corner_shading(canvas, x, y, width, color);
    let points = vec![
        (x, y),
        (x + width, y),
        (x + width, y + height),
        (x + arrow_depth, y + height),
        (x + arrow_depth, y + CALLOUT_ARROW_HEIGHT.min(height)),
    ];
    canvas.polygon(points, Some(fill), Some(Stroke::new(color, OUTLINE_WIDTH)));
}

/// Upward chevron centred vertically on `y_mid`.
pub(crate) fn priority_arrow(canvas: &mut Canvas, x: f32, y_mid: f32, width: f32) {
    let h = 5.0;
    let stroke = Stroke::new(Rgb::BLACK, 3.0).round();
    canvas.line((x, y_mid + h / 2.0), (x + width / 2.0, y_mid - h / 2.0), stroke);
    canvas.line((x + width / 2.0, y_mid - h / 2.0), (x + width, y_mid + h / 2.0), stroke);
}

/// One chevron, or two stacked chevrons for a high-priority record.
pub(crate) fn priority_glyph(canvas: &mut Canvas, x: f32, y_mid: f32, width: f32, high: bool) {
    if high {
        priority_arrow(canvas, x, y_mid - 2.5, width);
        priority_arrow(canvas, x, y_mid + 2.5, width);
    } else {
        priority_arrow(canvas, x, y_mid, width);
    }
}

pub(crate) fn vertical_separator(canvas: &mut Canvas, x: f32, y: f32, height: f32, margin: f32, color: Rgb) {
    canvas.line(
        (x, y + margin),
        (x, y + height - margin),
        Stroke::new(color, OUTLINE_WIDTH),
    );
}

pub(crate) fn horizontal_separator(canvas: &mut Canvas, x: f32, y: f32, width: f32, margin: f32, color: Rgb) {
    canvas.line(
        (x + margin, y),
        (x + width - margin, y),
        Stroke::new(color, OUTLINE_WIDTH),
    );
}

/// Draw pre-wrapped lines top-down starting at `(x, y)`, each line taking
/// `font_size * LINE_HEIGHT`. `style` decorates each run.
pub(crate) fn lines(
    canvas: &mut Canvas,
    lines: &[String],
    x: f32,
    y: f32,
    font_size: f32,
    style: impl Fn(TextRun) -> TextRun,
) {
    let mut y_line = y;
    for line in lines {
        canvas.text(style(TextRun::new(line.as_str(), x, y_line, font_size).baseline(Baseline::Top)));
        y_line += font_size * LINE_HEIGHT;
    }
}

/// Footer text wrapped to `max_width`. Occurrences of each link label become
/// blue runs with a URI link area on top.
#[derive(Clone, Debug, PartialEq)]
pub struct Disclaimer {
    pub text: String,
    /// `(label, uri)` pairs.
    pub links: Vec<(String, String)>,
    pub font_size: f32,
}

impl Disclaimer {
    pub fn lines(&self, max_width: f32, measure: &dyn TextMeasure) -> Vec<String> {
        wrap(&self.text, max_width, self.font_size, measure)
    }

    pub fn height(&self, max_width: f32, measure: &dyn TextMeasure) -> f32 {
        self.lines(max_width, measure).len() as f32 * self.font_size * LINE_HEIGHT
    }

    pub(crate) fn draw(&self, canvas: &mut Canvas, x: f32, y: f32, max_width: f32, measure: &dyn TextMeasure) {
        let fs = self.font_size;
        let mut y_line = y;
        for line in self.lines(max_width, measure) {
            let mut rest = line.as_str();
            let mut x_run = x;
            while !rest.is_empty() {
                let next = self
                    .links
                    .iter()
                    .filter_map(|(label, uri)| rest.find(label.as_str()).map(|pos| (pos, label.as_str(), uri.as_str())))
                    .min_by_key(|(pos, _, _)| *pos);
                let Some((pos, label, uri)) = next else {
                    canvas.text(TextRun::new(rest, x_run, y_line, fs));
                    break;
                };
                let (plain, tail) = rest.split_at(pos);
                if !plain.is_empty() {
                    canvas.text(TextRun::new(plain, x_run, y_line, fs));
                    x_run += measure.width(plain, fs);
                }
                let w = measure.width(label, fs);
                canvas.text(TextRun::new(label, x_run, y_line, fs).color(Rgb(0, 0, 255)));
                canvas.uri_link(x_run, y_line, w, fs, uri);
                x_run += w;
                rest = &tail[label.len()..];
            }
            y_line += fs * LINE_HEIGHT;
        }
    }
}

/// Panel shaded from white in its upper middle toward a light tint of `color`
/// at the edges.
pub(crate) fn background_panel(canvas: &mut Canvas, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
    if height <= 0.0 || width <= 0.0 {
        return;
    }
    let gradient = Gradient::radial(x + width / 2.0, y, height * 1.2, width / height)
        .stop(0.0, Rgb::WHITE)
        .stop(0.6, Rgb::WHITE)
        .stop(1.0, color.toward(Rgb(250, 250, 250), 0.5));
    let fill = Paint::Gradient(canvas.add_gradient(gradient));
    canvas.rect(
        x,
        y,
        width,
        height,
        Some(fill),
        Some(Stroke::new(color.toward(Rgb::WHITE, 0.6), 1.0)),
    );
}
