mod merge;

pub use merge::{inject_links, merge, page_sizes};

use std::collections::{BTreeMap, BTreeSet, HashMap};

use pdf_writer::types::{ActionType, AnnotationType, FunctionShadingType, LineCapStyle, TextRenderingMode};
use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str};

use crate::canvas::{Baseline, Canvas, Gradient, GradientKind, Paint, Rgb, Shape, Stroke, TextAnchor, TextRun};
use crate::error::Error;
use crate::fonts::{TextMeasure, TrueTypeMetrics, helvetica_text_width, to_winansi_bytes};
use crate::links::ResolvedLink;

/// PDF points per canvas pixel.
pub const PT_PER_PX: f32 = 0.75;

/// Distance from the top of the em box to the baseline, as a fraction of the
/// font size (Helvetica ascender).
const ASCENDER_RATIO: f32 = 0.718;
const MIDDLE_RATIO: f32 = 0.35;

/// Bezier control distance for a quarter circle.
const KAPPA: f32 = 0.552_284_8;

/// The external services a document build talks to once its pages are drawn.
pub trait PdfBackend {
    /// Turn one canvas into a single-page PDF.
    fn render(&self, canvas: &Canvas) -> Result<Vec<u8>, Error>;
    /// Concatenate single- or multi-page PDFs in order.
    fn merge(&self, documents: &[Vec<u8>]) -> Result<Vec<u8>, Error>;
    /// MediaBox `(width, height)` of every page, keyed by 1-based page number.
    fn page_sizes(&self, pdf: &[u8]) -> Result<BTreeMap<usize, (f32, f32)>, Error>;
    /// Add go-to link annotations.
    fn inject_links(&self, pdf: &[u8], links: &[ResolvedLink]) -> Result<Vec<u8>, Error>;
}

/// In-process backend: pdf-writer for rendering, lopdf for the rest.
/// Text is drawn with the standard Helvetica faces unless a TrueType face
/// is attached.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeBackend<'f> {
    face: Option<&'f TrueTypeMetrics>,
}

impl<'f> NativeBackend<'f> {
    pub fn with_face(face: &'f TrueTypeMetrics) -> Self {
        Self { face: Some(face) }
    }

    /// A backend that draws text with the face `measure` measured it in.
    pub fn for_measure(measure: &'f dyn TextMeasure) -> Self {
        Self { face: measure.face() }
    }
}

impl PdfBackend for NativeBackend<'_> {
    fn render(&self, canvas: &Canvas) -> Result<Vec<u8>, Error> {
        render_with(canvas, self.face)
    }

    fn merge(&self, documents: &[Vec<u8>]) -> Result<Vec<u8>, Error> {
        merge(documents)
    }

    fn page_sizes(&self, pdf: &[u8]) -> Result<BTreeMap<usize, (f32, f32)>, Error> {
        page_sizes(pdf)
    }

    fn inject_links(&self, pdf: &[u8], links: &[ResolvedLink]) -> Result<Vec<u8>, Error> {
        inject_links(pdf, links)
    }
}

const FONT_NAMES: [(&[u8], &str); 4] = [
    (b"F1", "Helvetica"),
    (b"F2", "Helvetica-Bold"),
    (b"F3", "Helvetica-Oblique"),
    (b"F4", "Helvetica-BoldOblique"),
];

fn font_resource(run: &TextRun) -> Name<'static> {
    let idx = match (run.bold, run.italic) {
        (false, false) => 0,
        (true, false) => 1,
        (false, true) => 2,
        (true, true) => 3,
    };
    Name(FONT_NAMES[idx].0)
}

/// Resource name of the embedded TrueType face.
const EMBEDDED_FONT: &[u8] = b"F1";
/// Stroke width of faux-bold runs, as a fraction of the font size.
const FAUX_BOLD_STROKE: f32 = 0.03;

enum TextFont<'a> {
    Standard,
    Embedded {
        face: &'a TrueTypeMetrics,
        codes: HashMap<char, u16>,
    },
}

fn shading_name(idx: usize) -> String {
    format!("Sh{idx}")
}

/// Render a canvas into a one-page PDF. The page is `PT_PER_PX` points per
/// canvas pixel; the content stream flips the y axis so shapes are emitted in
/// canvas coordinates. Text uses the standard Helvetica faces.
pub fn render(canvas: &Canvas) -> Result<Vec<u8>, Error> {
    render_with(canvas, None)
}

/// [`render`], drawing text with `face` embedded when one is given.
pub fn render_with(canvas: &Canvas, face: Option<&TrueTypeMetrics>) -> Result<Vec<u8>, Error> {
    let t0 = std::time::Instant::now();
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let page_id = alloc();
    let content_id = alloc();

    let mut font_refs: Vec<(&'static [u8], Ref)> = Vec::new();
    let text_font = match face {
        Some(face) => {
            let used: BTreeSet<char> = canvas
                .shapes()
                .iter()
                .filter_map(|shape| match shape {
                    Shape::Text(run) => Some(run.text.chars()),
                    _ => None,
                })
                .flatten()
                .collect();
            let font_ref = alloc();
            let codes = face.embed(&mut pdf, font_ref, &used, &mut alloc)?;
            font_refs.push((EMBEDDED_FONT, font_ref));
            TextFont::Embedded { face, codes }
        }
        None => {
            for (name, base) in FONT_NAMES {
                let font_ref = alloc();
                pdf.type1_font(font_ref)
                    .base_font(Name(base.as_bytes()))
                    .encoding_predefined(Name(b"WinAnsiEncoding"));
                font_refs.push((name, font_ref));
            }
            TextFont::Standard
        }
    };

    let mut shading_refs = Vec::with_capacity(canvas.gradients().len());
    for gradient in canvas.gradients() {
        let function_ref = write_gradient_function(&mut pdf, gradient, &mut alloc)?;
        let shading_ref = alloc();
        shading_refs.push(shading_ref);
        let mut shading = pdf.function_shading(shading_ref);
        shading.color_space().device_rgb();
        match gradient.kind {
            GradientKind::Linear { x1, y1, x2, y2 } => {
                shading
                    .shading_type(FunctionShadingType::Axial)
                    .coords([x1, y1, x2, y2]);
            }
            // Drawn with a transform that moves the origin to the centre and
            // stretches x, see `draw_path`.
            GradientKind::Radial { r, .. } => {
                shading
                    .shading_type(FunctionShadingType::Radial)
                    .coords([0.0, 0.0, 0.0, 0.0, 0.0, r]);
            }
        }
        shading.function(function_ref).extend([true, true]);
    }

    let w_pt = canvas.width() * PT_PER_PX;
    let h_pt = canvas.height() * PT_PER_PX;

    let mut content = Content::new();
    content.transform([PT_PER_PX, 0.0, 0.0, -PT_PER_PX, 0.0, h_pt]);

    let mut uri_links = Vec::new();
    for shape in canvas.shapes() {
        match shape {
            Shape::Rect {
                x,
                y,
                w,
                h,
                fill,
                stroke,
            } => {
                let path = |c: &mut Content| {
                    c.rect(*x, *y, *w, *h);
                };
                draw_path(&mut content, canvas, path, *fill, *stroke)?;
            }
            Shape::Polygon {
                points,
                fill,
                stroke,
            } => {
                if points.len() < 2 {
                    continue;
                }
                let path = |c: &mut Content| {
                    c.move_to(points[0].0, points[0].1);
                    for (px, py) in &points[1..] {
                        c.line_to(*px, *py);
                    }
                    c.close_path();
                };
                draw_path(&mut content, canvas, path, *fill, *stroke)?;
            }
            Shape::Circle {
                cx,
                cy,
                r,
                fill,
                stroke,
            } => {
                let path = |c: &mut Content| circle_path(c, *cx, *cy, *r);
                draw_path(&mut content, canvas, path, *fill, *stroke)?;
            }
            Shape::Line { from, to, stroke } => {
                content.save_state();
                apply_stroke(&mut content, *stroke);
                content.move_to(from.0, from.1).line_to(to.0, to.1).stroke();
                content.restore_state();
            }
            Shape::Text(run) => draw_text(&mut content, run, &text_font),
            Shape::UriLink { x, y, w, h, uri } => {
                uri_links.push((
                    Rect::new(
                        x * PT_PER_PX,
                        h_pt - (y + h) * PT_PER_PX,
                        (x + w) * PT_PER_PX,
                        h_pt - y * PT_PER_PX,
                    ),
                    uri.as_str(),
                ));
            }
        }
    }

    let annot_refs: Vec<Ref> = uri_links
        .iter()
        .map(|(rect, uri)| {
            let annot_ref = alloc();
            let mut annot = pdf.annotation(annot_ref);
            annot
                .subtype(AnnotationType::Link)
                .rect(*rect)
                .border(0.0, 0.0, 0.0, None);
            annot
                .action()
                .action_type(ActionType::Uri)
                .uri(Str(uri.as_bytes()));
            annot_ref
        })
        .collect();

    let raw = content.finish();
    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
    pdf.stream(content_id, &compressed).filter(Filter::FlateDecode);

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id).kids([page_id]).count(1);

    {
        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, w_pt, h_pt))
            .parent(pages_id)
            .contents(content_id);
        if !annot_refs.is_empty() {
            page.annotations(annot_refs.iter().copied());
        }
        let mut resources = page.resources();
        {
            let mut fonts = resources.fonts();
            for (name, font_ref) in &font_refs {
                fonts.pair(Name(*name), *font_ref);
            }
        }
        if !shading_refs.is_empty() {
            let names: Vec<String> = (0..shading_refs.len()).map(shading_name).collect();
            let mut shadings = resources.shadings();
            for (name, shading_ref) in names.iter().zip(&shading_refs) {
                shadings.pair(Name(name.as_bytes()), *shading_ref);
            }
        }
    }

    let bytes = pdf.finish();
    log::debug!(
        "Rendered {:.0}x{:.0}pt page: {} shapes, {} gradients, {} bytes in {:.1}ms",
        w_pt,
        h_pt,
        canvas.shapes().len(),
        canvas.gradients().len(),
        bytes.len(),
        t0.elapsed().as_secs_f64() * 1000.0,
    );
    Ok(bytes)
}

/// One exponential function for two stops, a stitching function otherwise.
fn write_gradient_function(
    pdf: &mut Pdf,
    gradient: &Gradient,
    alloc: &mut impl FnMut() -> Ref,
) -> Result<Ref, Error> {
    let stops = &gradient.stops;
    if stops.len() < 2 {
        return Err(Error::Pdf(format!(
            "gradient needs at least two stops, got {}",
            stops.len()
        )));
    }

    let segments: Vec<Ref> = stops
        .windows(2)
        .map(|pair| {
            let func_ref = alloc();
            pdf.exponential_function(func_ref)
                .domain([0.0, 1.0])
                .c0(pair[0].color.to_unit())
                .c1(pair[1].color.to_unit())
                .n(1.0);
            func_ref
        })
        .collect();

    if let [single] = segments.as_slice() {
        return Ok(*single);
    }

    let func_ref = alloc();
    let bounds: Vec<f32> = stops[1..stops.len() - 1].iter().map(|s| s.offset).collect();
    let encode: Vec<f32> = segments.iter().flat_map(|_| [0.0, 1.0]).collect();
    pdf.stitching_function(func_ref)
        .domain([0.0, 1.0])
        .functions(segments.iter().copied())
        .bounds(bounds)
        .encode(encode);
    Ok(func_ref)
}

fn apply_stroke(content: &mut Content, stroke: Stroke) {
    let [r, g, b] = stroke.color.to_unit();
    content.set_stroke_rgb(r, g, b).set_line_width(stroke.width);
    if stroke.round_cap {
        content.set_line_cap(LineCapStyle::RoundCap);
    }
}

fn set_fill(content: &mut Content, color: Rgb) {
    let [r, g, b] = color.to_unit();
    content.set_fill_rgb(r, g, b);
}

fn draw_path(
    content: &mut Content,
    canvas: &Canvas,
    path: impl Fn(&mut Content),
    fill: Option<Paint>,
    stroke: Option<Stroke>,
) -> Result<(), Error> {
    content.save_state();
    match (fill, stroke) {
        (Some(Paint::Solid(color)), Some(s)) => {
            set_fill(content, color);
            apply_stroke(content, s);
            path(content);
            content.fill_nonzero_and_stroke();
        }
        (Some(Paint::Solid(color)), None) => {
            set_fill(content, color);
            path(content);
            content.fill_nonzero();
        }
        (Some(Paint::Gradient(id)), s) => {
            let gradient = canvas
                .gradient(id)
                .ok_or_else(|| Error::Pdf(format!("unknown gradient {}", id.0)))?;
            content.save_state();
            path(content);
            content.clip_nonzero().end_path();
            if let GradientKind::Radial { cx, cy, x_scale, .. } = gradient.kind {
                content.transform([x_scale, 0.0, 0.0, 1.0, cx, cy]);
            }
            let name = shading_name(id.0);
            content.shading(Name(name.as_bytes()));
            content.restore_state();
            if let Some(s) = s {
                apply_stroke(content, s);
                path(content);
                content.stroke();
            }
        }
        (None, Some(s)) => {
            apply_stroke(content, s);
            path(content);
            content.stroke();
        }
        (None, None) => {}
    }
    content.restore_state();
    Ok(())
}

fn circle_path(c: &mut Content, cx: f32, cy: f32, r: f32) {
    let k = r * KAPPA;
    c.move_to(cx + r, cy);
    c.cubic_to(cx + r, cy + k, cx + k, cy + r, cx, cy + r);
    c.cubic_to(cx - k, cy + r, cx - r, cy + k, cx - r, cy);
    c.cubic_to(cx - r, cy - k, cx - k, cy - r, cx, cy - r);
    c.cubic_to(cx + k, cy - r, cx + r, cy - k, cx + r, cy);
    c.close_path();
}

fn draw_text(content: &mut Content, run: &TextRun, font: &TextFont) {
    if run.text.is_empty() {
        return;
    }
    let (width, ascender) = match font {
        TextFont::Standard => (helvetica_text_width(&run.text, run.font_size, run.bold), ASCENDER_RATIO),
        TextFont::Embedded { face, .. } => (face.width(&run.text, run.font_size), face.ascender_ratio()),
    };
    let x = match run.anchor {
        TextAnchor::Start => run.x,
        TextAnchor::Middle => run.x - width / 2.0,
        TextAnchor::End => run.x - width,
    };
    let y = match run.baseline {
        Baseline::Top => run.y + run.font_size * ascender,
        Baseline::Middle => run.y + run.font_size * MIDDLE_RATIO,
        Baseline::Alphabetic => run.y,
    };
    let [r, g, b] = run.color.to_unit();
    content.save_state();
    content.begin_text().set_fill_rgb(r, g, b);
    let bytes = match font {
        TextFont::Standard => {
            content.set_font(font_resource(run), run.font_size);
            to_winansi_bytes(&run.text)
        }
        TextFont::Embedded { codes, .. } => {
            content.set_font(Name(EMBEDDED_FONT), run.font_size);
            if run.bold {
                content
                    .set_stroke_rgb(r, g, b)
                    .set_line_width(run.font_size * FAUX_BOLD_STROKE)
                    .set_text_rendering_mode(TextRenderingMode::FillStroke);
            }
            run.text
                .chars()
                .flat_map(|ch| codes.get(&ch).copied().unwrap_or(0).to_be_bytes())
                .collect()
        }
    };
    content
        .set_text_matrix([1.0, 0.0, 0.0, -1.0, x, y])
        .show(Str(&bytes))
        .end_text();
    content.restore_state();
}
