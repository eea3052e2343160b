/// 8-bit RGB colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const NEUTRAL: Rgb = Rgb(120, 120, 120);

    /// Linear interpolation toward `target`; `fraction` 0 keeps `self`, 1 yields `target`.
    pub fn toward(self, target: Rgb, fraction: f32) -> Rgb {
        let f = fraction.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * f).round() as u8;
        Rgb(mix(self.0, target.0), mix(self.1, target.1), mix(self.2, target.2))
    }

    pub(crate) fn to_unit(self) -> [f32; 3] {
        [self.0 as f32 / 255.0, self.1 as f32 / 255.0, self.2 as f32 / 255.0]
    }
}

pub const GREY_TARGET: Rgb = Rgb(210, 190, 210);

/// Pull a colour toward the shared grey by `fraction`.
pub fn color_toward_grey(color: Rgb, fraction: f32) -> Rgb {
    color.toward(GREY_TARGET, fraction)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GradientId(pub(crate) usize);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Rgb,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GradientKind {
    /// Axis from `(x1, y1)` to `(x2, y2)` in canvas coordinates.
    Linear { x1: f32, y1: f32, x2: f32, y2: f32 },
    /// Circle of radius `r` around `(cx, cy)`, stretched horizontally by `x_scale`.
    Radial { cx: f32, cy: f32, r: f32, x_scale: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    pub kind: GradientKind,
    pub stops: Vec<GradientStop>,
}

impl Gradient {
    pub fn radial(cx: f32, cy: f32, r: f32, x_scale: f32) -> Self {
        Self {
            kind: GradientKind::Radial { cx, cy, r, x_scale },
            stops: Vec::new(),
        }
    }

    pub fn linear(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            kind: GradientKind::Linear { x1, y1, x2, y2 },
            stops: Vec::new(),
        }
    }

    pub fn stop(mut self, offset: f32, color: Rgb) -> Self {
        self.stops.push(GradientStop { offset, color });
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Paint {
    Solid(Rgb),
    Gradient(GradientId),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: Rgb,
    pub width: f32,
    pub round_cap: bool,
}

impl Stroke {
    pub fn new(color: Rgb, width: f32) -> Self {
        Self {
            color,
            width,
            round_cap: false,
        }
    }

    pub fn round(mut self) -> Self {
        self.round_cap = true;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

/// Which part of the glyph box `y` refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Baseline {
    #[default]
    Top,
    Middle,
    Alphabetic,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
    pub color: Rgb,
    pub anchor: TextAnchor,
    pub baseline: Baseline,
}

impl TextRun {
    pub fn new(text: impl Into<String>, x: f32, y: f32, font_size: f32) -> Self {
        Self {
            x,
            y,
            text: text.into(),
            font_size,
            bold: false,
            italic: false,
            color: Rgb::BLACK,
            anchor: TextAnchor::Start,
            baseline: Baseline::Top,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn anchor(mut self, anchor: TextAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn baseline(mut self, baseline: Baseline) -> Self {
        self.baseline = baseline;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        fill: Option<Paint>,
        stroke: Option<Stroke>,
    },
    Polygon {
        points: Vec<(f32, f32)>,
        fill: Option<Paint>,
        stroke: Option<Stroke>,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        stroke: Stroke,
    },
    Circle {
        cx: f32,
        cy: f32,
        r: f32,
        fill: Option<Paint>,
        stroke: Option<Stroke>,
    },
    Text(TextRun),
    /// Clickable area opening an external URI (e.g. `mailto:`).
    UriLink {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        uri: String,
    },
}

/// Fixed-size vector drawing surface in canvas pixels, origin top-left, y down.
#[derive(Clone, Debug)]
pub struct Canvas {
    width: f32,
    height: f32,
    shapes: Vec<Shape>,
    gradients: Vec<Gradient>,
}

impl Canvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            shapes: Vec::new(),
            gradients: Vec::new(),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn gradients(&self) -> &[Gradient] {
        &self.gradients
    }

    pub(crate) fn gradient(&self, id: GradientId) -> Option<&Gradient> {
        self.gradients.get(id.0)
    }

    pub fn add_gradient(&mut self, gradient: Gradient) -> GradientId {
        self.gradients.push(gradient);
        GradientId(self.gradients.len() - 1)
    }

    pub fn draw(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, fill: Option<Paint>, stroke: Option<Stroke>) {
        self.draw(Shape::Rect {
            x,
            y,
            w,
            h,
            fill,
            stroke,
        });
    }

    pub fn polygon(&mut self, points: Vec<(f32, f32)>, fill: Option<Paint>, stroke: Option<Stroke>) {
        self.draw(Shape::Polygon {
            points,
            fill,
            stroke,
        });
    }

    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), stroke: Stroke) {
        self.draw(Shape::Line { from, to, stroke });
    }

    pub fn circle(&mut self, cx: f32, cy: f32, r: f32, fill: Option<Paint>, stroke: Option<Stroke>) {
        self.draw(Shape::Circle {
            cx,
            cy,
            r,
            fill,
            stroke,
        });
    }

    pub fn text(&mut self, run: TextRun) {
        self.draw(Shape::Text(run));
    }

    pub fn uri_link(&mut self, x: f32, y: f32, w: f32, h: f32, uri: impl Into<String>) {
        self.draw(Shape::UriLink {
            x,
            y,
            w,
            h,
            uri: uri.into(),
        });
    }

    pub fn text_runs(&self) -> impl Iterator<Item = &TextRun> {
        self.shapes.iter().filter_map(|s| match s {
            Shape::Text(run) => Some(run),
            _ => None,
        })
    }
}
