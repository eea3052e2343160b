use crate::canvas::{Baseline, Rgb, TextRun};
use crate::fonts::TextMeasure;

use super::{DrawContext, LINE_HEIGHT, LayoutConfiguration, Question, shapes, text::wrap};

/// Titled container of questions drawn inside a callout.
#[derive(Clone, Debug)]
pub struct Group {
    title: String,
    color: Rgb,
    link_key: Option<String>,
    questions: Vec<Question>,
    height: f32,
    header_height: f32,
    small_margin: f32,
}

impl Group {
    pub fn new(title: impl Into<String>, color: Rgb, config: &LayoutConfiguration) -> Self {
        Self {
            title: title.into(),
            color,
            link_key: None,
            questions: Vec::new(),
            height: config.group_header_height + config.intermediate_margin,
            header_height: config.group_header_height,
            small_margin: config.small_margin,
        }
    }

    /// Makes the group title a link source for `key`.
    pub fn with_link(mut self, key: impl Into<String>) -> Self {
        self.link_key = Some(key.into());
        self
    }

    pub fn push(&mut self, question: Question) {
        self.height += question.height() + self.small_margin;
        self.questions.push(question);
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// `width` is the column width minus the arrow depth.
    pub fn draw(&self, ctx: &mut DrawContext, x: f32, y: f32, width: f32) {
        let cfg = ctx.config;
        shapes::callout(ctx.canvas, x, y, width, self.height, cfg.arrow_depth, self.color);

        let x_title = x + cfg.arrow_depth + cfg.intermediate_margin;
        let y_title = y + self.header_height / 2.0;
        ctx.canvas.text(
            TextRun::new(self.title.as_str(), x_title, y_title, cfg.group_title_font_size)
                .bold()
                .baseline(Baseline::Middle),
        );
        if let Some(key) = &self.link_key {
            let fs = cfg.group_title_font_size;
            let w = ctx.measure.bold_width(&self.title, fs);
            ctx.links.register_link(key, ctx.page, x_title, y_title - fs / 2.0, w, fs);
        }

        let x_question = x + cfg.arrow_depth + cfg.intermediate_margin;
        let w_question = width - cfg.arrow_depth - 2.0 * cfg.intermediate_margin;
        let mut y_current = y + self.header_height + cfg.small_margin;
        for question in &self.questions {
            question.draw(ctx, x_question, y_current, w_question);
            y_current += question.height() + cfg.small_margin;
        }
    }
}

/// Narrative text placed in a cluster column instead of questions.
#[derive(Clone, Debug)]
pub struct PlainTextGroup {
    lines: Vec<String>,
    height: f32,
}

impl PlainTextGroup {
    pub fn new(text: &str, config: &LayoutConfiguration, measure: &dyn TextMeasure) -> Self {
        let lines = wrap(
            text,
            config.column_width - config.intermediate_margin,
            config.font_size,
            measure,
        );
        let height = config.font_size * lines.len() as f32 * LINE_HEIGHT + config.small_margin;
        Self { lines, height }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn draw(&self, ctx: &mut DrawContext, x: f32, y: f32) {
        shapes::lines(ctx.canvas, &self.lines, x, y, ctx.config.font_size, |run| run);
    }
}
