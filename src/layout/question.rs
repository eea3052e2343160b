use crate::canvas::{Paint, Rgb, Stroke, TextAnchor, TextRun, color_toward_grey};
use crate::fonts::TextMeasure;
use crate::model::{Label, Language, Priority, ResearchRecord};

use super::{DrawContext, LINE_HEIGHT, LayoutConfiguration, shapes, text::wrap};

/// Fill/outline colour of a record: its research line's base colour pulled
/// toward grey by the time frame, or neutral grey without a research line.
pub(crate) fn record_color(record: &ResearchRecord) -> Rgb {
    match record.primary_line {
        Some(line) => color_toward_grey(line.base_color(), record.time_frame.grey_fraction()),
        None => Rgb::NEUTRAL,
    }
}

/// Light background tint for a record's box.
fn record_fill(color: Rgb) -> Rgb {
    color.toward(Rgb::WHITE, 0.7)
}

/// One research question on the overview page.
#[derive(Clone, Debug)]
pub struct Question {
    record: ResearchRecord,
    lines: Vec<String>,
    height: f32,
    width: f32,
}

impl Question {
    pub fn new(record: ResearchRecord, config: &LayoutConfiguration, measure: &dyn TextMeasure) -> Self {
        let width = config.question_width();
        let lines = wrap(
            &record.question,
            width - Self::text_offset(config) - config.small_margin,
            config.font_size,
            measure,
        );
        let height = config.font_size * lines.len() as f32 * LINE_HEIGHT + 2.0 * config.small_margin;
        Self {
            record,
            lines,
            height,
            width,
        }
    }

    fn priority_box(config: &LayoutConfiguration) -> f32 {
        config.priority_box_width + 2.0 * config.small_margin
    }

    fn text_offset(config: &LayoutConfiguration) -> f32 {
        Self::priority_box(config) + config.id_box_width
    }

    pub fn record(&self) -> &ResearchRecord {
        &self.record
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn high_priority(&self) -> bool {
        self.record.has_priority()
    }

    pub fn draw(&self, ctx: &mut DrawContext, x: f32, y: f32, width: f32) {
        let cfg = ctx.config;
        let color = record_color(&self.record);
        ctx.canvas.rect(
            x,
            y,
            width,
            self.height,
            Some(Paint::Solid(record_fill(color))),
            Some(Stroke::new(color, 0.5)),
        );

        shapes::priority_glyph(
            ctx.canvas,
            x + cfg.small_margin,
            y + self.height / 2.0,
            cfg.priority_box_width,
            self.high_priority(),
        );

        let x_id = x + Self::priority_box(cfg);
        let y_text = y + cfg.small_margin;
        ctx.canvas
            .text(TextRun::new(self.record.id.as_str(), x_id, y_text, cfg.font_size).bold());
        let id_width = ctx.measure.bold_width(&self.record.id, cfg.font_size);
        ctx.links
            .register_link(&self.record.id, ctx.page, x_id, y_text, id_width, cfg.font_size);

        shapes::lines(
            ctx.canvas,
            &self.lines,
            x + Self::text_offset(cfg),
            y_text,
            cfg.font_size,
            |run| run,
        );
    }
}

/// Widths and heights of the four fields of a detail row.
#[derive(Clone, Copy, Debug, PartialEq)]
struct DetailsGeometry {
    w_code: f32,
    w_question: f32,
    w_priority_fixed: f32,
    w_priority: f32,
    w_related: f32,
    h_first_line: f32,
}

/// Full-width row on a details page: id and priority glyph, question and
/// explanation, per-axis priority dots plus metadata, and related ids.
#[derive(Clone, Debug)]
pub struct QuestionDetails {
    record: ResearchRecord,
    geometry: DetailsGeometry,
    question_lines: Vec<String>,
    explanation_lines: Vec<String>,
    priority_labels: [String; 4],
    priority_label_width: f32,
    metadata_lines: Vec<String>,
    metadata_offset: f32,
    related_title: String,
    priority_title: String,
    height: f32,
}

const DOT_RADIUS: f32 = 5.0;
const DOT_SPACING: f32 = 2.5 * DOT_RADIUS;

impl QuestionDetails {
    /// `width` is the full row width available on the page.
    pub fn new(
        record: ResearchRecord,
        width: f32,
        config: &LayoutConfiguration,
        measure: &dyn TextMeasure,
        language: Language,
    ) -> Self {
        let fs = config.font_size;
        let sm = config.small_margin;
        let related_title = Label::Related.text(language).to_string();
        let priority_title = Label::PriorityTitle.text(language).to_string();

        let w_code = (config.priority_box_width + 2.0 * sm).max(config.id_box_width);
        let h_first_line = sm + fs + sm;
        let h_code = h_first_line + config.priority_box_width + config.intermediate_margin;

        let w_related = (measure.width(&related_title, fs) + 2.0 * sm).max(config.id_box_width + 2.0 * sm);
        let h_related = h_first_line + record.references.len() as f32 * fs * LINE_HEIGHT + sm;

        let w_priority_fixed = 50.0;
        let h_priority_fixed = h_first_line + 4.0 * fs * LINE_HEIGHT + sm;

        let w_remaining = width - w_code - w_priority_fixed - w_related;
        let w_priority = w_remaining * 0.4;
        let w_question = w_remaining * 0.6;

        let question_lines = wrap(&record.question, w_question - 2.0 * sm, fs, measure);
        let explanation_lines = wrap(
            record.explanation.as_deref().unwrap_or("-"),
            w_question - 2.0 * sm,
            fs,
            measure,
        );
        let h_question = sm
            + question_lines.len() as f32 * fs * LINE_HEIGHT
            + sm
            + explanation_lines.len() as f32 * fs * LINE_HEIGHT
            + sm;

        let priority_labels = [
            Label::WaterSafety,
            Label::OtherFunctions,
            Label::Operation,
            Label::Maintenance,
        ]
        .map(|l| format!("{}:", l.text(language)));
        let priority_label_width = priority_labels
            .iter()
            .map(|l| measure.width(l, fs))
            .fold(0.0f32, f32::max);

        let metadata_offset = sm + priority_label_width + sm + 2.0 * DOT_SPACING + 2.0 * DOT_RADIUS + config.intermediate_margin;
        let metadata_width = w_priority_fixed + w_priority - metadata_offset - sm;
        let metadata_lines: Vec<String> = metadata(&record, language)
            .iter()
            .flat_map(|entry| wrap(entry, metadata_width, fs, measure))
            .collect();
        let h_priority = h_first_line + sm + metadata_lines.len() as f32 * fs * LINE_HEIGHT + sm;

        let height = [h_code, h_priority, h_priority_fixed, h_question, h_related]
            .into_iter()
            .fold(0.0f32, f32::max);

        Self {
            record,
            geometry: DetailsGeometry {
                w_code,
                w_question,
                w_priority_fixed,
                w_priority,
                w_related,
                h_first_line,
            },
            question_lines,
            explanation_lines,
            priority_labels,
            priority_label_width,
            metadata_lines,
            metadata_offset,
            related_title,
            priority_title,
            height,
        }
    }

    pub fn record(&self) -> &ResearchRecord {
        &self.record
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn question_lines(&self) -> &[String] {
        &self.question_lines
    }

    pub fn metadata_lines(&self) -> &[String] {
        &self.metadata_lines
    }

    pub fn draw(&self, ctx: &mut DrawContext, x: f32, y: f32, width: f32) {
        let cfg = ctx.config;
        let fs = cfg.font_size;
        let sm = cfg.small_margin;
        let g = self.geometry;
        let color = record_color(&self.record);

        ctx.links.register_link_target(&self.record.id, ctx.page, x, y);

        ctx.canvas.rect(
            x,
            y,
            width,
            self.height,
            Some(Paint::Solid(record_fill(color))),
            Some(Stroke::new(color, 0.5)),
        );

        // Code field
        ctx.canvas.text(
            TextRun::new(self.record.id.as_str(), x + g.w_code / 2.0, y + sm, fs)
                .bold()
                .anchor(TextAnchor::Middle),
        );
        shapes::horizontal_separator(ctx.canvas, x, y + g.h_first_line, g.w_code, sm, color);
        let y_middle = y + 2.0 * sm + fs * LINE_HEIGHT + (self.height - g.h_first_line) / 2.0;
        shapes::priority_glyph(
            ctx.canvas,
            x + g.w_code / 2.0 - cfg.priority_box_width / 2.0,
            y_middle,
            cfg.priority_box_width,
            self.record.has_priority(),
        );
        shapes::vertical_separator(ctx.canvas, x + g.w_code, y, self.height, sm, color);

        // Question field
        let x_question = x + g.w_code + sm;
        shapes::lines(ctx.canvas, &self.question_lines, x_question, y + sm, fs, TextRun::italic);
        let y_explanation = y + sm + self.question_lines.len() as f32 * fs * LINE_HEIGHT + sm;
        shapes::lines(ctx.canvas, &self.explanation_lines, x_question, y_explanation, fs, |run| run);

        // Priority field
        let x_priority = x + g.w_code + g.w_question;
        shapes::vertical_separator(ctx.canvas, x_priority, y, self.height, sm, color);
        ctx.canvas
            .text(TextRun::new(self.priority_title.as_str(), x_priority + sm, y + sm, fs));
        shapes::horizontal_separator(
            ctx.canvas,
            x_priority,
            y + g.h_first_line,
            g.w_priority + g.w_priority_fixed,
            sm,
            color,
        );

        let axes = [
            self.record.priorities.water_safety,
            self.record.priorities.other_functions,
            self.record.priorities.operation,
            self.record.priorities.maintenance,
        ];
        let x_label = x_priority + sm;
        let x_dots = x_label + self.priority_label_width + sm;
        let mut y_row = y + g.h_first_line + sm;
        for (label, priority) in self.priority_labels.iter().zip(axes) {
            ctx.canvas.text(TextRun::new(label.as_str(), x_label, y_row, fs));
            priority_dots(ctx, x_dots, y_row, priority);
            y_row += fs * LINE_HEIGHT;
        }
        shapes::lines(
            ctx.canvas,
            &self.metadata_lines,
            x_priority + self.metadata_offset,
            y + g.h_first_line + sm,
            fs,
            |run| run,
        );

        // Related field
        let x_related_start = x_priority + g.w_priority_fixed + g.w_priority;
        shapes::vertical_separator(ctx.canvas, x_related_start, y, self.height, sm, color);
        ctx.canvas
            .text(TextRun::new(self.related_title.as_str(), x_related_start + sm, y + sm, fs));
        shapes::horizontal_separator(ctx.canvas, x_related_start, y + g.h_first_line, g.w_related, sm, color);

        let x_related = x_related_start + sm;
        let mut y_related = y + g.h_first_line + sm;
        for related in &self.record.references {
            ctx.canvas.text(TextRun::new(related.as_str(), x_related, y_related, fs));
            let w = ctx.measure.width(related, fs);
            ctx.links.register_link(related, ctx.page, x_related, y_related, w, fs);
            y_related += fs * LINE_HEIGHT;
        }
    }
}

/// 1..=3 filled dots for Low..=High, a question mark when unknown.
fn priority_dots(ctx: &mut DrawContext, x: f32, y_row: f32, priority: Priority) {
    let fs = ctx.config.font_size;
    if priority == Priority::Unknown {
        ctx.canvas.text(TextRun::new("?", x, y_row, fs));
        return;
    }
    let y_center = y_row + fs - DOT_RADIUS;
    for i in 0..priority.ordinal() {
        let cx = x + DOT_RADIUS + f32::from(i) * DOT_SPACING;
        ctx.canvas
            .circle(cx, y_center, DOT_RADIUS, Some(Paint::Solid(Rgb::BLACK)), None);
    }
}

fn metadata(record: &ResearchRecord, language: Language) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(holder) = record.action_holder.as_deref().filter(|h| !h.trim().is_empty()) {
        out.push(format!("{}: {}", Label::ActionHolder.text(language), holder.trim()));
    }
    if let Some(costs) = record.cost_estimate {
        out.push(format!("{}: {}", Label::Costs.text(language), format_number(costs)));
    }
    if let Some(lead_time) = record.lead_time {
        out.push(format!("{}: {}", Label::LeadTime.text(language), format_number(lead_time)));
    }
    out
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}
