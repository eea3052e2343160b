use std::collections::BTreeMap;

use crate::canvas::{Baseline, Rgb, TextAnchor, TextRun};

use super::{DrawContext, Group, LayoutConfiguration, shapes};

/// Chevron banner at the top of a column.
#[derive(Clone, Debug)]
pub struct Header {
    title: String,
    subtitle: String,
    color: Rgb,
    height: f32,
}

impl Header {
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>, color: Rgb, config: &LayoutConfiguration) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            color,
            height: config.column_header_height,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn subtitle(&self) -> &str {
        &self.subtitle
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// A header without title or subtitle only reserves its height.
    pub fn is_blank(&self) -> bool {
        self.title.is_empty() && self.subtitle.is_empty()
    }

    pub fn draw(&self, ctx: &mut DrawContext, x: f32, y: f32, width: f32) {
        if self.is_blank() {
            return;
        }
        let cfg = ctx.config;
        shapes::half_chevron(ctx.canvas, x, y, width, self.height, cfg.arrow_depth, self.color);

        let y_text = y + self.height / 2.0;
        let fs = cfg.column_header_font_size;
        ctx.canvas.text(
            TextRun::new(self.title.as_str(), x + cfg.arrow_depth + cfg.intermediate_margin, y_text, fs)
                .bold()
                .baseline(Baseline::Middle),
        );
        if !self.subtitle.is_empty() {
            ctx.canvas.text(
                TextRun::new(self.subtitle.as_str(), x + width - cfg.arrow_depth, y_text, fs)
                    .anchor(TextAnchor::End)
                    .baseline(Baseline::Middle),
            );
        }
    }
}

/// One time-frame column of the overview: a header and groups stacked per
/// colour group.
///
/// Without row offsets the rows follow each other directly under the header.
/// With row offsets (relative to the column top) every colour group starts at
/// its forced offset, so like-coloured rows line up across columns.
#[derive(Clone, Debug)]
pub struct Column {
    number: usize,
    header: Header,
    rows: BTreeMap<u8, Vec<Group>>,
    row_heights: BTreeMap<u8, f32>,
    row_offsets: Option<BTreeMap<u8, f32>>,
    height: f32,
    intermediate_margin: f32,
    large_margin: f32,
}

impl Column {
    pub fn new(number: usize, header: Header, config: &LayoutConfiguration) -> Self {
        let height = header.height();
        Self {
            number,
            header,
            rows: BTreeMap::new(),
            row_heights: BTreeMap::new(),
            row_offsets: None,
            height,
            intermediate_margin: config.intermediate_margin,
            large_margin: config.large_margin,
        }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn push(&mut self, color_group: u8, group: Group) {
        let row = self.row_heights.entry(color_group).or_insert(-self.intermediate_margin);
        *row += group.height() + self.intermediate_margin;
        self.rows.entry(color_group).or_default().push(group);
        self.height = self.stacked_height();
    }

    pub fn color_groups(&self) -> impl Iterator<Item = u8> + '_ {
        self.rows.keys().copied()
    }

    pub fn groups(&self, color_group: u8) -> &[Group] {
        self.rows.get(&color_group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn group_count(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }

    /// Height of the groups stacked in one colour-group row; 0 when absent.
    pub fn row_height(&self, color_group: u8) -> f32 {
        self.row_heights.get(&color_group).copied().unwrap_or(0.0)
    }

    pub fn set_row_offsets(&mut self, offsets: BTreeMap<u8, f32>) {
        self.row_offsets = Some(offsets);
        self.height = self.stacked_height();
    }

    pub fn row_offset(&self, color_group: u8) -> Option<f32> {
        match &self.row_offsets {
            Some(offsets) => offsets.get(&color_group).copied(),
            None => {
                let mut offset = self.header.height() + self.large_margin;
                for group in self.rows.keys().copied() {
                    if group == color_group {
                        return Some(offset);
                    }
                    offset += self.row_height(group) + self.large_margin;
                }
                None
            }
        }
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    fn stacked_height(&self) -> f32 {
        let bottom_of = |g: u8| self.row_offset(g).map(|off| off + self.row_height(g));
        self.rows
            .keys()
            .filter_map(|g| bottom_of(*g))
            .fold(self.header.height(), f32::max)
    }

    pub fn draw(&self, ctx: &mut DrawContext, x: f32, y: f32, width: f32) {
        self.header.draw(ctx, x, y, width);
        let group_width = width - ctx.config.arrow_depth;
        for (color_group, groups) in &self.rows {
            let Some(offset) = self.row_offset(*color_group) else {
                continue;
            };
            let mut y_current = y + offset;
            for group in groups {
                group.draw(ctx, x, y_current, group_width);
                y_current += group.height() + self.intermediate_margin;
            }
        }
    }
}
