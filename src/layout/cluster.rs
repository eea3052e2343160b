use std::collections::BTreeMap;

use crate::canvas::Rgb;

use super::{DrawContext, Group, LayoutConfiguration, PlainTextGroup, VisualNode, shapes};

/// A band across the full page width holding groups in several columns on top
/// of a shaded background panel.
#[derive(Clone, Debug)]
pub struct Cluster {
    color: Rgb,
    columns: BTreeMap<usize, Vec<VisualNode>>,
    column_heights: BTreeMap<usize, f32>,
    height: f32,
    intermediate_margin: f32,
    small_margin: f32,
}

impl Cluster {
    pub fn new(color: Rgb, config: &LayoutConfiguration) -> Self {
        Self {
            color,
            columns: BTreeMap::new(),
            column_heights: BTreeMap::new(),
            height: 0.0,
            intermediate_margin: config.intermediate_margin,
            small_margin: config.small_margin,
        }
    }

    pub fn push_group(&mut self, column: usize, group: Group) {
        self.push(column, VisualNode::Group(group));
    }

    pub fn push_text(&mut self, column: usize, text: PlainTextGroup) {
        self.push(column, VisualNode::PlainTextGroup(text));
    }

    fn push(&mut self, column: usize, item: VisualNode) {
        let first = !self.columns.contains_key(&column);
        let added = item.height() + self.intermediate_margin;
        self.columns.entry(column).or_default().push(item);
        let stack = self.column_heights.entry(column).or_insert(0.0);
        *stack += if first {
            added + self.intermediate_margin - self.small_margin
        } else {
            added
        };
        self.height = self.height.max(*stack);
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn items(&self, column: usize) -> &[VisualNode] {
        self.columns.get(&column).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn column_numbers(&self) -> impl Iterator<Item = usize> + '_ {
        self.columns.keys().copied()
    }

    /// Stack height of one column; 0 when the column holds nothing.
    pub fn column_height(&self, column: usize) -> f32 {
        self.column_heights.get(&column).copied().unwrap_or(0.0)
    }

    /// Height of the tallest column.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// `width` spans every column of the page.
    pub fn draw(&self, ctx: &mut DrawContext, x: f32, y: f32, width: f32) {
        shapes::background_panel(ctx.canvas, x, y, width, self.height, self.color);

        let cfg = ctx.config;
        for (column, items) in &self.columns {
            let x_column = x + *column as f32 * cfg.column_width;
            let mut y_current = y;
            for item in items {
                item.draw(ctx, x_column, y_current, cfg.column_width - cfg.arrow_depth);
                y_current += item.height() + self.intermediate_margin;
            }
        }
    }
}
