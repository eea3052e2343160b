use std::collections::{BTreeMap, BTreeSet};

use crate::canvas::{Baseline, Canvas, Rgb, TextAnchor, TextRun};
use crate::error::Error;

use super::shapes::{self, Disclaimer};
use super::{BuildContext, Cluster, Column, LayoutConfiguration, QuestionDetails};

/// One aligned colour-group row of an overview page. `offset` is measured
/// from the top of the column headers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Row {
    pub color_group: u8,
    pub offset: f32,
    pub height: f32,
}

/// The overview page: time-frame columns whose colour-group rows are aligned
/// across the page, optional full-width clusters below them, a title with a
/// badge callout and a disclaimer footer.
#[derive(Clone, Debug)]
pub struct OverviewPage {
    title: String,
    badge: String,
    page_number: usize,
    columns: Vec<Column>,
    clusters: Vec<Cluster>,
    disclaimer: Option<Disclaimer>,
    rows: Vec<Row>,
}

impl OverviewPage {
    pub fn new(title: impl Into<String>, badge: impl Into<String>, page_number: usize) -> Self {
        Self {
            title: title.into(),
            badge: badge.into(),
            page_number,
            columns: Vec::new(),
            clusters: Vec::new(),
            disclaimer: None,
            rows: Vec::new(),
        }
    }

    pub fn push_column(&mut self, column: Column) {
        self.columns.push(column);
        self.columns.sort_by_key(Column::number);
    }

    pub fn push_cluster(&mut self, cluster: Cluster) {
        self.clusters.push(cluster);
    }

    pub fn set_disclaimer(&mut self, disclaimer: Disclaimer) {
        self.disclaimer = Some(disclaimer);
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// First pass: every colour group present in any column gets one offset,
    /// shared by all columns, and a row height equal to the tallest stack of
    /// that group in any column (absent columns contribute 0).
    pub fn align_rows(&mut self, config: &LayoutConfiguration) -> &[Row] {
        let color_groups: BTreeSet<u8> = self.columns.iter().flat_map(Column::color_groups).collect();
        let gap = config.large_margin + 2.0 * config.intermediate_margin;

        self.rows.clear();
        let mut offset = config.column_header_height + config.large_margin + config.intermediate_margin;
        for color_group in color_groups {
            let height = self
                .columns
                .iter()
                .map(|c| c.row_height(color_group))
                .fold(0.0, f32::max);
            self.rows.push(Row {
                color_group,
                offset,
                height,
            });
            offset += height + gap;
        }

        let offsets: BTreeMap<u8, f32> = self.rows.iter().map(|r| (r.color_group, r.offset)).collect();
        for column in &mut self.columns {
            column.set_row_offsets(offsets.clone());
        }
        &self.rows
    }

    fn rows_height(&self, config: &LayoutConfiguration) -> f32 {
        match (self.rows.first(), self.rows.last()) {
            (Some(first), Some(last)) => {
                last.offset + last.height + config.intermediate_margin - first.offset
                    + config.intermediate_margin
            }
            _ => 0.0,
        }
    }

    fn clusters_height(&self, config: &LayoutConfiguration) -> f32 {
        if self.clusters.is_empty() {
            return 0.0;
        }
        self.clusters.iter().map(Cluster::height).sum::<f32>()
            + config.large_margin * (self.clusters.len() - 1) as f32
    }

    /// Both passes: align rows, size the page, then draw everything onto a
    /// fresh canvas and register the page size.
    pub fn render(mut self, ctx: &mut BuildContext) -> Result<Canvas, Error> {
        self.align_rows(&ctx.config);
        let cfg = ctx.config.clone();

        let width = cfg.overview_page_width(self.columns.len());
        let inner_width = width - 2.0 * cfg.paper_margin;
        let y_column_header = cfg.paper_margin + cfg.title_height + cfg.large_margin;
        let y_top = y_column_header + cfg.column_header_height + cfg.large_margin;

        let rows_height = self.rows_height(&cfg);
        let clusters_height = self.clusters_height(&cfg);
        let between = if rows_height > 0.0 && clusters_height > 0.0 {
            cfg.large_margin
        } else {
            0.0
        };
        let body = rows_height + between + clusters_height;
        let disclaimer_height = self
            .disclaimer
            .as_ref()
            .map(|d| d.height(inner_width, ctx.measure))
            .unwrap_or(0.0);

        let height = y_top + body + cfg.large_margin + disclaimer_height + cfg.paper_margin;
        log::debug!(
            "Overview page {}: {:.0}x{:.0}px, {} columns, {} rows, {} clusters",
            self.page_number,
            width,
            height,
            self.columns.len(),
            self.rows.len(),
            self.clusters.len()
        );

        let mut canvas = Canvas::new(width, height);
        ctx.links.register_page(self.page_number, width, height);

        for row in &self.rows {
            let color = cfg.group_color(row.color_group)?;
            shapes::background_panel(
                &mut canvas,
                cfg.paper_margin,
                y_column_header + row.offset - cfg.intermediate_margin,
                inner_width,
                row.height + 2.0 * cfg.intermediate_margin,
                color,
            );
        }

        self.draw_title(&mut canvas, &cfg);

        let mut dc = ctx.draw_context(&mut canvas, self.page_number);

        let mut x = cfg.paper_margin;
        for column in &self.columns {
            column.draw(&mut dc, x, y_column_header, cfg.column_width);
            x += cfg.column_width;
        }

        let mut y = y_top + rows_height + between;
        for cluster in &self.clusters {
            cluster.draw(&mut dc, cfg.paper_margin, y, inner_width);
            y += cluster.height() + cfg.large_margin;
        }

        if let Some(disclaimer) = &self.disclaimer {
            disclaimer.draw(
                dc.canvas,
                cfg.paper_margin,
                y_top + body + cfg.large_margin,
                inner_width,
                dc.measure,
            );
        }

        Ok(canvas)
    }

    fn draw_title(&self, canvas: &mut Canvas, cfg: &LayoutConfiguration) {
        let icon_size = cfg.title_height;
        let icon_width = icon_size + cfg.arrow_depth;
        shapes::callout(
            canvas,
            cfg.paper_margin,
            cfg.paper_margin,
            icon_width,
            icon_size,
            cfg.arrow_depth,
            Rgb::BLACK,
        );
        canvas.text(
            TextRun::new(
                self.badge.as_str(),
                cfg.paper_margin + cfg.arrow_depth + icon_size / 2.0,
                cfg.paper_margin + icon_size / 2.0,
                icon_size / 4.0,
            )
            .bold()
            .anchor(TextAnchor::Middle)
            .baseline(Baseline::Middle),
        );
        canvas.text(
            TextRun::new(
                self.title.as_str(),
                2.0 * cfg.paper_margin + icon_width,
                cfg.paper_margin + cfg.title_height / 2.0,
                cfg.title_font_size,
            )
            .bold()
            .baseline(Baseline::Middle),
        );
    }
}

/// A details page: a coloured title and one full-width row per record,
/// sorted by record id.
#[derive(Clone, Debug)]
pub struct DetailsPage {
    title: String,
    color: Rgb,
    page_number: usize,
    target_key: Option<String>,
    items: Vec<QuestionDetails>,
}

impl DetailsPage {
    pub fn new(title: impl Into<String>, color: Rgb, page_number: usize) -> Self {
        Self {
            title: title.into(),
            color,
            page_number,
            target_key: None,
            items: Vec::new(),
        }
    }

    /// Registers the page title as link target `key`.
    pub fn with_target(mut self, key: impl Into<String>) -> Self {
        self.target_key = Some(key.into());
        self
    }

    /// Width handed to every row of a details page.
    pub fn row_width(config: &LayoutConfiguration) -> f32 {
        config.details_page_width - 2.0 * config.paper_margin
    }

    pub fn push(&mut self, item: QuestionDetails) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[QuestionDetails] {
        &self.items
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn target_key(&self) -> Option<&str> {
        self.target_key.as_deref()
    }

    pub fn height(&self, config: &LayoutConfiguration) -> f32 {
        let rows: f32 = self.items.iter().map(QuestionDetails::height).sum();
        let gaps = config.small_margin * self.items.len().saturating_sub(1) as f32;
        config.paper_margin + config.title_height + config.large_margin + rows + gaps + config.paper_margin
    }

    pub fn render(mut self, ctx: &mut BuildContext) -> Result<Canvas, Error> {
        self.items.sort_by(|a, b| a.record().id.cmp(&b.record().id));
        let cfg = ctx.config.clone();
        let width = cfg.details_page_width;
        let height = self.height(&cfg);
        log::debug!(
            "Details page {} '{}': {} rows, {:.0}px high",
            self.page_number,
            self.title,
            self.items.len(),
            height
        );

        let mut canvas = Canvas::new(width, height);
        ctx.links.register_page(self.page_number, width, height);
        if let Some(key) = &self.target_key {
            ctx.links
                .register_link_target(key, self.page_number, cfg.paper_margin, cfg.paper_margin);
        }

        shapes::callout(
            &mut canvas,
            cfg.paper_margin,
            cfg.paper_margin,
            width - 2.0 * cfg.paper_margin,
            cfg.title_height,
            cfg.arrow_depth,
            self.color,
        );
        canvas.text(
            TextRun::new(
                self.title.as_str(),
                cfg.paper_margin + cfg.arrow_depth + cfg.intermediate_margin,
                cfg.paper_margin + cfg.title_height / 2.0,
                cfg.title_font_size / 2.0,
            )
            .bold()
            .baseline(Baseline::Middle),
        );

        let row_width = Self::row_width(&cfg);
        let mut dc = ctx.draw_context(&mut canvas, self.page_number);
        let mut y = cfg.paper_margin + cfg.title_height + cfg.large_margin;
        for item in &self.items {
            item.draw(&mut dc, cfg.paper_margin, y, row_width);
            y += item.height() + cfg.small_margin;
        }

        Ok(canvas)
    }
}
