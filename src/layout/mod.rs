mod cluster;
mod column;
mod group;
mod node;
mod page;
mod question;
pub(crate) mod shapes;
mod text;

use std::collections::BTreeMap;

pub use cluster::Cluster;
pub use column::{Column, Header};
pub use group::{Group, PlainTextGroup};
pub use node::VisualNode;
pub use page::{DetailsPage, OverviewPage, Row};
pub use question::{Question, QuestionDetails};
pub use shapes::Disclaimer;
pub use text::wrap;

use crate::canvas::{Canvas, Rgb};
use crate::error::Error;
use crate::fonts::TextMeasure;
use crate::links::LinkRegistry;
use crate::model::Language;

/// Line height as a multiple of the font size for every wrapped text block.
pub const LINE_HEIGHT: f32 = 1.2;

/// Geometry constants shared by every node of one build, in canvas pixels.
#[derive(Clone, Debug)]
pub struct LayoutConfiguration {
    pub paper_margin: f32,
    pub large_margin: f32,
    pub intermediate_margin: f32,
    pub small_margin: f32,

    pub title_font_size: f32,
    pub column_header_font_size: f32,
    pub group_title_font_size: f32,
    pub font_size: f32,
    pub disclaimer_font_size: f32,

    pub title_height: f32,
    pub column_header_height: f32,
    pub group_header_height: f32,

    pub column_width: f32,
    pub details_page_width: f32,
    pub priority_box_width: f32,
    pub id_box_width: f32,
    pub arrow_depth: f32,

    group_colors: BTreeMap<u8, Rgb>,
}

impl Default for LayoutConfiguration {
    fn default() -> Self {
        Self {
            paper_margin: 20.0,
            large_margin: 20.0,
            intermediate_margin: 10.0,
            small_margin: 5.0,
            title_font_size: 64.0,
            column_header_font_size: 18.0,
            group_title_font_size: 14.0,
            font_size: 12.0,
            disclaimer_font_size: 8.0,
            title_height: 80.0,
            column_header_height: 60.0,
            group_header_height: 30.0,
            column_width: 650.0,
            details_page_width: 1500.0,
            priority_box_width: 15.0,
            id_box_width: 40.0,
            arrow_depth: 20.0,
            group_colors: BTreeMap::new(),
        }
    }
}

impl LayoutConfiguration {
    /// Width available to a question inside a group inside a column.
    pub fn question_width(&self) -> f32 {
        self.column_width - 2.0 * self.arrow_depth - 2.0 * self.intermediate_margin
    }

    pub fn overview_page_width(&self, n_columns: usize) -> f32 {
        2.0 * self.paper_margin + n_columns.max(1) as f32 * self.column_width
    }

    pub fn register_group_color(&mut self, group: u8, color: Rgb) {
        self.group_colors.entry(group).or_insert(color);
    }

    pub fn group_color(&self, group: u8) -> Result<Rgb, Error> {
        self.group_colors
            .get(&group)
            .copied()
            .ok_or_else(|| Error::Layout(format!("no base colour registered for colour group {group}")))
    }

    /// Size the id box to the widest identifier that will be drawn.
    pub fn fit_id_box<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>, measure: &dyn TextMeasure) {
        let widest = ids
            .into_iter()
            .map(|id| measure.bold_width(id, self.font_size))
            .fold(0.0f32, f32::max);
        if widest > 0.0 {
            self.id_box_width = widest + self.small_margin;
        }
    }
}

/// Single-owner state of one document build: geometry, the link registry,
/// the text-measurement oracle and the output language.
pub struct BuildContext<'m> {
    pub config: LayoutConfiguration,
    pub links: LinkRegistry,
    pub measure: &'m dyn TextMeasure,
    pub language: Language,
}

impl<'m> BuildContext<'m> {
    pub fn new(config: LayoutConfiguration, measure: &'m dyn TextMeasure, language: Language) -> Self {
        Self {
            config,
            links: LinkRegistry::new(),
            measure,
            language,
        }
    }

    pub fn draw_context<'a>(&'a mut self, canvas: &'a mut Canvas, page: usize) -> DrawContext<'a> {
        DrawContext {
            canvas,
            links: &mut self.links,
            config: &self.config,
            measure: self.measure,
            language: self.language,
            page,
        }
    }
}

/// Everything a node needs while drawing onto one page.
pub struct DrawContext<'a> {
    pub canvas: &'a mut Canvas,
    pub links: &'a mut LinkRegistry,
    pub config: &'a LayoutConfiguration,
    pub measure: &'a dyn TextMeasure,
    pub language: Language,
    pub page: usize,
}
