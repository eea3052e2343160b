use crate::layout::{BuildContext, Column, Group, Header, OverviewPage, Question};
use crate::model::{Label, Language, ResearchRecord, StormSurgeBarrier, TimeFrame};

use super::AgendaDocument;
use super::helpers;

/// The knowledge calendar of one storm surge barrier: an overview with a
/// column per time frame and a details page per research line.
#[derive(Clone, Debug)]
pub struct KnowledgeCalendar {
    barrier: StormSurgeBarrier,
    records: Vec<ResearchRecord>,
    language: Language,
}

impl KnowledgeCalendar {
    /// Keeps only the records that apply to `barrier`.
    pub fn new(barrier: StormSurgeBarrier, records: Vec<ResearchRecord>) -> Self {
        let total = records.len();
        let records: Vec<ResearchRecord> = records.into_iter().filter(|r| r.applies_to(barrier)).collect();
        if records.len() < total {
            log::debug!(
                "{} of {} record(s) apply to {}",
                records.len(),
                total,
                barrier.code()
            );
        }
        Self {
            barrier,
            records,
            language: Language::Dutch,
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn barrier(&self) -> StormSurgeBarrier {
        self.barrier
    }

    fn column(&self, ctx: &mut BuildContext, time_frame: TimeFrame, number: usize) -> Option<Column> {
        let records: Vec<&ResearchRecord> = self
            .records
            .iter()
            .filter(|r| r.time_frame == time_frame)
            .collect();
        if records.is_empty() {
            return None;
        }

        let header = Header::new(
            Label::TimeFrame(time_frame).text(self.language),
            helpers::column_subtitle(time_frame),
            helpers::column_header_color(time_frame),
            &ctx.config,
        );
        let mut column = Column::new(number, header, &ctx.config);

        let (grouped, _) = helpers::group_by_line(records);
        for (line, mut records) in grouped {
            ctx.config.register_group_color(line.color_group(), line.base_color());
            let mut group = Group::new(
                Label::ResearchLine(line).text(self.language),
                helpers::group_color(line, time_frame),
                &ctx.config,
            )
            .with_link(line.link_key());
            helpers::sort_by_priority(&mut records);
            for record in records {
                group.push(Question::new(record.clone(), &ctx.config, ctx.measure));
            }
            column.push(line.color_group(), group);
        }
        Some(column)
    }
}

impl AgendaDocument for KnowledgeCalendar {
    fn records(&self) -> &[ResearchRecord] {
        &self.records
    }

    fn language(&self) -> Language {
        self.language
    }

    /// Only time frames that hold at least one record get a column.
    fn overview(&self, ctx: &mut BuildContext) -> OverviewPage {
        let mut page = OverviewPage::new(
            Label::Barrier(self.barrier).text(self.language),
            self.barrier.code(),
            1,
        );
        for time_frame in TimeFrame::PLOTTED {
            let number = time_frame.column_index().unwrap_or_default();
            if let Some(column) = self.column(ctx, time_frame, number) {
                page.push_column(column);
            }
        }
        page.set_disclaimer(helpers::disclaimer(&ctx.config));
        page
    }
}
