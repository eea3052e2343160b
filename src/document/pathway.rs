use std::collections::BTreeMap;

use crate::canvas::Rgb;
use crate::layout::{BuildContext, Cluster, Column, Group, Header, OverviewPage, PlainTextGroup, Question};
use crate::model::{ImpactCategory, Label, Language, ResearchLine, ResearchRecord, TimeFrame};

use super::AgendaDocument;
use super::helpers;

const CLUSTER_COLOR: Rgb = Rgb(180, 180, 180);

/// Column holding the impact category descriptions, right of the time frames.
const IMPACT_COLUMN: usize = 3;

/// The impact pathway: one cluster per impact category spanning the three
/// time-frame columns, with the category's description in a fourth column.
#[derive(Clone, Debug)]
pub struct ImpactPathway {
    records: Vec<ResearchRecord>,
    language: Language,
}

impl ImpactPathway {
    pub fn new(records: Vec<ResearchRecord>) -> Self {
        Self {
            records,
            language: Language::English,
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    fn clusters(&self, ctx: &mut BuildContext) -> Vec<Cluster> {
        // (category, line, column) orders groups by category, then line, then time frame.
        let mut keyed: BTreeMap<(ImpactCategory, ResearchLine, usize), Vec<&ResearchRecord>> = BTreeMap::new();
        for record in &self.records {
            let (Some(category), Some(line), Some(column)) = (
                record.impact_category,
                record.primary_line,
                record.time_frame.column_index(),
            ) else {
                continue;
            };
            keyed.entry((category, line, column)).or_default().push(record);
        }

        let mut clusters: BTreeMap<ImpactCategory, Cluster> = ImpactCategory::ALL
            .into_iter()
            .map(|category| (category, Cluster::new(CLUSTER_COLOR, &ctx.config)))
            .collect();

        for ((category, line, column), mut records) in keyed {
            let time_frame = TimeFrame::PLOTTED[column];
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
            if let Some(cluster) = clusters.get_mut(&category) {
                cluster.push_group(column, group);
            }
        }

        for (category, cluster) in &mut clusters {
            cluster.push_text(
                IMPACT_COLUMN,
                PlainTextGroup::new(category.description(), &ctx.config, ctx.measure),
            );
        }
        clusters.into_values().collect()
    }
}

impl AgendaDocument for ImpactPathway {
    fn records(&self) -> &[ResearchRecord] {
        &self.records
    }

    fn language(&self) -> Language {
        self.language
    }

    fn overview(&self, ctx: &mut BuildContext) -> OverviewPage {
        let mut page = OverviewPage::new(Label::ImpactPathway.text(self.language), "SSB", 1);
        for time_frame in TimeFrame::PLOTTED {
            let header = Header::new(
                Label::TimeFrame(time_frame).text(self.language),
                helpers::column_subtitle(time_frame),
                helpers::column_header_color(time_frame),
                &ctx.config,
            );
            let number = time_frame.column_index().unwrap_or_default();
            page.push_column(Column::new(number, header, &ctx.config));
        }
        page.push_column(Column::new(
            IMPACT_COLUMN,
            Header::new("", "", Rgb::WHITE, &ctx.config),
            &ctx.config,
        ));
        for cluster in self.clusters(ctx) {
            page.push_cluster(cluster);
        }
        page.set_disclaimer(helpers::disclaimer(&ctx.config));
        page
    }
}
