//! Grouping, ordering and colouring rules shared by both document builders.

use std::collections::BTreeMap;

use crate::canvas::{Rgb, color_toward_grey};
use crate::fonts::TextMeasure;
use crate::layout::{BuildContext, DetailsPage, Disclaimer, LayoutConfiguration, QuestionDetails};
use crate::model::{Label, ResearchLine, ResearchRecord, TimeFrame};

const COLUMN_HEADER_COLOR: Rgb = Rgb(18, 103, 221);

const DISCLAIMER_TEXT: &str = "Dit is een eerste concept van de onderzoeksagenda stormvloedkeringen. \
Deze versie is ontstaan in samenwerking met de asset management teams van de keringen. \
De prioritering van de onderzoeksvragen moet nog gereviewd worden door o.a. de asset management teams en RWS WVL/GPO. \
De indeling in tijdsperiode is op dit moment in ontwikkeling. \
Voor vragen, neem contact op met Marit de Jong of Riva de Vries.";

pub fn column_subtitle(time_frame: TimeFrame) -> &'static str {
    match time_frame {
        TimeFrame::Now => "",
        TimeFrame::NearFuture => "(2033 - 2040)",
        TimeFrame::Future => "(>2040)",
        TimeFrame::NotRelevant => "(-)",
        TimeFrame::Unknown => "(?)",
    }
}

pub fn column_header_color(time_frame: TimeFrame) -> Rgb {
    color_toward_grey(COLUMN_HEADER_COLOR, time_frame.grey_fraction())
}

/// Group colour of a research line inside a time-frame column.
pub fn group_color(line: ResearchLine, time_frame: TimeFrame) -> Rgb {
    color_toward_grey(line.base_color(), time_frame.grey_fraction())
}

/// Records split by primary research line (ordered by line number), plus the
/// records without one, each in input order.
pub fn group_by_line<'a>(
    records: impl IntoIterator<Item = &'a ResearchRecord>,
) -> (BTreeMap<ResearchLine, Vec<&'a ResearchRecord>>, Vec<&'a ResearchRecord>) {
    let mut grouped: BTreeMap<ResearchLine, Vec<&ResearchRecord>> = BTreeMap::new();
    let mut uncategorized = Vec::new();
    for record in records {
        match record.primary_line {
            Some(line) => grouped.entry(line).or_default().push(record),
            None => uncategorized.push(record),
        }
    }
    (grouped, uncategorized)
}

/// High-priority records first; the sort is stable, so ties keep input order.
pub fn sort_by_priority(records: &mut [&ResearchRecord]) {
    records.sort_by_key(|r| std::cmp::Reverse(r.has_priority()));
}

pub fn details_title(line: ResearchLine, label: &str) -> String {
    format!("{}. {}", line.number(), label)
}

/// One details page per primary research line (by line number), then one for
/// the records without a research line. Page numbers start at `first_page`.
pub fn details_pages(records: &[ResearchRecord], ctx: &BuildContext, first_page: usize) -> Vec<DetailsPage> {
    let (grouped, uncategorized) = group_by_line(records);
    let width = DetailsPage::row_width(&ctx.config);
    let details = |record: &ResearchRecord| {
        QuestionDetails::new(record.clone(), width, &ctx.config, ctx.measure, ctx.language)
    };

    let mut pages = Vec::with_capacity(grouped.len() + 1);
    let mut page_number = first_page;
    for (line, records) in grouped {
        let title = details_title(line, Label::ResearchLine(line).text(ctx.language));
        let mut page = DetailsPage::new(title, line.base_color(), page_number).with_target(line.link_key());
        for record in records {
            page.push(details(record));
        }
        pages.push(page);
        page_number += 1;
    }

    if !uncategorized.is_empty() {
        let mut page = DetailsPage::new(Label::NoResearchLine.text(ctx.language), Rgb::NEUTRAL, page_number);
        for record in uncategorized {
            page.push(details(record));
        }
        pages.push(page);
    }
    pages
}

pub fn disclaimer(config: &LayoutConfiguration) -> Disclaimer {
    Disclaimer {
        text: DISCLAIMER_TEXT.to_string(),
        links: vec![
            ("Riva de Vries".to_string(), "mailto:riva.de.vries@rws.nl".to_string()),
            ("Marit de Jong".to_string(), "mailto:marit.de.jong@rws.nl".to_string()),
        ],
        font_size: config.disclaimer_font_size,
    }
}

/// Widen the id box of `config` to fit every record id.
pub fn fit_id_box(config: &mut LayoutConfiguration, records: &[ResearchRecord], measure: &dyn TextMeasure) {
    config.fit_id_box(records.iter().map(|r| r.id.as_str()), measure);
}
