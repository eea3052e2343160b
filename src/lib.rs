pub mod canvas;
pub mod document;
mod error;
pub mod fonts;
pub mod layout;
pub mod links;
pub mod model;
pub mod pdf;
pub mod xlsx;

pub use document::{AgendaDocument, ImpactPathway, KnowledgeCalendar, OutputOptions};
pub use error::Error;
pub use layout::LayoutConfiguration;

use std::path::{Path, PathBuf};
use std::time::Instant;

use fonts::TextMeasure;
use model::{Language, StormSurgeBarrier};
use xlsx::{ReadOptions, WorkbookLayout};

/// Read a knowledge agenda workbook and write the calendar of `barrier`.
pub fn build_knowledge_calendar(
    input: &Path,
    barrier: StormSurgeBarrier,
    read: &ReadOptions,
    language: Language,
    measure: &dyn TextMeasure,
    output: &OutputOptions,
) -> Result<PathBuf, Error> {
    let t0 = Instant::now();

    let read = ReadOptions {
        layout: WorkbookLayout::KnowledgeAgenda,
        ..read.clone()
    };
    let set = xlsx::read_records(input, &read)?;
    let t_read = t0.elapsed();

    let calendar = KnowledgeCalendar::new(barrier, set.records).with_language(language);
    let path = calendar.build(LayoutConfiguration::default(), measure, output)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: read={:.1}ms, build={:.1}ms, total={:.1}ms ({} skipped row(s))",
        t_read.as_secs_f64() * 1000.0,
        (t_total - t_read).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        set.errors.len(),
    );

    Ok(path)
}

/// Read an impact pathway workbook and write the impact pathway document.
pub fn build_impact_pathway(
    input: &Path,
    read: &ReadOptions,
    language: Language,
    measure: &dyn TextMeasure,
    output: &OutputOptions,
) -> Result<PathBuf, Error> {
    let t0 = Instant::now();

    let read = ReadOptions {
        layout: WorkbookLayout::ImpactPathway,
        ..read.clone()
    };
    let set = xlsx::read_records(input, &read)?;
    let t_read = t0.elapsed();

    let pathway = ImpactPathway::new(set.records).with_language(language);
    let path = pathway.build(LayoutConfiguration::default(), measure, output)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: read={:.1}ms, build={:.1}ms, total={:.1}ms ({} skipped row(s))",
        t_read.as_secs_f64() * 1000.0,
        (t_total - t_read).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        set.errors.len(),
    );

    Ok(path)
}
