use std::path::Path;

use crate::error::Error;
use crate::model::{
    ImpactCategory, Priorities, Priority, RecordSet, ResearchLine, ResearchRecord, RowError, StormSurgeBarrier,
    TimeFrame,
};

use super::{Cell, Sheet};

/// The two workbook layouts in circulation. They share the leading columns
/// and diverge after the question text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WorkbookLayout {
    #[default]
    KnowledgeAgenda,
    ImpactPathway,
}

/// Zero-based column positions of one layout.
struct Columns {
    barrier: usize,
    id: usize,
    references: usize,
    question: usize,
    explanation: usize,
    water_safety: usize,
    other_functions: usize,
    maintenance: usize,
    operation: usize,
    time_frame: usize,
    primary_line: usize,
    secondary_line: usize,
    impact_category: Option<usize>,
    action_holder: usize,
    costs: usize,
    lead_time: usize,
}

impl WorkbookLayout {
    fn columns(self) -> Columns {
        match self {
            WorkbookLayout::KnowledgeAgenda => Columns {
                barrier: 0,
                id: 1,
                references: 2,
                question: 5,
                explanation: 6,
                water_safety: 7,
                other_functions: 8,
                maintenance: 9,
                operation: 10,
                time_frame: 11,
                primary_line: 12,
                secondary_line: 13,
                impact_category: None,
                action_holder: 16,
                costs: 17,
                lead_time: 18,
            },
            WorkbookLayout::ImpactPathway => Columns {
                barrier: 0,
                id: 1,
                references: 2,
                question: 5,
                explanation: 7,
                water_safety: 8,
                other_functions: 9,
                maintenance: 10,
                operation: 11,
                time_frame: 12,
                primary_line: 13,
                secondary_line: 14,
                impact_category: Some(16),
                action_holder: 20,
                costs: 21,
                lead_time: 22,
            },
        }
    }
}

#[derive(Clone, Debug)]
pub struct ReadOptions {
    pub sheet: String,
    /// One-based row number of the first record (rows above it are headers).
    pub first_row: usize,
    pub layout: WorkbookLayout,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            sheet: "Database".to_string(),
            first_row: 3,
            layout: WorkbookLayout::KnowledgeAgenda,
        }
    }
}

pub fn read_records(path: &Path, options: &ReadOptions) -> Result<RecordSet, Error> {
    let t0 = std::time::Instant::now();
    let mut workbook = super::open(path)?;
    let sheet = workbook.sheet(&options.sheet)?;
    let set = records_from_sheet(&sheet, options);
    log::info!(
        "Read {} record(s) from '{}' ({} row(s) skipped) in {:.1}ms",
        set.records.len(),
        options.sheet,
        set.errors.len(),
        t0.elapsed().as_secs_f64() * 1000.0,
    );
    Ok(set)
}

/// Map every data row of `sheet` to a record. Rows that cannot be read are
/// reported in `errors` and left out; blank rows are ignored.
pub fn records_from_sheet(sheet: &Sheet, options: &ReadOptions) -> RecordSet {
    let columns = options.layout.columns();
    let mut set = RecordSet::default();
    for row in options.first_row.saturating_sub(1)..sheet.row_count() {
        let cells = sheet.row(row);
        if cells.iter().all(Cell::is_empty) {
            continue;
        }
        match read_row(sheet, row, &columns) {
            Ok(record) => set.records.push(record),
            Err(error) => {
                log::warn!("Skipping row {}: {}", row + 1, error);
                set.errors.push(error);
            }
        }
    }
    set
}

fn row_error(row: usize, column: Option<usize>, message: impl Into<String>) -> RowError {
    RowError {
        row,
        column,
        message: message.into(),
    }
}

fn text(sheet: &Sheet, row: usize, column: usize) -> Option<String> {
    sheet.cell(row, column).as_text().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn priority(sheet: &Sheet, row: usize, column: usize) -> Priority {
    sheet
        .cell(row, column)
        .as_integer()
        .map(Priority::from_code)
        .unwrap_or_default()
}

fn research_line(sheet: &Sheet, row: usize, column: usize) -> Result<Option<ResearchLine>, RowError> {
    // Cells read "3. Voorzieningen en gebouwen"; a bare number is accepted too.
    let cell = sheet.cell(row, column);
    let number = match cell {
        Cell::Empty => return Ok(None),
        Cell::Number(_) => cell.as_integer(),
        Cell::Text(s) if s.trim().is_empty() => return Ok(None),
        Cell::Text(s) => s.split('.').next().and_then(|n| n.trim().parse::<i64>().ok()),
        Cell::Bool(_) => None,
    };
    let line = number
        .and_then(|n| u8::try_from(n).ok())
        .and_then(ResearchLine::from_number);
    match line {
        Some(line) => Ok(Some(line)),
        None => Err(row_error(
            row,
            Some(column),
            format!("cannot read research line from '{}'", cell.as_text().unwrap_or_default()),
        )),
    }
}

fn barriers(sheet: &Sheet, row: usize, column: usize) -> Result<Vec<StormSurgeBarrier>, RowError> {
    let Some(value) = text(sheet, row, column) else {
        return Err(row_error(row, Some(column), "missing storm surge barrier"));
    };
    value
        .split(',')
        .map(|code| {
            StormSurgeBarrier::from_code(code).ok_or_else(|| {
                row_error(
                    row,
                    Some(column),
                    format!(
                        "cannot read storm surge barrier '{}'; expected one of 6SVK, HV, HIJK, HK, MLK, OSK, RP",
                        code.trim()
                    ),
                )
            })
        })
        .collect()
}

fn references(sheet: &Sheet, row: usize, column: usize) -> Vec<String> {
    text(sheet, row, column)
        .map(|value| {
            value
                .split([';', ','])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn read_row(sheet: &Sheet, row: usize, columns: &Columns) -> Result<ResearchRecord, RowError> {
    let id = text(sheet, row, columns.id).ok_or_else(|| row_error(row, Some(columns.id), "missing question id"))?;
    let question = text(sheet, row, columns.question)
        .ok_or_else(|| row_error(row, Some(columns.question), "missing question text"))?;

    let time_frame = sheet
        .cell(row, columns.time_frame)
        .as_integer()
        .map(TimeFrame::from_code)
        .unwrap_or(TimeFrame::Unknown);

    let impact_category = match columns.impact_category {
        Some(column) => {
            let title = text(sheet, row, column).unwrap_or_default();
            Some(
                ImpactCategory::from_title(&title)
                    .ok_or_else(|| row_error(row, Some(column), format!("cannot read impact category '{title}'")))?,
            )
        }
        None => None,
    };

    let record = ResearchRecord {
        id,
        question,
        explanation: text(sheet, row, columns.explanation),
        priorities: Priorities {
            water_safety: priority(sheet, row, columns.water_safety),
            other_functions: priority(sheet, row, columns.other_functions),
            maintenance: priority(sheet, row, columns.maintenance),
            operation: priority(sheet, row, columns.operation),
        },
        time_frame,
        primary_line: research_line(sheet, row, columns.primary_line)?,
        secondary_line: research_line(sheet, row, columns.secondary_line)?,
        references: references(sheet, row, columns.references),
        barriers: barriers(sheet, row, columns.barrier)?,
        impact_category,
        action_holder: text(sheet, row, columns.action_holder),
        cost_estimate: sheet.cell(row, columns.costs).as_number(),
        lead_time: sheet.cell(row, columns.lead_time).as_number(),
    };

    record
        .validate()
        .map_err(|message| row_error(row, Some(columns.primary_line), message))?;
    Ok(record)
}
