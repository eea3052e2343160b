mod common;

use std::io::Cursor;

use common::{Value, agenda_row, workbook};
use ssb_agenda::Error;
use ssb_agenda::model::{ImpactCategory, Priority, ResearchLine, StormSurgeBarrier, TimeFrame};
use ssb_agenda::xlsx::{self, Cell, ReadOptions, Sheet, Workbook, WorkbookLayout, records_from_sheet};

fn header_rows() -> Vec<Vec<Option<Value>>> {
    vec![
        vec![Some(Value::Text("Kennisagenda stormvloedkeringen"))],
        vec![Some(Value::Text("Kering")), Some(Value::Text("ID"))],
    ]
}

fn database(rows: Vec<Vec<Option<Value>>>) -> Sheet {
    let mut all = header_rows();
    all.extend(rows);
    let bytes = workbook("Database", &all);
    let mut book = Workbook::from_reader(Cursor::new(bytes)).expect("open workbook");
    book.sheet("Database").expect("sheet")
}

#[test]
fn lists_sheets_and_reads_shared_strings() {
    let bytes = workbook(
        "Database",
        &[vec![Some(Value::Text("a & b")), Some(Value::Number(2.5)), None, Some(Value::Text("a & b"))]],
    );
    let mut book = Workbook::from_reader(Cursor::new(bytes)).expect("open workbook");
    assert_eq!(book.sheet_names().collect::<Vec<_>>(), vec!["Readme", "Database"]);

    let sheet = book.sheet("Database").expect("sheet");
    assert_eq!(sheet.cell(0, 0), &Cell::Text("a & b".into()));
    assert_eq!(sheet.cell(0, 1), &Cell::Number(2.5));
    assert_eq!(sheet.cell(0, 2), &Cell::Empty);
    assert_eq!(sheet.cell(0, 3).as_str(), Some("a & b"));
    assert_eq!(sheet.cell(40, 40), &Cell::Empty);

    let readme = book.sheet("Readme").expect("absolute part path");
    assert_eq!(readme.row_count(), 0);
}

#[test]
fn missing_sheet_names_the_known_ones() {
    let bytes = workbook("Database", &[]);
    let mut book = Workbook::from_reader(Cursor::new(bytes)).expect("open workbook");
    match book.sheet("Data") {
        Err(Error::InvalidWorkbook(msg)) => {
            assert!(msg.contains("'Data'"));
            assert!(msg.contains("Readme, Database"));
        }
        other => panic!("expected invalid workbook, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn non_zip_input_is_rejected() {
    let result = Workbook::from_reader(Cursor::new(b"not a workbook".to_vec()));
    assert!(matches!(result, Err(Error::InvalidWorkbook(_))));
}

#[test]
fn missing_file_reports_the_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("absent.xlsx");
    match xlsx::open(&path) {
        Err(Error::Io(e)) => assert!(e.to_string().contains("absent.xlsx")),
        Err(other) => panic!("expected io error, got {other}"),
        Ok(_) => panic!("expected an error"),
    }
}

#[test]
fn cell_conversions() {
    assert_eq!(Cell::Number(3.0).as_text().as_deref(), Some("3"));
    assert_eq!(Cell::Number(1.5).as_text().as_deref(), Some("1.5"));
    assert_eq!(Cell::Number(3.0).as_integer(), Some(3));
    assert_eq!(Cell::Number(3.5).as_integer(), None);
    assert_eq!(Cell::Text("3".into()).as_integer(), None);
    assert_eq!(Cell::Number(3.0).as_str(), None);
    assert!(Cell::Text(String::new()).is_empty());
    assert_eq!(Cell::Bool(true).as_text().as_deref(), Some("TRUE"));
}

#[test]
fn knowledge_agenda_rows_map_to_records() {
    let mut row = agenda_row(
        "RP, HK",
        "RP-01",
        Some("RP-02; 6SVK-03 ,"),
        "Hoe lang gaat de bodembescherming mee?",
        [3.0, 1.0, 2.0, 0.0],
        2.0,
        Some("3. Voorzieningen en gebouwen"),
    );
    row[6] = Some(Value::Text("Toelichting"));
    row[13] = Some(Value::Number(7.0));
    row[16] = Some(Value::Text("Asset management"));
    row[17] = Some(Value::Number(125000.0));
    row[18] = Some(Value::Number(1.5));

    let set = records_from_sheet(&database(vec![row]), &ReadOptions::default());
    assert!(set.errors.is_empty(), "{:?}", set.errors);
    assert_eq!(set.records.len(), 1);

    let r = &set.records[0];
    assert_eq!(r.id, "RP-01");
    assert_eq!(r.question, "Hoe lang gaat de bodembescherming mee?");
    assert_eq!(r.explanation.as_deref(), Some("Toelichting"));
    assert_eq!(r.priorities.water_safety, Priority::High);
    assert_eq!(r.priorities.other_functions, Priority::Low);
    assert_eq!(r.priorities.maintenance, Priority::Medium);
    assert_eq!(r.priorities.operation, Priority::Unknown);
    assert_eq!(r.time_frame, TimeFrame::NearFuture);
    assert_eq!(r.primary_line, Some(ResearchLine::Facilities));
    assert_eq!(r.secondary_line, ResearchLine::from_number(7));
    assert_eq!(r.references, vec!["RP-02", "6SVK-03"]);
    assert_eq!(r.barriers, vec![StormSurgeBarrier::Ramspol, StormSurgeBarrier::HartelBarrier]);
    assert_eq!(r.impact_category, None);
    assert_eq!(r.action_holder.as_deref(), Some("Asset management"));
    assert_eq!(r.cost_estimate, Some(125000.0));
    assert_eq!(r.lead_time, Some(1.5));
}

#[test]
fn bad_rows_are_skipped_with_their_cell() {
    let rows = vec![
        agenda_row("6SVK", "OK-1", None, "Vraag", [1.0; 4], 1.0, Some("2")),
        // No id (row 4, column B).
        {
            let mut r = agenda_row("6SVK", "x", None, "Vraag", [1.0; 4], 1.0, Some("1"));
            r[1] = None;
            r
        },
        // Unknown barrier (row 5, column A).
        agenda_row("XYZ", "BAD-2", None, "Vraag", [1.0; 4], 1.0, Some("1")),
        // Plotted time frame without research line (row 6, column M).
        agenda_row("6SVK", "BAD-3", None, "Vraag", [1.0; 4], 1.0, None),
        // Research line out of range (row 7, column M).
        agenda_row("6SVK", "BAD-4", None, "Vraag", [1.0; 4], 1.0, Some("12. Onbekend")),
        // Blank row: ignored without error.
        vec![None; 19],
        agenda_row("6SVK", "OK-2", None, "Vraag", [1.0; 4], 0.0, None),
    ];
    let set = records_from_sheet(&database(rows), &ReadOptions::default());

    let ids: Vec<&str> = set.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["OK-1", "OK-2"]);
    assert_eq!(set.records[1].time_frame, TimeFrame::NotRelevant);

    let cells: Vec<String> = set.errors.iter().map(|e| e.cell_reference()).collect();
    assert_eq!(cells, vec!["B4", "A5", "M6", "M7"]);
    assert!(set.errors[1].message.contains("XYZ"));
}

#[test]
fn non_integer_codes_read_as_unknown() {
    let mut row = agenda_row("6SVK", "Q1", None, "Vraag", [1.0; 4], 1.0, Some("1"));
    row[7] = Some(Value::Text("hoog"));
    row[11] = Some(Value::Number(1.5));
    let set = records_from_sheet(&database(vec![row]), &ReadOptions::default());
    assert!(set.errors.is_empty(), "{:?}", set.errors);
    assert_eq!(set.records[0].priorities.water_safety, Priority::Unknown);
    assert_eq!(set.records[0].time_frame, TimeFrame::Unknown);
}

#[test]
fn first_row_controls_where_records_start() {
    let rows = vec![agenda_row("6SVK", "Q1", None, "Vraag", [1.0; 4], 1.0, Some("1"))];
    let sheet = database(rows);

    let from_header = ReadOptions {
        first_row: 2,
        ..ReadOptions::default()
    };
    let set = records_from_sheet(&sheet, &from_header);
    // The header row has no question text.
    assert_eq!(set.records.len(), 1);
    assert_eq!(set.errors.len(), 1);
    assert_eq!(set.errors[0].row, 1);

    let past_end = ReadOptions {
        first_row: 10,
        ..ReadOptions::default()
    };
    assert_eq!(records_from_sheet(&sheet, &past_end).records.len(), 0);
}

#[test]
fn impact_pathway_layout_reads_category() {
    let mut row: Vec<Option<Value>> = vec![None; 23];
    row[0] = Some(Value::Text("6SVK"));
    row[1] = Some(Value::Text("IP-1"));
    row[5] = Some(Value::Text("Which maintenance strategy?"));
    row[7] = Some(Value::Text("Explanation"));
    for column in 8..12 {
        row[column] = Some(Value::Number(2.0));
    }
    row[12] = Some(Value::Number(3.0));
    row[13] = Some(Value::Text("8. Onderhoud"));
    row[16] = Some(Value::Text("Human capital for a safe and liveable delta"));
    row[20] = Some(Value::Text("Kenniscentrum"));

    let mut bad = row.clone();
    bad[1] = Some(Value::Text("IP-2"));
    bad[16] = Some(Value::Text("Other"));

    let options = ReadOptions {
        layout: WorkbookLayout::ImpactPathway,
        ..ReadOptions::default()
    };
    let set = records_from_sheet(&database(vec![row, bad]), &options);

    assert_eq!(set.records.len(), 1);
    let r = &set.records[0];
    assert_eq!(r.impact_category, Some(ImpactCategory::HumanCapital));
    assert_eq!(r.explanation.as_deref(), Some("Explanation"));
    assert_eq!(r.time_frame, TimeFrame::Future);
    assert_eq!(r.primary_line, ResearchLine::from_number(8));
    assert_eq!(r.priorities.operation, Priority::Medium);
    assert_eq!(r.action_holder.as_deref(), Some("Kenniscentrum"));
    assert_eq!(set.errors.len(), 1);
    assert_eq!(set.errors[0].cell_reference(), "Q4");
}

#[test]
fn read_records_from_a_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("agenda.xlsx");
    let mut rows = header_rows();
    rows.push(agenda_row("MLK", "MLK-1", None, "Vraag", [2.0; 4], 1.0, Some("4")));
    std::fs::write(&path, workbook("Database", &rows)).expect("write workbook");

    let set = xlsx::read_records(&path, &ReadOptions::default()).expect("read");
    assert_eq!(set.records.len(), 1);
    assert_eq!(set.records[0].barriers, vec![StormSurgeBarrier::MaeslantBarrier]);
}
