//! Minimal XLSX reader: enough of SpreadsheetML to pull typed cell values out
//! of one named worksheet.

mod records;

pub use records::{ReadOptions, WorkbookLayout, read_records, records_from_sheet};

use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;

use crate::error::Error;

const SML_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// A cell value as stored in the sheet (formulas are read through their cached value).
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Textual rendering of any non-empty cell; integral numbers print without a fraction.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) if s.is_empty() => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some(format!("{}", *n as i64)),
            Cell::Number(n) => Some(n.to_string()),
            Cell::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        }
    }

    /// Only text cells; numbers and booleans yield `None`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    /// Integral numeric cells only.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Cell::Number(n) if n.fract() == 0.0 => Some(*n as i64),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Dense grid of one worksheet; missing cells read as `Cell::Empty`.
#[derive(Clone, Debug, Default)]
pub struct Sheet {
    rows: Vec<Vec<Cell>>,
}

static EMPTY: Cell = Cell::Empty;

impl Sheet {
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, row: usize) -> &[Cell] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.row(row).get(column).unwrap_or(&EMPTY)
    }
}

/// An opened workbook: sheet name → part path, plus the shared string table.
pub struct Workbook<R> {
    zip: zip::ZipArchive<R>,
    sheets: Vec<(String, String)>,
    shared_strings: Vec<String>,
}

pub fn open(path: &Path) -> Result<Workbook<std::fs::File>, Error> {
    let file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
            std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())),
        ),
        _ => Error::Io(e),
    })?;
    Workbook::from_reader(file)
}

fn read_zip_text<R: Read + Seek>(zip: &mut zip::ZipArchive<R>, name: &str) -> Option<String> {
    let mut content = String::new();
    zip.by_name(name).ok()?.read_to_string(&mut content).ok()?;
    Some(content)
}

fn parse_rels_xml(xml_content: &str) -> HashMap<String, String> {
    let mut rels = HashMap::new();
    let Ok(xml) = roxmltree::Document::parse(xml_content) else {
        return rels;
    };
    for node in xml.root_element().children() {
        if node.tag_name().name() == "Relationship"
            && let (Some(id), Some(target)) = (node.attribute("Id"), node.attribute("Target"))
        {
            rels.insert(id.to_string(), target.to_string());
        }
    }
    rels
}

/// Relationship targets are relative to `xl/` unless absolute.
fn part_path(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{target}"),
    }
}

fn parse_shared_strings(xml_content: &str) -> Result<Vec<String>, Error> {
    let xml = roxmltree::Document::parse(xml_content)?;
    let strings = xml
        .root_element()
        .children()
        .filter(|n| n.has_tag_name((SML_NS, "si")))
        .map(|si| {
            // Phonetic runs (rPh) carry reading hints, not cell text.
            si.descendants()
                .filter(|n| n.has_tag_name((SML_NS, "t")))
                .filter(|t| !t.ancestors().any(|a| a.has_tag_name((SML_NS, "rPh"))))
                .filter_map(|t| t.text())
                .collect::<String>()
        })
        .collect();
    Ok(strings)
}

/// "AB12" → (11, 27): zero-based (row, column).
fn parse_cell_reference(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() {
        return None;
    }
    let mut column = 0usize;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        column = column * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1);
    }
    let row: usize = digits.parse().ok()?;
    Some((row.checked_sub(1)?, column - 1))
}

impl<R: Read + Seek> Workbook<R> {
    pub fn from_reader(reader: R) -> Result<Self, Error> {
        let mut zip = zip::ZipArchive::new(reader)
            .map_err(|_| Error::InvalidWorkbook("file is not a ZIP archive".into()))?;

        let workbook_xml = read_zip_text(&mut zip, "xl/workbook.xml")
            .ok_or_else(|| Error::InvalidWorkbook("missing xl/workbook.xml (is this an XLSX file?)".into()))?;
        let rels = read_zip_text(&mut zip, "xl/_rels/workbook.xml.rels")
            .map(|xml| parse_rels_xml(&xml))
            .unwrap_or_default();

        let xml = roxmltree::Document::parse(&workbook_xml)?;
        let sheets = xml
            .descendants()
            .filter(|n| n.has_tag_name((SML_NS, "sheet")))
            .filter_map(|n| {
                let name = n.attribute("name")?;
                let target = rels.get(n.attribute((REL_NS, "id"))?)?;
                Some((name.to_string(), part_path(target)))
            })
            .collect();

        let shared_strings = match read_zip_text(&mut zip, "xl/sharedStrings.xml") {
            Some(xml) => parse_shared_strings(&xml)?,
            None => Vec::new(),
        };

        Ok(Self {
            zip,
            sheets,
            shared_strings,
        })
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|(name, _)| name.as_str())
    }

    pub fn sheet(&mut self, name: &str) -> Result<Sheet, Error> {
        let path = self
            .sheets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p.clone())
            .ok_or_else(|| {
                let known: Vec<&str> = self.sheet_names().collect();
                Error::InvalidWorkbook(format!("no sheet named '{name}' (sheets: {})", known.join(", ")))
            })?;
        let xml_content = read_zip_text(&mut self.zip, &path)
            .ok_or_else(|| Error::InvalidWorkbook(format!("missing worksheet part {path}")))?;
        self.parse_sheet(&xml_content)
    }

    fn parse_sheet(&self, xml_content: &str) -> Result<Sheet, Error> {
        let xml = roxmltree::Document::parse(xml_content)?;
        let Some(sheet_data) = xml.descendants().find(|n| n.has_tag_name((SML_NS, "sheetData"))) else {
            return Ok(Sheet::default());
        };

        let mut rows: Vec<Vec<Cell>> = Vec::new();
        for row_node in sheet_data.children().filter(|n| n.has_tag_name((SML_NS, "row"))) {
            let row_index = row_node
                .attribute("r")
                .and_then(|r| r.parse::<usize>().ok())
                .and_then(|r| r.checked_sub(1))
                .unwrap_or(rows.len());
            if rows.len() <= row_index {
                rows.resize_with(row_index + 1, Vec::new);
            }

            let mut next_column = 0usize;
            for c in row_node.children().filter(|n| n.has_tag_name((SML_NS, "c"))) {
                let column = c
                    .attribute("r")
                    .and_then(parse_cell_reference)
                    .map(|(_, col)| col)
                    .unwrap_or(next_column);
                next_column = column + 1;

                let value = self.cell_value(c);
                let cells = &mut rows[row_index];
                if cells.len() <= column {
                    cells.resize(column + 1, Cell::Empty);
                }
                cells[column] = value;
            }
        }
        Ok(Sheet { rows })
    }

    fn cell_value(&self, c: roxmltree::Node) -> Cell {
        let v = c
            .children()
            .find(|n| n.has_tag_name((SML_NS, "v")))
            .and_then(|n| n.text());
        match c.attribute("t").unwrap_or("n") {
            "s" => v
                .and_then(|i| i.trim().parse::<usize>().ok())
                .and_then(|i| self.shared_strings.get(i))
                .map(|s| Cell::Text(s.clone()))
                .unwrap_or_default(),
            "inlineStr" => {
                let text: String = c
                    .descendants()
                    .filter(|n| n.has_tag_name((SML_NS, "t")))
                    .filter_map(|t| t.text())
                    .collect();
                Cell::Text(text)
            }
            "str" => v.map(|s| Cell::Text(s.to_string())).unwrap_or_default(),
            "b" => v.map(|s| Cell::Bool(s.trim() == "1")).unwrap_or_default(),
            "e" => Cell::Empty,
            _ => v
                .and_then(|s| s.trim().parse::<f64>().ok())
                .map(Cell::Number)
                .unwrap_or_default(),
        }
    }
}
