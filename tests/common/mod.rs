#![allow(dead_code)]

use std::io::{Cursor, Write};

use ssb_agenda::fonts::TextMeasure;
use ssb_agenda::layout::LayoutConfiguration;
use ssb_agenda::model::{Priorities, Priority, ResearchLine, ResearchRecord, TimeFrame};

/// Every character advances half the font size; lines are one font size high.
pub struct FixedAdvance;

impl TextMeasure for FixedAdvance {
    fn measure(&self, text: &str, font_size: f32) -> (f32, f32) {
        (text.chars().count() as f32 * font_size * 0.5, font_size)
    }
}

pub fn config() -> LayoutConfiguration {
    LayoutConfiguration::default()
}

pub fn record(id: &str, time_frame: TimeFrame, line: Option<u8>) -> ResearchRecord {
    ResearchRecord::new(
        id,
        format!("What do we need to know about item {id}?"),
        time_frame,
        line.and_then(ResearchLine::from_number),
    )
}

pub fn priorities(axes: [Priority; 4]) -> Priorities {
    Priorities {
        water_safety: axes[0],
        other_functions: axes[1],
        maintenance: axes[2],
        operation: axes[3],
    }
}

pub fn high_priority(mut record: ResearchRecord) -> ResearchRecord {
    record.priorities.water_safety = Priority::High;
    record
}

/// Cell contents for generated workbooks.
#[derive(Clone, Debug)]
pub enum Value {
    Text(&'static str),
    Number(f64),
}

fn column_name(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap()
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Build an XLSX file in memory with one sheet called `sheet`. `rows[i]` is
/// written to sheet row `i + 1`; `None` cells are left out.
pub fn workbook(sheet: &str, rows: &[Vec<Option<Value>>]) -> Vec<u8> {
    let mut shared: Vec<&str> = Vec::new();
    let mut sheet_data = String::new();
    for (r, row) in rows.iter().enumerate() {
        sheet_data.push_str(&format!("<row r=\"{}\">", r + 1));
        for (c, value) in row.iter().enumerate() {
            let reference = format!("{}{}", column_name(c), r + 1);
            match value {
                None => {}
                Some(Value::Text(s)) => {
                    let index = shared.iter().position(|x| x == s).unwrap_or_else(|| {
                        shared.push(*s);
                        shared.len() - 1
                    });
                    sheet_data.push_str(&format!("<c r=\"{reference}\" t=\"s\"><v>{index}</v></c>"));
                }
                Some(Value::Number(n)) => {
                    sheet_data.push_str(&format!("<c r=\"{reference}\"><v>{n}</v></c>"));
                }
            }
        }
        sheet_data.push_str("</row>");
    }

    let shared_xml: String = shared
        .iter()
        .map(|s| format!("<si><t>{}</t></si>", escape(s)))
        .collect();

    let files = [
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#.to_string(),
        ),
        (
            "xl/workbook.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Readme" sheetId="1" r:id="rId2"/><sheet name="{}" sheetId="2" r:id="rId1"/></sheets></workbook>"#,
                escape(sheet)
            ),
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/sheet2.xml"/></Relationships>"#.to_string(),
        ),
        (
            "xl/sharedStrings.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">{shared_xml}</sst>"#
            ),
        ),
        (
            "xl/worksheets/sheet1.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{sheet_data}</sheetData></worksheet>"#
            ),
        ),
        (
            "xl/worksheets/sheet2.xml",
            r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData/></worksheet>"#.to_string(),
        ),
    ];

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in files {
        zip.start_file(name, zip::write::SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// One knowledge agenda row (columns A..S).
pub fn agenda_row(
    barrier: &'static str,
    id: &'static str,
    references: Option<&'static str>,
    question: &'static str,
    priorities: [f64; 4],
    time_frame: f64,
    primary: Option<&'static str>,
) -> Vec<Option<Value>> {
    let mut row: Vec<Option<Value>> = vec![None; 19];
    row[0] = Some(Value::Text(barrier));
    row[1] = Some(Value::Text(id));
    row[2] = references.map(Value::Text);
    row[5] = Some(Value::Text(question));
    for (i, p) in priorities.iter().enumerate() {
        row[7 + i] = Some(Value::Number(*p));
    }
    row[11] = Some(Value::Number(time_frame));
    row[12] = primary.map(Value::Text);
    row
}

fn annotations(doc: &lopdf::Document, page_id: lopdf::ObjectId) -> Vec<lopdf::Dictionary> {
    let page = doc.get_dictionary(page_id).expect("page dictionary");
    let annots = match page.get(b"Annots") {
        Ok(lopdf::Object::Reference(id)) => doc.get_object(*id).and_then(lopdf::Object::as_array).cloned().unwrap_or_default(),
        Ok(lopdf::Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    };
    annots
        .iter()
        .filter_map(|a| match a {
            lopdf::Object::Reference(id) => doc.get_dictionary(*id).ok().cloned(),
            lopdf::Object::Dictionary(d) => Some(d.clone()),
            _ => None,
        })
        .collect()
}

/// Go-to link annotations (those with a /Dest) on every page, in page order.
pub fn goto_links(pdf: &[u8]) -> Vec<Vec<lopdf::Dictionary>> {
    let doc = lopdf::Document::load_mem(pdf).expect("load pdf");
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            annotations(&doc, page_id)
                .into_iter()
                .filter(|a| a.has(b"Dest"))
                .collect()
        })
        .collect()
}

/// Number of URI link annotations (those with an /A action) in the whole document.
pub fn uri_link_count(pdf: &[u8]) -> usize {
    let doc = lopdf::Document::load_mem(pdf).expect("load pdf");
    doc.get_pages()
        .into_values()
        .map(|page_id| annotations(&doc, page_id).iter().filter(|a| a.has(b"A")).count())
        .sum()
}

pub fn page_count(pdf: &[u8]) -> usize {
    lopdf::Document::load_mem(pdf).expect("load pdf").get_pages().len()
}
