use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Context};
use calamine::{open_workbook_auto, Data, Reader};
use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{column_widths, Row, ENGLISH, TRANSLATION};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/></cellXfs></styleSheet>"#;

const SHEET_PATH: &str = "xl/worksheets/sheet1.xml";

pub fn write(path: &Path, rows: &[Row], sheet_name: &str) -> anyhow::Result<()> {
    let f = File::create(path).with_context(|| format!("create xlsx: {}", path.display()))?;
    let mut zout = ZipWriter::new(f);
    let opts = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, String); 6] = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", ROOT_RELS.to_string()),
        ("xl/workbook.xml", workbook_xml(sheet_name)),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
        ("xl/styles.xml", STYLES.to_string()),
        (SHEET_PATH, sheet_xml(rows)),
    ];
    for (name, body) in parts {
        zout.start_file(name, opts)
            .with_context(|| format!("start zip file: {name}"))?;
        zout.write_all(body.as_bytes())
            .with_context(|| format!("write zip file: {name}"))?;
    }
    zout.finish().context("finish zip")?;
    Ok(())
}

fn workbook_xml(sheet_name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        escape(sheet_name_safe(sheet_name).as_str())
    )
}

// Excel rejects names over 31 chars or containing []:*?/\
fn sheet_name_safe(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(31)
        .collect();
    if cleaned.trim().is_empty() {
        super::DEFAULT_SHEET_NAME.to_string()
    } else {
        cleaned
    }
}

fn sheet_xml(rows: &[Row]) -> String {
    let mut out = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );

    // Same autofit as the legacy template: (longest cell + 2) * 1.2.
    out.push_str("<cols>");
    for (i, w) in column_widths(rows).iter().enumerate() {
        let width = (*w as f64 + 2.0) * 1.2;
        out.push_str(&format!(
            r#"<col min="{n}" max="{n}" width="{width:.2}" customWidth="1"/>"#,
            n = i + 1
        ));
    }
    out.push_str("</cols><sheetData>");

    push_row(&mut out, 1, [ENGLISH, TRANSLATION], true);
    for (i, r) in rows.iter().enumerate() {
        push_row(&mut out, i + 2, [r.english.as_str(), r.translation.as_str()], false);
    }
    out.push_str("</sheetData></worksheet>");
    out
}

fn push_row(out: &mut String, row_num: usize, cells: [&str; 2], header: bool) {
    out.push_str(&format!(r#"<row r="{row_num}">"#));
    for (col, text) in ["A", "B"].iter().zip(cells) {
        let style = if header { r#" s="1""# } else { "" };
        out.push_str(&format!(
            r#"<c r="{col}{row_num}"{style} t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
            escape(xml_safe(text).as_str())
        ));
    }
    out.push_str("</row>");
}

// XML 1.0 forbids most C0 controls even when escaped.
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|&c| c == '\t' || c == '\n' || c == '\r' || c >= ' ')
        .collect()
}

/// Cells of the first worksheet as text. Any format calamine opens is accepted, so legacy
/// `.xls` workbooks read the same way.
pub fn read_grid(path: &Path) -> anyhow::Result<Vec<Vec<String>>> {
    let mut workbook =
        open_workbook_auto(path).with_context(|| format!("open workbook: {}", path.display()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("workbook has no sheets: {}", path.display()))?
        .context("read first sheet")?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        // Whole numbers typed into the sheet come back as floats.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        _ => cell.to_string(),
    }
}
