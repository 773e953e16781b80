use std::path::Path;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::table::{ImportEvent, TranslationTable};

mod delimited;
mod xlsx;

pub const ENGLISH: &str = "English";
pub const TRANSLATION: &str = "Translation";

pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// One row of the translation template.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    #[serde(rename = "English")]
    pub english: String,
    #[serde(rename = "Translation")]
    pub translation: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkbookFormat {
    Xlsx,
    /// Legacy Excel. Import only.
    Xls,
    Csv,
}

impl WorkbookFormat {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" => Ok(Self::Xlsx),
            "xls" => Ok(Self::Xls),
            "csv" => Ok(Self::Csv),
            _ => Err(anyhow!(
                "unsupported translation file (expected .xlsx, .xls or .csv): {}",
                path.display()
            )),
        }
    }
}

#[derive(Clone, Debug)]
pub struct WorkbookOptions {
    pub sheet_name: String,
}

impl Default for WorkbookOptions {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }
}

pub fn rows_from_table(table: &TranslationTable) -> Vec<Row> {
    table
        .entries()
        .map(|e| Row {
            english: e.source_text,
            translation: e.translation_text,
        })
        .collect()
}

pub fn table_from_rows(rows: Vec<Row>) -> (TranslationTable, Vec<ImportEvent>) {
    TranslationTable::from_external(rows.into_iter().map(|r| (r.english, r.translation)))
}

pub fn write_rows(path: &Path, rows: &[Row], opts: &WorkbookOptions) -> anyhow::Result<()> {
    match WorkbookFormat::from_path(path)? {
        WorkbookFormat::Xlsx => xlsx::write(path, rows, &opts.sheet_name),
        WorkbookFormat::Xls => Err(anyhow!(".xls is read-only; export to .xlsx or .csv")),
        WorkbookFormat::Csv => delimited::write(path, rows),
    }
    .with_context(|| format!("write translation template: {}", path.display()))
}

pub fn read_rows(path: &Path) -> anyhow::Result<Vec<Row>> {
    let grid = match WorkbookFormat::from_path(path)? {
        WorkbookFormat::Xlsx | WorkbookFormat::Xls => xlsx::read_grid(path)?,
        WorkbookFormat::Csv => delimited::read_grid(path)?,
    };
    rows_from_grid(grid).with_context(|| format!("read translations: {}", path.display()))
}

/// Maps a cell grid to rows through its header line. Short rows read as empty cells and
/// fully blank rows are skipped.
pub(crate) fn rows_from_grid(grid: Vec<Vec<String>>) -> anyhow::Result<Vec<Row>> {
    let mut lines = grid
        .into_iter()
        .filter(|cells| cells.iter().any(|c| !c.trim().is_empty()));
    let header = lines
        .next()
        .ok_or_else(|| anyhow!("empty sheet (expected a header row)"))?;
    let column = |name: &str| {
        header
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| anyhow!("missing column {name:?} in header row"))
    };
    let english_col = column(ENGLISH)?;
    let translation_col = column(TRANSLATION)?;

    let cell = |cells: &[String], idx: usize| cells.get(idx).cloned().unwrap_or_default();
    Ok(lines
        .map(|cells| Row {
            english: cell(&cells, english_col),
            translation: cell(&cells, translation_col),
        })
        .collect())
}

/// Character width of the widest cell per column, header included.
pub(crate) fn column_widths(rows: &[Row]) -> [usize; 2] {
    let mut widths = [ENGLISH.chars().count(), TRANSLATION.chars().count()];
    for r in rows {
        widths[0] = widths[0].max(r.english.chars().count());
        widths[1] = widths[1].max(r.translation.chars().count());
    }
    widths
}
