use std::path::{Path, PathBuf};

use anyhow::Context;
use encoding_rs::UTF_8;

use crate::config::AppConfig;
use crate::markup::to_plain_text;
use crate::progress::ConsoleProgress;
use crate::segment::{segment, LineRecord};
use crate::source::{read_html, write_html};
use crate::substitute::{substitute_with_report, Substitution};
use crate::table::{ImportEvent, TranslationTable};
use crate::workbook::{read_rows, rows_from_table, table_from_rows, write_rows, WorkbookOptions};

/// A loaded notification template and its line records. Rebuilt whole whenever the HTML
/// changes.
#[derive(Clone, Debug)]
pub struct SourceDocument {
    pub name: String,
    pub html: String,
    /// Label of the encoding the file was decoded from.
    pub encoding: &'static str,
    pub lines: Vec<LineRecord>,
}

impl SourceDocument {
    pub fn from_html(name: impl Into<String>, html: impl Into<String>) -> Self {
        let html = html.into();
        let lines = segment(&html);
        Self {
            name: name.into(),
            html,
            encoding: UTF_8.name(),
            lines,
        }
    }

    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let (html, encoding) = read_html(path)?;
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("template")
            .to_string();
        Ok(Self {
            encoding: encoding.name(),
            ..Self::from_html(name, html)
        })
    }

    pub fn plain_text(&self) -> String {
        to_plain_text(&self.html)
    }

    /// Starting table: every line keyed, translations seeded with its placeholders.
    pub fn seed_table(&self) -> TranslationTable {
        TranslationTable::from_records(&self.lines)
    }

    /// Document lines the table has no row for, in document order.
    pub fn lines_without_row<'a>(&'a self, table: &TranslationTable) -> Vec<&'a str> {
        self.lines
            .iter()
            .map(|l| l.source_text.as_str())
            .filter(|s| table.get(s).is_none())
            .collect()
    }
}

pub struct TemplatePipeline {
    cfg: AppConfig,
    progress: ConsoleProgress,
}

impl TemplatePipeline {
    pub fn new(cfg: AppConfig, progress: ConsoleProgress) -> Self {
        Self { cfg, progress }
    }

    pub fn config(&self) -> &AppConfig {
        &self.cfg
    }

    pub fn export_template(&self, doc: &SourceDocument, path: &Path) -> anyhow::Result<usize> {
        if doc.lines.is_empty() {
            self.progress
                .warn(format!("{}: no text lines to export", doc.name));
        }
        let rows = rows_from_table(&doc.seed_table());
        let opts = WorkbookOptions {
            sheet_name: self.cfg.sheet_name(),
        };
        write_rows(path, &rows, &opts)?;
        self.progress.info(format!(
            "Wrote template: {} ({} lines)",
            path.display(),
            rows.len()
        ));
        Ok(rows.len())
    }

    pub fn import_translations(&self, path: &Path) -> anyhow::Result<TranslationTable> {
        let rows = read_rows(path)?;
        let (table, events) = table_from_rows(rows);
        for ev in &events {
            match ev {
                ImportEvent::Duplicate {
                    source,
                    kept,
                    replaced,
                } => self.progress.warn(format!(
                    "duplicate source line {source:?}: using {kept:?}, dropping {replaced:?}"
                )),
            }
        }
        self.progress.info(format!(
            "Loaded translations: {} ({} entries)",
            path.display(),
            table.len()
        ));
        Ok(table)
    }

    /// Validates the table, then substitutes it into the document's original HTML.
    pub fn translate(&self, doc: &SourceDocument, table: &TranslationTable) -> Substitution {
        for w in table.validate() {
            self.progress.warn(w.to_string());
        }
        if self.cfg.warn_unmatched() {
            let missing = doc.lines_without_row(table);
            if let Some(first) = missing.first() {
                self.progress.warn(format!(
                    "{} line(s) of {} have no row in the translations, first: {first:?}",
                    missing.len(),
                    doc.name
                ));
            }
        }

        let sub = substitute_with_report(&doc.html, table);
        self.progress
            .progress("Replaced", sub.replaced(), table.len());
        if self.cfg.warn_unmatched() {
            for source in sub.unmatched() {
                self.progress
                    .warn(format!("not found in {}: {source:?}", doc.name));
            }
        }
        sub
    }

    pub fn translate_to_file(
        &self,
        doc: &SourceDocument,
        translations: &Path,
        output: &Path,
    ) -> anyhow::Result<Substitution> {
        let table = self.import_translations(translations)?;
        let sub = self.translate(doc, &table);
        write_html(output, &sub.html)?;
        self.progress
            .info(format!("Wrote translated html: {}", output.display()));
        Ok(sub)
    }

    pub fn default_output_for(&self, input: &Path) -> PathBuf {
        crate::source::sibling_path(input, &self.cfg.output_suffix(), "html")
    }
}

/// Numbered listing of the lines, `*` marking those wider than `max_width`.
pub fn render_line_listing(lines: &[LineRecord], max_width: usize) -> String {
    let digits = lines.len().max(1).to_string().len();
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        let mark = if line.display_width() > max_width { '*' } else { ' ' };
        out.push_str(&format!("{:>digits$}{mark} {}", i + 1, line.source_text));
        if !line.placeholder_text.is_empty() {
            out.push_str("  =>  ");
            out.push_str(&line.placeholder_text);
        }
        out.push('\n');
    }
    out
}

pub fn write_lines_json(lines: &[LineRecord], path: &Path) -> anyhow::Result<()> {
    std::fs::write(
        path,
        serde_json::to_vec_pretty(lines).context("serialize line records")?,
    )
    .with_context(|| format!("write lines json: {}", path.display()))?;
    Ok(())
}
