use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::workbook::DEFAULT_SHEET_NAME;

pub const CONFIG_FILENAME: &str = "ilx-translator.toml";
pub const CONFIG_ENV: &str = "ILX_TRANSLATOR_CONFIG";

pub const DEFAULT_OUTPUT_SUFFIX: &str = "_translated";
pub const DEFAULT_MAX_LINE_WIDTH: usize = 500;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub workbook: WorkbookSection,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub display: DisplaySection,
    #[serde(default)]
    pub pipeline: PipelineSection,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct WorkbookSection {
    /// Worksheet name used when exporting `.xlsx` templates.
    #[serde(default)]
    pub sheet_name: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct OutputSection {
    /// Appended to the input stem for the translated HTML (`welcome_translated.html`).
    #[serde(default)]
    pub suffix: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct DisplaySection {
    /// Lines wider than this (in characters) are flagged by `--list-lines`.
    #[serde(default)]
    pub max_line_width: Option<usize>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct PipelineSection {
    /// Log source lines that were not found in the HTML during substitution.
    #[serde(default)]
    pub warn_unmatched: Option<bool>,
}

impl AppConfig {
    pub fn sheet_name(&self) -> String {
        self.workbook
            .sheet_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SHEET_NAME)
            .to_string()
    }

    pub fn output_suffix(&self) -> String {
        self.output
            .suffix
            .clone()
            .unwrap_or_else(|| DEFAULT_OUTPUT_SUFFIX.to_string())
    }

    pub fn max_line_width(&self) -> usize {
        self.display
            .max_line_width
            .filter(|w| *w > 0)
            .unwrap_or(DEFAULT_MAX_LINE_WIDTH)
    }

    pub fn warn_unmatched(&self) -> bool {
        self.pipeline.warn_unmatched.unwrap_or(true)
    }
}

pub const DEFAULT_CONFIG_TOML: &str = r#"# ilx-translator configuration

[workbook]
# Worksheet name of exported .xlsx templates.
sheet_name = "Sheet1"

[output]
# Translated HTML is written as <stem><suffix>.html unless -o is given.
suffix = "_translated"

[display]
# --list-lines flags source lines wider than this many characters.
max_line_width = 500

[pipeline]
# Report table entries whose source text was not found in the HTML.
warn_unmatched = true
"#;

pub fn find_file_upwards(start_dir: &Path, filename: &str, max_levels: usize) -> Option<PathBuf> {
    let mut dir = start_dir;
    for _ in 0..=max_levels {
        let candidate = dir.join(filename);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
    None
}

pub fn find_default_config(workdir: &Path, filename: &str) -> Option<PathBuf> {
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(p) = find_file_upwards(&cwd, filename, 8) {
            return Some(p);
        }
    }
    if let Some(p) = find_file_upwards(workdir, filename, 8) {
        return Some(p);
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            if let Some(p) = find_file_upwards(dir, filename, 10) {
                return Some(p);
            }
        }
    }
    None
}

pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    parse_config(&text)
}

pub fn parse_config(text: &str) -> anyhow::Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(text).context("parse config toml")?;
    Ok(cfg)
}

/// Explicit path, then `ILX_TRANSLATOR_CONFIG`, then an upward search. A missing file means
/// defaults.
pub fn resolve_config(explicit: Option<PathBuf>, workdir: &Path) -> anyhow::Result<AppConfig> {
    let path = explicit
        .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from))
        .or_else(|| find_default_config(workdir, CONFIG_FILENAME));
    match path {
        Some(p) if p.exists() => load_config(&p),
        _ => Ok(AppConfig::default()),
    }
}

pub fn init_default_config(dir: &Path, force: bool) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create config dir: {}", dir.display()))?;
    let cfg_path = dir.join(CONFIG_FILENAME);
    if cfg_path.exists() && !force {
        return Ok(cfg_path);
    }
    std::fs::write(&cfg_path, DEFAULT_CONFIG_TOML)
        .with_context(|| format!("write config: {}", cfg_path.display()))?;
    Ok(cfg_path)
}

#[cfg(test)]
mod tests {
    use super::{init_default_config, load_config, parse_config, AppConfig, DEFAULT_CONFIG_TOML};

    #[test]
    fn defaults_without_file() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.sheet_name(), "Sheet1");
        assert_eq!(cfg.output_suffix(), "_translated");
        assert_eq!(cfg.max_line_width(), 500);
        assert!(cfg.warn_unmatched());
    }

    #[test]
    fn shipped_defaults_parse() {
        let cfg = parse_config(DEFAULT_CONFIG_TOML).expect("default toml");
        assert_eq!(cfg.workbook.sheet_name.as_deref(), Some("Sheet1"));
        assert_eq!(cfg.display.max_line_width, Some(500));
    }

    #[test]
    fn partial_sections_fall_back() {
        let cfg = parse_config("[display]\nmax_line_width = 0\n[output]\nsuffix = \"_fr\"\n")
            .expect("toml");
        assert_eq!(cfg.max_line_width(), 500);
        assert_eq!(cfg.output_suffix(), "_fr");
        assert_eq!(cfg.sheet_name(), "Sheet1");
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(parse_config("[display]\nmax_line_width = \"wide\"\n").is_err());
    }

    #[test]
    fn init_writes_once_unless_forced() {
        let tmp = tempfile::tempdir().expect("tmp dir");
        let dir = tmp.path().join("nested");
        let path = init_default_config(&dir, false).expect("init");
        std::fs::write(&path, "[output]\nsuffix = \"_de\"\n").expect("edit");
        init_default_config(&dir, false).expect("init again");
        assert_eq!(load_config(&path).expect("load").output_suffix(), "_de");
        init_default_config(&dir, true).expect("force");
        assert_eq!(load_config(&path).expect("load").output_suffix(), "_translated");
    }
}
