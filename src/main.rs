use std::path::PathBuf;

use anyhow::Context;
use clap::{CommandFactory, Parser};

use ilx_translator::config::{init_default_config, resolve_config};
use ilx_translator::pipeline::{render_line_listing, write_lines_json, SourceDocument, TemplatePipeline};
use ilx_translator::progress::ConsoleProgress;
use ilx_translator::source::sibling_path;

#[derive(Parser, Debug)]
#[command(name = "ilx-translator")]
#[command(about = "Translate HTML notification templates while keeping {#...} fields intact", long_about = None)]
struct Args {
    /// Generate a default config file, then exit
    #[arg(long)]
    init_config: bool,

    /// Directory to write the config file (default: current directory)
    #[arg(long, value_name = "DIR")]
    init_config_dir: Option<PathBuf>,

    /// Overwrite an existing config file when used with --init-config
    #[arg(long)]
    force: bool,

    /// Source-language HTML template
    #[arg(value_name = "HTML")]
    input: Option<PathBuf>,

    /// Translated HTML (default: <input_stem><suffix>.html)
    #[arg(short, long, value_name = "HTML")]
    output: Option<PathBuf>,

    /// Config file path (default: search for ilx-translator.toml upwards)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the segmented source lines and their placeholders
    #[arg(long)]
    list_lines: bool,

    /// Write the segmented line records as JSON
    #[arg(long, value_name = "JSON")]
    extract_lines_json: Option<PathBuf>,

    /// Write the stripped display text
    #[arg(long, value_name = "TXT")]
    plain_text: Option<PathBuf>,

    /// Write the English/Translation template (default: <input_stem>.xlsx)
    #[arg(long, value_name = "XLSX|CSV")]
    export_template: Option<Option<PathBuf>>,

    /// Filled English/Translation workbook to apply to the HTML
    #[arg(long, value_name = "XLSX|XLS|CSV")]
    translations: Option<PathBuf>,

    /// Suppress status output on stderr
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let progress = ConsoleProgress::new(!args.quiet);

    if args.init_config {
        let dir = args
            .init_config_dir
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        let cfg_path = init_default_config(&dir, args.force).context("init default config")?;
        progress.info(format!("Wrote config: {}", cfg_path.display()));
        return Ok(());
    }

    let input = match args.input {
        Some(p) => p,
        None => {
            let mut cmd = Args::command();
            cmd.print_help().context("print help")?;
            eprintln!(
                "\n\nUSAGE:\n  ilx-translator <template.html> --export-template\n  ilx-translator <template.html> --translations <filled.xlsx> [-o out.html]\n"
            );
            return Ok(());
        }
    };

    let workdir = input
        .parent()
        .map(|p| p.to_path_buf())
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from("."));
    let cfg = resolve_config(args.config.clone(), &workdir).context("load config")?;
    let doc = SourceDocument::open(&input)?;
    progress.info(format!(
        "Loaded {} ({}, {} lines)",
        doc.name,
        doc.encoding,
        doc.lines.len()
    ));

    let mut did_something = false;

    if args.list_lines {
        print!("{}", render_line_listing(&doc.lines, cfg.max_line_width()));
        did_something = true;
    }
    if let Some(path) = args.extract_lines_json.as_ref() {
        write_lines_json(&doc.lines, path)?;
        did_something = true;
    }
    if let Some(path) = args.plain_text.as_ref() {
        std::fs::write(path, doc.plain_text())
            .with_context(|| format!("write plain text: {}", path.display()))?;
        did_something = true;
    }

    let pipeline = TemplatePipeline::new(cfg, progress);

    if let Some(path) = args.export_template.as_ref() {
        let path = path
            .clone()
            .unwrap_or_else(|| sibling_path(&input, "", "xlsx"));
        pipeline.export_template(&doc, &path)?;
        did_something = true;
    }

    if let Some(translations) = args.translations.as_ref() {
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| pipeline.default_output_for(&input));
        pipeline.translate_to_file(&doc, translations, &output)?;
        did_something = true;
    } else if args.output.is_some() {
        return Err(anyhow::anyhow!("-o/--output requires --translations"));
    }

    if !did_something {
        print!("{}", render_line_listing(&doc.lines, pipeline.config().max_line_width()));
    }
    Ok(())
}
