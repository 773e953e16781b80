use std::path::Path;

use anyhow::Context;

use super::Row;

pub fn write(path: &Path, rows: &[Row]) -> anyhow::Result<()> {
    let mut w = csv::Writer::from_path(path)
        .with_context(|| format!("create csv: {}", path.display()))?;
    if rows.is_empty() {
        w.write_record([super::ENGLISH, super::TRANSLATION])
            .context("write csv header")?;
    }
    for r in rows {
        w.serialize(r).context("write csv row")?;
    }
    w.flush().context("flush csv")?;
    Ok(())
}

pub fn read_grid(path: &Path) -> anyhow::Result<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("open csv: {}", path.display()))?;
    let mut grid = Vec::new();
    for rec in rdr.records() {
        let rec = rec.context("read csv record")?;
        grid.push(rec.iter().map(|c| c.trim_start_matches('\u{feff}').to_string()).collect());
    }
    Ok(grid)
}
