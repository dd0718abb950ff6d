use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::pipeline::RunReport;
use crate::report::{COLUMNS, CellValue, Report, ReportRow};

pub const SHEET_PREDICTIONS: &str = "Predictions";
pub const SHEET_TOP_SPREAD: &str = "TopSpreadEdges";
pub const SHEET_TOP_TOTAL: &str = "TopTotalEdges";

pub fn export_xlsx(path: &Path, report: &Report) -> Result<()> {
    let header = Format::new().set_bold();
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_PREDICTIONS)?;
        write_rows(sheet, &header, report.rows_by_margin())?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_TOP_SPREAD)?;
        write_rows(sheet, &header, &report.top_margin)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_TOP_TOTAL)?;
        write_rows(sheet, &header, &report.top_total)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(())
}

pub fn export_json(path: &Path, run: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(run).context("serialize run report")?;
    fs::write(path, json).with_context(|| format!("failed writing {}", path.display()))?;
    Ok(())
}

fn write_rows<'a>(
    worksheet: &mut Worksheet,
    header: &Format,
    rows: impl IntoIterator<Item = &'a ReportRow>,
) -> Result<()> {
    for (col_idx, name) in COLUMNS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col_idx as u16, *name, header)
            .with_context(|| format!("write header {name}"))?;
    }
    for (idx, row) in rows.into_iter().enumerate() {
        let row_idx = idx as u32 + 1;
        for (col_idx, cell) in row.cells().into_iter().enumerate() {
            let col = col_idx as u16;
            match cell {
                CellValue::Text(s) => worksheet.write_string(row_idx, col, &s),
                CellValue::Number(n) => worksheet.write_number(row_idx, col, n),
                CellValue::Empty => continue,
            }
            .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
