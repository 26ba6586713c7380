//! 输出格式化模块
//!
//! 负责板级分析报告的文本（表格）与JSON输出。

use super::cli::OutputFormat;
use super::processor::{GroupOutcome, PlateReport};
use super::utils;
use crate::error::{SpotError, SpotResult};
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL};
use std::path::Path;

/// 应用程序版本信息
const VERSION: &str = env!("CARGO_PKG_VERSION");

const SEPARATOR: &str =
    "--------------------------------------------------------------------------------\n";

/// 强度值格式化（保留两位小数）
#[inline]
fn format_intensity(value: f64) -> String {
    format!("{value:.2}")
}

/// 创建报告头部信息
pub fn create_output_header(report: &PlateReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "MCR Spot Tool v{VERSION} / Replicate Validation Report\n"
    ));
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    output.push_str(&format!("log date: {now}\n\n"));

    output.push_str(SEPARATOR);
    output.push_str(&format!("Plate: {}\n", report.name));
    output.push_str(&format!(
        "Source: {}\n",
        utils::extract_filename(&report.source)
    ));
    output.push_str(&format!(
        "Intensity: {} / Validation: {} (cutoff = {})\n",
        report.intensity_method, report.validation_method, report.cutoff
    ));
    output.push_str(SEPARATOR);
    output.push('\n');

    output
}

/// 构建每个重复样一行的结果表
pub fn build_results_table(report: &PlateReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(vec![
            Cell::new("Analyte"),
            Cell::new("#"),
            Cell::new("Intensity"),
            Cell::new("Valid"),
            Cell::new("Seed"),
        ]);

    for group in &report.groups {
        match &group.outcome {
            GroupOutcome::Validated(summary) => {
                for (index, (&intensity, &valid)) in
                    summary.intensities.iter().zip(&summary.flags).enumerate()
                {
                    table.add_row(vec![
                        Cell::new(&group.analyte),
                        Cell::new(index + 1).set_alignment(CellAlignment::Right),
                        Cell::new(format_intensity(intensity)).set_alignment(CellAlignment::Right),
                        Cell::new(if valid { "yes" } else { "NO" }),
                        Cell::new(if summary.seed.contains(&index) { "*" } else { "" }),
                    ]);
                }
            }
            GroupOutcome::Failed { category, .. } => {
                table.add_row(vec![
                    Cell::new(&group.analyte),
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new(format!("FAILED ({})", category.display_name())),
                    Cell::new(""),
                ]);
            }
        }
    }

    table
}

/// 构建每组一行的汇总表
pub fn build_summary_table(report: &PlateReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(vec![
            Cell::new("Analyte"),
            Cell::new("Valid"),
            Cell::new("Mean (valid)"),
            Cell::new("Seed mean"),
            Cell::new("Threshold"),
        ]);

    for group in &report.groups {
        let row = match &group.outcome {
            GroupOutcome::Validated(s) => vec![
                Cell::new(&group.analyte),
                Cell::new(format!("{}/{}", s.valid_count, s.flags.len())),
                Cell::new(s.valid_mean.map_or_else(|| "-".to_string(), format_intensity))
                    .set_alignment(CellAlignment::Right),
                Cell::new(format_intensity(s.seed_mean)).set_alignment(CellAlignment::Right),
                Cell::new(format_intensity(s.threshold)).set_alignment(CellAlignment::Right),
            ],
            GroupOutcome::Failed { message, .. } => vec![
                Cell::new(&group.analyte),
                Cell::new("-"),
                Cell::new(message),
                Cell::new("-"),
                Cell::new("-"),
            ],
        };
        table.add_row(row);
    }

    table
}

/// 格式化完整的文本报告
pub fn format_text_report(report: &PlateReport) -> String {
    let mut output = create_output_header(report);

    output.push_str("Replicates:\n");
    output.push_str(&build_results_table(report).to_string());
    output.push_str("\n\nSummary:\n");
    output.push_str(&build_summary_table(report).to_string());
    output.push('\n');

    output.push_str(&format!(
        "\nGroups: {}    Failed: {}    Rejected replicates: {}\n",
        report.groups.len(),
        report.failed_groups(),
        report.rejected_replicates()
    ));

    output
}

/// 按指定格式渲染报告
pub fn render_report(report: &PlateReport, format: OutputFormat) -> SpotResult<String> {
    match format {
        OutputFormat::Text => Ok(format_text_report(report)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

/// 写入输出文件
pub fn write_output(path: &Path, content: &str) -> SpotResult<()> {
    std::fs::write(path, content).map_err(|e| {
        SpotError::IoError(std::io::Error::new(
            e.kind(),
            format!("写入失败 / Failed to write {}: {e}", path.display()),
        ))
    })
}
