//! 文件扫描模块
//!
//! 负责扫描目录中的测量文件，并生成批量汇总报告的头尾与条目。

use super::batch_state::BatchStatsSnapshot;
use super::cli::AppConfig;
use super::constants::defaults;
use super::processor::{GroupOutcome, PlateReport};
use super::utils;
use crate::error::{SpotError, SpotResult};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 扫描目录中的测量文件（`*.json`，排除本工具生成的报告）
pub fn scan_measurement_files(dir_path: &Path, recursive: bool) -> SpotResult<Vec<PathBuf>> {
    if !dir_path.exists() {
        return Err(SpotError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("目录不存在 / Directory not found: {}", dir_path.display()),
        )));
    }

    if !dir_path.is_dir() {
        return Err(SpotError::InvalidInput(format!(
            "路径不是目录 / Not a directory: {}",
            dir_path.display()
        )));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in WalkDir::new(dir_path).min_depth(1).max_depth(max_depth) {
        let entry = entry.map_err(|e| {
            SpotError::IoError(
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("目录遍历失败 / walk failed")),
            )
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if is_measurement_file(path) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

/// 判断是否为测量文件（扩展名匹配，且不是生成的报告）
fn is_measurement_file(path: &Path) -> bool {
    let ext_ok = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(defaults::MEASUREMENT_EXTENSION));

    let stem = utils::extract_file_stem_string(path);
    let is_report =
        stem.ends_with(defaults::REPORT_SUFFIX) || stem.contains(defaults::BATCH_REPORT_SUFFIX);

    ext_ok && !is_report
}

/// 显示文件扫描结果
pub fn show_scan_results(config: &AppConfig, files: &[PathBuf]) {
    if files.is_empty() {
        println!(
            "[WARNING] 在目录 {} 中没有找到测量文件 / No measurement files found",
            config.input_path.display()
        );
        println!("   支持的格式 / Supported format: JSON");
        return;
    }

    println!("[INFO] 扫描目录 / Scanning: {}", config.input_path.display());
    println!("[INFO] 找到 {} 个测量文件 / measurement files found", files.len());

    if config.verbose {
        for (i, file) in files.iter().enumerate() {
            println!("   {}. {}", i + 1, utils::extract_filename_lossy(file));
        }
    }
    println!();
}

/// 生成批量输出的头部信息
pub fn create_batch_output_header(config: &AppConfig, files: &[PathBuf]) -> String {
    let mut batch_output = String::new();

    batch_output.push_str("=====================================\n");
    batch_output.push_str("   MCR Replicate Validation Report\n");
    batch_output.push_str("   批量分析结果 / Batch results\n");
    batch_output.push_str("=====================================\n\n");

    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    batch_output.push_str(&format!("log date: {now}\n"));
    batch_output.push_str(&format!("扫描目录 / Directory: {}\n", config.input_path.display()));
    batch_output.push_str(&format!("默认cutoff / Default cutoff: {}\n", config.cutoff));
    batch_output.push_str(&format!("文件数 / Files: {}\n\n", files.len()));

    batch_output.push_str("Plate\tAnalyte\tValid\tMean(valid)\n");
    batch_output.push_str("--------------------------------------------------------\n");

    batch_output
}

/// 把一块板的结果追加到批量输出（每组一行）
pub fn add_to_batch_output(batch_output: &mut String, report: &PlateReport) {
    for group in &report.groups {
        let line = match &group.outcome {
            GroupOutcome::Validated(s) => format!(
                "{}\t{}\t{}/{}\t{}\n",
                report.name,
                group.analyte,
                s.valid_count,
                s.flags.len(),
                s.valid_mean
                    .map_or_else(|| "-".to_string(), |m| format!("{m:.2}"))
            ),
            GroupOutcome::Failed { category, .. } => format!(
                "{}\t{}\t[{}]\t-\n",
                report.name,
                group.analyte,
                category.display_name()
            ),
        };
        batch_output.push_str(&line);
    }
}

/// 记录处理失败的文件
pub fn add_failed_to_batch_output(batch_output: &mut String, file: &Path) {
    batch_output.push_str(&format!(
        "{}\t-\t[处理失败 / FAILED]\t-\n",
        utils::extract_filename_lossy(file)
    ));
}

/// 生成批量输出的统计信息
pub fn create_batch_output_footer(files: &[PathBuf], stats: &BatchStatsSnapshot) -> String {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    let mut output = String::new();

    output.push('\n');
    output.push_str("=====================================\n");
    output.push_str("批量处理统计 / Batch statistics:\n");
    output.push_str(&format!("   总文件数 / Total: {}\n", files.len()));
    output.push_str(&format!("   成功处理 / Processed: {}\n", stats.processed));
    output.push_str(&format!("   处理失败 / Failed: {}\n", stats.failed));
    if let Some(rate) = stats.success_rate() {
        output.push_str(&format!("   处理成功率 / Success rate: {rate:.1}%\n"));
    }
    output.push_str(&format!(
        "   重复样组 / Groups: {} (验证失败 / failed: {})\n",
        stats.groups, stats.failed_groups
    ));
    output.push_str(&format!(
        "   剔除重复样 / Rejected replicates: {}\n",
        stats.rejected_replicates
    ));

    if !stats.error_stats.is_empty() {
        output.push_str("\n失败分类 / Failures by category:\n");
        let mut categories: Vec<_> = stats.error_stats.iter().collect();
        categories.sort_by_key(|(category, _)| **category);
        for (category, names) in categories {
            output.push_str(&format!(
                "   {} ({}): {}\n",
                category.display_name(),
                names.len(),
                names.join(", ")
            ));
        }
    }

    output.push('\n');
    output.push_str(&format!("生成工具 / Generated by: MCR Spot Tool v{VERSION}\n"));

    output
}

/// 生成批量输出文件路径
pub fn generate_batch_output_path(config: &AppConfig) -> PathBuf {
    config.output_path.clone().unwrap_or_else(|| {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let base_name = utils::extract_filename(&config.input_path).replace('.', "_");

        config.input_path.join(format!(
            "{base_name}{}_{timestamp}.txt",
            defaults::BATCH_REPORT_SUFFIX
        ))
    })
}

/// 统一处理批量输出收尾：写入汇总文件（多文件）或保存单文件结果
pub fn finalize_and_write_batch_output(
    config: &AppConfig,
    files: &[PathBuf],
    mut batch_output: String,
    stats: &BatchStatsSnapshot,
) -> SpotResult<()> {
    batch_output.push_str(&create_batch_output_footer(files, stats));

    let output_path = generate_batch_output_path(config);
    super::formatter::write_output(&output_path, &batch_output)?;

    show_batch_completion_info(&output_path, stats, files.len());
    Ok(())
}

/// 显示批量处理完成信息
pub fn show_batch_completion_info(output_path: &Path, stats: &BatchStatsSnapshot, total_count: usize) {
    println!();
    println!("[OK] 批量处理完成 / Batch finished");
    println!("   成功处理 / Processed: {} / {total_count}", stats.processed);
    if stats.failed > 0 {
        println!("   失败文件 / Failed: {}", stats.failed);
    }
    if stats.failed_groups > 0 {
        println!("   [WARNING] 验证失败的重复样组 / Failed groups: {}", stats.failed_groups);
    }
    println!("   批量汇总 / Summary: {}", output_path.display());
}
