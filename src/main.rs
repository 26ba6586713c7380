//! MCR Spot Tool - 主程序入口
//!
//! 纯流程控制器，负责协调各个工具模块完成重复样验证任务。

use mcr_spot_tool::{
    error::{ErrorCategory, SpotError},
    tools::{self, AppConfig},
};
use std::path::PathBuf;
use std::process;

/// 错误退出码定义
mod exit_codes {
    /// 通用错误
    pub const GENERAL_ERROR: i32 = 1;
    /// 格式/输入错误
    pub const FORMAT_ERROR: i32 = 2;
    /// 数据不足
    pub const INSUFFICIENT_ERROR: i32 = 3;
    /// 数值/配置无效
    pub const INVALID_ERROR: i32 = 4;
    /// 资源/并发错误
    pub const RESOURCE_ERROR: i32 = 5;
}

/// 获取错误建议文本
fn get_error_suggestion(error: &SpotError) -> &'static str {
    match error {
        SpotError::InvalidInput(_) => {
            "检查命令行参数是否正确，使用 --help 查看完整用法 / Check command-line arguments, use --help to see full usage"
        }
        SpotError::ResourceError(_) => {
            "资源不可用，请重试或使用 --serial 串行模式 / Resource unavailable, retry or use --serial"
        }
        _ => match ErrorCategory::from_spot_error(error) {
            ErrorCategory::Io => {
                "检查文件路径是否正确，文件是否存在且可读 / Check the path exists and is readable"
            }
            ErrorCategory::Format => {
                "确保输入文件为有效的JSON测量文件 / Ensure the input is a valid JSON measurement file"
            }
            ErrorCategory::Insufficient => {
                "每个斑点至少需要10个像素，每组至少需要3个重复样 / Each spot needs >= 10 pixels, each group >= 3 replicates"
            }
            ErrorCategory::Invalid => {
                "检查cutoff是否非负，数据中是否含有NaN/Inf / Check cutoff >= 0 and data contains no NaN/Inf"
            }
            ErrorCategory::Other => "请检查输入文件和参数设置 / Please check input file and parameters",
        },
    }
}

/// 错误处理和建议
fn handle_error(error: SpotError) -> ! {
    eprintln!("[ERROR] 错误 / Error: {error}");
    eprintln!("[INFO] 建议 / Suggestion: {}", get_error_suggestion(&error));

    let exit_code = match &error {
        SpotError::InvalidInput(_) => exit_codes::FORMAT_ERROR,
        SpotError::ResourceError(_) => exit_codes::RESOURCE_ERROR,
        _ => match ErrorCategory::from_spot_error(&error) {
            ErrorCategory::Format => exit_codes::FORMAT_ERROR,
            ErrorCategory::Insufficient => exit_codes::INSUFFICIENT_ERROR,
            ErrorCategory::Invalid => exit_codes::INVALID_ERROR,
            ErrorCategory::Io | ErrorCategory::Other => exit_codes::GENERAL_ERROR,
        },
    };

    process::exit(exit_code);
}

/// 批量处理测量文件
fn process_batch_mode(config: &AppConfig) -> Result<(), SpotError> {
    let files = tools::scan_measurement_files(&config.input_path, config.recursive)?;

    tools::show_scan_results(config, &files);

    if files.is_empty() {
        return Ok(());
    }

    match config.parallel_files {
        None => process_batch_serial(config, &files),
        Some(degree) => {
            let actual_degree = tools::utils::effective_parallel_degree(degree, Some(files.len()));

            if actual_degree == 1 {
                if config.verbose {
                    println!("[INFO] 并发度为1，使用串行模式 / Parallelism=1, using serial mode");
                }
                process_batch_serial(config, &files)
            } else {
                match tools::process_batch_parallel(&files, config, actual_degree) {
                    // 仅线程池建立失败时回退；汇总写入失败等错误直接返回，避免重复处理
                    Err(e) if tools::can_fallback_to_serial(&e) => {
                        eprintln!("[WARNING] 并行处理失败 / Parallel processing failed: {e}，回退到串行模式 / fallback to serial");
                        process_batch_serial(config, &files)
                    }
                    result => result,
                }
            }
        }
    }
}

/// 串行批量处理测量文件
fn process_batch_serial(config: &AppConfig, files: &[PathBuf]) -> Result<(), SpotError> {
    let mut batch_output = tools::create_batch_output_header(config, files);
    let mut stats = tools::SerialBatchStats::new();

    for (index, file) in files.iter().enumerate() {
        if config.verbose {
            println!(
                "[PROCESSING] [{}/{}] 处理 / Processing: {}",
                index + 1,
                files.len(),
                tools::utils::extract_filename_lossy(file)
            );
        }

        match tools::process_measurement_file(file, config) {
            Ok(report) => {
                stats.record_report(&report);
                tools::add_to_batch_output(&mut batch_output, &report);

                if config.verbose {
                    println!("   [OK] 处理成功 / Processing succeeded");
                }
            }
            Err(e) => {
                let category = ErrorCategory::from_spot_error(&e);
                let filename = tools::utils::extract_filename_lossy(file);

                println!(
                    "[FAIL] [{}/{}] {} - [{}] {e}",
                    index + 1,
                    files.len(),
                    filename,
                    category.display_name()
                );
                if config.verbose
                    && let Some(source) = std::error::Error::source(&e)
                {
                    println!("      原因 / Cause: {source}");
                }

                tools::add_failed_to_batch_output(&mut batch_output, file);
                stats.record_failure(&e, filename);
            }
        }
    }

    tools::finalize_and_write_batch_output(config, files, batch_output, &stats.snapshot())
}

/// 单文件处理模式
fn process_single_mode(config: &AppConfig) -> Result<(), SpotError> {
    let report = tools::process_measurement_file(&config.input_path, config)?;

    // 输出结果（如果用户未指定输出文件，则自动保存到输入文件旁）
    tools::output_results(&report, config, config.output_path.is_none())
}

/// 应用程序主逻辑
fn run() -> Result<(), SpotError> {
    let config = tools::parse_args();
    config.validate()?;

    tools::show_startup_info(&config);

    if config.is_batch_mode() {
        process_batch_mode(&config)?;
    } else {
        process_single_mode(&config)?;
    }

    tools::show_completion_info(&config);
    Ok(())
}

fn main() {
    if let Err(error) = run() {
        handle_error(error);
    }
}
