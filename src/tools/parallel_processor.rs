//! 多文件并行处理模块
//!
//! 使用rayon实现文件级并行处理，保证输出顺序与扫描顺序一致

use super::batch_state::ParallelBatchStats;
use super::cli::AppConfig;
use super::processor::{PlateReport, process_measurement_file};
use super::{scanner, utils};
use crate::error::{SpotError, SpotResult};
use rayon::prelude::*;
use std::path::PathBuf;

/// 有序结果容器
struct OrderedResult {
    /// 原始文件索引（用于排序）
    index: usize,

    /// 文件路径
    file_path: PathBuf,

    /// 处理结果
    result: SpotResult<PlateReport>,
}

/// 并行批处理失败后能否改用串行模式重试
///
/// 只有线程池无法建立（`ResourceError`）时还没有处理任何文件；其他错误发生在处理之后，
/// 串行重跑会得到同样的结果。
pub fn can_fallback_to_serial(error: &SpotError) -> bool {
    matches!(error, SpotError::ResourceError(_))
}

/// 多文件并行处理
///
/// - rayon线程池精确控制并发度
/// - 线程安全的统计信息收集
/// - 索引排序保证输出顺序
pub fn process_batch_parallel(
    files: &[PathBuf],
    config: &AppConfig,
    parallel_degree: usize,
) -> SpotResult<()> {
    println!("[INFO] 启用多文件并行处理 / Parallel processing: {parallel_degree} 并发度 / workers");

    let stats = ParallelBatchStats::new();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(parallel_degree)
        .thread_name(|i| format!("spot-worker-{i}"))
        .build()
        .map_err(|e| SpotError::ResourceError(format!("线程池创建失败 / thread pool: {e}")))?;

    let results: Vec<OrderedResult> = pool.install(|| {
        files
            .par_iter()
            .enumerate()
            .map(|(index, file)| {
                // 工作线程内静默处理，避免输出交错
                let silent_config = AppConfig {
                    verbose: false,
                    ..config.clone()
                };

                let result = process_measurement_file(file, &silent_config);

                match &result {
                    Ok(report) => {
                        let count = stats.record_report(report);
                        if config.verbose {
                            println!(
                                "[OK] [{}/{}] {}",
                                count,
                                files.len(),
                                utils::extract_filename_lossy(file)
                            );
                        }
                    }
                    Err(e) => {
                        let filename = utils::extract_filename_lossy(file);
                        println!("[FAIL] {filename} - {e}");
                        stats.record_failure(e, filename);
                    }
                }

                OrderedResult {
                    index,
                    file_path: file.clone(),
                    result,
                }
            })
            .collect()
    });

    let mut sorted_results = results;
    sorted_results.sort_by_key(|r| r.index);

    let mut batch_output = scanner::create_batch_output_header(config, files);
    for ordered in &sorted_results {
        match &ordered.result {
            Ok(report) => scanner::add_to_batch_output(&mut batch_output, report),
            Err(_) => scanner::add_failed_to_batch_output(&mut batch_output, &ordered.file_path),
        }
    }

    scanner::finalize_and_write_batch_output(config, files, batch_output, &stats.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pool_failure_falls_back() {
        assert!(can_fallback_to_serial(&SpotError::ResourceError("pool".into())));
        assert!(!can_fallback_to_serial(&SpotError::IoError(std::io::Error::other(
            "write"
        ))));
        assert!(!can_fallback_to_serial(&SpotError::FormatError("x".into())));
    }
}
