//! 工具模块集合
//!
//! 包含CLI、测量文件读取、批处理、格式化等工具模块，支持main.rs的流程控制。

pub mod batch_state;
pub mod cli;
pub mod constants;
pub mod formatter;
pub mod measurement;
pub mod parallel_processor;
pub mod processor;
pub mod scanner;
pub mod utils;

// 重新导出主要的公共接口
pub use batch_state::{BatchStatsSnapshot, ParallelBatchStats, SerialBatchStats};
pub use cli::{
    AppConfig, OutputFormat, parse_args, parse_args_from, show_completion_info, show_startup_info,
};
pub use formatter::{format_text_report, render_report, write_output};
pub use measurement::{Measurement, ReplicateGroup, SpotInput};
pub use parallel_processor::{can_fallback_to_serial, process_batch_parallel};
pub use processor::{
    GroupOutcome, GroupReport, GroupSummary, PlateReport, analyze_group, output_results,
    process_measurement, process_measurement_file, save_individual_result,
};
pub use scanner::{
    add_failed_to_batch_output, add_to_batch_output, create_batch_output_footer,
    create_batch_output_header, finalize_and_write_batch_output, generate_batch_output_path,
    scan_measurement_files, show_batch_completion_info, show_scan_results,
};
