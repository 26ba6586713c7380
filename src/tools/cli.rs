//! 命令行接口模块
//!
//! 负责命令行参数解析、配置管理和程序信息展示。

use super::constants::{defaults, parallel_limits, spot_analysis};
use crate::error::{SpotError, SpotResult};
use clap::{Arg, ArgAction, Command, value_parser};
use std::path::PathBuf;

/// 应用程序版本信息
const VERSION: &str = env!("CARGO_PKG_VERSION");
const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// 报告输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// 人类可读文本（含表格）
    #[default]
    Text,
    /// 机器可读JSON
    Json,
}

impl OutputFormat {
    /// 报告文件扩展名
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Json => "json",
        }
    }
}

/// 应用程序配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 输入测量文件（单文件模式）或扫描目录（批量模式）
    pub input_path: PathBuf,

    /// 是否显示详细信息
    pub verbose: bool,

    /// 输出文件路径（可选，批量模式时自动生成）
    pub output_path: Option<PathBuf>,

    /// 默认相对容差（测量文件可按板覆盖）
    pub cutoff: f64,

    /// 多文件并行度（None 表示串行）
    pub parallel_files: Option<usize>,

    /// 报告格式
    pub output_format: OutputFormat,

    /// 批量模式是否递归扫描子目录
    pub recursive: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("."),
            verbose: false,
            output_path: None,
            cutoff: spot_analysis::DEFAULT_CUTOFF,
            parallel_files: Some(defaults::PARALLEL_FILES_DEGREE),
            output_format: OutputFormat::Text,
            recursive: false,
        }
    }
}

impl AppConfig {
    /// 智能判断是否为批量模式（基于路径类型）
    #[inline]
    pub fn is_batch_mode(&self) -> bool {
        self.input_path.is_dir()
    }

    /// 校验配置（在任何文件处理之前）
    pub fn validate(&self) -> SpotResult<()> {
        if !self.cutoff.is_finite() || self.cutoff < 0.0 {
            return Err(SpotError::InvalidInput(format!(
                "--cutoff 必须是非负有限数 / --cutoff must be finite and >= 0, got {}",
                self.cutoff
            )));
        }
        Ok(())
    }
}

/// 构建命令行定义
fn build_command() -> Command {
    Command::new("mcr-spot")
        .version(VERSION)
        .about(DESCRIPTION)
        .author("MCR Spot Tool Team")
        .arg(
            Arg::new("INPUT")
                .help("测量文件(JSON)或目录路径。如果不指定，将扫描可执行文件所在目录 / Measurement file or directory")
                .required(false)
                .index(1),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("显示详细处理信息 / Show detailed output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("输出结果到文件 / Write report to file")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("cutoff")
                .long("cutoff")
                .short('c')
                .help("相对容差（种子均值的比例）/ Relative tolerance of the seed mean")
                .value_name("FRACTION")
                .value_parser(value_parser!(f64))
                .default_value("0.1"),
        )
        .arg(
            Arg::new("parallel-files")
                .long("parallel-files")
                .short('j')
                .help("多文件并行度 / Number of files processed in parallel")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .default_value("4"),
        )
        .arg(
            Arg::new("serial")
                .long("serial")
                .help("禁用多文件并行 / Disable parallel file processing")
                .action(ArgAction::SetTrue)
                .conflicts_with("parallel-files"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("报告格式 / Report format")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(
            Arg::new("recursive")
                .long("recursive")
                .short('r')
                .help("递归扫描子目录 / Scan subdirectories")
                .action(ArgAction::SetTrue),
        )
}

/// 解析命令行参数并创建配置
pub fn parse_args() -> AppConfig {
    config_from_matches(&build_command().get_matches())
}

/// 从给定参数列表解析配置（便于测试）
pub fn parse_args_from<I, T>(args: I) -> SpotResult<AppConfig>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = build_command()
        .try_get_matches_from(args)
        .map_err(|e| SpotError::InvalidInput(e.to_string()))?;
    Ok(config_from_matches(&matches))
}

fn config_from_matches(matches: &clap::ArgMatches) -> AppConfig {
    // 确定输入路径（双击启动时使用可执行文件所在目录）
    let input_path = match matches.get_one::<String>("INPUT") {
        Some(input) => PathBuf::from(input),
        None => {
            let exe_path = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("."));
            super::utils::get_parent_dir(&exe_path).to_path_buf()
        }
    };

    let parallel_files = if matches.get_flag("serial") {
        None
    } else {
        matches.get_one::<usize>("parallel-files").map(|&n| {
            n.clamp(
                parallel_limits::MIN_PARALLEL_DEGREE,
                parallel_limits::MAX_PARALLEL_DEGREE,
            )
        })
    };

    let output_format = match matches.get_one::<String>("format").map(String::as_str) {
        Some("json") => OutputFormat::Json,
        _ => OutputFormat::Text,
    };

    AppConfig {
        input_path,
        verbose: matches.get_flag("verbose"),
        output_path: matches.get_one::<String>("output").map(PathBuf::from),
        cutoff: matches
            .get_one::<f64>("cutoff")
            .copied()
            .unwrap_or(spot_analysis::DEFAULT_CUTOFF),
        parallel_files,
        output_format,
        recursive: matches.get_flag("recursive"),
    }
}

/// 显示程序启动信息
pub fn show_startup_info(config: &AppConfig) {
    println!("MCR Spot Tool v{VERSION}");
    println!("{DESCRIPTION}");
    if config.verbose {
        println!("[INFO] cutoff = {} / 格式 format = {:?}", config.cutoff, config.output_format);
    }
    println!();
}

/// 显示程序完成信息
pub fn show_completion_info(config: &AppConfig) {
    if config.verbose {
        println!("[OK] 所有任务处理完成 / All tasks completed");
    }
}
