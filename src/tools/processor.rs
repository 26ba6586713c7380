//! 测量文件处理模块
//!
//! 强度提取 → 重复样验证 → 有效均值汇总，按重复样组并行执行。
//! 单个组失败只记录在该组的报告里，不影响同一块板的其他组。

use super::cli::AppConfig;
use super::formatter;
use super::measurement::{Measurement, ReplicateGroup};
use super::utils;
use crate::core::{IntensityMethod, IntensityStrategy, ReplicateValidator, ValidationMethod};
use crate::error::{ErrorCategory, SpotError, SpotResult};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// 单块板的分析报告
#[derive(Debug, Clone, Serialize)]
pub struct PlateReport {
    /// 板名称
    pub name: String,

    /// 来源测量文件
    pub source: PathBuf,

    /// 实际使用的cutoff
    pub cutoff: f64,

    /// 强度提取策略名称
    pub intensity_method: &'static str,

    /// 验证策略名称
    pub validation_method: &'static str,

    /// 各重复样组结果（与测量文件中的顺序一致）
    pub groups: Vec<GroupReport>,
}

/// 单个重复样组的报告
#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    /// 分析物名称
    pub analyte: String,

    /// 组处理结果
    pub outcome: GroupOutcome,
}

/// 组处理结果：验证成功或失败原因
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GroupOutcome {
    Validated(GroupSummary),
    Failed {
        category: ErrorCategory,
        message: String,
    },
}

/// 验证成功的组汇总
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    /// 各重复样强度（按物理重复样编号）
    pub intensities: Vec<f64>,

    /// 有效性标记
    pub flags: Vec<bool>,

    /// 种子簇原始索引
    pub seed: [usize; 3],

    /// 种子簇均值
    pub seed_mean: f64,

    /// 接受阈值 `cutoff * seed_mean`
    pub threshold: f64,

    /// 有效重复样数量
    pub valid_count: usize,

    /// 有效重复样均值（下游报告值）
    pub valid_mean: Option<f64>,
}

impl GroupReport {
    /// 组是否验证成功
    pub fn summary(&self) -> Option<&GroupSummary> {
        match &self.outcome {
            GroupOutcome::Validated(summary) => Some(summary),
            GroupOutcome::Failed { .. } => None,
        }
    }
}

impl PlateReport {
    /// 验证失败的组数
    pub fn failed_groups(&self) -> usize {
        self.groups.iter().filter(|g| g.summary().is_none()).count()
    }

    /// 被剔除的重复样总数（仅统计验证成功的组）
    pub fn rejected_replicates(&self) -> usize {
        self.groups
            .iter()
            .filter_map(GroupReport::summary)
            .map(|s| s.flags.len() - s.valid_count)
            .sum()
    }
}

/// 分析单个重复样组
///
/// 组内任何一个斑点提取失败，整组失败（不产生部分结果）。
pub fn analyze_group(
    group: &ReplicateGroup,
    strategy: &impl IntensityStrategy,
    validator: &impl ReplicateValidator,
) -> SpotResult<GroupSummary> {
    let intensities = group
        .spots
        .iter()
        .map(|spot| spot.resolve(strategy))
        .collect::<SpotResult<Vec<f64>>>()?;

    let outcome = validator.analyze(&intensities)?;
    let valid_mean = outcome.valid_mean(&intensities);

    Ok(GroupSummary {
        valid_count: outcome.valid_count(),
        valid_mean,
        seed: outcome.seed,
        seed_mean: outcome.seed_mean,
        threshold: outcome.threshold,
        flags: outcome.flags,
        intensities,
    })
}

/// 分析整块板（组间并行，输出保持原顺序）
pub fn process_measurement(
    measurement: &Measurement,
    source: &Path,
    default_cutoff: f64,
) -> SpotResult<PlateReport> {
    let cutoff = measurement.cutoff.unwrap_or(default_cutoff);
    if !cutoff.is_finite() || cutoff < 0.0 {
        return Err(SpotError::InvalidConfig(format!(
            "板级cutoff无效 / invalid plate cutoff: {cutoff}"
        )));
    }

    let strategy = IntensityMethod::DeviceBuiltin;
    let validator = ValidationMethod::SeedClusterCutoff { cutoff };

    let groups: Vec<GroupReport> = measurement
        .groups
        .par_iter()
        .map(|group| {
            let outcome = match analyze_group(group, &strategy, &validator) {
                Ok(summary) => GroupOutcome::Validated(summary),
                Err(e) => GroupOutcome::Failed {
                    category: ErrorCategory::from_spot_error(&e),
                    message: e.to_string(),
                },
            };
            GroupReport {
                analyte: group.analyte.clone(),
                outcome,
            }
        })
        .collect();

    Ok(PlateReport {
        name: measurement
            .name
            .clone()
            .unwrap_or_else(|| utils::extract_file_stem_string(source)),
        source: source.to_path_buf(),
        cutoff,
        intensity_method: strategy.strategy_name(),
        validation_method: validator.strategy_name(),
        groups,
    })
}

/// 读取并分析单个测量文件
pub fn process_measurement_file(path: &Path, config: &AppConfig) -> SpotResult<PlateReport> {
    if !path.is_file() {
        return Err(SpotError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("测量文件不存在 / Measurement file not found: {}", path.display()),
        )));
    }

    let measurement = Measurement::load(path)?;
    let report = process_measurement(&measurement, path, config.cutoff)?;

    if config.verbose {
        println!(
            "[INFO] {}: {} 组 / groups, {} 组失败 / failed, {} 个重复样被剔除 / replicates rejected",
            report.name,
            report.groups.len(),
            report.failed_groups(),
            report.rejected_replicates()
        );
    }

    Ok(report)
}

/// 生成单文件报告路径：`<stem>_Replicate_Analysis.<ext>`，与输入文件同目录
pub fn individual_report_path(input: &Path, config: &AppConfig) -> PathBuf {
    let stem = utils::extract_file_stem_string(input);
    utils::get_parent_dir(input).join(format!(
        "{stem}{}.{}",
        super::constants::defaults::REPORT_SUFFIX,
        config.output_format.extension()
    ))
}

/// 保存单文件报告
pub fn save_individual_result(report: &PlateReport, config: &AppConfig) -> SpotResult<PathBuf> {
    let path = config
        .output_path
        .clone()
        .unwrap_or_else(|| individual_report_path(&report.source, config));

    let content = formatter::render_report(report, config.output_format)?;
    formatter::write_output(&path, &content)?;
    Ok(path)
}

/// 输出单文件结果：打印到控制台，并按需保存
pub fn output_results(report: &PlateReport, config: &AppConfig, auto_save: bool) -> SpotResult<()> {
    let content = formatter::render_report(report, config.output_format)?;
    println!("{content}");

    if config.output_path.is_some() || auto_save {
        let path = save_individual_result(report, config)?;
        println!("[INFO] 结果已保存 / Results saved to: {}", path.display());
    }

    Ok(())
}
