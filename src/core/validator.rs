//! 重复样验证模块
//!
//! 在同一分析物的多个重复样中，找出数值上彼此一致的那一组。
//!
//! ## 算法（与MCR读板仪的Spot Reader逐位一致）
//!
//! 1. 按数值升序对重复样索引做稳定排序（相等值保持原始索引顺序）
//! 2. 在排序结果上滑动长度为3的窗口，计算 `spread = 最大值 - 最小值`
//! 3. 取**第一个**严格最小spread的窗口作为种子簇（后出现的相等spread不替换）
//! 4. 种子簇均值 `mean` 固定不变，后续接受新成员时**不重新计算**
//! 5. 其余重复样按升序逐个检查 `|x - mean| < cutoff * mean`（严格小于）
//!
//! ⚠️ 第4步的"固定均值"是原始评分方法的既有行为，不是实现缺陷，保持原样。
//!
//! ⚠️ 种子均值为0或负数时，阈值 `cutoff * mean` 非正，除种子外不会再接受任何重复样。

use crate::error::{SpotError, SpotResult};
use crate::tools::constants::spot_analysis;
use std::cmp::Ordering;

/// 重复样验证方法枚举（封闭变体集合）
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValidationMethod {
    /// 种子簇 + 相对容差（Spot Reader 兼容）
    SeedClusterCutoff {
        /// 相对容差（种子均值的比例）
        cutoff: f64,
    },
}

impl Default for ValidationMethod {
    fn default() -> Self {
        Self::SeedClusterCutoff {
            cutoff: spot_analysis::DEFAULT_CUTOFF,
        }
    }
}

/// 重复样验证trait
pub trait ReplicateValidator {
    /// 返回与输入等长的有效性标记
    fn validate(&self, values: &[f64]) -> SpotResult<Vec<bool>> {
        self.analyze(values).map(|outcome| outcome.flags)
    }

    /// 返回有效性标记及种子簇诊断信息
    fn analyze(&self, values: &[f64]) -> SpotResult<ValidationOutcome>;

    /// 获取策略描述（用于报告输出）
    fn strategy_name(&self) -> &'static str;
}

impl ReplicateValidator for ValidationMethod {
    fn analyze(&self, values: &[f64]) -> SpotResult<ValidationOutcome> {
        match *self {
            Self::SeedClusterCutoff { cutoff } => seed_cluster_cutoff(values, cutoff),
        }
    }

    fn strategy_name(&self) -> &'static str {
        match self {
            Self::SeedClusterCutoff { .. } => "SeedClusterCutoff",
        }
    }
}

/// 一次验证的完整结果
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    /// 每个重复样的有效性（与输入索引一一对应）
    pub flags: Vec<bool>,

    /// 种子簇的原始索引（按数值升序）
    pub seed: [usize; 3],

    /// 种子簇均值（固定，不随新成员更新）
    pub seed_mean: f64,

    /// 种子簇的数值跨度（最大值 - 最小值）
    pub seed_spread: f64,

    /// 接受阈值 `cutoff * seed_mean`
    pub threshold: f64,
}

impl ValidationOutcome {
    /// 有效重复样数量
    pub fn valid_count(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }

    /// 有效重复样的均值（下游汇总常用的报告值）
    ///
    /// `values` 必须是产生本结果的同一组输入。
    pub fn valid_mean(&self, values: &[f64]) -> Option<f64> {
        let (sum, count) = values
            .iter()
            .zip(&self.flags)
            .filter(|(_, valid)| **valid)
            .fold((0.0, 0usize), |(sum, count), (v, _)| (sum + v, count + 1));

        (count > 0).then(|| sum / count as f64)
    }
}

/// 使用默认方法（种子簇 + cutoff）验证重复样
///
/// # 示例
///
/// ```rust
/// use mcr_spot_tool::core::validate_replicates;
///
/// let flags = validate_replicates(&[10.0, 10.2, 9.8, 15.0, 5.0], 0.1).unwrap();
/// assert_eq!(flags, vec![true, true, true, false, false]);
/// ```
pub fn validate_replicates(values: &[f64], cutoff: f64) -> SpotResult<Vec<bool>> {
    ValidationMethod::SeedClusterCutoff { cutoff }.validate(values)
}

/// 同 [`validate_replicates`]，但返回包含种子簇信息的完整结果
pub fn analyze_replicates(values: &[f64], cutoff: f64) -> SpotResult<ValidationOutcome> {
    ValidationMethod::SeedClusterCutoff { cutoff }.analyze(values)
}

/// 前置条件检查：数量 → cutoff → 数值，任何一项失败都不进入计算
fn check_preconditions(values: &[f64], cutoff: f64) -> SpotResult<()> {
    if values.len() < spot_analysis::MIN_REPLICATES {
        return Err(SpotError::InsufficientReplicates {
            required: spot_analysis::MIN_REPLICATES,
            actual: values.len(),
        });
    }

    if !cutoff.is_finite() || cutoff < 0.0 {
        return Err(SpotError::InvalidConfig(format!(
            "cutoff必须是非负有限数 / cutoff must be finite and >= 0, got {cutoff}"
        )));
    }

    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(SpotError::InvalidValue {
            index,
            value: values[index],
        });
    }

    Ok(())
}

fn seed_cluster_cutoff(values: &[f64], cutoff: f64) -> SpotResult<ValidationOutcome> {
    check_preconditions(values, cutoff)?;

    // 稳定排序：相等值保持原始索引顺序（-0.0 与 0.0 视为相等）
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(Ordering::Equal)
    });

    let size = spot_analysis::SEED_CLUSTER_SIZE;
    let spread_at = |i: usize| values[order[i + size - 1]] - values[order[i]];

    let mut seed_start = 0;
    let mut min_spread = spread_at(0);
    for i in 1..=order.len() - size {
        let spread = spread_at(i);
        if spread < min_spread {
            min_spread = spread;
            seed_start = i;
        }
    }

    let seed = [order[seed_start], order[seed_start + 1], order[seed_start + 2]];
    let seed_mean = seed.iter().map(|&i| values[i]).sum::<f64>() / size as f64;
    let threshold = cutoff * seed_mean;

    let mut flags = vec![false; values.len()];
    for &i in &seed {
        flags[i] = true;
    }

    let seed_range = seed_start..seed_start + size;
    for (position, &i) in order.iter().enumerate() {
        if seed_range.contains(&position) {
            continue;
        }
        if (values[i] - seed_mean).abs() < threshold {
            flags[i] = true;
        }
    }

    Ok(ValidationOutcome {
        flags,
        seed,
        seed_mean,
        seed_spread: min_spread,
        threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_scenario() {
        let values = [10.0, 10.2, 9.8, 15.0, 5.0];
        let outcome = analyze_replicates(&values, 0.1).unwrap();

        assert_eq!(outcome.flags, vec![true, true, true, false, false]);
        assert_eq!(outcome.seed, [2, 0, 1]);
        assert!((outcome.seed_mean - 10.0).abs() < 1e-12);
        assert!((outcome.seed_spread - 0.4).abs() < 1e-12);
        assert_eq!(outcome.valid_count(), 3);
    }

    #[test]
    fn test_three_replicates_always_seed() {
        // 恰好3个重复样时，种子即全部，cutoff无影响
        assert_eq!(
            validate_replicates(&[1.0, 50.0, 900.0], 0.0).unwrap(),
            vec![true, true, true]
        );
    }

    #[test]
    fn test_equal_spread_keeps_first_window() {
        // 窗口(1,2,3)与(10,11,12)spread均为2，取第一个
        let outcome = analyze_replicates(&[1.0, 2.0, 3.0, 10.0, 11.0, 12.0], 0.1).unwrap();
        assert_eq!(outcome.seed, [0, 1, 2]);
        assert_eq!(outcome.flags, vec![true, true, true, false, false, false]);
    }

    #[test]
    fn test_ties_sorted_by_original_index() {
        let outcome = analyze_replicates(&[5.0, 1.0, 5.0, 5.0, 5.0], 0.0).unwrap();
        assert_eq!(outcome.seed, [0, 2, 3]);
        assert_eq!(outcome.flags, vec![true, false, true, true, false]);
    }

    #[test]
    fn test_valid_mean() {
        let values = [10.0, 10.2, 9.8, 15.0, 5.0];
        let outcome = analyze_replicates(&values, 0.1).unwrap();
        let mean = outcome.valid_mean(&values).unwrap();
        assert!((mean - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_precondition_order() {
        // 数量检查优先于cutoff检查
        assert!(matches!(
            validate_replicates(&[1.0, 2.0], -1.0),
            Err(SpotError::InsufficientReplicates { actual: 2, .. })
        ));
        // cutoff检查优先于数值检查
        assert!(matches!(
            validate_replicates(&[1.0, f64::NAN, 3.0], -1.0),
            Err(SpotError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_non_finite_cutoff_rejected() {
        assert!(matches!(
            validate_replicates(&[1.0, 2.0, 3.0], f64::NAN),
            Err(SpotError::InvalidConfig(_))
        ));
        assert!(matches!(
            validate_replicates(&[1.0, 2.0, 3.0], f64::INFINITY),
            Err(SpotError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_strategy_name_and_default() {
        let method = ValidationMethod::default();
        assert_eq!(method, ValidationMethod::SeedClusterCutoff { cutoff: 0.1 });
        assert_eq!(method.strategy_name(), "SeedClusterCutoff");
    }
}
