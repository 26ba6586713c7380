//! 斑点强度提取策略模块
//!
//! 把一个斑点的像素区域归约成单个化学发光强度值。
//!
//! ## 职责边界
//!
//! 本模块仅负责：**给定像素区域，计算代表性强度**。
//! 斑点定位、ROI裁剪由上游图像子系统负责；强度如何分组为重复样由板布局负责。
//!
//! ## 设备兼容
//!
//! - **默认策略**：`DeviceBuiltin`（最亮10个像素的算术平均，与MCR读板仪固件一致）
//! - **常量来源**：集中在 `tools::constants::spot_analysis` 中管理

use super::pixel_region::PixelRegion;
use crate::error::{SpotError, SpotResult};
use crate::tools::constants::spot_analysis;

/// 强度提取方法枚举（封闭变体集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntensityMethod {
    /// 设备内置：排序后取最亮的10个像素求平均
    #[default]
    DeviceBuiltin,
}

/// 强度提取trait，定义像素区域 → 标量强度的能力
pub trait IntensityStrategy {
    /// 计算像素区域的代表性强度
    ///
    /// # 错误
    ///
    /// 样本数不足时返回 `SpotError::InsufficientData`
    fn extract(&self, region: &PixelRegion) -> SpotResult<f64>;

    /// 获取策略描述（用于报告输出）
    fn strategy_name(&self) -> &'static str;
}

impl IntensityStrategy for IntensityMethod {
    fn extract(&self, region: &PixelRegion) -> SpotResult<f64> {
        match self {
            Self::DeviceBuiltin => mean_of_brightest(region.samples(), spot_analysis::TOP_PIXEL_COUNT),
        }
    }

    fn strategy_name(&self) -> &'static str {
        match self {
            Self::DeviceBuiltin => "DeviceBuiltin",
        }
    }
}

/// 使用设备内置算法提取强度
///
/// # 示例
///
/// ```rust
/// use mcr_spot_tool::core::{PixelRegion, extract_intensity};
///
/// let pixels: Vec<f64> = (1..=20).map(f64::from).collect();
/// let region = PixelRegion::new(4, 5, pixels).unwrap();
///
/// // 最亮的10个像素是 11..=20，平均值为 15.5
/// assert_eq!(extract_intensity(&region).unwrap(), 15.5);
/// ```
pub fn extract_intensity(region: &PixelRegion) -> SpotResult<f64> {
    IntensityMethod::DeviceBuiltin.extract(region)
}

/// 最亮 `count` 个样本的算术平均
///
/// 先用 `select_nth_unstable_by` 把最亮的 `count` 个分区到尾部，再对尾部升序排序，
/// 然后用 [`pairwise_sum`] 求和，逐位复现设备软件的均值。
fn mean_of_brightest(samples: &[f64], count: usize) -> SpotResult<f64> {
    let required = count.max(spot_analysis::MIN_PIXEL_SAMPLES);
    if samples.len() < required {
        return Err(SpotError::InsufficientData {
            required,
            actual: samples.len(),
        });
    }

    if let Some(index) = samples.iter().position(|v| !v.is_finite()) {
        return Err(SpotError::InvalidValue {
            index,
            value: samples[index],
        });
    }

    let mut sorted = samples.to_vec();
    let split = sorted.len() - count;
    if split > 0 {
        sorted.select_nth_unstable_by(split, f64::total_cmp);
    }

    let brightest = &mut sorted[split..];
    brightest.sort_unstable_by(f64::total_cmp);

    Ok(pairwise_sum(brightest) / count as f64)
}

/// 分块累加宽度
const PAIRWISE_LANES: usize = 8;

/// 不再二分的最大块长度
const PAIRWISE_BLOCK: usize = 128;

/// 成对求和（8路分块、128元素叶子），累加顺序与设备分析软件一致
///
/// - 少于8个：顺序累加
/// - 不超过128个：8路交错累加，按 `((r0+r1)+(r2+r3))+((r4+r5)+(r6+r7))` 合并，余数顺序追加
/// - 更长：在8的倍数处二分后递归
///
/// 对10个值即 `((v0+v1)+(v2+v3))+((v4+v5)+(v6+v7))`，再依次加 `v8`、`v9`。
fn pairwise_sum(values: &[f64]) -> f64 {
    let n = values.len();

    if n < PAIRWISE_LANES {
        return values.iter().fold(0.0, |acc, &v| acc + v);
    }

    if n <= PAIRWISE_BLOCK {
        let mut lanes = [0.0; PAIRWISE_LANES];
        lanes.copy_from_slice(&values[..PAIRWISE_LANES]);

        let blocked = n - n % PAIRWISE_LANES;
        for chunk in values[PAIRWISE_LANES..blocked].chunks_exact(PAIRWISE_LANES) {
            for (lane, &v) in lanes.iter_mut().zip(chunk) {
                *lane += v;
            }
        }

        let mut sum = ((lanes[0] + lanes[1]) + (lanes[2] + lanes[3]))
            + ((lanes[4] + lanes[5]) + (lanes[6] + lanes[7]));
        for &v in &values[blocked..] {
            sum += v;
        }
        return sum;
    }

    let mut half = n / 2;
    half -= half % PAIRWISE_LANES;
    pairwise_sum(&values[..half]) + pairwise_sum(&values[half..])
}
