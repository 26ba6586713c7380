//! MCR Spot Tool
//!
//! 化学发光读板仪（MCR）斑点分析工具，复现设备固件的强度评分与离群重复样剔除行为，
//! 保证不同硬件和软件版本之间的结果可比。
//!
//! ## 核心特性
//! - 设备内置强度算法：最亮10个像素的算术平均
//! - 种子簇重复样验证：最小跨度三元组 + 固定均值相对容差
//! - 纯函数、无共享状态，可直接在板孔之间并行
//! - JSON测量文件批处理、文本/JSON报告输出

pub mod core;
pub mod error;
pub mod tools;

// 重新导出核心类型
pub use crate::core::{
    IntensityMethod, IntensityStrategy, PixelRegion, ReplicateValidator, ValidationMethod,
    ValidationOutcome, analyze_replicates, extract_intensity, validate_replicates,
};
pub use error::{ErrorCategory, SpotError, SpotResult};
pub use tools::constants::spot_analysis::DEFAULT_CUTOFF;
