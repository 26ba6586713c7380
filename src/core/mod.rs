//! 核心算法模块
//!
//! 包含斑点强度提取和重复样验证两个无状态纯函数组件。

pub mod intensity;
pub mod pixel_region;
pub mod validator;

// 重新导出公共接口
pub use intensity::{IntensityMethod, IntensityStrategy, extract_intensity};
pub use pixel_region::PixelRegion;
pub use validator::{
    ReplicateValidator, ValidationMethod, ValidationOutcome, analyze_replicates,
    validate_replicates,
};
