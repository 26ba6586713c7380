//! 测量文件模型
//!
//! 上游图像子系统导出的JSON测量文件：一块板、若干重复样组，
//! 每个斑点给出像素矩阵或已计算好的强度。
//!
//! ```json
//! {
//!   "name": "plate-01",
//!   "cutoff": 0.1,
//!   "groups": [
//!     { "analyte": "IgG", "spots": [ { "pixels": [[1, 2], [3, 4]] }, { "intensity": 812.5 } ] }
//!   ]
//! }
//! ```

use crate::core::{IntensityStrategy, PixelRegion};
use crate::error::{SpotResult, format_error};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 单块板的测量数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// 板名称（缺省时使用文件名）
    #[serde(default)]
    pub name: Option<String>,

    /// 板级cutoff，覆盖命令行值
    #[serde(default)]
    pub cutoff: Option<f64>,

    /// 重复样组
    pub groups: Vec<ReplicateGroup>,
}

/// 同一分析物的一组重复样
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicateGroup {
    /// 分析物名称
    pub analyte: String,

    /// 重复样斑点（顺序即物理重复样编号）
    pub spots: Vec<SpotInput>,
}

/// 单个斑点输入：像素矩阵或预计算强度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpotInput {
    Pixels { pixels: Vec<Vec<f64>> },
    Intensity { intensity: f64 },
}

impl SpotInput {
    /// 得到该斑点的强度：像素矩阵经由提取策略计算，预计算值原样返回
    pub fn resolve(&self, strategy: &impl IntensityStrategy) -> SpotResult<f64> {
        match self {
            SpotInput::Pixels { pixels } => {
                let region = PixelRegion::from_rows(pixels.clone())?;
                strategy.extract(&region)
            }
            SpotInput::Intensity { intensity } => Ok(*intensity),
        }
    }
}

impl Measurement {
    /// 从JSON字符串解析
    pub fn from_json(json: &str) -> SpotResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 读取并解析测量文件
    pub fn load(path: &Path) -> SpotResult<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| format_error(&path.display().to_string(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::IntensityMethod;
    use crate::error::SpotError;

    #[test]
    fn test_parse_mixed_spots() {
        let json = r#"{
            "name": "plate-01",
            "groups": [
                { "analyte": "IgG", "spots": [
                    { "intensity": 10.0 },
                    { "pixels": [[1, 2, 3, 4, 5], [6, 7, 8, 9, 10]] }
                ] }
            ]
        }"#;

        let m = Measurement::from_json(json).unwrap();
        assert_eq!(m.name.as_deref(), Some("plate-01"));
        assert_eq!(m.cutoff, None);
        assert_eq!(m.groups[0].spots.len(), 2);

        let strategy = IntensityMethod::DeviceBuiltin;
        assert_eq!(m.groups[0].spots[0].resolve(&strategy).unwrap(), 10.0);
        assert_eq!(m.groups[0].spots[1].resolve(&strategy).unwrap(), 5.5);
    }

    #[test]
    fn test_missing_groups_is_format_error() {
        let result = Measurement::from_json(r#"{ "name": "x" }"#);
        assert!(matches!(result, Err(SpotError::FormatError(_))));
    }

    #[test]
    fn test_small_pixel_matrix_fails_resolve() {
        let spot = SpotInput::Pixels {
            pixels: vec![vec![1.0, 2.0, 3.0, 4.0, 5.0]],
        };
        assert!(matches!(
            spot.resolve(&IntensityMethod::DeviceBuiltin),
            Err(SpotError::InsufficientData { actual: 5, .. })
        ));
    }
}
