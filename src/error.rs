//! 统一错误处理框架
//!
//! 核心算法的四类前置条件错误，加上工具层（文件、格式、资源）的错误类型。
//! 所有错误都在调用边界同步返回，不产生部分结果。

use serde::Serialize;
use std::fmt;
use std::io;

/// 斑点分析相关的统一错误类型
#[derive(Debug)]
pub enum SpotError {
    /// 像素样本数不足（强度提取至少需要10个样本）
    InsufficientData { required: usize, actual: usize },

    /// 重复样数量不足（验证至少需要3个重复样）
    InsufficientReplicates { required: usize, actual: usize },

    /// 配置参数无效（例如负的cutoff）
    InvalidConfig(String),

    /// 数值无效（NaN/Inf），附带第一个出错位置
    InvalidValue { index: usize, value: f64 },

    /// 输入验证错误（命令行参数、像素矩阵形状等）
    InvalidInput(String),

    /// 文件I/O错误
    IoError(io::Error),

    /// 测量文件格式错误
    FormatError(String),

    /// 资源访问错误（线程池等）
    ResourceError(String),
}

impl fmt::Display for SpotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpotError::InsufficientData { required, actual } => write!(
                f,
                "像素样本不足 / Insufficient pixel data: 需要至少 {required} 个样本，实际 {actual} 个"
            ),
            SpotError::InsufficientReplicates { required, actual } => write!(
                f,
                "重复样不足 / Insufficient replicates: 需要至少 {required} 个，实际 {actual} 个"
            ),
            SpotError::InvalidConfig(msg) => write!(f, "配置无效 / Invalid config: {msg}"),
            SpotError::InvalidValue { index, value } => {
                write!(f, "数值无效 / Invalid value: 索引 {index} 处为 {value}")
            }
            SpotError::InvalidInput(msg) => write!(f, "输入验证失败 / Invalid input: {msg}"),
            SpotError::IoError(err) => write!(f, "文件I/O错误 / I/O error: {err}"),
            SpotError::FormatError(msg) => write!(f, "测量文件格式错误 / Format error: {msg}"),
            SpotError::ResourceError(msg) => write!(f, "资源访问错误 / Resource error: {msg}"),
        }
    }
}

impl std::error::Error for SpotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SpotError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for SpotError {
    fn from(err: io::Error) -> Self {
        SpotError::IoError(err)
    }
}

impl From<serde_json::Error> for SpotError {
    fn from(err: serde_json::Error) -> Self {
        SpotError::FormatError(format!("JSON解析失败 / JSON parse failed: {err}"))
    }
}

/// 斑点分析操作的标准Result类型
pub type SpotResult<T> = Result<T, SpotError>;

/// 创建格式错误的helper函数
#[inline]
pub fn format_error<E: fmt::Display>(context: &str, err: E) -> SpotError {
    SpotError::FormatError(format!("{context}: {err}"))
}

// ==================== 错误分类系统 ====================
// 用于批量处理中的错误统计和退出码选择

/// 错误类别枚举（用于批量处理统计）
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// 数据不足（像素或重复样数量）
    Insufficient,
    /// 数值或配置无效
    Invalid,
    /// 格式相关错误（JSON损坏、字段缺失等）
    Format,
    /// I/O相关错误（文件不存在、权限不足等）
    Io,
    /// 其他未分类错误
    Other,
}

impl ErrorCategory {
    /// 从SpotError提取错误类别
    pub fn from_spot_error(e: &SpotError) -> Self {
        match e {
            SpotError::InsufficientData { .. } | SpotError::InsufficientReplicates { .. } => {
                Self::Insufficient
            }
            SpotError::InvalidConfig(_) | SpotError::InvalidValue { .. } => Self::Invalid,
            SpotError::FormatError(_) => Self::Format,
            SpotError::IoError(_) => Self::Io,
            SpotError::InvalidInput(_) | SpotError::ResourceError(_) => Self::Other,
        }
    }

    /// 获取错误类别的显示名称
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Insufficient => "数据不足 / Insufficient data",
            Self::Invalid => "数值无效 / Invalid value",
            Self::Format => "格式错误 / Format error",
            Self::Io => "I/O错误 / I/O error",
            Self::Other => "其他错误 / Other error",
        }
    }
}
