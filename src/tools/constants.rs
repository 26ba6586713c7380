//! 常量和默认配置集中管理
//!
//! 算法常量、默认配置与并发度限制

/// 斑点分析算法常量
pub mod spot_analysis {
    /// 设备内置算法取最亮像素的个数
    ///
    /// 与MCR读板仪固件一致：取最亮的10个像素求平均
    pub const TOP_PIXEL_COUNT: usize = 10;

    /// 强度提取所需的最少像素样本数
    pub const MIN_PIXEL_SAMPLES: usize = TOP_PIXEL_COUNT;

    /// 种子簇大小（按数值最接近的3个重复样）
    pub const SEED_CLUSTER_SIZE: usize = 3;

    /// 验证所需的最少重复样数量
    pub const MIN_REPLICATES: usize = SEED_CLUSTER_SIZE;

    /// 默认相对容差（种子均值的比例）
    pub const DEFAULT_CUTOFF: f64 = 0.1;
}

/// 默认配置值
pub mod defaults {
    /// 默认多文件并行并发度
    pub const PARALLEL_FILES_DEGREE: usize = 4;

    /// 测量文件扩展名
    pub const MEASUREMENT_EXTENSION: &str = "json";

    /// 单文件报告后缀
    pub const REPORT_SUFFIX: &str = "_Replicate_Analysis";

    /// 批量汇总报告后缀
    pub const BATCH_REPORT_SUFFIX: &str = "_BatchReplicate_Results";
}

/// 并发度限制常量
pub mod parallel_limits {
    /// 最小并发度
    pub const MIN_PARALLEL_DEGREE: usize = 1;

    /// 最大并发度
    pub const MAX_PARALLEL_DEGREE: usize = 16;
}
