//! 批处理状态管理模块
//!
//! 汇总批量运行中的文件级与重复样组级统计，串行和并行两种实现共享同一份快照结构。

use super::processor::PlateReport;
use crate::error::{ErrorCategory, SpotError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// 批处理统计快照
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchStatsSnapshot {
    /// 成功分析的测量文件数
    pub processed: usize,
    /// 读取或解析失败的测量文件数
    pub failed: usize,
    /// 成功文件中的重复样组总数
    pub groups: usize,
    /// 验证失败的重复样组数
    pub failed_groups: usize,
    /// 被剔除的重复样总数
    pub rejected_replicates: usize,
    /// 文件失败分类（错误类型 -> 文件名列表）
    pub error_stats: HashMap<ErrorCategory, Vec<String>>,
}

impl BatchStatsSnapshot {
    /// 已处理的文件总数（成功 + 失败）
    pub fn total(&self) -> usize {
        self.processed + self.failed
    }

    /// 文件级成功率（百分比），没有文件时为 None
    pub fn success_rate(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| self.processed as f64 / total as f64 * 100.0)
    }
}

/// 串行批处理统计
#[derive(Debug, Default)]
pub struct SerialBatchStats {
    snapshot: BatchStatsSnapshot,
}

impl SerialBatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一块成功分析的板，返回成功文件计数
    pub fn record_report(&mut self, report: &PlateReport) -> usize {
        let s = &mut self.snapshot;
        s.processed += 1;
        s.groups += report.groups.len();
        s.failed_groups += report.failed_groups();
        s.rejected_replicates += report.rejected_replicates();
        s.processed
    }

    /// 记录一个失败文件，返回失败文件计数
    pub fn record_failure(&mut self, error: &SpotError, filename: String) -> usize {
        let s = &mut self.snapshot;
        s.failed += 1;
        s.error_stats
            .entry(ErrorCategory::from_spot_error(error))
            .or_default()
            .push(filename);
        s.failed
    }

    pub fn snapshot(&self) -> BatchStatsSnapshot {
        self.snapshot.clone()
    }
}

/// 并行批处理统计（多线程共享）
///
/// 计数用原子类型，失败分类表用锁
#[derive(Debug, Clone, Default)]
pub struct ParallelBatchStats {
    processed: Arc<AtomicUsize>,
    failed: Arc<AtomicUsize>,
    groups: Arc<AtomicUsize>,
    failed_groups: Arc<AtomicUsize>,
    rejected_replicates: Arc<AtomicUsize>,
    error_stats: Arc<Mutex<HashMap<ErrorCategory, Vec<String>>>>,
}

impl ParallelBatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一块成功分析的板（线程安全）
    pub fn record_report(&self, report: &PlateReport) -> usize {
        self.groups.fetch_add(report.groups.len(), Ordering::Relaxed);
        self.failed_groups
            .fetch_add(report.failed_groups(), Ordering::Relaxed);
        self.rejected_replicates
            .fetch_add(report.rejected_replicates(), Ordering::Relaxed);
        self.processed.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// 记录一个失败文件（线程安全）
    pub fn record_failure(&self, error: &SpotError, filename: String) -> usize {
        let count = self.failed.fetch_add(1, Ordering::Relaxed) + 1;

        if let Ok(mut stats) = self.error_stats.lock() {
            stats
                .entry(ErrorCategory::from_spot_error(error))
                .or_default()
                .push(filename);
        }

        count
    }

    /// 获取统计快照
    ///
    /// 并行完成顺序不确定，每个类别的文件名按字典序排序。
    pub fn snapshot(&self) -> BatchStatsSnapshot {
        let mut error_stats = self
            .error_stats
            .lock()
            .map(|stats| stats.clone())
            .unwrap_or_default();
        for names in error_stats.values_mut() {
            names.sort();
        }

        BatchStatsSnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            groups: self.groups.load(Ordering::Relaxed),
            failed_groups: self.failed_groups.load(Ordering::Relaxed),
            rejected_replicates: self.rejected_replicates.load(Ordering::Relaxed),
            error_stats,
        }
    }
}
