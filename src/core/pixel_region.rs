//! 斑点像素区域数据结构
//!
//! 行优先存储的二维像素网格，由上游的图像/ROI子系统提供。
//! 提取过程中只读，不做任何就地修改。

use crate::error::{SpotError, SpotResult};

/// 单个斑点的二维像素区域（行优先）
#[derive(Debug, Clone, PartialEq)]
pub struct PixelRegion {
    samples: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl PixelRegion {
    /// 从行优先的扁平样本创建像素区域
    ///
    /// `samples.len()` 必须等于 `rows * cols`，否则返回 `InvalidInput`。
    ///
    /// # 示例
    ///
    /// ```rust
    /// use mcr_spot_tool::core::PixelRegion;
    ///
    /// let region = PixelRegion::new(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
    /// assert_eq!(region.len(), 6);
    /// assert_eq!(region.row(1), &[4.0, 5.0, 6.0]);
    /// ```
    pub fn new(rows: usize, cols: usize, samples: Vec<f64>) -> SpotResult<Self> {
        let expected = rows.checked_mul(cols).ok_or_else(|| {
            SpotError::InvalidInput(format!("像素区域尺寸溢出 / Region too large: {rows}x{cols}"))
        })?;

        if samples.len() != expected {
            return Err(SpotError::InvalidInput(format!(
                "像素数量与尺寸不符 / Sample count mismatch: {rows}x{cols} 需要 {expected} 个，实际 {}",
                samples.len()
            )));
        }

        Ok(Self {
            samples,
            rows,
            cols,
        })
    }

    /// 从按行嵌套的矩阵创建像素区域
    ///
    /// 所有行必须等长（不接受锯齿矩阵）。
    pub fn from_rows(rows: Vec<Vec<f64>>) -> SpotResult<Self> {
        let row_count = rows.len();
        let cols = rows.first().map_or(0, Vec::len);

        if let Some((index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(SpotError::InvalidInput(format!(
                "像素矩阵行长度不一致 / Ragged pixel rows: 第 {index} 行长度 {}，期望 {cols}",
                row.len()
            )));
        }

        let samples: Vec<f64> = rows.into_iter().flatten().collect();
        Self::new(row_count, cols, samples)
    }

    /// 从16位相机原始数据创建像素区域
    pub fn from_u16(rows: usize, cols: usize, raw: &[u16]) -> SpotResult<Self> {
        Self::new(rows, cols, raw.iter().map(|&v| v as f64).collect())
    }

    /// 行数
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// 列数
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// 样本总数
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// 扁平化后的全部样本（行优先）
    #[inline]
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// 获取第 `index` 行
    ///
    /// # Panics
    ///
    /// 行索引越界时panic，与切片索引一致。
    pub fn row(&self, index: usize) -> &[f64] {
        let start = index * self.cols;
        &self.samples[start..start + self.cols]
    }
}
