//! 数学库模块
//!
//! 基于 `nalgebra` 提供几何分析所需的类型别名，以及地标定位用到的统计函数。
//!
//! 所有计算使用 `f64`：测量值以毫米报告，源坐标以米为单位，
//! 单精度在换算后误差过大。

use nalgebra::{Point3 as Pt3, Vector3 as Vec3};

/// 三维点
pub type Point3 = Pt3<f64>;

/// 三维向量
pub type Vector3 = Vec3<f64>;

/// 数学常量
pub mod constants {
    /// 浮点数比较的 epsilon
    pub const EPSILON: f64 = 1e-9;
}

/// 统计函数
///
/// 百分位采用包含端点的线性插值定义：对排序后的 `n` 个值，
/// 第 `p` 百分位位于秩 `p / 100 * (n - 1)`，在相邻两个值之间线性插值。
pub mod stats {
    /// 计算百分位数
    ///
    /// `p` 会被限制在 `[0, 100]`。空输入返回 `None`。
    pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let rank = p.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = rank.ceil() as usize;
        let fraction = rank - lower as f64;

        Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
    }

    /// 中位数（第 50 百分位）
    pub fn median(values: &[f64]) -> Option<f64> {
        percentile(values, 50.0)
    }

    /// 算术平均值
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// 总体标准差（除以 `n`，不做自由度修正）
    pub fn std_dev(values: &[f64]) -> Option<f64> {
        let mean = mean(values)?;
        let variance = values.iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>() / values.len() as f64;
        Some(variance.sqrt())
    }
}
