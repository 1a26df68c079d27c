//! 面部测量与分析模块
//!
//! - `measurement`: 地标 → 测量集合（带回退常量）
//! - `recommendation`: 测量集合 → 可调整区域
//! - `pipeline`: 扫描/地标载荷 → `AnalysisResult` 的完整流程

pub mod measurement;
pub mod recommendation;
pub mod pipeline;

pub use measurement::{MeasurementEngine, MeasurementKey, MeasurementSet, METERS_TO_MILLIMETERS};
pub use recommendation::{build_recommendations, AnalysisArea};
pub use pipeline::{AnalysisResult, FaceAnalyzer};
