//! 建议映射
//!
//! 基于阈值的简单规则：测量集合 → 可调整区域列表。

use serde::{Deserialize, Serialize};

use super::measurement::{MeasurementKey, MeasurementSet};

/// 鼻宽比例上限，超过则建议缩窄鼻翼
pub const NOSE_RATIO_THRESHOLD: f64 = 0.5;
/// 下巴突出度下限（毫米）
pub const CHIN_PROJECTION_THRESHOLD_MM: f64 = 12.5;
/// 下颌不对称上限（毫米）
pub const JAW_ASYMMETRY_THRESHOLD_MM: f64 = 3.0;

/// 可调整区域
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisArea {
    pub area: String,
    pub issue: String,
    pub suggestion: String,
    #[serde(default = "default_show_simulation")]
    pub show_simulation: bool,
}

fn default_show_simulation() -> bool { true }

impl AnalysisArea {
    fn new(area: &str, issue: String, suggestion: &str) -> Self {
        Self {
            area: area.to_string(),
            issue,
            suggestion: suggestion.to_string(),
            show_simulation: true,
        }
    }
}

/// 按固定顺序（鼻、下巴、下颌）生成建议
pub fn build_recommendations(measurements: &MeasurementSet) -> Vec<AnalysisArea> {
    let mut areas = Vec::new();

    if let Some(ratio) = measurements.get(MeasurementKey::NoseToIpdRatio) {
        if ratio > NOSE_RATIO_THRESHOLD {
            areas.push(AnalysisArea::new(
                "Nose (alar base)",
                format!(
                    "Alar base slightly wide relative to inter-pupillary distance (ratio={:.2})",
                    ratio
                ),
                "Conservative alar base reduction to narrow nasal width",
            ));
        }
    }

    if let Some(projection) = measurements.get(MeasurementKey::ChinProjectionMm) {
        if projection < CHIN_PROJECTION_THRESHOLD_MM {
            areas.push(AnalysisArea::new(
                "Chin",
                format!("Chin slightly under-projected ({:.1}mm)", projection),
                "Increase chin projection by ~15% (implant or genioplasty)",
            ));
        }
    }

    if let Some(asymmetry) = measurements.get(MeasurementKey::JawAsymmetryMm) {
        if asymmetry > JAW_ASYMMETRY_THRESHOLD_MM {
            areas.push(AnalysisArea::new(
                "Jawline",
                format!("Jawline asymmetry of {:.1}mm detected", asymmetry),
                "2.0mm lateral jawline correction to improve facial balance",
            ));
        }
    }

    areas
}
