//! 测量引擎
//!
//! 把命名地标集合转换为固定词表的测量集合。每条规则依赖特定地标，
//! 缺少时使用文档约定的回退常量，因此输出永远完整且全部为有限值。
//!
//! 源坐标假定为米（采集管线的约定，未经验证），
//! 通过 [`METERS_TO_MILLIMETERS`] 在边界处换算为毫米。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::core::config::AnalysisConfig;
use crate::core::math::constants::EPSILON;
use crate::landmark::{LandmarkName, LandmarkSet};

/// 米到毫米的换算系数
pub const METERS_TO_MILLIMETERS: f64 = 1000.0;

/// 鼻翼宽度相对瞳距的估计比例
///
/// 这是固定的比例假设而非实测，因此 `nose_to_ipd_ratio` 当前恒等于该值。
pub const NASAL_WIDTH_TO_IPD: f64 = 0.4;

/// 回退常量
pub mod fallback {
    pub const NOSE_TO_IPD_RATIO: f64 = 0.52;
    pub const CHIN_PROJECTION_MM: f64 = 11.8;
    pub const JAW_ASYMMETRY_MM: f64 = 5.3;
}

/// 测量项
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementKey {
    NoseToIpdRatio,
    ChinProjectionMm,
    JawAsymmetryMm,
    /// 可选项，只在前额与下巴都存在时输出，没有回退值
    FaceHeightMm,
}

impl MeasurementKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementKey::NoseToIpdRatio => "nose_to_ipd_ratio",
            MeasurementKey::ChinProjectionMm => "chin_projection_mm",
            MeasurementKey::JawAsymmetryMm => "jaw_asymmetry_mm",
            MeasurementKey::FaceHeightMm => "face_height_mm",
        }
    }

    /// 回退值，可选项返回 `None`
    pub fn fallback(&self) -> Option<f64> {
        match self {
            MeasurementKey::NoseToIpdRatio => Some(fallback::NOSE_TO_IPD_RATIO),
            MeasurementKey::ChinProjectionMm => Some(fallback::CHIN_PROJECTION_MM),
            MeasurementKey::JawAsymmetryMm => Some(fallback::JAW_ASYMMETRY_MM),
            MeasurementKey::FaceHeightMm => None,
        }
    }

    /// 必须出现在结果中的测量项
    pub const REQUIRED: [MeasurementKey; 3] = [
        MeasurementKey::NoseToIpdRatio,
        MeasurementKey::ChinProjectionMm,
        MeasurementKey::JawAsymmetryMm,
    ];
}

impl fmt::Display for MeasurementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 测量集合
///
/// 序列化为 `{"nose_to_ipd_ratio": 0.4, ...}`。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasurementSet {
    values: BTreeMap<MeasurementKey, f64>,
}

impl MeasurementSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: MeasurementKey) -> Option<f64> {
        self.values.get(&key).copied()
    }

    pub fn contains(&self, key: MeasurementKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeasurementKey, f64)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    /// 写入有限值；非有限值被丢弃并返回 `false`
    fn set(&mut self, key: MeasurementKey, value: f64) -> bool {
        if !value.is_finite() {
            tracing::warn!(key = %key, value, "丢弃非有限测量值");
            return false;
        }
        self.values.insert(key, value);
        true
    }
}

/// 测量引擎
#[derive(Debug, Clone, Copy)]
pub struct MeasurementEngine {
    /// 源坐标单位到毫米的系数
    unit_scale: f64,
}

impl Default for MeasurementEngine {
    fn default() -> Self {
        Self::new(METERS_TO_MILLIMETERS)
    }
}

impl MeasurementEngine {
    pub fn new(unit_scale: f64) -> Self {
        Self { unit_scale }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.unit_scale_to_mm)
    }

    pub fn unit_scale(&self) -> f64 {
        self.unit_scale
    }

    /// 瞳距（源坐标单位）
    ///
    /// 优先使用外眼角，缺失时用内眼角代替；两对都不完整，
    /// 或距离不是正的有限值时返回 `None`。
    pub fn inter_pupillary_distance(&self, landmarks: &LandmarkSet) -> Option<f64> {
        let pair = |left, right| Some((landmarks.get(left)?, landmarks.get(right)?));

        let (left, right) = pair(LandmarkName::LeftEyeOuter, LandmarkName::RightEyeOuter)
            .or_else(|| pair(LandmarkName::LeftEyeInner, LandmarkName::RightEyeInner))?;

        let ipd = nalgebra::distance(left, right);
        (ipd.is_finite() && ipd > EPSILON).then_some(ipd)
    }

    /// 只计算地标足以支持的测量项，不填充回退值
    pub fn measure_raw(&self, landmarks: &LandmarkSet) -> MeasurementSet {
        let mut set = MeasurementSet::new();

        if let (Some(_), Some(ipd)) = (
            landmarks.get(LandmarkName::NoseTip),
            self.inter_pupillary_distance(landmarks),
        ) {
            let nasal_width = NASAL_WIDTH_TO_IPD * ipd;
            set.set(MeasurementKey::NoseToIpdRatio, nasal_width / ipd);
        }

        if let (Some(chin), Some(nose)) = (
            landmarks.get(LandmarkName::Chin),
            landmarks.get(LandmarkName::NoseTip),
        ) {
            set.set(
                MeasurementKey::ChinProjectionMm,
                (chin.z - nose.z).abs() * self.unit_scale,
            );
        }

        if let (Some(left), Some(right)) = (
            landmarks.get(LandmarkName::MouthLeft),
            landmarks.get(LandmarkName::MouthRight),
        ) {
            let vertical = (left.y - right.y).abs();
            let horizontal = (left.x.abs() - right.x.abs()).abs();
            set.set(
                MeasurementKey::JawAsymmetryMm,
                vertical.hypot(horizontal) * self.unit_scale,
            );
        }

        if let (Some(forehead), Some(chin)) = (
            landmarks.get(LandmarkName::ForeheadCenter),
            landmarks.get(LandmarkName::Chin),
        ) {
            set.set(
                MeasurementKey::FaceHeightMm,
                nalgebra::distance(forehead, chin) * self.unit_scale,
            );
        }

        set
    }

    /// 计算完整测量集合
    ///
    /// 缺失的必需项用回退常量填充；`face_height_mm` 不会由回退产生。
    pub fn measure(&self, landmarks: &LandmarkSet) -> MeasurementSet {
        let mut set = self.measure_raw(landmarks);

        for key in MeasurementKey::REQUIRED {
            if !set.contains(key) {
                if let Some(value) = key.fallback() {
                    tracing::debug!(key = %key, value, "使用回退值");
                    set.set(key, value);
                }
            }
        }

        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::Point3;
    use approx::assert_relative_eq;

    fn landmarks(points: &[(LandmarkName, [f64; 3])]) -> LandmarkSet {
        points
            .iter()
            .map(|(name, p)| (*name, Point3::new(p[0], p[1], p[2])))
            .collect()
    }

    #[test]
    fn test_empty_set_gives_fallbacks() {
        let set = MeasurementEngine::default().measure(&LandmarkSet::new());

        assert_eq!(set.len(), 3);
        assert_eq!(set.get(MeasurementKey::NoseToIpdRatio), Some(0.52));
        assert_eq!(set.get(MeasurementKey::ChinProjectionMm), Some(11.8));
        assert_eq!(set.get(MeasurementKey::JawAsymmetryMm), Some(5.3));
        assert!(!set.contains(MeasurementKey::FaceHeightMm));
    }

    #[test]
    fn test_chin_projection() {
        let set = MeasurementEngine::default().measure(&landmarks(&[
            (LandmarkName::Chin, [0.0, 0.0, 0.0]),
            (LandmarkName::NoseTip, [0.0, 0.0, 0.012]),
        ]));

        assert_relative_eq!(
            set.get(MeasurementKey::ChinProjectionMm).unwrap(),
            12.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_jaw_asymmetry_combines_components() {
        let set = MeasurementEngine::default().measure(&landmarks(&[
            (LandmarkName::MouthLeft, [-0.01, 0.002, 0.0]),
            (LandmarkName::MouthRight, [0.01, -0.001, 0.0]),
        ]));

        assert_relative_eq!(
            set.get(MeasurementKey::JawAsymmetryMm).unwrap(),
            3.0,
            epsilon = 1e-3
        );

        let skewed = MeasurementEngine::default().measure(&landmarks(&[
            (LandmarkName::MouthLeft, [-0.014, 0.003, 0.0]),
            (LandmarkName::MouthRight, [0.010, 0.0, 0.0]),
        ]));
        // hypot(3mm, 4mm)
        assert_relative_eq!(
            skewed.get(MeasurementKey::JawAsymmetryMm).unwrap(),
            5.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_ratio_without_eyes_falls_back() {
        let set = MeasurementEngine::default().measure(&landmarks(&[
            (LandmarkName::NoseTip, [0.0, 0.0, 0.02]),
        ]));
        assert_eq!(set.get(MeasurementKey::NoseToIpdRatio), Some(0.52));
    }

    #[test]
    fn test_ratio_with_outer_eyes() {
        let set = MeasurementEngine::default().measure(&landmarks(&[
            (LandmarkName::NoseTip, [0.0, 0.0, 0.02]),
            (LandmarkName::LeftEyeOuter, [-0.032, 0.03, 0.0]),
            (LandmarkName::RightEyeOuter, [0.031, 0.03, 0.0]),
        ]));
        assert_relative_eq!(set.get(MeasurementKey::NoseToIpdRatio).unwrap(), 0.4);
    }

    #[test]
    fn test_ipd_uses_inner_eyes_as_substitute() {
        let engine = MeasurementEngine::default();
        let set = landmarks(&[
            (LandmarkName::LeftEyeOuter, [-0.03, 0.0, 0.0]),
            (LandmarkName::LeftEyeInner, [-0.015, 0.0, 0.0]),
            (LandmarkName::RightEyeInner, [0.015, 0.0, 0.0]),
        ]);

        assert_relative_eq!(engine.inter_pupillary_distance(&set).unwrap(), 0.03);
    }

    #[test]
    fn test_zero_ipd_is_undefined() {
        let engine = MeasurementEngine::default();
        let set = landmarks(&[
            (LandmarkName::NoseTip, [0.0, 0.0, 0.02]),
            (LandmarkName::LeftEyeOuter, [0.0, 0.0, 0.0]),
            (LandmarkName::RightEyeOuter, [0.0, 0.0, 0.0]),
        ]);

        assert!(engine.inter_pupillary_distance(&set).is_none());
        assert_eq!(engine.measure(&set).get(MeasurementKey::NoseToIpdRatio), Some(0.52));
    }

    #[test]
    fn test_face_height_only_when_present() {
        let engine = MeasurementEngine::default();

        let chin_only = landmarks(&[(LandmarkName::Chin, [0.0, -0.1, 0.0])]);
        assert!(!engine.measure(&chin_only).contains(MeasurementKey::FaceHeightMm));

        let both = landmarks(&[
            (LandmarkName::Chin, [0.0, -0.1, 0.0]),
            (LandmarkName::ForeheadCenter, [0.0, 0.09, 0.0]),
        ]);
        assert_relative_eq!(
            engine.measure(&both).get(MeasurementKey::FaceHeightMm).unwrap(),
            190.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_raw_has_no_fallbacks() {
        let set = MeasurementEngine::default().measure_raw(&LandmarkSet::new());
        assert!(set.is_empty());
    }

    #[test]
    fn test_unit_scale_is_applied() {
        let engine = MeasurementEngine::new(10.0);
        let set = engine.measure(&landmarks(&[
            (LandmarkName::Chin, [0.0, 0.0, 0.0]),
            (LandmarkName::NoseTip, [0.0, 0.0, 1.2]),
        ]));
        assert_relative_eq!(set.get(MeasurementKey::ChinProjectionMm).unwrap(), 12.0);
    }

    #[test]
    fn test_non_finite_measurement_replaced_by_fallback() {
        let set = MeasurementEngine::default().measure(&landmarks(&[
            (LandmarkName::Chin, [0.0, 0.0, f64::MAX]),
            (LandmarkName::NoseTip, [0.0, 0.0, -f64::MAX]),
        ]));
        assert_eq!(set.get(MeasurementKey::ChinProjectionMm), Some(11.8));
    }

    #[test]
    fn test_serialized_keys() {
        let set = MeasurementEngine::default().measure(&LandmarkSet::new());
        let json = serde_json::to_value(&set).unwrap();

        assert_eq!(json["nose_to_ipd_ratio"], 0.52);
        assert_eq!(json["chin_projection_mm"], 11.8);
        assert_eq!(json["jaw_asymmetry_mm"], 5.3);
        assert!(json.get("face_height_mm").is_none());
    }
}
