//! 面部地标模块
//!
//! 定义固定的地标词表、地标集合，以及客户端直接提交的地标载荷格式。
//!
//! # 模块结构
//!
//! - `locator`: 地标定位能力（`VertexSet` → 部分地标集合）与按配置选择实现
//! - `heuristic`: 基于坐标极值与百分位分区的启发式定位器
//!
//! 地标集合中每个名称最多出现一次；任何名称都可能缺失，
//! 缺失以结构方式表达（集合中没有该键），不会产生错误。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::core::math::Point3;

pub mod locator;
pub mod heuristic;

pub use locator::{locator_for, LandmarkLocator};
pub use heuristic::HeuristicLocator;

/// 地标名称词表
///
/// 声明顺序即集合的遍历顺序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkName {
    NoseTip,
    Chin,
    ForeheadCenter,
    LeftEyeOuter,
    LeftEyeInner,
    RightEyeOuter,
    RightEyeInner,
    MouthLeft,
    MouthRight,
    MouthCenter,
}

impl LandmarkName {
    /// 完整词表
    pub const ALL: [LandmarkName; 10] = [
        LandmarkName::NoseTip,
        LandmarkName::Chin,
        LandmarkName::ForeheadCenter,
        LandmarkName::LeftEyeOuter,
        LandmarkName::LeftEyeInner,
        LandmarkName::RightEyeOuter,
        LandmarkName::RightEyeInner,
        LandmarkName::MouthLeft,
        LandmarkName::MouthRight,
        LandmarkName::MouthCenter,
    ];

    /// 线上使用的标识符
    pub fn as_str(&self) -> &'static str {
        match self {
            LandmarkName::NoseTip => "nose_tip",
            LandmarkName::Chin => "chin",
            LandmarkName::ForeheadCenter => "forehead_center",
            LandmarkName::LeftEyeOuter => "left_eye_outer",
            LandmarkName::LeftEyeInner => "left_eye_inner",
            LandmarkName::RightEyeOuter => "right_eye_outer",
            LandmarkName::RightEyeInner => "right_eye_inner",
            LandmarkName::MouthLeft => "mouth_left",
            LandmarkName::MouthRight => "mouth_right",
            LandmarkName::MouthCenter => "mouth_center",
        }
    }
}

impl fmt::Display for LandmarkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LandmarkName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LandmarkName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| format!("unknown landmark '{}'", s))
    }
}

/// 客户端提交的单个地标记录
///
/// `x`、`y`、`z` 必填；`name` 可选，没有名称的记录无法识别，不参与测量。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkRecord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl LandmarkRecord {
    /// 创建一个命名记录
    pub fn named(name: LandmarkName, point: &Point3) -> Self {
        Self {
            x: point.x,
            y: point.y,
            z: point.z,
            name: Some(name.as_str().to_string()),
        }
    }

    /// 无名称的原点记录，网格解析失败时的退化地标
    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0, name: None }
    }

    /// 坐标
    pub fn point(&self) -> Point3 {
        Point3::new(self.x, self.y, self.z)
    }
}

/// 地标分析请求
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkRequest {
    /// 有序地标记录
    pub landmarks: Vec<LandmarkRecord>,

    /// 采集设备描述，仅作记录
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,

    /// 关联的图像或帧引用，仅作记录
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
}

/// 命名地标集合
///
/// 每个名称最多一个点。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkSet {
    points: BTreeMap<LandmarkName, Point3>,
}

impl LandmarkSet {
    /// 创建一个空集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入地标，名称已存在时保留先插入的点并返回 `false`
    pub fn insert(&mut self, name: LandmarkName, point: Point3) -> bool {
        match self.points.entry(name) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(point);
                true
            }
        }
    }

    pub fn get(&self, name: LandmarkName) -> Option<&Point3> {
        self.points.get(&name)
    }

    pub fn contains(&self, name: LandmarkName) -> bool {
        self.points.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 按词表顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (LandmarkName, &Point3)> {
        self.points.iter().map(|(name, point)| (*name, point))
    }

    /// 从客户端记录构建
    ///
    /// 无名称、名称不在词表中、坐标非有限值的记录会被跳过；
    /// 同名记录只保留第一条。
    pub fn from_records(records: &[LandmarkRecord]) -> Self {
        let mut set = Self::new();

        for (index, record) in records.iter().enumerate() {
            let Some(raw_name) = record.name.as_deref() else {
                continue;
            };

            let name = match raw_name.parse::<LandmarkName>() {
                Ok(name) => name,
                Err(_) => {
                    tracing::debug!(index, name = raw_name, "忽略未知地标名称");
                    continue;
                }
            };

            let point = record.point();
            if !point.iter().all(|c| c.is_finite()) {
                tracing::debug!(index, %name, "忽略坐标非有限值的地标");
                continue;
            }

            if !set.insert(name, point) {
                tracing::debug!(index, %name, "忽略重复地标");
            }
        }

        set
    }

    /// 转换为带名称的记录，按词表顺序
    pub fn to_records(&self) -> Vec<LandmarkRecord> {
        self.iter()
            .map(|(name, point)| LandmarkRecord::named(name, point))
            .collect()
    }
}

impl FromIterator<(LandmarkName, Point3)> for LandmarkSet {
    fn from_iter<I: IntoIterator<Item = (LandmarkName, Point3)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, point) in iter {
            set.insert(name, point);
        }
        set
    }
}
