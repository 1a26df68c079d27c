/// 地标定位能力
///
/// 定位器接收已归一化的顶点集合，返回部分地标集合。
/// 找不到的地标直接缺席，不产生错误。

use super::{HeuristicLocator, LandmarkSet};
use crate::core::config::LocatorKind;
use crate::geometry::VertexSet;

/// 地标定位器
///
/// 输入假设为 Z 轴朝前、Y 轴朝上的坐标系。
pub trait LandmarkLocator: Send + Sync {
    /// 定位器名称，用于日志
    fn name(&self) -> &'static str;

    /// 在归一化顶点中定位地标
    fn locate(&self, vertices: &VertexSet) -> LandmarkSet;
}

/// 按配置创建定位器
pub fn locator_for(kind: LocatorKind) -> Box<dyn LandmarkLocator> {
    match kind {
        LocatorKind::Heuristic => Box::new(HeuristicLocator::new()),
    }
}
