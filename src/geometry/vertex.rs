/// 顶点与顶点集合定义模块
///
/// 扫描网格在分析中只保留顶点位置：法线、UV、拓扑都不参与地标定位。

use crate::core::math::{Point3, Vector3};

/// 三维顶点 (x, y, z)，单位与源网格一致（深度传感器扫描近似为米）
pub type Vertex = Point3;

/// 坐标轴
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// 在 `Point3` 中的分量下标
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// 有序顶点集合
///
/// 保持插入顺序，不要求唯一，允许为空（空集合表示上游提取失败）。
/// 每次上传生成一次、立即消费，不做持久化。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexSet {
    /// 顶点数组
    pub vertices: Vec<Vertex>,
}

impl VertexSet {
    /// 创建一个空的顶点集合
    pub fn new() -> Self {
        Self { vertices: Vec::new() }
    }

    /// 从顶点数组创建
    pub fn from_vertices(vertices: Vec<Vertex>) -> Self {
        Self { vertices }
    }

    /// 从扁平的 `[x0, y0, z0, x1, ...]` 位置数组创建
    ///
    /// # 返回
    ///
    /// - `Err(String)`: 浮点数个数不是3的倍数
    pub fn from_flat_positions(positions: &[f32]) -> Result<Self, String> {
        if positions.len() % 3 != 0 {
            return Err(format!("顶点位置数据不完整: {} 个浮点数", positions.len()));
        }

        let vertices = positions
            .chunks_exact(3)
            .map(|p| Vertex::new(p[0] as f64, p[1] as f64, p[2] as f64))
            .collect();

        Ok(Self { vertices })
    }

    /// 获取顶点数量
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// 按插入顺序遍历顶点
    pub fn iter(&self) -> std::slice::Iter<'_, Vertex> {
        self.vertices.iter()
    }

    /// 收集某一坐标轴上的全部分量
    pub fn axis_values(&self, axis: Axis) -> Vec<f64> {
        let i = axis.index();
        self.vertices.iter().map(|v| v[i]).collect()
    }

    /// 计算质心（各分量的算术平均），空集合返回 `None`
    pub fn centroid(&self) -> Option<Vertex> {
        if self.vertices.is_empty() {
            return None;
        }

        let sum = self.vertices
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + v.coords);

        Some(Vertex::from(sum / self.vertices.len() as f64))
    }
}

impl FromIterator<Vertex> for VertexSet {
    fn from_iter<I: IntoIterator<Item = Vertex>>(iter: I) -> Self {
        Self { vertices: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a VertexSet {
    type Item = &'a Vertex;
    type IntoIter = std::slice::Iter<'a, Vertex>;

    fn into_iter(self) -> Self::IntoIter {
        self.vertices.iter()
    }
}
