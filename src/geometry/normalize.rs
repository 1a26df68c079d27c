/// 顶点归一化模块
///
/// 将顶点集合平移到以质心为原点的坐标系，使后续基于坐标轴的启发式规则
/// 与扫描在世界空间中的位置无关。
///
/// 不做尺度归一化：保留源单位下的绝对距离，测量引擎才能用固定系数换算为毫米。

use super::vertex::VertexSet;

/// 以质心为原点重新定位顶点集合
///
/// 输出长度、顺序与输入一致。空集合原样返回空集合。
///
/// # 示例
///
/// ```rust
/// use face_harmony::geometry::{normalize_vertices, Vertex, VertexSet};
///
/// let set = VertexSet::from_vertices(vec![
///     Vertex::new(1.0, 1.0, 1.0),
///     Vertex::new(3.0, 1.0, 1.0),
/// ]);
/// let centered = normalize_vertices(&set);
/// assert_eq!(centered.vertices[0], Vertex::new(-1.0, 0.0, 0.0));
/// ```
pub fn normalize_vertices(vertices: &VertexSet) -> VertexSet {
    let Some(centroid) = vertices.centroid() else {
        return VertexSet::new();
    };

    vertices
        .iter()
        .map(|v| v - centroid.coords)
        .collect()
}
