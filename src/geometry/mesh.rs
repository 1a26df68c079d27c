/// 场景网格数据结构模块
///
/// 一个加载结果可能是包含多个命名子网格的场景（OBJ 的多个对象、
/// glTF 的多个图元）。分析只需要一个面部网格，因此按枚举顺序取第一个子网格。
/// 这个顺序只是文件中的出现顺序，没有语义；采集端通常只打包一张面部网格。

use super::vertex::{Vertex, VertexSet};
use crate::core::error::MeshLoadError;

/// 子网格
#[derive(Debug, Clone, PartialEq)]
pub struct SubMesh {
    /// 子网格名称（OBJ 对象名或 glTF 网格名，可能为空）
    pub name: Option<String>,

    /// 顶点位置，保持文件中的顺序
    pub positions: Vec<Vertex>,
}

impl SubMesh {
    /// 创建一个子网格
    pub fn new(name: Option<String>, positions: Vec<Vertex>) -> Self {
        Self { name, positions }
    }

    /// 获取顶点数量
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// CPU侧场景网格
///
/// 存储从文件加载的子网格列表。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneMesh {
    /// 子网格列表（按枚举顺序）
    pub submeshes: Vec<SubMesh>,

    /// 来源名称（通常为文件名），用于日志
    pub name: Option<String>,
}

impl SceneMesh {
    /// 创建一个空场景
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建一个指定名称的空场景
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            submeshes: Vec::new(),
            name: Some(name.into()),
        }
    }

    /// 子网格数量
    #[inline]
    pub fn submesh_count(&self) -> usize {
        self.submeshes.len()
    }

    /// 所有子网格的顶点总数
    pub fn total_vertex_count(&self) -> usize {
        self.submeshes.iter().map(SubMesh::vertex_count).sum()
    }

    /// 取第一个子网格的顶点作为分析输入
    ///
    /// # 错误
    ///
    /// - 场景没有子网格
    /// - 第一个子网格没有顶点
    pub fn into_first_vertex_set(self) -> Result<VertexSet, MeshLoadError> {
        let label = self.name.unwrap_or_else(|| "<memory>".to_string());

        let first = self.submeshes
            .into_iter()
            .next()
            .ok_or_else(|| MeshLoadError::EmptyGeometry(format!("{} 不包含任何子网格", label)))?;

        if first.positions.is_empty() {
            return Err(MeshLoadError::EmptyGeometry(format!(
                "{} 的第一个子网格 {:?} 没有顶点",
                label, first.name
            )));
        }

        Ok(VertexSet::from_vertices(first.positions))
    }
}
