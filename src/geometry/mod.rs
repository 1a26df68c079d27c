/// 几何体加载和处理模块
///
/// 提供3D扫描加载功能，支持 OBJ、GLB/glTF 和 USDZ 归档。
/// 包含顶点集合定义、场景网格结构以及顶点归一化。
///
/// # 模块结构
///
/// - `vertex`: 顶点与顶点集合
/// - `mesh`: 场景与子网格结构
/// - `normalize`: 以质心为原点的顶点归一化
/// - `loaders`: 各种格式的模型加载器
///
/// # 架构设计
///
/// ```text
/// 文件 (USDZ/OBJ/GLB/glTF)
///     ↓
/// Loader (UsdzLoader/ObjLoader/GltfLoader)
///     ↓
/// SceneMesh ──► 第一个子网格 ──► VertexSet
///     ↓
/// normalize_vertices
///     ↓
/// 地标定位
/// ```

pub mod vertex;
pub mod mesh;
pub mod normalize;
pub mod loaders;

// 重新导出常用类型
pub use vertex::{Axis, Vertex, VertexSet};
pub use mesh::{SceneMesh, SubMesh};
pub use normalize::normalize_vertices;
pub use loaders::{load_vertices, load_vertices_from_reader, MeshFormat};
