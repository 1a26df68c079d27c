/// 模型加载器模块
///
/// 提供统一的网格加载接口和各种格式的具体实现。
///
/// # 支持的格式
///
/// - **OBJ**: Wavefront OBJ 格式（使用 tobj crate）
/// - **GLB / glTF**: glTF 2.0 二进制与文本格式（使用 gltf crate）
/// - **USDZ**: 打包场景的 zip 归档，解包后查找内嵌的 OBJ/GLB/glTF 再走直接加载路径
///
/// # 加载流程
///
/// ```text
/// 扩展名 ──► MeshFormat ──┬─ 直接格式 (obj/glb/gltf) ──► SceneMesh
///                          └─ 归档格式 (usdz) ──► 临时目录 ──► 直接格式
///                                                     │
///                                          第一个子网格 ──► VertexSet
/// ```
///
/// 不支持的扩展名在任何 IO 之前被拒绝。
///
/// # 使用示例
///
/// ```rust,no_run
/// use face_harmony::geometry::loaders::load_vertices;
/// use std::path::Path;
///
/// let vertices = load_vertices(Path::new("scan.usdz"), "usdz")?;
/// println!("顶点数: {}", vertices.len());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
use crate::core::error::MeshLoadError;
use crate::geometry::mesh::SceneMesh;
use crate::geometry::vertex::VertexSet;
use std::io::Read;
use std::path::Path;

pub mod obj_loader;
pub mod gltf_loader;
pub mod usdz_loader;

// 重新导出加载器
pub use obj_loader::ObjLoader;
pub use gltf_loader::GltfLoader;
pub use usdz_loader::UsdzLoader;

/// 加载器的 Result 类型
pub type LoadResult<T> = std::result::Result<T, MeshLoadError>;

/// 网格加载器 trait
///
/// 所有格式的加载器都实现此 trait。加载器是无状态的（使用静态方法），
/// 只返回 CPU 侧的 `SceneMesh`。
pub trait MeshLoader {
    /// 从文件路径加载场景
    ///
    /// # 错误
    ///
    /// - 文件无法读取或内容损坏：`ParseFailure`
    fn load_from_file(path: &Path) -> LoadResult<SceneMesh>;

    /// 从内存数据加载场景
    fn load_from_memory(data: &[u8]) -> LoadResult<SceneMesh>;

    /// 获取支持的文件扩展名列表（小写，不含点号）
    fn supported_extensions() -> &'static [&'static str];
}

/// 支持的网格容器格式
///
/// 分为两类：直接包含网格的格式，以及包装其他格式的归档格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    /// Wavefront OBJ 文本格式
    Obj,
    /// glTF 二进制容器
    Glb,
    /// glTF JSON 文本
    Gltf,
    /// USDZ zip 归档
    Usdz,
}

impl MeshFormat {
    /// 所有支持的格式
    pub const ALL: [MeshFormat; 4] = [MeshFormat::Usdz, MeshFormat::Obj, MeshFormat::Glb, MeshFormat::Gltf];

    /// 根据扩展名解析格式（大小写不敏感，允许前导点号）
    ///
    /// # 错误
    ///
    /// 扩展名不在 `usdz|obj|glb|gltf` 中时返回 `UnsupportedFormat`
    pub fn from_extension(extension: &str) -> LoadResult<Self> {
        let normalized = extension.trim().trim_start_matches('.').to_ascii_lowercase();

        match normalized.as_str() {
            "obj" => Ok(MeshFormat::Obj),
            "glb" => Ok(MeshFormat::Glb),
            "gltf" => Ok(MeshFormat::Gltf),
            "usdz" => Ok(MeshFormat::Usdz),
            _ => Err(MeshLoadError::UnsupportedFormat(normalized)),
        }
    }

    /// 根据文件路径的扩展名解析格式
    pub fn from_path(path: &Path) -> LoadResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        Self::from_extension(extension)
    }

    /// 规范扩展名
    pub fn extension(&self) -> &'static str {
        match self {
            MeshFormat::Obj => "obj",
            MeshFormat::Glb => "glb",
            MeshFormat::Gltf => "gltf",
            MeshFormat::Usdz => "usdz",
        }
    }

    /// 是否为需要先解包的归档格式
    pub fn is_archive(&self) -> bool {
        matches!(self, MeshFormat::Usdz)
    }

    /// 按格式从文件加载场景
    pub fn load_scene_from_file(&self, path: &Path) -> LoadResult<SceneMesh> {
        match self {
            MeshFormat::Obj => ObjLoader::load_from_file(path),
            MeshFormat::Glb | MeshFormat::Gltf => GltfLoader::load_from_file(path),
            MeshFormat::Usdz => UsdzLoader::load_from_file(path),
        }
    }

    /// 按格式从内存加载场景
    pub fn load_scene_from_memory(&self, data: &[u8]) -> LoadResult<SceneMesh> {
        match self {
            MeshFormat::Obj => ObjLoader::load_from_memory(data),
            MeshFormat::Glb | MeshFormat::Gltf => GltfLoader::load_from_memory(data),
            MeshFormat::Usdz => UsdzLoader::load_from_memory(data),
        }
    }
}

/// 根据文件扩展名选择合适的加载器，返回完整场景
pub fn load_mesh(path: &Path) -> LoadResult<SceneMesh> {
    MeshFormat::from_path(path)?.load_scene_from_file(path)
}

/// 加载网格文件并取第一个子网格的顶点
///
/// # 参数
///
/// - `path`: 文件路径
/// - `extension`: 格式提示（`usdz|obj|glb|gltf`），优先于路径自身的扩展名
///
/// # 错误
///
/// - `UnsupportedFormat`: 扩展名不受支持，此时不会读取文件
/// - `ParseFailure`: 文件无法读取或内容损坏
/// - `EmptyGeometry`: 没有子网格或第一个子网格没有顶点
pub fn load_vertices(path: &Path, extension: &str) -> LoadResult<VertexSet> {
    let format = MeshFormat::from_extension(extension)?;
    let scene = format.load_scene_from_file(path)?;

    log_scene(&scene, format);
    scene.into_first_vertex_set()
}

/// 从字节流加载网格并取第一个子网格的顶点
///
/// glTF 文本格式引用的外部 `.bin` 无法从字节流中解析，需要使用 [`load_vertices`]。
pub fn load_vertices_from_reader<R: Read>(mut reader: R, extension: &str) -> LoadResult<VertexSet> {
    let format = MeshFormat::from_extension(extension)?;

    let mut data = Vec::new();
    reader
        .read_to_end(&mut data)
        .map_err(|e| MeshLoadError::parse_failure(format!("读取 .{} 字节流失败", format.extension()), e))?;

    let scene = format.load_scene_from_memory(&data)?;

    log_scene(&scene, format);
    scene.into_first_vertex_set()
}

fn log_scene(scene: &SceneMesh, format: MeshFormat) {
    if scene.submesh_count() > 1 {
        tracing::debug!(
            format = format.extension(),
            submeshes = scene.submesh_count(),
            "场景包含多个子网格，使用第一个"
        );
    }
}
