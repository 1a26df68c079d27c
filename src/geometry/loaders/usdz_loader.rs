/// USDZ 归档加载器
///
/// USDZ 是一个 zip 归档。采集端会把面部网格以 OBJ/GLB/glTF 形式打包进去，
/// 因此加载流程为：
///
/// 1. 解包到本次请求独占的临时目录
/// 2. 按目录遍历顺序查找第一个受支持的内嵌网格，交给直接格式加载器
/// 3. 找不到内嵌网格时，尝试把归档字节直接当作通用场景网格解析
///
/// 临时目录由 `tempfile::TempDir` 持有，函数返回（包括任何错误路径）时即被删除。

use super::{GltfLoader, LoadResult, MeshFormat, MeshLoader, ObjLoader};
use crate::core::error::MeshLoadError;
use crate::geometry::mesh::SceneMesh;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

const WORKSPACE_PREFIX: &str = "face_harmony_usdz_";

/// USDZ 格式加载器
pub struct UsdzLoader;

impl UsdzLoader {
    /// 解包并加载归档
    ///
    /// `workspace_root` 指定临时目录的父目录，`None` 时使用系统临时目录。
    pub fn load_archive_in(
        data: &[u8],
        name: &str,
        workspace_root: Option<&Path>,
    ) -> LoadResult<SceneMesh> {
        match Self::load_embedded(data, name, workspace_root) {
            Ok(Some(scene)) => Ok(scene),
            Ok(None) => {
                tracing::warn!("{} 中没有内嵌的 OBJ/GLB/glTF 网格，尝试直接解析归档", name);
                load_generic_scene(data).map_err(|e| {
                    MeshLoadError::EmptyGeometry(format!("{} 不包含可用的网格: {}", name, e))
                })
            }
            Err(archive_err) => {
                tracing::warn!("{} 解包失败 ({})，尝试直接解析", name, archive_err);
                load_generic_scene(data).map_err(|_| archive_err)
            }
        }
    }

    /// 解包到临时目录并加载第一个内嵌网格
    ///
    /// 归档中没有受支持的网格时返回 `Ok(None)`。
    fn load_embedded(
        data: &[u8],
        name: &str,
        workspace_root: Option<&Path>,
    ) -> LoadResult<Option<SceneMesh>> {
        let mut archive = ZipArchive::new(Cursor::new(data))
            .map_err(|e| MeshLoadError::parse_failure(format!("{} 不是有效的 zip 归档", name), e))?;

        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let workspace = match workspace_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| MeshLoadError::parse_failure("无法创建临时解包目录", e))?;

        archive
            .extract(workspace.path())
            .map_err(|e| MeshLoadError::parse_failure(format!("{} 解包失败", name), e))?;

        let Some((mesh_path, format)) = find_embedded_mesh(workspace.path())
            .map_err(|e| MeshLoadError::parse_failure("无法遍历解包目录", e))?
        else {
            return Ok(None);
        };

        tracing::debug!(
            archive = name,
            embedded = %mesh_path.display(),
            "找到内嵌网格"
        );

        // 内嵌网格必须在 workspace 被删除之前加载完
        let scene = format.load_scene_from_file(&mesh_path)?;
        drop(workspace);

        Ok(Some(scene))
    }
}

impl MeshLoader for UsdzLoader {
    fn load_from_file(path: &Path) -> LoadResult<SceneMesh> {
        let data = std::fs::read(path)
            .map_err(|e| MeshLoadError::parse_failure(format!("无法读取 {}", path.display()), e))?;

        let name = path.file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("Unnamed");

        Self::load_archive_in(&data, name, None)
    }

    fn load_from_memory(data: &[u8]) -> LoadResult<SceneMesh> {
        Self::load_archive_in(data, "<memory>.usdz", None)
    }

    fn supported_extensions() -> &'static [&'static str] {
        &["usdz"]
    }
}

/// 按目录遍历顺序查找第一个直接格式的网格文件
///
/// 每层先检查文件再进入子目录，同层按名称排序以保证结果确定。
fn find_embedded_mesh(dir: &Path) -> std::io::Result<Option<(PathBuf, MeshFormat)>> {
    let mut entries = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();

    let (subdirs, files): (Vec<PathBuf>, Vec<PathBuf>) = entries.into_iter().partition(|p| p.is_dir());

    for file in files {
        if let Ok(format) = MeshFormat::from_path(&file) {
            if !format.is_archive() {
                return Ok(Some((file, format)));
            }
        }
    }

    for subdir in subdirs {
        if let Some(found) = find_embedded_mesh(&subdir)? {
            return Ok(Some(found));
        }
    }

    Ok(None)
}

/// 将任意字节当作通用场景网格解析
///
/// 以 glTF 魔数或 JSON 开头的数据交给 glTF 加载器，其余按 OBJ 文本解析。
fn load_generic_scene(data: &[u8]) -> LoadResult<SceneMesh> {
    let looks_like_gltf = data.starts_with(b"glTF")
        || data.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'{');

    let scene = if looks_like_gltf {
        GltfLoader::load_from_memory(data)?
    } else {
        ObjLoader::load_from_memory(data)?
    };

    if scene.total_vertex_count() == 0 {
        return Err(MeshLoadError::EmptyGeometry("通用解析未得到任何顶点".to_string()));
    }

    Ok(scene)
}
