/// glTF 文件加载器
///
/// 使用 gltf crate 加载 glTF 2.0 模型，同时支持二进制 `.glb` 和 JSON `.gltf`。
/// 每个网格的每个图元对应一个子网格；只读取 `POSITION` 属性，
/// 不应用节点变换，也不解码纹理图片。

use super::{LoadResult, MeshLoader};
use crate::core::error::MeshLoadError;
use crate::geometry::mesh::{SceneMesh, SubMesh};
use crate::geometry::vertex::Vertex;
use std::path::Path;

/// glTF / GLB 格式加载器
pub struct GltfLoader;

impl GltfLoader {
    /// 解析文档并读取顶点
    ///
    /// `base` 是外部缓冲区 URI 的解析目录；内存加载时为 `None`，
    /// 此时只能使用 GLB 内嵌缓冲区或 data URI。
    fn load_document(data: &[u8], base: Option<&Path>, name: &str) -> LoadResult<SceneMesh> {
        let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(data)
            .map_err(|e| MeshLoadError::parse_failure(format!("glTF 解析 {} 失败", name), e))?;

        let buffers = gltf::import_buffers(&document, base, blob)
            .map_err(|e| MeshLoadError::parse_failure(format!("{} 的缓冲区无法加载", name), e))?;

        let mut scene = SceneMesh::with_name(name);

        for mesh in document.meshes() {
            for primitive in mesh.primitives() {
                let reader = primitive.reader(|buffer| {
                    buffers.get(buffer.index()).map(|data| data.0.as_slice())
                });

                let positions: Vec<Vertex> = reader
                    .read_positions()
                    .map(|iter| {
                        iter.map(|p| Vertex::new(p[0] as f64, p[1] as f64, p[2] as f64))
                            .collect()
                    })
                    .unwrap_or_default();

                scene.submeshes.push(SubMesh::new(mesh.name().map(str::to_string), positions));
            }
        }

        tracing::info!(
            "成功加载 glTF 文件 {}: {} 个子网格, {} 个顶点",
            name,
            scene.submesh_count(),
            scene.total_vertex_count()
        );

        Ok(scene)
    }
}

impl MeshLoader for GltfLoader {
    fn load_from_file(path: &Path) -> LoadResult<SceneMesh> {
        let data = std::fs::read(path)
            .map_err(|e| MeshLoadError::parse_failure(format!("无法读取 {}", path.display()), e))?;

        let name = path.file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("Unnamed");

        Self::load_document(&data, path.parent(), name)
    }

    fn load_from_memory(data: &[u8]) -> LoadResult<SceneMesh> {
        Self::load_document(data, None, "<memory>.glb")
    }

    fn supported_extensions() -> &'static [&'static str] {
        &["glb", "gltf"]
    }
}
