/// OBJ 文件加载器
///
/// 使用 tobj crate 校验 Wavefront OBJ 格式（顶点、面索引）。
/// 顶点取自文件中的 `v` 记录，按文件顺序，与面是否引用无关：
/// 只有顶点没有面的点云也能加载。材质库引用会被忽略。
use super::{LoadResult, MeshLoader};
use crate::core::error::MeshLoadError;
use crate::geometry::mesh::{SceneMesh, SubMesh};
use crate::geometry::vertex::Vertex;
use std::io::{BufReader, Cursor};
use std::path::Path;

/// OBJ 格式加载器
///
/// 每个 `o` 对象对应一个子网格，顺序与文件中一致；
/// 第一个 `o` 之前的顶点组成一个无名子网格。`g` 分组只影响面，不拆分顶点。
///
/// # 使用示例
///
/// ```rust,no_run
/// use face_harmony::geometry::loaders::{MeshLoader, ObjLoader};
/// use std::path::Path;
///
/// let scene = ObjLoader::load_from_file(Path::new("face.obj"))?;
/// println!("加载了 {} 个顶点", scene.total_vertex_count());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ObjLoader;

impl ObjLoader {
    fn load_named(data: &[u8], name: &str) -> LoadResult<SceneMesh> {
        let load_options = tobj::LoadOptions {
            triangulate: true,    // 自动三角化
            ..Default::default()
        };

        let mut reader = BufReader::new(Cursor::new(data));

        // 材质与分析无关，mtllib 一律按缺失处理
        tobj::load_obj_buf(&mut reader, &load_options, |_| {
            Err(tobj::LoadError::OpenFileFailed)
        })
        .map_err(|e| MeshLoadError::parse_failure(format!("tobj 解析 {} 失败", name), e))?;

        let text = std::str::from_utf8(data)
            .map_err(|e| MeshLoadError::parse_failure(format!("{} 不是 UTF-8 文本", name), e))?;

        let mut scene = SceneMesh::with_name(name);
        scene.submeshes = vertex_records(text)
            .map_err(|msg| MeshLoadError::parse_failure(format!("{} 的顶点记录无效", name), msg))?;

        tracing::info!(
            "成功加载 OBJ 文件 {}: {} 个子网格, {} 个顶点",
            name,
            scene.submesh_count(),
            scene.total_vertex_count()
        );

        Ok(scene)
    }
}

/// 按文件顺序收集 `v` 记录，以 `o` 语句切分子网格
///
/// 没有顶点的对象不产生子网格。
fn vertex_records(text: &str) -> Result<Vec<SubMesh>, String> {
    let mut submeshes = Vec::new();
    let mut current = SubMesh::new(None, Vec::new());

    for (line_no, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default();
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("o") => {
                let object = tokens.collect::<Vec<_>>().join(" ");
                let next = SubMesh::new((!object.is_empty()).then_some(object), Vec::new());
                let finished = std::mem::replace(&mut current, next);
                if finished.vertex_count() > 0 {
                    submeshes.push(finished);
                }
            }
            Some("v") => {
                let mut coord = || -> Result<f64, String> {
                    let token = tokens
                        .next()
                        .ok_or_else(|| format!("第 {} 行顶点坐标不足", line_no + 1))?;
                    token
                        .parse::<f64>()
                        .map_err(|e| format!("第 {} 行坐标 '{}': {}", line_no + 1, token, e))
                };
                let (x, y, z) = (coord()?, coord()?, coord()?);
                current.positions.push(Vertex::new(x, y, z));
            }
            _ => {}
        }
    }

    if current.vertex_count() > 0 {
        submeshes.push(current);
    }

    Ok(submeshes)
}

impl MeshLoader for ObjLoader {
    fn load_from_file(path: &Path) -> LoadResult<SceneMesh> {
        let data = std::fs::read(path)
            .map_err(|e| MeshLoadError::parse_failure(format!("无法读取 {}", path.display()), e))?;

        let name = path.file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("Unnamed");

        Self::load_named(&data, name)
    }

    fn load_from_memory(data: &[u8]) -> LoadResult<SceneMesh> {
        Self::load_named(data, "<memory>.obj")
    }

    fn supported_extensions() -> &'static [&'static str] {
        &["obj"]
    }
}
