//! 分析管线
//!
//! ```text
//! 扫描文件 ──► load_vertices ──► normalize_vertices ──► LandmarkLocator ──► 地标记录
//!                   │ (可恢复错误)                                          │
//!                   └──────────► 单个原点记录 ──────────────────────────────┤
//!                                                                           ▼
//! 客户端地标记录 ──────────────────────────────────────────────► MeasurementEngine
//!                                                                           ▼
//!                                                              build_recommendations
//!                                                                           ▼
//!                                                                    AnalysisResult
//! ```
//!
//! 每次请求独立处理，`FaceAnalyzer` 构造后不再修改，可以在线程间共享。

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::measurement::{MeasurementEngine, MeasurementSet};
use super::recommendation::{build_recommendations, AnalysisArea};
use crate::core::config::Config;
use crate::core::error::{HarmonyError, Result};
use crate::geometry::{load_vertices, load_vertices_from_reader, normalize_vertices, VertexSet};
use crate::landmark::{locator_for, LandmarkLocator, LandmarkRecord, LandmarkRequest, LandmarkSet};

/// 一次分析的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: Uuid,
    pub analysis_summary: String,
    pub areas: Vec<AnalysisArea>,
    pub measurements: MeasurementSet,
}

impl AnalysisResult {
    fn new(areas: Vec<AnalysisArea>, measurements: MeasurementSet) -> Self {
        Self {
            id: Uuid::new_v4(),
            analysis_summary: format!("We found {} areas that can be harmonized.", areas.len()),
            areas,
            measurements,
        }
    }
}

/// 面部分析器
pub struct FaceAnalyzer {
    locator: Box<dyn LandmarkLocator>,
    engine: MeasurementEngine,
    upload_dir: PathBuf,
}

impl FaceAnalyzer {
    /// 按配置创建
    pub fn new(config: &Config) -> Self {
        let analysis = &config.analysis;
        if let Some(model) = &analysis.model_path {
            tracing::debug!(
                model = %model.display(),
                locator = ?analysis.locator,
                "已配置模型路径，当前定位器不使用"
            );
        }

        Self {
            locator: locator_for(analysis.locator),
            engine: MeasurementEngine::from_config(analysis),
            upload_dir: analysis.upload_dir.clone(),
        }
    }

    /// 使用自定义定位器和测量引擎
    pub fn with_parts(
        locator: Box<dyn LandmarkLocator>,
        engine: MeasurementEngine,
        upload_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            locator,
            engine,
            upload_dir: upload_dir.into(),
        }
    }

    pub fn locator(&self) -> &dyn LandmarkLocator {
        self.locator.as_ref()
    }

    /// 解析扫描文件路径
    ///
    /// 绝对路径和当前目录下存在的路径原样使用，其余视为上传目录中的文件。
    pub fn resolve_scan_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() || path.exists() {
            path.to_path_buf()
        } else {
            self.upload_dir.join(path)
        }
    }

    /// 归一化并定位地标
    pub fn locate(&self, vertices: &VertexSet) -> LandmarkSet {
        let normalized = normalize_vertices(vertices);
        self.locator.locate(&normalized)
    }

    /// 从扫描文件提取地标，加载错误原样返回
    pub fn extract_landmarks(&self, path: &Path, extension: &str) -> Result<LandmarkSet> {
        let vertices = load_vertices(&self.resolve_scan_path(path), extension)?;
        Ok(self.locate(&vertices))
    }

    /// 从字节流提取地标，加载错误原样返回
    pub fn extract_landmarks_from_reader<R: Read>(&self, reader: R, extension: &str) -> Result<LandmarkSet> {
        let vertices = load_vertices_from_reader(reader, extension)?;
        Ok(self.locate(&vertices))
    }

    /// 从扫描文件提取地标记录
    ///
    /// 可恢复的加载错误降级为单个无名称的原点记录，后续测量全部走回退值；
    /// 不支持的格式仍然返回错误。
    pub fn extract_landmark_records(&self, path: &Path, extension: &str) -> Result<Vec<LandmarkRecord>> {
        degrade(self.extract_landmarks(path, extension), path)
    }

    /// 字节流版本的 [`extract_landmark_records`](Self::extract_landmark_records)
    pub fn extract_landmark_records_from_reader<R: Read>(
        &self,
        reader: R,
        extension: &str,
    ) -> Result<Vec<LandmarkRecord>> {
        degrade(
            self.extract_landmarks_from_reader(reader, extension),
            Path::new("<stream>"),
        )
    }

    /// 计算完整测量集合
    pub fn measure(&self, landmarks: &LandmarkSet) -> MeasurementSet {
        self.engine.measure(landmarks)
    }

    /// 分析客户端地标记录
    pub fn analyze_landmarks(&self, records: &[LandmarkRecord]) -> AnalysisResult {
        let landmarks = LandmarkSet::from_records(records);
        let measurements = self.measure(&landmarks);
        let areas = build_recommendations(&measurements);

        tracing::info!(
            records = records.len(),
            landmarks = landmarks.len(),
            areas = areas.len(),
            "地标分析完成"
        );

        AnalysisResult::new(areas, measurements)
    }

    /// 分析地标请求，`device` 等上下文只记录日志
    pub fn analyze_request(&self, request: &LandmarkRequest) -> AnalysisResult {
        if let Some(device) = &request.device {
            tracing::debug!(device = %device, "地标请求来源设备");
        }
        self.analyze_landmarks(&request.landmarks)
    }

    /// 从 JSON 载荷分析
    pub fn analyze_request_json(&self, json: &str) -> Result<AnalysisResult> {
        let request: LandmarkRequest = serde_json::from_str(json)?;
        Ok(self.analyze_request(&request))
    }

    /// 分析扫描文件
    pub fn analyze_scan(&self, path: &Path, extension: &str) -> Result<AnalysisResult> {
        let records = self.extract_landmark_records(path, extension)?;
        Ok(self.analyze_landmarks(&records))
    }

    /// 分析扫描字节流
    pub fn analyze_scan_reader<R: Read>(&self, reader: R, extension: &str) -> Result<AnalysisResult> {
        let records = self.extract_landmark_records_from_reader(reader, extension)?;
        Ok(self.analyze_landmarks(&records))
    }
}

impl Default for FaceAnalyzer {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

/// 可恢复的加载错误转换为退化地标
fn degrade(result: Result<LandmarkSet>, source: &Path) -> Result<Vec<LandmarkRecord>> {
    match result {
        Ok(landmarks) => Ok(landmarks.to_records()),
        Err(err) if err.is_recoverable_mesh_error() => {
            tracing::warn!(
                source = %source.display(),
                error = %error_chain(&err),
                "网格解析失败，使用退化地标"
            );
            Ok(vec![LandmarkRecord::origin()])
        }
        Err(err) => Err(err),
    }
}

/// 把错误链拼成一行，已包含在上层消息中的原因不重复
fn error_chain(err: &HarmonyError) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::measurement::MeasurementKey;
    use crate::core::error::MeshLoadError;
    use crate::landmark::heuristic::test_support::synthetic_face;
    use crate::landmark::LandmarkName;
    use approx::assert_relative_eq;

    fn face_obj() -> String {
        let mut obj = String::from("o face\n");
        for v in synthetic_face().iter() {
            obj.push_str(&format!("v {} {} {}\n", v.x, v.y, v.z));
        }
        // 15 列 × 21 行网格
        for row in 0..20 {
            for col in 0..14 {
                let a = row * 15 + col + 1;
                let b = a + 1;
                let c = a + 15;
                let d = c + 1;
                obj.push_str(&format!("f {} {} {}\nf {} {} {}\n", a, b, d, a, d, c));
            }
        }
        obj
    }

    fn record(name: &str, x: f64, y: f64, z: f64) -> LandmarkRecord {
        LandmarkRecord { x, y, z, name: Some(name.to_string()) }
    }

    #[test]
    fn test_analyze_empty_landmarks() {
        let result = FaceAnalyzer::default().analyze_landmarks(&[]);

        assert_eq!(result.measurements.len(), 3);
        assert_eq!(result.areas.len(), 3);
        assert_eq!(result.analysis_summary, "We found 3 areas that can be harmonized.");
    }

    #[test]
    fn test_analyze_client_landmarks() {
        let records = vec![
            record("chin", 0.0, 0.0, 0.0),
            record("nose_tip", 0.0, 0.0, 0.012),
        ];
        let result = FaceAnalyzer::default().analyze_landmarks(&records);

        assert_relative_eq!(
            result.measurements.get(MeasurementKey::ChinProjectionMm).unwrap(),
            12.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_result_ids_are_unique() {
        let analyzer = FaceAnalyzer::default();
        assert_ne!(analyzer.analyze_landmarks(&[]).id, analyzer.analyze_landmarks(&[]).id);
    }

    #[test]
    fn test_analyze_request_json() {
        let json = r#"{"landmarks": [{"x": 0, "y": 0, "z": 0, "name": "chin"}], "device": "iPad"}"#;
        let result = FaceAnalyzer::default().analyze_request_json(json).unwrap();
        assert_eq!(result.measurements.get(MeasurementKey::ChinProjectionMm), Some(11.8));

        let err = FaceAnalyzer::default().analyze_request_json("{").unwrap_err();
        assert!(matches!(err, HarmonyError::Serialization(_)));
    }

    #[test]
    fn test_scan_landmarks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.obj");
        std::fs::write(&path, face_obj()).unwrap();

        let landmarks = FaceAnalyzer::default().extract_landmarks(&path, "obj").unwrap();
        assert_eq!(landmarks.len(), LandmarkName::ALL.len());
    }

    #[test]
    fn test_corrupt_scan_degrades_to_origin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.obj");
        std::fs::write(&path, "v 0 zero 0\nf 1 1 1\n").unwrap();

        let analyzer = FaceAnalyzer::default();
        assert_eq!(
            analyzer.extract_landmark_records(&path, "obj").unwrap(),
            vec![LandmarkRecord::origin()]
        );

        let result = analyzer.analyze_scan(&path, "obj").unwrap();
        assert_eq!(result.measurements.get(MeasurementKey::NoseToIpdRatio), Some(0.52));
        assert_eq!(result.measurements.get(MeasurementKey::ChinProjectionMm), Some(11.8));
        assert_eq!(result.measurements.get(MeasurementKey::JawAsymmetryMm), Some(5.3));
    }

    #[test]
    fn test_empty_scan_degrades_to_origin() {
        let records = FaceAnalyzer::default()
            .extract_landmark_records_from_reader("# nothing\n".as_bytes(), "obj")
            .unwrap();
        assert_eq!(records, vec![LandmarkRecord::origin()]);
    }

    #[test]
    fn test_unsupported_format_is_not_degraded() {
        let err = FaceAnalyzer::default()
            .analyze_scan(Path::new("scan.fbx"), "fbx")
            .unwrap_err();
        assert!(matches!(
            err,
            HarmonyError::MeshLoading(MeshLoadError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_relative_scan_resolved_in_upload_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("upload_scan.obj"), face_obj()).unwrap();

        let mut config = Config::default();
        config.analysis.upload_dir = dir.path().to_path_buf();
        let analyzer = FaceAnalyzer::new(&config);

        let resolved = analyzer.resolve_scan_path(Path::new("upload_scan.obj"));
        assert_eq!(resolved, dir.path().join("upload_scan.obj"));

        let landmarks = analyzer.extract_landmarks(Path::new("upload_scan.obj"), "obj").unwrap();
        assert!(!landmarks.is_empty());
    }

    #[test]
    fn test_error_chain_includes_cause() {
        let err: HarmonyError = MeshLoadError::parse_failure(
            "scan.obj",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        )
        .into();
        let message = error_chain(&err);
        assert!(message.contains("scan.obj"));
        assert!(message.ends_with("gone"));
    }
}
