//! FaceHarmony - 面部地标提取与测量
//!
//! 从深度传感器采集的 3D 面部扫描（USDZ / OBJ / GLB / glTF）中定位解剖地标，
//! 计算一组固定的面部比例测量，并映射为可调整区域的建议。
//! 客户端也可以跳过网格处理，直接提交地标载荷。
//!
//! # 模块结构
//!
//! - `core`: 核心功能模块（数学、日志、配置、错误处理）
//! - `geometry`: 几何体模块（顶点集合、场景网格、归一化、各格式加载器）
//! - `landmark`: 地标词表、地标集合与定位器
//! - `analysis`: 测量引擎、建议映射与完整分析管线
//!
//! # 使用示例
//!
//! ```no_run
//! use face_harmony::analysis::FaceAnalyzer;
//! use face_harmony::core::Config;
//! use std::path::Path;
//!
//! let config = Config::from_file_or_default("config.toml");
//! let analyzer = FaceAnalyzer::new(&config);
//!
//! let result = analyzer.analyze_scan(Path::new("scan.usdz"), "usdz")?;
//! println!("{}", result.analysis_summary);
//! # Ok::<(), face_harmony::core::HarmonyError>(())
//! ```

pub mod core;
pub mod geometry;
pub mod landmark;
pub mod analysis;
