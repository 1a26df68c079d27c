//! 核心功能模块
//!
//! 本模块提供了分析流水线的基础功能，包括数学库、日志系统、配置管理和错误处理。
//! 这些模块独立于具体的网格格式和地标算法。
//!
//! # 模块组织
//!
//! - `math`：nalgebra 类型别名与百分位等统计函数
//! - `log`：日志系统，基于 tracing 的结构化日志
//! - `config`：配置管理，支持从 TOML 文件加载分析器设置
//! - `error`：错误处理，定义统一的错误类型

pub mod math;
pub mod log;
pub mod config;
pub mod error;

// 重新导出常用类型，方便使用
pub use math::{Point3, Vector3};
pub use error::{Result, HarmonyError, MeshLoadError, ConfigError};
pub use config::Config;
