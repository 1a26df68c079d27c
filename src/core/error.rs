//! 错误处理模块
//!
//! 定义了分析流水线中使用的统一错误类型，使用 `thiserror` 提供友好的错误消息。
//!
//! # 设计原则
//!
//! - 使用 `thiserror` 自动实现 `Error` trait
//! - 网格加载错误分为三类：不支持的格式、解析失败、空几何体
//! - 解析失败保留底层错误作为 `source()`，形成错误链
//! - 缺失的单个地标不是错误，由地标集合和测量引擎以结构方式表达

use std::path::PathBuf;

use thiserror::Error;

/// 统一的 Result 类型
pub type Result<T> = std::result::Result<T, HarmonyError>;

/// 底层错误的装箱类型，用于保留错误链
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// 面部分析的顶层错误类型
#[derive(Debug, Error)]
pub enum HarmonyError {
    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// 网格加载错误
    #[error("Mesh loading error: {0}")]
    MeshLoading(#[from] MeshLoadError),

    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 地标载荷或分析结果的 JSON 编解码错误
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 配置相关的错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件未找到
    #[error("Config file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// 配置文件解析失败
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// 配置值无效
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 网格加载相关的错误
#[derive(Debug, Error)]
pub enum MeshLoadError {
    /// 不支持的文件扩展名，在任何 IO 之前拒绝
    #[error("Unsupported mesh format: .{0}")]
    UnsupportedFormat(String),

    /// 文件无法读取或内容损坏
    #[error("Failed to parse mesh ({context})")]
    ParseFailure {
        context: String,
        #[source]
        source: BoxedCause,
    },

    /// 解析成功但没有子网格或顶点
    #[error("Mesh contains no geometry: {0}")]
    EmptyGeometry(String),
}

impl MeshLoadError {
    /// 构造带底层原因的解析失败
    pub fn parse_failure<E>(context: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxedCause>,
    {
        MeshLoadError::ParseFailure {
            context: context.into(),
            source: source.into(),
        }
    }

    /// 调用方是否可以用退化地标集合继续处理
    ///
    /// 只有不支持的格式是致命的，解析失败和空几何体都可以降级。
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, MeshLoadError::UnsupportedFormat(_))
    }
}

impl HarmonyError {
    /// 是否为可降级处理的网格加载错误
    pub fn is_recoverable_mesh_error(&self) -> bool {
        matches!(self, HarmonyError::MeshLoading(e) if e.is_recoverable())
    }
}
