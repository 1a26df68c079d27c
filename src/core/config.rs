//! 配置管理模块
//!
//! 提供分析流水线配置的加载、解析和管理功能。
//! 支持从 TOML 配置文件加载，也支持命令行参数覆盖。
//! 配置对象在构造时显式传入分析器，核心模块不持有任何全局状态。
//!
//! # 配置文件格式 (config.toml)
//!
//! ```toml
//! [analysis]
//! upload_dir = "uploads"
//! locator = "heuristic"
//! unit_scale_to_mm = 1000.0
//! # model_path = "models/landmarks.onnx"
//!
//! [logging]
//! level = "info"      # trace, debug, info, warn, error
//! file_output = true
//! log_file = "face_harmony.log"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::{ConfigError, Result};

/// 分析器配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// 分析流水线配置
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 分析流水线配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// 扫描文件上传目录，相对路径的扫描文件在此查找
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// 地标模型路径，为基于模型的定位器预留
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,

    /// 地标定位器实现
    #[serde(default)]
    pub locator: LocatorKind,

    /// 源坐标单位到毫米的换算系数
    ///
    /// 采集管线输出的坐标假定为米，因此默认值为 1000。
    #[serde(default = "default_unit_scale")]
    pub unit_scale_to_mm: f64,
}

/// 地标定位器类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocatorKind {
    /// 基于坐标极值和百分位分区的启发式定位器
    #[default]
    Heuristic,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// 是否输出到文件
    #[serde(default = "default_file_output")]
    pub file_output: bool,

    /// 日志文件路径
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

// 默认值函数
fn default_upload_dir() -> PathBuf { PathBuf::from("uploads") }
fn default_unit_scale() -> f64 { crate::analysis::measurement::METERS_TO_MILLIMETERS }
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_file_output() -> bool { false }
fn default_log_file() -> String { "face_harmony.log".to_string() }

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            model_path: None,
            locator: LocatorKind::default(),
            unit_scale_to_mm: default_unit_scale(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: default_file_output(),
            log_file: default_log_file(),
        }
    }
}

impl Config {
    /// 从配置文件加载
    ///
    /// # 参数
    ///
    /// * `path` - 配置文件路径
    ///
    /// # 返回值
    ///
    /// 成功返回 `Config` 实例，失败返回错误
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let contents = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.to_path_buf()))?;

        Self::from_toml_str(&contents)
    }

    /// 从 TOML 文本解析
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// 从配置文件加载，如果文件不存在或无法解析则使用默认配置
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::from_file(path).unwrap_or_default()
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// 从命令行参数覆盖配置
    ///
    /// # 说明
    ///
    /// 支持的参数：
    /// - `--upload-dir <path>`: 设置上传目录
    /// - `--model-path <path>`: 设置地标模型路径
    /// - `--locator <name>`: 选择地标定位器（目前仅 `heuristic`）
    /// - `--log-level <level>`: 设置日志级别
    /// - `--log-file <path>`: 启用文件日志并设置路径
    ///
    /// 无法识别的取值会被忽略，保留原配置。
    pub fn apply_args<I>(&mut self, args: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        let value_of = |flag: &str| arg_value(&args, flag).map(str::to_string);

        if let Some(dir) = value_of("--upload-dir") {
            self.analysis.upload_dir = PathBuf::from(dir);
        }

        if let Some(path) = value_of("--model-path") {
            self.analysis.model_path = Some(PathBuf::from(path));
        }

        if let Some(name) = value_of("--locator") {
            if let Ok(kind) = name.parse() {
                self.analysis.locator = kind;
            }
        }

        if let Some(level) = value_of("--log-level") {
            if let Ok(level) = level.parse() {
                self.logging.level = level;
            }
        }

        if let Some(file) = value_of("--log-file") {
            self.logging.file_output = true;
            self.logging.log_file = file;
        }
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        let scale = self.analysis.unit_scale_to_mm;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "analysis.unit_scale_to_mm".to_string(),
                reason: format!("Unit scale must be a positive finite number, got {}", scale),
            }.into());
        }

        if self.logging.file_output && self.logging.log_file.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "logging.log_file".to_string(),
                reason: "File output is enabled but no log file is set".to_string(),
            }.into());
        }

        Ok(())
    }
}

/// 取出紧跟在 `flag` 之后的参数值
fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|idx| args.get(idx + 1))
        .map(String::as_str)
}

impl std::str::FromStr for LocatorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "heuristic" => Ok(LocatorKind::Heuristic),
            other => Err(ConfigError::InvalidValue {
                field: "analysis.locator".to_string(),
                reason: format!("Unknown locator '{}'", other),
            }),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Unknown log level '{}'", other),
            }),
        }
    }
}
