//! FaceHarmony 命令行入口
//!
//! 分析一个扫描文件或 JSON 地标载荷，把 `AnalysisResult` 以 JSON 输出到标准输出。
//!
//! # 使用方法
//!
//! ```bash
//! # 分析扫描文件（格式取自扩展名）
//! cargo run -- scan.usdz
//!
//! # 显式指定格式
//! cargo run -- upload.bin --format obj
//!
//! # 分析客户端地标载荷
//! cargo run -- landmarks.json
//! ```
//!
//! # 命令行参数
//!
//! - `--config <path>`: 配置文件路径（默认 `config.toml`）
//! - `--format <ext>`: 扫描格式（`usdz|obj|glb|gltf`），覆盖文件扩展名
//! - `--landmarks`: 将输入按 JSON 地标载荷处理
//! - 其余参数见 `Config::apply_args`

use anyhow::{bail, Context};
use face_harmony::analysis::FaceAnalyzer;
use face_harmony::core::{log, Config};
use std::path::Path;
use tracing::{debug, info};

/// 需要取值的参数
const VALUE_FLAGS: &[&str] = &[
    "--config",
    "--format",
    "--upload-dir",
    "--model-path",
    "--locator",
    "--log-level",
    "--log-file",
];

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    // 1. 加载配置（在初始化日志之前）
    let config_path = flag_value(&args, "--config").unwrap_or("config.toml");
    let mut config = Config::from_file_or_default(config_path);

    // 2. 应用命令行参数
    config.apply_args(&args);

    // 3. 验证配置
    config.validate().context("Invalid configuration")?;

    // 4. 初始化日志系统
    let log_file = config
        .logging
        .file_output
        .then_some(config.logging.log_file.as_str());
    log::init_logger(config.logging.level, config.logging.file_output, log_file);
    info!(version = env!("CARGO_PKG_VERSION"), "FaceHarmony starting...");
    debug!(
        locator = ?config.analysis.locator,
        unit_scale = config.analysis.unit_scale_to_mm,
        upload_dir = %config.analysis.upload_dir.display(),
        "Analysis configuration"
    );

    let Some(input) = positional(&args) else {
        bail!("usage: face_harmony <scan|landmarks.json> [--format <ext>] [--landmarks] [--config <path>]");
    };
    let input = Path::new(input);

    // 5. 分析
    let analyzer = FaceAnalyzer::new(&config);
    let extension = flag_value(&args, "--format")
        .map(str::to_string)
        .or_else(|| input.extension().and_then(|e| e.to_str()).map(str::to_lowercase))
        .unwrap_or_default();

    let is_payload = args.iter().any(|a| a == "--landmarks") || extension == "json";
    let result = if is_payload {
        let path = analyzer.resolve_scan_path(input);
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        analyzer.analyze_request_json(&json)?
    } else {
        analyzer
            .analyze_scan(input, &extension)
            .with_context(|| format!("Failed to analyze {}", input.display()))?
    };

    info!(id = %result.id, areas = result.areas.len(), "Analysis finished");

    // 6. 输出结果
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|idx| args.get(idx + 1))
        .map(String::as_str)
}

/// 第一个既不是参数名也不是参数值的参数
fn positional(args: &[String]) -> Option<&str> {
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            iter.next();
        } else if !arg.starts_with("--") {
            return Some(arg);
        }
    }
    None
}
