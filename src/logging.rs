//! # Logging モジュール
//!
//! 分隊シミュレーションのログ出力を初期化します。
//!
//! コンソールには人間向けのコンパクト形式、ファイルには後処理しやすい
//! JSON形式で出力します。ファイル出力は`tracing-appender`の非同期ライターを
//! 使うため、ティック処理の速度に影響しません。
//!
//! ## 設定可能な出力先
//!
//! - `Console`: コンソールのみ
//! - `File`: ファイルのみ（logs/squadsim.YYYY-MM-DD）
//! - `Both`: コンソールとファイルの両方

use std::str::FromStr;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// ログ出力先の設定
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogOutput {
    Console,
    File,
    Both,
}

impl LogOutput {
    fn console(self) -> bool {
        matches!(self, LogOutput::Console | LogOutput::Both)
    }

    fn file(self) -> bool {
        matches!(self, LogOutput::File | LogOutput::Both)
    }
}

impl FromStr for LogOutput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "console" | "stdout" => Ok(LogOutput::Console),
            "file" => Ok(LogOutput::File),
            "both" | "all" => Ok(LogOutput::Both),
            _ => Err(format!("無効な出力先: {}. 利用可能: console, file, both", s)),
        }
    }
}

/// ログ設定構造体
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub output: LogOutput,
    /// ログファイルのディレクトリ（FileまたはBothの場合）
    pub log_dir: String,
    pub file_prefix: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            output: LogOutput::Console,
            log_dir: "logs".to_string(),
            file_prefix: "squadsim".to_string(),
        }
    }
}

impl LogConfig {
    /// `-v`の回数からログレベルを決める（明示指定があればそちらを優先）
    pub fn with_verbosity(mut self, verbose_level: u8) -> Self {
        self.level = match verbose_level {
            0 => self.level,
            1 => Level::INFO.max(self.level),
            2 => Level::DEBUG.max(self.level),
            _ => Level::TRACE,
        };
        self
    }
}

/// ログシステムを初期化
///
/// 環境変数`RUST_LOG`が設定されていれば、設定ファイルのレベルより優先されます。
/// 戻り値のガードはファイル出力の書き込みスレッドを維持するため、
/// プログラム終了まで保持してください。
pub fn init_logging(config: LogConfig) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.level.to_string()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = config.output.console().then(|| {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .compact()
    });

    let (file_layer, guard) = if config.output.file() {
        ensure_log_directory(&config.log_dir)?;
        let appender = rolling::daily(&config.log_dir, &config.file_prefix);
        let (writer, guard) = non_blocking(appender);
        let layer = fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(false)
            .json();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

/// ログレベルを文字列から解析（無効な場合はINFO）
pub fn parse_log_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!("警告: 無効なログレベル '{}'. INFOを使用します", level_str);
            Level::INFO
        }
    }
}

/// ログディレクトリが存在しなければ作成
pub fn ensure_log_directory(log_dir: &str) -> Result<(), std::io::Error> {
    std::fs::create_dir_all(log_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_output_from_str() {
        assert_eq!(LogOutput::from_str("console"), Ok(LogOutput::Console));
        assert_eq!(LogOutput::from_str("FILE"), Ok(LogOutput::File));
        assert_eq!(LogOutput::from_str("all"), Ok(LogOutput::Both));
        assert!(LogOutput::from_str("invalid").is_err());
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("debug"), Level::DEBUG);
        assert_eq!(parse_log_level("WARN"), Level::WARN);
        assert_eq!(parse_log_level("invalid"), Level::INFO);
    }

    #[test]
    fn test_verbosity_raises_level() {
        let base = LogConfig::default();
        assert_eq!(base.clone().with_verbosity(0).level, Level::INFO);
        assert_eq!(base.clone().with_verbosity(2).level, Level::DEBUG);
        assert_eq!(base.with_verbosity(3).level, Level::TRACE);

        let quiet = LogConfig {
            level: Level::WARN,
            ..LogConfig::default()
        };
        assert_eq!(quiet.with_verbosity(1).level, Level::INFO);
    }
}
