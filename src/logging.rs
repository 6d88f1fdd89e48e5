use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// ログファイル名
const LOG_FILE_NAME: &str = "pingone-mfa.log";

/// 出力フォーマット
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 人間向けテキスト
    #[default]
    Human,
    /// 1行1 JSON オブジェクト
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "human" | "text" | "pretty" => Ok(LogFormat::Human),
            "json" => Ok(LogFormat::Json),
            other => Err(Error::Config(format!("unknown log format: {}", other))),
        }
    }
}

/// ログ設定
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// ログレベルまたは EnvFilter 形式のディレクティブ
    pub level: String,
    pub format: LogFormat,
    /// ANSI カラー出力
    pub ansi: bool,
    /// 日次ローテーションのファイル出力先。None ならコンソールのみ
    pub log_dir: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Human,
            ansi: true,
            log_dir: None,
        }
    }
}

impl LogConfig {
    /// ログレベル設定
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// 出力フォーマット設定
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// カラー出力制御
    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    /// ファイル出力先を設定
    pub fn with_log_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// EnvFilter を作成。不正な指定は info にフォールバック
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// ログディレクトリを確保
fn ensure_log_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// ログシステムを初期化
///
/// ファイル出力時は返された guard を保持している間だけ書き込まれる。
/// すでにグローバル subscriber が設定済みの場合は何もしない。
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let (file_writer, guard) = match &config.log_dir {
        Some(dir) => {
            ensure_log_dir(dir)?;
            let (writer, guard) = non_blocking(rolling::daily(dir, LOG_FILE_NAME));
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let console = match config.format {
        LogFormat::Human => fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(config.ansi)
            .with_target(true)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .boxed(),
    };

    // ファイルは常に JSON、カラーなし
    let file = file_writer.map(|writer| {
        fmt::layer()
            .json()
            .with_writer(writer)
            .with_ansi(false)
            .with_current_span(true)
            .boxed()
    });

    let installed = tracing_subscriber::registry()
        .with(config.env_filter())
        .with(console)
        .with(file)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(
            "Logging initialized: level={}, format={:?}, file={:?}",
            config.level,
            config.format,
            config.log_dir
        );
    }

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builder() {
        let config = LogConfig::default()
            .with_level("debug")
            .with_format(LogFormat::Json)
            .with_ansi(false);
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
        assert!(!config.ansi);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Human);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_env_filter() {
        assert_eq!(LogConfig::default().with_level("debug").env_filter().to_string(), "debug");
        let _ = LogConfig::default().with_level("=[=").env_filter();
    }

    #[test]
    fn test_init_twice_is_harmless() {
        let dir = TempDir::new().unwrap();
        let config = LogConfig::default().with_log_dir(dir.path().join("logs"));
        let _first = init_logging(&config).unwrap();
        let _second = init_logging(&config).unwrap();
        assert!(dir.path().join("logs").exists());
    }
}
