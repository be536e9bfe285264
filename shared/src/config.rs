use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// メインの設定構造体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// ログ設定
    #[serde(default)]
    pub logging: LoggingSettings,

    /// サンプリング設定
    #[serde(default)]
    pub sampler: SamplerSettings,
}

/// ログ関連の設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// 詳細ログを有効にするか
    #[serde(default)]
    pub verbose: bool,

    /// ログレベル ("error" / "warn" / "info" / "debug" / "trace")
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// ログサンプリングジョブの設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerSettings {
    /// ダウンロード先ディレクトリ
    #[serde(default = "default_destination")]
    pub destination: PathBuf,

    /// 取得するファイル数の目安
    #[serde(default = "default_sample_count")]
    pub sample_count: u32,

    /// サンプリング開始日 (YYYY-MM-DD)
    #[serde(default = "default_start_date")]
    pub start_date: String,

    /// オブジェクトキーの接頭辞
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// バケットのローカルミラーのルート
    pub store_root: Option<PathBuf>,

    /// S3 バケット名（指定するとミラーではなくバケットから直接取得）
    pub bucket: Option<String>,

    /// S3 のリージョン（省略時は AWS の標準設定から解決）
    pub region: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            verbose: false,
            level: default_log_level(),
        }
    }
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            destination: default_destination(),
            sample_count: default_sample_count(),
            start_date: default_start_date(),
            key_prefix: default_key_prefix(),
            store_root: None,
            bucket: None,
            region: None,
        }
    }
}

// デフォルト値関数
fn default_log_level() -> String {
    "warn".to_string()
}

fn default_destination() -> PathBuf {
    PathBuf::from("sample_logs")
}

fn default_sample_count() -> u32 {
    100
}

fn default_start_date() -> String {
    "2017-06-04".to_string()
}

fn default_key_prefix() -> String {
    "fastly_json".to_string()
}

impl Config {
    /// 設定ファイルから読み込み
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        Ok(config)
    }

    /// 設定ファイルに保存
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        // ディレクトリが存在しない場合は作成
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// デフォルトの設定ファイルパスを取得
    pub fn default_config_path() -> Result<PathBuf> {
        let home_dir = home::home_dir().context("Failed to get home directory")?;

        Ok(home_dir.join(".logtally").join("config.toml"))
    }

    /// 設定ファイルパスの候補を取得（優先順位順）
    pub fn config_path_candidates() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. カレントディレクトリの .logtally/config.toml
        if let Ok(current_dir) = std::env::current_dir() {
            paths.push(current_dir.join(".logtally").join("config.toml"));
        }

        // 2. ホームディレクトリの .logtally/config.toml
        if let Some(home_dir) = home::home_dir() {
            paths.push(home_dir.join(".logtally").join("config.toml"));
        }

        // 3. XDG規格に従った設定ディレクトリ
        if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
            paths.push(
                PathBuf::from(xdg_config_home)
                    .join("logtally")
                    .join("config.toml"),
            );
        } else if let Some(home_dir) = home::home_dir() {
            paths.push(home_dir.join(".config").join("logtally").join("config.toml"));
        }

        paths
    }

    /// 設定ファイルを自動検出して読み込み
    pub fn load_auto() -> Result<Option<(Self, PathBuf)>> {
        for path in Self::config_path_candidates() {
            if path.exists() {
                let config = Self::from_file(&path)?;
                return Ok(Some((config, path)));
            }
        }
        Ok(None)
    }

    /// 明示パス > 自動検出 > デフォルト の順で読み込み、環境変数を適用
    pub fn load(explicit: Option<&std::path::Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => Self::load_auto()?
                .map(|(config, _)| config)
                .unwrap_or_default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// 環境変数で設定を上書き
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        // ログ設定
        if let Ok(verbose) = std::env::var("LOGTALLY_VERBOSE") {
            self.logging.verbose = verbose == "1" || verbose.to_lowercase() == "true";
        }

        if let Ok(level) = std::env::var("LOGTALLY_LOG_LEVEL") {
            self.logging.level = level;
        }

        // サンプリング設定
        if let Ok(dir) = std::env::var("LOGTALLY_SAMPLE_DIR") {
            self.sampler.destination = PathBuf::from(dir);
        }

        if let Ok(count) = std::env::var("LOGTALLY_SAMPLE_COUNT") {
            self.sampler.sample_count = count
                .parse()
                .with_context(|| format!("Invalid LOGTALLY_SAMPLE_COUNT: {count}"))?;
        }

        if let Ok(date) = std::env::var("LOGTALLY_START_DATE") {
            self.sampler.start_date = date;
        }

        if let Ok(root) = std::env::var("LOGTALLY_STORE_ROOT") {
            self.sampler.store_root = Some(PathBuf::from(root));
        }

        if let Ok(bucket) = std::env::var("LOGTALLY_BUCKET") {
            self.sampler.bucket = Some(bucket);
        }

        if let Ok(region) = std::env::var("LOGTALLY_REGION") {
            self.sampler.region = Some(region);
        }

        Ok(())
    }

    /// 設定のサンプルを生成
    pub fn sample() -> Self {
        let mut config = Self::default();

        config.logging.verbose = false;
        config.logging.level = "info".to_string();

        config.sampler.destination = PathBuf::from("sample_logs");
        config.sampler.sample_count = 100;
        config.sampler.start_date = "2017-06-04".to_string();
        config.sampler.store_root = Some(PathBuf::from("/srv/mirrors/rubygems-logs"));

        config
    }
}
