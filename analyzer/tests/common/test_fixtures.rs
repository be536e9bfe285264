// テストフィクスチャとダミーデータ生成
// Note: 統合テストごとに独立してコンパイルされるため、使わない関数で
// dead_code警告が出る。実際には他のテストファイルから使用されている。

#![cfg(test)]
#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub const HEADER: &str = "user_agent";

/// テスト用の user-agent 行を組み立てる
#[derive(Debug, Clone)]
pub struct UserAgentLine {
    pub bundler: String,
    pub rubygems: String,
    pub ruby: String,
    pub platform: String,
    pub command: String,
    pub jruby: Option<String>,
    pub options: Option<String>,
    pub ci: Option<String>,
    pub digest: String,
    pub extra: Option<String>,
}

impl UserAgentLine {
    pub fn new(platform: &str) -> Self {
        Self {
            bundler: "2.1.4".to_string(),
            rubygems: "3.1.2".to_string(),
            ruby: "2.7.1".to_string(),
            platform: platform.to_string(),
            command: "install".to_string(),
            jruby: None,
            options: None,
            ci: None,
            digest: "0123456789abcdef".to_string(),
            extra: None,
        }
    }

    pub fn bundler(mut self, version: &str) -> Self {
        self.bundler = version.to_string();
        self
    }

    pub fn command(mut self, command: &str) -> Self {
        self.command = command.to_string();
        self
    }

    pub fn jruby(mut self, version: &str) -> Self {
        self.jruby = Some(version.to_string());
        self
    }

    pub fn options(mut self, options: &str) -> Self {
        self.options = Some(options.to_string());
        self
    }

    pub fn ci(mut self, ci: &str) -> Self {
        self.ci = Some(ci.to_string());
        self
    }

    pub fn digest(mut self, digest: &str) -> Self {
        self.digest = digest.to_string();
        self
    }

    pub fn extra(mut self, extra: &str) -> Self {
        self.extra = Some(extra.to_string());
        self
    }

    pub fn build(&self) -> String {
        let mut line = format!(
            "\"bundler/{} rubygems/{} ruby/{} ({}) command/{} ",
            self.bundler, self.rubygems, self.ruby, self.platform, self.command
        );
        if let Some(jruby) = &self.jruby {
            line.push_str(&format!("jruby/{jruby} "));
        }
        if let Some(options) = &self.options {
            line.push_str(&format!("options/{options} "));
        }
        if let Some(ci) = &self.ci {
            line.push_str(&format!("ci/{ci} "));
        }
        line.push_str(&self.digest);
        if let Some(extra) = &self.extra {
            line.push(' ');
            line.push_str(extra);
        }
        line.push('"');
        line
    }
}

/// ヘッダー付きの入力行を作る
pub fn with_header(lines: &[String]) -> Vec<String> {
    std::iter::once(HEADER.to_string())
        .chain(lines.iter().cloned())
        .collect()
}

/// 一意なテストIDを生成
pub fn generate_test_id() -> String {
    format!("test_{}", uuid::Uuid::new_v4())
}

/// 入力ファイルを書き出す
pub fn write_log(dir: &Path, lines: &[String]) -> PathBuf {
    let path = dir.join(format!("{}.log", generate_test_id()));
    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(&path, content).unwrap();
    path
}
