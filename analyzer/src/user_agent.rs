//! Bundler user-agent parsing
//!
//! Bundler sends a user-agent of the form
//! `bundler/<v> rubygems/<v> ruby/<v> (<cpu>-<vendor>-<os>) command/<cmd> [jruby/<v> ] [options/<a,b> ] [ci/<name> ] <hex> [<extra>]`,
//! logged wrapped in double quotes.

use regex::Regex;
use std::sync::OnceLock;

/// Bundler user-agent pattern
static USER_AGENT_PATTERN: OnceLock<Regex> = OnceLock::new();

fn pattern() -> &'static Regex {
    USER_AGENT_PATTERN.get_or_init(|| {
        // os は括弧内の3番目以降をすべて取る（linux-gnu など）
        // options は最短一致、ci は最長一致
        Regex::new(concat!(
            r#"^"bundler/(?P<bundler>[a-z0-9.]+) rubygems/(?P<rubygems>[a-z0-9.]+) ruby/(?P<ruby>[a-z0-9.]+) "#,
            r#"\((?P<cpu>[^-]+)-(?P<vendor>[^-]+)-(?P<os>.+)\) command/(?P<command>.*?) "#,
            r#"(?:jruby/(?P<jruby>[a-z0-9.]+) )?(?:options/(?P<options>.+?) )?(?:ci/(?P<ci>.+) )?"#,
            r#"[a-f0-9]+(?: (?P<extra>.+))?"$"#,
        ))
        .unwrap()
    })
}

/// 1行分の抽出結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAgent<'a> {
    pub bundler: &'a str,
    pub rubygems: &'a str,
    pub ruby: &'a str,
    pub cpu: &'a str,
    pub vendor: &'a str,
    pub os: &'a str,
    pub command: &'a str,
    pub jruby: Option<&'a str>,
    pub options: Option<&'a str>,
    pub ci: Option<&'a str>,
    pub extra: Option<&'a str>,
}

impl<'a> UserAgent<'a> {
    /// 行を解析する。文法に合わない場合は None
    pub fn parse(line: &'a str) -> Option<Self> {
        let caps = pattern().captures(line)?;
        let get = |name: &str| caps.name(name).map(|m| m.as_str());

        Some(Self {
            bundler: get("bundler")?,
            rubygems: get("rubygems")?,
            ruby: get("ruby")?,
            cpu: get("cpu")?,
            vendor: get("vendor")?,
            os: get("os")?,
            command: get("command")?,
            jruby: get("jruby"),
            options: get("options"),
            ci: get("ci"),
            extra: get("extra"),
        })
    }

    /// options を `,` で分割した各トークン
    ///
    /// 末尾の空トークンは捨てる（`frozen,` は `frozen` だけ）。途中の空トークンは残す。
    pub fn option_names(&self) -> impl Iterator<Item = &'a str> {
        let mut names: Vec<&'a str> = self
            .options
            .map(|options| options.split(',').collect())
            .unwrap_or_default();
        while names.last().is_some_and(|name| name.is_empty()) {
            names.pop();
        }
        names.into_iter()
    }

    /// options 以外の存在するフィールドを (名前, 値) で返す（キャプチャ順）
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &'a str)> {
        [
            ("bundler", Some(self.bundler)),
            ("rubygems", Some(self.rubygems)),
            ("ruby", Some(self.ruby)),
            ("cpu", Some(self.cpu)),
            ("vendor", Some(self.vendor)),
            ("os", Some(self.os)),
            ("command", Some(self.command)),
            ("jruby", self.jruby),
            ("ci", self.ci),
            ("extra", self.extra),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| (name, value)))
    }
}
