use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Serialize;

use crate::platform::Platform;

/// 値 → 出現回数
pub type CountMap = IndexMap<String, u64>;

pub const OPTIONS_FIELD: &str = "options";
pub const PLATFORMS_FIELD: &str = "platforms";
const OS_FIELD: &str = "os";

/// フィールド名 → 集計結果
///
/// フィールドは初めて値が記録された順に並ぶ。値のない
/// フィールドは作られない。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Report {
    fields: IndexMap<String, CountMap>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// 値のカウントを1増やす（フィールドは初回に作成）
    pub fn increment(&mut self, field: &str, value: &str) {
        self.add(field, value, 1);
    }

    fn add(&mut self, field: &str, value: &str, count: u64) {
        let counts = self.fields.entry(field.to_string()).or_default();
        let entry = counts.entry(value.to_string()).or_insert(0);
        *entry += count;
    }

    pub fn field(&self, name: &str) -> Option<&CountMap> {
        self.fields.get(name)
    }

    pub fn count(&self, field: &str, value: &str) -> u64 {
        self.field(field)
            .and_then(|counts| counts.get(value))
            .copied()
            .unwrap_or(0)
    }

    /// フィールド内の合計
    pub fn total(&self, field: &str) -> u64 {
        self.field(field)
            .map(|counts| counts.values().sum())
            .unwrap_or(0)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// os の集計から platforms を作り直す
    ///
    /// どの分類にも入らない os はここには現れない（os 側には残る）。
    pub fn derive_platforms(&mut self) {
        let mut platforms = CountMap::new();
        if let Some(os_counts) = self.fields.get(OS_FIELD) {
            for (os, count) in os_counts {
                if let Some(platform) = Platform::classify(os) {
                    *platforms.entry(platform.as_str().to_string()).or_insert(0) += count;
                }
            }
        }
        self.fields.insert(PLATFORMS_FIELD.to_string(), platforms);
    }

    /// インデント付きJSON
    pub fn to_pretty_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize report to JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_creates_field_on_first_use() {
        let mut report = Report::new();
        assert!(report.is_empty());
        assert!(report.field("bundler").is_none());

        report.increment("bundler", "2.1.4");
        report.increment("bundler", "2.1.4");
        report.increment("bundler", "1.17.3");

        assert_eq!(report.count("bundler", "2.1.4"), 2);
        assert_eq!(report.count("bundler", "1.17.3"), 1);
        assert_eq!(report.count("bundler", "0.0.1"), 0);
        assert_eq!(report.total("bundler"), 3);
    }

    #[test]
    fn test_field_order_is_insertion_order() {
        let mut report = Report::new();
        report.increment("ruby", "2.7.1");
        report.increment("bundler", "2.1.4");
        report.increment("ruby", "2.6.0");
        report.increment("ci", "travis");

        let names: Vec<&str> = report.field_names().collect();
        assert_eq!(names, vec!["ruby", "bundler", "ci"]);
    }

    #[test]
    fn test_derive_platforms() {
        let mut report = Report::new();
        for _ in 0..5 {
            report.increment("os", "linux-gnu");
        }
        for _ in 0..3 {
            report.increment("os", "darwin17");
        }
        for _ in 0..2 {
            report.increment("os", "freebsd11");
        }
        report.increment("os", "java");

        report.derive_platforms();

        let platforms = report.field(PLATFORMS_FIELD).unwrap();
        assert_eq!(platforms.len(), 3);
        assert_eq!(platforms["linux"], 5);
        assert_eq!(platforms["darwin"], 3);
        assert_eq!(platforms["bsd"], 2);
        assert!(!platforms.contains_key("windows"));
        // 分類外の os も os 側には残る
        assert_eq!(report.count("os", "java"), 1);
    }

    #[test]
    fn test_windows_platforms_are_merged() {
        let mut report = Report::new();
        report.increment("os", "mingw32");
        report.increment("os", "mswin64");
        report.derive_platforms();
        assert_eq!(report.count(PLATFORMS_FIELD, "windows"), 2);
    }

    #[test]
    fn test_derive_platforms_without_os() {
        let mut report = Report::new();
        report.derive_platforms();
        assert_eq!(report.field(PLATFORMS_FIELD).map(|p| p.len()), Some(0));
    }

    #[test]
    fn test_pretty_json_shape() {
        let mut report = Report::new();
        report.increment("bundler", "2.1.4");
        report.increment("os", "linux-gnu");
        report.derive_platforms();

        let json = report.to_pretty_json().unwrap();
        assert!(json.contains("\n  \"bundler\": {\n    \"2.1.4\": 1\n  }"));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["platforms"]["linux"], 1);
        assert_eq!(value["os"]["linux-gnu"], 1);

        // platforms は最後に追加されたフィールド
        assert_eq!(report.field_names().last(), Some(PLATFORMS_FIELD));
        assert!(json.find("\"platforms\"").unwrap() > json.find("\"os\"").unwrap());
    }
}
