use anyhow::{Context, Result};
use logtally_shared::{log_debug, log_info, log_parser, LogCategory};
use serde::Serialize;
use std::io::Write;

use crate::report::{Report, OPTIONS_FIELD};
use crate::user_agent::UserAgent;

/// 実行サマリー
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisStats {
    /// ヘッダーを除いた入力行数
    pub lines_read: usize,
    /// 重複除去後の行数
    pub distinct_lines: usize,
    pub matched: usize,
    pub unmatched: usize,
}

impl AnalysisStats {
    /// 1行の JSON にする（verbose 時のサマリー出力用）
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize run summary")
    }
}

/// ヘッダー行を捨て、ソートして重複を除く
pub fn prepare_lines<I>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut lines: Vec<String> = lines.into_iter().skip(1).collect();
    lines.sort();
    lines.dedup();
    lines
}

/// User-agent の集計器
#[derive(Debug, Default)]
pub struct Analyzer {
    report: Report,
    stats: AnalysisStats,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 入力全体（1行目はヘッダー）を集計して platforms まで導出する
    ///
    /// 文法に合わない行は `diagnostics` に書き出して読み飛ばす。
    pub fn analyze<I, W>(lines: I, diagnostics: &mut W) -> Result<(Report, AnalysisStats)>
    where
        I: IntoIterator<Item = String>,
        W: Write,
    {
        let mut lines_read: usize = 0;
        let prepared = prepare_lines(lines.into_iter().inspect(|_| lines_read += 1));

        let mut analyzer = Self::new();
        analyzer.stats.lines_read = lines_read.saturating_sub(1);
        analyzer.stats.distinct_lines = prepared.len();
        log_debug!(
            LogCategory::Input,
            "{} lines after header, {} distinct",
            analyzer.stats.lines_read,
            analyzer.stats.distinct_lines
        );

        for line in &prepared {
            analyzer.process_line(line, diagnostics)?;
        }

        Ok(analyzer.finish())
    }

    /// 1行を処理する。一致した場合は true
    pub fn process_line<W: Write>(&mut self, line: &str, diagnostics: &mut W) -> Result<bool> {
        let Some(ua) = UserAgent::parse(line) else {
            self.stats.unmatched += 1;
            log_parser!(debug, "skipped unmatched line ({} so far)", self.stats.unmatched);
            writeln!(diagnostics, "No match! Line was:\n{line}")
                .context("Failed to write diagnostics")?;
            return Ok(false);
        };

        self.stats.matched += 1;
        log_parser!(trace, "matched bundler/{} command/{}", ua.bundler, ua.command);
        self.record(&ua);
        Ok(true)
    }

    fn record(&mut self, ua: &UserAgent<'_>) {
        // options は分割した各トークンだけを数える
        for name in ua.option_names() {
            self.report.increment(OPTIONS_FIELD, name);
        }

        for (field, value) in ua.fields() {
            self.report.increment(field, value);
        }
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn stats(&self) -> AnalysisStats {
        self.stats
    }

    /// platforms を導出して結果を返す
    pub fn finish(mut self) -> (Report, AnalysisStats) {
        self.report.derive_platforms();
        log_info!(
            LogCategory::Report,
            "matched {} of {} distinct lines ({} unmatched)",
            self.stats.matched,
            self.stats.distinct_lines,
            self.stats.unmatched
        );
        (self.report, self.stats)
    }
}

/// 文法に合わない行だけを返す（ヘッダー除去・ソート・重複除去後）
pub fn unknown_lines<I>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    prepare_lines(lines)
        .into_iter()
        .filter(|line| UserAgent::parse(line).is_none())
        .collect()
}
