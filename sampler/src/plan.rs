use anyhow::{bail, Context, Result};
use chrono::{Days, NaiveDate};

/// 日付文字列 (YYYY-MM-DD) を解析
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date (expected YYYY-MM-DD): {value}"))
}

/// サンプリング対象日の計画
///
/// 開始日から終了日まで（両端含む）を `sample_count` 分割した間隔で進む。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplePlan {
    start: NaiveDate,
    end: NaiveDate,
    jump_days: u64,
}

impl SamplePlan {
    pub fn new(start: NaiveDate, end: NaiveDate, sample_count: u32) -> Result<Self> {
        if sample_count == 0 {
            bail!("sample count must be at least 1");
        }

        let days = if end >= start {
            (end - start).num_days() as u64 + 1
        } else {
            0
        };
        // 期間がサンプル数より短い場合でも毎日1つずつ進む
        let jump_days = (days / u64::from(sample_count)).max(1);

        Ok(Self {
            start,
            end,
            jump_days,
        })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn jump_days(&self) -> u64 {
        self.jump_days
    }

    /// 対象日を順に返す
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let jump = Days::new(self.jump_days);
        let end = self.end;
        std::iter::successors(Some(self.start), move |date| date.checked_add_days(jump))
            .take_while(move |date| *date <= end)
    }
}
