use anyhow::{Context, Result};
use chrono::NaiveDate;
use logtally_shared::{log_sampler, log_warn, LogCategory};
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::{Path, PathBuf};

use crate::plan::SamplePlan;
use crate::store::LogStore;

/// ダウンロードしたサンプル1件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampledLog {
    pub date: NaiveDate,
    pub key: String,
    pub path: PathBuf,
    pub bytes: u64,
    /// その日のログファイル数
    pub candidates: usize,
}

/// 日ごとに1ファイルを無作為に選んでダウンロードする
pub struct Sampler<S> {
    store: S,
    destination: PathBuf,
    key_prefix: String,
}

impl<S: LogStore> Sampler<S> {
    pub fn new<P: Into<PathBuf>>(store: S, destination: P, key_prefix: &str) -> Self {
        Self {
            store,
            destination: destination.into(),
            key_prefix: key_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// 計画に沿って全日分をサンプリング
    pub fn run<R: Rng + ?Sized>(&self, plan: &SamplePlan, rng: &mut R) -> Result<Vec<SampledLog>> {
        std::fs::create_dir_all(&self.destination).with_context(|| {
            format!(
                "Failed to create destination directory: {}",
                self.destination.display()
            )
        })?;

        log_sampler!(
            info,
            "sampling {} through {} every {} day(s) into {}",
            plan.start(),
            plan.end(),
            plan.jump_days(),
            self.destination.display()
        );

        let mut sampled = Vec::new();
        for date in plan.dates() {
            if let Some(log) = self.sample_date(date, &mut *rng)? {
                sampled.push(log);
            }
        }

        log_sampler!(info, "downloaded {} log file(s)", sampled.len());
        Ok(sampled)
    }

    /// 1日分を処理。ファイルがない日は None
    pub fn sample_date<R: Rng + ?Sized>(
        &self,
        date: NaiveDate,
        rng: &mut R,
    ) -> Result<Option<SampledLog>> {
        let prefix = self.date_prefix(date);
        let keys = self.store.list(&prefix)?;
        log_sampler!(info, "{} had {} logfiles", date.format("%Y-%m-%d"), keys.len());

        let Some(key) = keys.choose(rng) else {
            log_warn!(LogCategory::Sampler, "no log files under {prefix}, skipping");
            return Ok(None);
        };

        let name = self.local_name(key);
        log_sampler!(info, "Downloading {name}...");

        let path = self.destination.join(name);
        let bytes = self.store.fetch(key, &path)?;

        Ok(Some(SampledLog {
            date,
            key: key.clone(),
            path,
            bytes,
            candidates: keys.len(),
        }))
    }

    fn date_prefix(&self, date: NaiveDate) -> String {
        format!("{}/{}", self.key_prefix, date.format("%Y-%m-%d"))
    }

    /// キーから接頭辞ディレクトリを除いたファイル名
    fn local_name<'k>(&self, key: &'k str) -> &'k str {
        key.strip_prefix(&self.key_prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(key)
    }
}
