use anyhow::{Context, Result};
use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Output;
use aws_sdk_s3::Client;
use logtally_shared::{log_debug, LogCategory};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tokio::runtime::Runtime;

use crate::store::LogStore;

/// S3 バケットを直接読むストア
///
/// `LogStore` は同期インターフェースなので、専用のランタイムで各呼び出しを `block_on` する。
/// 認証情報は AWS の標準の解決順（環境変数、共有設定ファイル、インスタンスロール）に従う。
pub struct S3Store {
    client: Client,
    bucket: String,
    rt: Runtime,
}

impl S3Store {
    pub fn new(bucket: &str, region: Option<&str>) -> Result<Self> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start async runtime")?;

        let region = region.map(|region| aws_config::Region::new(region.to_string()));
        let config = rt.block_on(async {
            let mut loader = aws_config::from_env();
            if let Some(region) = region {
                loader = loader.region(region);
            }
            loader.load().await
        });

        Ok(Self {
            client: Client::new(&config),
            bucket: bucket.to_string(),
            rt,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn location(&self, key: &str) -> String {
        format!("s3://{}/{key}", self.bucket)
    }
}

/// 1ページ分の一覧からキーを取り出す
fn object_keys(page: &ListObjectsV2Output) -> impl Iterator<Item = String> + '_ {
    page.contents()
        .iter()
        .filter_map(|object| object.key())
        .map(str::to_string)
}

impl LogStore for S3Store {
    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = self.rt.block_on(async {
            // 1回のレスポンスは最大1000件なので全ページをたどる
            let mut pages = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .into_paginator()
                .send();

            let mut keys = Vec::new();
            while let Some(page) = pages.next().await {
                let page =
                    page.with_context(|| format!("Failed to list {}", self.location(prefix)))?;
                keys.extend(object_keys(&page));
            }
            Ok::<_, anyhow::Error>(keys)
        })?;

        keys.sort();
        log_debug!(LogCategory::Store, "{} keys under {}", keys.len(), self.location(prefix));
        Ok(keys)
    }

    fn fetch(&self, key: &str, dest: &Path) -> Result<u64> {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        self.rt.block_on(async {
            let mut object = self
                .client
                .get_object()
                .bucket(&self.bucket)
                .key(key)
                .send()
                .await
                .with_context(|| format!("Failed to get {}", self.location(key)))?;

            let mut file = tokio::fs::File::create(dest)
                .await
                .with_context(|| format!("Failed to create file: {}", dest.display()))?;

            // 本文はメモリにためずにチャンクごとに書き出す
            let mut bytes = 0u64;
            while let Some(chunk) = object
                .body
                .try_next()
                .await
                .with_context(|| format!("Failed to read {}", self.location(key)))?
            {
                file.write_all(&chunk)
                    .await
                    .with_context(|| format!("Failed to write {}", dest.display()))?;
                bytes += chunk.len() as u64;
            }
            file.flush()
                .await
                .with_context(|| format!("Failed to flush {}", dest.display()))?;

            log_debug!(LogCategory::Store, "fetched {} ({bytes} bytes)", self.location(key));
            Ok::<_, anyhow::Error>(bytes)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::types::Object;

    #[test]
    fn test_object_keys_from_page() {
        let page = ListObjectsV2Output::builder()
            .contents(
                Object::builder()
                    .key("fastly_json/2017-06-04T00:00:00.000-a.log.gz")
                    .build(),
            )
            // キーのないエントリは無視
            .contents(Object::builder().size(12).build())
            .contents(
                Object::builder()
                    .key("fastly_json/2017-06-04T01:00:00.000-b.log.gz")
                    .build(),
            )
            .build();

        let keys: Vec<String> = object_keys(&page).collect();
        assert_eq!(
            keys,
            vec![
                "fastly_json/2017-06-04T00:00:00.000-a.log.gz",
                "fastly_json/2017-06-04T01:00:00.000-b.log.gz",
            ]
        );
    }

    #[test]
    fn test_object_keys_from_empty_page() {
        let page = ListObjectsV2Output::builder().key_count(0).build();
        assert_eq!(object_keys(&page).count(), 0);
    }

    #[test]
    fn test_store_keeps_bucket_name() {
        // 設定の読み込みだけでは通信しない
        let store = S3Store::new("rubygems-logs", Some("us-west-2")).unwrap();
        assert_eq!(store.bucket(), "rubygems-logs");
        assert_eq!(
            store.location("fastly_json/2017-06-04"),
            "s3://rubygems-logs/fastly_json/2017-06-04"
        );
    }
}
