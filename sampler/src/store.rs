use anyhow::{Context, Result};
use logtally_shared::{log_debug, LogCategory};
use std::fs;
use std::path::{Path, PathBuf};

/// ログファイルを保持するオブジェクトストアの共通インターフェース
pub trait LogStore {
    /// 接頭辞に一致するキーを返す（ソート済み）
    fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// キーの内容を `dest` に保存し、書き込んだバイト数を返す
    fn fetch(&self, key: &str, dest: &Path) -> Result<u64>;
}

/// バケットをローカルディレクトリにミラーしたストア
///
/// キーはルートからの相対パスを `/` で区切ったもの。
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            anyhow::bail!("Store root is not a directory: {}", root.display());
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        key.split('/').fold(self.root.clone(), |path, part| path.join(part))
    }

    fn collect_keys(&self, dir: &Path, prefix: &str, keys: &mut Vec<String>) -> Result<()> {
        let entries = fs::read_dir(dir)
            .with_context(|| format!("Failed to list directory: {}", dir.display()))?;

        for entry in entries {
            let entry = entry
                .with_context(|| format!("Failed to read entry in {}", dir.display()))?;
            let path = entry.path();
            let relative = path
                .strip_prefix(&self.root)
                .with_context(|| format!("Entry outside store root: {}", path.display()))?;
            let key = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            if path.is_dir() {
                // 接頭辞と関係のないディレクトリは降りない
                let dir_key = format!("{key}/");
                if dir_key.starts_with(prefix) || prefix.starts_with(&dir_key) {
                    self.collect_keys(&path, prefix, keys)?;
                }
            } else if key.starts_with(prefix) {
                keys.push(key);
            }
        }

        Ok(())
    }
}

impl LogStore for LocalStore {
    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        self.collect_keys(&self.root, prefix, &mut keys)?;
        keys.sort();
        log_debug!(LogCategory::Store, "{} keys under {prefix}", keys.len());
        Ok(keys)
    }

    fn fetch(&self, key: &str, dest: &Path) -> Result<u64> {
        let source = self.key_path(key);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::copy(&source, dest).with_context(|| {
            format!("Failed to copy {} to {}", source.display(), dest.display())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(files: &[&str]) -> (tempfile::TempDir, LocalStore) {
        let dir = tempfile::tempdir().unwrap();
        for file in files {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, file.as_bytes()).unwrap();
        }
        let store = LocalStore::new(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_list_filters_by_prefix() {
        let (_dir, store) = store_with(&[
            "fastly_json/2017-06-04T00:00:00.000-a.log.gz",
            "fastly_json/2017-06-04T01:00:00.000-b.log.gz",
            "fastly_json/2017-06-05T00:00:00.000-c.log.gz",
            "fastly_stats/2017-06-04T00:00:00.000-a.log.gz.json",
        ]);

        let keys = store.list("fastly_json/2017-06-04").unwrap();
        assert_eq!(
            keys,
            vec![
                "fastly_json/2017-06-04T00:00:00.000-a.log.gz",
                "fastly_json/2017-06-04T01:00:00.000-b.log.gz",
            ]
        );
        assert!(store.list("fastly_json/2017-06-06").unwrap().is_empty());
        assert_eq!(store.list("").unwrap().len(), 4);
    }

    #[test]
    fn test_list_nested_keys() {
        let (_dir, store) = store_with(&["fastly_json/2017-06-04/part-0.log.gz"]);
        assert_eq!(
            store.list("fastly_json/2017-06-04").unwrap(),
            vec!["fastly_json/2017-06-04/part-0.log.gz"]
        );
    }

    #[test]
    fn test_fetch_copies_file() {
        let (_dir, store) = store_with(&["fastly_json/2017-06-04-a.log.gz"]);
        let out = tempfile::tempdir().unwrap();
        let dest = out.path().join("nested").join("a.log.gz");

        let bytes = store.fetch("fastly_json/2017-06-04-a.log.gz", &dest).unwrap();
        assert_eq!(bytes, "fastly_json/2017-06-04-a.log.gz".len() as u64);
        assert_eq!(
            fs::read_to_string(&dest).unwrap(),
            "fastly_json/2017-06-04-a.log.gz"
        );
    }

    #[test]
    fn test_fetch_missing_key_fails() {
        let (_dir, store) = store_with(&[]);
        let out = tempfile::tempdir().unwrap();
        assert!(store.fetch("fastly_json/nope", &out.path().join("nope")).is_err());
    }

    #[test]
    fn test_root_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        assert!(LocalStore::new(dir.path().join("missing")).is_err());
    }
}
