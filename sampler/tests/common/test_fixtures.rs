// テストフィクスチャ: バケットのローカルミラーを作る

#![cfg(test)]
#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// 一意なテストIDを生成
pub fn generate_test_id() -> String {
    format!("test_{}", uuid::Uuid::new_v4())
}

/// `<root>/<key>` にダミーのログファイルを作る
pub fn put_object(root: &Path, key: &str) -> PathBuf {
    let path = key.split('/').fold(root.to_path_buf(), |path, part| path.join(part));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, format!("header\n{key}\n")).unwrap();
    path
}

/// 指定した日ごとに `per_day` 個のオブジェクトを持つミラーを作る
pub fn create_mirror(root: &Path, dates: &[&str], per_day: usize) -> Vec<String> {
    let mut keys = Vec::new();
    for date in dates {
        for hour in 0..per_day {
            let key = format!("fastly_json/{date}T{hour:02}0000.000-{}.log.gz", generate_test_id());
            put_object(root, &key);
            keys.push(key);
        }
    }
    keys
}
