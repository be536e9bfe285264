use std::fmt;

/// os フィールドから導出するプラットフォーム分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Darwin,
    Linux,
    Windows,
    Bsd,
}

impl Platform {
    /// os 文字列を分類する（darwin → linux → windows → bsd の順で最初の一致）
    pub fn classify(os: &str) -> Option<Self> {
        if os.contains("darwin") {
            Some(Platform::Darwin)
        } else if os.contains("linux") {
            Some(Platform::Linux)
        } else if os.contains("mswin") || os.contains("mingw") {
            Some(Platform::Windows)
        } else if os.contains("bsd") {
            Some(Platform::Bsd)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Darwin => "darwin",
            Platform::Linux => "linux",
            Platform::Windows => "windows",
            Platform::Bsd => "bsd",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
