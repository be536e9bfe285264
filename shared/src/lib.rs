pub mod config;
pub mod logging;

pub use config::*;
pub use logging::{LogCategory, LogLevel};

// マクロ展開先から参照されるため再エクスポート
#[doc(hidden)]
pub use paste;
