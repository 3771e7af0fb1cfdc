use std::time::Duration;
use thiserror::Error;

/// ベンチマーク全体の結果型
pub type Result<T> = std::result::Result<T, HimenoError>;

/// 実行を中断する致命的エラー（リトライはしない）
#[derive(Error, Debug)]
pub enum HimenoError {
    /// スレッド数・格子サイズなどの設定が不正
    #[error("configuration error: {0}")]
    Configuration(String),

    /// 格子バッファを確保できない
    #[error("allocation error: grid fields need {bytes} bytes but only {available} bytes are available")]
    Allocation { bytes: u128, available: u64 },

    /// 経過時間が0以下で MFLOPS を計算できない
    #[error("measurement degenerate: elapsed time {elapsed:?} is too small to derive throughput")]
    MeasurementDegenerate { elapsed: Duration },
}

impl HimenoError {
    pub fn config(msg: impl Into<String>) -> Self {
        HimenoError::Configuration(msg.into())
    }
}
