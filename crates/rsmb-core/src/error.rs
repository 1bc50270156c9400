//! エラー型
//!
//! 設定エラー（回復不能）だけを `Err` で返す。
//! 探索の打ち切りや範囲外状態は通常の戻り値で表す。

use crate::types::PlayerState;

/// 遷移関数のエラー
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmuError {
    /// 遷移関数が扱わない移動モード
    #[error("movement mode {0:?} is not supported by the transition function")]
    UnsupportedMovement(PlayerState),

    /// settle が上限フレーム数までに落ち着かなかった
    #[error("state did not settle within {steps} neutral steps")]
    SettleDidNotConverge { steps: u32 },
}

/// プロファイル設定のエラー
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// フレームパリティの周期が範囲外
    #[error("parity period must be within 1..=8, got {0}")]
    InvalidParity(u8),

    /// パワーアップ後に大きくなる設定にはパワーアップブロックの追跡が必要
    #[error("player size `big_after_powerup` requires a tracked powerup block")]
    PowerupNotTracked,
}

/// タイルマップのエラー
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LevelError {
    /// 行数が 13 でない
    #[error("level must have exactly {expected} rows, got {actual}")]
    RowCount { expected: usize, actual: usize },

    /// 行ごとの幅が揃っていない
    #[error("row {row} has width {actual}, expected {expected}")]
    RaggedRow { row: usize, expected: usize, actual: usize },

    /// タイルコードが16進数として読めない
    #[error("invalid tile code {token:?} at row {row}")]
    InvalidTile { row: usize, token: String },
}

/// 探索エラー
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error(transparent)]
    Emu(#[from] EmuError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// 開始状態が1つもない
    #[error("no start states were given")]
    NoStartStates,
}
