//! 移動モードと重力テーブル

use serde::{Deserialize, Serialize};

/// 移動モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    /// 接地
    #[default]
    Standing,
    /// 上昇中（ジャンプ・水泳）
    Jumping,
    /// 落下中
    Falling,
    /// ツタ・旗竿につかまっている（遷移関数は扱わない）
    Climbing,
}

/// 重力テーブルのインデックス
///
/// 実際の加速度はプラットフォームごとの表（`PlatformConstants::v_force`）で引く。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Gravity {
    SwimTooHigh = 0,
    #[default]
    AreaInit = 1,
    JumpStanding = 2,
    JumpWalking = 3,
    JumpRunning = 4,
    JumpSwimming = 5,
    FallStanding = 6,
    FallWalking = 7,
    FallRunning = 8,
    FallSwimming = 9,
}

impl Gravity {
    /// テーブルのエントリ数
    pub const NUM: usize = 10;

    /// インデックスとして使用（配列アクセス用）
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}
