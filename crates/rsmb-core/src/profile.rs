//! 機能プロファイルとプラットフォーム定数
//!
//! 水泳・ダッシュタイマー・しゃがみ・コイン/パワーアップ追跡・スクロール位置追跡などの
//! 任意メカニクスは、コンパイル時の切り替えではなく `Profile` で明示的に指定する。
//! `Profile` は遷移関数・ヒューリスティック・合法手生成に参照で渡される。

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;
use crate::level::TileCoord;
use crate::state::State;
use crate::types::Gravity;

// =============================================================================
// プラットフォーム定数
// =============================================================================

/// ブロックバッファ参照位置（X方向の加算値）
///
/// 0-6: 大きい状態、7-13: 大きい状態で水泳中、14-20: 小さい状態またはしゃがみ。
/// 各グループ内は 頭, 左足, 右足, 左上, 左下, 右上, 右下 の順。
pub const BLOCK_BUFFER_X_ADDER: [i32; 21] = [
    0x0800, 0x0300, 0x0c00, 0x0200, 0x0200, 0x0d00, 0x0d00, //
    0x0800, 0x0300, 0x0c00, 0x0200, 0x0200, 0x0d00, 0x0d00, //
    0x0800, 0x0300, 0x0c00, 0x0200, 0x0200, 0x0d00, 0x0d00,
];

/// ブロックバッファ参照位置（Y方向の加算値）
pub const BLOCK_BUFFER_Y_ADDER: [i32; 21] = [
    0x0400, 0x2000, 0x2000, 0x0800, 0x1800, 0x0800, 0x1800, //
    0x0200, 0x2000, 0x2000, 0x0800, 0x1800, 0x0800, 0x1800, //
    0x1200, 0x2000, 0x2000, 0x1800, 0x1800, 0x1800, 0x1800,
];

/// プラットフォームごとの物理定数
///
/// 速度は `x_spd`/`y_spd` と同じ単位（上位バイトが1フレームあたりの移動量）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConstants {
    pub max_x_spd_run: i16,
    pub max_x_spd_walk: i16,
    pub max_x_spd_swim: i16,

    pub max_y_spd: i16,
    /// 足元のブロックに着地できる深さの上限
    pub block_surface_thickness: i32,

    pub friction_run: i16,
    pub friction_walk_fast: i16,
    pub friction_walk_slow: i16,

    pub jump_velocity_slow: i16,
    pub jump_velocity_fast: i16,
    pub jump_velocity_swim: i16,

    /// 重力テーブル（`Gravity` でインデックス）
    pub v_force: [u8; Gravity::NUM],

    /// 横速度の絶対値（上位バイト）の段階しきい値
    pub x_spd_abs_cutoffs: [u8; 6],
}

impl PlatformConstants {
    /// 重力加速度
    #[inline]
    pub fn gravity(&self, g: Gravity) -> u8 {
        self.v_force[g.index()]
    }

    /// 重力テーブルの最大値
    #[inline]
    pub fn max_gravity(&self) -> u8 {
        self.v_force.iter().copied().max().unwrap_or(0)
    }

    /// 横速度の絶対値（上位バイト）から速度段階（0..=5）を求める
    pub fn speed_bucket(&self, x_spd_abs: u8) -> u8 {
        (0..self.x_spd_abs_cutoffs.len())
            .rev()
            .find(|&i| x_spd_abs >= self.x_spd_abs_cutoffs[i])
            .unwrap_or(0) as u8
    }

    /// 速度段階の下限値
    #[inline]
    pub fn bucket_floor(&self, bucket: u8) -> u8 {
        self.x_spd_abs_cutoffs[bucket as usize]
    }
}

pub static NTSC: PlatformConstants = PlatformConstants {
    max_x_spd_run: 0x2800,
    max_x_spd_walk: 0x1800,
    max_x_spd_swim: 0x1000,
    max_y_spd: 0x400,
    block_surface_thickness: 0x500,
    friction_run: 0xe4,
    friction_walk_fast: 0xd0,
    friction_walk_slow: 0x98,
    jump_velocity_slow: -0x400,
    jump_velocity_fast: -0x500,
    jump_velocity_swim: -0x180,
    v_force: [0x18, 0x28, 0x20, 0x1e, 0x28, 0x0d, 0x70, 0x60, 0x90, 0x0a],
    x_spd_abs_cutoffs: [0x00, 0x0b, 0x10, 0x19, 0x1c, 0x21],
};

pub static PAL: PlatformConstants = PlatformConstants {
    max_x_spd_run: 0x3000,
    max_x_spd_walk: 0x1c00,
    max_x_spd_swim: 0x1300,
    max_y_spd: 0x500,
    block_surface_thickness: 0x600,
    friction_run: 0x1c0,
    friction_walk_fast: 0x180,
    friction_walk_slow: 0x100,
    jump_velocity_slow: -0x4cc,
    jump_velocity_fast: -0x600,
    jump_velocity_swim: -0x180,
    v_force: [0x18, 0x70, 0x30, 0x2d, 0x38, 0x0d, 0xa8, 0x90, 0xd0, 0x0a],
    x_spd_abs_cutoffs: [0x00, 0x0d, 0x12, 0x1d, 0x20, 0x27],
};

/// 対象プラットフォーム
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Ntsc,
    Pal,
}

impl Platform {
    #[inline]
    pub fn constants(self) -> &'static PlatformConstants {
        match self {
            Platform::Ntsc => &NTSC,
            Platform::Pal => &PAL,
        }
    }
}

// =============================================================================
// Profile
// =============================================================================

/// プレイヤーの大きさ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerSize {
    #[default]
    Small,
    Big,
    /// パワーアップ取得後に大きくなる（`powerup_collected` で判定）
    BigAfterPowerup,
}

/// 機能プロファイル
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub platform: Platform,
    pub player_size: PlayerSize,
    /// 水中面
    pub swimming: bool,
    /// ダッシュタイマーを再現する
    pub running_timer: bool,
    /// 画面左端位置と横衝突タイマーを追跡する
    pub track_scroll: bool,
    /// 接地中は Y 座標の小数部を常に 0 にする
    pub clear_y_fractionals: bool,
    /// フレームパリティの周期（1 で無効）
    pub parity: u8,
    /// 追跡する唯一のコイン（未指定ならコインは無視）
    pub coin: Option<TileCoord>,
    /// 追跡する唯一のパワーアップブロック
    pub powerup_block: Option<TileCoord>,
    /// 入ることのできる縦土管（左側タイルの座標）
    pub vertical_pipe: Option<TileCoord>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            platform: Platform::Ntsc,
            player_size: PlayerSize::Small,
            swimming: false,
            running_timer: false,
            track_scroll: false,
            clear_y_fractionals: false,
            parity: 1,
            coin: None,
            powerup_block: None,
            vertical_pipe: None,
        }
    }
}

impl Profile {
    /// 組み合わせの妥当性を検査する
    pub fn validate(&self) -> Result<(), ProfileError> {
        if !(1..=8).contains(&self.parity) {
            return Err(ProfileError::InvalidParity(self.parity));
        }
        if self.player_size == PlayerSize::BigAfterPowerup && self.powerup_block.is_none() {
            return Err(ProfileError::PowerupNotTracked);
        }
        Ok(())
    }

    #[inline]
    pub fn constants(&self) -> &'static PlatformConstants {
        self.platform.constants()
    }

    /// 現在大きい状態か
    #[inline]
    pub fn is_big(&self, s: &State) -> bool {
        match self.player_size {
            PlayerSize::Small => false,
            PlayerSize::Big => true,
            PlayerSize::BigAfterPowerup => s.ext.powerup_collected,
        }
    }

    /// 大きい状態になり得るか（衝突判定の上端の見積もりに使う）
    #[inline]
    pub fn may_be_big(&self) -> bool {
        self.player_size != PlayerSize::Small
    }

    /// コインが取得済み（または追跡対象外）として無視できるか
    pub(crate) fn is_coin_collected(&self, s: &State, cx: usize, cy: usize) -> bool {
        match self.coin {
            None => true,
            Some(c) => s.ext.coin_collected || c.x != cx || c.y != cy,
        }
    }

    pub(crate) fn collect_coin(&self, s: &mut State) {
        if self.coin.is_some() {
            s.ext.coin_collected = true;
        }
    }

    /// 叩かれた後の固いブロックとして扱うか
    pub(crate) fn is_activated_powerup_block(&self, s: &State, cx: usize, cy: usize) -> bool {
        self.powerup_block.is_some_and(|b| s.ext.powerup_block_hit && b.x == cx && b.y == cy)
    }

    pub(crate) fn activate_powerup_block(&self, s: &mut State, cx: usize, cy: usize) {
        if self.powerup_block.is_some_and(|b| b.x == cx && b.y == cy) {
            s.ext.powerup_block_hit = true;
        }
    }

    pub(crate) fn may_enter_vertical_pipe(&self, cx: usize, cy: usize) -> bool {
        self.vertical_pipe.is_some_and(|p| p.x == cx && p.y == cy)
    }
}
