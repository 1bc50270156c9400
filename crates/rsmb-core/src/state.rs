//! 物理状態（State）
//!
//! 1フレーム時点で遷移を続けるのに必要な変数のすべて。ステップ数や探索の管理情報は持たない。
//!
//! # 単位
//!
//! - `x_pos`: 下位8bitがサブピクセル、`>> 8` がピクセル、`>> 12` がブロック、`>> 16` がページ
//! - `y_pos`: 同上。`0x10000` が画面上端（`>> 16` が 1 のとき画面内）
//! - `x_spd`/`y_spd`: 上位バイトが1フレームあたりのピクセル移動量
//!
//! 比較は宣言順のフィールド辞書式順序で、この全順序を状態ストアのキーに使う。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::profile::{PlatformConstants, Profile};
use crate::types::{Dir, Gravity, PlayerState};

/// 物理状態
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(default)]
pub struct State {
    pub x_pos: i32,
    pub y_pos: i32,
    pub x_spd: i16,
    pub y_spd: i16,
    pub player_state: PlayerState,
    pub moving_dir: Dir,
    pub facing_dir: Dir,
    /// 現在の重力
    pub v_force: Gravity,
    /// 上昇終了後に切り替わる重力
    pub v_force_down: Gravity,
    /// 横速度の段階（0..=5、しきい値は `PlatformConstants::x_spd_abs_cutoffs`）
    pub x_spd_abs: u8,
    pub running_speed: bool,
    /// 横方向に移動可能な向き
    pub collision_bits: Dir,
    /// プロファイル依存のフィールド
    pub ext: StateExt,
}

/// プロファイルで有効なときだけ変化するフィールド
///
/// 無効なプロファイルでは常に初期値のまま。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(default)]
pub struct StateExt {
    /// しゃがみ（大きい状態のみ）
    pub is_crouching: bool,
    /// 水泳の連続ジャンプ受付（水中面のみ）
    pub jump_swim_timer: u8,
    /// ダッシュタイマー
    pub running_timer: u8,
    /// 画面左端のピクセル位置
    pub left_screen_edge_pos: u8,
    /// 横衝突後のスクロール停止タイマー
    pub side_collision_timer: u8,
    pub coin_collected: bool,
    pub powerup_block_hit: bool,
    pub powerup_collected: bool,
    /// フレームパリティ
    pub parity: u8,
}

impl Default for State {
    fn default() -> Self {
        Self {
            x_pos: 0,
            y_pos: 0,
            x_spd: 0,
            y_spd: 0,
            player_state: PlayerState::Standing,
            moving_dir: Dir::NONE,
            facing_dir: Dir::RIGHT,
            v_force: Gravity::AreaInit,
            v_force_down: Gravity::AreaInit,
            x_spd_abs: 0,
            running_speed: false,
            collision_bits: Dir::LR,
            ext: StateExt::default(),
        }
    }
}

impl State {
    /// 静止して立っている状態
    pub fn standing(x_pos: i32, y_pos: i32) -> Self {
        Self { x_pos, y_pos, ..Self::default() }
    }

    #[inline]
    pub fn is_on_ground(&self) -> bool {
        self.player_state == PlayerState::Standing
    }

    /// 横速度の絶対値（上位バイト）から速度段階を設定する
    #[inline]
    pub fn set_x_spd_abs(&mut self, platform: &PlatformConstants, spd_abs: u8) {
        self.x_spd_abs = platform.speed_bucket(spd_abs);
    }

    /// `x_spd` から速度段階を設定し直す
    pub fn with_synced_speed_bucket(mut self, platform: &PlatformConstants) -> Self {
        let abs = (i32::from(self.x_spd) >> 8).unsigned_abs().min(0xff) as u8;
        self.set_x_spd_abs(platform, abs);
        self
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "State {{")?;
        writeln!(f, "  x_pos: {:#x}", self.x_pos)?;
        writeln!(f, "  y_pos: {:#x}", self.y_pos)?;
        writeln!(f, "  x_spd: {:#x}", self.x_spd)?;
        writeln!(f, "  y_spd: {:#x}", self.y_spd)?;
        writeln!(f, "  player_state: {:?}", self.player_state)?;
        writeln!(f, "  moving_dir: {}", self.moving_dir)?;
        writeln!(f, "  facing_dir: {}", self.facing_dir)?;
        writeln!(f, "  v_force: {:?}", self.v_force)?;
        writeln!(f, "  v_force_down: {:?}", self.v_force_down)?;
        writeln!(f, "  x_spd_abs: {}", self.x_spd_abs)?;
        writeln!(f, "  running_speed: {}", self.running_speed)?;
        writeln!(f, "  collision_bits: {}", self.collision_bits)?;
        writeln!(f, "  ext: {:?}", self.ext)?;
        write!(f, "}}")
    }
}

// =============================================================================
// 開始状態のバリエーション
// =============================================================================

/// 左右両方の向きを持つ状態に展開する
pub fn with_facing_dirs(states: &[State]) -> Vec<State> {
    states
        .iter()
        .flat_map(|s| {
            [Dir::RIGHT, Dir::LEFT].map(|facing_dir| State { facing_dir, ..s.clone() })
        })
        .collect()
}

/// X 座標をサブピクセル単位（0x10）で `steps` 段階まで小さくした状態に展開する
///
/// スクロール位置を追跡している場合は画面左端もピクセル差分だけずらす。
pub fn with_smaller_x_pos(profile: &Profile, states: &[State], steps: u32) -> Vec<State> {
    let mut out = Vec::with_capacity(states.len() * (steps as usize + 1));
    for s in states {
        for i in 0..=steps as i32 {
            let mut v = s.clone();
            v.x_pos = s.x_pos - i * 0x10;
            if profile.track_scroll {
                let pixel_delta = (s.x_pos >> 8) - (v.x_pos >> 8);
                v.ext.left_screen_edge_pos = v.ext.left_screen_edge_pos.wrapping_sub(pixel_delta as u8);
            }
            out.push(v);
        }
    }
    out
}

/// 横速度のサブピクセル部（4刻み、64通り）をすべて試す状態に展開する
pub fn with_all_x_spd_subpixels(states: &[State]) -> Vec<State> {
    let mut out = Vec::with_capacity(states.len() * 0x40);
    for s in states {
        for i in 0..0x40i16 {
            let mut v = s.clone();
            v.x_spd = (s.x_spd & 0x7f00) + (i << 2);
            out.push(v);
        }
    }
    out
}
