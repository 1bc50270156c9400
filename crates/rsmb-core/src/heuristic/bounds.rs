//! 到達範囲の上下界
//!
//! 左端・右端・上端・下端の4本の極値軌道を1フレームずつ進める。
//! どの軌道も、実際の遷移で到達し得るどの位置よりも外側にあることを保つ。

use crate::level::{LevelMap, tile};
use crate::profile::{PlatformConstants, Profile};
use crate::state::State;
use crate::types::PlayerState;

/// 滞空フェーズを追跡する最大フレーム数（以降は地上フェーズの評価に切り替える）
pub(super) const AIRBORNE_STEP_LIMIT: u32 = 128;

/// 落下速度が `max_y_spd` を超え得る幅
///
/// 最高速のクランプは下位バイトが 0x80 以上のときしか効かないため、
/// 重力加速度によっては上限を一時的に超える。
pub(super) const Y_SPD_OVERSHOOT: i32 = 0x300;

/// 壁に押し戻されるときの移動量
const WALL_EJECTION: i32 = 0x100;

/// 横方向の極値軌道
#[derive(Debug, Clone, Copy)]
pub(super) struct XReach {
    pub pos: i32,
    pub spd: i32,
}

/// 縦方向の極値軌道
#[derive(Debug, Clone, Copy)]
pub(super) struct YReach {
    pub pos: i32,
    pub spd: i32,
    pub force: i32,
}

/// 4本の極値軌道
#[derive(Debug, Clone, Copy)]
pub(super) struct Reach {
    pub left: XReach,
    pub right: XReach,
    pub up: YReach,
    pub down: YReach,
}

impl Reach {
    pub(super) fn new(c: &PlatformConstants, s: &State) -> Self {
        let x = XReach { pos: s.x_pos, spd: i32::from(s.x_spd) };
        let vf = i32::from(c.gravity(s.v_force));
        let vfd = i32::from(c.gravity(s.v_force_down));
        // 上昇中はAボタンを離すと重力が切り替わる。落下中は常に v_force_down
        let up_force = if s.player_state == PlayerState::Jumping { vf.min(vfd) } else { vfd };
        Self {
            left: x,
            right: x,
            up: YReach { pos: s.y_pos, spd: i32::from(s.y_spd), force: up_force },
            down: YReach { pos: s.y_pos, spd: i32::from(s.y_spd), force: vf.max(vfd) },
        }
    }

    /// 4本の軌道がなす矩形が目標矩形と交わるか
    #[inline]
    pub(super) fn intersects(&self, left: i32, top: i32, right: i32, bottom: i32) -> bool {
        self.left.pos <= right && self.right.pos >= left && self.up.pos <= bottom && self.down.pos >= top
    }

    // =========================================================================
    // 滞空フェーズ（衝突なし）
    // =========================================================================

    /// 衝突のない1フレーム
    ///
    /// 空中では向きと `running_speed` は変わらない。摩擦は最大値（ダッシュ摩擦の倍）、
    /// 最高速はダッシュ最高速 + 下位バイトで見積もる。
    pub(super) fn airborne_step(&mut self, c: &PlatformConstants, vfd: i32) {
        let friction = 2 * i32::from(c.friction_run);
        let cap = i32::from(c.max_x_spd_run) + 0xff;

        // 歩き最高速でのクランプは逆向きの速度を下位バイトぶん戻し得る
        let walk = i32::from(c.max_x_spd_walk);
        accelerate(&mut self.right.spd, friction, cap);
        self.right.spd = self.right.spd.max(0xff - walk);
        self.right.pos += (self.right.spd >> 8) << 4;
        accelerate(&mut self.left.spd, -friction, -cap);
        self.left.spd = self.left.spd.min(walk);
        self.left.pos += (self.left.spd >> 8) << 4;

        let max_y_spd = i32::from(c.max_y_spd);

        // 上端: 重力は小さい方、最高速のクランプは常に効くとみなす
        self.up.pos += self.up.spd;
        self.up.spd += self.up.force;
        if self.up.spd >= max_y_spd {
            self.up.spd = max_y_spd;
        }
        if self.up.spd >= 0 {
            self.up.force = vfd;
        }

        // 下端: 重力は大きい方、クランプは効かないとみなす
        self.down.pos += self.down.spd;
        self.down.spd = (self.down.spd + self.down.force).min(max_y_spd + Y_SPD_OVERSHOOT);
    }

    // =========================================================================
    // 地上フェーズ（衝突あり）
    // =========================================================================

    /// 地上フェーズへ切り替える
    ///
    /// 頭上のブロックに当たると下向きに 0x1ff まで速度が変わり得る。
    pub(super) fn enter_ground_phase(&mut self, c: &PlatformConstants) {
        self.down.pos |= 0xff;
        self.down.spd = self.down.spd.max(0x1ff);
        self.down.force = i32::from(c.max_gravity());
    }

    /// 衝突を含む最悪ケースの1フレーム
    ///
    /// 壁による押し戻し（速度の下位バイト化と ±0x100 の移動）と、
    /// ジャンプ開始時の Y 座標の小数部切り捨てを含める。
    pub(super) fn any_step(&mut self, c: &PlatformConstants) {
        let friction = 2 * i32::from(c.friction_run);
        let cap = i32::from(c.max_x_spd_run) + 0xff;

        // 押し戻しで速度は下位バイトだけになり、静止判定で 0 になり得る
        self.right.spd = self.right.spd.max(0xff);
        accelerate(&mut self.right.spd, friction, cap);
        self.right.pos += ((self.right.spd >> 8) << 4).max(WALL_EJECTION);

        self.left.spd = self.left.spd.min(0);
        accelerate(&mut self.left.spd, -friction, -cap);
        self.left.pos += ((self.left.spd >> 8) << 4).min(-WALL_EJECTION);

        self.up.pos = (self.up.pos & !0xff) + i32::from(c.jump_velocity_fast);

        let max_y_spd = i32::from(c.max_y_spd);
        self.down.pos += self.down.spd;
        self.down.spd = (self.down.spd + self.down.force).min(max_y_spd + Y_SPD_OVERSHOOT);
    }
}

/// `cap` に向けて `delta` だけ加速する（既に `cap` を超えていれば変えない）
#[inline]
pub(super) fn accelerate(spd: &mut i32, delta: i32, cap: i32) {
    if delta > 0 {
        if *spd < cap {
            *spd = (*spd + delta).min(cap);
        }
    } else if *spd > cap {
        *spd = (*spd + delta).max(cap);
    }
}

/// 矩形内に背景衝突を起こし得るタイル（コイン以外）があるか
///
/// 矩形はプレイヤー位置の範囲で、ブロックバッファ参照位置の最大の広がりで拡張する。
pub(super) fn any_block_in_rect<L: LevelMap>(
    profile: &Profile,
    level: &L,
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
) -> bool {
    const BB_LEFT: i32 = 0x0200;
    const BB_RIGHT: i32 = 0x0d00;
    const BB_DOWN: i32 = 0x2000;
    let bb_up = match (profile.may_be_big(), profile.swimming) {
        (true, true) => 0x0200,
        (true, false) => 0x0400,
        (false, _) => 0x1200,
    };

    let min_x = (left + BB_LEFT) >> 12;
    let max_x = (right + BB_RIGHT) >> 12;
    let min_y = ((top + bb_up - 0x2000) >> 12).max(0x10);
    let max_y = ((bottom + BB_DOWN - 0x2000) >> 12).min(0x1c);
    for x in min_x..=max_x {
        for y in min_y..=max_y {
            let code = level.tile_at_signed(x, y & 0x0f);
            if code != 0 && !tile::is_coin(code) {
                return true;
            }
        }
    }
    false
}
