//! ヒューリスティック（目標矩形までの許容的な下界）
//!
//! `BoundsHeuristic` は現在の状態から目標矩形に入るまでの最小フレーム数を見積もる。
//! 見積もりは実際のフレーム数を決して超えない（超えると反復深化が最短解を見逃す）。
//!
//! # 2段階の評価
//!
//! 1. 滞空フェーズ: 接地しておらず、到達範囲にブロックがない間は、
//!    衝突のない積分で4本の極値軌道（左端・右端・上端・下端）を進める。
//! 2. 地上フェーズ: 接地後、または到達範囲がブロックに触れた時点から、
//!    壁の押し戻しと最大ジャンプを含む最悪ケースの積分に切り替える。
//!
//! どちらも遷移関数と同じ固定小数点の単位とシフトで計算する。

mod bounds;

use crate::goal::GoalRegion;
use crate::level::LevelMap;
use crate::profile::{PlatformConstants, Profile};
use crate::state::State;
use crate::types::Dist;

use bounds::{AIRBORNE_STEP_LIMIT, Reach, accelerate, any_block_in_rect};

/// 地上フェーズの評価の打ち切り（これ以上は「少なくともこの値」を返す）
pub const GROUND_STEP_LIMIT: Dist = 4096;

/// 目標矩形までの下界
pub struct BoundsHeuristic<'a, L: LevelMap> {
    profile: &'a Profile,
    level: &'a L,
}

impl<'a, L: LevelMap> BoundsHeuristic<'a, L> {
    pub fn new(profile: &'a Profile, level: &'a L) -> Self {
        Self { profile, level }
    }

    /// `region` に入るまでの最小フレーム数
    ///
    /// 空の矩形には決して入れないので `None` を返す。
    pub fn min_steps_into_bounds(&self, s: &State, region: &GoalRegion) -> Option<Dist> {
        if region.is_empty() {
            return None;
        }
        let (left, top, right, bottom) = (region.left, region.top, region.right, region.bottom);
        let c = self.profile.constants();

        let mut r = Reach::new(c, s);
        if r.intersects(left, top, right, bottom) {
            return Some(0);
        }

        let mut steps: u32 = 0;
        if !s.is_on_ground() && !self.profile.swimming {
            let vfd = i32::from(c.gravity(s.v_force_down));
            while steps < AIRBORNE_STEP_LIMIT {
                let mut next = r;
                next.airborne_step(c, vfd);
                // 今のフレームと次のフレームの範囲をまとめて見る
                let blocked = any_block_in_rect(
                    self.profile,
                    self.level,
                    r.left.pos.min(next.left.pos),
                    r.up.pos.min(next.up.pos),
                    r.right.pos.max(next.right.pos),
                    r.down.pos.max(next.down.pos),
                );
                if blocked {
                    break;
                }
                r = next;
                steps += 1;
                if r.intersects(left, top, right, bottom) {
                    return Some(steps as Dist);
                }
            }
        }

        r.enter_ground_phase(c);
        let mut steps = steps as Dist;
        while steps < GROUND_STEP_LIMIT {
            steps += 1;
            r.any_step(c);
            if r.intersects(left, top, right, bottom) {
                return Some(steps);
            }
        }
        Some(GROUND_STEP_LIMIT)
    }
}

// =============================================================================
// 補助の見積もり（横方向のみ）
// =============================================================================

/// 横速度が `target` に達するまでの最小フレーム数
pub fn min_x_speed_steps(c: &PlatformConstants, s: &State, target: i16) -> Dist {
    let spd = i32::from(s.x_spd);
    let target = i32::from(target);
    if spd >= target {
        return 0;
    }
    let accel = 2 * i32::from(c.friction_run);
    let steps = (target - spd + accel - 1) / accel;
    steps.min(i32::from(Dist::MAX)) as Dist
}

/// X 座標が `target` 以上になるまでの最小フレーム数
pub fn min_x_pos_steps(c: &PlatformConstants, s: &State, target: i32) -> Dist {
    let accel = 2 * i32::from(c.friction_run);
    let cap = i32::from(c.max_x_spd_run) + 0xff;
    let mut pos = s.x_pos;
    let mut spd = i32::from(s.x_spd);
    let mut steps: Dist = 0;
    while pos < target && steps < GROUND_STEP_LIMIT {
        accelerate(&mut spd, accel, cap);
        pos += (spd >> 8) << 4;
        steps += 1;
    }
    steps
}
