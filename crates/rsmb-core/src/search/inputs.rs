//! 合法手生成
//!
//! 状態ごとに試す価値のある入力だけを列挙する。物理的に区別できない入力
//! （空中でのしゃがみ、接地中でない B など）は生成しない。
//! 列挙順は探索の優先順ではなく固定の順序で、同じ長さの解が複数あるときの勝者を決める。

use smallvec::SmallVec;

use crate::profile::Profile;
use crate::state::State;
use crate::types::{Input, PlayerState};

/// 1状態あたりの最大入力数
pub const MAX_LEGAL_INPUTS: usize = 20;

pub type InputList = SmallVec<[Input; MAX_LEGAL_INPUTS]>;

/// 合法手を列挙する
pub fn legal_inputs(profile: &Profile, s: &State) -> InputList {
    let mut inputs = InputList::new();

    // 画面外では入力が無視される
    if s.y_pos < 0x10000 || s.y_pos >= 0x1d000 {
        inputs.push(Input::NIL);
        return inputs;
    }

    let c = profile.constants();
    let swim = profile.swimming;
    let big = profile.is_big(s);
    let grounded = s.is_on_ground();
    let moving = Input::from_dir(s.moving_dir);
    let not_moving = s.moving_dir.is_empty();
    // 速度段階 4 未満 / 1 未満（しきい値 `x_spd_abs_cutoffs[4]` / `[1]` 未満）
    let slow = s.x_spd_abs < 4;
    let crawling = s.x_spd_abs < 1;
    let or_right_if_still = if not_moving { Input::RIGHT } else { Input::NIL };

    if !swim && grounded {
        inputs.push(Input::B | moving);
    }
    inputs.push(Input::RIGHT);
    // 左右同時押しは向きだけを変える
    if s.player_state == PlayerState::Standing || swim {
        inputs.push(Input::LEFT | Input::RIGHT);
    }
    inputs.push(Input::NIL);
    inputs.push(Input::LEFT);

    if big && grounded {
        inputs.push(Input::DOWN);
    }
    let duck_moving = grounded && slow && (!not_moving || !big);
    let duck_still = grounded && crawling && (not_moving || !big);
    if duck_moving {
        inputs.push(Input::DOWN | moving);
    }
    if duck_still {
        inputs.push(Input::DOWN | or_right_if_still);
    }

    let gravity_switchable =
        s.player_state == PlayerState::Jumping && c.gravity(s.v_force) != c.gravity(s.v_force_down);
    let swim_jump_ready = s.ext.jump_swim_timer != 0 || s.y_spd >= 0;
    if grounded || (swim && swim_jump_ready) || gravity_switchable {
        inputs.push(Input::A);
        inputs.push(Input::A | Input::RIGHT);
        if swim {
            inputs.push(Input::A | Input::LEFT | Input::RIGHT);
        }
        inputs.push(Input::A | Input::LEFT);
    }
    if big && grounded {
        inputs.push(Input::A | Input::DOWN);
    }
    if swim && duck_moving {
        inputs.push(Input::A | Input::DOWN | moving);
    }
    if swim && duck_still {
        inputs.push(Input::A | Input::DOWN | or_right_if_still);
    }

    let up_allowed = (grounded || swim) && ((slow && not_moving) || (crawling && !not_moving));
    if up_allowed {
        inputs.push(Input::UP);
    }
    let swim_up = swim
        && (grounded || swim_jump_ready || c.gravity(s.v_force) != c.gravity(s.v_force_down))
        && ((slow && not_moving) || (crawling && !not_moving));
    if swim_up {
        inputs.push(Input::A | Input::UP);
    }

    inputs
}
