//! 1フレーム分の処理
//!
//! `Frame` は1回の `step` の間だけ生きる作業領域で、入力の解釈結果や
//! 摩擦・最高速などのフレーム内一時値を保持する。

use crate::error::EmuError;
use crate::level::{LevelMap, tile};
use crate::profile::{BLOCK_BUFFER_X_ADDER, BLOCK_BUFFER_Y_ADDER, PlatformConstants, Profile};
use crate::state::State;
use crate::types::{Dir, Gravity, Input, PlayerState};

use super::{StepEvent, StepOutcome, TileHit};

/// ツタにつかまったときの X 座標補正（向きでインデックス）
const CLIMB_X_POS_ADDER: [i32; 4] = [0x8a, 0xf9, 0x07, 0xff];
/// ツタにつかまったときのページ補正（向きでインデックス）
const CLIMB_PAGE_LOC_ADDER: [i32; 4] = [0x07, 0xff, 0x00, 0x18];

pub(super) struct Frame<'a, L: LevelMap> {
    profile: &'a Profile,
    level: &'a L,
    c: &'static PlatformConstants,
    s: State,
    joypad: Input,
    joypad_lr: Dir,
    joypad_ud: Input,
    max_speed_left: i16,
    max_speed_right: i16,
    friction: i16,
    started_jump: bool,
    started_on_ground: bool,
    /// このフレームの横スクロール量（スクロール追跡時のみ）
    x_scroll: i8,
    /// 横衝突で押し戻された（スクロール追跡時のみ）
    side_collision: bool,
}

impl<'a, L: LevelMap> Frame<'a, L> {
    pub(super) fn new(profile: &'a Profile, level: &'a L, s: State, joypad: Input) -> Self {
        Self {
            profile,
            level,
            c: profile.constants(),
            s,
            joypad,
            joypad_lr: Dir::NONE,
            joypad_ud: Input::NIL,
            max_speed_left: 0,
            max_speed_right: 0,
            friction: 0,
            started_jump: false,
            started_on_ground: false,
            x_scroll: 0,
            side_collision: false,
        }
    }

    pub(super) fn run(mut self) -> Result<StepOutcome, EmuError> {
        let p = self.profile;
        self.started_on_ground = self.s.is_on_ground();
        if p.running_timer && self.s.ext.running_timer > 0 {
            self.s.ext.running_timer -= 1;
        }

        let event = self.player_ctrl_routine()?;

        if p.track_scroll {
            if self.side_collision {
                self.s.ext.side_collision_timer = 0x0f;
            } else if self.s.ext.side_collision_timer > 0 {
                self.s.ext.side_collision_timer -= 1;
            }
        }

        if p.swimming {
            if self.started_jump {
                self.s.ext.jump_swim_timer = 0x1f;
            } else if self.s.ext.jump_swim_timer > 0 {
                self.s.ext.jump_swim_timer -= 1;
            }
        }

        if p.clear_y_fractionals && self.s.is_on_ground() {
            self.s.y_pos &= 0xffff00;
            self.s.v_force_down = Gravity::AreaInit;
        }
        if self.s.player_state != PlayerState::Jumping {
            self.s.v_force = self.s.v_force_down;
        }
        // 小数部を消したまま足場から落ちた状態は実機で起こらない
        if p.clear_y_fractionals && self.started_on_ground && self.s.player_state == PlayerState::Falling {
            return Ok(StepOutcome { state: self.s, event: Some(StepEvent::InvalidFall) });
        }
        self.s.ext.parity = (self.s.ext.parity + 1) % p.parity.max(1);

        Ok(StepOutcome { state: self.s, event })
    }

    // =========================================================================
    // 入力と移動
    // =========================================================================

    fn player_ctrl_routine(&mut self) -> Result<Option<StepEvent>, EmuError> {
        if self.s.y_pos < 0x10000 || self.s.y_pos >= 0x1d000 {
            self.joypad = Input::NIL;
        }
        self.joypad_lr = self.joypad.lr();
        self.joypad_ud = self.joypad & (Input::UP | Input::DOWN);
        if self.joypad.contains(Input::DOWN) && self.s.is_on_ground() && !self.joypad_lr.is_empty() {
            self.joypad_lr = Dir::NONE;
            self.joypad_ud = Input::NIL;
        }
        self.player_movement_subs()?;
        if self.s.x_spd < 0 {
            self.s.moving_dir = Dir::LEFT;
        } else if self.s.x_spd >= 0x100 {
            self.s.moving_dir = Dir::RIGHT;
        }

        self.scroll_handler();

        Ok(self.player_bg_collision())
    }

    fn player_movement_subs(&mut self) -> Result<(), EmuError> {
        if self.profile.is_big(&self.s) && self.s.is_on_ground() {
            self.s.ext.is_crouching = self.joypad_ud.contains(Input::DOWN);
        }

        self.player_physics_sub();

        match self.s.player_state {
            PlayerState::Standing => {
                self.get_player_anim_speed();
                if !self.joypad_lr.is_empty() {
                    self.s.facing_dir = self.joypad_lr;
                }
                self.impose_friction();
                self.move_horizontally();
            }
            PlayerState::Jumping => {
                if self.s.y_spd >= 0 || (!self.joypad.contains(Input::A) && !self.started_jump) {
                    self.s.v_force = self.s.v_force_down;
                }
                if self.profile.swimming {
                    self.get_player_anim_speed();
                    if self.s.y_pos < 0x11400 {
                        self.s.v_force = Gravity::SwimTooHigh;
                    }
                    if !self.joypad_lr.is_empty() {
                        self.s.facing_dir = self.joypad_lr;
                    }
                }
                if !self.joypad_lr.is_empty() {
                    self.impose_friction();
                }
                self.move_horizontally();
                self.move_vertically();
            }
            PlayerState::Falling => {
                self.s.v_force = self.s.v_force_down;
                if !self.joypad_lr.is_empty() {
                    self.impose_friction();
                }
                self.move_horizontally();
                self.move_vertically();
            }
            PlayerState::Climbing => return Err(EmuError::UnsupportedMovement(PlayerState::Climbing)),
        }
        Ok(())
    }

    fn player_physics_sub(&mut self) {
        let c = self.c;
        let swimming = self.profile.swimming;

        // ジャンプ開始
        if self.joypad.contains(Input::A)
            && (self.s.is_on_ground() || (swimming && (self.s.ext.jump_swim_timer != 0 || self.s.y_spd >= 0)))
        {
            self.s.y_pos &= 0xffff00;
            self.started_jump = true;
            self.s.player_state = PlayerState::Jumping;
            let (v_force, v_force_down, y_spd) = if swimming {
                (Gravity::JumpSwimming, Gravity::FallSwimming, c.jump_velocity_swim)
            } else if self.s.x_spd_abs >= 3 {
                (Gravity::JumpRunning, Gravity::FallRunning, c.jump_velocity_fast)
            } else if self.s.x_spd_abs >= 2 {
                (Gravity::JumpWalking, Gravity::FallWalking, c.jump_velocity_slow)
            } else {
                (Gravity::JumpStanding, Gravity::FallStanding, c.jump_velocity_slow)
            };
            self.s.v_force = v_force;
            self.s.v_force_down = v_force_down;
            self.s.y_spd = y_spd;
            // 水面近くでは上向きの速度を失う
            if swimming && self.s.y_pos < 0x11400 {
                self.s.y_spd &= 0xff;
            }
        }

        // 横方向の最高速と摩擦
        let on_ground = self.s.is_on_ground();
        let is_running =
            !swimming && on_ground && self.joypad_lr == self.s.moving_dir && self.joypad.contains(Input::B);
        if self.profile.running_timer && is_running {
            self.s.ext.running_timer = 0x0a;
        }
        let keeps_running = if self.profile.running_timer { self.s.ext.running_timer > 0 } else { is_running };

        let (max_speed, friction) = if !on_ground && self.s.x_spd_abs >= 3 {
            (c.max_x_spd_run, c.friction_run)
        } else if !on_ground && self.s.running_speed {
            (c.max_x_spd_walk, c.friction_walk_fast)
        } else if !on_ground {
            (c.max_x_spd_walk, c.friction_walk_slow)
        } else if swimming && !self.s.running_speed && self.s.x_spd_abs < 5 {
            (c.max_x_spd_swim, c.friction_walk_slow)
        } else if swimming {
            (c.max_x_spd_swim, c.friction_walk_fast)
        } else if self.joypad_lr == self.s.moving_dir && keeps_running {
            (c.max_x_spd_run, c.friction_run)
        } else if !self.s.running_speed && self.s.x_spd_abs < 5 {
            (c.max_x_spd_walk, c.friction_walk_slow)
        } else {
            (c.max_x_spd_walk, c.friction_walk_fast)
        };
        self.max_speed_right = max_speed;
        self.max_speed_left = -max_speed;
        self.friction = friction;

        // 向きと移動方向が逆なら減速が倍
        if self.s.facing_dir != self.s.moving_dir {
            self.friction <<= 1;
        }
    }

    fn get_player_anim_speed(&mut self) {
        let a_or_nil = Input::A.contains(self.joypad);
        if self.s.x_spd_abs >= 4 {
            self.s.running_speed = true;
        } else if !a_or_nil && self.joypad.lr() == self.s.moving_dir {
            self.s.running_speed = false;
        } else if !a_or_nil && self.s.x_spd_abs < 1 {
            self.s.moving_dir = self.s.facing_dir;
            self.s.x_spd = 0;
        }
    }

    fn impose_friction(&mut self) {
        let lr_collision = self.joypad_lr & self.s.collision_bits;
        if lr_collision.contains(Dir::RIGHT) || (lr_collision.is_empty() && self.s.x_spd < 0) {
            self.s.x_spd += self.friction;
            if self.s.x_spd >= self.max_speed_right {
                self.s.x_spd = self.max_speed_right + (self.s.x_spd & 0xff);
            }
        } else if !lr_collision.is_empty() || self.s.x_spd >= 0x100 {
            self.s.x_spd -= self.friction;
            if self.s.x_spd <= self.max_speed_left {
                self.s.x_spd = self.max_speed_left + (self.s.x_spd & 0xff);
            }
        }
        let spd_abs = (self.s.x_spd >> 8).unsigned_abs() as u8;
        self.s.set_x_spd_abs(self.c, spd_abs);
    }

    fn move_horizontally(&mut self) {
        let old_x_pos = self.s.x_pos;
        self.s.x_pos += (i32::from(self.s.x_spd) >> 8) << 4;
        if self.profile.track_scroll {
            self.x_scroll = ((self.s.x_pos >> 8) - (old_x_pos >> 8)) as i8;
        }
    }

    fn move_vertically(&mut self) {
        self.s.y_pos += i32::from(self.s.y_spd);
        self.s.y_spd += i16::from(self.c.gravity(self.s.v_force));
        if self.s.y_spd >= self.c.max_y_spd && (self.s.y_spd & 0xff) >= 0x80 {
            self.s.y_spd = self.c.max_y_spd;
        }
    }

    fn scroll_handler(&mut self) {
        if !self.profile.track_scroll {
            return;
        }
        let rel_x_pos = ((self.s.x_pos >> 8) - i32::from(self.s.ext.left_screen_edge_pos)) & 0xff;
        if rel_x_pos < 0x50 || self.s.ext.side_collision_timer > 0 || self.x_scroll <= 0 {
            return;
        }
        if rel_x_pos < 0x70 && self.x_scroll >= 2 {
            self.x_scroll -= 1;
        }
        self.s.ext.left_screen_edge_pos = self.s.ext.left_screen_edge_pos.wrapping_add(self.x_scroll as u8);
    }

    // =========================================================================
    // 背景衝突
    // =========================================================================

    /// ブロックバッファ参照位置のタイルを調べる
    ///
    /// 取得済みコインは空白、叩いた後のハテナブロックは固いブロックとして返す。
    fn block_buffer_collision(&self, offset: usize) -> Option<TileHit> {
        let offset = offset
            + if !self.profile.is_big(&self.s) || self.s.ext.is_crouching {
                14
            } else if self.profile.swimming {
                7
            } else {
                0
            };

        let cx = (self.s.x_pos + BLOCK_BUFFER_X_ADDER[offset]) >> 12;
        let cy = ((self.s.y_pos + BLOCK_BUFFER_Y_ADDER[offset] - 0x2000) >> 12) & 0x0f;
        let (Ok(x), Ok(y)) = (usize::try_from(cx), usize::try_from(cy)) else {
            return None;
        };

        let mut code = self.level.tile_at(x, y);
        if tile::is_coin(code) && self.profile.is_coin_collected(&self.s, x, y) {
            code = 0;
        }
        if tile::is_question_block(code) && self.profile.is_activated_powerup_block(&self.s, x, y) {
            code = tile::USED_BLOCK;
        }
        (code != 0).then_some(TileHit { x, y, code })
    }

    fn player_bg_collision(&mut self) -> Option<StepEvent> {
        let p = self.profile;
        if p.swimming {
            self.s.player_state = PlayerState::Jumping;
        } else if matches!(self.s.player_state, PlayerState::Standing | PlayerState::Climbing) {
            self.s.player_state = PlayerState::Falling;
        }

        if self.s.y_pos < 0x10000 || self.s.y_pos >= 0x20000 {
            return None;
        }
        self.s.collision_bits = Dir::LR;
        if self.s.y_pos >= 0x1cf00 {
            return None;
        }

        // 頭
        let head_y = if p.is_big(&self.s) && !self.s.ext.is_crouching { 0x12000 } else { 0x11000 };
        let head = if self.s.y_pos >= head_y { self.block_buffer_collision(0) } else { None };
        if let Some(hit) = head {
            if tile::is_coin(hit.code) {
                p.collect_coin(&mut self.s);
                return None;
            }
            if self.s.y_spd < 0 && (self.s.y_pos & 0x0f00) >= 0x400 {
                if tile::is_solid(hit.code) || p.swimming {
                    self.s.y_spd = 0x100 + (self.s.y_spd & 0xff);
                } else if p.is_big(&self.s) && !tile::is_question_block(hit.code) {
                    // レンガを壊す
                    self.s.y_spd = -0x200 + (self.s.y_spd & 0xff);
                } else {
                    if tile::is_question_block(hit.code) {
                        p.activate_powerup_block(&mut self.s, hit.x, hit.y);
                    }
                    self.s.y_spd &= 0xff;
                }
            }
        }

        // 足元
        let left_foot = self.block_buffer_collision(1);
        let right_foot = self.block_buffer_collision(2);
        let (foot, right_foot_on_vert_pipe) = match left_foot {
            None => (right_foot, false),
            Some(_) => (left_foot, right_foot.is_some_and(|h| h.code == tile::VERTICAL_PIPE_RIGHT)),
        };
        if let Some(hit) = foot {
            if tile::is_coin(hit.code) {
                p.collect_coin(&mut self.s);
                return None;
            }
            if !tile::is_climb(hit.code) && !tile::is_hidden_block(hit.code) && self.s.y_spd >= 0 {
                if hit.code == tile::AXE {
                    return Some(StepEvent::Axe(hit));
                }
                if (self.s.y_pos & 0x0f00) >= self.c.block_surface_thickness {
                    let moving_dir = self.s.moving_dir;
                    self.impede_player_move(moving_dir);
                    return None;
                }
                self.s.y_pos &= 0xfff0ff;
                if (!self.started_on_ground || self.joypad_lr.is_empty())
                    && hit.code == tile::VERTICAL_PIPE_LEFT
                    && right_foot_on_vert_pipe
                    && p.may_enter_vertical_pipe(hit.x, hit.y)
                {
                    return Some(StepEvent::VerticalPipe(hit));
                }
                self.s.y_spd = 0;
                self.s.player_state = PlayerState::Standing;
            }
        }

        // 左右（左を先に判定する）
        if self.s.y_pos >= 0x10800 {
            for dir in [Dir::LEFT, Dir::RIGHT] {
                let side = 2 * (2 - dir.bits() as usize);
                if self.s.y_pos >= 0x12000 {
                    let upper = self.block_buffer_collision(3 + side);
                    if let Some(hit) = upper.filter(|h| !tile::skips_upper_side_check(h.code) && !tile::is_climb(h.code)) {
                        return self.check_side_mtiles(dir, hit);
                    }
                }
                if let Some(hit) = self.block_buffer_collision(4 + side) {
                    return self.check_side_mtiles(dir, hit);
                }
            }
        }
        None
    }

    fn check_side_mtiles(&mut self, moving_dir: Dir, hit: TileHit) -> Option<StepEvent> {
        let code = hit.code;
        if tile::is_hidden_block(code) {
            return None;
        }
        if tile::is_climb(code) {
            let x_in_block = self.s.x_pos & 0x0f00;
            if !(0x600..0xa00).contains(&x_in_block) {
                return None;
            }
            if tile::is_flag(code) {
                self.s.facing_dir = Dir::RIGHT;
                self.put_player_on_vine(hit.x);
                return Some(StepEvent::Flag(hit));
            }
            self.put_player_on_vine(hit.x);
            return Some(if code == tile::VINE && (self.s.y_pos & 0xff00) < 0x2000 {
                StepEvent::VineAutoclimb(hit)
            } else {
                StepEvent::Vine(hit)
            });
        }
        if tile::is_coin(code) {
            self.profile.collect_coin(&mut self.s);
            return None;
        }
        if self.s.is_on_ground() && self.s.facing_dir == Dir::RIGHT && tile::is_side_pipe(code) {
            return Some(StepEvent::SidePipe(hit));
        }
        self.impede_player_move(moving_dir);
        None
    }

    fn put_player_on_vine(&mut self, cx: usize) {
        let track_scroll = self.profile.track_scroll;
        self.s.player_state = PlayerState::Climbing;
        self.s.x_spd = 0;
        if track_scroll && ((self.s.x_pos >> 8) - i32::from(self.s.ext.left_screen_edge_pos)) & 0xff < 16 {
            self.s.facing_dir = Dir::LEFT;
        }
        let facing = self.s.facing_dir.bits() as usize;
        let x_pixel = (((cx as i32) << 4) + CLIMB_X_POS_ADDER[facing]) & 0xff;
        let x_page = if cx & 0xf != 0 {
            self.s.x_pos >> 16
        } else {
            // スクロールを追跡しない場合はプレイヤーが画面中央にいるとみなす
            let left_edge = if track_scroll {
                self.s.ext.left_screen_edge_pos
            } else {
                (((self.s.x_pos >> 8) - 0x70) & 0xff) as u8
            };
            let x_pos_byte = ((self.s.x_pos >> 8) & 0xff) as u8;
            let left_page = if left_edge <= x_pos_byte { self.s.x_pos >> 16 } else { (self.s.x_pos >> 16) - 1 };
            let right_page = if left_edge == 0 { left_page } else { left_page + 1 };
            (right_page + CLIMB_PAGE_LOC_ADDER[facing]) & 0xff
        };
        self.s.x_pos = (self.s.x_pos & 0xff) | (x_pixel << 8) | (x_page << 16);
    }

    fn impede_player_move(&mut self, moving_dir: Dir) {
        if moving_dir == Dir::RIGHT && self.s.x_spd >= 0 {
            self.s.x_spd &= 0xff;
            self.s.x_pos -= 0x100;
            self.side_collision = self.profile.track_scroll;
        } else if moving_dir != Dir::RIGHT && self.s.x_spd < 0x100 {
            self.s.x_spd &= 0xff;
            self.s.x_pos += 0x100;
            self.side_collision = self.profile.track_scroll;
        }
        self.s.collision_bits = self.s.collision_bits - moving_dir;
    }
}
