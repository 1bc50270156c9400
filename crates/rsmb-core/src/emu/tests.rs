use super::*;
use crate::error::EmuError;
use crate::level::{EmptyLevel, Level, TileCoord, tile};
use crate::profile::{Platform, PlayerSize};
use crate::types::{Dir, Gravity, PlayerState};

/// 11行目（y_pos 0x1b000 の足元）が地面のマップ
fn flat_ground(width: usize, code: u8) -> Level {
    let mut level = Level::blank(width);
    level.fill_row(11, code);
    level
}

fn falling_onto_row_11() -> State {
    State {
        y_pos: 0x1ac00,
        y_spd: 0x300,
        player_state: PlayerState::Falling,
        ..State::standing(0x2800, 0x1b000)
    }
}

#[test]
fn test_neutral_step_on_flat_ground_is_idempotent() {
    let profile = Profile::default();
    let level = flat_ground(16, 0x54);
    let emu = Emulator::new(&profile, &level);

    let start = State::standing(0x2800, 0x1b000);
    let mut s = start.clone();
    for _ in 0..10 {
        let out = emu.step(&s, Input::NIL).unwrap();
        assert_eq!(out.event, None);
        s = out.state;
    }
    assert_eq!(s, start);
}

#[test]
fn test_step_is_deterministic() {
    let profile = Profile { platform: Platform::Pal, ..Profile::default() };
    let level = flat_ground(16, 0x54);
    let emu = Emulator::new(&profile, &level);

    let s = State { x_spd: 0x1234, ..State::standing(0x2800, 0x1b000) };
    for input in [Input::NIL, Input::RIGHT, Input::A | Input::RIGHT, Input::B | Input::LEFT] {
        assert_eq!(emu.step(&s, input), emu.step(&s, input));
    }
}

#[test]
fn test_walk_right_from_rest() {
    let profile = Profile::default();
    let level = flat_ground(16, 0x54);
    let emu = Emulator::new(&profile, &level);

    let out = emu.step(&State::standing(0x2800, 0x1b000), Input::RIGHT).unwrap();
    assert_eq!(out.event, None);
    let s = out.state;
    // 向きと移動方向が異なるので摩擦（加速）は 0x98 の倍
    assert_eq!(s.x_spd, 0x130);
    assert_eq!(s.x_pos, 0x2810);
    assert_eq!(s.moving_dir, Dir::RIGHT);
    assert_eq!(s.facing_dir, Dir::RIGHT);
    assert_eq!(s.player_state, PlayerState::Standing);
    assert_eq!(s.x_spd_abs, 0);
}

#[test]
fn test_standing_jump_start() {
    let profile = Profile::default();
    let level = flat_ground(16, 0x54);
    let emu = Emulator::new(&profile, &level);

    let s = emu.step(&State::standing(0x2800, 0x1b000), Input::A).unwrap().state;
    assert_eq!(s.player_state, PlayerState::Jumping);
    assert_eq!(s.y_pos, 0x1ac00);
    assert_eq!(s.y_spd, -0x3e0);
    assert_eq!(s.v_force, Gravity::JumpStanding);
    assert_eq!(s.v_force_down, Gravity::FallStanding);
    assert_eq!(s.x_pos, 0x2800);
}

#[test]
fn test_axe_contact_while_falling() {
    let profile = Profile::default();
    let level = flat_ground(16, tile::AXE);
    let emu = Emulator::new(&profile, &level);

    let first = emu.step(&falling_onto_row_11(), Input::NIL).unwrap();
    assert_eq!(first.event, None);
    assert_eq!(first.state.y_pos, 0x1af00);
    assert_eq!(first.state.y_spd, 0x328);

    let second = emu.step(&first.state, Input::NIL).unwrap();
    let hit = TileHit { x: 2, y: 11, code: tile::AXE };
    assert_eq!(second.event, Some(StepEvent::Axe(hit)));
    assert_eq!(second.event.map(|e| e.kind()), Some(ContactKind::Axe));
    assert_eq!(second.event.and_then(|e| e.tile()), Some(hit));
}

#[test]
fn test_replay_stops_at_contact() {
    let profile = Profile::default();
    let level = flat_ground(16, tile::AXE);
    let emu = Emulator::new(&profile, &level);

    let out = emu.replay(&falling_onto_row_11(), &[Input::NIL; 5]).unwrap();
    assert_eq!(out.len(), 2);
    assert!(matches!(out[1].event, Some(StepEvent::Axe(_))));
}

#[test]
fn test_side_pipe_entry_requires_facing_right() {
    let profile = Profile::default();
    let mut level = flat_ground(16, 0x54);
    level.set(4, 10, 0x1f);
    let emu = Emulator::new(&profile, &level);

    let s = State::standing(0x3300, 0x1b000);
    let out = emu.step(&s, Input::NIL).unwrap();
    assert_eq!(out.event, Some(StepEvent::SidePipe(TileHit { x: 4, y: 10, code: 0x1f })));

    // 左向きなら土管には入らず押し戻される
    let s = State { facing_dir: Dir::LEFT, ..s };
    let out = emu.step(&s, Input::NIL).unwrap();
    assert_eq!(out.event, None);
    assert_eq!(out.state.x_pos, 0x3200);
    assert_eq!(out.state.collision_bits, Dir::LEFT);
}

#[test]
fn test_climbing_is_unsupported() {
    let profile = Profile::default();
    let level = EmptyLevel;
    let emu = Emulator::new(&profile, &level);
    let s = State { player_state: PlayerState::Climbing, ..State::standing(0x2800, 0x1b000) };
    assert_eq!(emu.step(&s, Input::NIL), Err(EmuError::UnsupportedMovement(PlayerState::Climbing)));
}

#[test]
fn test_invalid_fall_with_cleared_fractionals() {
    let profile = Profile { clear_y_fractionals: true, ..Profile::default() };
    let level = Level::blank(16);
    let emu = Emulator::new(&profile, &level);

    let out = emu.step(&State::standing(0x3000, 0x1b000), Input::NIL).unwrap();
    assert_eq!(out.event, Some(StepEvent::InvalidFall));
    assert_eq!(out.state.player_state, PlayerState::Falling);

    // 小数部を消さないプロファイルでは通常の落下
    let profile = Profile::default();
    let emu = Emulator::new(&profile, &level);
    let out = emu.step(&State::standing(0x3000, 0x1b000), Input::NIL).unwrap();
    assert_eq!(out.event, None);
}

#[test]
fn test_joypad_ignored_outside_screen() {
    let profile = Profile::default();
    let level = Level::blank(16);
    let emu = Emulator::new(&profile, &level);

    let s = State { player_state: PlayerState::Falling, ..State::standing(0x2800, 0x0f000) };
    let with_input = emu.step(&s, Input::RIGHT | Input::B).unwrap();
    let without = emu.step(&s, Input::NIL).unwrap();
    assert_eq!(with_input, without);
}

#[test]
fn test_crouch_only_when_big() {
    let level = flat_ground(16, 0x54);
    let s = State::standing(0x2800, 0x1b000);

    let small = Profile::default();
    let out = Emulator::new(&small, &level).step(&s, Input::DOWN).unwrap();
    assert!(!out.state.ext.is_crouching);

    let big = Profile { player_size: PlayerSize::Big, ..Profile::default() };
    let out = Emulator::new(&big, &level).step(&s, Input::DOWN).unwrap();
    assert!(out.state.ext.is_crouching);
}

#[test]
fn test_tracked_coin_is_collected_once() {
    let profile = Profile { coin: Some(TileCoord { x: 2, y: 11 }), ..Profile::default() };
    let mut level = flat_ground(16, 0x54);
    level.set(2, 11, 0xc2);
    let emu = Emulator::new(&profile, &level);

    let out = emu.step(&falling_onto_row_11(), Input::NIL).unwrap();
    let out = emu.step(&out.state, Input::NIL).unwrap();
    assert!(out.state.ext.coin_collected);
}

#[test]
fn test_settle_falls_until_visible() {
    let profile = Profile::default();
    let level = Level::blank(16);
    let emu = Emulator::new(&profile, &level);

    let s = State { player_state: PlayerState::Falling, ..State::standing(0x2800, 0x11000) };
    let settled = emu.settle(s).unwrap();
    // 21フレームで (y_pos & 0xff00) が 0x3000 に達する
    assert_eq!(settled.y_pos, 0x130d0);
    assert_eq!(settled.y_spd, 0x348);

    // 既に落ち着いている状態はそのまま
    let s = State::standing(0x2800, 0x1b000);
    assert_eq!(emu.settle(s.clone()).unwrap(), s);
}

#[test]
fn test_settle_gives_up() {
    let profile = Profile::default();
    let mut level = Level::blank(16);
    level.fill_row(1, 0x54);
    let emu = Emulator::new(&profile, &level);

    let s = State::standing(0x2800, 0x11000);
    assert_eq!(emu.settle(s), Err(EmuError::SettleDidNotConverge { steps: SETTLE_MAX_STEPS }));
}

// =============================================================================
// 縦土管
// =============================================================================

/// (4, 11)-(5, 11) に縦土管の口を置いたマップ
fn vertical_pipe_level() -> Level {
    let mut level = flat_ground(16, 0x54);
    level.set(4, 11, tile::VERTICAL_PIPE_LEFT);
    level.set(5, 11, tile::VERTICAL_PIPE_RIGHT);
    level
}

#[test]
fn test_vertical_pipe_entry_from_ground() {
    let profile = Profile { vertical_pipe: Some(TileCoord { x: 4, y: 11 }), ..Profile::default() };
    let level = vertical_pipe_level();
    let emu = Emulator::new(&profile, &level);

    // 左足 (x + 0x300) が 4 列目、右足 (x + 0xc00) が 5 列目
    let s = State::standing(0x4800, 0x1b000);
    let hit = TileHit { x: 4, y: 11, code: tile::VERTICAL_PIPE_LEFT };
    for input in [Input::NIL, Input::DOWN] {
        let out = emu.step(&s, input).unwrap();
        assert_eq!(out.event, Some(StepEvent::VerticalPipe(hit)), "input {input}");
    }

    // 地上で左右を押していると入れない
    let out = emu.step(&s, Input::RIGHT).unwrap();
    assert_eq!(out.event, None);
    assert_eq!(out.state.x_pos, 0x4810);
    assert_eq!(out.state.player_state, PlayerState::Standing);
}

#[test]
fn test_vertical_pipe_entry_while_landing() {
    let profile = Profile { vertical_pipe: Some(TileCoord { x: 4, y: 11 }), ..Profile::default() };
    let level = vertical_pipe_level();
    let emu = Emulator::new(&profile, &level);

    // 空中からの着地なら右を押したままでも入れる
    let s = State { x_pos: 0x4800, ..falling_onto_row_11() };
    let first = emu.step(&s, Input::RIGHT).unwrap();
    assert_eq!(first.event, None);
    assert_eq!(first.state.x_pos, 0x4810);
    assert_eq!(first.state.y_pos, 0x1af00);

    let second = emu.step(&first.state, Input::RIGHT).unwrap();
    assert_eq!(second.event, Some(StepEvent::VerticalPipe(TileHit { x: 4, y: 11, code: 0x10 })));
    assert_eq!(second.state.x_pos, 0x4820);
    // 1ブロック内の縦位置は切り捨て、速度は残る
    assert_eq!(second.state.y_pos, 0x1b028);
    assert_eq!(second.state.y_spd, 0x350);
}

#[test]
fn test_untracked_vertical_pipe_is_ground() {
    let profile = Profile::default();
    let level = vertical_pipe_level();
    let emu = Emulator::new(&profile, &level);

    let s = State::standing(0x4800, 0x1b000);
    let out = emu.step(&s, Input::NIL).unwrap();
    assert_eq!(out.event, None);
    assert_eq!(out.state, s);

    // 別の位置の土管を指定しても同じ
    let profile = Profile { vertical_pipe: Some(TileCoord { x: 6, y: 11 }), ..Profile::default() };
    let out = Emulator::new(&profile, &level).step(&s, Input::NIL).unwrap();
    assert_eq!(out.event, None);
}

// =============================================================================
// 旗竿とつた
// =============================================================================

#[test]
fn test_flag_contact_puts_player_on_pole() {
    let profile = Profile::default();
    let mut level = flat_ground(16, 0x54);
    level.set(3, 10, 0x24);
    let emu = Emulator::new(&profile, &level);

    // 右側の判定 (x + 0xd00) が旗竿の列、ブロック内の位置は 0x800
    let s = State { facing_dir: Dir::LEFT, ..State::standing(0x2800, 0x1b000) };
    let out = emu.step(&s, Input::NIL).unwrap();
    assert_eq!(out.event, Some(StepEvent::Flag(TileHit { x: 3, y: 10, code: 0x24 })));

    let s = out.state;
    assert_eq!(s.player_state, PlayerState::Climbing);
    assert_eq!(s.facing_dir, Dir::RIGHT);
    // (3 << 4) + 0xf9 の下位バイト
    assert_eq!(s.x_pos, 0x2900);
    assert_eq!(s.x_spd, 0);
    assert_eq!(emu.step(&s, Input::NIL), Err(EmuError::UnsupportedMovement(PlayerState::Climbing)));
}

#[test]
fn test_climb_tile_needs_player_near_block_center() {
    let profile = Profile::default();
    let mut level = flat_ground(16, 0x54);
    level.set(3, 10, 0x24);
    let emu = Emulator::new(&profile, &level);

    // ブロック内の位置 0x400 では掴まらず、押し戻されもしない
    let s = State::standing(0x2400, 0x1b000);
    let out = emu.step(&s, Input::NIL).unwrap();
    assert_eq!(out.event, None);
    assert_eq!(out.state, s);
}

#[test]
fn test_vine_contact_on_page_boundary() {
    let profile = Profile::default();
    let mut level = flat_ground(32, 0x54);
    level.set(16, 10, tile::VINE);
    let emu = Emulator::new(&profile, &level);

    let s = State { facing_dir: Dir::LEFT, ..State::standing(0xf800, 0x1b000) };
    let out = emu.step(&s, Input::NIL).unwrap();
    assert_eq!(out.event, Some(StepEvent::Vine(TileHit { x: 16, y: 10, code: tile::VINE })));
    // 列 16 はページの先頭なので次のページに移る
    assert_eq!(out.state.x_pos, 0x10700);
    assert_eq!(out.state.facing_dir, Dir::LEFT);
    assert_eq!(out.state.player_state, PlayerState::Climbing);
}

#[test]
fn test_vine_autoclimb_near_screen_top() {
    let profile = Profile::default();
    let mut level = Level::blank(16);
    level.set(3, 0, tile::VINE);
    let emu = Emulator::new(&profile, &level);

    let s = State { player_state: PlayerState::Falling, ..State::standing(0x2800, 0x11000) };
    let out = emu.step(&s, Input::NIL).unwrap();
    assert_eq!(out.event, Some(StepEvent::VineAutoclimb(TileHit { x: 3, y: 0, code: tile::VINE })));
    assert_eq!(out.state.x_pos, 0x2900);
    assert_eq!(out.state.y_pos, 0x11000);
    assert_eq!(out.state.y_spd, 0x28);
    assert_eq!(out.state.player_state, PlayerState::Climbing);
}

// =============================================================================
// 頭上のブロック
// =============================================================================

/// (3, 5) のブロックに頭をぶつける直前のジャンプ中の状態
///
/// 1フレーム後に y_pos 0x16800、y_spd -0x3e0 になる。
fn jumping_under_row_5() -> State {
    State {
        y_pos: 0x16c00,
        y_spd: -0x400,
        player_state: PlayerState::Jumping,
        v_force: Gravity::JumpStanding,
        v_force_down: Gravity::FallStanding,
        ..State::standing(0x2800, 0x1b000)
    }
}

fn block_at(x: usize, y: usize, code: u8) -> Level {
    let mut level = Level::blank(16);
    level.set(x, y, code);
    level
}

#[test]
fn test_head_bump_on_solid_block() {
    let profile = Profile::default();
    let level = block_at(3, 5, 0x61);
    let emu = Emulator::new(&profile, &level);

    let out = emu.step(&jumping_under_row_5(), Input::A).unwrap();
    assert_eq!(out.event, None);
    assert_eq!(out.state.y_pos, 0x16800);
    // 0x100 + (-0x3e0 の下位バイト 0x20)
    assert_eq!(out.state.y_spd, 0x120);
    assert_eq!(out.state.player_state, PlayerState::Jumping);
}

#[test]
fn test_head_bump_on_brick() {
    let level = block_at(3, 5, 0x51);

    // 小さい状態では割れずに上向きの速度だけ失う
    let small = Profile::default();
    let out = Emulator::new(&small, &level).step(&jumping_under_row_5(), Input::A).unwrap();
    assert_eq!(out.state.y_spd, 0x20);
    assert!(!out.state.ext.powerup_block_hit);

    // 大きい状態の頭の判定は (x + 0x800, y + 0x400) で、同じ高さなら1行上
    let big = Profile { player_size: PlayerSize::Big, ..Profile::default() };
    let level = block_at(3, 4, 0x51);
    let out = Emulator::new(&big, &level).step(&jumping_under_row_5(), Input::A).unwrap();
    assert_eq!(out.event, None);
    assert_eq!(out.state.y_pos, 0x16800);
    // レンガを壊して上昇を続ける
    assert_eq!(out.state.y_spd, -0x1e0);
}

#[test]
fn test_question_block_activation() {
    let profile = Profile { powerup_block: Some(TileCoord { x: 3, y: 5 }), ..Profile::default() };
    let level = block_at(3, 5, 0xc0);
    let emu = Emulator::new(&profile, &level);

    let out = emu.step(&jumping_under_row_5(), Input::A).unwrap();
    assert!(out.state.ext.powerup_block_hit);
    assert_eq!(out.state.y_spd, 0x20);

    // 落下に移って重力が FallStanding になる
    let next = emu.step(&out.state, Input::A).unwrap().state;
    assert_eq!(next.v_force, Gravity::FallStanding);
    assert_eq!(next.y_pos, 0x16820);
    assert_eq!(next.y_spd, 0x90);

    // 叩いた後は固いブロックとして跳ね返される
    let mut s = jumping_under_row_5();
    s.ext.powerup_block_hit = true;
    let out = emu.step(&s, Input::A).unwrap();
    assert_eq!(out.state.y_spd, 0x120);

    // 追跡しないハテナブロックは叩いても記録しない
    let untracked = Profile::default();
    let out = Emulator::new(&untracked, &level).step(&jumping_under_row_5(), Input::A).unwrap();
    assert!(!out.state.ext.powerup_block_hit);
    assert_eq!(out.state.y_spd, 0x20);
}

// =============================================================================
// ダッシュタイマー
// =============================================================================

#[test]
fn test_running_timer_keeps_run_friction() {
    let profile = Profile { running_timer: true, ..Profile::default() };
    let level = flat_ground(16, 0x54);
    let emu = Emulator::new(&profile, &level);

    let s = State {
        x_spd: 0x1000,
        x_spd_abs: 2,
        moving_dir: Dir::RIGHT,
        ..State::standing(0x2800, 0x1b000)
    };
    let first = emu.step(&s, Input::B | Input::RIGHT).unwrap().state;
    assert_eq!(first.ext.running_timer, 0x0a);
    // ダッシュの加速 0xe4
    assert_eq!(first.x_spd, 0x10e4);
    assert_eq!(first.x_pos, 0x2900);

    // B を離してもタイマーが残る間はダッシュの加速
    let second = emu.step(&first, Input::RIGHT).unwrap().state;
    assert_eq!(second.ext.running_timer, 9);
    assert_eq!(second.x_spd, 0x11c8);
    assert_eq!(second.x_pos, 0x2a10);

    // タイマーを使わないプロファイルでは歩きの加速 0x98 に戻り、タイマーは動かない
    let plain = Profile::default();
    let second = Emulator::new(&plain, &level).step(&first, Input::RIGHT).unwrap().state;
    assert_eq!(second.ext.running_timer, 0x0a);
    assert_eq!(second.x_spd, 0x117c);
}

// =============================================================================
// 水泳
// =============================================================================

fn swimming_at(y_pos: i32, y_spd: i16) -> State {
    State {
        y_spd,
        player_state: PlayerState::Jumping,
        v_force: Gravity::FallSwimming,
        v_force_down: Gravity::FallSwimming,
        ..State::standing(0x2800, y_pos)
    }
}

#[test]
fn test_swimming_stroke() {
    let profile = Profile { swimming: true, ..Profile::default() };
    let level = Level::blank(16);
    let emu = Emulator::new(&profile, &level);

    let s = emu.step(&swimming_at(0x18000, 0x40), Input::A).unwrap().state;
    assert_eq!(s.player_state, PlayerState::Jumping);
    assert_eq!(s.v_force, Gravity::JumpSwimming);
    assert_eq!(s.v_force_down, Gravity::FallSwimming);
    assert_eq!(s.ext.jump_swim_timer, 0x1f);
    assert_eq!(s.y_pos, 0x17e80);
    // -0x180 + 0x0d
    assert_eq!(s.y_spd, -0x173);

    // A を離すと落下の重力に戻り、受付タイマーが減る
    let s = emu.step(&s, Input::NIL).unwrap().state;
    assert_eq!(s.v_force, Gravity::FallSwimming);
    assert_eq!(s.ext.jump_swim_timer, 0x1e);
    assert_eq!(s.y_pos, 0x17d0d);
    assert_eq!(s.y_spd, -0x169);
}

#[test]
fn test_swimming_stroke_needs_timer_or_sinking() {
    let profile = Profile { swimming: true, ..Profile::default() };
    let level = Level::blank(16);
    let emu = Emulator::new(&profile, &level);

    // 上昇中でタイマーも切れていれば A を押しても漕がない
    let s = emu.step(&swimming_at(0x18000, -0x100), Input::A).unwrap().state;
    assert_eq!(s.v_force, Gravity::FallSwimming);
    assert_eq!(s.ext.jump_swim_timer, 0);
    assert_eq!(s.y_pos, 0x17f00);
    assert_eq!(s.y_spd, -0xf6);
}

#[test]
fn test_swimming_near_surface() {
    let profile = Profile { swimming: true, ..Profile::default() };
    let level = Level::blank(16);
    let emu = Emulator::new(&profile, &level);

    // 水面近くでは漕いでも上向きの速度が残らず、重力は SwimTooHigh
    let s = emu.step(&swimming_at(0x11200, 0x40), Input::A).unwrap().state;
    assert_eq!(s.v_force, Gravity::SwimTooHigh);
    assert_eq!(s.ext.jump_swim_timer, 0x1f);
    assert_eq!(s.y_pos, 0x11280);
    // (-0x180 & 0xff) + 0x18
    assert_eq!(s.y_spd, 0x98);
}

// =============================================================================
// スクロール
// =============================================================================

/// 1フレームに 2 ピクセル右へ進む空中の状態
fn drifting_right(x_pos: i32, left_screen_edge_pos: u8) -> State {
    let mut s = State {
        x_spd: 0x2000,
        moving_dir: Dir::RIGHT,
        player_state: PlayerState::Falling,
        ..State::standing(x_pos, 0x18000)
    };
    s.ext.left_screen_edge_pos = left_screen_edge_pos;
    s
}

#[test]
fn test_scroll_follows_player() {
    let profile = Profile { track_scroll: true, ..Profile::default() };
    let level = Level::blank(16);
    let emu = Emulator::new(&profile, &level);

    // 画面内 0x52: 2 ピクセルのうち 1 ピクセルだけスクロール
    let s = emu.step(&drifting_right(0x6000, 0x10), Input::NIL).unwrap().state;
    assert_eq!(s.x_pos, 0x6200);
    assert_eq!(s.ext.left_screen_edge_pos, 0x11);

    // 画面内 0x72: 移動量そのまま
    let s = emu.step(&drifting_right(0x8000, 0x10), Input::NIL).unwrap().state;
    assert_eq!(s.ext.left_screen_edge_pos, 0x12);

    // 画面内 0x42: スクロールしない
    let s = emu.step(&drifting_right(0x6000, 0x20), Input::NIL).unwrap().state;
    assert_eq!(s.ext.left_screen_edge_pos, 0x20);

    // スクロールを追跡しないプロファイルでは動かない
    let plain = Profile::default();
    let s = Emulator::new(&plain, &level).step(&drifting_right(0x8000, 0x10), Input::NIL).unwrap().state;
    assert_eq!(s.ext.left_screen_edge_pos, 0x10);
}

#[test]
fn test_side_collision_timer() {
    let profile = Profile { track_scroll: true, ..Profile::default() };
    let mut level = flat_ground(16, 0x54);
    level.set(4, 10, 0x1f);
    let emu = Emulator::new(&profile, &level);

    // 左向きで土管の口に押し戻されるとタイマーが立つ
    let s = State { facing_dir: Dir::LEFT, ..State::standing(0x3300, 0x1b000) };
    let s = emu.step(&s, Input::NIL).unwrap().state;
    assert_eq!(s.x_pos, 0x3200);
    assert_eq!(s.ext.side_collision_timer, 0x0f);

    let s = emu.step(&s, Input::NIL).unwrap().state;
    assert_eq!(s.x_pos, 0x3200);
    assert_eq!(s.ext.side_collision_timer, 0x0e);

    // タイマーが残る間はスクロールしない
    let mut s = drifting_right(0x6000, 0x10);
    s.ext.side_collision_timer = 3;
    let s = emu.step(&s, Input::NIL).unwrap().state;
    assert_eq!(s.ext.left_screen_edge_pos, 0x10);
    assert_eq!(s.ext.side_collision_timer, 2);
}
