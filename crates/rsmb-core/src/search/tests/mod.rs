//! search モジュールのテスト
//!
//! 小さな合成マップで最短解・枝刈り・状態ストアの世代管理を確認する。


use super::*;
use crate::emu::ContactKind;
use crate::error::ProfileError;
use crate::goal::{ContactMatcher, GoalRegion, GoalSpec, Scenario, Unreachable};
use crate::level::{Level, tile};
use crate::tt::HashedStore;
use crate::types::{Dir, PlayerState};

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

/// 右側 (4, 10) に横土管の口があるマップ
fn side_pipe_level() -> Level {
    let mut level = flat_ground(16, 0x54);
    level.set(4, 10, 0x1f);
    level
}

fn side_pipe_start() -> State {
    State { facing_dir: Dir::RIGHT, ..State::standing(0x32c0, 0x1b000) }
}

fn contact_goal(kind: ContactKind) -> GoalSpec {
    GoalSpec::contact(ContactMatcher::kind(kind), GoalRegion::unbounded())
}

fn run_search<T: StateStore>(
    profile: &Profile,
    level: &Level,
    spec: GoalSpec,
    store: T,
    limits: SearchLimits,
    starts: &[State],
) -> SearchOutcome {
    let goal = Scenario::new(profile, level, spec);
    let mut engine = SearchEngine::new(profile, level, goal, store, limits).unwrap();
    engine.search(starts).unwrap()
}

fn expect_found(outcome: SearchOutcome) -> Solution {
    match outcome {
        SearchOutcome::Found(solution) => solution,
        SearchOutcome::NotFound { limit } => panic!("no solution within {limit} steps"),
    }
}

#[test]
fn test_axe_in_two_steps() {
    let profile = Profile::default();
    let level = flat_ground(16, tile::AXE);
    let outcome = run_search(
        &profile,
        &level,
        contact_goal(ContactKind::Axe),
        OrderedStore::new(),
        SearchLimits::default(),
        &[falling_onto_row_11()],
    );
    let solution = expect_found(outcome);

    // 空中の合法手の先頭は R
    assert_eq!(solution.inputs, vec![Input::RIGHT, Input::RIGHT]);
    assert_eq!(solution.states.len(), 2);
    assert_eq!(solution.start_index, 0);
    assert_eq!(solution.event, Some(StepEvent::Axe(crate::emu::TileHit { x: 2, y: 11, code: tile::AXE })));
}

#[test]
fn test_side_pipe_shortest_path() {
    let profile = Profile::default();
    let level = side_pipe_level();
    let start = side_pipe_start();
    let outcome = run_search(
        &profile,
        &level,
        contact_goal(ContactKind::SidePipe),
        OrderedStore::new(),
        SearchLimits::default(),
        std::slice::from_ref(&start),
    );
    let solution = expect_found(outcome);

    // 2フレームでは最大 0x30 しか進めず、右側の判定が土管の列に届かない
    assert_eq!(solution.len(), 3);

    let emu = Emulator::new(&profile, &level);
    let replay = emu.replay(&start, &solution.inputs).unwrap();
    assert_eq!(replay.len(), 3);
    assert!(replay[..2].iter().all(|o| o.event.is_none()));
    assert!(matches!(replay[2].event, Some(StepEvent::SidePipe(_))));
    assert_eq!(replay.last().map(|o| &o.state), solution.states.last());
}

#[test]
fn test_unreachable_goal_reports_not_found() {
    let profile = Profile::default();
    let level = flat_ground(16, 0x54);
    let limits = SearchLimits { max_limit: Some(3), ..SearchLimits::default() };
    let mut engine =
        SearchEngine::new(&profile, &level, Unreachable, OrderedStore::new(), limits).unwrap();

    let outcome = engine.search(&[State::standing(0x2800, 0x1b000)]).unwrap();
    assert_eq!(outcome, SearchOutcome::NotFound { limit: 3 });

    let stats = engine.stats();
    // 上限 0, 1, 2, 3 の4ラウンド
    assert_eq!(stats.rounds, 4);
    assert_eq!(stats.final_limit, 3);
    assert!(stats.nodes_visited > 0);
    assert_eq!(stats.table_size, engine.store().len());
    assert_eq!(stats.unsound_heuristic, 0);
}

#[test]
fn test_max_limit_below_heuristic() {
    let profile = Profile::default();
    let level = side_pipe_level();
    // 目標矩形がはるか右にあるので最初のラウンドから上限を超える
    let spec = GoalSpec::contact(
        ContactMatcher::kind(ContactKind::SidePipe),
        GoalRegion::at_least_x(0x8000),
    );
    let limits = SearchLimits { max_limit: Some(2), ..SearchLimits::default() };
    let outcome = run_search(&profile, &level, spec, OrderedStore::new(), limits, &[side_pipe_start()]);
    assert_eq!(outcome, SearchOutcome::NotFound { limit: 2 });
}

#[test]
fn test_forbidden_start_is_not_found() {
    let profile = Profile::default();
    let level = side_pipe_level();
    let mut spec = contact_goal(ContactKind::SidePipe);
    spec.forbidden.push(GoalRegion::unbounded());
    let outcome =
        run_search(&profile, &level, spec, OrderedStore::new(), SearchLimits::default(), &[side_pipe_start()]);
    assert_eq!(outcome, SearchOutcome::NotFound { limit: 0 });
}

#[test]
fn test_later_start_state_wins() {
    let profile = Profile::default();
    let level = flat_ground(16, tile::AXE);
    // マップの外では斧に届かない
    let far = State { x_pos: 0x20000, ..falling_onto_row_11() };
    let outcome = run_search(
        &profile,
        &level,
        contact_goal(ContactKind::Axe),
        OrderedStore::new(),
        SearchLimits::default(),
        &[far, falling_onto_row_11()],
    );
    let solution = expect_found(outcome);
    assert_eq!(solution.start_index, 1);
    assert_eq!(solution.start, falling_onto_row_11());
    assert_eq!(solution.len(), 2);
}

#[test]
fn test_retained_and_cleared_tables_agree() {
    let profile = Profile::default();
    let level = side_pipe_level();
    let starts = [side_pipe_start()];

    let retained = run_search(
        &profile,
        &level,
        contact_goal(ContactKind::SidePipe),
        OrderedStore::new(),
        SearchLimits::default(),
        &starts,
    );
    let cleared = run_search(
        &profile,
        &level,
        contact_goal(ContactKind::SidePipe),
        OrderedStore::new(),
        SearchLimits { retain_table: false, ..SearchLimits::default() },
        &starts,
    );
    let hashed = run_search(
        &profile,
        &level,
        contact_goal(ContactKind::SidePipe),
        HashedStore::new(),
        SearchLimits::default(),
        &starts,
    );
    assert_eq!(retained, cleared);
    assert_eq!(retained, hashed);
}

#[test]
fn test_search_is_deterministic() {
    let profile = Profile::default();
    let level = side_pipe_level();
    let starts = crate::state::with_smaller_x_pos(&profile, &[side_pipe_start()], 2);
    let first = run_search(
        &profile,
        &level,
        contact_goal(ContactKind::SidePipe),
        OrderedStore::new(),
        SearchLimits::default(),
        &starts,
    );
    let second = run_search(
        &profile,
        &level,
        contact_goal(ContactKind::SidePipe),
        OrderedStore::new(),
        SearchLimits::default(),
        &starts,
    );
    assert_eq!(first, second);
    assert!(matches!(first, SearchOutcome::Found(_)));
}

#[test]
fn test_region_goal() {
    let profile = Profile::default();
    let level = flat_ground(16, 0x54);
    let start = State::standing(0x2800, 0x1b000);
    let region = GoalRegion::at_least_x(0x2830);
    let outcome = run_search(
        &profile,
        &level,
        GoalSpec::region(region),
        OrderedStore::new(),
        SearchLimits::default(),
        std::slice::from_ref(&start),
    );
    let solution = expect_found(outcome);
    // 0x10 + 0x20 = 0x30
    assert_eq!(solution.len(), 2);
    assert!(region.contains_state(&solution.states[1]));
    assert!(!region.contains_state(&solution.states[0]));
    assert_eq!(solution.event, None);
}

#[test]
fn test_empty_start_list_is_an_error() {
    let profile = Profile::default();
    let level = flat_ground(16, 0x54);
    let mut engine =
        SearchEngine::new(&profile, &level, Unreachable, OrderedStore::new(), SearchLimits::default()).unwrap();
    assert_eq!(engine.search(&[]), Err(SearchError::NoStartStates));
}

#[test]
fn test_invalid_profile_is_rejected() {
    let profile = Profile { parity: 0, ..Profile::default() };
    let level = flat_ground(16, 0x54);
    let engine = SearchEngine::new(&profile, &level, Unreachable, OrderedStore::new(), SearchLimits::default());
    assert!(matches!(engine, Err(SearchError::Profile(ProfileError::InvalidParity(0)))));
}

/// 開始状態だけ残りフレーム数を大きく見積もるゴール（イベントのない1フレームで到達）
struct OverestimatingGoal {
    root_h: Dist,
}

impl SearchGoal for OverestimatingGoal {
    fn heuristic(&self, _s: &State, steps: Dist) -> Option<Dist> {
        Some(if steps == 0 { self.root_h } else { 0 })
    }

    fn is_goal(&self, _next: &State, event: Option<&StepEvent>) -> bool {
        event.is_none()
    }
}

#[test]
fn test_overestimating_heuristic_is_counted() {
    let profile = Profile::default();
    let level = flat_ground(16, 0x54);
    let goal = OverestimatingGoal { root_h: 3 };
    let mut engine = SearchEngine::new(&profile, &level, goal, OrderedStore::new(), SearchLimits::default()).unwrap();

    let outcome = engine.search(&[State::standing(0x2800, 0x1b000)]).unwrap();
    let solution = expect_found(outcome);
    assert_eq!(solution.len(), 1);

    let stats = engine.stats();
    // 最初の上限は開始状態の見積もり
    assert_eq!(stats.final_limit, 3);
    assert_eq!(stats.rounds, 1);
    assert_eq!(stats.unsound_heuristic, 1);
    assert!(stats.unsound_root);
}

#[test]
fn test_sound_heuristic_is_not_flagged() {
    let profile = Profile::default();
    let level = flat_ground(16, 0x54);
    let goal = Scenario::new(&profile, &level, GoalSpec::region(GoalRegion::at_least_x(0x2830)));
    let mut engine = SearchEngine::new(&profile, &level, goal, OrderedStore::new(), SearchLimits::default()).unwrap();

    let solution = expect_found(engine.search(&[State::standing(0x2800, 0x1b000)]).unwrap());
    assert_eq!(solution.len(), 2);
    assert_eq!(engine.stats().unsound_heuristic, 0);
    assert!(!engine.stats().unsound_root);
}
