//! ゴール判定とシナリオ設定
//!
//! 面ごとに関数本体を書き換えるのではなく、目標矩形・接触の条件・追加の禁止領域を
//! 値として組み立て、汎用のヒューリスティックとゴール判定に渡す。
//!
//! - `GoalRegion`: 位置空間の軸平行矩形（各辺は非有界にできる）
//! - `Goal`: 何をもって成功とするか（矩形への到達 / 接触イベント）
//! - `GoalSpec`: シリアライズ可能なシナリオのゴール設定
//! - `SearchGoal`: 探索エンジンが使うヒューリスティックとゴール判定のインターフェース
//! - `Scenario` / `Unreachable` / `MaxXPosMetric`: その実装

use log::info;
use serde::{Deserialize, Serialize};

use crate::emu::{ContactKind, StepEvent};
use crate::heuristic::{BoundsHeuristic, min_x_pos_steps};
use crate::level::LevelMap;
use crate::profile::Profile;
use crate::state::State;
use crate::types::Dist;

// =============================================================================
// GoalRegion
// =============================================================================

/// 目標矩形（両端を含む）
///
/// 非有界な辺は `i32::MIN` / `i32::MAX` で表す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalRegion {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Default for GoalRegion {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl GoalRegion {
    /// 全平面
    pub const fn unbounded() -> Self {
        Self { left: i32::MIN, top: i32::MIN, right: i32::MAX, bottom: i32::MAX }
    }

    /// `x_pos >= x`
    pub const fn at_least_x(x: i32) -> Self {
        Self { left: x, ..Self::unbounded() }
    }

    /// `x_pos <= x`
    pub const fn at_most_x(x: i32) -> Self {
        Self { right: x, ..Self::unbounded() }
    }

    pub const fn with_left(self, left: i32) -> Self {
        Self { left, ..self }
    }

    pub const fn with_top(self, top: i32) -> Self {
        Self { top, ..self }
    }

    pub const fn with_right(self, right: i32) -> Self {
        Self { right, ..self }
    }

    pub const fn with_bottom(self, bottom: i32) -> Self {
        Self { bottom, ..self }
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.left <= x && x <= self.right && self.top <= y && y <= self.bottom
    }

    #[inline]
    pub fn contains_state(&self, s: &State) -> bool {
        self.contains(s.x_pos, s.y_pos)
    }

    /// どの位置も含まない
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.left > self.right || self.top > self.bottom
    }
}

// =============================================================================
// Goal
// =============================================================================

/// 接触イベントの条件（未指定の項目は何にでも一致する）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactMatcher {
    pub kind: Option<ContactKind>,
    /// タイルの X ブロック座標
    pub x: Option<usize>,
    /// タイルの Y ブロック座標（行）
    pub y: Option<usize>,
    pub code: Option<u8>,
}

impl ContactMatcher {
    pub fn kind(kind: ContactKind) -> Self {
        Self { kind: Some(kind), ..Self::default() }
    }

    pub fn matches(&self, event: &StepEvent) -> bool {
        // タイルのない接触（再現できない落下）はゴールにしない
        let Some(hit) = event.tile() else {
            return false;
        };
        self.kind.is_none_or(|k| k == event.kind())
            && self.x.is_none_or(|x| x == hit.x)
            && self.y.is_none_or(|y| y == hit.y)
            && self.code.is_none_or(|c| c == hit.code)
    }
}

/// 成功条件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Goal {
    /// 接触のないフレームの後に矩形内にいる
    Region(GoalRegion),
    /// 条件に一致する接触イベントが起きた
    Contact(ContactMatcher),
}

impl Goal {
    /// 1フレーム後の状態と接触イベントがゴールを満たすか
    pub fn is_satisfied(&self, next: &State, event: Option<&StepEvent>) -> bool {
        match (self, event) {
            (Goal::Region(region), None) => region.contains_state(next),
            (Goal::Region(_), Some(_)) => false,
            (Goal::Contact(m), Some(e)) => m.matches(e),
            (Goal::Contact(_), None) => false,
        }
    }
}

// =============================================================================
// SearchGoal
// =============================================================================

/// 探索エンジンに渡すヒューリスティックとゴール判定
pub trait SearchGoal {
    /// 残りフレーム数の下界（`None` はこの状態から決して到達できない）
    fn heuristic(&self, s: &State, steps: Dist) -> Option<Dist>;

    /// 1フレーム後の状態と接触イベントがゴールか
    fn is_goal(&self, next: &State, event: Option<&StepEvent>) -> bool;

    /// 展開する状態ごとに呼ばれる
    fn observe(&mut self, _s: &State) {}

    /// 反復深化のラウンド終了ごとに呼ばれる
    fn report(&self) {}
}

/// ゴール設定（シナリオファイルの `[goal]`）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalSpec {
    pub goal: Goal,
    /// ヒューリスティックの目標矩形（未指定なら全平面）
    #[serde(default)]
    pub region: GoalRegion,
    /// ヒューリスティックの下限（接触ゴールでは 1）
    #[serde(default)]
    pub min_steps: Dist,
    /// 入ったら枝刈りする矩形
    #[serde(default)]
    pub forbidden: Vec<GoalRegion>,
}

impl GoalSpec {
    /// 接触ゴール（下限 1、目標矩形 `region`）
    pub fn contact(matcher: ContactMatcher, region: GoalRegion) -> Self {
        Self { goal: Goal::Contact(matcher), region, min_steps: 1, forbidden: Vec::new() }
    }

    /// 矩形ゴール（目標矩形はゴールの矩形そのもの）
    pub fn region(region: GoalRegion) -> Self {
        Self { goal: Goal::Region(region), region, min_steps: 1, forbidden: Vec::new() }
    }
}

/// 宣言的なシナリオ
pub struct Scenario<'a, L: LevelMap> {
    spec: GoalSpec,
    bounds: BoundsHeuristic<'a, L>,
}

impl<'a, L: LevelMap> Scenario<'a, L> {
    pub fn new(profile: &'a Profile, level: &'a L, spec: GoalSpec) -> Self {
        Self { spec, bounds: BoundsHeuristic::new(profile, level) }
    }

    pub fn spec(&self) -> &GoalSpec {
        &self.spec
    }
}

impl<L: LevelMap> SearchGoal for Scenario<'_, L> {
    fn heuristic(&self, s: &State, _steps: Dist) -> Option<Dist> {
        if self.spec.forbidden.iter().any(|r| r.contains_state(s)) {
            return None;
        }
        self.bounds.min_steps_into_bounds(s, &self.spec.region).map(|h| h.max(self.spec.min_steps))
    }

    fn is_goal(&self, next: &State, event: Option<&StepEvent>) -> bool {
        self.spec.goal.is_satisfied(next, event)
    }
}

/// 決して満たされないゴール
#[derive(Debug, Clone, Copy, Default)]
pub struct Unreachable;

impl SearchGoal for Unreachable {
    fn heuristic(&self, _s: &State, _steps: Dist) -> Option<Dist> {
        Some(0)
    }

    fn is_goal(&self, _next: &State, _event: Option<&StepEvent>) -> bool {
        false
    }
}

/// 到達した最大の X 座標を記録する計測用ゴール
///
/// ゴールにはならない。ヒューリスティックは現在の最大値 + 0x10 に届くまでの
/// 横方向の最小フレーム数で、それより手前で終わる枝を刈る。
#[derive(Debug)]
pub struct MaxXPosMetric<'a> {
    profile: &'a Profile,
    best: Option<State>,
}

impl<'a> MaxXPosMetric<'a> {
    pub fn new(profile: &'a Profile) -> Self {
        Self { profile, best: None }
    }

    /// これまでの最大 X 座標の状態
    pub fn best(&self) -> Option<&State> {
        self.best.as_ref()
    }

    fn best_x(&self) -> i32 {
        self.best.as_ref().map_or(i32::MIN, |s| s.x_pos)
    }
}

impl SearchGoal for MaxXPosMetric<'_> {
    fn heuristic(&self, s: &State, _steps: Dist) -> Option<Dist> {
        let target = self.best_x().saturating_add(0x10);
        Some(min_x_pos_steps(self.profile.constants(), s, target))
    }

    fn is_goal(&self, _next: &State, _event: Option<&StepEvent>) -> bool {
        false
    }

    fn observe(&mut self, s: &State) {
        if s.x_pos > self.best_x() {
            info!("new max x_pos {:#x} (y_pos {:#x}, x_spd {:#x})", s.x_pos, s.y_pos, s.x_spd);
            self.best = Some(s.clone());
        }
    }

    fn report(&self) {
        if let Some(best) = &self.best {
            info!("max x_pos so far: {:#x}\n{}", best.x_pos, best);
        }
    }
}
