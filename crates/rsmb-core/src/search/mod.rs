//! 反復深化探索
//!
//! 1つ以上の開始状態から、ゴール判定を満たす最短の入力列を探す。
//!
//! # アルゴリズム
//!
//! - 外側のループでフレーム数の上限 `limit` を 1 ずつ増やし、上限つきの深さ優先探索を繰り返す
//! - 各ノードで `steps + h > limit`（h は許容的なヒューリスティック）なら枝刈り
//! - 状態ストアに同じかより短い経路で記録済みの状態も枝刈り
//! - ラウンドの間は状態ストアを消さずに世代を進める（`StateStore::age_all`）
//! - 接触イベントが起きた枝は、ゴールでなければそこで行き止まり
//!
//! 解の入力列は再帰の戻りで組み立てる（エンジンの外に経路の状態を持たない）。
//! ヒューリスティックが実際の残りフレーム数を超えていたノードは `warn!` で報告する。

mod inputs;
mod stats;
#[cfg(test)]
mod tests;

pub use inputs::{InputList, MAX_LEGAL_INPUTS, legal_inputs};
pub use stats::SearchStats;

use std::time::Instant;

#[cfg(feature = "search-stats")]
use log::debug;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::emu::{Emulator, StepEvent};
use crate::error::SearchError;
use crate::goal::SearchGoal;
use crate::level::LevelMap;
use crate::profile::Profile;
use crate::state::State;
use crate::tt::{OrderedStore, StateStore};
use crate::types::{Dist, Input};

/// 探索の上限と運用設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchLimits {
    /// 最初のラウンドの上限（開始状態のヒューリスティックの最小値より小さければそちらを使う）
    pub start_limit: Dist,
    /// この上限を超えたら見つからなかったとして終了する
    pub max_limit: Option<Dist>,
    /// これ以上下の状態は落下済みとして枝刈りする
    pub max_y_pos: i32,
    /// 進捗を報告する間隔（展開ノード数）
    pub progress_interval: u64,
    /// ラウンドの間で状態ストアを残す（`false` なら毎ラウンド消す）
    pub retain_table: bool,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            start_limit: 0,
            max_limit: None,
            max_y_pos: 0x1d000,
            progress_interval: 1_000_000,
            retain_table: true,
        }
    }
}

/// 見つかった解
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// 使った開始状態の番号
    pub start_index: usize,
    pub start: State,
    /// 実行順の入力列
    pub inputs: Vec<Input>,
    /// 各入力を適用した後の状態（`inputs` と同じ長さ）
    pub states: Vec<State>,
    /// 最後のフレームの接触イベント
    pub event: Option<StepEvent>,
}

impl Solution {
    #[inline]
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// 探索結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(Solution),
    /// `limit` 以下のフレーム数では見つからなかった
    NotFound { limit: Dist },
}

/// 反復深化探索エンジン
///
/// 状態ストアは1回の `search` の間エンジンが専有する。
pub struct SearchEngine<'a, L: LevelMap, G: SearchGoal, T: StateStore = OrderedStore> {
    emu: Emulator<'a, L>,
    goal: G,
    store: T,
    limits: SearchLimits,
    stats: SearchStats,
    started: Instant,
    last_progress: Instant,
    last_table_size: usize,
}

impl<'a, L: LevelMap, G: SearchGoal, T: StateStore> SearchEngine<'a, L, G, T> {
    /// プロファイルを検査してエンジンを作る
    pub fn new(
        profile: &'a Profile,
        level: &'a L,
        goal: G,
        store: T,
        limits: SearchLimits,
    ) -> Result<Self, SearchError> {
        profile.validate()?;
        let now = Instant::now();
        Ok(Self {
            emu: Emulator::new(profile, level),
            goal,
            store,
            limits,
            stats: SearchStats::default(),
            started: now,
            last_progress: now,
            last_table_size: 0,
        })
    }

    pub fn emulator(&self) -> Emulator<'a, L> {
        self.emu
    }

    pub fn goal(&self) -> &G {
        &self.goal
    }

    pub fn store(&self) -> &T {
        &self.store
    }

    pub fn limits(&self) -> &SearchLimits {
        &self.limits
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// 最短の入力列を探す
    ///
    /// 開始状態は同じ上限の中で順に試し、状態ストアを共有する。
    /// 最初に見つかった解（列挙順で最も早いもの）を返す。
    pub fn search(&mut self, starts: &[State]) -> Result<SearchOutcome, SearchError> {
        if starts.is_empty() {
            return Err(SearchError::NoStartStates);
        }
        self.stats.reset();
        self.started = Instant::now();
        self.last_progress = self.started;
        self.last_table_size = self.store.len();

        let root_h: Vec<Option<Dist>> = starts.iter().map(|s| self.goal.heuristic(s, 0)).collect();
        let Some(min_h) = root_h.iter().flatten().copied().min() else {
            info!("every start state is pruned by the heuristic");
            return Ok(self.finish(SearchOutcome::NotFound { limit: self.limits.start_limit }));
        };
        let mut limit = self.limits.start_limit.max(min_h);

        loop {
            if let Some(max_limit) = self.limits.max_limit {
                if limit > max_limit {
                    info!("no solution within {max_limit} steps");
                    return Ok(self.finish(SearchOutcome::NotFound { limit: max_limit }));
                }
            }
            info!("search limit {limit}");
            self.stats.rounds += 1;
            self.stats.final_limit = limit;

            for (start_index, start) in starts.iter().enumerate() {
                let Some(mut inputs) = self.search_rec(start, 0, limit)? else {
                    continue;
                };
                inputs.reverse();
                let solution = self.build_solution(start_index, start, inputs)?;
                if let Some(h) = root_h[start_index] {
                    if usize::from(h) > solution.len() {
                        self.stats.unsound_root = true;
                        warn!("root heuristic {h} exceeds solution length {}", solution.len());
                    }
                }
                info!(
                    "found a {}-step solution from start #{start_index} after {} seen states",
                    solution.len(),
                    self.store.len()
                );
                return Ok(self.finish(SearchOutcome::Found(solution)));
            }

            self.goal.report();
            #[cfg(feature = "search-stats")]
            debug!("round {} finished:\n{}", self.stats.rounds, self.stats.format_report());

            if limit == Dist::MAX {
                return Ok(self.finish(SearchOutcome::NotFound { limit }));
            }
            limit += 1;
            if self.limits.retain_table {
                self.store.age_all();
            } else {
                self.store.clear();
            }
        }
    }

    /// 上限つきの深さ優先探索
    ///
    /// 見つかった場合は入力列を逆順（最後の入力が先頭）で返す。
    fn search_rec(&mut self, s: &State, steps: Dist, limit: Dist) -> Result<Option<Vec<Input>>, SearchError> {
        let Some(h) = self.goal.heuristic(s, steps) else {
            self.stats.heuristic_pruned += 1;
            return Ok(None);
        };
        self.goal.observe(s);

        if steps >= limit || steps.saturating_add(h) > limit {
            self.stats.heuristic_pruned += 1;
            return Ok(None);
        }
        if s.y_pos >= self.limits.max_y_pos {
            self.stats.out_of_bounds_pruned += 1;
            return Ok(None);
        }
        if !self.store.check_and_update(s, steps) {
            self.stats.table_pruned += 1;
            return Ok(None);
        }

        self.stats.nodes_visited += 1;
        if self.limits.progress_interval > 0 && self.stats.nodes_visited % self.limits.progress_interval == 0 {
            self.report_progress(steps, h, limit);
        }

        for input in legal_inputs(self.emu.profile(), s) {
            let out = self.emu.step(s, input)?;
            if self.goal.is_goal(&out.state, out.event.as_ref()) {
                self.check_heuristic(s, h, 1);
                return Ok(Some(vec![input]));
            }
            if out.event.is_some() {
                continue;
            }
            if let Some(mut path) = self.search_rec(&out.state, steps + 1, limit)? {
                path.push(input);
                self.check_heuristic(s, h, path.len());
                return Ok(Some(path));
            }
        }
        Ok(None)
    }

    /// 解の長さとヒューリスティックを比べる
    fn check_heuristic(&mut self, s: &State, h: Dist, actual: usize) {
        if usize::from(h) > actual {
            self.stats.unsound_heuristic += 1;
            warn!("heuristic ({h}) larger than actual steps needed ({actual}) for state {s:?}");
        }
    }

    fn report_progress(&mut self, steps: Dist, h: Dist, limit: Dist) {
        let now = Instant::now();
        let seen = self.store.len();
        let elapsed = now.duration_since(self.last_progress);
        let secs = elapsed.as_secs_f64();
        let speed = if secs > 0.0 { seen.saturating_sub(self.last_table_size) as f64 / secs } else { 0.0 };
        info!(
            "distance: {steps}, heuristic: {h}, limit: {limit}, seen: {seen}, time: {}ms, speed: {speed:.0}/s",
            elapsed.as_millis()
        );
        self.last_progress = now;
        self.last_table_size = seen;
    }

    /// 入力列を再生して各フレームの状態を埋める
    fn build_solution(&self, start_index: usize, start: &State, inputs: Vec<Input>) -> Result<Solution, SearchError> {
        let outcomes = self.emu.replay(start, &inputs)?;
        let event = outcomes.last().and_then(|o| o.event);
        let states = outcomes.into_iter().map(|o| o.state).collect();
        Ok(Solution { start_index, start: start.clone(), inputs, states, event })
    }

    fn finish(&mut self, outcome: SearchOutcome) -> SearchOutcome {
        self.stats.table_size = self.store.len();
        self.stats.elapsed = self.started.elapsed();
        outcome
    }
}
