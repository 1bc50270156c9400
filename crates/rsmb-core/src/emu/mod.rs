//! 遷移関数
//!
//! `State` と `Input` から次フレームの `State` を求める。
//! 元のゲームの処理順（入力解釈 → 移動 → スクロール → 背景衝突 → タイマー）を
//! そのまま再現しており、順序を変えると数値が一致しなくなる。
//!
//! - `Emulator`: プロファイルとタイルマップを束ねた遷移関数本体
//! - `StepOutcome`: 次状態と接触イベント
//! - `StepEvent`: 通常の移動処理を打ち切るタイル接触

mod frame;
#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

use crate::error::EmuError;
use crate::level::LevelMap;
use crate::profile::Profile;
use crate::state::State;
use crate::types::Input;

use frame::Frame;

/// settle の上限フレーム数
pub const SETTLE_MAX_STEPS: u32 = 256;

/// 接触したタイル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileHit {
    pub x: usize,
    pub y: usize,
    pub code: u8,
}

/// 接触イベントの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactKind {
    Axe,
    VerticalPipe,
    SidePipe,
    Flag,
    VineAutoclimb,
    Vine,
    InvalidFall,
}

/// 通常の移動処理を打ち切る接触イベント
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepEvent {
    /// 斧に着地
    Axe(TileHit),
    /// 縦土管に入った
    VerticalPipe(TileHit),
    /// 横土管に入った
    SidePipe(TileHit),
    /// 旗竿につかまった
    Flag(TileHit),
    /// 自動で登り始めるツタ
    VineAutoclimb(TileHit),
    /// ツタにつかまった
    Vine(TileHit),
    /// Y小数部を消すプロファイルで足場から落ちた（再現できない状態）
    InvalidFall,
}

impl StepEvent {
    pub fn kind(&self) -> ContactKind {
        match self {
            StepEvent::Axe(_) => ContactKind::Axe,
            StepEvent::VerticalPipe(_) => ContactKind::VerticalPipe,
            StepEvent::SidePipe(_) => ContactKind::SidePipe,
            StepEvent::Flag(_) => ContactKind::Flag,
            StepEvent::VineAutoclimb(_) => ContactKind::VineAutoclimb,
            StepEvent::Vine(_) => ContactKind::Vine,
            StepEvent::InvalidFall => ContactKind::InvalidFall,
        }
    }

    pub fn tile(&self) -> Option<TileHit> {
        match *self {
            StepEvent::Axe(t)
            | StepEvent::VerticalPipe(t)
            | StepEvent::SidePipe(t)
            | StepEvent::Flag(t)
            | StepEvent::VineAutoclimb(t)
            | StepEvent::Vine(t) => Some(t),
            StepEvent::InvalidFall => None,
        }
    }
}

/// 1フレームの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub state: State,
    pub event: Option<StepEvent>,
}

/// 遷移関数
///
/// タイルマップとプロファイルは読み取り専用で、状態以外の履歴は持たない。
pub struct Emulator<'a, L: LevelMap> {
    profile: &'a Profile,
    level: &'a L,
}

impl<L: LevelMap> Clone for Emulator<'_, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L: LevelMap> Copy for Emulator<'_, L> {}

impl<'a, L: LevelMap> Emulator<'a, L> {
    pub fn new(profile: &'a Profile, level: &'a L) -> Self {
        Self { profile, level }
    }

    #[inline]
    pub fn profile(&self) -> &'a Profile {
        self.profile
    }

    #[inline]
    pub fn level(&self) -> &'a L {
        self.level
    }

    /// 1フレーム進める
    #[inline]
    pub fn step(&self, s: &State, input: Input) -> Result<StepOutcome, EmuError> {
        Frame::new(self.profile, self.level, s.clone(), input).run()
    }

    /// 入力列を順に適用し、各フレームの結果を返す
    ///
    /// 接触イベントが起きたフレームで打ち切る。
    pub fn replay(&self, s: &State, inputs: &[Input]) -> Result<Vec<StepOutcome>, EmuError> {
        let mut out = Vec::with_capacity(inputs.len());
        let mut cur = s.clone();
        for &input in inputs {
            let step = self.step(&cur, input)?;
            cur = step.state.clone();
            let stop = step.event.is_some();
            out.push(step);
            if stop {
                break;
            }
        }
        Ok(out)
    }

    /// 画面上端からの登場直後の過渡状態を無入力で進める
    ///
    /// `(y_pos & 0xff00) >= 0x3000` になるまで無入力でフレームを進める。
    pub fn settle(&self, s: State) -> Result<State, EmuError> {
        let mut cur = s;
        for _ in 0..SETTLE_MAX_STEPS {
            if (cur.y_pos & 0xff00) >= 0x3000 {
                return Ok(cur);
            }
            cur = self.step(&cur, Input::NIL)?.state;
        }
        if (cur.y_pos & 0xff00) >= 0x3000 {
            return Ok(cur);
        }
        Err(EmuError::SettleDidNotConverge { steps: SETTLE_MAX_STEPS })
    }
}
