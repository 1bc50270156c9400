//! シナリオファイル（TOML）
//!
//! ```toml
//! level = "levels/1-2.txt"   # シナリオファイルからの相対パス
//!
//! [profile]
//! platform = "ntsc"
//! player_size = "big"
//!
//! [[starts]]
//! x_pos = 0x32c0
//! y_pos = 0x1b000
//! facing_dir = "R"
//! settle = true
//!
//! [variants]
//! facing_dirs = true
//! smaller_x_pos = 2
//!
//! [goal]
//! min_steps = 1
//! [goal.goal]
//! type = "contact"
//! kind = "side_pipe"
//!
//! [limits]
//! max_limit = 200
//! ```
//!
//! `mode = "max_x_pos"` なら `[goal]` の代わりに到達できる最大の X 座標を測り、
//! `mode = "unreachable"` なら上限まで全数探索する（どちらも `max_limit` が必要）。

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use log::info;
use serde::Deserialize;

use rsmb_core::emu::Emulator;
use rsmb_core::goal::GoalSpec;
use rsmb_core::state::{with_all_x_spd_subpixels, with_facing_dirs, with_smaller_x_pos};
use rsmb_core::{Level, Profile, SearchLimits, State};

use crate::common::io::read_text;

/// 探索の目的
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GoalMode {
    /// `[goal]` の条件を満たす最短入力列
    #[default]
    Scenario,
    /// ゴールなし（上限までの全数探索）
    Unreachable,
    /// 到達できる最大の X 座標
    MaxXPos,
}

/// シナリオファイルの内容
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioFile {
    /// マップファイル
    pub level: PathBuf,
    #[serde(default)]
    pub mode: GoalMode,
    #[serde(default)]
    pub profile: Profile,
    pub starts: Vec<StartSpec>,
    #[serde(default)]
    pub variants: Variants,
    /// `mode = "scenario"` のときは必須
    #[serde(default)]
    pub goal: Option<GoalSpec>,
    #[serde(default)]
    pub limits: SearchLimits,
}

/// 開始状態の指定（状態のフィールドは省略時に既定値）
#[derive(Debug, Clone, Deserialize)]
pub struct StartSpec {
    /// 無入力で進めて画面上端からの登場直後の過渡状態を抜ける
    #[serde(default)]
    pub settle: bool,
    #[serde(flatten)]
    pub state: State,
}

/// 開始状態の展開
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Variants {
    /// `x_spd` から速度段階を設定し直す
    pub sync_speed_bucket: bool,
    pub facing_dirs: bool,
    /// X 座標を 0x10 ずつ小さくする段階数
    pub smaller_x_pos: u32,
    pub all_x_spd_subpixels: bool,
}

/// 読み込んで展開済みのシナリオ
#[derive(Debug, Clone)]
pub struct LoadedScenario {
    pub mode: GoalMode,
    pub profile: Profile,
    pub level: Level,
    pub starts: Vec<State>,
    pub goal: Option<GoalSpec>,
    pub limits: SearchLimits,
}

impl LoadedScenario {
    /// 探索の目的を切り替える
    pub fn set_mode(&mut self, mode: GoalMode) -> Result<()> {
        check_mode(mode, self.goal.as_ref(), &self.limits)?;
        self.mode = mode;
        Ok(())
    }
}

/// 目的に必要な設定がそろっているか
fn check_mode(mode: GoalMode, goal: Option<&GoalSpec>, limits: &SearchLimits) -> Result<()> {
    match mode {
        GoalMode::Scenario if goal.is_none() => bail!("scenario mode requires a [goal] table"),
        GoalMode::Unreachable | GoalMode::MaxXPos if limits.max_limit.is_none() => {
            bail!("{mode:?} mode never finds a goal and requires limits.max_limit")
        }
        _ => Ok(()),
    }
}

impl ScenarioFile {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("failed to parse scenario")
    }

    /// マップファイルの絶対パス（相対パスは `base_dir` 起点）
    pub fn level_path(&self, base_dir: &Path) -> PathBuf {
        if self.level.is_absolute() { self.level.clone() } else { base_dir.join(&self.level) }
    }

    /// プロファイルを検査し、開始状態を settle・展開する
    pub fn build(self, level: Level) -> Result<LoadedScenario> {
        let ScenarioFile { level: _, mode, profile, starts: specs, variants, goal, limits } = self;
        profile.validate().context("invalid profile")?;
        if specs.is_empty() {
            bail!("scenario has no start states");
        }
        check_mode(mode, goal.as_ref(), &limits)?;

        let emu = Emulator::new(&profile, &level);
        let constants = profile.constants();
        let mut starts = Vec::with_capacity(specs.len());
        for (i, spec) in specs.into_iter().enumerate() {
            let mut s = spec.state;
            if spec.settle {
                s = emu.settle(s).with_context(|| format!("start #{i} did not settle"))?;
            }
            if variants.sync_speed_bucket {
                s = s.with_synced_speed_bucket(constants);
            }
            starts.push(s);
        }

        if variants.facing_dirs {
            starts = with_facing_dirs(&starts);
        }
        if variants.smaller_x_pos > 0 {
            starts = with_smaller_x_pos(&profile, &starts, variants.smaller_x_pos);
        }
        if variants.all_x_spd_subpixels {
            starts = with_all_x_spd_subpixels(&starts);
        }

        Ok(LoadedScenario { mode, profile, level, starts, goal, limits })
    }
}

/// マップファイルを読む（`.gz` 可）
pub fn load_level(path: &Path) -> Result<Level> {
    let text = read_text(path).with_context(|| format!("failed to read level {}", path.display()))?;
    text.parse().with_context(|| format!("failed to parse level {}", path.display()))
}

/// シナリオファイルとそのマップを読む
pub fn load_scenario(path: &Path) -> Result<LoadedScenario> {
    let text = read_text(path).with_context(|| format!("failed to read scenario {}", path.display()))?;
    let file = ScenarioFile::parse(&text).with_context(|| format!("in {}", path.display()))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let level = load_level(&file.level_path(base_dir))?;
    let scenario = file.build(level)?;
    info!(
        "loaded scenario {} ({} columns, {} start states)",
        path.display(),
        scenario.level.width(),
        scenario.starts.len()
    );
    Ok(scenario)
}
