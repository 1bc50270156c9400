//! rsmb-core: SMB 物理の固定小数点再現と最短入力列探索
//!
//! - `types`: 入力・向き・状態の基本型
//! - `profile`: 機能プロファイルとプラットフォーム定数（NTSC/PAL）
//! - `level`: タイルマップとタイル分類
//! - `state`: 1フレーム分の物理状態
//! - `emu`: 遷移関数（1フレーム進める）
//! - `heuristic`: 目標矩形までの許容的な下界
//! - `goal`: ゴール判定とシナリオ設定
//! - `tt`: 状態ストア（置換表）
//! - `search`: 反復深化探索

pub mod emu;
pub mod error;
pub mod goal;
pub mod heuristic;
pub mod level;
pub mod profile;
pub mod search;
pub mod state;
pub mod tt;
pub mod types;

pub use emu::{Emulator, StepEvent, StepOutcome, TileHit};
pub use error::{EmuError, LevelError, ProfileError, SearchError};
pub use goal::{Goal, GoalRegion, SearchGoal, Scenario};
pub use level::{EmptyLevel, Level, LevelMap};
pub use profile::{Platform, PlayerSize, Profile};
pub use search::{SearchEngine, SearchLimits, SearchOutcome, Solution};
pub use state::{State, StateExt};
pub use types::{Dir, Dist, Gravity, Input, PlayerState};
