//! 基本型
//!
//! - `Input`: 1フレーム分のパッド入力（ビットマスク）
//! - `Dir`: 左右の向き・衝突マスク（2bit）
//! - `PlayerState`: 接地/上昇/落下/登攀
//! - `Gravity`: 重力テーブルのインデックス

mod dir;
mod input;
mod motion;

pub use dir::Dir;
pub use input::{Input, InputParseError, format_rle};
pub use motion::{Gravity, PlayerState};

/// 探索のステップ数（フレーム数）
pub type Dist = u16;
