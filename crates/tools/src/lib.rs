//! rsmb-core の外側の道具
//!
//! - `common`: ファイルI/Oとロガー初期化
//! - `scenario`: TOML シナリオファイルとマップファイルの読み込み
//! - `solution`: 解の JSON 形式と入力列の表記

pub mod common;
pub mod scenario;
pub mod solution;
