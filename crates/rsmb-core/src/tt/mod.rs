//! 置換表モジュール
//!
//! 訪問済みの状態と、その状態に到達した最小ステップ数を記録する状態ストア。
//!
//! - `StateStore`: ストアの共通インターフェース
//! - `OrderedStore`: `State` の全順序をキーにした順序付きマップ（既定）
//! - `HashedStore`: ハッシュマップ版
//!
//! # 世代管理
//!
//! 反復深化のラウンドが変わるときはエントリを消さず、全エントリのステップ数に
//! 1 を足す（`age_all`）。前ラウンドで深さ d に記録された状態は、次ラウンドでは
//! d + 1 未満の経路で来たときだけ再探索される。

mod table;

pub use table::{HashedStore, OrderedStore};

use crate::state::State;
use crate::types::Dist;

/// 状態ストア
pub trait StateStore {
    /// 状態を記録し、探索を続けるべきかを返す
    ///
    /// 未登録なら `steps` で登録して `true`。登録済みの値が `steps` より大きければ
    /// `steps` に更新して `true`。それ以外（同じかより短い経路を既に見た）は `false`。
    fn check_and_update(&mut self, s: &State, steps: Dist) -> bool;

    /// 全エントリのステップ数を 1 増やす
    fn age_all(&mut self);

    /// 記録済みのステップ数
    fn get(&self, s: &State) -> Option<Dist>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);

    /// 全エントリを走査する（順序は実装依存）
    fn for_each(&self, f: &mut dyn FnMut(&State, Dist));
}
