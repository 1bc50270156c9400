//! 探索統計
//!
//! 訪問ノード数と枝刈りの内訳を記録する。カウンタは常に数え、
//! ラウンドごとの詳細ログは `search-stats` feature 有効時のみ出力する。

use std::fmt::Write as _;
use std::time::Duration;

use serde::Serialize;

use crate::types::Dist;

/// 探索統計カウンタ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// 展開したノード数（枝刈りを通過した状態の数）
    pub nodes_visited: u64,
    /// ヒューリスティックによる枝刈り回数（到達不能・上限超過を含む）
    pub heuristic_pruned: u64,
    /// 状態ストアによる枝刈り回数
    pub table_pruned: u64,
    /// 画面外（下端より下）による枝刈り回数
    pub out_of_bounds_pruned: u64,
    /// 完了・中断したラウンド数
    pub rounds: u32,
    /// 最後に探索した上限
    pub final_limit: Dist,
    /// 終了時の状態ストアのエントリ数
    pub table_size: usize,
    /// ヒューリスティックが実際の残りフレーム数を超えていた回数
    pub unsound_heuristic: u64,
    /// 解の開始状態のヒューリスティックが解の長さを超えていた
    pub unsound_root: bool,
    pub elapsed: Duration,
}

impl SearchStats {
    /// 統計をリセット
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// 1秒あたりの展開ノード数
    pub fn nodes_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 { self.nodes_visited as f64 / secs } else { 0.0 }
    }

    /// 統計をフォーマットして文字列として返す
    pub fn format_report(&self) -> String {
        let mut report = String::new();
        report.push_str("=== Search Statistics ===\n");
        let _ = writeln!(report, "Nodes visited:       {:>12}", self.nodes_visited);
        let _ = writeln!(report, "Heuristic pruned:    {:>12}", self.heuristic_pruned);
        let _ = writeln!(report, "Table pruned:        {:>12}", self.table_pruned);
        let _ = writeln!(report, "Out of bounds:       {:>12}", self.out_of_bounds_pruned);
        let _ = writeln!(report, "Rounds:              {:>12}", self.rounds);
        let _ = writeln!(report, "Final limit:         {:>12}", self.final_limit);
        let _ = writeln!(report, "Table size:          {:>12}", self.table_size);
        let _ = writeln!(report, "Unsound heuristic:   {:>12}", self.unsound_heuristic);
        if self.unsound_root {
            report.push_str("Root heuristic exceeded the solution length\n");
        }
        let _ = writeln!(
            report,
            "Elapsed:             {:>10.3}s ({:.0} nodes/s)",
            self.elapsed.as_secs_f64(),
            self.nodes_per_second()
        );
        report
    }
}
