//! 解の保存形式と入力列の表記

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use rsmb_core::emu::{ContactKind, TileHit};
use rsmb_core::search::SearchStats;
use rsmb_core::types::format_rle;
use rsmb_core::{Input, Solution, State};

/// 解ファイル（JSON）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionFile {
    /// シナリオを展開した開始状態の番号
    pub start_index: usize,
    pub start: State,
    pub inputs: Vec<Input>,
    /// `inputs` のランレングス表記（表示用）
    #[serde(default)]
    pub rle: String,
    #[serde(default)]
    pub event: Option<ContactKind>,
    #[serde(default)]
    pub tile: Option<TileHit>,
    #[serde(default)]
    pub final_state: Option<State>,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub stats: Option<SearchStats>,
}

impl SolutionFile {
    pub fn new(solution: &Solution, stats: Option<&SearchStats>) -> Self {
        Self {
            start_index: solution.start_index,
            start: solution.start.clone(),
            inputs: solution.inputs.clone(),
            rle: format_rle(&solution.inputs),
            event: solution.event.map(|e| e.kind()),
            tile: solution.event.and_then(|e| e.tile()),
            final_state: solution.states.last().cloned(),
            stats: stats.cloned(),
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("failed to parse solution JSON")
    }
}

/// 入力列の文字列を読む
///
/// カンマ区切りの入力名で、各要素に `3x ` の繰り返し回数を付けられる。
/// `format_rle` の出力（`[3x B|R, 1x NIL] (len: 4)`）もそのまま読める。
pub fn parse_inputs(text: &str) -> Result<Vec<Input>> {
    let mut body = text.trim();
    if let Some(pos) = body.rfind("(len:") {
        body = body[..pos].trim_end();
    }
    body = body.trim_start_matches('[').trim_end_matches(']');

    let mut inputs = Vec::new();
    for item in body.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let (count, name) = match item.split_once(char::is_whitespace) {
            Some((n, rest)) if n.ends_with(['x', 'X']) => {
                let count: usize = n[..n.len() - 1]
                    .parse()
                    .with_context(|| format!("invalid repeat count in {item:?}"))?;
                (count, rest.trim())
            }
            _ => (1, item),
        };
        let input: Input = name.parse().with_context(|| format!("invalid input {item:?}"))?;
        inputs.extend(std::iter::repeat_n(input, count));
    }
    if inputs.is_empty() {
        bail!("no inputs in {text:?}");
    }
    Ok(inputs)
}
