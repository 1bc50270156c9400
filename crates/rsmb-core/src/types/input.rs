//! パッド入力（Input）

use std::fmt::{self, Write as _};
use std::ops::{BitAnd, BitOr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Dir;

/// 1フレーム分のパッド入力
///
/// ビット配置は NES のコントローラ読み出し順（A が最上位、Right が最下位）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Input(u8);

impl Input {
    pub const NIL: Input = Input(0);
    pub const A: Input = Input(0b1000_0000);
    pub const B: Input = Input(0b0100_0000);
    pub const SELECT: Input = Input(0b0010_0000);
    pub const START: Input = Input(0b0001_0000);
    pub const UP: Input = Input(0b0000_1000);
    pub const DOWN: Input = Input(0b0000_0100);
    pub const LEFT: Input = Input(0b0000_0010);
    pub const RIGHT: Input = Input(0b0000_0001);

    /// 表示名とビットの対応（表示順）
    const NAMES: [(&'static str, Input); 8] = [
        ("A", Input::A),
        ("B", Input::B),
        ("SELECT", Input::SELECT),
        ("START", Input::START),
        ("U", Input::UP),
        ("D", Input::DOWN),
        ("L", Input::LEFT),
        ("R", Input::RIGHT),
    ];

    #[inline]
    pub const fn from_bits(bits: u8) -> Input {
        Input(bits)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// `other` の全ビットを含むか（空入力は常に含まれる）
    #[inline]
    pub const fn contains(self, other: Input) -> bool {
        self.0 & other.0 == other.0
    }

    /// 左右成分
    #[inline]
    pub const fn lr(self) -> Dir {
        Dir::from_bits_truncate(self.0)
    }

    /// 左右の向きを入力に変換
    #[inline]
    pub const fn from_dir(dir: Dir) -> Input {
        Input(dir.bits())
    }
}

impl BitOr for Input {
    type Output = Input;

    #[inline]
    fn bitor(self, rhs: Input) -> Input {
        Input(self.0 | rhs.0)
    }
}

impl BitAnd for Input {
    type Output = Input;

    #[inline]
    fn bitand(self, rhs: Input) -> Input {
        Input(self.0 & rhs.0)
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NIL");
        }
        let mut first = true;
        for (name, bit) in Input::NAMES {
            if self.contains(bit) {
                if !first {
                    f.write_char('|')?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// 入力文字列の解析エラー
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InputParseError {
    #[error("unknown input name: {0:?}")]
    UnknownName(String),
}

impl FromStr for Input {
    type Err = InputParseError;

    /// `B|R` や `NIL` 形式を受け付ける（大文字小文字は区別しない）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut input = Input::NIL;
        for part in s.split('|') {
            let name = part.trim().to_ascii_uppercase();
            let bit = match name.as_str() {
                "NIL" | "" => Input::NIL,
                "A" => Input::A,
                "B" => Input::B,
                "SELECT" => Input::SELECT,
                "START" => Input::START,
                "U" | "UP" => Input::UP,
                "D" | "DOWN" => Input::DOWN,
                "L" | "LEFT" => Input::LEFT,
                "R" | "RIGHT" => Input::RIGHT,
                _ => return Err(InputParseError::UnknownName(part.trim().to_string())),
            };
            input = input | bit;
        }
        Ok(input)
    }
}

impl TryFrom<String> for Input {
    type Error = InputParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Input> for String {
    fn from(input: Input) -> String {
        input.to_string()
    }
}

/// 入力列をランレングス表記にする
///
/// 例: `[3x B|R, 1x NIL] (len: 4)`
pub fn format_rle(inputs: &[Input]) -> String {
    let mut out = String::from("[");
    let mut runs = inputs.chunk_by(|a, b| a == b).peekable();
    while let Some(run) = runs.next() {
        let _ = write!(out, "{}x {}", run.len(), run[0]);
        if runs.peek().is_some() {
            out.push_str(", ");
        }
    }
    let _ = write!(out, "] (len: {})", inputs.len());
    out
}
