//! 左右の向き（Dir）

use std::fmt;
use std::ops::{BitAnd, BitOr, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::InputParseError;

/// 左右の向き（2bitマスク）
///
/// 向き・移動方向・横方向の衝突許可マスクに共通で使う。
/// 向きは `L|R` 入力で両方のビットが立つことがある。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Dir(u8);

impl Dir {
    pub const NONE: Dir = Dir(0);
    pub const RIGHT: Dir = Dir(0b01);
    pub const LEFT: Dir = Dir(0b10);
    pub const LR: Dir = Dir(0b11);

    /// 下位2bitだけを取り出す（入力ビットの L/R と同じ配置）
    #[inline]
    pub const fn from_bits_truncate(bits: u8) -> Dir {
        Dir(bits & 0b11)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn contains(self, other: Dir) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitAnd for Dir {
    type Output = Dir;

    #[inline]
    fn bitand(self, rhs: Dir) -> Dir {
        Dir(self.0 & rhs.0)
    }
}

impl BitOr for Dir {
    type Output = Dir;

    #[inline]
    fn bitor(self, rhs: Dir) -> Dir {
        Dir(self.0 | rhs.0)
    }
}

/// ビットを取り除く
impl Sub for Dir {
    type Output = Dir;

    #[inline]
    fn sub(self, rhs: Dir) -> Dir {
        Dir(self.0 & !rhs.0)
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self.0 {
            0 => "NONE",
            1 => "R",
            2 => "L",
            _ => "LR",
        };
        f.write_str(s)
    }
}

impl FromStr for Dir {
    type Err = InputParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "NONE" => Ok(Dir::NONE),
            "R" | "RIGHT" => Ok(Dir::RIGHT),
            "L" | "LEFT" => Ok(Dir::LEFT),
            "LR" | "L|R" => Ok(Dir::LR),
            other => Err(InputParseError::UnknownName(other.to_string())),
        }
    }
}

impl TryFrom<String> for Dir {
    type Error = InputParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Dir> for String {
    fn from(d: Dir) -> String {
        d.to_string()
    }
}
