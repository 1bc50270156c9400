//! タイルマップとタイル分類
//!
//! - `LevelMap`: ブロック座標 → タイルコードの読み取り専用参照
//! - `Level`: 13行の固定高さグリッド
//! - `EmptyLevel`: 衝突なし
//! - `tile`: タイルコードの分類（固い/登れる/隠し/ハテナ/コイン）

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LevelError;

/// ブロック座標
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: usize,
    pub y: usize,
}

/// タイルマップ参照
///
/// 範囲外は 0（空白）を返すこと。
pub trait LevelMap {
    fn tile_at(&self, x: usize, y: usize) -> u8;

    /// 符号付き座標版（負の座標は空白）
    #[inline]
    fn tile_at_signed(&self, x: i32, y: i32) -> u8 {
        match (usize::try_from(x), usize::try_from(y)) {
            (Ok(x), Ok(y)) => self.tile_at(x, y),
            _ => 0,
        }
    }
}

impl<T: LevelMap + ?Sized> LevelMap for &T {
    #[inline]
    fn tile_at(&self, x: usize, y: usize) -> u8 {
        (**self).tile_at(x, y)
    }
}

/// 衝突のないマップ
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyLevel;

impl LevelMap for EmptyLevel {
    #[inline]
    fn tile_at(&self, _x: usize, _y: usize) -> u8 {
        0
    }
}

/// 固定高さのタイルグリッド
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    width: usize,
    /// 行優先（y * width + x）
    tiles: Vec<u8>,
}

impl Level {
    /// 画面の縦ブロック数
    pub const ROWS: usize = 13;

    /// 行ごとのタイル列から作る
    pub fn from_rows(rows: Vec<Vec<u8>>) -> Result<Self, LevelError> {
        if rows.len() != Self::ROWS {
            return Err(LevelError::RowCount { expected: Self::ROWS, actual: rows.len() });
        }
        let width = rows[0].len();
        let mut tiles = Vec::with_capacity(width * Self::ROWS);
        for (row, cells) in rows.into_iter().enumerate() {
            if cells.len() != width {
                return Err(LevelError::RaggedRow { row, expected: width, actual: cells.len() });
            }
            tiles.extend(cells);
        }
        Ok(Self { width, tiles })
    }

    /// 空白で埋めたマップ
    pub fn blank(width: usize) -> Self {
        Self { width, tiles: vec![0; width * Self::ROWS] }
    }

    /// 1タイルを書き換える（範囲外は無視）
    pub fn set(&mut self, x: usize, y: usize, code: u8) {
        if x < self.width && y < Self::ROWS {
            self.tiles[y * self.width + x] = code;
        }
    }

    /// 1行を `code` で埋める
    pub fn fill_row(&mut self, y: usize, code: u8) {
        for x in 0..self.width {
            self.set(x, y, code);
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }
}

impl LevelMap for Level {
    #[inline]
    fn tile_at(&self, x: usize, y: usize) -> u8 {
        if x < self.width && y < Self::ROWS { self.tiles[y * self.width + x] } else { 0 }
    }
}

/// テキスト形式の読み込み
///
/// 13行、各行は空白区切りの16進タイルコード（`0` または `0x54` / `54` 形式）。
/// 空行と `#` で始まる行は無視する。
impl FromStr for Level {
    type Err = LevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rows = Vec::with_capacity(Self::ROWS);
        for line in s.lines().map(str::trim).filter(|l| !l.is_empty() && !l.starts_with('#')) {
            let row = rows.len();
            let cells = line
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|t| !t.is_empty())
                .map(|t| {
                    let digits = t.trim_start_matches("0x").trim_start_matches("0X");
                    u8::from_str_radix(digits, 16)
                        .map_err(|_| LevelError::InvalidTile { row, token: t.to_string() })
                })
                .collect::<Result<Vec<u8>, _>>()?;
            rows.push(cells);
        }
        Self::from_rows(rows)
    }
}

/// タイルコードの分類
pub mod tile {
    /// 縦土管の左側の口
    pub const VERTICAL_PIPE_LEFT: u8 = 0x10;
    /// 縦土管の右側の口
    pub const VERTICAL_PIPE_RIGHT: u8 = 0x11;
    /// 斧
    pub const AXE: u8 = 0xc5;
    /// 叩いた後の固いブロック
    pub const USED_BLOCK: u8 = 0xc4;
    /// ツタ
    pub const VINE: u8 = 0x26;

    #[inline]
    pub fn is_coin(cv: u8) -> bool {
        cv == 0xc2 || cv == 0xc3
    }

    #[inline]
    pub fn is_solid(cv: u8) -> bool {
        (0x10..0x40).contains(&cv) || (0x61..0x80).contains(&cv) || (0x88..0xc0).contains(&cv) || cv >= 0xc4
    }

    #[inline]
    pub fn is_climb(cv: u8) -> bool {
        (0x24..0x40).contains(&cv) || (0x6d..0x80).contains(&cv) || (0x8a..0xc0).contains(&cv) || cv >= 0xc6
    }

    #[inline]
    pub fn is_hidden_block(cv: u8) -> bool {
        cv == 0x5f || cv == 0x60
    }

    #[inline]
    pub fn is_question_block(cv: u8) -> bool {
        cv == 0xc0 || cv == 0xc1 || (0x55..=0x60).contains(&cv)
    }

    /// 旗竿
    #[inline]
    pub fn is_flag(cv: u8) -> bool {
        cv == 0x24 || cv == 0x25
    }

    /// 横向き土管の口
    #[inline]
    pub fn is_side_pipe(cv: u8) -> bool {
        cv == 0x6c || cv == 0x1f
    }

    /// 頭上側の横判定で無視するタイル
    #[inline]
    pub fn skips_upper_side_check(cv: u8) -> bool {
        cv == 0x1c || cv == 0x6b
    }
}
