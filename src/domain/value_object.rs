//! 値オブジェクト定義
//!
//! ルームキー・参加者 ID・タイムスタンプの値オブジェクトと、
//! それぞれの生成ファクトリを定義します。
//!
//! ## 生成規則
//!
//! - `RoomKey`: 英大文字＋数字の 5 文字。`RoomKeyFactory` が暗号論的に強い
//!   乱数源（`OsRng`）から生成する。
//! - `ParticipantId`: ルーム内で一意な 0 以外の `i32`。`ParticipantIdFactory`
//!   が棄却サンプリング（0 または使用済みなら再生成）で生成する。

use rand::{Rng, rngs::OsRng};

use super::error::DomainError;

/// ルームキーの文字数
pub const ROOM_KEY_LEN: usize = 5;

/// ルームキーに使用する文字集合（英大文字＋数字、36 文字）
const ROOM_KEY_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// ルームを識別するキー（値オブジェクト）
///
/// 大文字・小文字は区別される（生成されるのは常に大文字）。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomKey(String);

impl RoomKey {
    /// 形式を検証して RoomKey を作成
    pub fn new(value: String) -> Result<Self, DomainError> {
        let valid = value.len() == ROOM_KEY_LEN
            && value.bytes().all(|b| ROOM_KEY_CHARSET.contains(&b));
        if valid {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidRoomKey(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// RoomKey の生成ファクトリ
pub struct RoomKeyFactory;

impl RoomKeyFactory {
    /// ランダムな RoomKey を生成
    ///
    /// 衝突チェックは行わない（Registry 側が既存キーと照合して再生成する）。
    pub fn generate() -> RoomKey {
        let key: String = (0..ROOM_KEY_LEN)
            .map(|_| {
                let idx = OsRng.gen_range(0..ROOM_KEY_CHARSET.len());
                ROOM_KEY_CHARSET[idx] as char
            })
            .collect();
        RoomKey(key)
    }
}

/// ルーム内で参加者を識別する ID（値オブジェクト）
///
/// 0 は「未割り当て」の番兵値として予約されているため使用できない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticipantId(i32);

impl ParticipantId {
    /// 0 以外であることを検証して ParticipantId を作成
    pub fn new(value: i32) -> Result<Self, DomainError> {
        if value == 0 {
            Err(DomainError::ZeroParticipantId)
        } else {
            Ok(Self(value))
        }
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

/// ParticipantId の生成ファクトリ
pub struct ParticipantIdFactory;

impl ParticipantIdFactory {
    /// 既存 ID と衝突しない ParticipantId を棄却サンプリングで生成
    ///
    /// 候補が 0 または使用済みの間は再生成する。i32 の ID 空間に対して
    /// ルームの参加者数は十分小さいため、ループは実用上すぐ終了する。
    pub fn generate(existing: &[ParticipantId]) -> ParticipantId {
        let mut candidate: i32 = 0;
        while candidate == 0 || existing.iter().any(|id| id.0 == candidate) {
            candidate = OsRng.r#gen();
        }
        ParticipantId(candidate)
    }
}

/// Unix タイムスタンプ（JST、ミリ秒）の値オブジェクト
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
