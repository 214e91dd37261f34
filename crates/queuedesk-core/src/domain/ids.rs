//! Domain identifiers.
//!
//! サービスポイントの ID は外部（ルーティング層）からは文字列で届きます。
//! ここで一度だけ整数にパースし、以降は `ServicePointId` として扱います。
//!
//! # 正規化
//! - シャード決定のキーは `to_string()` による 10 進表現（"042" と "42" は同じキー）
//! - パースできない ID はルーティング前に弾く（全パーティション走査はしない）

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a service point record.
///
/// Either assigned by the caller (upsert) or by the store (create).
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServicePointId(i64);

impl ServicePointId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// シャードルーティングに使う正規化済みキー
    pub fn routing_key(&self) -> String {
        self.0.to_string()
    }
}

/// ID 文字列のパース失敗
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid service point id: {0:?}")]
pub struct InvalidIdentifier(pub String);

impl FromStr for ServicePointId {
    type Err = InvalidIdentifier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| InvalidIdentifier(s.to_string()))
    }
}

impl From<i64> for ServicePointId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for ServicePointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("42", 42)]
    #[case::leading_zeros("042", 42)]
    #[case::surrounding_spaces(" 7 ", 7)]
    #[case::negative("-3", -3)]
    fn parses_decimal_ids(#[case] raw: &str, #[case] expected: i64) {
        let id: ServicePointId = raw.parse().unwrap();
        assert_eq!(id.value(), expected);
    }

    #[rstest]
    #[case::empty("")]
    #[case::alpha("abc")]
    #[case::mixed("12a")]
    #[case::overflow("99999999999999999999")]
    fn rejects_non_numeric_ids(#[case] raw: &str) {
        let err = raw.parse::<ServicePointId>().unwrap_err();
        assert_eq!(err, InvalidIdentifier(raw.to_string()));
    }

    #[test]
    fn routing_key_is_canonical() {
        let a: ServicePointId = "042".parse().unwrap();
        let b: ServicePointId = "42".parse().unwrap();
        assert_eq!(a.routing_key(), "42");
        assert_eq!(a.routing_key(), b.routing_key());
    }

    #[test]
    fn serializes_as_bare_number() {
        let id = ServicePointId::new(123);
        assert_eq!(serde_json::to_string(&id).unwrap(), "123");
    }
}
