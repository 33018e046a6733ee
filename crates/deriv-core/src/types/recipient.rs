//! 메시지 수신자 식별자.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 메시지를 받는 대상(텔레그램 채팅)의 고유 키.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipientKey(pub i64);

impl RecipientKey {
    /// 원시 채팅 ID.
    pub fn chat_id(&self) -> i64 {
        self.0
    }
}

impl From<i64> for RecipientKey {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for RecipientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
