use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// 消息情绪标签，只有三个固定取值。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// 匹配远程模型回复时的检查顺序，靠前者优先。
    pub const PRECEDENCE: [Sentiment; 3] =
        [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    /// 按词典得分的符号映射标签。
    pub fn from_score(score: i32) -> Self {
        match score.signum() {
            1 => Sentiment::Positive,
            -1 => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }

    /// 在任意文本中查找标签词（忽略大小写的子串匹配）。
    ///
    /// 文本同时包含多个标签词时，按 [`Sentiment::PRECEDENCE`] 取第一个。
    pub fn find_in(text: &str) -> Option<Self> {
        let lowered = text.to_lowercase();
        Self::PRECEDENCE
            .into_iter()
            .find(|label| lowered.contains(label.keyword()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Positive" => Ok(Sentiment::Positive),
            "Negative" => Ok(Sentiment::Negative),
            "Neutral" => Ok(Sentiment::Neutral),
            other => Err(DomainError::invalid_argument(
                "sentiment",
                format!("unknown label {other:?}"),
            )),
        }
    }
}

/// 会话内各情绪标签的消息数量。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    #[serde(rename = "Positive")]
    pub positive: u64,
    #[serde(rename = "Negative")]
    pub negative: u64,
    #[serde(rename = "Neutral")]
    pub neutral: u64,
}

impl SentimentCounts {
    pub fn add(&mut self, sentiment: Sentiment, count: u64) {
        match sentiment {
            Sentiment::Positive => self.positive += count,
            Sentiment::Negative => self.negative += count,
            Sentiment::Neutral => self.neutral += count,
        }
    }

    pub fn total(&self) -> u64 {
        self.positive + self.negative + self.neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_sign_decides_label() {
        assert_eq!(Sentiment::from_score(3), Sentiment::Positive);
        assert_eq!(Sentiment::from_score(-1), Sentiment::Negative);
        assert_eq!(Sentiment::from_score(0), Sentiment::Neutral);
    }

    #[test]
    fn finds_label_case_insensitively() {
        assert_eq!(Sentiment::find_in("  NEGATIVE\n"), Some(Sentiment::Negative));
        assert_eq!(Sentiment::find_in("Sentiment: neutral."), Some(Sentiment::Neutral));
        assert_eq!(Sentiment::find_in("no idea"), None);
    }

    #[test]
    fn positive_wins_over_negative_when_both_present() {
        assert_eq!(
            Sentiment::find_in("negative or maybe Positive"),
            Some(Sentiment::Positive)
        );
        assert_eq!(
            Sentiment::find_in("neutral, leaning negative"),
            Some(Sentiment::Negative)
        );
    }

    #[test]
    fn parses_only_canonical_labels() {
        assert_eq!("Neutral".parse::<Sentiment>().unwrap(), Sentiment::Neutral);
        assert!("neutral".parse::<Sentiment>().is_err());
        assert!("Mixed".parse::<Sentiment>().is_err());
    }

    #[test]
    fn counts_serialize_with_label_keys() {
        let mut counts = SentimentCounts::default();
        counts.add(Sentiment::Positive, 2);
        counts.add(Sentiment::Neutral, 1);
        let json = serde_json::to_value(counts).unwrap();
        assert_eq!(json["Positive"], 2);
        assert_eq!(json["Negative"], 0);
        assert_eq!(json["Neutral"], 1);
        assert_eq!(counts.total(), 3);
    }
}
