//! 本地词典情绪打分
//!
//! 纯同步、确定性的打分器：对消息分词后累加词典中每个词的情绪值。
//! 结果作为临时标签，远程模型不可用时直接使用。

use std::collections::HashMap;

use domain::Sentiment;
use once_cell::sync::Lazy;

static BUNDLED: Lazy<Lexicon> = Lazy::new(|| Lexicon::parse(include_str!("lexicon.txt")));

/// 位于情绪词之前的否定词（英文语序）
const LEADING_NEGATORS: &[&str] = &[
    "not", "no", "never", "dont", "don't", "doesn't", "didn't", "isn't", "wasn't", "aren't",
    "won't", "can't", "cannot",
];

/// 位于情绪词之后的否定词（印地语语序，例如 "pasand nahi"）
const TRAILING_NEGATORS: &[&str] = &["nahi", "nahin", "nhi", "mat"];

/// 词 -> 情绪值
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    valences: HashMap<String, i32>,
}

impl Lexicon {
    /// 解析 `word<TAB>score` 格式，`#` 开头为注释，无法解析的行会被跳过
    pub fn parse(source: &str) -> Self {
        let valences = source
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let (word, score) = line.split_once(char::is_whitespace)?;
                match score.trim().parse::<i32>() {
                    Ok(score) => Some((word.to_lowercase(), score)),
                    Err(_) => {
                        tracing::debug!(line, "跳过无法解析的词典行");
                        None
                    }
                }
            })
            .collect();
        Self { valences }
    }

    /// 随程序打包的词典
    pub fn bundled() -> &'static Lexicon {
        &BUNDLED
    }

    pub fn valence(&self, word: &str) -> Option<i32> {
        self.valences.get(word).copied()
    }

    pub fn len(&self) -> usize {
        self.valences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valences.is_empty()
    }

    /// 累加所有词的情绪值，否定词会翻转相邻情绪词的符号
    pub fn score(&self, text: &str) -> i32 {
        let tokens = tokenize(text);
        tokens
            .iter()
            .enumerate()
            .filter_map(|(index, token)| {
                let valence = self.valence(token)?;
                let negated_before = index
                    .checked_sub(1)
                    .is_some_and(|prev| LEADING_NEGATORS.contains(&tokens[prev].as_str()));
                let negated_after = tokens
                    .get(index + 1)
                    .is_some_and(|next| TRAILING_NEGATORS.contains(&next.as_str()));
                Some(if negated_before || negated_after {
                    -valence
                } else {
                    valence
                })
            })
            .sum()
    }

    pub fn classify(&self, text: &str) -> Sentiment {
        Sentiment::from_score(self.score(text))
    }
}

/// 小写化后按非字母数字（撇号除外）切分
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|token| token.trim_matches('\''))
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

/// 使用打包词典给文本打分
pub fn classify(text: &str) -> Sentiment {
    Lexicon::bundled().classify(text)
}
