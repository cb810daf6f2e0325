//! 情绪判定管道
//!
//! 1. 本地词典给出临时标签（总是可用）；
//! 2. 在限定时间内调用一次远程模型；
//! 3. 远程回复中含有标签词（忽略大小写，按 Positive、Negative、Neutral 顺序检查）时覆盖临时标签；
//! 4. 其余情况（失败、超时、回复无法识别）沿用临时标签，只记录警告。

pub mod heuristic;
pub mod remote;

use std::sync::Arc;
use std::time::Duration;

use domain::Sentiment;

pub use heuristic::Lexicon;
pub use remote::{build_prompt, ClassificationError, RemoteClassifier};

/// 标签最终来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSource {
    Heuristic,
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub label: Sentiment,
    pub provisional: Sentiment,
    pub source: LabelSource,
}

pub struct SentimentPipeline {
    remote: Arc<dyn RemoteClassifier>,
    deadline: Duration,
}

impl SentimentPipeline {
    pub fn new(remote: Arc<dyn RemoteClassifier>, deadline: Duration) -> Self {
        Self { remote, deadline }
    }

    /// 为消息正文给出唯一的情绪标签，永不失败
    pub async fn resolve(&self, text: &str) -> Sentiment {
        self.resolve_detailed(text).await.label
    }

    pub async fn resolve_detailed(&self, text: &str) -> Resolution {
        let provisional = heuristic::classify(text);
        let fallback = Resolution {
            label: provisional,
            provisional,
            source: LabelSource::Heuristic,
        };

        let reply = match self.consult_remote(text).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(error = %err, fallback = %provisional, "远程情绪分类失败，保留本地标签");
                return fallback;
            }
        };

        match Sentiment::find_in(&reply) {
            Some(label) => {
                tracing::debug!(label = %label, provisional = %provisional, "采用远程情绪标签");
                Resolution {
                    label,
                    provisional,
                    source: LabelSource::Remote,
                }
            }
            None => {
                tracing::warn!(reply = %reply.trim(), fallback = %provisional, "远程回复中没有情绪标签，保留本地标签");
                fallback
            }
        }
    }

    async fn consult_remote(&self, text: &str) -> Result<String, ClassificationError> {
        tokio::time::timeout(self.deadline, self.remote.classify(text))
            .await
            .map_err(|_| ClassificationError::Timeout(self.deadline))?
    }
}
