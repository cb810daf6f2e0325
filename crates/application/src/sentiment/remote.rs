use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// 远程分类失败的原因。只在情绪管道内部使用，不会传给调用方。
#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("remote classifier credential is not configured")]
    MissingCredential,
    #[error("remote classifier request failed: {0}")]
    Transport(String),
    #[error("remote classifier returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("remote classifier response malformed: {0}")]
    Malformed(String),
    #[error("remote classifier did not answer within {0:?}")]
    Timeout(Duration),
}

/// 远程文本分类服务。单次调用，不重试，返回模型的原始回复文本。
#[async_trait]
pub trait RemoteClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<String, ClassificationError>;
}

/// 构造给远程模型的提示词：要求把（可能中英/印英混杂的）口语文本严格分为三类之一
pub fn build_prompt(text: &str) -> String {
    format!(
        r#"You are a sentiment analysis model. Analyze the sentiment of the following message. It may be written in Hinglish (a mix of Hindi and English used in informal conversation).

Classify the sentiment strictly as exactly one of the following labels:
- Positive
- Negative
- Neutral

Examples:
1. "Yeh movie toh kamaal ki thi!" -> Positive
2. "Mujhe bilkul pasand nahi aaya." -> Negative
3. "Theek hai, chal sakta hai." -> Neutral
4. "Kya bakwaas service thi yaar!" -> Negative
5. "Mast laga yeh experience." -> Positive

Now classify this message: "{text}"

Sentiment:"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_message_and_labels() {
        let prompt = build_prompt("kal milte hain");
        assert!(prompt.contains("\"kal milte hain\""));
        for label in ["Positive", "Negative", "Neutral"] {
            assert!(prompt.contains(label));
        }
        assert!(prompt.trim_end().ends_with("Sentiment:"));
    }
}
