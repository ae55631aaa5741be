use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

/// Language model used to turn a rendered prompt into an action list.
///
/// Transport concerns such as retries and timeouts belong to implementors.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
impl<L> LlmClient for Arc<L>
where
    L: LlmClient + ?Sized,
{
    async fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt).await
    }
}

/// Calls `client` and folds any failure into "no response".
pub async fn invoke_llm<L>(client: &L, prompt: &str) -> Option<String>
where
    L: LlmClient + ?Sized,
{
    match client.complete(prompt).await {
        Ok(actions) => Some(actions),
        Err(error) => {
            tracing::error!(
                event_name = "command_generator.llm.error",
                error = %error,
                "llm invocation failed, treating as empty response"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    use super::{invoke_llm, LlmClient};

    struct Echo;

    #[async_trait]
    impl LlmClient for Echo {
        async fn complete(&self, prompt: &str) -> Result<String> {
            Ok(prompt.to_uppercase())
        }
    }

    struct Broken;

    #[async_trait]
    impl LlmClient for Broken {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Err(anyhow!("connection reset by peer"))
        }
    }

    #[tokio::test]
    async fn successful_calls_pass_the_answer_through() {
        assert_eq!(invoke_llm(&Echo, "chitchat()").await.as_deref(), Some("CHITCHAT()"));
    }

    #[tokio::test]
    async fn failures_become_no_response() {
        assert_eq!(invoke_llm(&Broken, "anything").await, None);
    }
}
