//! Generation service boundary

use crate::error::ServiceError;

/// An external text-generation service
///
/// Implementations send the prompt once and perform no retries; retry policy
/// belongs to the caller.
pub trait GenerationService {
    fn name(&self) -> &str;

    fn invoke(&self, prompt: &str) -> Result<String, ServiceError>;
}

impl<T: GenerationService + ?Sized> GenerationService for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn invoke(&self, prompt: &str) -> Result<String, ServiceError> {
        (**self).invoke(prompt)
    }
}

#[cfg(any(test, feature = "mock"))]
pub use scripted::ScriptedService;

#[cfg(any(test, feature = "mock"))]
mod scripted {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::GenerationService;
    use crate::error::ServiceError;

    /// Test double that replays queued replies and records every prompt
    #[derive(Debug, Default)]
    pub struct ScriptedService {
        replies: Mutex<VecDeque<Result<String, ServiceError>>>,
        prompts: Mutex<Vec<String>>,
        pub default_reply: String,
    }

    impl ScriptedService {
        pub fn new() -> Self {
            Self {
                default_reply: "scripted response".into(),
                ..Self::default()
            }
        }

        pub fn with_replies(replies: Vec<Result<String, ServiceError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                ..Self::new()
            }
        }

        pub fn push_reply(&self, reply: Result<String, ServiceError>) {
            if let Ok(mut replies) = self.replies.lock() {
                replies.push_back(reply);
            }
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
        }

        pub fn call_count(&self) -> usize {
            self.prompts.lock().map(|p| p.len()).unwrap_or(0)
        }
    }

    impl GenerationService for ScriptedService {
        fn name(&self) -> &str {
            "scripted"
        }

        fn invoke(&self, prompt: &str) -> Result<String, ServiceError> {
            if let Ok(mut prompts) = self.prompts.lock() {
                prompts.push(prompt.to_string());
            }
            self.replies
                .lock()
                .ok()
                .and_then(|mut replies| replies.pop_front())
                .unwrap_or_else(|| Ok(self.default_reply.clone()))
        }
    }
}
