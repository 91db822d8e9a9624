// src/infra/errors.rs — Error types for retouch

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetouchError {
    // Provider errors (may be retriable at the HTTP level)
    #[error("Provider '{provider}' error: {message}")]
    Provider {
        provider: String,
        message: String,
        retriable: bool,
    },

    // Model returned something the agent could not turn into a structured result
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    // User errors
    #[error("Unsupported image '{path}': {reason}")]
    UnsupportedImage { path: String, reason: String },

    #[error("No API key configured. Set GROQ_API_KEY or add it to config.toml.")]
    NoApiKey,

    // Infra
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RetouchError {
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            RetouchError::Provider {
                retriable: true,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_retriable_flag() {
        let e = RetouchError::Provider {
            provider: "groq".into(),
            message: "503".into(),
            retriable: true,
        };
        assert!(e.is_retriable());

        let e = RetouchError::Provider {
            provider: "groq".into(),
            message: "401".into(),
            retriable: false,
        };
        assert!(!e.is_retriable());
    }

    #[test]
    fn test_non_provider_errors_not_retriable() {
        assert!(!RetouchError::MalformedResponse("nope".into()).is_retriable());
        assert!(!RetouchError::NoApiKey.is_retriable());
    }

    #[test]
    fn test_display_includes_context() {
        let e = RetouchError::UnsupportedImage {
            path: "photo.xyz".into(),
            reason: "unknown extension".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("photo.xyz"));
        assert!(msg.contains("unknown extension"));
    }
}
