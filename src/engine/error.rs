/// Failures that keep a game from starting.
///
/// Ignored interactions (clicking a locked board, re-activating the reveal)
/// are not errors and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("catalog unavailable: {reason}")]
    CatalogUnavailable {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("no pairs could be dealt for this game")]
    EmptyDeck,
}

impl GameError {
    pub fn catalog(reason: impl Into<String>) -> Self {
        GameError::CatalogUnavailable {
            reason: reason.into(),
            source: None,
        }
    }

    pub fn catalog_with_source(
        reason: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        GameError::CatalogUnavailable {
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }
}

pub type Result<T> = std::result::Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = GameError::catalog("empty response");
        assert_eq!(err.to_string(), "catalog unavailable: empty response");
        assert_eq!(
            GameError::EmptyDeck.to_string(),
            "no pairs could be dealt for this game"
        );
    }

    #[test]
    fn source_is_preserved() {
        let parse = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = GameError::catalog_with_source("bad catalog document", parse);
        assert!(std::error::Error::source(&err).is_some());
    }
}
