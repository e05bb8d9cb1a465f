use crate::adapter::SearchAdapter;
use crate::config::{ConfigError, ConfigSection, QuarryConfig, SearchConfig};
use crate::handler::SearchHandler;

/// Entry point holding the process-wide search defaults.
///
/// Backend crates add constructors for their own handlers through extension
/// traits (`searcher.database(..)`, `searcher.elastic(..)`).
#[derive(Debug, Clone, Default)]
pub struct Searcher {
    config: SearchConfig,
}

impl Searcher {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    /// Read the `search.*` section of `config`.
    pub fn from_config(config: &QuarryConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(SearchConfig::from_config(config)?))
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Default page-size ceiling applied to every handler.
    pub fn max_size(&self) -> u64 {
        self.config.max_size
    }

    /// A handler for `adapter`, seeded with the configured max size.
    pub fn handler<A, T>(&self, adapter: A) -> SearchHandler<A, T>
    where
        A: SearchAdapter<T>,
        T: Send + Sync + 'static,
    {
        SearchHandler::new(adapter).max_size(self.config.max_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{Backend, Bindings};
    use crate::error::SearchError;
    use crate::request::SearchRequest;

    struct Fixed;

    impl Backend for Fixed {
        type Statement = ();

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    impl SearchAdapter<u32> for Fixed {
        async fn exec(
            &self,
            _request: &SearchRequest<Self, u32>,
            bindings: &mut Bindings<u32>,
        ) -> Result<u64, SearchError> {
            bindings.result = vec![1, 2, 3];
            Ok(3)
        }

        async fn load(&self, _statement: &()) -> Result<Vec<u32>, SearchError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_handler_seeded_with_max_size() {
        let searcher = Searcher::new(SearchConfig {
            max_size: 10,
            ..SearchConfig::default()
        });
        let (_, request, _) = searcher.handler::<_, u32>(Fixed).size(50).freeze();
        assert_eq!(request.size(), 10);
        assert_eq!(request.max_size(), 10);
    }

    #[test]
    fn test_handler_max_size_wins() {
        let searcher = Searcher::new(SearchConfig {
            max_size: 10,
            ..SearchConfig::default()
        });
        let (_, request, _) = searcher.handler::<_, u32>(Fixed).max_size(100).size(50).freeze();
        assert_eq!(request.size(), 50);
    }

    #[test]
    fn test_from_config() {
        let config = QuarryConfig::from_yaml_str("search:\n  maxsize: 7\n", "test").unwrap();
        let searcher = Searcher::from_config(&config).unwrap();
        assert_eq!(searcher.max_size(), 7);
        assert_eq!(searcher.config().log_level, "warn");
    }

    #[tokio::test]
    async fn test_exec_through_searcher() {
        let result = Searcher::default()
            .handler::<_, u32>(Fixed)
            .page(1)
            .size(2)
            .path("/n")
            .exec()
            .await
            .unwrap();
        assert_eq!(result.result, vec![1, 2, 3]);
        let pagination = result.pagination.unwrap();
        assert_eq!(pagination.next.as_deref(), Some("/n?page=2&size=2"));
        assert!(result.metadata.unwrap().is_empty());
    }
}
