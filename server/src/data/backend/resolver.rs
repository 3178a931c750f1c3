//! Two-stage telemetry client resolution

use std::sync::Arc;

use tokio::sync::OnceCell;

use super::{BackendError, SinkFactory, TelemetrySink};

/// Resolves the sink used for one submission.
///
/// 1. The sink injected at startup, if any.
/// 2. Otherwise a fallback built from the connection string on first use and
///    cached. Concurrent first requests share a single construction.
///
/// A failed construction is not cached; the next request tries again.
pub struct ClientResolver {
    injected: Option<Arc<dyn TelemetrySink>>,
    factory: Option<Arc<dyn SinkFactory>>,
    fallback: OnceCell<Arc<dyn TelemetrySink>>,
}

impl ClientResolver {
    pub fn new(
        injected: Option<Arc<dyn TelemetrySink>>,
        factory: Option<Arc<dyn SinkFactory>>,
    ) -> Self {
        Self {
            injected,
            factory,
            fallback: OnceCell::new(),
        }
    }

    /// `Ok(None)` when nothing was injected and fallback construction is disabled
    pub async fn resolve(
        &self,
        connection_string: &str,
    ) -> Result<Option<Arc<dyn TelemetrySink>>, BackendError> {
        if let Some(sink) = &self.injected {
            return Ok(Some(Arc::clone(sink)));
        }

        let Some(factory) = &self.factory else {
            return Ok(None);
        };

        let sink = self
            .fallback
            .get_or_try_init(|| async {
                let sink = factory.build(connection_string).await?;
                tracing::info!(
                    backend = sink.backend_name(),
                    "Created fallback telemetry client"
                );
                Ok::<_, BackendError>(sink)
            })
            .await?;

        Ok(Some(Arc::clone(sink)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::backend::mock::{CountingFactory, RecordingSink};

    #[tokio::test]
    async fn test_injected_sink_preferred() {
        let injected = Arc::new(RecordingSink::default());
        let factory = Arc::new(CountingFactory::succeeding());
        let resolver = ClientResolver::new(
            Some(injected as Arc<dyn TelemetrySink>),
            Some(factory.clone() as Arc<dyn SinkFactory>),
        );

        let sink = resolver.resolve("InstrumentationKey=k").await.unwrap();

        assert!(sink.is_some());
        assert_eq!(factory.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_injected_and_no_factory_is_unavailable() {
        let resolver = ClientResolver::new(None, None);
        assert!(resolver.resolve("InstrumentationKey=k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fallback_built_once_and_cached() {
        let factory = Arc::new(CountingFactory::succeeding());
        let resolver = ClientResolver::new(None, Some(factory.clone() as Arc<dyn SinkFactory>));

        let first = resolver.resolve("cs").await.unwrap().unwrap();
        let second = resolver.resolve("cs").await.unwrap().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.calls(), 1);
    }

    #[tokio::test]
    async fn test_fallback_concurrent_construction_happens_once() {
        let factory = Arc::new(CountingFactory::succeeding());
        let resolver = Arc::new(ClientResolver::new(
            None,
            Some(factory.clone() as Arc<dyn SinkFactory>),
        ));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                tokio::spawn(async move { resolver.resolve("cs").await.unwrap().is_some() })
            })
            .collect();

        for task in futures::future::join_all(tasks).await {
            assert!(task.unwrap());
        }
        assert_eq!(factory.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_construction_not_cached() {
        let factory = Arc::new(CountingFactory::failing());
        let resolver = ClientResolver::new(None, Some(factory.clone() as Arc<dyn SinkFactory>));

        assert!(resolver.resolve("cs").await.is_err());
        assert!(resolver.resolve("cs").await.is_err());
        assert_eq!(factory.calls(), 2);
    }
}
