//! Process-wide cache holding at most one loaded pipeline.
//!
//! The lock is held across the load, so concurrent first callers wait for a
//! single load instead of each starting their own.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

use super::generator::{ImageGenerator, ModelLoader};
use crate::error::ModelLoadError;
use crate::models::{Device, GenerationConfig};

struct CachedPipeline {
    config: GenerationConfig,
    device: Device,
    generator: Arc<dyn ImageGenerator>,
    loaded_at: DateTime<Utc>,
}

/// Snapshot of the cache for status reporting.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct CacheStatus {
    /// A load is in progress; the other fields are empty until it finishes
    pub loading: bool,
    pub loaded: bool,
    pub device: Option<Device>,
    #[schema(value_type = Option<String>)]
    pub loaded_at: Option<DateTime<Utc>>,
}

pub struct ModelCache {
    loader: Arc<dyn ModelLoader>,
    entry: Mutex<Option<CachedPipeline>>,
}

impl ModelCache {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader,
            entry: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<CachedPipeline>> {
        // A panic inside a loader leaves the slot in a consistent state
        self.entry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Return the pipeline for `config`, loading it if the cached one was
    /// built from a different config (or nothing is cached).
    ///
    /// A replaced pipeline is released before the new one is loaded. On load
    /// failure the cache is left empty.
    pub fn get_or_load(
        &self,
        config: &GenerationConfig,
        device: Device,
    ) -> Result<Arc<dyn ImageGenerator>, ModelLoadError> {
        let mut entry = self.lock();

        if let Some(cached) = entry.as_ref() {
            if cached.config == *config && cached.device == device {
                tracing::debug!(%device, "Pipeline cache hit");
                return Ok(cached.generator.clone());
            }
        }

        if let Some(stale) = entry.take() {
            tracing::info!(device = %stale.device, "Configuration changed, releasing pipeline");
            stale.generator.release();
        }

        let generator = self.loader.load(config, device)?;
        *entry = Some(CachedPipeline {
            config: config.clone(),
            device,
            generator: generator.clone(),
            loaded_at: Utc::now(),
        });
        Ok(generator)
    }

    /// Drop the cached pipeline and release it on the runtime.
    ///
    /// Returns whether anything was loaded.
    pub fn unload(&self) -> bool {
        let stale = self.lock().take();
        match stale {
            Some(cached) => {
                cached.generator.release();
                tracing::info!(device = %cached.device, "Pipeline unloaded");
                true
            }
            None => false,
        }
    }

    /// Snapshot the cache without waiting on an in-progress load.
    pub fn status(&self) -> CacheStatus {
        let entry = match self.entry.try_lock() {
            Ok(entry) => entry,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                return CacheStatus {
                    loading: true,
                    loaded: false,
                    device: None,
                    loaded_at: None,
                }
            }
        };
        CacheStatus {
            loading: false,
            loaded: entry.is_some(),
            device: entry.as_ref().map(|c| c.device),
            loaded_at: entry.as_ref().map(|c| c.loaded_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::services::generator::GenerationRequest;
    use retro_palette::{Image, Rgb};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counters {
        loads: AtomicUsize,
        releases: AtomicUsize,
    }

    struct StubGenerator(Arc<Counters>);

    impl ImageGenerator for StubGenerator {
        fn generate(&self, _: &GenerationRequest) -> Result<Image, GenerationError> {
            Ok(Image::filled(1, 1, Rgb::new(0, 0, 0)).unwrap())
        }

        fn release(&self) {
            self.0.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct StubLoader {
        counters: Arc<Counters>,
        fail: bool,
    }

    impl ModelLoader for StubLoader {
        fn load(
            &self,
            _: &GenerationConfig,
            _: Device,
        ) -> Result<Arc<dyn ImageGenerator>, ModelLoadError> {
            self.counters.loads.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ModelLoadError::Unavailable("no weights".to_string()));
            }
            Ok(Arc::new(StubGenerator(self.counters.clone())))
        }
    }

    fn cache(fail: bool) -> (ModelCache, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let loader = StubLoader {
            counters: counters.clone(),
            fail,
        };
        (ModelCache::new(Arc::new(loader)), counters)
    }

    #[test]
    fn test_equal_config_loads_once() {
        let (cache, counters) = cache(false);
        let config = GenerationConfig::default();

        let first = cache.get_or_load(&config, Device::Cpu).unwrap();
        let second = cache.get_or_load(&config.clone(), Device::Cpu).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(counters.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_changed_config_releases_and_reloads() {
        let (cache, counters) = cache(false);
        let config = GenerationConfig::default();
        cache.get_or_load(&config, Device::Cpu).unwrap();

        let changed = GenerationConfig {
            lora_weight: 0.8,
            ..config
        };
        cache.get_or_load(&changed, Device::Cpu).unwrap();

        assert_eq!(counters.loads.load(Ordering::SeqCst), 2);
        assert_eq!(counters.releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_load_failure_leaves_cache_empty() {
        let (cache, counters) = cache(true);
        let result = cache.get_or_load(&GenerationConfig::default(), Device::Cpu);
        assert!(matches!(result, Err(ModelLoadError::Unavailable(_))));
        assert!(!cache.status().loaded);

        // Not remembered as a failure: the next call tries again
        let _ = cache.get_or_load(&GenerationConfig::default(), Device::Cpu);
        assert_eq!(counters.loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unload_releases_and_reports() {
        let (cache, counters) = cache(false);
        assert!(!cache.unload());

        cache
            .get_or_load(&GenerationConfig::default(), Device::Cuda)
            .unwrap();
        let status = cache.status();
        assert!(status.loaded);
        assert_eq!(status.device, Some(Device::Cuda));
        assert!(status.loaded_at.is_some());

        assert!(cache.unload());
        assert_eq!(counters.releases.load(Ordering::SeqCst), 1);
        assert_eq!(
            cache.status(),
            CacheStatus {
                loading: false,
                loaded: false,
                device: None,
                loaded_at: None
            }
        );
    }

    #[test]
    fn test_status_does_not_wait_for_load() {
        struct GatedLoader {
            entered: std::sync::mpsc::Sender<()>,
            release: Mutex<std::sync::mpsc::Receiver<()>>,
        }

        impl ModelLoader for GatedLoader {
            fn load(
                &self,
                _: &GenerationConfig,
                _: Device,
            ) -> Result<Arc<dyn ImageGenerator>, ModelLoadError> {
                self.entered.send(()).unwrap();
                self.release.lock().unwrap().recv().unwrap();
                Ok(Arc::new(StubGenerator(Arc::new(Counters::default()))))
            }
        }

        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel();
        let cache = Arc::new(ModelCache::new(Arc::new(GatedLoader {
            entered: entered_tx,
            release: Mutex::new(release_rx),
        })));

        let loading = {
            let cache = cache.clone();
            std::thread::spawn(move || {
                cache
                    .get_or_load(&GenerationConfig::default(), Device::Cpu)
                    .map(|_| ())
            })
        };
        entered_rx.recv().unwrap();

        // The loader is parked; a blocking lock here would never return
        let status = cache.status();
        assert!(status.loading);
        assert!(!status.loaded);

        release_tx.send(()).unwrap();
        loading.join().unwrap().unwrap();
        let status = cache.status();
        assert!(!status.loading);
        assert!(status.loaded);
    }
}
