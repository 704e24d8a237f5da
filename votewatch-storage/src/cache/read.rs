//! Cache read results carrying their provenance.

/// A value obtained through a cache, remembering whether it was served from
/// the cache or produced by the underlying source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRead<T> {
    value: T,
    was_cache_hit: bool,
}

impl<T> CacheRead<T> {
    /// A value served from the cache.
    pub fn from_cache(value: T) -> Self {
        Self {
            value,
            was_cache_hit: true,
        }
    }

    /// A value fetched or computed because the cache had nothing live.
    pub fn from_source(value: T) -> Self {
        Self {
            value,
            was_cache_hit: false,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn was_cache_hit(&self) -> bool {
        self.was_cache_hit
    }

    pub fn was_cache_miss(&self) -> bool {
        !self.was_cache_hit
    }

    /// Map the inner value, keeping the provenance.
    pub fn map<U, F>(self, f: F) -> CacheRead<U>
    where
        F: FnOnce(T) -> U,
    {
        CacheRead {
            value: f(self.value),
            was_cache_hit: self.was_cache_hit,
        }
    }
}

impl<T> AsRef<T> for CacheRead<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}
