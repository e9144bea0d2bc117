use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::termco::Color;
use crate::Rank;

/// A cache for color conversions.
///
/// The cache maps a rank and source color to the converted color. It is
/// filled lazily and never evicts entries, which is fine since there are only
/// so many colors in a terminal's output. Lookups take a shared read lock,
/// whereas stores take the exclusive write lock. Concurrent misses for the
/// same key may both compute the result; since conversion is deterministic,
/// they also store the same result.
///
/// Since the map only ever holds complete entries, a poisoned lock does not
/// invalidate the cache, and this struct simply recovers the lock's guard.
#[derive(Debug, Default)]
pub struct ConversionCache {
    entries: RwLock<HashMap<(Rank, Color), Color>>,
}

impl ConversionCache {
    /// Create a new, empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the conversion of the color to the rank.
    pub fn lookup(&self, rank: Rank, color: &Color) -> Option<Color> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(&(rank, *color)).copied()
    }

    /// Store the conversion of the color to the rank.
    ///
    /// Storing the same entry more than once is harmless.
    pub fn store(&self, rank: Rank, color: Color, result: Color) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert((rank, color), result);
    }

    /// Get the number of cached conversions.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Determine whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod test {
    use super::ConversionCache;
    use crate::termco::{AnsiColor, Color, Rgb};
    use crate::Rank;
    use std::sync::Arc;

    #[test]
    fn test_cache() {
        let cache = ConversionCache::new();
        let orange = Color::Rgb(Rgb::new(255, 133, 55));
        assert!(cache.is_empty());
        assert_eq!(cache.lookup(Rank::Extended256, &orange), None);

        cache.store(Rank::Extended256, orange, Color::Indexed(208));
        cache.store(Rank::Extended256, orange, Color::Indexed(208));
        cache.store(Rank::Basic16, orange, Color::Ansi(AnsiColor::BrightRed));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.lookup(Rank::Extended256, &orange), Some(Color::Indexed(208)));
        assert_eq!(
            cache.lookup(Rank::Basic16, &orange),
            Some(Color::Ansi(AnsiColor::BrightRed))
        );
        assert_eq!(cache.lookup(Rank::Basic16, &Color::Indexed(208)), None);
    }

    #[test]
    fn test_poisoned_cache() {
        let cache = Arc::new(ConversionCache::new());
        cache.store(Rank::Basic16, Color::Indexed(196), Color::Ansi(AnsiColor::BrightRed));

        let poisoner = Arc::clone(&cache);
        let result = std::thread::spawn(move || {
            let _guard = poisoner.entries.write();
            panic!("poisoning the cache's lock");
        })
        .join();
        assert!(result.is_err(), "thread should have panicked");
        assert!(cache.entries.is_poisoned());

        assert_eq!(
            cache.lookup(Rank::Basic16, &Color::Indexed(196)),
            Some(Color::Ansi(AnsiColor::BrightRed))
        );
        cache.store(Rank::Basic16, Color::Indexed(16), Color::Ansi(AnsiColor::Black));
        assert_eq!(cache.len(), 2);
    }
}
