use serde::Serialize;

/// Remaining characters below which the counter warns
pub const NEAR_LIMIT: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterLevel {
    Normal,
    Warning,
    Over,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CounterState {
    pub count: usize,
    pub remaining: i64,
    pub level: CounterLevel,
}

/// Live character counter for a length-limited text field
#[derive(Debug, Clone, Copy)]
pub struct CharacterCounter {
    max_length: usize,
}

impl CharacterCounter {
    #[must_use]
    pub const fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    #[must_use]
    pub const fn max_length(&self) -> usize {
        self.max_length
    }

    /// Count characters (not bytes) in `text` against the limit
    #[must_use]
    pub fn update(&self, text: &str) -> CounterState {
        let count = text.chars().count();
        let remaining = to_i64(self.max_length) - to_i64(count);
        let level = if remaining < 0 {
            CounterLevel::Over
        } else if remaining < NEAR_LIMIT {
            CounterLevel::Warning
        } else {
            CounterLevel::Normal
        };
        CounterState {
            count,
            remaining,
            level,
        }
    }
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_at_boundaries() {
        let counter = CharacterCounter::new(100);

        let state = counter.update(&"a".repeat(50));
        assert_eq!(state.remaining, 50);
        assert_eq!(state.level, CounterLevel::Normal);

        let state = counter.update(&"a".repeat(51));
        assert_eq!(state.remaining, 49);
        assert_eq!(state.level, CounterLevel::Warning);

        let state = counter.update(&"a".repeat(100));
        assert_eq!(state.remaining, 0);
        assert_eq!(state.level, CounterLevel::Warning);

        let state = counter.update(&"a".repeat(101));
        assert_eq!(state.remaining, -1);
        assert_eq!(state.level, CounterLevel::Over);
    }

    #[test]
    fn test_fifty_character_limit() {
        let counter = CharacterCounter::new(50);

        let state = counter.update("");
        assert_eq!(state.remaining, 50);
        assert_eq!(state.level, CounterLevel::Normal);

        let state = counter.update("a");
        assert_eq!(state.remaining, 49);
        assert_eq!(state.level, CounterLevel::Warning);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let counter = CharacterCounter::new(500);
        let state = counter.update("café ☕");
        assert_eq!(state.count, 6);
        assert_eq!(state.remaining, 494);
    }

    #[test]
    fn test_empty_text() {
        let state = CharacterCounter::new(10).update("");
        assert_eq!(state.count, 0);
        assert_eq!(state.level, CounterLevel::Warning);
    }
}
