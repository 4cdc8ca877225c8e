use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchAction {
    Search(String),
    /// The query went blank; drop results without calling the API.
    Clear,
}

/// Holds the latest query until input has been quiet for the debounce delay.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    query: String,
    deadline: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            query: String::new(),
            deadline: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Replaces the query and restarts the quiet period.
    pub fn input(&mut self, query: impl Into<String>, now: Instant) {
        self.query = query.into();
        self.deadline = Some(now + self.delay);
    }

    /// Returns the action once the deadline has passed, at most once per input.
    pub fn poll_due(&mut self, now: Instant) -> Option<SearchAction> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;
        let trimmed = self.query.trim();
        if trimmed.is_empty() {
            Some(SearchAction::Clear)
        } else {
            Some(SearchAction::Search(trimmed.to_string()))
        }
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_last_input_fires_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();

        debouncer.input("pe", start);
        debouncer.input("pepe", start + Duration::from_millis(200));

        assert_eq!(debouncer.poll_due(start + Duration::from_millis(400)), None);
        assert_eq!(
            debouncer.poll_due(start + Duration::from_millis(500)),
            Some(SearchAction::Search("pepe".to_string()))
        );
        assert_eq!(debouncer.poll_due(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn test_blank_query_clears() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        debouncer.input("   ", start);
        assert_eq!(
            debouncer.poll_due(start + Duration::from_millis(10)),
            Some(SearchAction::Clear)
        );
    }

    #[test]
    fn test_clear_cancels_pending() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.input("bonk", start);
        debouncer.clear();
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll_due(start + Duration::from_secs(1)), None);
    }
}
