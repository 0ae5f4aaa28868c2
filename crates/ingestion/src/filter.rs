//! Allow-list event filter
//!
//! Stateless predicate: an event is eligible iff its type name is in the
//! configured set. The set is derived once at setup; an empty allow-list is
//! a setup-time configuration error, never a per-event one.

use std::collections::HashSet;

use contracts::{Event, FilterConfig, RelayError};

/// Event type allow-list
#[derive(Debug, Clone)]
pub struct EventFilter {
    allowed: HashSet<String>,
}

impl EventFilter {
    /// Build a filter from a comma-separated allow-list
    ///
    /// Entries are trimmed and de-duplicated.
    ///
    /// # Errors
    /// `RelayError::ConfigValidation` when no type names remain.
    pub fn from_list(list: &str) -> Result<Self, RelayError> {
        let config = FilterConfig {
            events_to_include: list.to_string(),
        };
        Self::from_config(&config)
    }

    /// Build a filter from the parsed configuration section
    pub fn from_config(config: &FilterConfig) -> Result<Self, RelayError> {
        let allowed: HashSet<String> = config.event_types().into_iter().collect();

        if allowed.is_empty() {
            return Err(RelayError::config_validation(
                "filter.events_to_include",
                "no events to include",
            ));
        }

        Ok(Self { allowed })
    }

    /// Whether the event's type is on the allow-list
    pub fn is_eligible(&self, event: &Event) -> bool {
        self.allowed.contains(&event.event)
    }

    /// Number of allowed type names
    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    /// Whether the allow-list is empty (cannot happen post-construction)
    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership() {
        let filter = EventFilter::from_list("purchase,signup").unwrap();

        assert!(filter.is_eligible(&Event::new("purchase")));
        assert!(filter.is_eligible(&Event::new("signup")));
        assert!(!filter.is_eligible(&Event::new("view")));
        assert_eq!(filter.len(), 2);
    }

    #[test]
    fn test_trims_and_dedups() {
        let filter = EventFilter::from_list(" purchase , purchase ,view").unwrap();
        assert_eq!(filter.len(), 2);
        assert!(filter.is_eligible(&Event::new("view")));
    }

    #[test]
    fn test_empty_list_is_config_error() {
        let result = EventFilter::from_list("");
        assert!(matches!(
            result,
            Err(RelayError::ConfigValidation { .. })
        ));

        let result = EventFilter::from_list(" , ,");
        assert!(result.is_err());
    }

    #[test]
    fn test_exact_match_only() {
        let filter = EventFilter::from_list("purchase").unwrap();
        assert!(!filter.is_eligible(&Event::new("Purchase")));
        assert!(!filter.is_eligible(&Event::new("purchase ")));
    }
}
