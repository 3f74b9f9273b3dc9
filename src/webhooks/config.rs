use std::time::Duration;

pub const DEFAULT_RECORD_TTL_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_INDEX_CAP: usize = 1000;

#[derive(Debug, Clone)]
pub struct RetentionConfig {
    /// How long a stored record stays readable, independent of the index.
    pub record_ttl: Duration,
    /// Maximum number of identifiers kept in the recency index.
    pub index_cap: usize,
}

impl RetentionConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = lookup("WEBHOOK_TTL_SECS")
            && let Ok(parsed) = value.trim().parse::<u64>()
        {
            config.record_ttl = Duration::from_secs(parsed.max(1));
        }
        if let Some(value) = lookup("WEBHOOK_INDEX_CAP")
            && let Ok(parsed) = value.trim().parse::<usize>()
        {
            config.index_cap = parsed.max(1);
        }

        config
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            record_ttl: Duration::from_secs(DEFAULT_RECORD_TTL_SECS),
            index_cap: DEFAULT_INDEX_CAP,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_vars(vars: &[(&str, &str)]) -> RetentionConfig {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        RetentionConfig::from_lookup(|key| map.get(key).map(|v| (*v).to_string()))
    }

    #[test]
    fn defaults_keep_a_day_and_a_thousand_entries() {
        let config = from_vars(&[]);
        assert_eq!(config.record_ttl, Duration::from_secs(86_400));
        assert_eq!(config.index_cap, 1000);
    }

    #[test]
    fn overrides_are_floored_at_one() {
        let config = from_vars(&[("WEBHOOK_TTL_SECS", "0"), ("WEBHOOK_INDEX_CAP", "0")]);
        assert_eq!(config.record_ttl, Duration::from_secs(1));
        assert_eq!(config.index_cap, 1);

        let config = from_vars(&[("WEBHOOK_TTL_SECS", "3600"), ("WEBHOOK_INDEX_CAP", "50")]);
        assert_eq!(config.record_ttl, Duration::from_secs(3600));
        assert_eq!(config.index_cap, 50);
    }

    #[test]
    fn garbage_values_are_ignored() {
        let config = from_vars(&[("WEBHOOK_TTL_SECS", "soon"), ("WEBHOOK_INDEX_CAP", "-3")]);
        assert_eq!(config.record_ttl, Duration::from_secs(DEFAULT_RECORD_TTL_SECS));
        assert_eq!(config.index_cap, DEFAULT_INDEX_CAP);
    }
}
