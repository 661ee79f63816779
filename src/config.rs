//! Configuration
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

use crate::db::CollectionNames;
use crate::engine::{EngineConfig, DEFAULT_RECENT_EVENTS_LIMIT};

/// Silsilah - genealogy graph service
#[derive(Parser, Debug, Clone)]
#[command(name = "silsilah")]
#[command(about = "People, family relationships and life events over MongoDB")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:5000")]
    pub listen: SocketAddr,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "AkarBudaya")]
    pub mongodb_db: String,

    #[arg(long, env = "PEOPLE_COLLECTION", default_value = "people")]
    pub people_collection: String,

    #[arg(long, env = "RELATIONSHIPS_COLLECTION", default_value = "relationships")]
    pub relationships_collection: String,

    #[arg(long, env = "EVENTS_COLLECTION", default_value = "events")]
    pub events_collection: String,

    /// Enable development mode (in-memory store when MongoDB is unreachable)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Number of events sampled into statistics
    #[arg(long, env = "RECENT_EVENTS_LIMIT", default_value_t = DEFAULT_RECENT_EVENTS_LIMIT)]
    pub recent_events_limit: usize,

    /// Seconds between orphan relationship sweeps (0 disables)
    #[arg(long, env = "ORPHAN_SWEEP_INTERVAL_SECS", default_value = "0")]
    pub orphan_sweep_interval_secs: u64,
}

impl Args {
    pub fn collection_names(&self) -> CollectionNames {
        CollectionNames {
            people: self.people_collection.clone(),
            relationships: self.relationships_collection.clone(),
            events: self.events_collection.clone(),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            recent_events_limit: self.recent_events_limit,
        }
    }

    /// Sweep interval, `None` when disabled
    pub fn orphan_sweep_interval(&self) -> Option<Duration> {
        (self.orphan_sweep_interval_secs > 0)
            .then(|| Duration::from_secs(self.orphan_sweep_interval_secs))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.recent_events_limit == 0 {
            return Err("RECENT_EVENTS_LIMIT must be at least 1".to_string());
        }

        let names = self.collection_names();
        for (flag, name) in [
            ("PEOPLE_COLLECTION", &names.people),
            ("RELATIONSHIPS_COLLECTION", &names.relationships),
            ("EVENTS_COLLECTION", &names.events),
        ] {
            if name.trim().is_empty() {
                return Err(format!("{} must not be empty", flag));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["silsilah"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.recent_events_limit, 5);
        assert_eq!(args.collection_names(), CollectionNames::default());
        assert!(args.orphan_sweep_interval().is_none());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_sweep_interval() {
        let args = parse(&["--orphan-sweep-interval-secs", "600"]);
        assert_eq!(args.orphan_sweep_interval(), Some(Duration::from_secs(600)));
    }

    #[test]
    fn test_validate_rejects_zero_sample() {
        let args = parse(&["--recent-events-limit", "0"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_collection() {
        let args = parse(&["--events-collection", " "]);
        assert!(args.validate().is_err());
    }
}
