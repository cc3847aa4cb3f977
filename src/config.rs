//! Simulation settings parsed from environment variables.
//!
//! DESIGN
//! ======
//! Every knob has a default, so an empty environment gives the stock
//! behavior. Unparseable values fall back to the default rather than
//! failing startup.

use std::time::Duration;

pub const DEFAULT_SEND_LATENCY_MS: u64 = 500;
pub const DEFAULT_REPLY_PROBABILITY: f64 = 0.7;
pub const DEFAULT_REPLY_MIN_DELAY_MS: u64 = 1000;
pub const DEFAULT_REPLY_MAX_DELAY_MS: u64 = 3000;
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChatConfig {
    /// Delay between `send` and the message landing in the feed.
    pub send_latency: Duration,
    /// Chance in [0, 1] that a delivered message draws an auto-reply.
    pub reply_probability: f64,
    /// Auto-reply delay is uniform in `[reply_min_delay, reply_max_delay)`.
    pub reply_min_delay: Duration,
    pub reply_max_delay: Duration,
    pub search_debounce: Duration,
    pub search_limit: usize,
    /// Fixed RNG seed; `None` seeds from OS entropy.
    pub rng_seed: Option<u64>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            send_latency: Duration::from_millis(DEFAULT_SEND_LATENCY_MS),
            reply_probability: DEFAULT_REPLY_PROBABILITY,
            reply_min_delay: Duration::from_millis(DEFAULT_REPLY_MIN_DELAY_MS),
            reply_max_delay: Duration::from_millis(DEFAULT_REPLY_MAX_DELAY_MS),
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            search_limit: DEFAULT_SEARCH_LIMIT,
            rng_seed: None,
        }
    }
}

impl ChatConfig {
    /// Build config from the process environment.
    ///
    /// - `CHAT_SEND_LATENCY_MS`: default 500
    /// - `CHAT_REPLY_PROBABILITY`: default 0.7, clamped to [0, 1]
    /// - `CHAT_REPLY_MIN_DELAY_MS` / `CHAT_REPLY_MAX_DELAY_MS`: default 1000 / 3000
    /// - `CHAT_SEARCH_DEBOUNCE_MS`: default 300
    /// - `CHAT_SEARCH_LIMIT`: default 20
    /// - `CHAT_RNG_SEED`: unset for a random seed
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` over an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse_ms = |key: &str, default: u64| Duration::from_millis(env_parse(&lookup, key, default));

        let reply_min_delay = parse_ms("CHAT_REPLY_MIN_DELAY_MS", DEFAULT_REPLY_MIN_DELAY_MS);
        let mut reply_max_delay = parse_ms("CHAT_REPLY_MAX_DELAY_MS", DEFAULT_REPLY_MAX_DELAY_MS);
        if reply_max_delay <= reply_min_delay {
            reply_max_delay = reply_min_delay + Duration::from_millis(1);
        }

        let reply_probability = env_parse(&lookup, "CHAT_REPLY_PROBABILITY", DEFAULT_REPLY_PROBABILITY);
        let reply_probability =
            if reply_probability.is_finite() { reply_probability.clamp(0.0, 1.0) } else { DEFAULT_REPLY_PROBABILITY };

        Self {
            send_latency: parse_ms("CHAT_SEND_LATENCY_MS", DEFAULT_SEND_LATENCY_MS),
            reply_probability,
            reply_min_delay,
            reply_max_delay,
            search_debounce: parse_ms("CHAT_SEARCH_DEBOUNCE_MS", DEFAULT_SEARCH_DEBOUNCE_MS),
            search_limit: env_parse(&lookup, "CHAT_SEARCH_LIMIT", DEFAULT_SEARCH_LIMIT),
            rng_seed: lookup("CHAT_RNG_SEED").and_then(|v| v.trim().parse().ok()),
        }
    }
}

fn env_parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
