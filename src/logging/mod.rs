//! Logging helpers
//!
//! Turns the `[logging]` config section into `tracing-subscriber` filter
//! directives. Subscriber installation lives in `cli::serve`.

/// Crate prefix used for per-component directives.
const CRATE_TARGET: &str = "spendguard";

/// Build filter directives string from LoggingConfig
///
/// Component levels are emitted in name order so the result is stable.
///
/// # Examples
///
/// ```
/// use spendguard::config::logging::{LogFormat, LoggingConfig};
/// use spendguard::logging::build_filter_directives;
/// use std::collections::HashMap;
///
/// let mut component_levels = HashMap::new();
/// component_levels.insert("scheduler".to_string(), "debug".to_string());
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Pretty,
///     component_levels: Some(component_levels),
/// };
///
/// assert_eq!(build_filter_directives(&config), "info,spendguard::scheduler=debug");
/// ```
pub fn build_filter_directives(config: &crate::config::LoggingConfig) -> String {
    let mut filter_str = config.level.clone();

    if let Some(component_levels) = &config.component_levels {
        let mut components: Vec<_> = component_levels.iter().collect();
        components.sort();
        for (component, level) in components {
            filter_str.push_str(&format!(",{}::{}={}", CRATE_TARGET, component, level));
        }
    }

    filter_str
}
