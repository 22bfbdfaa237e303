use crate::config::Config;

/// Rendering for the terminal using the styles from [Config]
pub trait DisplayTerminal {
    fn fmt_to_string(&self, config: &Config) -> String;
}
