//! Current-user resolution for CLI commands.
//!
//! The resolution chain: `--user` flag > `VISITAS_USER` env > user config
//! `email` > project config `[identity] email`.

use std::env;

/// Environment reader trait for dependency injection in tests.
trait EnvReader {
    fn get(&self, key: &str) -> Option<String>;
}

struct RealEnv;

impl EnvReader for RealEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

/// Configured fallbacks consulted after the flag and env.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentitySources<'a> {
    pub user_config: Option<&'a str>,
    pub project_config: Option<&'a str>,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn resolve_email_with(
    cli_flag: Option<&str>,
    sources: IdentitySources<'_>,
    env: &dyn EnvReader,
) -> Option<String> {
    non_blank(cli_flag)
        .or_else(|| non_blank(env.get("VISITAS_USER").as_deref()))
        .or_else(|| non_blank(sources.user_config))
        .or_else(|| non_blank(sources.project_config))
}

/// Resolve the acting user's email. `None` when no source names one.
pub fn resolve_email(cli_flag: Option<&str>, sources: IdentitySources<'_>) -> Option<String> {
    resolve_email_with(cli_flag, sources, &RealEnv)
}
