use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, Result};

/// History requests above this limit get clamped; mirrors the service's own
/// per-page ceiling.
const MAX_PAGE_LIMIT: u32 = 100;

/// Typed configuration for the history server, loaded from the environment
/// (with an optional `.env` next to the binary).
#[derive(Clone, Debug)]
pub struct Config {
    // MTProto application credentials.
    pub app_id: i32,
    pub app_hash: String,

    /// Persisted user-session file. Authorizing it is out of scope here;
    /// the server refuses to start on an unauthorized session.
    pub session_file: PathBuf,

    /// Messages requested per history page.
    pub page_limit: u32,

    /// Upper bound for one in-flight history fetch.
    pub fetch_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let app_id = env_str("TG_APP_ID")
            .and_then(|s| s.trim().parse::<i32>().ok())
            .ok_or_else(|| {
                Error::Config("TG_APP_ID environment variable is required (numeric)".to_string())
            })?;

        let app_hash = env_str("TG_APP_HASH").and_then(non_empty).ok_or_else(|| {
            Error::Config("TG_APP_HASH environment variable is required".to_string())
        })?;

        let session_file = env_path("TG_SESSION_FILE")
            .unwrap_or_else(|| PathBuf::from("/tmp/tgmcp-session"));

        let page_limit = env_u32("HISTORY_PAGE_LIMIT")
            .unwrap_or(50)
            .min(MAX_PAGE_LIMIT);

        let fetch_timeout =
            Duration::from_millis(env_u64("FETCH_TIMEOUT_MS").unwrap_or(30_000));

        Ok(Self {
            app_id,
            app_hash,
            session_file,
            page_limit,
            fetch_timeout,
        })
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).map(PathBuf::from)
}

fn env_u32(key: &str) -> Option<u32> {
    env_str(key).and_then(|s| s.trim().parse::<u32>().ok())
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn non_empty(s: String) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_rejects_whitespace() {
        assert_eq!(non_empty("  ".to_string()), None);
        assert_eq!(non_empty(" x ".to_string()), Some("x".to_string()));
    }

    fn clear_config_env() {
        for key in [
            "TG_APP_ID",
            "TG_APP_HASH",
            "TG_SESSION_FILE",
            "HISTORY_PAGE_LIMIT",
            "FETCH_TIMEOUT_MS",
        ] {
            env::remove_var(key);
        }
    }

    // Config::load reads fixed keys, so every scenario lives in one test to
    // keep the env mutations sequential.
    #[test]
    fn load_requires_credentials_then_defaults_then_clamps() {
        clear_config_env();

        let err = Config::load().unwrap_err();
        assert!(matches!(err, Error::Config(_)), "{err}");

        env::set_var("TG_APP_ID", "not-a-number");
        let err = Config::load().unwrap_err();
        assert!(matches!(err, Error::Config(_)), "{err}");

        env::set_var("TG_APP_ID", "12345");
        let err = Config::load().unwrap_err();
        assert!(matches!(err, Error::Config(_)), "{err}");

        env::set_var("TG_APP_HASH", "0123456789abcdef");
        let cfg = Config::load().unwrap();
        assert_eq!(cfg.app_id, 12345);
        assert_eq!(cfg.app_hash, "0123456789abcdef");
        assert_eq!(cfg.session_file, PathBuf::from("/tmp/tgmcp-session"));
        assert_eq!(cfg.page_limit, 50);
        assert_eq!(cfg.fetch_timeout, Duration::from_millis(30_000));

        env::set_var("TG_SESSION_FILE", "/tmp/tgmcp-test-session");
        env::set_var("HISTORY_PAGE_LIMIT", "25");
        env::set_var("FETCH_TIMEOUT_MS", "1500");
        let cfg = Config::load().unwrap();
        assert_eq!(cfg.session_file, PathBuf::from("/tmp/tgmcp-test-session"));
        assert_eq!(cfg.page_limit, 25);
        assert_eq!(cfg.fetch_timeout, Duration::from_millis(1_500));

        env::set_var("HISTORY_PAGE_LIMIT", "500");
        let cfg = Config::load().unwrap();
        assert_eq!(cfg.page_limit, MAX_PAGE_LIMIT);

        clear_config_env();
    }

    #[test]
    fn dotenv_parser_keeps_existing_env_and_strips_quotes() {
        let path = PathBuf::from(format!(
            "/tmp/tgmcp-dotenv-test-{}-{}.env",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        fs::write(
            &path,
            "# comment\nTGMCP_TEST_QUOTED=\"hello\"\nTGMCP_TEST_EXISTING=from-file\n",
        )
        .unwrap();

        env::set_var("TGMCP_TEST_EXISTING", "from-env");
        load_dotenv_if_present(&path);

        assert_eq!(env::var("TGMCP_TEST_QUOTED").unwrap(), "hello");
        assert_eq!(env::var("TGMCP_TEST_EXISTING").unwrap(), "from-env");

        env::remove_var("TGMCP_TEST_QUOTED");
        env::remove_var("TGMCP_TEST_EXISTING");
        let _ = fs::remove_file(&path);
    }
}
