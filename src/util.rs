use std::{env::VarError, path::Path};

use anyhow::{Result, Context, bail};

/// Get an env var as a String; decoding failures are reported as
/// errors.
pub fn getenv(name: &str) -> Result<Option<String>> {
    match std::env::var(name) {
        Ok(s) => Ok(Some(s)),
        Err(e) => match e {
            VarError::NotPresent => Ok(None),
            VarError::NotUnicode(_) => bail!("{name:?} env var is not unicode"),
        }
    }
}

/// Parse a flag value as given in env vars: "1", "true", "yes", "on"
/// vs. "0", "false", "no", "off" or the empty string.
pub fn parse_bool(name: &str, s: &str) -> Result<bool> {
    match &*s.trim().to_ascii_lowercase() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("{name:?}: invalid boolean value {s:?}")
    }
}

pub fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading file {path:?}"))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_parse_bool() {
        assert!(parse_bool("X", "1").unwrap());
        assert!(parse_bool("X", " True ").unwrap());
        assert!(!parse_bool("X", "").unwrap());
        assert!(!parse_bool("X", "off").unwrap());
        assert_eq!(parse_bool("X", "maybe").unwrap_err().to_string(),
                   "\"X\": invalid boolean value \"maybe\"");
    }

    #[test]
    fn t_getenv() {
        assert_eq!(getenv("JX_TEST_SURELY_UNSET_VAR").unwrap(), None);
    }
}
