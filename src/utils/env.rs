use crate::error::{AgentError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Parse `KEY=VALUE` pairs given on the command line.
pub fn parse_env_args(env_args: &[String]) -> Result<BTreeMap<String, String>> {
    let mut env_vars = BTreeMap::new();

    for arg in env_args {
        match arg.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                env_vars.insert(key.to_string(), value.to_string());
            }
            _ => {
                return Err(AgentError::InvalidConfig(format!(
                    "Invalid env format: {}. Expected KEY=VALUE",
                    arg
                )));
            }
        }
    }

    Ok(env_vars)
}

/// Load a dotenv-style file: `KEY=VALUE` lines, `#` comments, optional
/// `export ` prefix and surrounding quotes on the value.
pub fn load_env_file(path: &Path) -> Result<BTreeMap<String, String>> {
    let content = fs::read_to_string(path).map_err(|e| {
        AgentError::InvalidConfig(format!("Failed to read env file {}: {}", path.display(), e))
    })?;

    let mut env_vars = BTreeMap::new();
    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);

        match line.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                env_vars.insert(key.trim().to_string(), unquote(value.trim()).to_string());
            }
            _ => {
                return Err(AgentError::InvalidConfig(format!(
                    "Invalid env format at {}:{}: {}",
                    path.display(),
                    line_num + 1,
                    line
                )));
            }
        }
    }

    Ok(env_vars)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// True when `var` is present in the process environment and non-empty.
pub fn is_set(var: &str) -> bool {
    std::env::var_os(var).is_some_and(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_env_args() {
        let args = vec!["KEY1=value1".to_string(), "KEY2=a=b".to_string()];
        let vars = parse_env_args(&args).unwrap();
        assert_eq!(vars.get("KEY1"), Some(&"value1".to_string()));
        assert_eq!(vars.get("KEY2"), Some(&"a=b".to_string()));
    }

    #[test]
    fn test_parse_env_args_invalid() {
        assert!(parse_env_args(&["INVALID".to_string()]).is_err());
        assert!(parse_env_args(&["=value".to_string()]).is_err());
    }

    #[test]
    fn test_load_env_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "PLAIN=value").unwrap();
        writeln!(file, "export EXPORTED = spaced ").unwrap();
        writeln!(file, "QUOTED=\"with spaces\"").unwrap();
        writeln!(file, "SINGLE='x'").unwrap();

        let vars = load_env_file(file.path()).unwrap();
        assert_eq!(vars.len(), 4);
        assert_eq!(vars["PLAIN"], "value");
        assert_eq!(vars["EXPORTED"], "spaced");
        assert_eq!(vars["QUOTED"], "with spaces");
        assert_eq!(vars["SINGLE"], "x");
    }

    #[test]
    fn test_load_env_file_reports_line() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "OK=1").unwrap();
        writeln!(file, "broken").unwrap();

        let err = load_env_file(file.path()).unwrap_err().to_string();
        assert!(err.contains(":2:"), "unexpected error: {}", err);
    }

    #[test]
    fn test_load_env_file_missing() {
        assert!(load_env_file(Path::new("/nonexistent/cliagent.env")).is_err());
    }

    #[test]
    #[serial_test::serial]
    fn test_is_set() {
        std::env::set_var("CLIAGENT_TEST_IS_SET", "1");
        assert!(is_set("CLIAGENT_TEST_IS_SET"));

        std::env::set_var("CLIAGENT_TEST_IS_SET", "");
        assert!(!is_set("CLIAGENT_TEST_IS_SET"));

        std::env::remove_var("CLIAGENT_TEST_IS_SET");
        assert!(!is_set("CLIAGENT_TEST_IS_SET"));
    }
}
