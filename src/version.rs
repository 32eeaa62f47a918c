use semver::Version;

// Compile-time constants from Cargo.toml and build.rs
pub const VERSION: &str = env!("CLIAGENT_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");

/// Reported when a tool's version cannot be determined.
pub const UNKNOWN: &str = "unknown";

/// Pull a version out of a tool's `--version` output.
///
/// Returns the first token that parses as semver (a leading `v` and
/// surrounding punctuation are ignored), else the first non-empty line,
/// else `None`.
pub fn extract_tool_version(output: &str) -> Option<String> {
    let semver_token = output.split_whitespace().find_map(|token| {
        let token = token.trim_matches(|c: char| !c.is_ascii_alphanumeric());
        let token = token.strip_prefix('v').unwrap_or(token);
        Version::parse(token).ok().map(|_| token.to_string())
    });

    semver_token.or_else(|| {
        output
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
    })
}
