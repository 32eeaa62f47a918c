/// Quote a string so a POSIX shell reads it back as one literal word.
///
/// The whole value goes inside single quotes; an embedded `'` closes the
/// quote, adds an escaped quote and reopens: `it's` -> `'it'\''s'`.
/// Nothing is interpreted inside single quotes, so `$`, backticks, `"`,
/// globs and newlines all pass through untouched.
///
/// # Examples
///
/// ```
/// use cliagent::utils::shell::escape;
///
/// assert_eq!(escape("fix the bug"), "'fix the bug'");
/// assert_eq!(escape("it's"), "'it'\\''s'");
/// assert_eq!(escape(""), "''");
/// ```
pub fn escape(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('\'');
    for c in s.chars() {
        if c == '\'' {
            quoted.push_str(r"'\''");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('\'');
    quoted
}

/// Quote every argument and join them with spaces.
///
/// ```
/// use cliagent::utils::shell::join_args;
///
/// assert_eq!(join_args(&["tool", "--task", "a b"]), "'tool' '--task' 'a b'");
/// ```
pub fn join_args(args: &[impl AsRef<str>]) -> String {
    args.iter()
        .map(|arg| escape(arg.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Script piping the quoted `argv` into `filter`.
///
/// `filter` is user configuration and is inserted verbatim, so it may use
/// its own shell syntax. Only `argv` is quoted.
pub fn pipeline(argv: &[impl AsRef<str>], filter: &str) -> String {
    format!("{} | {}", join_args(argv), filter)
}
