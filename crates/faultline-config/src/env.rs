use std::sync::OnceLock;

use regex::Regex;

use crate::ConfigError;

/// Expand `${VAR}` placeholders in a raw TOML string
///
/// `${VAR:-fallback}` uses the fallback when the variable is unset or empty.
/// Lines starting with `#` (TOML comments) are passed through unchanged.
pub fn expand_env(input: &str) -> Result<String, ConfigError> {
    fn re() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        // Group 1: variable name, group 2: optional fallback after `:-`
        RE.get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").expect("must be valid regex"))
    }

    let mut output = String::with_capacity(input.len());

    for (i, line) in input.lines().enumerate() {
        if i > 0 {
            output.push('\n');
        }

        if line.trim_start().starts_with('#') {
            output.push_str(line);
            continue;
        }

        let mut last_end = 0;

        for captures in re().captures_iter(line) {
            let (Some(overall), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            let fallback = captures.get(2).map(|m| m.as_str());

            output.push_str(&line[last_end..overall.start()]);

            match (std::env::var(name.as_str()), fallback) {
                (Ok(value), Some(fallback)) if value.is_empty() => output.push_str(fallback),
                (Ok(value), _) => output.push_str(&value),
                (Err(_), Some(fallback)) => output.push_str(fallback),
                (Err(_), None) => return Err(ConfigError::MissingVariable(name.as_str().to_owned())),
            }

            last_end = overall.end();
        }

        let rest = &line[last_end..];
        if rest.contains("${") {
            return Err(ConfigError::UnterminatedPlaceholder { line: i + 1 });
        }
        output.push_str(rest);
    }

    if input.ends_with('\n') {
        output.push('\n');
    }

    Ok(output)
}
