use once_cell::sync::Lazy;
use regex::Regex;

/// Splits an identifier into its alphabetic prefix and trailing digit run.
static TRAILING_DIGITS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*?)(\d+)$").unwrap() // the pattern is a constant
});

/// Generates the next identifier in a `PREFIX###` series.
///
/// Existing identifiers are split into prefix and trailing number; the
/// result reuses the prefix of the highest-numbered one and increments
/// its number. Values without a trailing digit run do not participate.
/// On an empty series the fallback prefix starts it at 001.
///
/// Numbers are padded to three digits but never truncated, so the series
/// keeps sorting correctly past 999.
pub(crate) fn next_identifier<'a>(
    existing: impl Iterator<Item = &'a str>,
    fallback_prefix: &str,
) -> String {
    let mut best: Option<(u64, &str)> = None;

    for id in existing {
        if let Some(captures) = TRAILING_DIGITS.captures(id.trim()) {
            let number = match captures[2].parse::<u64>() {
                // A digit run at or beyond u64::MAX is not part of a
                // series we can continue.
                Ok(n) if n == u64::MAX => continue,
                Ok(n) => n,
                Err(_) => continue,
            };
            if best.map_or(true, |(max, _)| number > max) {
                let prefix = captures.get(1).map_or("", |m| m.as_str());
                best = Some((number, prefix));
            }
        }
    }

    match best {
        Some((max, prefix)) => format!("{prefix}{:03}", max + 1),
        None => format!("{fallback_prefix}001"),
    }
}

/// Fallback prefix for a table with no declared hint: the key column's
/// leading alphabetic characters, uppercased.
pub(crate) fn derive_prefix(column: &str) -> String {
    column
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_uppercase()
}
