//! Registry tier: icon discovery from Windows uninstall entries.
//!
//! Steam registers every installed game under
//! `...\Windows\CurrentVersion\Uninstall\Steam App <id>`. The icon
//! value, when present, is a path that may embed `%VAR%` environment
//! references and a trailing `,N` resource-index suffix.

#[cfg(target_os = "windows")]
#[path = "registry_windows.rs"]
mod platform;

#[cfg(not(target_os = "windows"))]
#[path = "registry_other.rs"]
mod platform;

pub(crate) use platform::icon_from_registry;

/// Normalizes a raw registry icon value into a probe-able path:
/// expands `%VAR%` references, strips a trailing `,N` resource index,
/// and drops surrounding quotes.
pub(crate) fn normalize_icon_value(raw: &str) -> String {
    let expanded = expand_env_vars(raw.trim());
    let stripped = strip_icon_index(&expanded);
    stripped.trim_matches('"').to_string()
}

/// Strips a trailing `,N` (or `,-N`) resource-index suffix.
fn strip_icon_index(raw: &str) -> &str {
    match raw.rsplit_once(',') {
        Some((path, index)) if is_resource_index(index.trim()) => path,
        _ => raw,
    }
}

fn is_resource_index(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Replaces `%NAME%` references with the named environment variable.
/// Unknown names are left verbatim.
fn expand_env_vars(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('%') {
            Some(end) => {
                let name = &after[..end];
                match std::env::var(name) {
                    Ok(value) => out.push_str(&value),
                    Err(_) => {
                        out.push('%');
                        out.push_str(name);
                        out.push('%');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push('%');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
