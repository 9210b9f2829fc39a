//! File name pattern resolution.
//!
//! A layer's `fileName` may carry three tokens, all matched without regard to
//! ASCII case:
//!
//! - `<ID>` is replaced with the settings id (or removed when there is none).
//! - `.<EXT>` picks the first supported extension, in [`SUPPORTED_EXTENSIONS`]
//!   order, for which a matching file exists.
//! - `<VER>` picks the greatest version string among matching files. Versions
//!   compare as plain strings, so `"2"` beats `"10"`.
//!
//! Each token is handled by a pure pass over a [`ResolveContext`]; [`resolve`]
//! runs them in that order. File names are compared ASCII case-insensitively and
//! the resolved name is spelled the way it is on disk.

use std::path::Path;

use crate::foundation::error::{MergeError, MergeResult};

/// Raster formats a layer may use, in `.<EXT>` priority order.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["bmp", "png", "gif", "jpg", "jpeg"];

const ID_TOKEN: &str = "<id>";
const EXT_TOKEN: &str = ".<ext>";
const VER_TOKEN: &str = "<ver>";

/// Everything a resolution pass may look at.
#[derive(Clone, Copy, Debug)]
pub struct ResolveContext<'a> {
    pub id: Option<&'a str>,
    /// File names present in the working directory.
    pub listing: &'a [String],
    /// Extension priority for `.<EXT>`.
    pub formats: &'a [&'a str],
}

impl<'a> ResolveContext<'a> {
    pub fn new(id: Option<&'a str>, listing: &'a [String]) -> Self {
        Self {
            id,
            listing,
            formats: &SUPPORTED_EXTENSIONS,
        }
    }
}

/// Names of the regular files in `dir`, sorted. Entries that are not valid
/// UTF-8 are skipped.
pub fn read_listing(dir: &Path) -> MergeResult<Vec<String>> {
    let entries = std::fs::read_dir(dir).map_err(|e| MergeError::io(dir, e))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| MergeError::io(dir, e))?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if !is_file {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Resolve `pattern` to a concrete file name, or `None` when no file fits.
pub fn resolve(pattern: &str, ctx: &ResolveContext<'_>) -> Option<String> {
    let with_id = substitute_id(pattern, ctx.id);
    let with_ext = resolve_extension(&with_id, ctx)?;
    resolve_version(&with_ext, ctx)
}

/// Replace every `<ID>` with `id`, or with nothing.
pub fn substitute_id(pattern: &str, id: Option<&str>) -> String {
    replace_token(pattern, ID_TOKEN, id.unwrap_or(""))
}

/// Settle `.<EXT>`. Patterns without the token pass through unchanged.
///
/// `<VER>` is treated as a wildcard while probing and left in place.
pub fn resolve_extension(pattern: &str, ctx: &ResolveContext<'_>) -> Option<String> {
    if find_token(pattern, EXT_TOKEN).is_none() {
        return Some(pattern.to_string());
    }

    for &ext in ctx.formats {
        let probe = replace_token(pattern, EXT_TOKEN, &format!(".{ext}"));
        let pieces = split_token(&probe, VER_TOKEN);
        let Some(found) = ctx.listing.iter().find(|name| wildcard_match(&pieces, name)) else {
            continue;
        };
        // Keep the extension as spelled on disk.
        let on_disk = if ends_with_ci(pattern.as_bytes(), EXT_TOKEN.as_bytes()) {
            found.get(found.len() - ext.len()..).unwrap_or(ext)
        } else {
            ext
        };
        return Some(replace_token(pattern, EXT_TOKEN, &format!(".{on_disk}")));
    }
    None
}

/// Settle `<VER>`. Patterns without the token pass through unchanged.
///
/// The text before the first token and after the last one must match; the
/// rest of the file name is the version string.
pub fn resolve_version(pattern: &str, ctx: &ResolveContext<'_>) -> Option<String> {
    let Some(first) = find_token(pattern, VER_TOKEN) else {
        return Some(pattern.to_string());
    };
    let last = rfind_token(pattern, VER_TOKEN).unwrap_or(first);
    let prefix = &pattern[..first];
    let suffix = &pattern[last + VER_TOKEN.len()..];

    ctx.listing
        .iter()
        .filter_map(|name| version_of(name, prefix, suffix).map(|v| (v, name)))
        .max()
        .map(|(_, name)| name.clone())
}

fn version_of<'n>(name: &'n str, prefix: &str, suffix: &str) -> Option<&'n str> {
    if name.len() < prefix.len() + suffix.len() {
        return None;
    }
    let end = name.len() - suffix.len();
    let head = name.get(..prefix.len())?;
    let tail = name.get(end..)?;
    if !head.eq_ignore_ascii_case(prefix) || !tail.eq_ignore_ascii_case(suffix) {
        return None;
    }
    name.get(prefix.len()..end)
}

fn find_token(s: &str, token: &str) -> Option<usize> {
    s.to_ascii_lowercase().find(token)
}

fn rfind_token(s: &str, token: &str) -> Option<usize> {
    s.to_ascii_lowercase().rfind(token)
}

fn replace_token(s: &str, token: &str, with: &str) -> String {
    // ASCII lowercasing keeps byte offsets stable.
    let lower = s.to_ascii_lowercase();
    let mut out = String::with_capacity(s.len());
    let mut rest = 0;
    for (at, _) in lower.match_indices(token) {
        out.push_str(&s[rest..at]);
        out.push_str(with);
        rest = at + token.len();
    }
    out.push_str(&s[rest..]);
    out
}

fn split_token<'s>(s: &'s str, token: &str) -> Vec<&'s str> {
    let lower = s.to_ascii_lowercase();
    let mut pieces = Vec::new();
    let mut rest = 0;
    for (at, _) in lower.match_indices(token) {
        pieces.push(&s[rest..at]);
        rest = at + token.len();
    }
    pieces.push(&s[rest..]);
    pieces
}

/// Match `name` against literal `pieces` joined by `*` wildcards.
fn wildcard_match(pieces: &[&str], name: &str) -> bool {
    let name = name.as_bytes();
    let (first, rest) = match pieces.split_first() {
        Some(split) => split,
        None => return name.is_empty(),
    };
    if !starts_with_ci(name, first.as_bytes()) {
        return false;
    }
    let Some((last, middle)) = rest.split_last() else {
        return name.len() == first.len();
    };
    if name.len() < first.len() + last.len() || !ends_with_ci(name, last.as_bytes()) {
        return false;
    }

    let mut cursor = first.len();
    let limit = name.len() - last.len();
    for piece in middle {
        let piece = piece.as_bytes();
        match find_ci(&name[cursor..limit], piece) {
            Some(at) => cursor += at + piece.len(),
            None => return false,
        }
    }
    true
}

fn starts_with_ci(s: &[u8], p: &[u8]) -> bool {
    s.len() >= p.len() && s[..p.len()].eq_ignore_ascii_case(p)
}

fn ends_with_ci(s: &[u8], p: &[u8]) -> bool {
    s.len() >= p.len() && s[s.len() - p.len()..].eq_ignore_ascii_case(p)
}

fn find_ci(hay: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    hay.windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resolve.rs"]
mod tests;
