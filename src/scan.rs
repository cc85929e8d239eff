//! Directory scanning utilities for discovering image files.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::Error;

/// Lowercase extensions the slideshow will try to show.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "gif", "tiff", "tif"];

/// How file names are ordered before the slideshow starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Finder-style: digit runs compare numerically, text ignores case.
    /// Finder and Explorer agree for plain file names.
    Locale,
    /// Explorer-style: digit runs compare numerically, text ignores case.
    Natural,
    /// Plain case-insensitive lexical order.
    CaseInsensitive,
}

impl SortOrder {
    /// The ordering a file manager on the current platform would show.
    pub fn platform_default() -> Self {
        if cfg!(target_os = "macos") {
            Self::Locale
        } else if cfg!(windows) {
            Self::Natural
        } else {
            Self::CaseInsensitive
        }
    }

    pub fn compare(self, a: &str, b: &str) -> Ordering {
        let primary = match self {
            Self::Locale | Self::Natural => natural_cmp(a, b),
            Self::CaseInsensitive => a.to_lowercase().cmp(&b.to_lowercase()),
        };
        // Names equal under the policy still need a stable answer.
        primary.then_with(|| a.cmp(b))
    }
}

/// Return `true` if `path` has a supported image extension (any case).
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.iter().any(|e| *e == ext)
        })
}

/// List the images directly inside `dir` (no recursion), ordered by `order`.
///
/// # Errors
/// Returns [`Error::BadDir`] if `dir` is missing or not a directory. An
/// empty result is not an error here; callers decide.
pub fn scan_directory(dir: &Path, order: SortOrder) -> Result<Vec<PathBuf>, Error> {
    if !dir.is_dir() {
        return Err(Error::BadDir(dir.to_string_lossy().into_owned()));
    }

    let mut out = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .flatten()
    {
        let path = entry.path();
        if path.is_file() && is_supported_image(path) {
            out.push(path.to_path_buf());
        }
    }
    sort_paths(&mut out, order);
    debug!(dir = %dir.display(), count = out.len(), ?order, "scanned directory");
    Ok(out)
}

/// Order paths by file name under `order`.
pub fn sort_paths(paths: &mut [PathBuf], order: SortOrder) {
    paths.sort_by(|a, b| order.compare(&file_name(a), &file_name(b)));
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Text(&'a str),
    Digits(&'a str),
}

fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits: Option<bool> = None;
    for (i, ch) in s.char_indices() {
        let digit = ch.is_ascii_digit();
        match in_digits {
            Some(prev) if prev != digit => {
                out.push(make_chunk(&s[start..i], prev));
                start = i;
            }
            _ => {}
        }
        in_digits = Some(digit);
    }
    if let Some(prev) = in_digits {
        out.push(make_chunk(&s[start..], prev));
    }
    out
}

fn make_chunk(s: &str, digits: bool) -> Chunk<'_> {
    if digits { Chunk::Digits(s) } else { Chunk::Text(s) }
}

fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn natural_cmp(a: &str, b: &str) -> Ordering {
    let ca = chunks(a);
    let cb = chunks(b);
    for (x, y) in ca.iter().zip(cb.iter()) {
        let ord = match (x, y) {
            (Chunk::Digits(x), Chunk::Digits(y)) => cmp_digits(x, y),
            (Chunk::Text(x), Chunk::Text(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
            // numbers sort before words
            (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    ca.len().cmp(&cb.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(names: &[&str], order: SortOrder) -> Vec<String> {
        let mut v: Vec<String> = names.iter().map(|s| (*s).to_string()).collect();
        v.sort_by(|a, b| order.compare(a, b));
        v
    }

    #[test]
    fn natural_orders_numbers_numerically() {
        assert_eq!(
            sorted(&["img10.jpg", "img2.jpg", "IMG1.jpg"], SortOrder::Natural),
            vec!["IMG1.jpg", "img2.jpg", "img10.jpg"]
        );
    }

    #[test]
    fn locale_is_digit_aware() {
        assert_eq!(
            sorted(&["img10.jpg", "img2.jpg", "Img1.jpg"], SortOrder::Locale),
            vec!["Img1.jpg", "img2.jpg", "img10.jpg"]
        );
    }

    #[test]
    fn case_insensitive_is_lexical() {
        assert_eq!(
            sorted(&["img10.jpg", "b.png", "img2.jpg", "A.jpg"], SortOrder::CaseInsensitive),
            vec!["A.jpg", "b.png", "img10.jpg", "img2.jpg"]
        );
    }

    #[test]
    fn leading_zeros_do_not_change_rank() {
        assert_eq!(natural_cmp("007", "7"), Ordering::Equal);
        assert_eq!(SortOrder::Natural.compare("007", "7"), Ordering::Less);
        assert_eq!(natural_cmp("99", "100"), Ordering::Less);
    }

    #[test]
    fn chunking_splits_digit_runs() {
        assert_eq!(
            chunks("ab12c"),
            vec![Chunk::Text("ab"), Chunk::Digits("12"), Chunk::Text("c")]
        );
        assert!(chunks("").is_empty());
    }

    #[test]
    fn extensions_match_any_case() {
        assert!(is_supported_image(Path::new("/x/a.JPG")));
        assert!(is_supported_image(Path::new("b.Tif")));
        assert!(!is_supported_image(Path::new("c.txt")));
        assert!(!is_supported_image(Path::new("noext")));
    }
}
