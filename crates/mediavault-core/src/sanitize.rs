//! Filename sanitization for object-store keys.
//!
//! Untrusted filenames become safe key segments: ASCII-transliterated,
//! stripped of path separators and control characters, with at most one
//! trailing extension. Output always matches
//! `^[A-Za-z0-9_-]+(\.[A-Za-z0-9]+)?$` (or the `"unnamed"`/`"file"`
//! placeholders) and sanitizing an already-safe name is a no-op.

use deunicode::deunicode;

const SEPARATOR: char = '_';

/// Sanitize a user-controlled filename into a safe storage-key segment.
///
/// Never fails and never returns an empty string.
pub fn sanitize_filename(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "unnamed".to_string();
    }

    let (base, ext) = match trimmed.rsplit_once('.') {
        Some((b, e)) => (b, Some(e)),
        None => (trimmed, None),
    };

    let mut name = sanitize_base(base);
    if name.is_empty() {
        name = "file".to_string();
    }

    if let Some(ext) = ext {
        let ext: String = ext.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        if !ext.is_empty() {
            return format!("{}.{}", name, ext);
        }
    }
    name
}

fn sanitize_base(base: &str) -> String {
    // Transliterate to closest ASCII; deunicode drops what it cannot map.
    let ascii = deunicode(base);

    let mut out = String::with_capacity(ascii.len());
    for c in ascii.chars() {
        if c == '\0' {
            continue;
        }
        if c.is_ascii_alphanumeric() || c == '-' || c == SEPARATOR {
            out.push(c);
        } else if !out.ends_with(SEPARATOR) {
            // Path separators, dots, whitespace and everything else
            // collapse into a single separator.
            out.push(SEPARATOR);
        }
    }

    out.trim_matches(|c| c == SEPARATOR || c == '-' || c == '.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_safe(name: &str) -> bool {
        let (base, ext) = match name.rsplit_once('.') {
            Some((b, e)) => (b, Some(e)),
            None => (name, None),
        };
        !base.is_empty()
            && base
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            && ext.is_none_or(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
    }

    #[test]
    fn test_path_traversal_stripped() {
        assert_eq!(sanitize_filename("../evil/fi l e.png"), "evil_fi_l_e.png");
    }

    #[test]
    fn test_unicode_transliterated() {
        assert_eq!(sanitize_filename("café.jpg"), "cafe.jpg");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize_filename(""), "unnamed");
        assert_eq!(sanitize_filename("   "), "unnamed");
    }

    #[test]
    fn test_base_emptied_becomes_file() {
        assert_eq!(sanitize_filename("....jpg"), "file.jpg");
        assert_eq!(sanitize_filename("###.png"), "file.png");
    }

    #[test]
    fn test_separator_runs_collapse() {
        assert_eq!(sanitize_filename("a   b!!!c.txt"), "a_b_c.txt");
    }

    #[test]
    fn test_interior_dots_fold_into_base() {
        assert_eq!(sanitize_filename("archive.tar.gz"), "archive_tar.gz");
    }

    #[test]
    fn test_extension_restricted_to_alphanumerics() {
        assert_eq!(sanitize_filename("name.j$p#g"), "name.jpg");
        assert_eq!(sanitize_filename("name.###"), "name");
    }

    #[test]
    fn test_nul_bytes_removed() {
        assert_eq!(sanitize_filename("a\0b.png"), "ab.png");
    }

    #[test]
    fn test_already_safe_is_noop() {
        for name in ["photo.jpg", "my-file_2.png", "file", "unnamed"] {
            assert_eq!(sanitize_filename(name), name);
        }
    }

    #[test]
    fn test_output_always_safe() {
        let inputs = [
            "../../etc/passwd",
            "c:\\windows\\system32",
            "日本語ファイル.mp4",
            "\0\0\0",
            "-...-",
            "a",
            "über cool söng.MP3",
        ];
        for input in inputs {
            let out = sanitize_filename(input);
            assert!(
                is_safe(&out) || out == "unnamed" || out == "file",
                "unsafe output {:?} for input {:?}",
                out,
                input
            );
        }
    }
}
