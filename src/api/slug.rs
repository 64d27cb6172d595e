use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static NON_SLUG_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s-]").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static HYPHEN_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("valid regex"));

/// URL-safe identifier derived from a title or name.
///
/// Lowercases, drops anything that is not `[a-z0-9]`, whitespace or a hyphen,
/// turns whitespace runs into a single hyphen and trims hyphens at the edges.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_SLUG_CHARS.replace_all(&lowered, "");
    let hyphenated = WHITESPACE.replace_all(stripped.trim(), "-");
    let collapsed = HYPHEN_RUNS.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_string()
}

/// Slugifies the stem of `file_name`, keeping its extension
pub fn slugify_file_name(file_name: &str) -> String {
    let path = Path::new(file_name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();

    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.{}", slugify(stem), ext),
        None => slugify(stem),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_hyphenates() {
        assert_eq!(slugify("Profil Desa!"), "profil-desa");
    }

    #[test]
    fn collapses_whitespace_and_hyphens() {
        assert_eq!(slugify("  Berita   Terbaru -- Hari Ini "), "berita-terbaru-hari-ini");
        assert_eq!(slugify("a - b"), "a-b");
    }

    #[test]
    fn drops_non_ascii_letters() {
        assert_eq!(slugify("Kegiatan Gotong-Royong 2024 (Maret)"), "kegiatan-gotong-royong-2024-maret");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn file_names_keep_extension() {
        assert_eq!(slugify_file_name("Foto Kantor Desa.JPG"), "foto-kantor-desa.JPG");
        assert_eq!(slugify_file_name("README"), "readme");
    }
}
