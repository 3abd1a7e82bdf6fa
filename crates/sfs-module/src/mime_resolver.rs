//! `MimeGuessResolver` — default `ContentTypeResolver`.

use sfs_core::content_type::ContentTypeResolver;
use std::path::Path;

/// Extension lookup backed by the `mime_guess` table.
#[derive(Debug, Default, Clone, Copy)]
pub struct MimeGuessResolver;

impl ContentTypeResolver for MimeGuessResolver {
    fn resolve(&self, path: &Path) -> Option<String> {
        mime_guess::from_path(path).first_raw().map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfs_core::content_type::FALLBACK_CONTENT_TYPE;

    #[test]
    fn test_common_extensions() {
        let r = MimeGuessResolver;
        assert_eq!(r.resolve(Path::new("index.html")).as_deref(), Some("text/html"));
        assert_eq!(r.resolve(Path::new("a/b/site.css")).as_deref(), Some("text/css"));
        assert_eq!(r.resolve(Path::new("logo.png")).as_deref(), Some("image/png"));
        assert_eq!(r.resolve(Path::new("LOGO.PNG")).as_deref(), Some("image/png"));
    }

    #[test]
    fn test_unknown_extension_falls_back() {
        let r = MimeGuessResolver;
        assert_eq!(r.resolve(Path::new("blob.zzzunknown")), None);
        assert_eq!(r.resolve(Path::new("Makefile")), None);
        assert_eq!(r.resolve_or_default(Path::new("Makefile")), FALLBACK_CONTENT_TYPE);
    }
}
