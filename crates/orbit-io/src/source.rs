use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ImageSource {
    Url(String),
    Path(PathBuf),
}

impl ImageSource {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::Path(PathBuf::from(trimmed.strip_prefix("file://").unwrap_or(trimmed)))
        }
    }

    /// Resolves a manifest entry against the manifest's directory. Paths
    /// written site-absolute (`/images/a.jpg`) are tried under `base` first.
    pub fn resolve(raw: &str, base: &Path) -> Self {
        match Self::parse(raw) {
            Self::Path(path) if path.is_relative() => Self::Path(base.join(path)),
            Self::Path(path) => {
                let under_base = path
                    .strip_prefix("/")
                    .map(|rest| base.join(rest))
                    .ok()
                    .filter(|candidate| candidate.exists());
                Self::Path(under_base.unwrap_or(path))
            }
            url => url,
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_urls() {
        assert_eq!(
            ImageSource::parse("HTTPS://picsum.photos/seed/1/800/600"),
            ImageSource::Url("HTTPS://picsum.photos/seed/1/800/600".to_string())
        );
        assert_eq!(
            ImageSource::parse("file:///tmp/a.png"),
            ImageSource::Path(PathBuf::from("/tmp/a.png"))
        );
    }

    #[test]
    fn relative_paths_join_the_base() {
        let base = Path::new("/srv/public");
        assert_eq!(
            ImageSource::resolve("images/a.jpg", base),
            ImageSource::Path(PathBuf::from("/srv/public/images/a.jpg"))
        );
    }

    #[test]
    fn missing_site_absolute_path_is_kept() {
        let base = Path::new("/definitely/not/here");
        assert_eq!(
            ImageSource::resolve("/images/a.jpg", base),
            ImageSource::Path(PathBuf::from("/images/a.jpg"))
        );
    }
}
