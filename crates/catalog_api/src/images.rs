//! Image CDN URLs for poster and backdrop paths.

use crate::CatalogConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Poster renditions offered by the image CDN.
pub enum PosterSize {
    /// `w185`, list thumbnails.
    Small,
    /// `w342`, cards.
    #[default]
    Medium,
    /// `w500`, detail pages.
    Large,
    /// Full resolution.
    Original,
}

impl PosterSize {
    /// Path segment for this size.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Small => "w185",
            Self::Medium => "w342",
            Self::Large => "w500",
            Self::Original => "original",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Backdrop renditions offered by the image CDN.
pub enum BackdropSize {
    /// `w780`.
    Medium,
    /// `w1280`, hero banners.
    #[default]
    Large,
    /// Full resolution.
    Original,
}

impl BackdropSize {
    /// Path segment for this size.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Medium => "w780",
            Self::Large => "w1280",
            Self::Original => "original",
        }
    }
}

fn image_url(config: &CatalogConfig, size: &str, path: Option<&str>) -> Option<String> {
    let path = path.map(str::trim).filter(|path| !path.is_empty())?;
    let separator = if path.starts_with('/') { "" } else { "/" };
    Some(format!(
        "{}/{size}{separator}{path}",
        config.image_base_url
    ))
}

/// Poster URL, or `None` when the movie has no poster (views show a placeholder).
pub fn poster_url(config: &CatalogConfig, path: Option<&str>, size: PosterSize) -> Option<String> {
    image_url(config, size.as_str(), path)
}

/// Backdrop URL, or `None` when the movie has no backdrop.
pub fn backdrop_url(
    config: &CatalogConfig,
    path: Option<&str>,
    size: BackdropSize,
) -> Option<String> {
    image_url(config, size.as_str(), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_cdn_size_and_path() {
        let config = CatalogConfig::default();
        assert_eq!(
            poster_url(&config, Some("/abc.jpg"), PosterSize::Large).as_deref(),
            Some("https://image.tmdb.org/t/p/w500/abc.jpg")
        );
        assert_eq!(
            backdrop_url(&config, Some("def.jpg"), BackdropSize::default()).as_deref(),
            Some("https://image.tmdb.org/t/p/w1280/def.jpg")
        );
    }

    #[test]
    fn missing_or_blank_paths_have_no_url() {
        let config = CatalogConfig::default();
        assert_eq!(poster_url(&config, None, PosterSize::Small), None);
        assert_eq!(poster_url(&config, Some("  "), PosterSize::Original), None);
    }
}
