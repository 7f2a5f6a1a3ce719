//! Request classification.
//!
//! Maps every intercepted URL to exactly one asset class. Rules are checked
//! in order and the first match wins:
//!
//! 1. the URL is a static-manifest entry, or a same-origin URL whose path
//!    contains a manifest path other than `/`
//! 2. the path has an image extension or an `/images/` segment
//! 3. the host serves web fonts
//! 4. anything else is dynamic

use serde::{Deserialize, Serialize};
use url::Url;

use super::config::{IMAGE_PATH_SEGMENT, RouterConfig};

/// The class a request falls into; decides its caching strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    StaticListed,
    Image,
    Font,
    Dynamic,
}

impl AssetClass {
    /// Short name used in logs and tool output.
    pub fn as_str(self) -> &'static str {
        match self {
            AssetClass::StaticListed => "static_listed",
            AssetClass::Image => "image",
            AssetClass::Font => "font",
            AssetClass::Dynamic => "dynamic",
        }
    }
}

/// Classify a request URL.
pub fn classify(url: &Url, config: &RouterConfig) -> AssetClass {
    if is_static_asset(url, config) {
        AssetClass::StaticListed
    } else if is_image(url, config) {
        AssetClass::Image
    } else if is_font(url, config) {
        AssetClass::Font
    } else {
        AssetClass::Dynamic
    }
}

fn is_static_asset(url: &Url, config: &RouterConfig) -> bool {
    let mut url = url.clone();
    url.set_fragment(None);
    config
        .static_assets
        .iter()
        .any(|asset| *asset == url || contains_manifest_path(&url, asset))
}

/// The root entry and entries pinned to a query only ever match exactly.
fn contains_manifest_path(url: &Url, asset: &Url) -> bool {
    asset.path() != "/"
        && asset.query().is_none()
        && asset.origin() == url.origin()
        && url.path().contains(asset.path())
}

fn is_image(url: &Url, config: &RouterConfig) -> bool {
    let path = url.path();
    path.contains(IMAGE_PATH_SEGMENT) || config.image_pattern.as_ref().is_some_and(|p| p.is_match(path))
}

fn is_font(url: &Url, config: &RouterConfig) -> bool {
    url.host_str()
        .is_some_and(|host| config.font_hosts.iter().any(|font_host| font_host == host))
}

#[cfg(test)]
mod tests {
    use super::*;
    use windhelm_core::AppConfig;

    fn config() -> RouterConfig {
        RouterConfig::from_app(&AppConfig::default()).unwrap()
    }

    fn class_of(url: &str) -> AssetClass {
        classify(&Url::parse(url).unwrap(), &config())
    }

    #[test]
    fn test_manifest_entries_are_static() {
        assert_eq!(class_of("http://localhost:3000/styles.min.css"), AssetClass::StaticListed);
        assert_eq!(class_of("http://localhost:3000/"), AssetClass::StaticListed);
        assert_eq!(class_of("http://localhost:3000/index.html#about"), AssetClass::StaticListed);
    }

    #[test]
    fn test_manifest_image_stays_static() {
        assert_eq!(class_of("http://localhost:3000/media/Logo.png"), AssetClass::StaticListed);
    }

    #[test]
    fn test_manifest_font_stylesheet_is_static() {
        let url = &config().static_assets[7];
        assert_eq!(classify(url, &config()), AssetClass::StaticListed);
    }

    #[test]
    fn test_root_entry_does_not_swallow_other_paths() {
        assert_eq!(class_of("http://localhost:3000/about.html"), AssetClass::Dynamic);
        assert_eq!(class_of("http://localhost:3000/?page=2"), AssetClass::Dynamic);
    }

    #[test]
    fn test_versioned_manifest_paths_are_static() {
        assert_eq!(class_of("http://localhost:3000/styles.min.css?v=2"), AssetClass::StaticListed);
        assert_eq!(class_of("http://localhost:3000/v2/script.min.js"), AssetClass::StaticListed);
        assert_eq!(class_of("http://localhost:3000/media/Logo.png?size=64"), AssetClass::StaticListed);
    }

    #[test]
    fn test_manifest_path_on_other_origin_is_not_static() {
        assert_eq!(class_of("https://cdn.example.com/styles.min.css"), AssetClass::Dynamic);
    }

    #[test]
    fn test_images_by_extension_and_segment() {
        assert_eq!(class_of("http://localhost:3000/media/team.JPG"), AssetClass::Image);
        assert_eq!(class_of("http://localhost:3000/images/hero.jpg"), AssetClass::Image);
        assert_eq!(class_of("http://localhost:3000/images/sprite"), AssetClass::Image);
        assert_eq!(class_of("https://cdn.example.com/photo.webp?w=400"), AssetClass::Image);
    }

    #[test]
    fn test_font_hosts() {
        assert_eq!(class_of("https://fonts.gstatic.com/s/inter/v12/inter.woff2"), AssetClass::Font);
        assert_eq!(class_of("https://fonts.googleapis.com/css2?family=Other"), AssetClass::Font);
    }

    #[test]
    fn test_image_on_font_host_is_image() {
        assert_eq!(class_of("https://fonts.gstatic.com/preview.png"), AssetClass::Image);
    }

    #[test]
    fn test_everything_else_is_dynamic() {
        assert_eq!(class_of("http://localhost:3000/api/data"), AssetClass::Dynamic);
        assert_eq!(class_of("http://localhost:3000/api/orders?username=a"), AssetClass::Dynamic);
        assert_eq!(class_of("https://example.org/"), AssetClass::Dynamic);
    }

    #[test]
    fn test_classification_is_total_and_deterministic() {
        let urls = [
            "http://localhost:3000/",
            "http://localhost:3000/script.min.js",
            "http://localhost:3000/images/a.gif",
            "https://fonts.gstatic.com/x",
            "http://localhost:3000/api/login",
            "https://example.org/a/b/c?d=e",
        ];
        let config = config();
        for raw in urls {
            let url = Url::parse(raw).unwrap();
            let first = classify(&url, &config);
            assert_eq!(first, classify(&url, &config));
            assert!(matches!(
                first,
                AssetClass::StaticListed | AssetClass::Image | AssetClass::Font | AssetClass::Dynamic
            ));
        }
    }
}
