//! Responsive `<img>` markup.
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//!
//! ## Base path
//!
//! A site exported to GitHub Pages under `https://<owner>.github.io/<repo>/`
//! serves every asset below `/<repo>`. [`BasePath`] carries that prefix and
//! is applied to every URL rendered here. Absolute `http(s)://` URLs pass
//! through untouched.

use crate::select::VariantSelector;
use maud::{Markup, html};

/// URL prefix for sites served below a repository sub-path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasePath {
    prefix: String,
}

impl BasePath {
    /// No prefix: the site is served from the domain root.
    pub fn root() -> Self {
        Self::default()
    }

    /// An explicit prefix such as `/my-site`.
    pub fn new(prefix: &str) -> Self {
        let trimmed = prefix.trim_matches('/');
        Self {
            prefix: if trimmed.is_empty() {
                String::new()
            } else {
                format!("/{trimmed}")
            },
        }
    }

    /// Derive from `GITHUB_ACTIONS` and `GITHUB_REPOSITORY`.
    pub fn from_env() -> Self {
        let github_actions = std::env::var("GITHUB_ACTIONS").ok();
        let repository = std::env::var("GITHUB_REPOSITORY").ok();
        Self::from_vars(github_actions.as_deref(), repository.as_deref())
    }

    /// Prefix `/<repo>` only inside Actions, and never for a user or
    /// organization site (`<owner>.github.io`).
    pub fn from_vars(github_actions: Option<&str>, repository: Option<&str>) -> Self {
        if github_actions != Some("true") {
            return Self::root();
        }
        let repo = repository
            .and_then(|r| r.split('/').nth(1))
            .unwrap_or_default();
        if repo.is_empty() || repo.ends_with(".github.io") {
            return Self::root();
        }
        Self {
            prefix: format!("/{repo}"),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn apply(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.prefix, path)
        } else {
            format!("{}/{}", self.prefix, path)
        }
    }
}

/// `srcset` value with the base path applied to every URL.
pub fn srcset(selector: &VariantSelector, base: &BasePath, src: &str) -> Option<String> {
    selector.srcset_with(src, |url| base.apply(url))
}

/// Render an `<img>` for `src`, sized for `display_width` CSS pixels.
///
/// `src` is the canonical manifest key of the original asset. Without
/// variants the original is referenced directly, with its natural size
/// when the manifest knows it.
pub fn responsive_img(
    selector: &VariantSelector,
    base: &BasePath,
    src: &str,
    alt: &str,
    display_width: u32,
    sizes: Option<&str>,
) -> Markup {
    match selector.best_for_width(src, display_width) {
        Some(chosen) => {
            let srcset = srcset(selector, base, src);
            html! {
                img src=(base.apply(&chosen.src))
                    srcset=[srcset]
                    sizes=[sizes]
                    width=(chosen.width)
                    height=(chosen.height)
                    alt=(alt)
                    loading="lazy"
                    decoding="async";
            }
        }
        None => {
            let dims = selector.dimensions(src);
            html! {
                img src=(base.apply(src))
                    width=[dims.map(|d| d.width)]
                    height=[dims.map(|d| d.height)]
                    alt=(alt)
                    loading="lazy"
                    decoding="async";
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Manifest, VariantEntry, VariantImage};

    fn selector() -> VariantSelector {
        let mut manifest = Manifest::new();
        manifest.insert(
            "/media/a.jpg".to_string(),
            VariantEntry {
                width: 400,
                height: 200,
                variants: [64, 160, 400]
                    .iter()
                    .map(|w| VariantImage {
                        src: format!("/_img/media/a-0badf00d-{w}.webp"),
                        width: *w,
                        height: w / 2,
                    })
                    .collect(),
            },
        );
        manifest.insert(
            "/lebob.png".to_string(),
            VariantEntry {
                width: 50,
                height: 40,
                variants: vec![],
            },
        );
        VariantSelector::new(manifest)
    }

    // =========================================================================
    // BasePath
    // =========================================================================

    #[test]
    fn project_site_in_actions_gets_repo_prefix() {
        let base = BasePath::from_vars(Some("true"), Some("lebob/Lebob-Website"));
        assert_eq!(base.prefix(), "/Lebob-Website");
        assert_eq!(base.apply("/media/a.jpg"), "/Lebob-Website/media/a.jpg");
    }

    #[test]
    fn user_site_has_no_prefix() {
        let base = BasePath::from_vars(Some("true"), Some("lebob/lebob.github.io"));
        assert_eq!(base, BasePath::root());
    }

    #[test]
    fn outside_actions_has_no_prefix() {
        assert_eq!(BasePath::from_vars(None, Some("o/r")), BasePath::root());
        assert_eq!(BasePath::from_vars(Some("false"), Some("o/r")), BasePath::root());
        assert_eq!(BasePath::from_vars(Some("true"), Some("norepo")), BasePath::root());
        assert_eq!(BasePath::from_vars(Some("true"), None), BasePath::root());
    }

    #[test]
    fn apply_adds_leading_slash_and_skips_absolute_urls() {
        let base = BasePath::new("site/");
        assert_eq!(base.apply("media/a.jpg"), "/site/media/a.jpg");
        assert_eq!(base.apply("https://cdn.example/a.jpg"), "https://cdn.example/a.jpg");
        assert_eq!(base.apply("http://cdn.example/a.jpg"), "http://cdn.example/a.jpg");
        assert_eq!(BasePath::root().apply("a.jpg"), "/a.jpg");
    }

    #[test]
    fn srcset_is_selector_srcset_under_base() {
        let selector = selector();
        assert_eq!(
            srcset(&selector, &BasePath::root(), "/media/a.jpg"),
            selector.srcset("/media/a.jpg")
        );
        assert_eq!(
            srcset(&selector, &BasePath::new("/site"), "/media/a.jpg").unwrap(),
            "/site/_img/media/a-0badf00d-64.webp 64w, \
             /site/_img/media/a-0badf00d-160.webp 160w, \
             /site/_img/media/a-0badf00d-400.webp 400w"
        );
        assert!(srcset(&selector, &BasePath::new("/site"), "/lebob.png").is_none());
    }

    // =========================================================================
    // Markup
    // =========================================================================

    #[test]
    fn img_uses_best_variant_and_full_srcset() {
        let html = responsive_img(
            &selector(),
            &BasePath::new("/site"),
            "/media/a.jpg",
            "A & B",
            200,
            Some("(max-width: 600px) 100vw, 200px"),
        )
        .into_string();

        assert!(html.starts_with("<img src=\"/site/_img/media/a-0badf00d-160.webp\""));
        assert!(html.contains(
            "srcset=\"/site/_img/media/a-0badf00d-64.webp 64w, \
             /site/_img/media/a-0badf00d-160.webp 160w, \
             /site/_img/media/a-0badf00d-400.webp 400w\""
        ));
        assert!(html.contains("sizes=\"(max-width: 600px) 100vw, 200px\""));
        assert!(html.contains("width=\"160\" height=\"80\""));
        assert!(html.contains("alt=\"A &amp; B\""));
        assert!(html.contains("loading=\"lazy\" decoding=\"async\""));
    }

    #[test]
    fn img_without_variants_uses_original_and_natural_size() {
        let html =
            responsive_img(&selector(), &BasePath::root(), "/lebob.png", "Lebob", 300, None)
                .into_string();
        assert_eq!(
            html,
            "<img src=\"/lebob.png\" width=\"50\" height=\"40\" alt=\"Lebob\" \
             loading=\"lazy\" decoding=\"async\">"
        );
    }

    #[test]
    fn img_for_unknown_source_omits_dimensions() {
        let html =
            responsive_img(&selector(), &BasePath::root(), "/media/new.jpg", "", 300, None)
                .into_string();
        assert_eq!(
            html,
            "<img src=\"/media/new.jpg\" alt=\"\" loading=\"lazy\" decoding=\"async\">"
        );
    }
}
