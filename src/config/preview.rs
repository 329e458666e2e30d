//! `[preview]` section configuration.

use super::defaults;
use crate::preview::DeviceProfile;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[preview]` section in webforge.toml.
///
/// # Example
/// ```toml
/// [preview]
/// device = "tablet"     # compact | medium | wide (mobile | tablet | desktop)
/// minify = false
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct PreviewConfig {
    /// Device frame shown around the preview.
    #[serde(default = "defaults::preview::device")]
    #[educe(Default = defaults::preview::device())]
    pub device: DeviceProfile,

    /// Minify the synthesized document.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub minify: bool,

    /// Tailwind CDN script loaded by every preview.
    #[serde(default = "defaults::preview::tailwind_cdn")]
    #[educe(Default = defaults::preview::tailwind_cdn())]
    pub tailwind_cdn: String,
}

#[cfg(test)]
mod tests {
    use super::super::WebConfig;
    use crate::preview::DeviceProfile;

    #[test]
    fn test_preview_config_defaults() {
        let config: WebConfig = toml::from_str("").unwrap();

        assert_eq!(config.preview.device, DeviceProfile::Compact);
        assert!(!config.preview.minify);
        assert_eq!(config.preview.tailwind_cdn, "https://cdn.tailwindcss.com");
    }

    #[test]
    fn test_preview_device_alias() {
        let config: WebConfig = toml::from_str(
            r#"
            [preview]
            device = "tablet"
            minify = true
        "#,
        )
        .unwrap();

        assert_eq!(config.preview.device, DeviceProfile::Medium);
        assert!(config.preview.minify);
    }

    #[test]
    fn test_preview_unknown_device() {
        let config = r#"
            [preview]
            device = "watch"
        "#;
        assert!(toml::from_str::<WebConfig>(config).is_err());
    }
}
