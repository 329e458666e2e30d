//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [project] Section Defaults
// ============================================================================

pub mod project {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn path() -> PathBuf {
        "project.txt".into()
    }

    pub fn output() -> PathBuf {
        "dist".into()
    }

    pub fn archive() -> PathBuf {
        "web-project.zip".into()
    }

    pub fn state_dir() -> PathBuf {
        ".webforge".into()
    }
}

// ============================================================================
// [llm] Section Defaults
// ============================================================================

pub mod llm {
    pub fn base_url() -> String {
        "https://api.openai.com/v1".into()
    }

    pub fn model() -> String {
        "gpt-3.5-turbo".into()
    }

    pub fn temperature() -> f32 {
        0.7
    }

    pub fn max_tokens() -> u32 {
        4000
    }

    pub fn api_key_env() -> Vec<String> {
        vec!["WEBFORGE_API_KEY".into(), "OPENAI_API_KEY".into()]
    }

    pub fn timeout_secs() -> u64 {
        120
    }
}

// ============================================================================
// [preview] Section Defaults
// ============================================================================

pub mod preview {
    use crate::preview::DeviceProfile;

    pub fn device() -> DeviceProfile {
        DeviceProfile::default()
    }

    pub fn tailwind_cdn() -> String {
        "https://cdn.tailwindcss.com".into()
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        5277
    }
}
