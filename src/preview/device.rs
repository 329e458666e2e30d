//! Device frames for the preview host page.
//!
//! A profile only changes the decoration drawn around the sandbox; the
//! preview document itself is identical for every profile.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Viewport profile selected by the user.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DeviceProfile {
    /// Phone-sized frame with notch
    #[default]
    #[serde(alias = "mobile")]
    #[value(alias = "mobile")]
    Compact,
    /// Tablet-sized frame
    #[serde(alias = "tablet")]
    #[value(alias = "tablet")]
    Medium,
    /// Laptop-sized frame
    #[serde(alias = "desktop")]
    #[value(alias = "desktop")]
    Wide,
}

/// Fixed frame geometry, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub radius: u32,
    pub border: u32,
    /// Thicker bottom bezel (laptop base), `None` for uniform borders
    pub border_bottom: Option<u32>,
    pub notch: bool,
    pub home_indicator: bool,
}

impl DeviceProfile {
    pub const ALL: [Self; 3] = [Self::Compact, Self::Medium, Self::Wide];

    pub const fn frame(self) -> Frame {
        match self {
            Self::Compact => Frame {
                width: 320,
                height: 650,
                radius: 36,
                border: 14,
                border_bottom: None,
                notch: true,
                home_indicator: true,
            },
            Self::Medium => Frame {
                width: 500,
                height: 700,
                radius: 24,
                border: 16,
                border_bottom: None,
                notch: false,
                home_indicator: true,
            },
            Self::Wide => Frame {
                width: 900,
                height: 550,
                radius: 8,
                border: 16,
                border_bottom: Some(40),
                notch: false,
                home_indicator: false,
            },
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Medium => "medium",
            Self::Wide => "wide",
        }
    }

    /// Parse a profile name or alias (`mobile`, `tablet`, `desktop`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "compact" | "mobile" => Some(Self::Compact),
            "medium" | "tablet" => Some(Self::Medium),
            "wide" | "desktop" => Some(Self::Wide),
            _ => None,
        }
    }
}

impl fmt::Display for DeviceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Frame {
    /// Inline CSS for the frame container.
    pub fn container_style(&self) -> String {
        let mut style = format!(
            "width:{}px;height:{}px;border-radius:{}px;border:{}px solid #111;",
            self.width, self.height, self.radius, self.border
        );
        if let Some(bottom) = self.border_bottom {
            style.push_str(&format!("border-bottom:{bottom}px solid #111;"));
        }
        style
    }
}
