//! Host page around the sandboxed preview.
//!
//! The host draws the device frame, embeds the preview document in an iframe
//! with [`SANDBOX`] and collects bridged console messages in a side panel.
//!
//! - [`HostMode::Live`]: served by `webforge serve`; forwards console messages
//!   to `POST /__console`, polls `/__revision` and offers device links.
//! - [`HostMode::Static`]: written next to `document.html` by
//!   `webforge preview`; console stays local to the page.

use super::{DeviceProfile, SANDBOX};
use crate::{
    console::{CLEARED_MESSAGE, INIT_MESSAGE},
    utils::template::fill,
};

const HOST_TEMPLATE: &str = include_str!("../embed/serve/host.html");

/// Route serving the preview document in live mode.
pub const LIVE_PREVIEW_SRC: &str = "/__preview";

/// File name of the preview document in static mode.
pub const STATIC_PREVIEW_SRC: &str = "document.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostMode {
    Live { revision: u64 },
    Static,
}

/// Escape text for an HTML text node or attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn device_links(current: DeviceProfile, mode: HostMode) -> String {
    if mode == HostMode::Static {
        return format!(r#"<a class="active">{current}</a>"#);
    }
    DeviceProfile::ALL
        .iter()
        .map(|device| {
            let class = if *device == current { " class=\"active\"" } else { "" };
            format!(r#"<a href="/__device?name={device}"{class}>{device}</a>"#)
        })
        .collect::<Vec<_>>()
        .join("")
}

/// Render the host page for `device`.
pub fn render_host(title: &str, device: DeviceProfile, mode: HostMode) -> String {
    let frame = device.frame();
    let title = escape_html(title);
    let frame_style = frame.container_style();
    let links = device_links(device, mode);
    let notch = if frame.notch { r#"<div class="notch"></div>"# } else { "" };
    let home = if frame.home_indicator {
        r#"<div class="home-indicator"></div>"#
    } else {
        ""
    };

    let (live, revision, src) = match mode {
        HostMode::Live { revision } => ("true", revision.to_string(), LIVE_PREVIEW_SRC),
        HostMode::Static => ("false", String::new(), STATIC_PREVIEW_SRC),
    };

    fill(
        HOST_TEMPLATE,
        &[
            ("title", title.as_str()),
            ("device", device.name()),
            ("device_links", links.as_str()),
            ("frame_style", frame_style.as_str()),
            ("notch", notch),
            ("home_indicator", home),
            ("sandbox", SANDBOX),
            ("preview_src", src),
            ("live", live),
            ("revision", revision.as_str()),
            ("init_message", INIT_MESSAGE),
            ("cleared_message", CLEARED_MESSAGE),
        ],
    )
}
