use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::frame::{FrameAssets, FrameConfig, GridRect, Link, PaneContent};
use crate::glyph::LogoVariant;
use crate::layout_engine::{AutoplayMode, GridOptions};
use crate::logo::LogoOptions;

pub const CONFIG_VERSION: &str = "1.0";
/// Environment variable naming the page descriptor when `--config` is absent.
pub const CONFIG_ENV: &str = "NUCLEUS_PAGE_CONFIG";

const HEADER_MARK_SIZE: f32 = 32.0;
const LOGO_PANE_MEDIA_SIZE: f32 = 0.8;
const APP_URL: &str = "http://localhost:3001";
const ASSET_CDN: &str = "https://static.cdn-luma.com/files";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read page config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse page config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported page config version '{found}', expected '{}'", CONFIG_VERSION)]
    UnsupportedVersion { found: String },
}

/// Grid options plus the nine pane descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSection {
    #[serde(flatten)]
    pub options: GridOptions,
    pub frames: Vec<FrameConfig>,
}

/// Versioned page descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    pub version: String,
    /// Mark shown in the header band
    #[serde(default = "header_mark")]
    pub header: LogoOptions,
    pub grid: GridSection,
}

fn header_mark() -> LogoOptions {
    LogoOptions {
        variant: LogoVariant::Monogram,
        size: Some(HEADER_MARK_SIZE),
    }
}

impl PageConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: PageConfig = serde_json::from_str(json)?;
        if config.version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
            });
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        info!(
            "Loaded page config from {} ({} panes)",
            path.display(),
            config.grid.frames.len()
        );
        Ok(config)
    }

    /// Load `path` if given; any failure is logged and the built-in page is used.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        Self::load(path).unwrap_or_else(|err| {
            warn!("{}; falling back to the built-in page", err);
            Self::default()
        })
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn assets(dir: &str, corner: &str, horizontal: &str, vertical: &str) -> FrameAssets {
    FrameAssets {
        corner: format!("{}/{}/{}", ASSET_CDN, dir, corner),
        edge_horizontal: format!("{}/{}/{}", ASSET_CDN, dir, horizontal),
        edge_vertical: format!("{}/{}/{}", ASSET_CDN, dir, vertical),
    }
}

fn link(label: &str, path: &str) -> Link {
    Link {
        label: label.to_string(),
        href: format!("{}{}", APP_URL, path),
    }
}

fn text(badge: Option<&str>, heading: &str, body: &[&str], links: Vec<Link>) -> PaneContent {
    PaneContent::Text {
        badge: badge.map(str::to_string),
        heading: heading.to_string(),
        body: body.iter().map(|line| line.to_string()).collect(),
        links,
    }
}

fn pane(id: u32, content: PaneContent, assets: FrameAssets) -> FrameConfig {
    FrameConfig {
        id,
        content,
        default_pos: GridRect::for_index(id as usize - 1),
        assets,
        initial_media_size: None,
        initial_border_thickness: None,
        initial_border_size: None,
    }
}

/// The landing page as shipped.
impl Default for PageConfig {
    fn default() -> Self {
        let frames = vec![
            pane(
                1,
                text(
                    Some("AI Receptionist"),
                    "Get A Free AI Receptionist",
                    &["Automate calls, take messages, schedule appointments."],
                    vec![
                        link("Activate Now", "/signup"),
                        link("Listen to Demo", "/demo-feature"),
                    ],
                ),
                assets(
                    "bcf576df9c38b05f",
                    "1_corner_update.png",
                    "1_vert_update.png",
                    "1_hori_update.png",
                ),
            ),
            pane(
                2,
                text(
                    None,
                    "AI Receptionist on Phone",
                    &["Answers, routes and books while you work."],
                    vec![],
                ),
                assets(
                    "bcf576df9c38b05f",
                    "2_corner_update.png",
                    "2_vert_update.png",
                    "2_hori_update.png",
                ),
            ),
            pane(
                3,
                text(
                    None,
                    "Trusted by innovative companies",
                    &["Company 1  Company 2  Company 3  Company 4"],
                    vec![],
                ),
                assets(
                    "3d36d1e0dba2476c",
                    "3_Corner_update.png",
                    "3_hori_update.png",
                    "3_Vert_update.png",
                ),
            ),
            pane(
                4,
                text(
                    None,
                    "Core Features",
                    &[
                        "24/7 Call Handling",
                        "Never miss a call with our AI receptionist answering around the clock.",
                        "Natural Voice AI",
                        "Engage callers with a human-like voice that understands and responds naturally.",
                        "Call Routing & Transfer",
                        "Direct calls to the right person or department effortlessly.",
                    ],
                    vec![],
                ),
                assets(
                    "9e67e05f37e52522",
                    "4_corner_update.png",
                    "4_hori_update.png",
                    "4_vert_update.png",
                ),
            ),
            FrameConfig {
                initial_media_size: Some(LOGO_PANE_MEDIA_SIZE),
                ..pane(
                    5,
                    PaneContent::Logo(LogoOptions::default()),
                    assets(
                        "9e67e05f37e52522",
                        "5_corner_update.png",
                        "5_hori_update.png",
                        "5_verti_update.png",
                    ),
                )
            },
            pane(
                6,
                text(
                    None,
                    "More Features",
                    &[
                        "Message Taking",
                        "Capture important messages and get notified instantly.",
                        "Appointment Scheduling",
                        "Let your AI receptionist handle appointment bookings and confirmations.",
                        "Multi-Language Support",
                        "Serve a global audience with AI that speaks multiple languages.",
                    ],
                    vec![],
                ),
                assets("1199340587e8da1d", "6_corner.png", "6_corner-1.png", "6_vert.png"),
            ),
            pane(
                7,
                text(
                    Some("How It Works"),
                    "Simple Process",
                    &[
                        "01 Create Account",
                        "02 Configure Workspace",
                        "03 Boost Productivity",
                    ],
                    vec![],
                ),
                assets("b80b5aa00ccc33bd", "7_corner.png", "7_hori.png", "7_vert.png"),
            ),
            pane(
                8,
                text(
                    None,
                    "Testimonials",
                    &[
                        "\"Game-changer for calls!\"",
                        "- J. Smith",
                        "\"Impressive AI voice.\"",
                        "- A. Johnson",
                    ],
                    vec![],
                ),
                assets("981e483f71aa764b", "8_corner.png", "8_hori.png", "8_verticle.png"),
            ),
            pane(
                9,
                text(
                    None,
                    "Pricing Plans",
                    &["$29/mo", "Starter Plan"],
                    vec![link("Start Trial", "/signup?plan=starter")],
                ),
                assets("981e483f71aa764b", "9_corner.png", "9_hori.png", "9_vert.png"),
            ),
        ];

        Self {
            version: CONFIG_VERSION.to_string(),
            header: header_mark(),
            grid: GridSection {
                options: GridOptions {
                    autoplay_mode: AutoplayMode::Hover,
                    ..GridOptions::default()
                },
                frames,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_page_has_nine_positioned_panes() {
        let config = PageConfig::default();
        assert_eq!(config.grid.frames.len(), 9);
        for (index, frame) in config.grid.frames.iter().enumerate() {
            assert_eq!(frame.id as usize, index + 1);
            assert_eq!(frame.default_pos, GridRect::for_index(index));
            assert!(frame.assets.corner.starts_with(ASSET_CDN));
        }
        let logo = &config.grid.frames[4];
        assert!(matches!(logo.content, PaneContent::Logo(LogoOptions { variant: LogoVariant::Full, .. })));
        assert_eq!(logo.initial_media_size, Some(0.8));
        assert_eq!(config.header.variant, LogoVariant::Monogram);
        assert_eq!(config.header.size, Some(32.0));
    }

    #[test]
    fn test_default_page_survives_json() {
        let config = PageConfig::default();
        let json = config.to_json_string().unwrap();
        assert_eq!(PageConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_grid_options_default_when_omitted() {
        let json = r#"{"version": "1.0", "grid": {"frames": []}}"#;
        let config = PageConfig::from_json_str(json).unwrap();
        assert_eq!(config.grid.options, GridOptions::default());
        assert_eq!(config.header, header_mark());
        assert!(config.grid.frames.is_empty());
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let json = r#"{"version": "2.0", "grid": {"frames": []}}"#;
        let err = PageConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedVersion { ref found } if found == "2.0"));
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        assert!(matches!(
            PageConfig::from_json_str("{\"version\": "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = PageConfig::load(Path::new("/nonexistent/nucleus-page.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_failed_load_falls_back_to_default_page() {
        let config = PageConfig::load_or_default(Some(Path::new("/nonexistent/nucleus-page.json")));
        assert_eq!(config, PageConfig::default());
        assert_eq!(PageConfig::load_or_default(None), PageConfig::default());
    }
}
