//! Fixed output contracts for each asset kind.
//!
//! These values are the published contract of the generated assets and are
//! deliberately not configurable.

use crate::imaging::Dimensions;
use serde::Serialize;
use std::fmt;

/// Exact size and byte budget one asset kind must meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSpec {
    /// Name used in validation messages.
    pub name: &'static str,
    pub dimensions: Dimensions,
    /// Exclusive upper bound on file size; `None` means unbounded.
    pub max_bytes: Option<u64>,
}

impl TargetSpec {
    pub const LOGO: TargetSpec = TargetSpec {
        name: "logo.png",
        dimensions: Dimensions {
            width: 1000,
            height: 1000,
        },
        max_bytes: None,
    };

    pub const SOCIAL_SHARE: TargetSpec = TargetSpec {
        name: "social-share.png",
        dimensions: Dimensions {
            width: 1280,
            height: 640,
        },
        max_bytes: Some(1_000_000),
    };

    /// Target aspect ratio as `(width, height)`.
    pub fn aspect(&self) -> (u32, u32) {
        self.dimensions.as_tuple()
    }
}

/// The two assets this tool produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetKind {
    Logo,
    SocialShare,
}

impl AssetKind {
    pub const ALL: [AssetKind; 2] = [AssetKind::Logo, AssetKind::SocialShare];

    pub fn target(self) -> &'static TargetSpec {
        match self {
            AssetKind::Logo => &TargetSpec::LOGO,
            AssetKind::SocialShare => &TargetSpec::SOCIAL_SHARE,
        }
    }

    /// Subcommand name.
    pub fn command(self) -> &'static str {
        match self {
            AssetKind::Logo => "logo",
            AssetKind::SocialShare => "social-share",
        }
    }

    /// File name used when the output location is a directory.
    pub fn file_name(self) -> &'static str {
        self.target().name
    }

    /// Prefix for this flow's scratch directories.
    pub fn workspace_prefix(self) -> &'static str {
        match self {
            AssetKind::Logo => "normalize-logo-",
            AssetKind::SocialShare => "finalize-social-share-",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AssetKind::Logo => "Logo",
            AssetKind::SocialShare => "Social share",
        };
        f.write_str(label)
    }
}
