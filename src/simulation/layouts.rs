//! Built-in track layouts
//!
//! Layouts use the authoring format, one character per tile:
//! `U` up, `E` up-right, `D` right, `C` down-right, `X` down, `Z` down-left,
//! `A` left, `Q` up-left, `*` intersection and a space for off-road.

use std::fmt;
use std::str::FromStr;

use anyhow::Context;

use super::track::Track;

/// Two-lane figure eight crossing itself at a diagonal intersection
pub const FIGURE_EIGHT: &[&str] = &[
    "   DDDDDDC          ZAAAAAA   ",
    "  EDDDDDDDC        ZAAAAAAAQ  ",
    " EEE      CC      ZZ      QQQ ",
    "EU         CC    ZZ         UQ",
    "UU          CC  ZZ          UU",
    "UU           CCZZ           UU",
    "UU            **            UU",
    "UU           ZZCC           UU",
    "UU          ZZ  CC          UU",
    "UU         ZZ    CC         UU",
    "UUQ       ZZ      CC       EUU",
    " QQ     ZZZ        CCC     EE ",
    "  QAAAAAAZ          CDDDDDDE  ",
    "   QAAAAA            DDDDDE   ",
];

/// Two-lane clockwise octagon without intersections
pub const OVAL: &[&str] = &[
    "    DDDDDDDDDDDDDDDC    ",
    "   EDDDDDDDDDDDDDDDDC   ",
    "  EEE               CC  ",
    " EE                  CC ",
    "EU                   CXX",
    "UU                    XX",
    "UU                    XX",
    "UUQ                   XZ",
    " QQ                  ZZ ",
    "  QQ               ZZZ  ",
    "   QAAAAAAAAAAAAAAAAZ   ",
    "    QAAAAAAAAAAAAAAA    ",
];

/// Names of the built-in layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    #[default]
    FigureEight,
    Oval,
}

impl Layout {
    pub fn rows(self) -> &'static [&'static str] {
        match self {
            Layout::FigureEight => FIGURE_EIGHT,
            Layout::Oval => OVAL,
        }
    }

    pub fn build(self) -> anyhow::Result<Track> {
        Track::from_rows(self.rows()).with_context(|| format!("Built-in layout {} is malformed", self))
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Layout::FigureEight => "figure-eight",
            Layout::Oval => "oval",
        };
        f.write_str(name)
    }
}

impl FromStr for Layout {
    type Err = anyhow::Error;

    fn from_str(name: &str) -> anyhow::Result<Self> {
        match name {
            "figure-eight" => Ok(Layout::FigureEight),
            "oval" => Ok(Layout::Oval),
            other => anyhow::bail!("Unknown track layout '{}' (expected figure-eight or oval)", other),
        }
    }
}

/// Load a track from a layout file
pub fn load_track_file(path: &std::path::Path) -> anyhow::Result<Track> {
    let layout = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read track file {}", path.display()))?;
    Track::parse(&layout).with_context(|| format!("Track file {} is malformed", path.display()))
}
