//! Cinematic settings applied to the final synthesis request.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Output frame shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub enum AspectRatio {
    /// Vertical 9:16
    #[default]
    #[serde(rename = "9:16")]
    Portrait,
    /// Landscape 16:9
    #[serde(rename = "16:9")]
    Landscape,
}

impl AspectRatio {
    pub const ALL: &'static [AspectRatio] = &[AspectRatio::Portrait, AspectRatio::Landscape];

    /// Wire value sent to the video model.
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Portrait => "9:16",
            AspectRatio::Landscape => "16:9",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AspectRatio::Portrait => "Vertical",
            AspectRatio::Landscape => "Landscape",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = SettingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "9:16" | "portrait" | "vertical" => Ok(AspectRatio::Portrait),
            "16:9" | "landscape" => Ok(AspectRatio::Landscape),
            _ => Err(SettingParseError::new("aspect ratio", s)),
        }
    }
}

/// Color grading look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ColorGrade {
    /// Flat, no grade clause
    #[default]
    None,
    /// Hollywood teal and orange
    TealOrange,
    /// Black and white noir
    Noir,
    /// Neon cyberpunk
    Cyber,
    /// Golden hour
    Golden,
}

impl ColorGrade {
    pub const ALL: &'static [ColorGrade] = &[
        ColorGrade::None,
        ColorGrade::TealOrange,
        ColorGrade::Noir,
        ColorGrade::Cyber,
        ColorGrade::Golden,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorGrade::None => "none",
            ColorGrade::TealOrange => "teal-orange",
            ColorGrade::Noir => "noir",
            ColorGrade::Cyber => "cyber",
            ColorGrade::Golden => "golden",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColorGrade::None => "Flat",
            ColorGrade::TealOrange => "Hollywood",
            ColorGrade::Noir => "Noir",
            ColorGrade::Cyber => "Neon",
            ColorGrade::Golden => "Golden",
        }
    }
}

impl fmt::Display for ColorGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ColorGrade {
    type Err = SettingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "flat" => Ok(ColorGrade::None),
            "teal-orange" | "teal_orange" | "hollywood" => Ok(ColorGrade::TealOrange),
            "noir" => Ok(ColorGrade::Noir),
            "cyber" | "neon" => Ok(ColorGrade::Cyber),
            "golden" => Ok(ColorGrade::Golden),
            _ => Err(SettingParseError::new("color grade", s)),
        }
    }
}

/// Atmospheric effect layered over the render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AtmosphericFx {
    #[default]
    None,
    Particles,
    Mist,
    Flares,
}

impl AtmosphericFx {
    pub const ALL: &'static [AtmosphericFx] = &[
        AtmosphericFx::None,
        AtmosphericFx::Particles,
        AtmosphericFx::Mist,
        AtmosphericFx::Flares,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AtmosphericFx::None => "none",
            AtmosphericFx::Particles => "particles",
            AtmosphericFx::Mist => "mist",
            AtmosphericFx::Flares => "flares",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AtmosphericFx::None => "Clean",
            AtmosphericFx::Particles => "Dust/Ember",
            AtmosphericFx::Mist => "Mist/Fog",
            AtmosphericFx::Flares => "Lens Flares",
        }
    }
}

impl fmt::Display for AtmosphericFx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AtmosphericFx {
    type Err = SettingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "clean" => Ok(AtmosphericFx::None),
            "particles" | "dust" | "ember" => Ok(AtmosphericFx::Particles),
            "mist" | "fog" => Ok(AtmosphericFx::Mist),
            "flares" | "lens-flares" => Ok(AtmosphericFx::Flares),
            _ => Err(SettingParseError::new("atmospheric fx", s)),
        }
    }
}

/// Output resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub enum Resolution {
    #[serde(rename = "720p")]
    Hd720,
    #[default]
    #[serde(rename = "1080p")]
    Hd1080,
}

impl Resolution {
    pub const ALL: &'static [Resolution] = &[Resolution::Hd720, Resolution::Hd1080];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Hd720 => "720p",
            Resolution::Hd1080 => "1080p",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Resolution::Hd720 => "720p (Fast)",
            Resolution::Hd1080 => "1080p (HQ)",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = SettingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "720p" | "720" => Ok(Resolution::Hd720),
            "1080p" | "1080" => Ok(Resolution::Hd1080),
            _ => Err(SettingParseError::new("resolution", s)),
        }
    }
}

/// Stylistic parameters for one run.
///
/// `Copy` so a run takes a snapshot at submission; later edits never reach
/// an in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CinematicSettings {
    pub aspect_ratio: AspectRatio,
    pub color_grade: ColorGrade,
    pub fx: AtmosphericFx,
    pub resolution: Resolution,
}

impl CinematicSettings {
    pub fn new(
        aspect_ratio: AspectRatio,
        color_grade: ColorGrade,
        fx: AtmosphericFx,
        resolution: Resolution,
    ) -> Self {
        Self {
            aspect_ratio,
            color_grade,
            fx,
            resolution,
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown {kind}: {value}")]
pub struct SettingParseError {
    kind: &'static str,
    value: String,
}

impl SettingParseError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = CinematicSettings::default();
        assert_eq!(settings.aspect_ratio, AspectRatio::Portrait);
        assert_eq!(settings.color_grade, ColorGrade::None);
        assert_eq!(settings.fx, AtmosphericFx::None);
        assert_eq!(settings.resolution, Resolution::Hd1080);
    }

    #[test]
    fn test_settings_parse() {
        assert_eq!("16:9".parse::<AspectRatio>().unwrap(), AspectRatio::Landscape);
        assert_eq!("teal-orange".parse::<ColorGrade>().unwrap(), ColorGrade::TealOrange);
        assert_eq!("Mist".parse::<AtmosphericFx>().unwrap(), AtmosphericFx::Mist);
        assert_eq!("720p".parse::<Resolution>().unwrap(), Resolution::Hd720);
        assert!("4:3".parse::<AspectRatio>().is_err());
        assert!("sepia".parse::<ColorGrade>().is_err());
    }

    #[test]
    fn test_settings_wire_format() {
        let settings = CinematicSettings::new(
            AspectRatio::Landscape,
            ColorGrade::TealOrange,
            AtmosphericFx::Flares,
            Resolution::Hd720,
        );
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"aspectRatio\":\"16:9\""));
        assert!(json.contains("\"colorGrade\":\"teal-orange\""));
        assert!(json.contains("\"fx\":\"flares\""));
        assert!(json.contains("\"resolution\":\"720p\""));
    }

    #[test]
    fn test_labels() {
        assert_eq!(ColorGrade::Cyber.label(), "Neon");
        assert_eq!(AtmosphericFx::Particles.label(), "Dust/Ember");
        assert_eq!(Resolution::Hd1080.label(), "1080p (HQ)");
        assert_eq!(ColorGrade::ALL.len(), 5);
        assert_eq!(AtmosphericFx::ALL.len(), 4);
    }
}
