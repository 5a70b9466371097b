//! Categorical inputs that shape the coaching prompt.
//!
//! None of these affect pipeline mechanics; they only change prompt wording.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoachError, CoachResult};

/// Discipline being analysed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityCategory {
    /// Two skis (alpine skiing)
    #[default]
    Ski,
    /// One board (snowboarding)
    Snowboard,
}

impl ActivityCategory {
    pub fn athlete(self) -> &'static str {
        match self {
            ActivityCategory::Ski => "skier",
            ActivityCategory::Snowboard => "snowboarder",
        }
    }

    pub fn discipline(self) -> &'static str {
        match self {
            ActivityCategory::Ski => "alpine skiing (two skis)",
            ActivityCategory::Snowboard => "snowboarding (single board)",
        }
    }
}

impl FromStr for ActivityCategory {
    type Err = CoachError;

    fn from_str(s: &str) -> CoachResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "ski" | "skiing" | "alpine" | "double-board" | "two-ski" | "双板" => Ok(Self::Ski),
            "snowboard" | "snowboarding" | "board" | "single-board" | "单板" => Ok(Self::Snowboard),
            _ => Err(CoachError::validation("category", "expected ski or snowboard", s)),
        }
    }
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActivityCategory::Ski => "ski",
            ActivityCategory::Snowboard => "snowboard",
        })
    }
}

/// What the feedback should concentrate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisFocus {
    /// Rhythm and continuity between turns
    #[default]
    Fluidity,
    /// Edge angles, engagement timing and grip
    EdgeControl,
}

impl AnalysisFocus {
    fn guidance(self) -> &'static str {
        match self {
            AnalysisFocus::Fluidity => {
                "Pay particular attention to fluidity: rhythm, flow from one turn into the next, and continuity of movement without stalls or abrupt corrections."
            }
            AnalysisFocus::EdgeControl => {
                "Pay particular attention to edge control: edge angles, timing of edge engagement and release, and grip through the apex of each turn."
            }
        }
    }
}

impl FromStr for AnalysisFocus {
    type Err = CoachError;

    fn from_str(s: &str) -> CoachResult<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "fluidity" | "flow" | "流畅" | "流畅性" => Ok(Self::Fluidity),
            "edge-control" | "edging" | "edge" | "立刃" | "刃控" => Ok(Self::EdgeControl),
            _ => Err(CoachError::validation("type", "expected fluidity or edge-control", s)),
        }
    }
}

impl fmt::Display for AnalysisFocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnalysisFocus::Fluidity => "fluidity",
            AnalysisFocus::EdgeControl => "edge-control",
        })
    }
}

pub const DEFAULT_STANDARD: &str = "PSIA";

/// The three prompt-shaping inputs of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisContext {
    pub category: ActivityCategory,
    /// Teaching-standard vocabulary, e.g. `PSIA`, `CSIA`, `CASI`.
    pub standard: String,
    pub focus: AnalysisFocus,
}

impl Default for AnalysisContext {
    fn default() -> Self {
        Self {
            category: ActivityCategory::default(),
            standard: DEFAULT_STANDARD.to_string(),
            focus: AnalysisFocus::default(),
        }
    }
}

impl AnalysisContext {
    /// Build from raw request strings; absent or blank fields take defaults.
    pub fn from_fields(
        category: Option<&str>,
        standard: Option<&str>,
        focus: Option<&str>,
    ) -> CoachResult<Self> {
        Ok(Self {
            category: present(category)
                .map(str::parse::<ActivityCategory>)
                .transpose()?
                .unwrap_or_default(),
            standard: present(standard).unwrap_or(DEFAULT_STANDARD).to_string(),
            focus: present(focus)
                .map(str::parse::<AnalysisFocus>)
                .transpose()?
                .unwrap_or_default(),
        })
    }

    pub(crate) fn focus_guidance(&self) -> &'static str {
        self.focus.guidance()
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases() {
        assert_eq!("Skiing".parse::<ActivityCategory>().unwrap(), ActivityCategory::Ski);
        assert_eq!("单板".parse::<ActivityCategory>().unwrap(), ActivityCategory::Snowboard);
        assert_eq!("edge_control".parse::<AnalysisFocus>().unwrap(), AnalysisFocus::EdgeControl);
        assert!("sledding".parse::<ActivityCategory>().is_err());
    }

    #[test]
    fn blank_fields_take_defaults() {
        let ctx = AnalysisContext::from_fields(Some(" "), None, Some("")).unwrap();
        assert_eq!(ctx, AnalysisContext::default());
    }

    #[test]
    fn explicit_fields_are_kept() {
        let ctx = AnalysisContext::from_fields(Some("snowboard"), Some("CASI"), Some("edge-control")).unwrap();
        assert_eq!(ctx.category, ActivityCategory::Snowboard);
        assert_eq!(ctx.standard, "CASI");
        assert_eq!(ctx.focus, AnalysisFocus::EdgeControl);
    }

    #[test]
    fn unknown_focus_is_a_validation_error() {
        let err = AnalysisContext::from_fields(None, None, Some("speed")).unwrap_err();
        assert_eq!(err.category(), "validation");
    }
}
