//! Color palette and preset styles.
//!
//! Green brand colors on a dark slate background; severity colors run from
//! emerald through amber to red so a result reads at a glance.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::{BmiBand, ObesityCategory, Severity};

/// Application theme.
pub struct TriageTheme;

impl TriageTheme {
    // === Brand ===

    /// Forest green, the primary accent
    pub const PRIMARY: Color = Color::Rgb(34, 139, 94); // #228B5E

    /// Mint for highlights and focused fields
    pub const PRIMARY_LIGHT: Color = Color::Rgb(110, 231, 160); // #6EE7A0

    /// Deep green for header bars
    pub const PRIMARY_DARK: Color = Color::Rgb(20, 83, 45); // #14532D

    /// Light slate for borders
    pub const BORDER: Color = Color::Rgb(148, 163, 184); // #94A3B8

    // === Severity ===

    /// Emerald - normal weight, score 0
    pub const SUCCESS: Color = Color::Rgb(16, 185, 129); // #10B981

    /// Amber - overweight, moderate scores
    pub const WARNING: Color = Color::Rgb(245, 158, 11); // #F59E0B

    /// Red - obesity classes, errors
    pub const DANGER: Color = Color::Rgb(239, 68, 68); // #EF4444

    /// Sky blue - underweight, notes
    pub const INFO: Color = Color::Rgb(56, 189, 248); // #38BDF8

    // === Background ===

    /// Near-black, used as text on selected cells
    pub const BG_DARK: Color = Color::Rgb(17, 24, 39); // #111827

    // === Text ===

    /// Primary text (near-white)
    pub const TEXT_PRIMARY: Color = Color::Rgb(243, 244, 246); // #F3F4F6

    /// Secondary text (gray)
    pub const TEXT_SECONDARY: Color = Color::Rgb(156, 163, 175); // #9CA3AF

    /// Muted text and unknown chart series
    pub const TEXT_MUTED: Color = Color::Rgb(107, 114, 128); // #6B7280

    /// One color per dataset class, lightest to darkest risk.
    pub const CATEGORY: [Color; 7] = [
        Color::Rgb(56, 189, 248),  // Insufficient_Weight
        Color::Rgb(16, 185, 129),  // Normal_Weight
        Color::Rgb(250, 204, 21),  // Overweight_Level_I
        Color::Rgb(245, 158, 11),  // Overweight_Level_II
        Color::Rgb(249, 115, 22),  // Obesity_Type_I
        Color::Rgb(239, 68, 68),   // Obesity_Type_II
        Color::Rgb(190, 18, 60),   // Obesity_Type_III
    ];

    /// Style for titles
    #[must_use]
    pub fn title() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for panel titles
    #[must_use]
    pub fn subtitle() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for normal text
    #[must_use]
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    /// Style for secondary text
    #[must_use]
    pub fn text_secondary() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// Style for muted text
    #[must_use]
    pub fn text_muted() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    /// Style for healthy values
    #[must_use]
    pub fn success() -> Style {
        Style::default().fg(Self::SUCCESS)
    }

    /// Style for moderate values and warnings
    #[must_use]
    pub fn warning() -> Style {
        Style::default().fg(Self::WARNING)
    }

    /// Style for high-risk values and errors
    #[must_use]
    pub fn danger() -> Style {
        Style::default().fg(Self::DANGER)
    }

    /// Style for informational notes
    #[must_use]
    pub fn info() -> Style {
        Style::default().fg(Self::INFO)
    }

    /// Highlighted choice or active tab
    #[must_use]
    pub fn selected() -> Style {
        Style::default()
            .fg(Self::BG_DARK)
            .bg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for the focused form field label
    #[must_use]
    pub fn focused() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for the input cursor
    #[must_use]
    pub fn cursor() -> Style {
        Style::default().fg(Self::PRIMARY_LIGHT)
    }

    /// Style for panel borders
    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::BORDER)
    }

    /// Style for the focused field border
    #[must_use]
    pub fn border_focused() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    /// Style for table headers
    #[must_use]
    pub fn header() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .bg(Self::PRIMARY_DARK)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for key hints in footers
    #[must_use]
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for key hint descriptions
    #[must_use]
    pub fn key_desc() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// Style for a result's severity
    #[must_use]
    pub fn severity(severity: Severity) -> Style {
        match severity {
            Severity::Low => Self::success(),
            Severity::Moderate => Self::warning(),
            Severity::High => Self::danger(),
        }
    }

    /// Style for a BMI band
    #[must_use]
    pub fn bmi_band(band: BmiBand) -> Style {
        match band {
            BmiBand::Underweight => Self::info(),
            BmiBand::Normal => Self::success(),
            BmiBand::Overweight => Self::warning(),
            _ => Self::danger(),
        }
    }

    /// Chart color for a class label; unknown labels get the muted color.
    #[must_use]
    pub fn category_color(label: &str) -> Color {
        ObesityCategory::from_label(label)
            .and_then(|c| ObesityCategory::ALL.iter().position(|x| *x == c))
            .map_or(Self::TEXT_MUTED, |i| Self::CATEGORY[i])
    }

    /// Risk score out of 3: 0 green, 1 plain, 2 amber, 3 red.
    #[must_use]
    pub fn score(score: u8) -> Style {
        match score {
            0 => Self::success(),
            1 => Self::text(),
            2 => Self::warning(),
            _ => Self::danger(),
        }
    }
}
