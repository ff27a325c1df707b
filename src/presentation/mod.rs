//! Display helpers for the dashboard overview: compact stat formatting,
//! stat cards, navigation and quick actions.

use serde::Serialize;

const UNITS: [(u128, &str); 3] = [(1_000, "K"), (1_000_000, "M"), (1_000_000_000, "B")];

/// Compact human form of a count: `950`, `12.5K`, `3M`, `1.2B`.
/// One decimal place, rounded half up, with a trailing `.0` dropped.
pub fn format_compact(value: i64) -> String {
    let magnitude = u128::from(value.unsigned_abs());
    if magnitude < 1_000 {
        return value.to_string();
    }

    let sign = if value < 0 { "-" } else { "" };
    let tenths = |unit: u128| (magnitude * 10 + unit / 2) / unit;
    let (unit, suffix) = UNITS
        .iter()
        .find(|(unit, _)| tenths(*unit) < 10_000)
        .unwrap_or(&UNITS[UNITS.len() - 1]);

    let rounded = tenths(*unit);
    match rounded % 10 {
        0 => format!("{}{}{}", sign, rounded / 10, suffix),
        frac => format!("{}{}.{}{}", sign, rounded / 10, frac, suffix),
    }
}

/// Missing values render as `"0"`
pub fn format_stat(value: Option<i64>) -> String {
    value.map(format_compact).unwrap_or_else(|| "0".to_string())
}

/// Aggregates shown on the overview. Any of them may be unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_content: Option<i64>,
    pub total_views: Option<i64>,
    pub credits: Option<i64>,
    pub workspaces: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatCard {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
}

pub fn stat_cards(stats: Option<&DashboardStats>) -> Vec<StatCard> {
    let stats = stats.cloned().unwrap_or_default();
    vec![
        StatCard {
            key: "total_content",
            label: "Total Content",
            value: format_stat(stats.total_content),
        },
        StatCard {
            key: "total_views",
            label: "Total Views",
            value: format_stat(stats.total_views),
        },
        StatCard {
            key: "credits",
            label: "Credits",
            value: format_stat(stats.credits),
        },
        StatCard {
            key: "workspaces",
            label: "Workspaces",
            value: format_stat(stats.workspaces),
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Link {
    pub label: &'static str,
    pub href: &'static str,
}

pub const NAVIGATION: &[Link] = &[
    Link { label: "Overview", href: "/dashboard" },
    Link { label: "Content", href: "/content" },
    Link { label: "Workspace", href: "/workspace" },
    Link { label: "Settings", href: "/settings" },
];

pub const QUICK_ACTIONS: &[Link] = &[
    Link { label: "Create content", href: "/content/new" },
    Link { label: "Invite teammates", href: "/workspace/members" },
    Link { label: "Buy credits", href: "/settings/billing" },
];
