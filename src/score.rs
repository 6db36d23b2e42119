//! Heuristic privacy score computed from keyword presence in a summary.

const BASE_SCORE: i64 = 100;

/// Keywords weighing against the policy, with the points each one costs.
const NEGATIVE_TIERS: &[(&[&str], i64)] = &[
    (
        &[
            "sell",
            "transfer",
            "disclose",
            "share with third-party",
            "third-party marketing",
            "data sale",
            "profiling",
        ],
        20,
    ),
    (
        &[
            "data sharing",
            "tracking",
            "cookies",
            "data collection",
            "advertising",
            "opt-out",
        ],
        10,
    ),
    (
        &["consent", "personal information", "data retention", "user data"],
        5,
    ),
];

const POSITIVE_KEYWORDS: &[&str] = &[
    "anonymized",
    "encrypted",
    "user control",
    "data protection",
    "no third-party sharing",
    "opt-in",
    "data minimization",
];

const POSITIVE_POINTS: i64 = 5;

const POOR_THRESHOLD: u32 = 50;

/// Scores a policy summary.
///
/// Starts at 100, subtracts 20, 10 or 5 points for every high, medium or low impact
/// keyword present and adds 5 for every positive one. Keywords count once no matter
/// how often they occur. Matching ignores case. The result never drops below 0.
pub fn privacy_score(text: &str) -> u32 {
    let text = text.to_lowercase();
    let present = |keywords: &[&str]| -> i64 {
        keywords
            .iter()
            .filter(|keyword| text.contains(*keyword))
            .count() as i64
    };

    let penalty: i64 = NEGATIVE_TIERS
        .iter()
        .map(|&(keywords, points)| present(keywords) * points)
        .sum();
    let bonus = present(POSITIVE_KEYWORDS) * POSITIVE_POINTS;

    u32::try_from((BASE_SCORE - penalty + bonus).max(0)).unwrap_or(u32::MAX)
}

/// Coarse reading of a score shown next to it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Verdict {
    Poor,
    Good,
}

impl Verdict {
    pub fn from_score(score: u32) -> Self {
        if score < POOR_THRESHOLD {
            Verdict::Poor
        } else {
            Verdict::Good
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Verdict::Poor => "Warning: Poor Privacy Practices",
            Verdict::Good => "Privacy Policy is Good",
        }
    }
}
