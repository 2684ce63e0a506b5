use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

pub mod config;
pub mod error;
pub mod fusion;
pub mod mask;
pub mod report;

pub use config::{PatternConfig, PatternSet};
pub use error::{AnalyzeError, ConfigError};
pub use fusion::negative_ratio;
pub use mask::mask_pii;
pub use report::IntakeReport;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// Life-domain topic categories, in table declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Theme {
    #[serde(rename = "수면")]
    Sleep,
    #[serde(rename = "업무/학업")]
    WorkStudy,
    #[serde(rename = "대인/가족")]
    Relationships,
    #[serde(rename = "건강/신체")]
    Health,
    #[serde(rename = "금전/생활")]
    Finances,
}

impl Theme {
    pub const ALL: [Theme; 5] = [
        Theme::Sleep,
        Theme::WorkStudy,
        Theme::Relationships,
        Theme::Health,
        Theme::Finances,
    ];

    /// Key used in pattern files.
    pub fn key(self) -> &'static str {
        match self {
            Theme::Sleep => "sleep",
            Theme::WorkStudy => "work_study",
            Theme::Relationships => "relationships",
            Theme::Health => "health",
            Theme::Finances => "finances",
        }
    }
}

/// Affect categories, in table declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Emotion {
    #[serde(rename = "불안")]
    Anxiety,
    #[serde(rename = "슬픔")]
    Sadness,
    #[serde(rename = "분노")]
    Anger,
    #[serde(rename = "무기력")]
    Listlessness,
    #[serde(rename = "희망")]
    Hope,
}

impl Emotion {
    pub const ALL: [Emotion; 5] = [
        Emotion::Anxiety,
        Emotion::Sadness,
        Emotion::Anger,
        Emotion::Listlessness,
        Emotion::Hope,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Emotion::Anxiety => "anxiety",
            Emotion::Sadness => "sadness",
            Emotion::Anger => "anger",
            Emotion::Listlessness => "listlessness",
            Emotion::Hope => "hope",
        }
    }
}

/// Per-category match counts. Every category of the table is always present.
pub type Tally<K> = BTreeMap<K, usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scores {
    pub depression: i32,
    pub anxiety: i32,
    pub stress: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Risk {
    /// 0 (none), 60 (elevated) or 80 (critical).
    pub level: i32,
    /// Distinct risk patterns that matched anywhere in the session.
    pub hits: BTreeSet<String>,
    pub need_immediate_help: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub scores: Scores,
    pub risk: Risk,
    pub themes: Tally<Theme>,
    pub top_themes: Vec<Theme>,
    pub emotions: Tally<Emotion>,
    pub highlights: Vec<String>,
}

// ---------------------------------------------------------------------------
// Hyperparameters
// ---------------------------------------------------------------------------

struct Hyperparameters {
    risk_elevated: i32,
    risk_critical: i32,
    unit_cap: usize,
    top_theme_count: usize,
    highlight_window: usize,
    highlight_max: usize,
    score_min: i32,
    score_max: i32,
    dep_sadness: i32,
    dep_listless: i32,
    dep_sleep_unit: i32,
    dep_interpersonal: i32,
    dep_interpersonal_min: usize,
    dep_risk: i32,
    anx_anxiety: i32,
    anx_health_unit: i32,
    anx_work_unit: i32,
    anx_listless: i32,
    anx_risk: i32,
    stress_work_unit: i32,
    stress_interpersonal_unit: i32,
    stress_financial_unit: i32,
    stress_anger: i32,
    stress_sleep_unit: i32,
}

static HP: Hyperparameters = Hyperparameters {
    risk_elevated: 60,
    risk_critical: 80,
    unit_cap: 2,
    top_theme_count: 3,
    highlight_window: 5,
    highlight_max: 2,
    score_min: 0,
    score_max: 100,
    dep_sadness: 20,
    dep_listless: 20,
    dep_sleep_unit: 10,
    dep_interpersonal: 10,
    dep_interpersonal_min: 2,
    dep_risk: 30,
    anx_anxiety: 25,
    anx_health_unit: 10,
    anx_work_unit: 10,
    anx_listless: 20,
    anx_risk: 20,
    stress_work_unit: 15,
    stress_interpersonal_unit: 15,
    stress_financial_unit: 15,
    stress_anger: 15,
    stress_sleep_unit: 10,
};

// ---------------------------------------------------------------------------
// Built-in pattern tables
// ---------------------------------------------------------------------------

pub(crate) const RISK_PATTERNS: &[&str] = &[
    r"죽고\s*싶",
    r"생을\s*마감",
    r"자해",
    r"해치고\s*싶",
    r"폭력\s*충동",
    r"절망감",
    r"살\s*의미가\s*없",
    r"무가치",
    r"없어졌으면\s*하",
    r"사라지고\s*싶",
];

/// Death-ideation and self-harm roots.
pub(crate) const CRITICAL_ROOTS: &[&str] = &["죽고", "자해"];

pub(crate) fn theme_patterns(theme: Theme) -> &'static [&'static str] {
    match theme {
        Theme::Sleep => &[
            r"불면",
            r"잠[이도]?\s*안",
            r"잠을?\s*못",
            r"잠들기\s*어려",
            r"새벽(에)?\s*깨",
            r"악몽",
            r"수면",
            r"깨(었|요|요\.)",
        ],
        Theme::WorkStudy => &[
            r"업무",
            r"야근",
            r"퇴근이?\s*늦",
            r"성과\s*압박",
            r"과제",
            r"시험",
            r"공부\s*스트레스",
            r"회사",
            r"출근",
            r"보고서",
        ],
        Theme::Relationships => &[
            r"대인",
            r"사람\s*만나",
            r"친구",
            r"연인",
            r"갈등",
            r"가족",
            r"고립",
            r"혼자",
            r"외롭",
        ],
        Theme::Health => &[
            r"두통",
            r"소화",
            r"심장[이]?\s*두근",
            r"숨(이)?\s*막히",
            r"호흡\s*곤란",
            r"가슴\s*답답",
            r"피로",
            r"무기력",
        ],
        Theme::Finances => &[r"돈\s*걱정", r"월세", r"대출", r"빚", r"생활비", r"가계"],
    }
}

pub(crate) fn emotion_patterns(emotion: Emotion) -> &'static [&'static str] {
    match emotion {
        Emotion::Anxiety => &[r"불안", r"초조", r"긴장", r"걱정", r"두렵"],
        Emotion::Sadness => &[r"우울", r"슬픔", r"눈물", r"허무", r"외롭"],
        Emotion::Anger => &[r"화가", r"분노", r"짜증", r"억울"],
        Emotion::Listlessness => &[
            r"의욕이?\s*없",
            r"무기력",
            r"피곤만",
            r"아무것도\s*하[지긴]\s*싫",
        ],
        Emotion::Hope => &[r"괜찮아질", r"도움이\s*될", r"해볼\s*수\s*있", r"나아질"],
    }
}

pub(crate) static BUILTIN_PATTERNS: Lazy<PatternSet> = Lazy::new(|| {
    PatternConfig::default()
        .compile()
        .expect("built-in pattern tables compile")
});

// ---------------------------------------------------------------------------
// Passes
// ---------------------------------------------------------------------------

fn count_matches(line: &str, patterns: &[Regex]) -> usize {
    patterns.iter().filter(|rx| rx.is_match(line)).count()
}

fn detect_risk(lines: &[String], patterns: &PatternSet) -> Risk {
    let mut hits = BTreeSet::new();
    for line in lines {
        for rx in &patterns.risk {
            if rx.is_match(line) {
                hits.insert(rx.as_str().to_string());
            }
        }
    }

    let level = if hits.iter().any(|h| patterns.is_critical(h)) {
        HP.risk_critical
    } else if !hits.is_empty() {
        HP.risk_elevated
    } else {
        0
    };

    Risk {
        level,
        hits,
        need_immediate_help: level >= HP.risk_critical,
    }
}

/// Each pattern adds at most one per utterance; distinct patterns add separately.
fn tally<K: Copy + Ord>(lines: &[String], table: &[(K, Vec<Regex>)]) -> Tally<K> {
    table
        .iter()
        .map(|(key, regexes)| {
            let count: usize = lines.iter().map(|l| count_matches(l, regexes)).sum();
            (*key, count)
        })
        .collect()
}

/// Descending by count, zero counts dropped, ties keep declaration order.
fn top_themes(themes: &Tally<Theme>) -> Vec<Theme> {
    let mut ranked: Vec<(Theme, usize)> = Theme::ALL
        .iter()
        .map(|t| (*t, themes.get(t).copied().unwrap_or(0)))
        .filter(|(_, count)| *count > 0)
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .take(HP.top_theme_count)
        .map(|(t, _)| t)
        .collect()
}

fn select_highlights<S: AsRef<str>>(
    utterances: &[S],
    lines: &[String],
    patterns: &PatternSet,
) -> Vec<String> {
    let start = lines.len().saturating_sub(HP.highlight_window);
    let mut highlights = Vec::new();
    for (original, line) in utterances[start..].iter().zip(&lines[start..]) {
        let emotional = patterns
            .emotions
            .iter()
            .any(|(_, regexes)| regexes.iter().any(|rx| rx.is_match(line)));
        if emotional {
            highlights.push(original.as_ref().to_string());
        }
        if highlights.len() >= HP.highlight_max {
            break;
        }
    }
    highlights
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

fn flag(condition: bool) -> i32 {
    i32::from(condition)
}

fn units(count: usize) -> i32 {
    // Bounded by unit_cap, so the cast never truncates.
    count.min(HP.unit_cap) as i32
}

fn clamp_score(raw: i32) -> i32 {
    raw.clamp(HP.score_min, HP.score_max)
}

// Depression and anxiety both weigh the risk tier and listlessness; keep the overlap.
fn compute_scores(themes: &Tally<Theme>, emotions: &Tally<Emotion>, risk: &Risk) -> Scores {
    let theme = |t: Theme| themes.get(&t).copied().unwrap_or(0);
    let emotion = |e: Emotion| emotions.get(&e).copied().unwrap_or(0);
    let at_risk = risk.level >= HP.risk_elevated;

    let mut dep = 0;
    dep += HP.dep_sadness * flag(emotion(Emotion::Sadness) > 0);
    dep += HP.dep_listless * flag(emotion(Emotion::Listlessness) > 0);
    dep += HP.dep_sleep_unit * units(theme(Theme::Sleep));
    dep += HP.dep_interpersonal * flag(theme(Theme::Relationships) >= HP.dep_interpersonal_min);
    dep += HP.dep_risk * flag(at_risk);

    let mut anx = 0;
    anx += HP.anx_anxiety * flag(emotion(Emotion::Anxiety) > 0);
    anx += HP.anx_health_unit * units(theme(Theme::Health));
    anx += HP.anx_work_unit * units(theme(Theme::WorkStudy));
    anx += HP.anx_listless * flag(emotion(Emotion::Listlessness) > 0);
    anx += HP.anx_risk * flag(at_risk);

    let mut stress = 0;
    stress += HP.stress_work_unit * units(theme(Theme::WorkStudy));
    stress += HP.stress_interpersonal_unit * units(theme(Theme::Relationships));
    stress += HP.stress_financial_unit * units(theme(Theme::Finances));
    stress += HP.stress_anger * flag(emotion(Emotion::Anger) > 0);
    stress += HP.stress_sleep_unit * units(theme(Theme::Sleep));

    Scores {
        depression: clamp_score(dep),
        anxiety: clamp_score(anx),
        stress: clamp_score(stress),
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Analyze a session's user utterances against the built-in tables.
pub fn analyze<S: AsRef<str>>(utterances: &[S]) -> Analysis {
    analyze_with(PatternSet::builtin(), utterances)
}

/// Analyze a session's user utterances, oldest first.
///
/// Utterances are expected to be PII-masked already. Matching runs on a
/// lower-cased copy; highlights carry the caller's original strings.
pub fn analyze_with<S: AsRef<str>>(patterns: &PatternSet, utterances: &[S]) -> Analysis {
    let lines: Vec<String> = utterances
        .iter()
        .map(|u| u.as_ref().to_lowercase())
        .collect();

    let risk = detect_risk(&lines, patterns);
    let themes = tally(&lines, &patterns.themes);
    let emotions = tally(&lines, &patterns.emotions);
    let scores = compute_scores(&themes, &emotions, &risk);
    let top_themes = top_themes(&themes);
    let highlights = select_highlights(utterances, &lines, patterns);

    debug!(
        utterances = lines.len(),
        risk_level = risk.level,
        depression = scores.depression,
        anxiety = scores.anxiety,
        stress = scores.stress,
        highlights = highlights.len(),
        "analysis complete"
    );
    if risk.need_immediate_help {
        warn!(hits = risk.hits.len(), "critical risk language detected");
    }

    Analysis {
        scores,
        risk,
        themes,
        top_themes,
        emotions,
        highlights,
    }
}

/// Analyze untyped input: a JSON array whose entries must all be strings.
pub fn analyze_value(
    patterns: &PatternSet,
    value: &serde_json::Value,
) -> Result<Analysis, AnalyzeError> {
    let entries = value.as_array().ok_or_else(|| {
        AnalyzeError::InvalidInput(format!(
            "expected an array of strings, got {}",
            error::json_type_name(value)
        ))
    })?;

    let utterances = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            entry.as_str().ok_or_else(|| {
                AnalyzeError::InvalidInput(format!(
                    "entry {index} is a {}, expected a string",
                    error::json_type_name(entry)
                ))
            })
        })
        .collect::<Result<Vec<&str>, _>>()?;

    Ok(analyze_with(patterns, &utterances))
}
