//! Pattern table configuration.
//!
//! The engine never hardcodes its tables: it reads a compiled [`PatternSet`].
//! The built-in Korean tables are used unless a `.toml` file overrides them.
//! Any theme or emotion left out of the file keeps its built-in list, so the
//! compiled tables always cover every category.

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;
use crate::{Emotion, Theme};

// ---------------------------------------------------------------------------
// File format
// ---------------------------------------------------------------------------

/// Root of a pattern file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Crisis-language patterns.
    #[serde(default)]
    pub risk: RiskConfig,

    /// Life-domain theme patterns.
    #[serde(default)]
    pub themes: ThemeConfig,

    /// Affect patterns.
    #[serde(default)]
    pub emotions: EmotionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    #[serde(default = "default_risk_patterns")]
    pub patterns: Vec<String>,

    /// Substrings that promote a matched pattern to the critical tier.
    #[serde(default = "default_critical_roots")]
    pub critical_roots: Vec<String>,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            patterns: default_risk_patterns(),
            critical_roots: default_critical_roots(),
        }
    }
}

fn default_risk_patterns() -> Vec<String> {
    owned(crate::RISK_PATTERNS)
}

fn default_critical_roots() -> Vec<String> {
    owned(crate::CRITICAL_ROOTS)
}

fn owned(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    #[serde(default, alias = "수면", skip_serializing_if = "Option::is_none")]
    pub sleep: Option<Vec<String>>,

    #[serde(default, alias = "업무/학업", skip_serializing_if = "Option::is_none")]
    pub work_study: Option<Vec<String>>,

    #[serde(default, alias = "대인/가족", skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Vec<String>>,

    #[serde(default, alias = "건강/신체", skip_serializing_if = "Option::is_none")]
    pub health: Option<Vec<String>>,

    #[serde(default, alias = "금전/생활", skip_serializing_if = "Option::is_none")]
    pub finances: Option<Vec<String>>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        let builtin = |theme| Some(owned(crate::theme_patterns(theme)));
        Self {
            sleep: builtin(Theme::Sleep),
            work_study: builtin(Theme::WorkStudy),
            relationships: builtin(Theme::Relationships),
            health: builtin(Theme::Health),
            finances: builtin(Theme::Finances),
        }
    }
}

impl ThemeConfig {
    fn get(&self, theme: Theme) -> Option<&Vec<String>> {
        match theme {
            Theme::Sleep => self.sleep.as_ref(),
            Theme::WorkStudy => self.work_study.as_ref(),
            Theme::Relationships => self.relationships.as_ref(),
            Theme::Health => self.health.as_ref(),
            Theme::Finances => self.finances.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionConfig {
    #[serde(default, alias = "불안", skip_serializing_if = "Option::is_none")]
    pub anxiety: Option<Vec<String>>,

    #[serde(default, alias = "슬픔", skip_serializing_if = "Option::is_none")]
    pub sadness: Option<Vec<String>>,

    #[serde(default, alias = "분노", skip_serializing_if = "Option::is_none")]
    pub anger: Option<Vec<String>>,

    #[serde(default, alias = "무기력", skip_serializing_if = "Option::is_none")]
    pub listlessness: Option<Vec<String>>,

    #[serde(default, alias = "희망", skip_serializing_if = "Option::is_none")]
    pub hope: Option<Vec<String>>,
}

impl Default for EmotionConfig {
    fn default() -> Self {
        let builtin = |emotion| Some(owned(crate::emotion_patterns(emotion)));
        Self {
            anxiety: builtin(Emotion::Anxiety),
            sadness: builtin(Emotion::Sadness),
            anger: builtin(Emotion::Anger),
            listlessness: builtin(Emotion::Listlessness),
            hope: builtin(Emotion::Hope),
        }
    }
}

impl EmotionConfig {
    fn get(&self, emotion: Emotion) -> Option<&Vec<String>> {
        match emotion {
            Emotion::Anxiety => self.anxiety.as_ref(),
            Emotion::Sadness => self.sadness.as_ref(),
            Emotion::Anger => self.anger.as_ref(),
            Emotion::Listlessness => self.listlessness.as_ref(),
            Emotion::Hope => self.hope.as_ref(),
        }
    }
}

impl PatternConfig {
    /// Load a pattern file from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content)?;
        info!("Loaded pattern tables from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Render the built-in tables as an editable pattern file.
    pub fn default_toml() -> Result<String, ConfigError> {
        let body = toml::to_string_pretty(&Self::default())?;
        Ok(format!(
            "# intake-guard pattern tables\n\
             # Patterns are regular expressions matched against lower-cased utterances.\n\
             # A category left out of this file keeps its built-in patterns.\n\n{body}"
        ))
    }

    /// Compile every table, falling back to the built-in list for absent categories.
    pub fn compile(&self) -> Result<PatternSet, ConfigError> {
        let risk = compile_list("risk", &self.risk.patterns)?;

        let mut themes = Vec::with_capacity(Theme::ALL.len());
        for theme in Theme::ALL {
            let regexes = match self.themes.get(theme) {
                Some(list) => compile_list(theme.key(), list)?,
                None => compile_list(theme.key(), &owned(crate::theme_patterns(theme)))?,
            };
            themes.push((theme, regexes));
        }

        let mut emotions = Vec::with_capacity(Emotion::ALL.len());
        for emotion in Emotion::ALL {
            let regexes = match self.emotions.get(emotion) {
                Some(list) => compile_list(emotion.key(), list)?,
                None => compile_list(emotion.key(), &owned(crate::emotion_patterns(emotion)))?,
            };
            emotions.push((emotion, regexes));
        }

        Ok(PatternSet {
            risk,
            critical_roots: self.risk.critical_roots.clone(),
            themes,
            emotions,
        })
    }
}

fn compile_list(category: &str, patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|source| ConfigError::Pattern {
                category: category.to_string(),
                pattern: p.clone(),
                source,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Compiled tables
// ---------------------------------------------------------------------------

/// Immutable, compiled pattern tables. Cheap to clone and safe to share.
#[derive(Debug, Clone)]
pub struct PatternSet {
    pub(crate) risk: Vec<Regex>,
    pub(crate) critical_roots: Vec<String>,
    /// In [`Theme::ALL`] order.
    pub(crate) themes: Vec<(Theme, Vec<Regex>)>,
    /// In [`Emotion::ALL`] order.
    pub(crate) emotions: Vec<(Emotion, Vec<Regex>)>,
}

impl PatternSet {
    /// The process-wide built-in tables.
    pub fn builtin() -> &'static PatternSet {
        &*crate::BUILTIN_PATTERNS
    }

    pub fn risk_patterns(&self) -> impl Iterator<Item = &str> {
        self.risk.iter().map(|rx| rx.as_str())
    }

    /// Whether a matched risk pattern belongs to the critical tier.
    pub fn is_critical(&self, pattern: &str) -> bool {
        self.critical_roots
            .iter()
            .any(|root| pattern.contains(root.as_str()))
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::builtin().clone()
    }
}
