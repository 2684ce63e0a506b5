//! End-of-session intake report built from an [`Analysis`].

use serde::Serialize;

use crate::error::AnalyzeError;
use crate::{Analysis, Emotion, Risk, Scores, Tally, Theme};

pub const DISCLAIMER: &str =
    "본 리포트는 상담 전 사전 점검용 참고자료이며, 진단·치료가 아닙니다.";

pub const SAFETY_NOTICE: &str = "위험 신호가 감지되었습니다. 도움이 필요하시면 즉시 1393(자살예방상담전화) 또는 112에 연락하세요.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntakeReport {
    pub summary: Summary,
    pub details: Details,
    /// Crisis-line notice, empty unless immediate help is needed.
    pub safety_notice: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub top_issues: Vec<Theme>,
    pub scores: Scores,
    pub risk: Risk,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Details {
    pub themes: Tally<Theme>,
    pub emotions: Tally<Emotion>,
    pub highlights: Vec<String>,
    pub disclaimer: String,
}

impl IntakeReport {
    pub fn from_analysis(analysis: &Analysis) -> Self {
        let safety_notice = if analysis.risk.need_immediate_help {
            SAFETY_NOTICE.to_string()
        } else {
            String::new()
        };

        Self {
            summary: Summary {
                top_issues: analysis.top_themes.clone(),
                scores: analysis.scores,
                risk: analysis.risk.clone(),
            },
            details: Details {
                themes: analysis.themes.clone(),
                emotions: analysis.emotions.clone(),
                highlights: analysis.highlights.clone(),
                disclaimer: DISCLAIMER.to_string(),
            },
            safety_notice,
        }
    }

    /// Replace the summary scores with scores blended with an external negative ratio.
    pub fn with_fusion(mut self, neg_ratio: f64) -> Result<Self, AnalyzeError> {
        self.summary.scores = self.summary.scores.fuse(neg_ratio)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze;

    #[test]
    fn critical_session_carries_safety_notice() {
        let analysis = analyze(&["죽고 싶어요"]);
        let report = IntakeReport::from_analysis(&analysis);
        assert!(report.summary.risk.need_immediate_help);
        assert!(report.safety_notice.contains("1393"));
        assert_eq!(report.details.disclaimer, DISCLAIMER);
    }

    #[test]
    fn quiet_session_has_empty_notice() {
        let analysis = analyze(&["오늘은 날씨가 좋네요"]);
        let report = IntakeReport::from_analysis(&analysis);
        assert!(report.safety_notice.is_empty());
        assert!(report.summary.top_issues.is_empty());
    }

    #[test]
    fn fusion_changes_report_but_not_analysis() {
        let analysis = analyze(&["우울하고 잠을 못 자요"]);
        let report = IntakeReport::from_analysis(&analysis)
            .with_fusion(1.0)
            .unwrap();
        assert_eq!(analysis.scores.depression, 30);
        assert_eq!(report.summary.scores.depression, 44);
        assert_eq!(report.details.themes, analysis.themes);
    }

    #[test]
    fn serializes_with_report_field_names() {
        let analysis = analyze(&["회사 업무가 많아서 걱정이에요"]);
        let json = serde_json::to_value(IntakeReport::from_analysis(&analysis)).unwrap();
        assert_eq!(json["summary"]["top_issues"][0], "업무/학업");
        assert_eq!(json["details"]["themes"]["업무/학업"], 2);
        assert_eq!(json["details"]["emotions"]["불안"], 1);
        assert_eq!(json["safety_notice"], "");
    }
}
