//! Blending an external sentiment classifier into the rule scores.
//!
//! The classifier itself lives outside this crate. Callers hand over the
//! labels it produced; the rule scores stay authoritative and fusion always
//! yields a fresh [`Scores`] value.

use crate::error::AnalyzeError;
use crate::Scores;

const SAMPLE_WINDOW: usize = 5;
const RULE_WEIGHT: f64 = 0.8;
const MODEL_WEIGHT: f64 = 0.2;

/// Share of negative labels among the last five classifier outputs.
///
/// Label vocabularies differ between models: anything containing `NEG`
/// (case-insensitive) or the digit `1` counts as negative.
pub fn negative_ratio<S: AsRef<str>>(labels: &[S]) -> f64 {
    let sample = &labels[labels.len().saturating_sub(SAMPLE_WINDOW)..];
    let negatives = sample
        .iter()
        .filter(|label| {
            let label = label.as_ref();
            label.to_uppercase().contains("NEG") || label.contains('1')
        })
        .count();
    negatives as f64 / sample.len().max(1) as f64
}

impl Scores {
    /// `round(0.8 * rule + 0.2 * neg_ratio * 100)` per score, ties to even.
    pub fn fuse(&self, neg_ratio: f64) -> Result<Scores, AnalyzeError> {
        if !(0.0..=1.0).contains(&neg_ratio) {
            return Err(AnalyzeError::InvalidRatio(neg_ratio));
        }
        let blend = |rule: i32| {
            let fused = RULE_WEIGHT * f64::from(rule) + MODEL_WEIGHT * (neg_ratio * 100.0);
            (fused.round_ties_even() as i32).clamp(0, 100)
        };
        Ok(Scores {
            depression: blend(self.depression),
            anxiety: blend(self.anxiety),
            stress: blend(self.stress),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_neg_and_label_one_as_negative() {
        let labels = ["NEGATIVE", "POSITIVE", "LABEL_1", "LABEL_0"];
        assert_eq!(negative_ratio(&labels), 0.5);
        assert_eq!(negative_ratio(&["negative"]), 1.0);
    }

    #[test]
    fn samples_only_the_last_five() {
        let labels = [
            "NEGATIVE", "POSITIVE", "POSITIVE", "POSITIVE", "POSITIVE", "POSITIVE",
        ];
        assert_eq!(negative_ratio(&labels), 0.0);
    }

    #[test]
    fn empty_labels_give_zero() {
        let labels: [&str; 0] = [];
        assert_eq!(negative_ratio(&labels), 0.0);
    }

    #[test]
    fn fuse_blends_without_touching_source() {
        let rule = Scores {
            depression: 50,
            anxiety: 40,
            stress: 0,
        };
        let fused = rule.fuse(0.5).unwrap();
        assert_eq!(
            fused,
            Scores {
                depression: 50,
                anxiety: 42,
                stress: 10,
            }
        );
        assert_eq!(rule.depression, 50);
        assert_eq!(rule.anxiety, 40);
    }

    #[test]
    fn fuse_with_zero_ratio_scales_down() {
        let rule = Scores {
            depression: 100,
            anxiety: 30,
            stress: 15,
        };
        let fused = rule.fuse(0.0).unwrap();
        assert_eq!(fused.depression, 80);
        assert_eq!(fused.anxiety, 24);
        assert_eq!(fused.stress, 12);
    }

    #[test]
    fn fuse_rejects_out_of_range_ratio() {
        let rule = Scores {
            depression: 0,
            anxiety: 0,
            stress: 0,
        };
        assert_eq!(rule.fuse(1.5), Err(AnalyzeError::InvalidRatio(1.5)));
        assert!(rule.fuse(f64::NAN).is_err());
        assert!(rule.fuse(-0.1).is_err());
    }
}
