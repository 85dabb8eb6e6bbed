//! Confidence gate.

use crate::classify::ClassificationResult;

/// Top-1 probability below this suppresses results and recommendations.
pub const CONFIDENCE_THRESHOLD: f32 = 0.60;

#[derive(Clone, Debug, PartialEq)]
pub enum GateDecision {
    Accepted(ClassificationResult),
    Rejected { top_probability: f32 },
}

impl GateDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, GateDecision::Accepted(_))
    }
}

/// Accepts a classification only when its top label clears the threshold.
#[derive(Clone, Copy, Debug)]
pub struct ConfidenceGate {
    threshold: f32,
}

impl ConfidenceGate {
    pub fn new() -> Self {
        Self {
            threshold: CONFIDENCE_THRESHOLD,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn admit(&self, result: ClassificationResult) -> GateDecision {
        let top_probability = result.top_probability();
        if result.is_empty() || top_probability < self.threshold {
            GateDecision::Rejected { top_probability }
        } else {
            GateDecision::Accepted(result)
        }
    }
}

impl Default for ConfidenceGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Probability as shown to users: one decimal, percent sign.
pub fn format_percent(probability: f32) -> String {
    format!("{:.1}%", probability as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Prediction;

    fn result(top: f32) -> ClassificationResult {
        ClassificationResult::ranked(vec![
            Prediction::new("A", top),
            Prediction::new("B", 1.0 - top),
        ])
    }

    #[test]
    fn rejects_below_threshold() {
        let gate = ConfidenceGate::new();
        assert_eq!(
            gate.admit(result(0.55)),
            GateDecision::Rejected {
                top_probability: 0.55
            }
        );
    }

    #[test]
    fn accepts_at_threshold() {
        let gate = ConfidenceGate::new();
        assert!(gate.admit(result(0.60)).is_accepted());
        assert!(gate.admit(result(0.82)).is_accepted());
    }

    #[test]
    fn empty_result_is_rejected() {
        let gate = ConfidenceGate::new();
        assert!(!gate.admit(ClassificationResult::ranked(Vec::new())).is_accepted());
    }

    #[test]
    fn percent_has_one_decimal() {
        assert_eq!(format_percent(0.55), "55.0%");
        assert_eq!(format_percent(0.8234), "82.3%");
        assert_eq!(format_percent(1.0), "100.0%");
    }
}
