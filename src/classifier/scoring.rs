//! Output scoring
//!
//! Turns raw model outputs into a label decision. Outputs whose maximum is
//! at most 1.0 are taken as probabilities, anything larger as logits.

/// Label reported when nothing is recognized with enough confidence
pub const NO_DETECTION: &str = "None";

/// Winning class of one forward pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopClass {
    pub index: usize,
    /// Confidence in percent (0-100)
    pub confidence: f32,
}

/// Index of the largest score; first one wins on ties. NaN entries are skipped.
pub fn argmax(scores: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in scores.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best
}

/// Softmax probability of the entry holding `max`
fn softmax_at_max(scores: &[f32], max: f32) -> f32 {
    let sum: f32 = scores.iter().map(|v| (v - max).exp()).sum();
    1.0 / sum
}

pub fn top_class(scores: &[f32]) -> Option<TopClass> {
    let (index, max) = argmax(scores)?;
    let probability = if max <= 1.0 {
        max
    } else {
        softmax_at_max(scores, max)
    };

    Some(TopClass {
        index,
        confidence: probability * 100.0,
    })
}

/// Map the winning class to a label, or [`NO_DETECTION`]
pub fn resolve_label<'a>(top: &TopClass, labels: &'a [String], threshold: f32) -> &'a str {
    if top.confidence >= threshold {
        labels.get(top.index).map(String::as_str).unwrap_or(NO_DETECTION)
    } else {
        NO_DETECTION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        vec!["onion".into(), "potato".into(), "no item".into()]
    }

    #[test]
    fn test_argmax_first_wins() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), Some((1, 0.4)));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_argmax_skips_nan() {
        assert_eq!(argmax(&[0.9, f32::NAN, 0.1]), Some((0, 0.9)));
        assert_eq!(argmax(&[f32::NAN]), None);
    }

    #[test]
    fn test_probabilities_used_directly() {
        let top = top_class(&[0.05, 0.9, 0.05]).unwrap();
        assert_eq!(top.index, 1);
        assert!((top.confidence - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_logits_go_through_softmax() {
        // softmax([2, 0, 0])[0] = e^2 / (e^2 + 2)
        let top = top_class(&[2.0, 0.0, 0.0]).unwrap();
        let expected = (2.0f32.exp() / (2.0f32.exp() + 2.0)) * 100.0;
        assert_eq!(top.index, 0);
        assert!((top.confidence - expected).abs() < 1e-3);
    }

    #[test]
    fn test_max_exactly_one_not_softmaxed() {
        let top = top_class(&[1.0, 0.0, 0.0]).unwrap();
        assert!((top.confidence - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_threshold_boundary() {
        let labels = labels();
        let at = TopClass { index: 0, confidence: 60.0 };
        let below = TopClass { index: 0, confidence: 59.99 };
        assert_eq!(resolve_label(&at, &labels, 60.0), "onion");
        assert_eq!(resolve_label(&below, &labels, 60.0), NO_DETECTION);
    }

    #[test]
    fn test_index_beyond_labels() {
        let labels = labels();
        let top = TopClass { index: 5, confidence: 99.0 };
        assert_eq!(resolve_label(&top, &labels, 60.0), NO_DETECTION);
    }
}
