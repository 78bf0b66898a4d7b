//! Composite trend aggregation and classification.
//!
//! Pure function of the readings, the keyword's prior-run history, and the
//! configured thresholds. No clock, no randomness, no I/O — identical
//! inputs produce byte-identical output, including the explanation text.

use std::collections::BTreeMap;

use trendforge_core::{AggregatorConfig, ConfidenceLabel, SourceReading, TrendCategory};

use crate::error::SignalError;

/// Normalized deviation from the cross-source median beyond which a source
/// is considered to disagree wildly and is halved in weight (never dropped).
const OUTLIER_DEVIATION: f64 = 40.0;

/// Spread (in normalized points) at which cross-source agreement bottoms out.
const MAX_AGREEMENT_SPREAD: f64 = 50.0;

/// A fully classified trend, ready for the store to stamp with a run id.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedTrend {
    pub keyword: String,
    pub score: f64,
    pub velocity: f64,
    pub category: TrendCategory,
    pub confidence: ConfidenceLabel,
    pub confidence_score: f64,
    pub explanation: String,
    pub sources: Vec<String>,
    pub readings: BTreeMap<String, f64>,
}

/// Aggregate one keyword's source readings into a classified trend.
///
/// `prior_scores` holds the keyword's composite scores from prior completed
/// runs, most recent first; an empty slice means a cold keyword (velocity
/// exactly 0.0, never null).
///
/// Returns `Ok(None)` when the trend is collapsing (velocity below the
/// collapse threshold) with a score under the floor — such a trend is
/// dropped rather than misclassified.
///
/// # Errors
///
/// Returns [`SignalError::InsufficientData`] if no reading carries a finite
/// value.
pub fn aggregate(
    keyword: &str,
    readings: &[SourceReading],
    prior_scores: &[f64],
    config: &AggregatorConfig,
) -> Result<Option<AggregatedTrend>, SignalError> {
    // Sort by source name so float summation order never depends on
    // collection order; drop non-finite values and duplicate source names.
    let mut usable: Vec<&SourceReading> = readings.iter().filter(|r| r.value.is_finite()).collect();
    usable.sort_by(|a, b| a.source.cmp(&b.source));
    usable.dedup_by(|a, b| a.source == b.source);

    if usable.is_empty() {
        return Err(SignalError::InsufficientData(keyword.to_string()));
    }

    let normalized: Vec<f64> = usable.iter().map(|r| normalize(r)).collect();
    let median = median_of(&normalized);

    let weights: Vec<f64> = usable
        .iter()
        .zip(&normalized)
        .map(|(reading, &value)| {
            let configured = config
                .source_weights
                .get(&reading.source)
                .copied()
                .unwrap_or(1.0);
            if (value - median).abs() > OUTLIER_DEVIATION {
                configured * 0.5
            } else {
                configured
            }
        })
        .collect();

    let weight_sum: f64 = weights.iter().sum();
    if weight_sum <= 0.0 {
        return Err(SignalError::InsufficientData(keyword.to_string()));
    }
    let score = (normalized
        .iter()
        .zip(&weights)
        .map(|(n, w)| n * w)
        .sum::<f64>()
        / weight_sum)
        .clamp(0.0, 100.0);

    let velocity = velocity_vs_prior(score, prior_scores);

    let Some(category) = classify(score, velocity, prior_scores, config) else {
        return Ok(None);
    };

    let confidence_score = confidence_of(&normalized);
    let confidence = if confidence_score >= config.confidence_high {
        ConfidenceLabel::High
    } else if confidence_score >= config.confidence_medium {
        ConfidenceLabel::Medium
    } else {
        ConfidenceLabel::Low
    };

    let explanation = explain(&usable, &normalized, velocity);

    Ok(Some(AggregatedTrend {
        keyword: keyword.to_string(),
        score,
        velocity,
        category,
        confidence,
        confidence_score,
        explanation,
        sources: usable.iter().map(|r| r.source.clone()).collect(),
        readings: usable.iter().map(|r| (r.source.clone(), r.value)).collect(),
    }))
}

/// Scale a raw reading to 0-100 against the source's own historical range.
///
/// A zero-width range means the provider reports on a fixed ceiling already;
/// the raw value is clamped as-is.
fn normalize(reading: &SourceReading) -> f64 {
    let range = reading.baseline_max - reading.baseline_min;
    if range <= 0.0 || !range.is_finite() {
        return reading.value.clamp(0.0, 100.0);
    }
    ((reading.value - reading.baseline_min) / range * 100.0).clamp(0.0, 100.0)
}

/// Percentage change of `score` versus the most recent prior composite.
///
/// A keyword never seen before — or one whose prior score was 0, leaving no
/// meaningful base — has velocity exactly 0.0.
fn velocity_vs_prior(score: f64, prior_scores: &[f64]) -> f64 {
    match prior_scores.first() {
        Some(&prior) if prior > 0.0 => (score - prior) / prior * 100.0,
        _ => 0.0,
    }
}

/// Deterministic `(score, velocity, history)` classification.
///
/// `None` means the trend is collapsing with too little score left to keep:
/// the caller drops it instead of storing a misleading record.
fn classify(
    score: f64,
    velocity: f64,
    prior_scores: &[f64],
    config: &AggregatorConfig,
) -> Option<TrendCategory> {
    if velocity > config.velocity_spike_pct {
        return Some(TrendCategory::Spiking);
    }
    if velocity < config.velocity_collapse_pct {
        if score >= config.collapse_score_floor {
            return Some(TrendCategory::Stable);
        }
        return None;
    }
    // Moderate positive velocity only counts as emerging once two
    // consecutive completed runs already trended upward.
    if velocity > 0.0 && prior_scores.len() >= 2 && prior_scores[0] > prior_scores[1] {
        return Some(TrendCategory::Emerging);
    }
    Some(TrendCategory::Stable)
}

/// Confidence from source count and cross-source agreement.
///
/// `n/(n+1)` rewards corroboration (1 source → 0.5, 3 → 0.75); the
/// agreement factor decays linearly with the standard deviation of the
/// normalized values, bottoming out at a 50-point spread.
fn confidence_of(normalized: &[f64]) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let n = normalized.len() as f64;
    let source_factor = n / (n + 1.0);

    let mean = normalized.iter().sum::<f64>() / n;
    let variance = normalized.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let agreement = (1.0 - variance.sqrt() / MAX_AGREEMENT_SPREAD).max(0.0);

    (source_factor * agreement).clamp(0.0, 1.0)
}

/// One-sentence explanation citing the dominant source and the velocity
/// direction. Regenerated identically for identical inputs.
fn explain(readings: &[&SourceReading], normalized: &[f64], velocity: f64) -> String {
    let dominant = dominant_source(readings, normalized);
    let direction = if velocity > 0.0 {
        "rising"
    } else if velocity < 0.0 {
        "cooling"
    } else {
        "flat"
    };
    let count = readings.len();
    let noun = if count == 1 { "source" } else { "sources" };
    format!(
        "Led by {} at {:.0}/100 across {count} {noun}; momentum {direction} ({velocity:+.1}% vs prior run).",
        dominant.0, dominant.1,
    )
}

/// The source with the highest normalized value. Ties prefer the larger
/// historical sample size, then the lexicographically smaller name, so the
/// pick is stable.
fn dominant_source<'a>(readings: &[&'a SourceReading], normalized: &[f64]) -> (&'a str, f64) {
    let mut best_idx = 0;
    for idx in 1..readings.len() {
        let better = match normalized[idx].total_cmp(&normalized[best_idx]) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Equal => {
                readings[idx].sample_size > readings[best_idx].sample_size
            }
            std::cmp::Ordering::Less => false,
        };
        if better {
            best_idx = idx;
        }
    }
    (readings[best_idx].source.as_str(), normalized[best_idx])
}

fn median_of(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AggregatorConfig {
        AggregatorConfig::default()
    }

    fn reading(source: &str, value: f64) -> SourceReading {
        SourceReading::new(source, value)
    }

    #[test]
    fn empty_readings_are_insufficient_data() {
        let err = aggregate("daily planner", &[], &[], &config()).unwrap_err();
        assert!(matches!(err, SignalError::InsufficientData(_)));
    }

    #[test]
    fn non_finite_readings_do_not_poison_the_score() {
        let readings = [reading("a", f64::NAN), reading("b", 60.0)];
        let trend = aggregate("daily planner", &readings, &[], &config())
            .expect("aggregate")
            .expect("kept");
        assert_eq!(trend.score, 60.0);
        assert_eq!(trend.sources, vec!["b".to_string()]);
    }

    #[test]
    fn two_equal_weight_sources_average() {
        // Spec scenario: {trendsSource: 80, socialSource: 60}, no history.
        let readings = [reading("trendsSource", 80.0), reading("socialSource", 60.0)];
        let trend = aggregate("daily planner", &readings, &[], &config())
            .expect("aggregate")
            .expect("kept");

        assert!((trend.score - 70.0).abs() < 1e-9, "score {}", trend.score);
        assert_eq!(trend.velocity, 0.0, "cold keyword has exactly zero velocity");
        assert_eq!(trend.category, TrendCategory::Stable);
        // Two agreeing sources: n/(n+1) = 2/3, stddev 10 → agreement 0.8.
        assert!((trend.confidence_score - (2.0 / 3.0) * 0.8).abs() < 1e-9);
        assert_eq!(trend.confidence, ConfidenceLabel::Medium);
    }

    #[test]
    fn identical_inputs_produce_identical_output() {
        let readings = [reading("trendsSource", 80.0), reading("socialSource", 60.0)];
        let prior = [55.0, 40.0];
        let first = aggregate("daily planner", &readings, &prior, &config())
            .expect("aggregate")
            .expect("kept");
        let second = aggregate("daily planner", &readings, &prior, &config())
            .expect("aggregate")
            .expect("kept");
        assert_eq!(first, second);
        assert_eq!(first.explanation, second.explanation);
    }

    #[test]
    fn reading_order_does_not_change_the_result() {
        let forward = [reading("a", 81.0), reading("b", 63.0), reading("c", 44.0)];
        let backward = [reading("c", 44.0), reading("b", 63.0), reading("a", 81.0)];
        let lhs = aggregate("k", &forward, &[], &config()).unwrap().unwrap();
        let rhs = aggregate("k", &backward, &[], &config()).unwrap().unwrap();
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn normalization_uses_the_source_baseline_range() {
        let readings = [SourceReading {
            source: "search_interest".to_string(),
            value: 5.0,
            baseline_min: 0.0,
            baseline_max: 10.0,
            sample_size: 30,
        }];
        let trend = aggregate("k", &readings, &[], &config()).unwrap().unwrap();
        assert_eq!(trend.score, 50.0);
        // Raw value, not the normalized one, is preserved in the readings map.
        assert_eq!(trend.readings.get("search_interest").copied(), Some(5.0));
    }

    #[test]
    fn configured_weights_shift_the_mean() {
        let mut cfg = config();
        cfg.source_weights.insert("trendsSource".to_string(), 3.0);
        let readings = [reading("trendsSource", 80.0), reading("socialSource", 60.0)];
        let trend = aggregate("k", &readings, &[], &cfg).unwrap().unwrap();
        assert!((trend.score - 75.0).abs() < 1e-9, "score {}", trend.score);
    }

    #[test]
    fn wild_outliers_are_down_weighted_not_dropped() {
        let readings = [reading("a", 100.0), reading("b", 50.0), reading("c", 48.0)];
        let trend = aggregate("k", &readings, &[], &config()).unwrap().unwrap();
        // a deviates 51 points from the median (50) → half weight:
        // (0.5*100 + 50 + 48) / 2.5 = 59.2, versus 66.0 unweighted.
        assert!((trend.score - 59.2).abs() < 1e-9, "score {}", trend.score);
        assert_eq!(trend.sources.len(), 3, "outlier stays in the source set");
    }

    #[test]
    fn velocity_is_relative_to_most_recent_prior_run() {
        let readings = [reading("a", 70.0)];
        let trend = aggregate("k", &readings, &[50.0, 90.0], &config())
            .unwrap()
            .unwrap();
        assert!((trend.velocity - 40.0).abs() < 1e-9);
        assert_eq!(trend.category, TrendCategory::Spiking);
    }

    #[test]
    fn zero_prior_score_gives_zero_velocity() {
        let readings = [reading("a", 70.0)];
        let trend = aggregate("k", &readings, &[0.0], &config()).unwrap().unwrap();
        assert_eq!(trend.velocity, 0.0);
    }

    #[test]
    fn velocity_exactly_at_spike_threshold_is_not_spiking() {
        let readings = [reading("a", 65.0)];
        let trend = aggregate("k", &readings, &[50.0], &config()).unwrap().unwrap();
        assert!((trend.velocity - 30.0).abs() < 1e-9);
        assert_eq!(trend.category, TrendCategory::Stable);
    }

    #[test]
    fn collapsing_with_healthy_score_stays_stable() {
        let readings = [reading("a", 60.0)];
        let trend = aggregate("k", &readings, &[100.0], &config()).unwrap().unwrap();
        assert!(trend.velocity < -30.0);
        assert_eq!(trend.category, TrendCategory::Stable);
    }

    #[test]
    fn collapsing_with_low_score_is_dropped() {
        let readings = [reading("a", 30.0)];
        let result = aggregate("k", &readings, &[100.0], &config()).expect("aggregate");
        assert!(result.is_none(), "collapsing low-score trend must be dropped");
    }

    #[test]
    fn two_run_uptrend_with_moderate_velocity_is_emerging() {
        let readings = [reading("a", 60.0)];
        let trend = aggregate("k", &readings, &[52.0, 40.0], &config())
            .unwrap()
            .unwrap();
        assert!(trend.velocity > 0.0 && trend.velocity <= 30.0);
        assert_eq!(trend.category, TrendCategory::Emerging);
    }

    #[test]
    fn single_prior_run_is_not_enough_for_emerging() {
        let readings = [reading("a", 60.0)];
        let trend = aggregate("k", &readings, &[52.0], &config()).unwrap().unwrap();
        assert_eq!(trend.category, TrendCategory::Stable);
    }

    #[test]
    fn prior_downtrend_blocks_emerging() {
        let readings = [reading("a", 60.0)];
        let trend = aggregate("k", &readings, &[52.0, 58.0], &config())
            .unwrap()
            .unwrap();
        assert_eq!(trend.category, TrendCategory::Stable);
    }

    #[test]
    fn more_agreeing_sources_raise_confidence() {
        let two = aggregate(
            "k",
            &[reading("a", 70.0), reading("b", 70.0)],
            &[],
            &config(),
        )
        .unwrap()
        .unwrap();
        let three = aggregate(
            "k",
            &[reading("a", 70.0), reading("b", 70.0), reading("c", 70.0)],
            &[],
            &config(),
        )
        .unwrap()
        .unwrap();
        assert!(three.confidence_score > two.confidence_score);
        assert_eq!(three.confidence, ConfidenceLabel::High);
    }

    #[test]
    fn disagreement_lowers_confidence() {
        let agreeing = aggregate(
            "k",
            &[reading("a", 70.0), reading("b", 72.0)],
            &[],
            &config(),
        )
        .unwrap()
        .unwrap();
        let split = aggregate(
            "k",
            &[reading("a", 95.0), reading("b", 20.0)],
            &[],
            &config(),
        )
        .unwrap()
        .unwrap();
        assert!(split.confidence_score < agreeing.confidence_score);
        assert_eq!(split.confidence, ConfidenceLabel::Low);
    }

    #[test]
    fn explanation_cites_dominant_source_and_direction() {
        let readings = [reading("trendsSource", 80.0), reading("socialSource", 60.0)];
        let trend = aggregate("k", &readings, &[50.0], &config()).unwrap().unwrap();
        assert!(trend.explanation.contains("trendsSource"));
        assert!(trend.explanation.contains("rising"));
        assert!(
            trend.explanation.contains("2 sources"),
            "explanation: {}",
            trend.explanation
        );
    }

    #[test]
    fn dominant_tie_prefers_larger_sample_size() {
        let readings = [
            SourceReading {
                source: "small_panel".to_string(),
                value: 70.0,
                baseline_min: 0.0,
                baseline_max: 100.0,
                sample_size: 5,
            },
            SourceReading {
                source: "wide_panel".to_string(),
                value: 70.0,
                baseline_min: 0.0,
                baseline_max: 100.0,
                sample_size: 48,
            },
        ];
        let trend = aggregate("k", &readings, &[], &config()).unwrap().unwrap();
        assert!(trend.explanation.contains("wide_panel"));
    }

    #[test]
    fn score_and_confidence_stay_in_declared_ranges() {
        let readings = [
            SourceReading {
                source: "a".to_string(),
                value: 500.0,
                baseline_min: 0.0,
                baseline_max: 100.0,
                sample_size: 1,
            },
            reading("b", 100.0),
        ];
        let trend = aggregate("k", &readings, &[], &config()).unwrap().unwrap();
        assert!(trend.score.is_finite() && (0.0..=100.0).contains(&trend.score));
        assert!(
            trend.confidence_score.is_finite()
                && (0.0..=1.0).contains(&trend.confidence_score)
        );
    }
}
