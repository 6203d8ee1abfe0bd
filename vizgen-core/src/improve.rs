//! Improvement passes over finished specs.
//!
//! Properties are drawn independently, so a finished spec can be well-formed
//! yet unreasonable (a bar chart over two raw quantitative fields, a rect
//! heatmap without a zero baseline). A [`SpecTransform`] repairs one such
//! pattern. [`ImprovementPass`] runs a fixed, ordered list of transforms;
//! the order is observable because transforms share one rng stream.

use rand::{Rng, RngCore};
use std::fmt;

use crate::domain::{Aggregate, Channel, FieldType, Mark, ScaleDef, Spec};

/// One spec repair rule.
pub trait SpecTransform: Send + Sync {
    /// Stable name, for logs and tests.
    fn name(&self) -> &'static str;

    /// Applies the rule in place. May draw from `rng`.
    fn apply(&self, spec: &mut Spec, rng: &mut dyn RngCore);
}

/// Adds `aggregate: mean` when exactly one positional axis is quantitative.
///
/// Applies only to summary marks (bar, line, area), and even then only half
/// the time, so raw scatter-style variants survive in the output population.
pub struct AggregateMean;

impl SpecTransform for AggregateMean {
    fn name(&self) -> &'static str {
        "aggregate_mean"
    }

    fn apply(&self, spec: &mut Spec, rng: &mut dyn RngCore) {
        let Some(mark) = spec.mark else { return };
        if !matches!(mark, Mark::Bar | Mark::Line | Mark::Area) {
            return;
        }
        if rng.gen::<f64>() < 0.5 {
            return;
        }
        let Some(x) = spec.encoding_at(Channel::X) else { return };
        let Some(y) = spec.encoding_at(Channel::Y) else { return };

        // A missing type counts as not-quantitative.
        let x_quant = x.field_type == Some(FieldType::Quantitative);
        let y_quant = y.field_type == Some(FieldType::Quantitative);
        if x_quant == y_quant {
            return;
        }

        let target = if x_quant { Channel::X } else { Channel::Y };
        if let Some(encoding) = spec.encoding.get_mut(&target) {
            encoding.aggregate = Some(Aggregate::Mean);
        }
    }
}

/// Anchors rect marks to a zero baseline via a top-level scale.
pub struct ZeroBaseline;

impl SpecTransform for ZeroBaseline {
    fn name(&self) -> &'static str {
        "zero_baseline"
    }

    fn apply(&self, spec: &mut Spec, _rng: &mut dyn RngCore) {
        if spec.mark == Some(Mark::Rect) {
            spec.scale = Some(ScaleDef::Zero);
        }
    }
}

/// Ordered list of transforms applied to every finished spec.
pub struct ImprovementPass {
    transforms: Vec<Box<dyn SpecTransform>>,
}

impl ImprovementPass {
    /// The standard pass: aggregate repair, then baseline repair.
    pub fn standard() -> Self {
        Self {
            transforms: vec![Box::new(AggregateMean), Box::new(ZeroBaseline)],
        }
    }

    /// A pass with no transforms; specs come through untouched.
    pub fn empty() -> Self {
        Self { transforms: Vec::new() }
    }

    /// Appends a transform to run after the existing ones.
    pub fn with_transform(mut self, transform: Box<dyn SpecTransform>) -> Self {
        self.transforms.push(transform);
        self
    }

    /// Transform names in application order.
    pub fn names(&self) -> Vec<&'static str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }

    /// Runs every transform on one spec, in registration order.
    pub fn apply_all(&self, spec: &mut Spec, rng: &mut dyn RngCore) {
        for transform in &self.transforms {
            transform.apply(spec, &mut *rng);
        }
    }
}

impl fmt::Debug for ImprovementPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImprovementPass")
            .field("transforms", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Encoding;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn spec_with_axes(mark: Mark, x_type: Option<FieldType>, y_type: Option<FieldType>) -> Spec {
        let mut spec = Spec { mark: Some(mark), ..Spec::default() };
        spec.encoding.insert(
            Channel::X,
            Encoding { field_type: x_type, ..Encoding::default() },
        );
        spec.encoding.insert(
            Channel::Y,
            Encoding { field_type: y_type, ..Encoding::default() },
        );
        spec
    }

    fn count_aggregated(base: &Spec, trials: u64) -> (usize, usize) {
        let mut on_x = 0;
        let mut on_y = 0;
        for seed in 0..trials {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut spec = base.clone();
            AggregateMean.apply(&mut spec, &mut rng);
            if spec.encoding[&Channel::X].aggregate == Some(Aggregate::Mean) {
                on_x += 1;
            }
            if spec.encoding[&Channel::Y].aggregate == Some(Aggregate::Mean) {
                on_y += 1;
            }
        }
        (on_x, on_y)
    }

    // ── aggregate_mean ──

    #[test]
    fn aggregates_the_quantitative_axis_about_half_the_time() {
        let base = spec_with_axes(
            Mark::Bar,
            Some(FieldType::Quantitative),
            Some(FieldType::Nominal),
        );
        let (on_x, on_y) = count_aggregated(&base, 400);

        assert_eq!(on_y, 0, "the nominal axis must never be aggregated");
        assert!(
            (140..=260).contains(&on_x),
            "expected roughly half of 400 trials to aggregate, got {on_x}"
        );
    }

    #[test]
    fn aggregates_y_when_y_is_the_quantitative_axis() {
        let base = spec_with_axes(
            Mark::Line,
            Some(FieldType::Ordinal),
            Some(FieldType::Quantitative),
        );
        let (on_x, on_y) = count_aggregated(&base, 400);
        assert_eq!(on_x, 0);
        assert!(on_y > 0, "the quantitative y axis should get aggregated");
    }

    #[test]
    fn skips_marks_outside_the_summary_family() {
        let base = spec_with_axes(
            Mark::Point,
            Some(FieldType::Quantitative),
            Some(FieldType::Nominal),
        );
        let (on_x, on_y) = count_aggregated(&base, 200);
        assert_eq!((on_x, on_y), (0, 0));
    }

    #[test]
    fn skips_when_both_or_neither_axis_is_quantitative() {
        let both = spec_with_axes(
            Mark::Bar,
            Some(FieldType::Quantitative),
            Some(FieldType::Quantitative),
        );
        assert_eq!(count_aggregated(&both, 200), (0, 0));

        let neither = spec_with_axes(
            Mark::Bar,
            Some(FieldType::Nominal),
            Some(FieldType::Ordinal),
        );
        assert_eq!(count_aggregated(&neither, 200), (0, 0));
    }

    #[test]
    fn missing_type_counts_as_not_quantitative() {
        let base = spec_with_axes(Mark::Area, Some(FieldType::Quantitative), None);
        let (on_x, on_y) = count_aggregated(&base, 400);
        assert_eq!(on_y, 0);
        assert!(on_x > 0, "typed-vs-untyped axes still qualify");
    }

    #[test]
    fn requires_both_positional_axes() {
        let mut spec = Spec { mark: Some(Mark::Bar), ..Spec::default() };
        spec.encoding.insert(
            Channel::X,
            Encoding {
                field_type: Some(FieldType::Quantitative),
                ..Encoding::default()
            },
        );

        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut candidate = spec.clone();
            AggregateMean.apply(&mut candidate, &mut rng);
            assert_eq!(candidate, spec, "a lone axis must never be touched");
        }
    }

    #[test]
    fn ignores_specs_without_a_mark() {
        let mut spec = spec_with_axes(
            Mark::Bar,
            Some(FieldType::Quantitative),
            Some(FieldType::Nominal),
        );
        spec.mark = None;

        let mut rng = StdRng::seed_from_u64(3);
        let before = spec.clone();
        AggregateMean.apply(&mut spec, &mut rng);
        assert_eq!(spec, before);
    }

    // ── zero_baseline ──

    #[test]
    fn zero_baseline_anchors_rect_marks() {
        let mut rng = StdRng::seed_from_u64(0);

        let mut rect = Spec { mark: Some(Mark::Rect), ..Spec::default() };
        ZeroBaseline.apply(&mut rect, &mut rng);
        assert_eq!(rect.scale, Some(ScaleDef::Zero));

        let mut bar = Spec { mark: Some(Mark::Bar), ..Spec::default() };
        ZeroBaseline.apply(&mut bar, &mut rng);
        assert_eq!(bar.scale, None);
    }

    // ── pass ──

    #[test]
    fn standard_pass_runs_in_registration_order() {
        let pass = ImprovementPass::standard();
        assert_eq!(pass.names(), vec!["aggregate_mean", "zero_baseline"]);
    }

    #[test]
    fn empty_pass_leaves_specs_untouched() {
        let pass = ImprovementPass::empty();
        let mut spec = Spec { mark: Some(Mark::Rect), ..Spec::default() };
        let before = spec.clone();

        let mut rng = StdRng::seed_from_u64(11);
        pass.apply_all(&mut spec, &mut rng);
        assert_eq!(spec, before);
    }

    #[test]
    fn with_transform_appends_after_standard_rules() {
        struct ForceTick;
        impl SpecTransform for ForceTick {
            fn name(&self) -> &'static str {
                "force_tick"
            }
            fn apply(&self, spec: &mut Spec, _rng: &mut dyn RngCore) {
                spec.mark = Some(Mark::Tick);
            }
        }

        let pass = ImprovementPass::standard().with_transform(Box::new(ForceTick));
        assert_eq!(pass.names(), vec!["aggregate_mean", "zero_baseline", "force_tick"]);

        // zero_baseline sees the rect mark before force_tick rewrites it.
        let mut spec = Spec { mark: Some(Mark::Rect), ..Spec::default() };
        let mut rng = StdRng::seed_from_u64(0);
        pass.apply_all(&mut spec, &mut rng);
        assert_eq!(spec.scale, Some(ScaleDef::Zero));
        assert_eq!(spec.mark, Some(Mark::Tick));
    }
}
