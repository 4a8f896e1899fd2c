use super::{Alignment, Axis, Constraint, Context, Dimensions, offset_scope};
use crate::ops::MacroOp;

type Widget<'w> = Box<dyn FnOnce(&mut Context<'_>) -> Dimensions + 'w>;

/// Distribution of leftover main-axis space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Spacing {
    /// All space after the last child.
    #[default]
    SpaceEnd,
    /// All space before the first child.
    SpaceStart,
    /// Space split evenly before the first and after the last child.
    SpaceSides,
    /// Half a share at both ends, a full share between children.
    SpaceAround,
    /// Space between children only.
    SpaceBetween,
    /// Equal space at both ends and between children.
    SpaceEvenly,
}

/// Lays out children in a row or a column.
///
/// Rigid children are laid out first, in order, each limited to the space
/// left over by its predecessors. Flexed children then share the rest by
/// weight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flex {
    pub axis: Axis,
    pub spacing: Spacing,
    pub alignment: Alignment,
}

pub struct FlexChild<'w> {
    weight: Option<f32>,
    widget: Widget<'w>,
}

impl<'w> FlexChild<'w> {
    pub fn rigid(w: impl FnOnce(&mut Context<'_>) -> Dimensions + 'w) -> Self {
        FlexChild {
            weight: None,
            widget: Box::new(w),
        }
    }

    pub fn flexed(weight: f32, w: impl FnOnce(&mut Context<'_>) -> Dimensions + 'w) -> Self {
        FlexChild {
            weight: Some(weight),
            widget: Box::new(w),
        }
    }
}

struct Laid {
    call: MacroOp,
    dims: Dimensions,
}

impl Flex {
    pub fn row() -> Self {
        Flex::default()
    }

    pub fn column() -> Self {
        Flex {
            axis: Axis::Vertical,
            ..Flex::default()
        }
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn layout(&self, gtx: &mut Context<'_>, children: Vec<FlexChild<'_>>) -> Dimensions {
        let cs = gtx.constraints;
        let axis = self.axis;
        let main_c = axis.main_constraint(&cs);
        let cross_c = axis.cross_constraint(&cs);
        let cross = Constraint {
            min: 0,
            max: cross_c.max,
        };

        let mut remaining = main_c.max;
        let mut total_weight = 0.0;
        let mut laid: Vec<Option<Laid>> = Vec::with_capacity(children.len());
        let mut flexed = Vec::new();

        for child in children {
            if let Some(weight) = child.weight {
                total_weight += weight;
                flexed.push((weight, child.widget));
                laid.push(None);
                continue;
            }
            let ccs = axis.constraints(
                Constraint {
                    min: 0,
                    max: remaining,
                },
                cross,
            );
            let rec = MacroOp::record(gtx.ops);
            let dims = gtx.layout(ccs, child.widget);
            let call = rec.stop(gtx.ops);
            remaining = (remaining - axis.main(dims.size)).max(0);
            laid.push(Some(Laid { call, dims }));
        }

        let rest = remaining;
        let mut fraction = 0.0;
        let mut flexed = flexed.into_iter();
        for slot in laid.iter_mut().filter(|s| s.is_none()) {
            let Some((weight, w)) = flexed.next() else { break };
            let mut size = 0;
            if total_weight > 0.0 {
                let share = rest as f32 * weight / total_weight;
                size = ((share + fraction).round() as i32).min(remaining).max(0);
                fraction = share + fraction - size as f32;
            }
            let ccs = axis.constraints(Constraint::exact(size), cross);
            let rec = MacroOp::record(gtx.ops);
            let dims = gtx.layout(ccs, w);
            let call = rec.stop(gtx.ops);
            remaining = (remaining - axis.main(dims.size)).max(0);
            *slot = Some(Laid { call, dims });
        }

        let laid: Vec<Laid> = laid.into_iter().flatten().collect();
        let mut main_size = 0;
        let mut max_cross = 0;
        let mut max_baseline = 0;
        for l in &laid {
            main_size += axis.main(l.dims.size);
            max_cross = max_cross.max(axis.cross(l.dims.size));
            if axis == Axis::Horizontal {
                max_baseline = max_baseline.max(l.dims.baseline);
            }
        }
        if self.alignment == Alignment::Baseline && axis == Axis::Horizontal {
            let below = laid
                .iter()
                .map(|l| l.dims.size.y - l.dims.baseline)
                .max()
                .unwrap_or(0);
            max_cross = max_cross.max(max_baseline + below);
        }
        let cross_size = cross_c.constrain(max_cross);

        let space = (main_c.min - main_size).max(0);
        let n = laid.len() as i32;
        let mut main = match self.spacing {
            Spacing::SpaceStart => space,
            Spacing::SpaceSides => space / 2,
            Spacing::SpaceAround if n > 0 => space / (n * 2),
            Spacing::SpaceEvenly => space / (n + 1),
            _ => 0,
        };

        let mut first_baseline = None;
        for (i, l) in laid.iter().enumerate() {
            let c = axis.cross(l.dims.size);
            let cross_off = match self.alignment {
                Alignment::Start => 0,
                Alignment::End => cross_size - c,
                Alignment::Middle => (cross_size - c) / 2,
                Alignment::Baseline if axis == Axis::Horizontal => max_baseline - l.dims.baseline,
                Alignment::Baseline => 0,
            };
            let p = axis.point(main, cross_off);
            offset_scope(gtx.ops, p, |ops| l.call.add(ops));
            if axis == Axis::Horizontal && first_baseline.is_none() {
                first_baseline = Some(l.dims.baseline + cross_off);
            }
            main += axis.main(l.dims.size);
            let last = i as i32 == n - 1;
            main += match self.spacing {
                Spacing::SpaceAround if n > 0 && !last => space / n,
                Spacing::SpaceBetween if n > 1 && !last => space / (n - 1),
                Spacing::SpaceEvenly if !last => space / (n + 1),
                _ => 0,
            };
        }
        main += match self.spacing {
            Spacing::SpaceEnd => space,
            Spacing::SpaceSides => space - space / 2,
            Spacing::SpaceAround if n > 0 => space / (n * 2),
            Spacing::SpaceEvenly => space / (n + 1),
            Spacing::SpaceBetween if n <= 1 => space,
            _ => 0,
        };

        let size = cs.constrain(axis.point(main, cross_size));
        Dimensions {
            size,
            baseline: match (self.alignment, first_baseline) {
                (Alignment::Baseline, _) => max_baseline,
                (_, Some(b)) => b,
                _ => size.y,
            },
        }
    }
}
