//! Two-level weighted selection of a group and a prop from a [`Detail`].
//!
//! [select_group] blends between the two groups whose alpha thresholds bracket the
//! sample's alpha, so group boundaries fade instead of cutting hard. [select_prop] treats
//! each prop's `amount` as a cumulative threshold in traversal order.
//!
//! Both functions consume exactly one draw from the [`SampleSource`] on every path.
use crate::detail::{Detail, DetailGroup, DetailProp};
use crate::sampling::SampleSource;

/// Picks the group for an alpha sample, returning its index.
///
/// Returns `None` only when the detail has no groups.
pub fn select_group<'a, S: SampleSource + ?Sized>(
    detail: &'a Detail,
    alpha: f32,
    rng: &mut S,
) -> Option<(usize, &'a DetailGroup)> {
    let groups = &detail.groups;
    let Some(last) = groups.len().checked_sub(1) else {
        rng.skip();
        return None;
    };

    let mut start = 0;
    while start < last && alpha >= groups[start + 1].alpha {
        start += 1;
    }
    let end = (start + 1).min(last);

    if start == end {
        rng.skip();
        return Some((start, &groups[start]));
    }

    let d_alpha = groups[end].alpha - groups[start].alpha;
    let dist = if d_alpha != 0.0 {
        (alpha - groups[start].alpha) / d_alpha
    } else {
        0.0
    };

    let index = if rng.next_sample() <= dist { end } else { start };
    Some((index, &groups[index]))
}

/// Picks the first prop whose cumulative `amount` exceeds a fresh draw.
///
/// Returns `None` when no prop qualifies; the caller drops the sample.
pub fn select_prop<'a, S: SampleSource + ?Sized>(
    group: &'a DetailGroup,
    rng: &mut S,
) -> Option<(usize, &'a DetailProp)> {
    let r = rng.next_sample();
    group.props.iter().enumerate().find(|(_, p)| p.amount > r)
}
