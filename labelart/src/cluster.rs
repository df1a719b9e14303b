//! Group painted objects by style, then merge spatially close objects of the
//! same style into one object.

use crate::{
    extract::PaintedObject,
    graphics::color_space::Rgb,
    path::{bbox, PathSegment},
};
use ahash::{HashMap, HashMapExt};
use log::debug;

/// Objects whose bbox centers are closer than this are merged.
pub const DEFAULT_PROXIMITY_THRESHOLD_MM: f64 = 50.0;

/// Styles rounded to 1/100, objects differ in rounding error considered same style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleKey {
    fill: Option<[i64; 3]>,
    stroke: Option<[i64; 3]>,
    stroke_width: i64,
}

// Color components are in 0..=1 and widths a few mm, far inside i64.
#[allow(clippy::cast_possible_truncation)]
fn bucket(v: f64) -> i64 {
    (v * 100.0).round() as i64
}

fn color_bucket(c: Option<Rgb>) -> Option<[i64; 3]> {
    c.map(|c| c.components().map(bucket))
}

impl StyleKey {
    pub fn of(o: &PaintedObject) -> Self {
        Self {
            fill: color_bucket(o.fill),
            stroke: color_bucket(o.stroke),
            stroke_width: bucket(o.stroke_width_mm),
        }
    }
}

fn is_near(a: &PaintedObject, b: &PaintedObject, threshold_mm: f64) -> bool {
    a.bbox.center().distance(b.bbox.center()) < threshold_mm
}

/// Partition objects by `StyleKey`, groups in order of first appearance.
fn group_by_style(selection: &[PaintedObject]) -> Vec<Vec<&PaintedObject>> {
    let mut index: HashMap<StyleKey, usize> = HashMap::new();
    let mut groups: Vec<Vec<&PaintedObject>> = vec![];
    for o in selection {
        if o.segments.is_empty() {
            debug!("skip object without segments");
            continue;
        }

        let idx = *index.entry(StyleKey::of(o)).or_insert_with(|| {
            groups.push(vec![]);
            groups.len() - 1
        });
        groups[idx].push(o);
    }
    groups
}

/// Single-linkage clustering, returns clusters as index lists into `group`,
/// members in discovery order.
fn cluster(group: &[&PaintedObject], threshold_mm: f64) -> Vec<Vec<usize>> {
    let mut visited = vec![false; group.len()];
    let mut clusters = vec![];
    for seed in 0..group.len() {
        if visited[seed] {
            continue;
        }

        visited[seed] = true;
        let mut members = vec![seed];
        let mut cursor = 0;
        while cursor < members.len() {
            let cur = group[members[cursor]];
            for (i, o) in group.iter().enumerate() {
                if !visited[i] && is_near(cur, o, threshold_mm) {
                    visited[i] = true;
                    members.push(i);
                }
            }
            cursor += 1;
        }
        clusters.push(members);
    }
    clusters
}

/// Concatenate segments of members, style copied from `representative`.
/// Returns None if members have no coordinates.
fn merge<'a>(
    representative: &PaintedObject,
    members: impl IntoIterator<Item = &'a PaintedObject>,
) -> Option<PaintedObject> {
    let segments: Vec<PathSegment> = members
        .into_iter()
        .flat_map(|o| o.segments.iter().copied())
        .collect();
    let bbox = bbox(&segments)?;
    Some(PaintedObject {
        segments,
        fill: representative.fill,
        stroke: representative.stroke,
        stroke_width_mm: representative.stroke_width_mm,
        bbox,
    })
}

/// Merge objects of the same style that are transitively near each other.
///
/// Objects are first partitioned by rounded fill, stroke and stroke width, the
/// first object of a partition decides the style of merged objects. Inside a
/// partition two objects are near if the distance of their bbox centers is less
/// than `threshold_mm`, clusters are connected components of this relation.
///
/// Result is ordered by style group then by cluster, both in order of first
/// appearance in `selection`. Input is not modified.
pub fn merge_by_style_and_proximity(
    selection: &[PaintedObject],
    threshold_mm: f64,
) -> Vec<PaintedObject> {
    let mut r = vec![];
    for group in group_by_style(selection) {
        let representative = group[0];
        for members in cluster(&group, threshold_mm) {
            debug!("merge {} objects", members.len());
            if let Some(o) = merge(representative, members.iter().map(|&i| group[i])) {
                r.push(o);
            }
        }
    }
    r
}

#[cfg(test)]
mod tests;
