use std::sync::Arc;

use ndarray::Array2;
use tracing::debug;

use crate::error::{CanegapError, Result};
use crate::frame::ColorFrame;
use crate::geometry::{BoundingBox, Point};
use crate::pipeline::ProgressReporter;

use super::config::Connectivity;

/// A maximal connected region of foreground pixels: one plant or plant clump.
#[derive(Clone, Debug, PartialEq)]
pub struct Component {
    /// 1-based id, assigned in discovery (raster) order.
    pub id: u32,
    /// Number of pixels in the component.
    pub area: usize,
    pub bbox: BoundingBox,
    /// Geometric centroid in pixel coordinates.
    pub centroid: Point,
}

/// Pixel-to-component lookup plus the registry of components.
///
/// Label 0 is background; label `k` belongs to `components[k - 1]`.
#[derive(Clone, Debug)]
pub struct ComponentMap {
    labels: Array2<u32>,
    components: Vec<Component>,
    source: Arc<ColorFrame>,
    original: Arc<ColorFrame>,
}

impl ComponentMap {
    /// Assemble a map from its parts without checking them. Use
    /// [`ComponentMap::validate`] before trusting a map built this way.
    ///
    /// `source` doubles as the original image until
    /// [`ComponentMap::with_original`] says otherwise.
    pub fn from_parts(labels: Array2<u32>, components: Vec<Component>, source: Arc<ColorFrame>) -> Self {
        Self {
            labels,
            components,
            original: Arc::clone(&source),
            source,
        }
    }

    /// Attach the caller's image as it was before normalization.
    pub fn with_original(mut self, original: Arc<ColorFrame>) -> Self {
        self.original = original;
        self
    }

    /// Id of the component covering pixel `(x, y)`, or `None` for background
    /// and out-of-bounds coordinates.
    pub fn component_at(&self, x: usize, y: usize) -> Option<u32> {
        match self.labels.get([y, x]) {
            Some(&0) | None => None,
            Some(&id) => Some(id),
        }
    }

    pub fn component(&self, id: u32) -> Option<&Component> {
        let idx = (id as usize).checked_sub(1)?;
        self.components.get(idx)
    }

    /// All components in discovery order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// `(width, height)` of the labeled image.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.labels.ncols(), self.labels.nrows())
    }

    pub fn labels(&self) -> &Array2<u32> {
        &self.labels
    }

    /// The (normalized) image the map was computed from.
    pub fn source(&self) -> &Arc<ColorFrame> {
        &self.source
    }

    /// The image as the caller passed it in. Overlays are drawn on this one.
    pub fn original(&self) -> &Arc<ColorFrame> {
        &self.original
    }

    pub fn foreground_mask(&self) -> Array2<bool> {
        self.labels.mapv(|l| l != 0)
    }

    pub fn foreground_pixels(&self) -> usize {
        self.labels.iter().filter(|&&l| l != 0).count()
    }

    /// Check the partition invariant: every label refers to a registered
    /// component, ids are dense and ordered, and each component's area equals
    /// the number of pixels carrying its label.
    pub fn validate(&self) -> Result<()> {
        for image in [&self.source, &self.original] {
            if self.labels.dim() != (image.height(), image.width()) {
                return Err(CanegapError::InvariantViolation(format!(
                    "label grid {}x{} does not match source image {}x{}",
                    self.labels.ncols(),
                    self.labels.nrows(),
                    image.width(),
                    image.height()
                )));
            }
        }

        for (idx, comp) in self.components.iter().enumerate() {
            if comp.id as usize != idx + 1 {
                return Err(CanegapError::InvariantViolation(format!(
                    "component at position {idx} has id {}",
                    comp.id
                )));
            }
        }

        let n = self.components.len();
        let mut counts = vec![0usize; n + 1];
        for ((row, col), &label) in self.labels.indexed_iter() {
            let slot = counts.get_mut(label as usize).ok_or_else(|| {
                CanegapError::InvariantViolation(format!(
                    "pixel ({col}, {row}) maps to unknown component {label} (have {n})"
                ))
            })?;
            *slot += 1;
        }

        for comp in &self.components {
            let counted = counts[comp.id as usize];
            if counted != comp.area {
                return Err(CanegapError::InvariantViolation(format!(
                    "component {} registers {} pixels but labels {}",
                    comp.id, comp.area, counted
                )));
            }
        }
        Ok(())
    }
}

/// Running statistics for one provisional root during pass 2.
struct Accumulator {
    area: usize,
    bbox: BoundingBox,
    sum_x: f64,
    sum_y: f64,
}

/// Label the connected components of a binary mask using two-pass
/// labeling with union-find.
///
/// Components smaller than `min_area` are folded back into background. The
/// survivors get ids `1..=n` in the raster order of their first pixel, so
/// the output is fully determined by the mask.
///
/// Progress is reported per image row of the first pass, and the pass stops
/// with [`CanegapError::Cancelled`] when the reporter asks for it.
pub fn label_components(
    mask: &Array2<bool>,
    connectivity: Connectivity,
    min_area: usize,
    reporter: &dyn ProgressReporter,
) -> Result<(Array2<u32>, Vec<Component>)> {
    let (h, w) = mask.dim();
    let mut labels = Array2::<u32>::zeros((h, w));
    if h == 0 || w == 0 {
        return Ok((labels, Vec::new()));
    }

    let mut next_label: u32 = 1;
    // Union-find parent array. Index 0 unused; labels start at 1.
    let mut parent: Vec<u32> = vec![0; h * w / 2 + 2];
    let mut neighbours: Vec<u32> = Vec::with_capacity(4);

    // Pass 1: assign provisional labels.
    for row in 0..h {
        if reporter.is_cancelled() {
            return Err(CanegapError::Cancelled);
        }
        for col in 0..w {
            if !mask[[row, col]] {
                continue;
            }

            neighbours.clear();
            if col > 0 {
                neighbours.push(labels[[row, col - 1]]);
            }
            if row > 0 {
                neighbours.push(labels[[row - 1, col]]);
                if connectivity == Connectivity::Eight {
                    if col > 0 {
                        neighbours.push(labels[[row - 1, col - 1]]);
                    }
                    if col + 1 < w {
                        neighbours.push(labels[[row - 1, col + 1]]);
                    }
                }
            }
            neighbours.retain(|&l| l > 0);

            match neighbours.iter().copied().min() {
                None => {
                    if next_label as usize >= parent.len() {
                        parent.resize(parent.len() * 2, 0);
                    }
                    parent[next_label as usize] = next_label;
                    labels[[row, col]] = next_label;
                    next_label += 1;
                }
                Some(smallest) => {
                    labels[[row, col]] = smallest;
                    for &other in &neighbours {
                        if other != smallest {
                            union(&mut parent, smallest, other);
                        }
                    }
                }
            }
        }
        reporter.advance(row + 1);
    }

    // Flatten parent references.
    for i in 1..next_label as usize {
        parent[i] = find(&parent, i as u32);
    }

    // Pass 2: collect stats per root, in order of first appearance.
    let mut slot_of_root = vec![u32::MAX; next_label as usize];
    let mut accumulators: Vec<Accumulator> = Vec::new();

    for row in 0..h {
        for col in 0..w {
            let lbl = labels[[row, col]];
            if lbl == 0 {
                continue;
            }
            let root = parent[lbl as usize] as usize;
            if slot_of_root[root] == u32::MAX {
                slot_of_root[root] = accumulators.len() as u32;
                accumulators.push(Accumulator {
                    area: 0,
                    bbox: BoundingBox::at(col, row),
                    sum_x: 0.0,
                    sum_y: 0.0,
                });
            }
            let acc = &mut accumulators[slot_of_root[root] as usize];
            acc.area += 1;
            acc.bbox.include(col, row);
            acc.sum_x += col as f64;
            acc.sum_y += row as f64;
        }
    }

    // Assign final ids, dropping components below the area floor.
    let mut final_id = vec![0u32; accumulators.len()];
    let mut components = Vec::with_capacity(accumulators.len());
    for (slot, acc) in accumulators.iter().enumerate() {
        if acc.area < min_area {
            continue;
        }
        let id = components.len() as u32 + 1;
        final_id[slot] = id;
        components.push(Component {
            id,
            area: acc.area,
            bbox: acc.bbox,
            centroid: Point::new(acc.sum_x / acc.area as f64, acc.sum_y / acc.area as f64),
        });
    }

    // Pass 3: rewrite provisional labels to final ids.
    labels.mapv_inplace(|lbl| {
        if lbl == 0 {
            0
        } else {
            final_id[slot_of_root[parent[lbl as usize] as usize] as usize]
        }
    });

    debug!(
        provisional = next_label - 1,
        raw = accumulators.len(),
        kept = components.len(),
        "Labeled connected components"
    );

    Ok((labels, components))
}

fn find(parent: &[u32], mut x: u32) -> u32 {
    while parent[x as usize] != x {
        x = parent[x as usize];
    }
    x
}

fn union(parent: &mut [u32], a: u32, b: u32) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        // Merge larger root into smaller root to keep labels consistent.
        let (small, big) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[big as usize] = small;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::NoOpReporter;

    fn mask_from(rows: &[&str]) -> Array2<bool> {
        let h = rows.len();
        let w = rows[0].len();
        Array2::from_shape_fn((h, w), |(r, c)| rows[r].as_bytes()[c] == b'#')
    }

    #[test]
    fn diagonal_pixels_join_only_with_eight_connectivity() {
        let mask = mask_from(&["#..", ".#.", "..#"]);
        let (_, four) = label_components(&mask, Connectivity::Four, 1, &NoOpReporter).unwrap();
        let (_, eight) = label_components(&mask, Connectivity::Eight, 1, &NoOpReporter).unwrap();
        assert_eq!(four.len(), 3);
        assert_eq!(eight.len(), 1);
        assert_eq!(eight[0].area, 3);
    }

    #[test]
    fn u_shape_merges_into_one_component() {
        let mask = mask_from(&["#.#", "#.#", "###"]);
        let (labels, comps) = label_components(&mask, Connectivity::Four, 1, &NoOpReporter).unwrap();
        assert_eq!(comps.len(), 1);
        assert!(labels.iter().all(|&l| l == 0 || l == 1));
    }

    #[test]
    fn ids_follow_discovery_order() {
        let mask = mask_from(&["...#", "#...", "...."]);
        let (labels, comps) = label_components(&mask, Connectivity::Eight, 1, &NoOpReporter).unwrap();
        assert_eq!(labels[[0, 3]], 1);
        assert_eq!(labels[[1, 0]], 2);
        assert_eq!(comps[0].centroid, Point::new(3.0, 0.0));
    }

    #[test]
    fn small_components_become_background() {
        let mask = mask_from(&["#..##", "...##"]);
        let (labels, comps) = label_components(&mask, Connectivity::Eight, 2, &NoOpReporter).unwrap();
        assert_eq!(comps.len(), 1);
        assert_eq!(comps[0].id, 1);
        assert_eq!(comps[0].area, 4);
        assert_eq!(labels[[0, 0]], 0);
        assert_eq!(labels[[0, 3]], 1);
    }
}
