//! Bounding Volume Hierarchy: a recursive build into a pointer tree, and a
//! one-way flatten into a contiguous post-order array for stackless DFS
//! traversal on both the CPU and GPU back ends (§3 "BVH, two forms", §4.3).

use crate::geometry::{HitRecord, Primitive};
use crate::math::{Aabb, Ray};
use std::cmp::Ordering;

const LEAF_THRESHOLD: usize = 4;

/// The recursive build-time tree. Interior nodes store the split axis and
/// both children; leaves store the range of primitive indices they own.
enum BuildNode {
    Leaf {
        bbox: Aabb,
        indices: Vec<usize>,
    },
    Interior {
        bbox: Aabb,
        axis: usize,
        left: Box<BuildNode>,
        right: Box<BuildNode>,
    },
}

impl BuildNode {
    fn bbox(&self) -> Aabb {
        match self {
            BuildNode::Leaf { bbox, .. } => *bbox,
            BuildNode::Interior { bbox, .. } => *bbox,
        }
    }
}

/// A flattened BVH node, the wire format shared with the GPU storage buffer
/// (§6.3). Interior nodes have `primitive_count == 0`; the first child is
/// implicitly the next array entry, the second child is at
/// `second_child_offset`. Leaves have `primitive_count > 0`.
#[derive(Debug, Clone, Copy)]
pub struct FlatBvhNode {
    pub bbox_min: crate::math::Point3,
    pub bbox_max: crate::math::Point3,
    pub first_primitive_or_negative: i32,
    pub primitive_count: u32,
    pub second_child_offset: u32,
    pub split_axis: u32,
}

/// Two-form BVH: the flat array for traversal, plus the parallel
/// primitive-order array the leaves index into (§3).
pub struct Bvh {
    pub nodes: Vec<FlatBvhNode>,
    pub primitive_order: Vec<usize>,
}

impl Bvh {
    /// Builds a SAH-flavored midpoint-split tree over `primitives`, then
    /// flattens it. Tie-breaks by axis-extent order (x < y < z) then by the
    /// first primitive's index, per §4.3.
    pub fn build(primitives: &[Primitive]) -> Self {
        if primitives.is_empty() {
            return Bvh {
                nodes: Vec::new(),
                primitive_order: Vec::new(),
            };
        }
        let mut indices: Vec<usize> = (0..primitives.len()).collect();
        let tree = build_recursive(primitives, &mut indices);

        let mut nodes = Vec::new();
        let mut primitive_order = Vec::new();
        flatten(&tree, &mut nodes, &mut primitive_order);

        Bvh {
            nodes,
            primitive_order,
        }
    }

    /// Iterative stackless-DFS traversal over an explicit bounded stack
    /// (§4.3 "Traverse (CPU)"). Returns the closest hit inside
    /// `(t_min, t_max)`.
    pub fn hit<'a>(
        &self,
        primitives: &'a [Primitive],
        ray: &Ray,
        t_min: f32,
        t_max: f32,
    ) -> Option<HitRecord<'a>> {
        if self.nodes.is_empty() {
            return None;
        }

        let mut stack: [u32; 64] = [0; 64];
        let mut sp = 0usize;
        stack[sp] = 0;
        sp += 1;

        let mut closest = t_max;
        let mut best: Option<HitRecord<'a>> = None;

        while sp > 0 {
            sp -= 1;
            let idx = stack[sp] as usize;
            let node = &self.nodes[idx];
            let bbox = Aabb::new(node.bbox_min, node.bbox_max);
            if !bbox.hit(ray, t_min, closest) {
                continue;
            }

            if node.primitive_count > 0 {
                let start = node.first_primitive_or_negative as usize;
                let end = start + node.primitive_count as usize;
                for &prim_idx in &self.primitive_order[start..end] {
                    if let Some(hit) = primitives[prim_idx].hit(ray, t_min, closest) {
                        closest = hit.t;
                        best = Some(hit);
                    }
                }
            } else {
                let axis = node.split_axis as usize;
                let near_is_left = ray.direction[axis] >= 0.0;
                let left = (idx + 1) as u32;
                let right = node.second_child_offset;
                if near_is_left {
                    // push far (right) first so near (left) pops first
                    stack[sp] = right;
                    sp += 1;
                    stack[sp] = left;
                    sp += 1;
                } else {
                    stack[sp] = left;
                    sp += 1;
                    stack[sp] = right;
                    sp += 1;
                }
            }
        }

        best
    }
}

fn build_recursive(primitives: &[Primitive], indices: &mut [usize]) -> BuildNode {
    let bbox = indices
        .iter()
        .map(|&i| primitives[i].bbox())
        .reduce(|a, b| Aabb::surrounding(&a, &b))
        .expect("non-empty index range");

    if indices.len() <= LEAF_THRESHOLD {
        return BuildNode::Leaf {
            bbox,
            indices: indices.to_vec(),
        };
    }

    let axis = bbox.longest_axis();
    indices.sort_by(|&a, &b| {
        let ca = primitives[a].bbox().centroid(axis);
        let cb = primitives[b].bbox().centroid(axis);
        ca.partial_cmp(&cb).unwrap_or(Ordering::Equal).then(a.cmp(&b))
    });

    let mid = indices.len() / 2;
    let (left_idx, right_idx) = indices.split_at_mut(mid);
    let left = Box::new(build_recursive(primitives, left_idx));
    let right = Box::new(build_recursive(primitives, right_idx));
    let bbox = Aabb::surrounding(&left.bbox(), &right.bbox());

    BuildNode::Interior {
        bbox,
        axis,
        left,
        right,
    }
}

/// Post-order flatten: left subtree occupies `[current+1, ..)`, the index
/// where the right subtree begins is recorded as `second_child_offset`.
fn flatten(node: &BuildNode, nodes: &mut Vec<FlatBvhNode>, primitive_order: &mut Vec<usize>) {
    match node {
        BuildNode::Leaf { bbox, indices } => {
            let first = primitive_order.len() as i32;
            primitive_order.extend_from_slice(indices);
            nodes.push(FlatBvhNode {
                bbox_min: bbox.min,
                bbox_max: bbox.max,
                first_primitive_or_negative: first,
                primitive_count: indices.len() as u32,
                second_child_offset: 0,
                split_axis: 0,
            });
        }
        BuildNode::Interior {
            bbox,
            axis,
            left,
            right,
        } => {
            let self_idx = nodes.len();
            nodes.push(FlatBvhNode {
                bbox_min: bbox.min,
                bbox_max: bbox.max,
                first_primitive_or_negative: -1,
                primitive_count: 0,
                second_child_offset: 0,
                split_axis: *axis as u32,
            });
            flatten(left, nodes, primitive_order);
            let right_offset = nodes.len() as u32;
            flatten(right, nodes, primitive_order);
            nodes[self_idx].second_child_offset = right_offset;
        }
    }
}

/// Brute-force linear scan over all primitives, used to cross-check BVH
/// traversal for hit-determinism (§8).
pub fn linear_hit<'a>(
    primitives: &'a [Primitive],
    ray: &Ray,
    t_min: f32,
    t_max: f32,
) -> Option<HitRecord<'a>> {
    let mut closest = t_max;
    let mut best = None;
    for prim in primitives {
        if let Some(hit) = prim.hit(ray, t_min, closest) {
            closest = hit.t;
            best = Some(hit);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::math::{Color, Point3, Vec3f};

    fn scatter_of_spheres() -> Vec<Primitive> {
        let mut v = Vec::new();
        for i in 0..40 {
            let x = (i as f32) * 0.7 - 14.0;
            v.push(Primitive::sphere(
                Point3::new(x, 0.0, 0.0),
                0.2,
                Material::lambertian(Color::new(0.5, 0.5, 0.5)),
            ));
        }
        v
    }

    #[test]
    fn every_primitive_is_reachable_after_flatten() {
        let prims = scatter_of_spheres();
        let bvh = Bvh::build(&prims);
        let mut seen: Vec<bool> = vec![false; prims.len()];
        for &idx in &bvh.primitive_order {
            seen[idx] = true;
        }
        assert!(seen.iter().all(|&s| s), "some primitive unreachable");
        assert_eq!(bvh.primitive_order.len(), prims.len());
    }

    #[test]
    fn parent_bbox_contains_children() {
        let prims = scatter_of_spheres();
        let bvh = Bvh::build(&prims);
        for (i, node) in bvh.nodes.iter().enumerate() {
            if node.primitive_count == 0 {
                let parent = Aabb::new(node.bbox_min, node.bbox_max);
                let left = bvh.nodes[i + 1];
                let right = bvh.nodes[node.second_child_offset as usize];
                for child in [left, right] {
                    assert!(parent.min.x <= child.bbox_min.x + 1e-4);
                    assert!(parent.min.y <= child.bbox_min.y + 1e-4);
                    assert!(parent.min.z <= child.bbox_min.z + 1e-4);
                    assert!(parent.max.x >= child.bbox_max.x - 1e-4);
                    assert!(parent.max.y >= child.bbox_max.y - 1e-4);
                    assert!(parent.max.z >= child.bbox_max.z - 1e-4);
                }
            }
        }
    }

    #[test]
    fn bvh_traversal_matches_linear_scan() {
        let prims = scatter_of_spheres();
        let bvh = Bvh::build(&prims);

        for i in -20..20 {
            let z = i as f32 * 0.5;
            let ray = Ray::new(Point3::new(-20.0, 0.0, z), Vec3f::new(1.0, 0.0, 0.0));
            let bvh_hit = bvh.hit(&prims, &ray, 0.001, f32::INFINITY);
            let lin_hit = linear_hit(&prims, &ray, 0.001, f32::INFINITY);
            match (bvh_hit, lin_hit) {
                (Some(a), Some(b)) => assert!((a.t - b.t).abs() < 1e-4),
                (None, None) => {}
                other => panic!("mismatch: {:?}", other.0.map(|h| h.t).or(Some(-1.0))),
            }
        }
    }
}
