// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector3f};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A deposited light sample. `direction` is the direction of travel when the
/// photon arrived, `color` its RGB energy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Photon {
    pub position: Vector3f,
    pub direction: Vector3f,
    pub color: Vector3f,
}

impl Photon {
    pub fn new(position: Vector3f, direction: Vector3f, color: Vector3f) -> Self {
        Self { position, direction, color }
    }
}

#[derive(Debug)]
pub struct PhotonNode {
    photon: Photon,
    left: Option<Box<PhotonNode>>,
    right: Option<Box<PhotonNode>>,
}

/// Balanced k-d tree over photons, split on axis `depth % 3`. Built once and
/// never changed afterwards; a new emission pass builds a new tree.
#[derive(Debug, Default)]
pub struct PhotonTree {
    root: Option<Box<PhotonNode>>,
    k: usize,
    len: usize,
}

// Heap entry ordered by squared distance, largest on top.
struct Candidate<'a> {
    dist2: Float,
    photon: &'a Photon,
}

impl PartialEq for Candidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.dist2.total_cmp(&other.dist2) == Ordering::Equal
    }
}

impl Eq for Candidate<'_> {}

impl PartialOrd for Candidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist2.total_cmp(&other.dist2)
    }
}

impl PhotonTree {
    pub fn new(photons: Vec<Photon>, k: usize) -> Self {
        let len = photons.len();
        Self { root: Self::build(photons, 0), k, len }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    fn build(mut photons: Vec<Photon>, depth: usize) -> Option<Box<PhotonNode>> {
        if photons.is_empty() {
            return None;
        }

        let axis = depth % 3;
        let mid = photons.len() / 2;
        photons.select_nth_unstable_by(mid, |a, b| a.position[axis].total_cmp(&b.position[axis]));
        let right = photons.split_off(mid + 1);
        let photon = photons.pop()?;

        Some(Box::new(PhotonNode {
            photon,
            left: Self::build(photons, depth + 1),
            right: Self::build(right, depth + 1),
        }))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Capacity hint recorded at build time.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Every stored photon, in no particular order.
    pub fn photons(&self) -> Vec<Photon> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack: Vec<&PhotonNode> = self.root.as_deref().into_iter().collect();
        while let Some(node) = stack.pop() {
            out.push(node.photon);
            stack.extend(node.left.as_deref());
            stack.extend(node.right.as_deref());
        }
        out
    }

    /// All photons within `radius` of `point`. With `max_num` set, the search
    /// stops once that many are found; which ones are kept then depends on
    /// traversal order.
    pub fn find_photons_in_radius(&self, point: &Vector3f, radius: Float, max_num: Option<usize>) -> Vec<Photon> {
        let mut result = Vec::new();
        if max_num == Some(0) {
            return result;
        }
        Self::radius_search(self.root.as_deref(), point, radius, radius * radius, max_num, 0, &mut result);
        result
    }

    fn radius_search(
        node: Option<&PhotonNode>,
        point: &Vector3f,
        radius: Float,
        radius2: Float,
        max_num: Option<usize>,
        depth: usize,
        result: &mut Vec<Photon>,
    ) {
        let node = match node {
            Some(node) => node,
            None => return,
        };
        if max_num.map_or(false, |max| result.len() >= max) {
            return;
        }

        if (node.photon.position - point).norm_squared() <= radius2 {
            result.push(node.photon);
        }

        let axis = depth % 3;
        let split = node.photon.position[axis];
        if point[axis] - radius <= split {
            Self::radius_search(node.left.as_deref(), point, radius, radius2, max_num, depth + 1, result);
        }
        if point[axis] + radius >= split {
            Self::radius_search(node.right.as_deref(), point, radius, radius2, max_num, depth + 1, result);
        }
    }

    /// Closest stored photon to `point`.
    pub fn nearest_photon(&self, point: &Vector3f) -> Option<&Photon> {
        let mut best: Option<(&Photon, Float)> = None;
        Self::nearest_search(self.root.as_deref(), point, 0, &mut best);
        best.map(|(photon, _)| photon)
    }

    fn nearest_search<'a>(
        node: Option<&'a PhotonNode>,
        point: &Vector3f,
        depth: usize,
        best: &mut Option<(&'a Photon, Float)>,
    ) {
        let node = match node {
            Some(node) => node,
            None => return,
        };

        let dist2 = (node.photon.position - point).norm_squared();
        if best.map_or(true, |(_, best_dist2)| dist2 < best_dist2) {
            *best = Some((&node.photon, dist2));
        }

        let axis = depth % 3;
        let diff = point[axis] - node.photon.position[axis];
        let (near, far) = if diff < 0.0 {
            (node.left.as_deref(), node.right.as_deref())
        } else {
            (node.right.as_deref(), node.left.as_deref())
        };

        Self::nearest_search(near, point, depth + 1, best);
        if best.map_or(true, |(_, best_dist2)| diff * diff < best_dist2) {
            Self::nearest_search(far, point, depth + 1, best);
        }
    }

    /// Up to `k` photons closest to `point`, nearest first.
    pub fn get_k_closest_photons(&self, point: &Vector3f, k: usize) -> Vec<Photon> {
        if k == 0 {
            return Vec::new();
        }
        let mut heap = BinaryHeap::with_capacity(k + 1);
        Self::k_nearest_search(self.root.as_deref(), point, k, 0, &mut heap);
        heap.into_sorted_vec().into_iter().map(|c| *c.photon).collect()
    }

    fn k_nearest_search<'a>(
        node: Option<&'a PhotonNode>,
        point: &Vector3f,
        k: usize,
        depth: usize,
        heap: &mut BinaryHeap<Candidate<'a>>,
    ) {
        let node = match node {
            Some(node) => node,
            None => return,
        };

        let dist2 = (node.photon.position - point).norm_squared();
        if heap.len() < k {
            heap.push(Candidate { dist2, photon: &node.photon });
        } else if heap.peek().map_or(false, |worst| dist2 < worst.dist2) {
            heap.pop();
            heap.push(Candidate { dist2, photon: &node.photon });
        }

        let axis = depth % 3;
        let diff = point[axis] - node.photon.position[axis];
        let (near, far) = if diff < 0.0 {
            (node.left.as_deref(), node.right.as_deref())
        } else {
            (node.right.as_deref(), node.left.as_deref())
        };

        Self::k_nearest_search(near, point, k, depth + 1, heap);
        let visit_far = heap.len() < k || heap.peek().map_or(true, |worst| diff * diff < worst.dist2);
        if visit_far {
            Self::k_nearest_search(far, point, k, depth + 1, heap);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::LcgRng;

    fn random_photons(rng: &mut LcgRng, n: usize) -> Vec<Photon> {
        (0..n)
            .map(|_| {
                let p = Vector3f::new(rng.next_symmetric(), rng.next_symmetric(), rng.next_symmetric());
                Photon::new(p, Vector3f::new(0.0, -1.0, 0.0), Vector3f::new(1.0, 1.0, 1.0))
            })
            .collect()
    }

    fn sorted_positions(photons: &[Photon]) -> Vec<[Float; 3]> {
        let mut out: Vec<[Float; 3]> = photons.iter().map(|p| [p.position.x, p.position.y, p.position.z]).collect();
        out.sort_by(|a, b| a.partial_cmp(b).unwrap());
        out
    }

    #[test]
    fn test_build_keeps_every_photon() {
        let mut rng = LcgRng::new(5);
        let photons = random_photons(&mut rng, 257);
        let tree = PhotonTree::new(photons.clone(), 50);
        assert_eq!(tree.len(), 257);
        assert_eq!(tree.k(), 50);
        assert_eq!(sorted_positions(&tree.photons()), sorted_positions(&photons));
    }

    #[test]
    fn test_radius_query_vs_brute_force() {
        let mut rng = LcgRng::new(11);
        let photons = random_photons(&mut rng, 1000);
        let tree = PhotonTree::new(photons.clone(), 50);

        for _ in 0..50 {
            let probe = Vector3f::new(rng.next_symmetric(), rng.next_symmetric(), rng.next_symmetric());
            let radius = 0.05 + 0.3 * rng.next_f32();
            let expected: Vec<Photon> = photons
                .iter()
                .filter(|p| (p.position - probe).norm_squared() <= radius * radius)
                .cloned()
                .collect();
            let found = tree.find_photons_in_radius(&probe, radius, None);
            assert_eq!(sorted_positions(&found), sorted_positions(&expected));
        }
    }

    #[test]
    fn test_radius_query_cap() {
        let mut rng = LcgRng::new(12);
        let tree = PhotonTree::new(random_photons(&mut rng, 500), 50);
        let probe = Vector3f::zeros();
        let found = tree.find_photons_in_radius(&probe, 2.0, Some(10));
        assert_eq!(found.len(), 10);
        for photon in found.iter() {
            assert!((photon.position - probe).norm() <= 2.0);
        }
        assert!(tree.find_photons_in_radius(&probe, 2.0, Some(0)).is_empty());
    }

    #[test]
    fn test_nearest_vs_brute_force() {
        let mut rng = LcgRng::new(21);
        let photons = random_photons(&mut rng, 700);
        let tree = PhotonTree::new(photons.clone(), 50);

        for _ in 0..100 {
            let probe = Vector3f::new(rng.next_symmetric(), rng.next_symmetric(), rng.next_symmetric()) * 1.5;
            let expected = photons
                .iter()
                .map(|p| (p.position - probe).norm_squared())
                .fold(Float::MAX, Float::min);
            let found = tree.nearest_photon(&probe).unwrap();
            assert_eq!((found.position - probe).norm_squared(), expected);
        }
    }

    #[test]
    fn test_single_photon_tree() {
        let photon = Photon::new(Vector3f::new(1.0, 2.0, 3.0), Vector3f::new(0.0, 0.0, 1.0), Vector3f::new(1.0, 0.0, 0.0));
        let tree = PhotonTree::new(vec![photon], 1);
        assert_eq!(tree.nearest_photon(&Vector3f::new(-10.0, 5.0, 0.0)), Some(&photon));
        assert_eq!(tree.get_k_closest_photons(&Vector3f::zeros(), 3), vec![photon]);
    }

    #[test]
    fn test_empty_tree() {
        let tree = PhotonTree::empty();
        assert!(tree.is_empty());
        assert!(tree.nearest_photon(&Vector3f::zeros()).is_none());
        assert!(tree.find_photons_in_radius(&Vector3f::zeros(), 1.0, None).is_empty());
        assert!(tree.get_k_closest_photons(&Vector3f::zeros(), 5).is_empty());
    }

    #[test]
    fn test_k_closest_vs_brute_force() {
        let mut rng = LcgRng::new(31);
        let photons = random_photons(&mut rng, 600);
        let tree = PhotonTree::new(photons.clone(), 50);

        for _ in 0..30 {
            let probe = Vector3f::new(rng.next_symmetric(), rng.next_symmetric(), rng.next_symmetric());
            let mut expected: Vec<Float> = photons.iter().map(|p| (p.position - probe).norm_squared()).collect();
            expected.sort_by(|a, b| a.partial_cmp(b).unwrap());
            expected.truncate(12);

            let found: Vec<Float> = tree
                .get_k_closest_photons(&probe, 12)
                .iter()
                .map(|p| (p.position - probe).norm_squared())
                .collect();
            assert_eq!(found, expected);
        }
    }
}
