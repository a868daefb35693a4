//! (w,k)-minimizer selection
//!
//! Every window of `w` consecutive k-mers contributes its minimal canonical
//! k-mer. Windows growing from the read start (front end) and shrinking
//! towards the read end (back end) are included so that both read ends are
//! covered. Among equal minima the rightmost k-mer is selected, which keeps
//! the selected positions non-decreasing and lets duplicates be collapsed by
//! looking at the last emitted element only.

use std::collections::VecDeque;

use super::utils::{canonical, hash64, kmer_mask, KmerEncoder};
use super::{Minimizer, SketchParams, SketchResult};
use crate::types::{Position, ReadId, Representation, Strand};

/// Generate the minimizers of one read, ordered by position.
pub fn generate_sketch_elements(
    read: &[u8],
    read_id: ReadId,
    params: &SketchParams,
) -> SketchResult<Vec<Minimizer>> {
    params.validate()?;
    Ok(sketch_read(read, read_id, params))
}

/// Canonical representation of every k-mer of `read`, in order.
pub fn canonical_kmers(read: &[u8], params: &SketchParams) -> Vec<(Representation, Strand)> {
    let k = params.k as usize;
    if read.len() < k {
        return Vec::new();
    }

    let mask = kmer_mask(k);
    let mut encoder = KmerEncoder::new(k);
    let mut kmers = Vec::with_capacity(read.len() - k + 1);

    for &base in read {
        if let Some((forward, reverse)) = encoder.push(base) {
            let (representation, direction) = canonical(forward, reverse);
            let representation = if params.hash_representations {
                hash64(representation, mask)
            } else {
                representation
            };
            kmers.push((representation, direction));
        }
    }

    kmers
}

/// Sketch a read whose parameters have already been validated.
pub(crate) fn sketch_read(read: &[u8], read_id: ReadId, params: &SketchParams) -> Vec<Minimizer> {
    let kmers = canonical_kmers(read, params);
    let n = kmers.len();
    if n == 0 {
        return Vec::new();
    }

    let w = params.w as usize;
    let mut window = WindowMinimum::new(&kmers, w);
    let mut minimizers = Vec::with_capacity(2 * n / (w + 1) + 2);

    for i in 0..n {
        window.push(i);
        if i + 1 >= w {
            window.evict_before(i + 1 - w);
        }
        emit(&mut minimizers, &kmers, window.minimum(), read_id);
    }

    // back end: suffix windows of w-1 down to one k-mer
    let first_suffix_start = (n + 1).saturating_sub(w).max(1);
    for start in first_suffix_start..n {
        window.evict_before(start);
        emit(&mut minimizers, &kmers, window.minimum(), read_id);
    }

    minimizers
}

fn emit(
    minimizers: &mut Vec<Minimizer>,
    kmers: &[(Representation, Strand)],
    position: usize,
    read_id: ReadId,
) {
    let position_in_read = position as Position;
    if minimizers.last().map(|m| m.position_in_read) == Some(position_in_read) {
        return;
    }
    let (representation, direction) = kmers[position];
    minimizers.push(Minimizer::new(
        representation,
        position_in_read,
        direction,
        read_id,
    ));
}

/// Sliding-window minimum over k-mer positions. Representations in the
/// deque are strictly increasing from front to back, so the front is the
/// rightmost occurrence of the window minimum.
struct WindowMinimum<'a> {
    kmers: &'a [(Representation, Strand)],
    positions: VecDeque<usize>,
}

impl<'a> WindowMinimum<'a> {
    fn new(kmers: &'a [(Representation, Strand)], w: usize) -> Self {
        Self {
            kmers,
            positions: VecDeque::with_capacity(w + 1),
        }
    }

    fn push(&mut self, position: usize) {
        let representation = self.kmers[position].0;
        while let Some(&back) = self.positions.back() {
            if self.kmers[back].0 >= representation {
                self.positions.pop_back();
            } else {
                break;
            }
        }
        self.positions.push_back(position);
    }

    fn evict_before(&mut self, start: usize) {
        while let Some(&front) = self.positions.front() {
            if front < start {
                self.positions.pop_front();
            } else {
                break;
            }
        }
    }

    /// Callers only ask for the minimum of a non-empty window.
    fn minimum(&self) -> usize {
        self.positions[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketch::utils::pack_kmer;

    fn params(k: u32, w: u32) -> SketchParams {
        SketchParams::new(k, w, false)
    }

    fn positions(minimizers: &[Minimizer]) -> Vec<Position> {
        minimizers.iter().map(|m| m.position_in_read).collect()
    }

    #[test]
    fn test_single_kmer_reverse_complement() {
        let minimizers = generate_sketch_elements(b"GATT", 0, &params(4, 1)).unwrap();
        assert_eq!(minimizers.len(), 1);
        assert_eq!(minimizers[0].representation, pack_kmer(b"AATC"));
        assert_eq!(minimizers[0].direction, Strand::Reverse);
        assert_eq!(minimizers[0].position_in_read, 0);
    }

    #[test]
    fn test_front_central_and_back_windows() {
        let minimizers = generate_sketch_elements(b"GATT", 0, &params(2, 3)).unwrap();
        assert_eq!(positions(&minimizers), vec![0, 1, 2]);
        assert_eq!(
            minimizers.iter().map(|m| m.representation).collect::<Vec<_>>(),
            vec![0b1000, 0b0011, 0b0000]
        );
        assert_eq!(
            minimizers.iter().map(|m| m.direction).collect::<Vec<_>>(),
            vec![Strand::Forward, Strand::Forward, Strand::Reverse]
        );
    }

    #[test]
    fn test_two_reads() {
        let first = generate_sketch_elements(b"CATCAAG", 0, &params(3, 2)).unwrap();
        let second = generate_sketch_elements(b"AAGCTA", 1, &params(3, 2)).unwrap();
        assert_eq!(positions(&first), vec![0, 1, 3, 4]);
        assert_eq!(positions(&second), vec![0, 2, 3]);
        assert!(second.iter().all(|m| m.read_id == 1));
    }

    #[test]
    fn test_tie_selects_rightmost() {
        // AGC and GCT share the canonical representation of AGC
        let minimizers = generate_sketch_elements(b"AGCT", 0, &params(3, 2)).unwrap();
        assert_eq!(positions(&minimizers), vec![0, 1]);
        assert_eq!(minimizers[1].direction, Strand::Reverse);

        // AAG, AGC, GCT, CTA: central window [1, 2] keeps GCT only
        let central = generate_sketch_elements(b"AAGCTA", 0, &params(3, 2)).unwrap();
        assert_eq!(positions(&central), vec![0, 2, 3]);
        assert_eq!(central[1].direction, Strand::Reverse);
    }

    #[test]
    fn test_read_shorter_than_k() {
        assert!(generate_sketch_elements(b"ACG", 0, &params(4, 2)).unwrap().is_empty());
        assert!(generate_sketch_elements(b"", 0, &params(1, 1)).unwrap().is_empty());
    }

    #[test]
    fn test_window_larger_than_read() {
        // fewer k-mers than w: the whole read is one front window
        let minimizers = generate_sketch_elements(b"GATT", 0, &params(2, 10)).unwrap();
        assert_eq!(positions(&minimizers), vec![0, 1, 2]);
    }

    #[test]
    fn test_w1_emits_every_kmer() {
        let read = b"ACGTTGCAAC";
        let minimizers = generate_sketch_elements(read, 3, &params(4, 1)).unwrap();
        assert_eq!(minimizers.len(), read.len() - 4 + 1);
    }

    #[test]
    fn test_invalid_params_rejected() {
        assert!(generate_sketch_elements(b"ACGT", 0, &params(0, 1)).is_err());
        assert!(generate_sketch_elements(b"ACGT", 0, &params(4, 0)).is_err());
    }

    #[test]
    fn test_hashing_is_consistent() {
        let hashed = SketchParams::new(5, 3, true);
        let a = generate_sketch_elements(b"ACGTTGCAACGTTAGC", 0, &hashed).unwrap();
        let b = generate_sketch_elements(b"ACGTTGCAACGTTAGC", 0, &hashed).unwrap();
        assert_eq!(a, b);

        // a k-mer and its reverse complement hash to the same value
        let fwd = canonical_kmers(b"ACGTTGC", &hashed);
        let rev = canonical_kmers(b"GCAACGT", &hashed);
        assert_eq!(fwd[0].0, rev[2].0);
    }

    #[test]
    fn test_positions_non_decreasing() {
        let read = b"ACGGTACCATGACCGTTAGGCATCGATCGGATCCATTAGCAAAACCCGGGTTT";
        for w in 1..8 {
            let minimizers = generate_sketch_elements(read, 0, &params(5, w)).unwrap();
            assert!(minimizers
                .windows(2)
                .all(|p| p[0].position_in_read < p[1].position_in_read));
        }
    }
}
