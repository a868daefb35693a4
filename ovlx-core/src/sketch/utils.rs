//! Shared utilities for sketching: 2-bit encoding, rolling canonical k-mers
//! and the representation hash.

use crate::types::{Representation, Strand};

/// Encode a nucleotide to its 2-bit representation. Bytes outside ACGT pass
/// through as A.
pub fn encode_nucleotide(nucleotide: u8) -> u64 {
    match nucleotide.to_ascii_uppercase() {
        b'C' => 1,
        b'G' => 2,
        b'T' => 3,
        _ => 0,
    }
}

/// Generate reverse complement of a sequence
pub fn reverse_complement(sequence: &[u8]) -> Vec<u8> {
    sequence
        .iter()
        .rev()
        .map(|&nucleotide| complement_nucleotide(nucleotide))
        .collect()
}

/// Get complement of a single nucleotide
pub fn complement_nucleotide(nucleotide: u8) -> u8 {
    match nucleotide.to_ascii_uppercase() {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        _ => nucleotide,
    }
}

/// Bit mask covering the low `2k` bits
pub fn kmer_mask(k: usize) -> u64 {
    if k >= 32 {
        u64::MAX
    } else {
        (1u64 << (2 * k)) - 1
    }
}

/// Pack a k-mer into 2 bits per base, first base in the most significant
/// position.
pub fn pack_kmer(kmer: &[u8]) -> u64 {
    kmer.iter()
        .fold(0u64, |acc, &b| (acc << 2) | encode_nucleotide(b))
}

/// Canonical representation of a forward/reverse-complement pair of packings.
/// Palindromes resolve to `Forward`.
pub fn canonical(forward: u64, reverse: u64) -> (Representation, Strand) {
    if reverse < forward {
        (reverse, Strand::Reverse)
    } else {
        (forward, Strand::Forward)
    }
}

/// Thomas Wang's invertible 64-bit integer mix restricted to `mask`.
/// Equal inputs always produce equal outputs; distinct inputs within the mask
/// stay distinct.
pub fn hash64(key: u64, mask: u64) -> u64 {
    let mut key = key;
    key = (!key).wrapping_add(key << 21) & mask;
    key ^= key >> 24;
    key = (key.wrapping_add(key << 3)).wrapping_add(key << 8) & mask;
    key ^= key >> 14;
    key = (key.wrapping_add(key << 2)).wrapping_add(key << 4) & mask;
    key ^= key >> 28;
    key = key.wrapping_add(key << 31) & mask;
    key
}

/// Rolling encoder keeping the forward and reverse-complement packings of
/// the last `k` bases.
pub struct KmerEncoder {
    k: usize,
    mask: u64,
    shift: usize,
    forward: u64,
    reverse: u64,
    filled: usize,
}

impl KmerEncoder {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            mask: kmer_mask(k),
            shift: 2 * (k - 1),
            forward: 0,
            reverse: 0,
            filled: 0,
        }
    }

    /// Push the next base. Returns the (forward, reverse-complement) packings
    /// once `k` bases have been seen.
    pub fn push(&mut self, nucleotide: u8) -> Option<(u64, u64)> {
        let code = encode_nucleotide(nucleotide);
        self.forward = ((self.forward << 2) | code) & self.mask;
        self.reverse = (self.reverse >> 2) | ((3 - code) << self.shift);
        self.filled += 1;

        (self.filled >= self.k).then_some((self.forward, self.reverse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nucleotide_encoding() {
        assert_eq!(encode_nucleotide(b'A'), 0);
        assert_eq!(encode_nucleotide(b'c'), 1);
        assert_eq!(encode_nucleotide(b'G'), 2);
        assert_eq!(encode_nucleotide(b't'), 3);
        assert_eq!(encode_nucleotide(b'N'), 0);
    }

    #[test]
    fn test_reverse_complement() {
        let sequence = b"ATCG";
        let rc = reverse_complement(sequence);
        assert_eq!(rc, b"CGAT");
    }

    #[test]
    fn test_pack_kmer() {
        assert_eq!(pack_kmer(b"GATT"), 0b10_00_11_11);
        assert_eq!(pack_kmer(b"AATC"), 0b00_00_11_01);
    }

    #[test]
    fn test_kmer_mask_full_width() {
        assert_eq!(kmer_mask(32), u64::MAX);
        assert_eq!(kmer_mask(2), 0b1111);
    }

    #[test]
    fn test_encoder_matches_packing() {
        let seq = b"CATCAAGTTGCA";
        let k = 5;
        let mut encoder = KmerEncoder::new(k);
        let mut emitted = Vec::new();
        for &b in seq {
            if let Some(pair) = encoder.push(b) {
                emitted.push(pair);
            }
        }

        assert_eq!(emitted.len(), seq.len() - k + 1);
        for (i, &(fwd, rev)) in emitted.iter().enumerate() {
            let kmer = &seq[i..i + k];
            assert_eq!(fwd, pack_kmer(kmer));
            assert_eq!(rev, pack_kmer(&reverse_complement(kmer)));
        }
    }

    #[test]
    fn test_encoder_full_width_kmer() {
        let seq = b"ACGTACGTACGTACGTACGTACGTACGTACGTT";
        let mut encoder = KmerEncoder::new(32);
        let mut last = None;
        for &b in seq {
            last = encoder.push(b).or(last);
        }
        let (fwd, rev) = last.unwrap();
        assert_eq!(fwd, pack_kmer(&seq[1..]));
        assert_eq!(rev, pack_kmer(&reverse_complement(&seq[1..])));
    }

    #[test]
    fn test_canonical_palindrome_is_forward() {
        // AT is its own reverse complement
        let at = pack_kmer(b"AT");
        assert_eq!(canonical(at, at), (at, Strand::Forward));
        assert_eq!(canonical(15, 0), (0, Strand::Reverse));
    }

    #[test]
    fn test_hash_is_consistent_and_masked() {
        let mask = kmer_mask(11);
        let a = hash64(12345, mask);
        assert_eq!(a, hash64(12345, mask));
        assert!(a <= mask);
        assert_ne!(hash64(12345, mask), hash64(12346, mask));
    }
}
