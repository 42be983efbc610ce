//! Lempel-Ziv complexity (LZ76)

use std::collections::BTreeMap;

use rootstar_qeeg_core::math::{mean, median};
use rootstar_qeeg_core::EpochSet;
use serde::Serialize;

/// Complexity of one channel
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Complexity {
    /// Phrase count averaged over epochs
    pub lzc: f64,
    /// `lzc / log2(n)` for `n` samples per epoch (`lzc` itself when `n ≤ 1`)
    pub normalized_lzc: f64,
}

/// Channel → complexity
pub type ComplexityTable = BTreeMap<String, Complexity>;

/// Symbol sequence: 1 where the sample is strictly above the median
pub fn binarize(signal: &[f64]) -> Vec<u8> {
    let threshold = median(signal);
    signal.iter().map(|&x| u8::from(x > threshold)).collect()
}

/// LZ76 phrase count of a symbol sequence.
///
/// The window starting at `start` grows while it can be copied from the
/// history preceding its last symbol. Each time it cannot, one phrase is
/// counted and the next window starts right after it. An unfinished
/// trailing window is one more phrase.
pub fn lempel_ziv_76(symbols: &[u8]) -> usize {
    let n = symbols.len();
    let mut phrases = 0;
    let mut start = 0;
    let mut len = 1;

    while start + len <= n {
        let candidate = &symbols[start..start + len];
        let history = &symbols[..start + len - 1];
        if contains(history, candidate) {
            len += 1;
        } else {
            phrases += 1;
            start += len;
            len = 1;
        }
    }

    if start < n {
        phrases += 1;
    }
    phrases
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.len() <= haystack.len() && haystack.windows(needle.len()).any(|w| w == needle)
}

/// Complexity of every channel, averaged over epochs
pub fn compute(epochs: &EpochSet) -> ComplexityTable {
    let n = epochs.n_samples();
    let max_complexity = if n > 1 { (n as f64).log2() } else { 1.0 };

    epochs
        .channels()
        .iter()
        .enumerate()
        .map(|(ch, name)| {
            let counts: Vec<f64> = (0..epochs.n_epochs())
                .map(|e| lempel_ziv_76(&binarize(epochs.signal(e, ch))) as f64)
                .collect();
            let lzc = mean(&counts);
            (name.clone(), Complexity { lzc, normalized_lzc: lzc / max_complexity })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64;
    use rootstar_qeeg_core::Condition;

    #[test]
    fn test_known_sequences() {
        // 0 | 1 | 01... copied to the end, then the trailing fragment
        assert_eq!(lempel_ziv_76(&[0, 1, 0, 1, 0, 1, 0, 1]), 3);
        assert_eq!(lempel_ziv_76(&[0; 16]), 2);
        assert_eq!(lempel_ziv_76(&[0, 0, 0, 1, 1, 0, 1, 0]), 4);
        assert_eq!(lempel_ziv_76(&[]), 0);
        assert_eq!(lempel_ziv_76(&[1]), 1);
    }

    #[test]
    fn test_binarize_against_median() {
        assert_eq!(binarize(&[3.0, 1.0, 2.0, 5.0]), vec![1, 0, 0, 1]);
        assert_eq!(binarize(&[4.0; 3]), vec![0, 0, 0]);
    }

    #[test]
    fn test_constant_signal_is_minimal() {
        let epochs =
            EpochSet::new(100.0, vec!["Cz".into()], Condition::EyesOpen, 3, 200, vec![1.5; 600]).unwrap();
        let table = compute(&epochs);
        assert_eq!(table["Cz"].lzc, 2.0);
    }

    #[test]
    fn test_normalized_by_log2_of_epoch_length() {
        // Constant epochs of 256 samples parse into 2 phrases each
        let epochs =
            EpochSet::new(100.0, vec!["Cz".into()], Condition::EyesOpen, 2, 256, vec![0.0; 512]).unwrap();
        let c = compute(&epochs)["Cz"];
        assert_eq!(c.lzc, 2.0);
        assert!((c.normalized_lzc - 0.25).abs() < 1e-12);

        let single = EpochSet::new(100.0, vec!["Cz".into()], Condition::EyesOpen, 1, 1, vec![3.0]).unwrap();
        let c = compute(&single)["Cz"];
        assert_eq!((c.lzc, c.normalized_lzc), (1.0, 1.0));
    }

    #[test]
    fn test_noise_is_more_complex_than_rhythm() {
        let mut rng = Pcg64::seed_from_u64(7);
        let n = 2000;
        let data: Vec<f64> = (0..2 * n).map(|_| rng.random::<f64>() - 0.5).collect();
        let epochs =
            EpochSet::new(250.0, vec!["Oz".into()], Condition::EyesClosed, 2, n, data).unwrap();

        let c = compute(&epochs)["Oz"];
        assert!((c.normalized_lzc - c.lzc / (n as f64).log2()).abs() < 1e-12);
        // Random bits parse into roughly n / log2(n) phrases
        let expected = n as f64 / (n as f64).log2();
        assert!(c.lzc > 0.7 * expected && c.lzc < 1.3 * expected, "lzc {}", c.lzc);

        let sine: Vec<f64> = (0..n).map(|i| (i as f64 * 0.05).sin()).collect();
        let periodic = lempel_ziv_76(&binarize(&sine)) as f64;
        assert!(periodic < c.lzc / 4.0);
    }
}
