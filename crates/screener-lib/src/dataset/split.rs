//! Stratified train/evaluation split
//!
//! Each label contributes to the evaluation subset in proportion to its
//! share of the corpus. Quotas are floor-allocated and the remainder goes to
//! the labels with the largest fractional parts, so the evaluation subset has
//! `ceil(n * test_ratio)` rows whenever the class caps allow it. A label with
//! a single example is kept entirely in the training subset.

use crate::models::{SeverityLabel, TrainingExample};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Result of a split
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train: Vec<TrainingExample>,
    pub test: Vec<TrainingExample>,
}

/// Split `examples` into training and evaluation subsets, stratified by label
pub fn stratified_split(examples: &[TrainingExample], test_ratio: f64, seed: u64) -> Split {
    let n = examples.len();
    let mut rng = StdRng::seed_from_u64(seed);

    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); SeverityLabel::COUNT];
    for (idx, example) in examples.iter().enumerate() {
        groups[example.label.index()].push(idx);
    }
    for group in &mut groups {
        group.shuffle(&mut rng);
    }

    let quotas = allocate_test_quotas(&groups, n, test_ratio);

    let mut train = Vec::with_capacity(n);
    let mut test = Vec::with_capacity(quotas.iter().sum());
    for (group, quota) in groups.iter().zip(&quotas) {
        let (held_out, rest) = group.split_at(*quota);
        test.extend(held_out.iter().map(|&i| examples[i].clone()));
        train.extend(rest.iter().map(|&i| examples[i].clone()));
    }

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    Split { train, test }
}

fn allocate_test_quotas(groups: &[Vec<usize>], n: usize, test_ratio: f64) -> Vec<usize> {
    if n == 0 {
        return vec![0; groups.len()];
    }

    // Guard against 0.2 * n landing a hair above an integer
    let target = ((n as f64) * test_ratio.clamp(0.0, 1.0) - 1e-9).ceil().max(0.0) as usize;
    let caps: Vec<usize> = groups.iter().map(|g| g.len().saturating_sub(1)).collect();

    let ideals: Vec<f64> = groups
        .iter()
        .map(|g| g.len() as f64 * target as f64 / n as f64)
        .collect();
    let mut quotas: Vec<usize> = ideals
        .iter()
        .zip(&caps)
        .map(|(ideal, cap)| (ideal.floor() as usize).min(*cap))
        .collect();

    let mut order: Vec<usize> = (0..groups.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = ideals[a] - ideals[a].floor();
        let rb = ideals[b] - ideals[b].floor();
        rb.partial_cmp(&ra)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(groups[b].len().cmp(&groups[a].len()))
            .then(a.cmp(&b))
    });

    let mut remaining = target.saturating_sub(quotas.iter().sum());
    while remaining > 0 {
        let mut progressed = false;
        for &class in &order {
            if remaining == 0 {
                break;
            }
            if quotas[class] < caps[class] {
                quotas[class] += 1;
                remaining -= 1;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }

    quotas
}
