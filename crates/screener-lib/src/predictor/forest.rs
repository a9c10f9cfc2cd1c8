//! Random forest classifier
//!
//! Bagged CART trees with Gini impurity. Each tree is fit on a bootstrap
//! sample and considers a random subset of features at every split; class
//! probabilities are the mean of the per-tree leaf distributions. All
//! randomness flows from one seed, so a fit is reproducible bit for bit.

use super::preprocess::FeatureRow;
use crate::models::{SeverityLabel, NUM_ITEMS};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use sha2::{Digest, Sha256};

/// Class distribution over the severity labels
pub type ClassDistribution = [f64; SeverityLabel::COUNT];

/// Forest hyperparameters
#[derive(Debug, Clone, PartialEq)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub seed: u64,
    /// Candidate features per split; `None` uses floor(sqrt(n_features))
    pub max_features: Option<usize>,
    pub min_samples_split: usize,
    pub max_depth: Option<usize>,
    pub bootstrap: bool,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            seed: 42,
            max_features: None,
            min_samples_split: 2,
            max_depth: None,
            bootstrap: true,
        }
    }
}

impl ForestConfig {
    fn features_per_split(&self) -> usize {
        self.max_features
            .unwrap_or_else(|| (NUM_ITEMS as f64).sqrt().floor() as usize)
            .clamp(1, NUM_ITEMS)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        distribution: ClassDistribution,
    },
}

/// A single fitted classification tree stored as a flat node array
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Class distribution of the leaf `row` falls into
    pub fn predict_proba(&self, row: &FeatureRow) -> &ClassDistribution {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
                Node::Leaf { distribution } => return distribution,
            }
        }
    }

    #[cfg(test)]
    fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[cfg(test)]
    fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n, Node::Leaf { .. })).count()
    }

    #[cfg(test)]
    fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
                Node::Leaf { .. } => 0,
            }
        }
        walk(&self.nodes, 0)
    }

    fn digest(&self, hasher: &mut Sha256) {
        for node in &self.nodes {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    hasher.update([0u8]);
                    hasher.update((*feature as u64).to_le_bytes());
                    hasher.update(threshold.to_le_bytes());
                    hasher.update((*left as u64).to_le_bytes());
                    hasher.update((*right as u64).to_le_bytes());
                }
                Node::Leaf { distribution } => {
                    hasher.update([1u8]);
                    for p in distribution {
                        hasher.update(p.to_le_bytes());
                    }
                }
            }
        }
    }
}

/// Fits one tree; borrows the training matrix for the duration of the fit
struct TreeBuilder<'a> {
    x: &'a [FeatureRow],
    y: &'a [usize],
    config: &'a ForestConfig,
    features_per_split: usize,
    rng: StdRng,
    nodes: Vec<Node>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl<'a> TreeBuilder<'a> {
    fn build(mut self, mut samples: Vec<usize>) -> DecisionTree {
        self.grow(&mut samples, 0);
        DecisionTree { nodes: self.nodes }
    }

    /// Grow the subtree for `samples`, returning its node index
    fn grow(&mut self, samples: &mut [usize], depth: usize) -> usize {
        let counts = class_counts(self.y, samples);
        let is_pure = counts.iter().filter(|c| **c > 0).count() <= 1;
        let depth_reached = self.config.max_depth.is_some_and(|max| depth >= max);

        if is_pure || samples.len() < self.config.min_samples_split || depth_reached {
            return self.push_leaf(&counts, samples.len());
        }

        let Some(best) = self.find_split(samples, &counts) else {
            return self.push_leaf(&counts, samples.len());
        };

        let mid = partition(samples, |&i| self.x[i][best.feature] <= best.threshold);
        let idx = self.nodes.len();
        self.nodes.push(Node::Leaf {
            distribution: [0.0; SeverityLabel::COUNT],
        });

        let (left_samples, right_samples) = samples.split_at_mut(mid);
        let left = self.grow(left_samples, depth + 1);
        let right = self.grow(right_samples, depth + 1);

        self.nodes[idx] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        idx
    }

    fn push_leaf(&mut self, counts: &[usize; SeverityLabel::COUNT], total: usize) -> usize {
        let total = total.max(1) as f64;
        let distribution = counts.map(|c| c as f64 / total);
        self.nodes.push(Node::Leaf { distribution });
        self.nodes.len() - 1
    }

    /// Best Gini split over a random feature subset.
    ///
    /// Features are visited in random order; at least `features_per_split`
    /// are examined, and the search continues past that only while no valid
    /// split has been found.
    fn find_split(&mut self, samples: &[usize], parent_counts: &[usize; SeverityLabel::COUNT]) -> Option<BestSplit> {
        let mut features: [usize; NUM_ITEMS] = std::array::from_fn(|j| j);
        features.shuffle(&mut self.rng);

        let mut best: Option<BestSplit> = None;
        let mut sorted: Vec<usize> = samples.to_vec();

        for (visited, &feature) in features.iter().enumerate() {
            if visited >= self.features_per_split && best.is_some() {
                break;
            }

            sorted.sort_by(|&a, &b| {
                self.x[a][feature]
                    .partial_cmp(&self.x[b][feature])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            if let Some(candidate) = best_threshold(self.x, self.y, &sorted, feature, parent_counts) {
                if best.as_ref().map_or(true, |b| candidate.impurity < b.impurity) {
                    best = Some(candidate);
                }
            }
        }

        best
    }
}

/// Scan sorted samples for the threshold with the lowest weighted Gini
fn best_threshold(
    x: &[FeatureRow],
    y: &[usize],
    sorted: &[usize],
    feature: usize,
    parent_counts: &[usize; SeverityLabel::COUNT],
) -> Option<BestSplit> {
    let n = sorted.len();
    let mut left = [0usize; SeverityLabel::COUNT];
    let mut right = *parent_counts;
    let mut best: Option<BestSplit> = None;

    for i in 0..n.saturating_sub(1) {
        let class = y[sorted[i]];
        left[class] += 1;
        right[class] -= 1;

        let here = x[sorted[i]][feature];
        let next = x[sorted[i + 1]][feature];
        if next <= here {
            continue;
        }

        let n_left = i + 1;
        let n_right = n - n_left;
        let impurity = n_left as f64 * gini(&left, n_left) + n_right as f64 * gini(&right, n_right);

        if best.as_ref().map_or(true, |b| impurity < b.impurity) {
            let mut threshold = here + (next - here) / 2.0;
            // Midpoint can round up to `next` for adjacent floats
            if threshold >= next {
                threshold = here;
            }
            best = Some(BestSplit {
                feature,
                threshold,
                impurity,
            });
        }
    }

    best
}

fn gini(counts: &[usize; SeverityLabel::COUNT], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

fn class_counts(y: &[usize], samples: &[usize]) -> [usize; SeverityLabel::COUNT] {
    let mut counts = [0usize; SeverityLabel::COUNT];
    for &i in samples {
        counts[y[i]] += 1;
    }
    counts
}

/// Stable in-place partition; returns the number of elements satisfying `pred`
fn partition(samples: &mut [usize], pred: impl Fn(&usize) -> bool) -> usize {
    let (mut yes, no): (Vec<usize>, Vec<usize>) = samples.iter().partition(|&&i| pred(&i));
    let mid = yes.len();
    yes.extend(no);
    samples.copy_from_slice(&yes);
    mid
}

/// Ensemble of randomized decision trees
#[derive(Debug, Clone, PartialEq)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit a forest on dense rows `x` with class indices `y` of the same length
    pub(crate) fn fit(x: &[FeatureRow], y: &[usize], config: &ForestConfig) -> Self {
        debug_assert_eq!(x.len(), y.len(), "feature and label counts differ");

        let mut master = StdRng::seed_from_u64(config.seed);
        let features_per_split = config.features_per_split();
        let n = x.len();

        let trees = (0..config.n_estimators)
            .map(|_| {
                let mut rng = StdRng::seed_from_u64(master.gen());
                let samples: Vec<usize> = if config.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };

                TreeBuilder {
                    x,
                    y,
                    config,
                    features_per_split,
                    rng,
                    nodes: Vec::new(),
                }
                .build(samples)
            })
            .collect();

        Self { trees }
    }

    /// Mean class distribution across trees
    pub fn predict_proba(&self, row: &FeatureRow) -> ClassDistribution {
        let mut total = [0.0f64; SeverityLabel::COUNT];
        for tree in &self.trees {
            for (acc, p) in total.iter_mut().zip(tree.predict_proba(row)) {
                *acc += p;
            }
        }
        let n = self.trees.len().max(1) as f64;
        total.map(|p| p / n)
    }

    /// Most probable class index; ties go to the lower index
    pub fn predict(&self, row: &FeatureRow) -> usize {
        argmax(&self.predict_proba(row)).0
    }

    #[cfg(test)]
    fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub(crate) fn digest(&self, hasher: &mut Sha256) {
        hasher.update((self.trees.len() as u64).to_le_bytes());
        for tree in &self.trees {
            hasher.update((tree.nodes.len() as u64).to_le_bytes());
            tree.digest(hasher);
        }
    }
}

/// Index and value of the largest entry; first wins on ties
pub fn argmax(distribution: &ClassDistribution) -> (usize, f64) {
    let mut best = (0, distribution[0]);
    for (i, &p) in distribution.iter().enumerate().skip(1) {
        if p > best.1 {
            best = (i, p);
        }
    }
    best
}
