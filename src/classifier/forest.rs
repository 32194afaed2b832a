// src/classifier/forest.rs
//! Random forest over dense feature rows: bootstrap samples, a random
//! √features subset at every split, Gini impurity.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestOptions {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for ForestOptions {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Leaf {
        distribution: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
}

/// Nodes are stored in an arena; index 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

struct TreeBuilder<'a> {
    rows: &'a [Vec<f32>],
    labels: &'a [usize],
    n_classes: usize,
    max_features: usize,
    options: &'a ForestOptions,
    rng: StdRng,
    nodes: Vec<Node>,
}

struct Candidate {
    feature: usize,
    threshold: f32,
    impurity: f64,
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|c| {
            let p = *c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

impl<'a> TreeBuilder<'a> {
    fn class_counts(&self, samples: &[usize]) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &s in samples {
            counts[self.labels[s]] += 1;
        }
        counts
    }

    fn leaf(&mut self, counts: &[usize], total: usize) -> usize {
        let distribution = counts
            .iter()
            .map(|c| if total > 0 { *c as f64 / total as f64 } else { 0.0 })
            .collect();
        self.nodes.push(Node::Leaf { distribution });
        self.nodes.len() - 1
    }

    fn grow(&mut self, samples: Vec<usize>, depth: usize) -> usize {
        let counts = self.class_counts(&samples);
        let impurity = gini(&counts, samples.len());

        let stop = impurity <= 0.0
            || samples.len() < self.options.min_samples_split
            || self.options.max_depth.map_or(false, |max| depth >= max);
        if stop {
            return self.leaf(&counts, samples.len());
        }

        let Some(best) = self.best_split(&samples) else {
            return self.leaf(&counts, samples.len());
        };
        if best.impurity >= impurity - 1e-12 {
            return self.leaf(&counts, samples.len());
        }

        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&s| self.rows[s][best.feature] <= best.threshold);

        // Reserve the split slot so children land after their parent.
        let slot = self.nodes.len();
        self.nodes.push(Node::Leaf {
            distribution: Vec::new(),
        });
        let left = self.grow(left, depth + 1);
        let right = self.grow(right, depth + 1);
        self.nodes[slot] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        slot
    }

    fn best_split(&mut self, samples: &[usize]) -> Option<Candidate> {
        let n_features = self.rows.first().map_or(0, Vec::len);
        if n_features == 0 {
            return None;
        }
        let features = index::sample(&mut self.rng, n_features, self.max_features.min(n_features));

        let mut best: Option<Candidate> = None;
        for feature in features.iter() {
            let mut values: Vec<(f32, usize)> = samples
                .iter()
                .map(|&s| (self.rows[s][feature], self.labels[s]))
                .collect();
            values.sort_by(|a, b| a.0.total_cmp(&b.0));

            let total = values.len();
            let mut left = vec![0usize; self.n_classes];
            let mut right = vec![0usize; self.n_classes];
            for (_, label) in &values {
                right[*label] += 1;
            }

            for i in 0..total - 1 {
                let label = values[i].1;
                left[label] += 1;
                right[label] -= 1;
                if values[i].0 == values[i + 1].0 {
                    continue;
                }
                let n_left = i + 1;
                let n_right = total - n_left;
                let weighted = (n_left as f64 * gini(&left, n_left)
                    + n_right as f64 * gini(&right, n_right))
                    / total as f64;
                if best.as_ref().map_or(true, |b| weighted < b.impurity) {
                    best = Some(Candidate {
                        feature,
                        threshold: (values[i].0 + values[i + 1].0) / 2.0,
                        impurity: weighted,
                    });
                }
            }
        }
        best
    }
}

impl DecisionTree {
    fn fit(
        rows: &[Vec<f32>],
        labels: &[usize],
        samples: Vec<usize>,
        n_classes: usize,
        options: &ForestOptions,
        rng: StdRng,
    ) -> Self {
        let n_features = rows.first().map_or(0, Vec::len);
        let max_features = ((n_features as f64).sqrt().ceil() as usize).max(1);
        let mut builder = TreeBuilder {
            rows,
            labels,
            n_classes,
            max_features,
            options,
            rng,
            nodes: Vec::new(),
        };
        builder.grow(samples, 0);
        Self {
            nodes: builder.nodes,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn predict_proba(&self, row: &[f32]) -> &[f64] {
        let mut current = 0;
        loop {
            match &self.nodes[current] {
                Node::Leaf { distribution } => return distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = row.get(*feature).copied().unwrap_or(0.0);
                    current = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    n_classes: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// `labels[i]` is the class index of `rows[i]`, below `n_classes`.
    /// Tree `i` draws its bootstrap sample and feature subsets from
    /// `seed + i`, so the result does not depend on thread scheduling.
    pub fn fit(rows: &[Vec<f32>], labels: &[usize], n_classes: usize, options: &ForestOptions) -> Self {
        let n = rows.len();
        let trees: Vec<DecisionTree> = (0..options.n_estimators.max(1))
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(options.seed.wrapping_add(i as u64));
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                DecisionTree::fit(rows, labels, bootstrap, n_classes, options, rng)
            })
            .collect();

        debug!(
            "Trained {} trees with {} nodes in total",
            trees.len(),
            trees.iter().map(DecisionTree::node_count).sum::<usize>()
        );
        Self { n_classes, trees }
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Mean of the trees' leaf distributions.
    pub fn predict_proba(&self, row: &[f32]) -> Vec<f64> {
        let mut probabilities = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (p, q) in probabilities.iter_mut().zip(tree.predict_proba(row)) {
                *p += q;
            }
        }
        let total: f64 = probabilities.iter().sum();
        if total > 0.0 {
            probabilities.iter_mut().for_each(|p| *p /= total);
        }
        probabilities
    }

    /// Highest-probability class; ties go to the lower index.
    pub fn predict(&self, row: &[f32]) -> usize {
        let probabilities = self.predict_proba(row);
        let mut best = 0;
        for (i, p) in probabilities.iter().enumerate() {
            if *p > probabilities[best] {
                best = i;
            }
        }
        best
    }
}
