//! Graph metrics of a weighted connectivity matrix
//!
//! Distances are `1 / (w + ε)` with all-pairs shortest paths by
//! Floyd–Warshall (O(n³), fine up to a few dozen channels). Every metric
//! tolerates channels missing from the montage tables by leaving them out
//! of the relevant average.

use std::collections::BTreeMap;

use rootstar_qeeg_core::math::{mean, median};
use rootstar_qeeg_core::{ConnectivityConfig, Montage};
use serde::Serialize;

use super::connectivity::ConnectivityMatrix;

/// Graph summary of one band's connectivity matrix
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NetworkMetrics {
    /// Mean inverse shortest-path distance, in [0, 1]
    pub global_efficiency: f64,
    /// Mean Onnela weighted clustering coefficient, in [0, 1]
    pub mean_clustering_coefficient: f64,
    /// Mean finite off-diagonal shortest-path distance
    pub characteristic_path_length: f64,
    /// Edge density of the median-thresholded binary graph
    pub edge_density: f64,
    /// σ = (C / C_rand) / (L / L_rand), 0 when undefined
    pub small_worldness: f64,
    /// Mean connectivity of homologous left/right pairs
    pub interhemispheric_connectivity: f64,
    /// Channel → row sum / (n − 1)
    pub node_strength: BTreeMap<String, f64>,
    /// Region (or `frontal_posterior`) → mean connectivity
    pub regional_connectivity: BTreeMap<String, f64>,
}

impl NetworkMetrics {
    /// Compute every metric of `matrix` whose rows follow `channels`
    pub fn compute(
        matrix: &ConnectivityMatrix,
        channels: &[String],
        montage: &Montage,
        config: &ConnectivityConfig,
    ) -> Self {
        let distances = shortest_path_lengths(matrix, config.distance_epsilon);
        let clustering = clustering_coefficients(matrix);
        let mean_clustering_coefficient = mean(&clustering);
        let characteristic_path_length = characteristic_path_length(&distances);
        let graph = BinaryGraph::median_threshold(matrix);

        Self {
            global_efficiency: global_efficiency(&distances),
            mean_clustering_coefficient,
            characteristic_path_length,
            edge_density: graph.density,
            small_worldness: graph.small_worldness(mean_clustering_coefficient, characteristic_path_length),
            interhemispheric_connectivity: interhemispheric(matrix, channels, montage),
            node_strength: node_strength(matrix, channels),
            regional_connectivity: regional(matrix, channels, montage),
        }
    }
}

/// All-pairs shortest paths over edge lengths `1 / (w + epsilon)`.
///
/// The diagonal is 0.
pub fn shortest_path_lengths(matrix: &ConnectivityMatrix, epsilon: f64) -> Vec<Vec<f64>> {
    let n = matrix.size();
    let mut dist: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            (0..n)
                .map(|j| if i == j { 0.0 } else { 1.0 / (matrix.get(i, j) + epsilon) })
                .collect()
        })
        .collect();

    for k in 0..n {
        for i in 0..n {
            let dik = dist[i][k];
            if !dik.is_finite() {
                continue;
            }
            for j in 0..n {
                let through = dik + dist[k][j];
                if through < dist[i][j] {
                    dist[i][j] = through;
                }
            }
        }
    }
    dist
}

/// Mean of `1 / d` over off-diagonal entries, non-finite terms counted as 0
pub fn global_efficiency(distances: &[Vec<f64>]) -> f64 {
    let n = distances.len();
    if n < 2 {
        return 0.0;
    }
    let mut sum = 0.0;
    for (i, row) in distances.iter().enumerate() {
        for (j, &d) in row.iter().enumerate() {
            if i == j {
                continue;
            }
            let inv = 1.0 / d;
            if inv.is_finite() {
                sum += inv;
            }
        }
    }
    (sum / (n * (n - 1)) as f64).clamp(0.0, 1.0)
}

fn characteristic_path_length(distances: &[Vec<f64>]) -> f64 {
    let finite: Vec<f64> = distances
        .iter()
        .enumerate()
        .flat_map(|(i, row)| row.iter().enumerate().filter(move |(j, _)| *j != i).map(|(_, &d)| d))
        .filter(|d| d.is_finite())
        .collect();
    mean(&finite)
}

/// Onnela weighted clustering coefficient of every node.
///
/// Weights are divided by the largest off-diagonal weight and cube-rooted; node `i`
/// sums `ŵ_ij · ŵ_jk · ŵ_ki` over ordered neighbour pairs and divides by
/// `k (k − 1)`. Nodes with fewer than two neighbours score 0.
pub fn clustering_coefficients(matrix: &ConnectivityMatrix) -> Vec<f64> {
    let n = matrix.size();
    let max = matrix.max_off_diagonal();
    if max <= 0.0 {
        return vec![0.0; n];
    }

    let w = |i: usize, j: usize| if i == j { 0.0 } else { (matrix.get(i, j) / max).cbrt() };

    (0..n)
        .map(|i| {
            let degree = (0..n).filter(|&j| j != i && matrix.get(i, j) > 0.0).count();
            if degree < 2 {
                return 0.0;
            }
            let mut triangles = 0.0;
            for j in (0..n).filter(|&j| j != i) {
                let wij = w(i, j);
                if wij == 0.0 {
                    continue;
                }
                for k in (0..n).filter(|&k| k != i && k != j) {
                    triangles += wij * w(j, k) * w(k, i);
                }
            }
            triangles / (degree * (degree - 1)) as f64
        })
        .collect()
}

/// Binary graph keeping edges strictly above the median off-diagonal weight
struct BinaryGraph {
    nodes: usize,
    density: f64,
    mean_degree: f64,
}

impl BinaryGraph {
    fn median_threshold(matrix: &ConnectivityMatrix) -> Self {
        let n = matrix.size();
        let weights = matrix.upper_triangle();
        if weights.is_empty() {
            return Self { nodes: n, density: 0.0, mean_degree: 0.0 };
        }
        let threshold = median(&weights);
        let edges = weights.iter().filter(|&&w| w > threshold).count() as f64;

        Self {
            nodes: n,
            density: edges / weights.len() as f64,
            mean_degree: 2.0 * edges / n as f64,
        }
    }

    /// σ against the analytic random-graph expectation
    /// `C_rand = p`, `L_rand = ln n / ln ⟨k⟩`
    fn small_worldness(&self, clustering: f64, path_length: f64) -> f64 {
        let c_rand = self.density;
        let l_rand = (self.nodes as f64).ln() / self.mean_degree.ln();

        let valid = |x: f64| x.is_finite() && x > 0.0;
        if !valid(c_rand) || !valid(l_rand) || !valid(path_length) {
            return 0.0;
        }

        let sigma = (clustering / c_rand) / (path_length / l_rand);
        if sigma.is_finite() {
            sigma
        } else {
            0.0
        }
    }
}

fn interhemispheric(matrix: &ConnectivityMatrix, channels: &[String], montage: &Montage) -> f64 {
    let index = channel_index(channels);
    let values: Vec<f64> = montage
        .homologous_pairs
        .iter()
        .filter_map(|p| Some(matrix.get(*index.get(p.left.as_str())?, *index.get(p.right.as_str())?)))
        .collect();
    mean(&values)
}

fn node_strength(matrix: &ConnectivityMatrix, channels: &[String]) -> BTreeMap<String, f64> {
    let n = matrix.size();
    channels
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let strength = if n < 2 {
                0.0
            } else {
                let sum: f64 = (0..n).filter(|&j| j != i).map(|j| matrix.get(i, j)).sum();
                sum / (n - 1) as f64
            };
            (name.clone(), strength)
        })
        .collect()
}

fn regional(matrix: &ConnectivityMatrix, channels: &[String], montage: &Montage) -> BTreeMap<String, f64> {
    let index = channel_index(channels);

    let mut out = BTreeMap::new();
    for region in &montage.regions {
        let idx = present_indices(&index, region.channels.iter().map(String::as_str));
        if idx.len() < 2 {
            continue;
        }
        let values: Vec<f64> = idx
            .iter()
            .enumerate()
            .flat_map(|(a, &i)| idx[a + 1..].iter().map(move |&j| (i, j)))
            .map(|(i, j)| matrix.get(i, j))
            .collect();
        out.insert(region.name.clone(), mean(&values));
    }

    let frontal = montage
        .region(&montage.frontal_region)
        .map(|g| present_indices(&index, g.channels.iter().map(String::as_str)))
        .unwrap_or_default();
    let posterior = present_indices(&index, montage.posterior_channels());
    if !frontal.is_empty() && !posterior.is_empty() {
        let values: Vec<f64> = frontal
            .iter()
            .flat_map(|&i| posterior.iter().map(move |&j| matrix.get(i, j)))
            .collect();
        out.insert(format!("{}_posterior", montage.frontal_region), mean(&values));
    }
    out
}

fn channel_index(channels: &[String]) -> BTreeMap<&str, usize> {
    channels.iter().enumerate().map(|(i, c)| (c.as_str(), i)).collect()
}

fn present_indices<'a>(index: &BTreeMap<&str, usize>, names: impl IntoIterator<Item = &'a str>) -> Vec<usize> {
    names.into_iter().filter_map(|c| index.get(c).copied()).collect()
}
