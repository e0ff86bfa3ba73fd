//! OD: Fixed-Width Clustering Detector
//!
//! ## Pipeline
//!
//! Readings accumulate in a batch. When the batch is full it goes through
//! three steps and is then drained completely:
//!
//! ```text
//! batch ──▶ 1. cluster ──▶ 2. score ──▶ 3. classify ──▶ forward / block
//!           greedy, one      distance      event vs error,
//!           pass, radius w   to the rest   trust update
//! ```
//!
//! ### 1. Clustering
//!
//! In arrival order each reading joins the first cluster whose center lies
//! within `cluster_width` (Euclidean, inclusive); the center moves to the
//! running mean of its members. Otherwise the reading opens a new cluster.
//! No merging, no reassignment.
//!
//! ### 2. Scoring
//!
//! A cluster's score is its average distance to the centers of all the
//! other clusters:
//!
//! ```text
//! score(c) = (1/(k−1)) · Σ_{j≠c} ‖center_c − center_j‖
//! ```
//!
//! With three or more clusters, a cluster is an outlier when its score
//! exceeds `mean + σ` over all cluster scores (population σ, strict).
//!
//! Two clusters always score the same, so σ is zero and the rule above can
//! never fire. There the smaller cluster is flagged, provided the two
//! centers are at least the configured distance threshold apart. Equal
//! sizes flag nothing. With a single cluster nothing is flagged.
//!
//! ### 3. Classification
//!
//! | Distinct sources in outlier cluster | Meaning | Trust |
//! |-------------------------------------|---------|-------|
//! | ≥ 2 | event (real phenomenon) | unchanged |
//! | 1   | error (faulty mote)     | error count += 1 |
//!
//! Both kinds are blocked. Every reading of the batch is recorded into the
//! metrics and counted toward its source's total.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use libm::sqrt;

use super::{DetectionSink, OutlierDetector};
use crate::constants::detection::{CLUSTERING_OPERATIONS, SCORE_STDDEV_FACTOR};
use crate::kernel::{euclidean, Vector4};
use crate::reading::{Reading, SourceId};
use crate::trust::TrustRegistry;

/// One cluster of a batch
///
/// Lives for a single batch.
#[derive(Debug, Clone, PartialEq)]
pub struct DataCluster {
    /// Running mean of the members
    pub center: Vector4,
    /// Batch indices of the members, ascending
    pub members: Vec<usize>,
    /// Average distance to the other cluster centers
    pub score: f64,
    /// Flagged by scoring
    pub is_outlier: bool,
}

impl DataCluster {
    fn singleton(index: usize, features: Vector4) -> Self {
        let mut members = Vec::new();
        members.push(index);
        Self {
            center: features,
            members,
            score: 0.0,
            is_outlier: false,
        }
    }

    fn absorb(&mut self, index: usize, features: &Vector4) {
        self.members.push(index);
        let n = self.members.len() as f64;
        for (c, x) in self.center.iter_mut().zip(features) {
            *c += (x - *c) / n;
        }
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the cluster has no members (never true once formed)
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Greedy single-pass fixed-width clustering
pub fn form_clusters(rows: &[Vector4], width: f64) -> Vec<DataCluster> {
    let mut clusters: Vec<DataCluster> = Vec::new();
    for (index, features) in rows.iter().enumerate() {
        match clusters
            .iter_mut()
            .find(|cluster| euclidean(features, &cluster.center) <= width)
        {
            Some(cluster) => cluster.absorb(index, features),
            None => clusters.push(DataCluster::singleton(index, *features)),
        }
    }
    clusters
}

/// Fill in each cluster's average distance to the other cluster centers
///
/// A lone cluster scores 0.
pub fn score_clusters(clusters: &mut [DataCluster]) {
    let centers: Vec<Vector4> = clusters.iter().map(|cluster| cluster.center).collect();
    let others = centers.len().saturating_sub(1);
    for (i, cluster) in clusters.iter_mut().enumerate() {
        if others == 0 {
            cluster.score = 0.0;
            continue;
        }
        let total: f64 = centers
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, center)| euclidean(&cluster.center, center))
            .sum();
        cluster.score = total / others as f64;
    }
}

/// Flag outlier clusters; returns how many were flagged
///
/// Three or more clusters: score strictly above `mean + σ`. Two clusters:
/// the smaller one, if the pair is at least `threshold` apart.
pub fn flag_outliers(clusters: &mut [DataCluster], threshold: f64) -> usize {
    for cluster in clusters.iter_mut() {
        cluster.is_outlier = false;
    }
    if let [first, second] = clusters {
        return flag_minority(first, second, threshold);
    }
    if clusters.len() <= 1 {
        return 0;
    }

    let n = clusters.len() as f64;
    let mean = clusters.iter().map(|c| c.score).sum::<f64>() / n;
    let variance = clusters
        .iter()
        .map(|c| (c.score - mean) * (c.score - mean))
        .sum::<f64>()
        / n;
    let cutoff = mean + SCORE_STDDEV_FACTOR * sqrt(variance);

    let mut flagged = 0;
    for cluster in clusters.iter_mut() {
        cluster.is_outlier = cluster.score > cutoff;
        if cluster.is_outlier {
            flagged += 1;
        }
    }
    flagged
}

fn flag_minority(first: &mut DataCluster, second: &mut DataCluster, threshold: f64) -> usize {
    // Both scores are the distance between the two centers
    if first.len() == second.len() || !(first.score >= threshold) {
        return 0;
    }
    let minority = if first.len() < second.len() { first } else { second };
    minority.is_outlier = true;
    1
}

/// Counts from the most recent batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Readings in the batch
    pub readings: usize,
    /// Clusters formed
    pub clusters: usize,
    /// Clusters flagged
    pub outlier_clusters: usize,
    /// Flagged clusters spanning several sources
    pub events: usize,
    /// Flagged clusters from a single source
    pub errors: usize,
}

/// OD detector state
#[derive(Debug, Clone)]
pub struct ClusteringDetector {
    batch: Vec<Reading>,
    batch_size: usize,
    cluster_width: f64,
    threshold: f64,
    trust: TrustRegistry,
    batches: u64,
    events: u64,
    errors: u64,
    last_batch: Option<BatchSummary>,
}

impl ClusteringDetector {
    /// Detector running on batches of `batch_size`
    pub fn new(batch_size: usize, cluster_width: f64, threshold: f64) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            batch: Vec::with_capacity(batch_size),
            batch_size,
            cluster_width,
            threshold,
            trust: TrustRegistry::new(),
            batches: 0,
            events: 0,
            errors: 0,
            last_batch: None,
        }
    }

    /// Per-source trust records
    pub fn trust(&self) -> &TrustRegistry {
        &self.trust
    }

    /// Batches processed
    pub fn batches(&self) -> u64 {
        self.batches
    }

    /// Event clusters seen so far
    pub fn events(&self) -> u64 {
        self.events
    }

    /// Error clusters seen so far
    pub fn errors(&self) -> u64 {
        self.errors
    }

    /// Summary of the last processed batch
    pub fn last_batch(&self) -> Option<BatchSummary> {
        self.last_batch
    }

    fn run_batch(&mut self, sink: &mut DetectionSink<'_>) {
        sink.process(CLUSTERING_OPERATIONS);
        self.batches += 1;

        let rows: Vec<Vector4> = self.batch.iter().map(Reading::features).collect();
        let mut clusters = form_clusters(&rows, self.cluster_width);
        score_clusters(&mut clusters);
        let outlier_clusters = flag_outliers(&mut clusters, self.threshold);

        let mut summary = BatchSummary {
            readings: self.batch.len(),
            clusters: clusters.len(),
            outlier_clusters,
            ..BatchSummary::default()
        };

        let mut flags = Vec::with_capacity(self.batch.len());
        flags.resize(self.batch.len(), false);
        for cluster in clusters.iter().filter(|cluster| cluster.is_outlier) {
            for &index in &cluster.members {
                flags[index] = true;
            }
            match self.single_source(cluster) {
                Some(source) => {
                    self.trust.record_error(source);
                    summary.errors += 1;
                }
                None => summary.events += 1,
            }
        }
        self.events += summary.events as u64;
        self.errors += summary.errors as u64;

        log_debug!(
            "OD: batch {} formed {} clusters, {} flagged ({} events, {} errors)",
            self.batches,
            summary.clusters,
            summary.outlier_clusters,
            summary.events,
            summary.errors
        );

        for (reading, outlier) in self.batch.drain(..).zip(flags) {
            self.trust.record_reading(reading.source_id);
            sink.classify(reading, outlier);
        }
        self.last_batch = Some(summary);
    }

    /// The only source in `cluster`, or `None` if several contributed
    fn single_source(&self, cluster: &DataCluster) -> Option<SourceId> {
        let mut sources: heapless::Vec<SourceId, 2> = heapless::Vec::new();
        for &index in &cluster.members {
            let source = self.batch[index].source_id;
            if !sources.contains(&source) && sources.push(source).is_err() {
                break;
            }
        }
        match sources.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }
}

impl OutlierDetector for ClusteringDetector {
    fn admit(&mut self, reading: Reading, sink: &mut DetectionSink<'_>) {
        sink.receive();
        self.batch.push(reading);
        if self.batch.len() >= self.batch_size {
            self.run_batch(sink);
        }
    }

    fn pending(&self) -> usize {
        self.batch.len()
    }

    fn release(&mut self) -> usize {
        self.batch.drain(..).count()
    }

    fn name(&self) -> &'static str {
        "OD"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::EnergyAccountant;
    use crate::metrics::DetectionMetrics;

    fn row(t: f64) -> Vector4 {
        [t, 40.0, 100.0, 2.5]
    }

    #[test]
    fn readings_within_width_share_a_cluster() {
        let rows = [row(20.0), row(22.0), row(120.0), row(21.0)];
        let clusters = form_clusters(&rows, 5.0);

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].members, [0, 1, 3]);
        assert_eq!(clusters[1].members, [2]);
        assert!((clusters[0].center[0] - 21.0).abs() < 1e-12);
    }

    #[test]
    fn width_is_inclusive() {
        let clusters = form_clusters(&[row(0.0), row(5.0)], 5.0);
        assert_eq!(clusters.len(), 1);
    }

    #[test]
    fn minority_cluster_far_away_is_flagged() {
        let mut rows = [row(20.0); 6];
        rows[4] = row(120.0);
        rows[5] = row(120.5);
        let mut clusters = form_clusters(&rows, 5.0);
        score_clusters(&mut clusters);

        assert_eq!(clusters.len(), 2);
        assert_eq!(flag_outliers(&mut clusters, 15.0), 1);
        assert!(!clusters[0].is_outlier);
        assert!(clusters[1].is_outlier);
    }

    #[test]
    fn balanced_clusters_flag_nothing() {
        let rows = [row(20.0), row(20.0), row(120.0), row(120.0)];
        let mut clusters = form_clusters(&rows, 5.0);
        score_clusters(&mut clusters);
        assert_eq!(flag_outliers(&mut clusters, 15.0), 0);
    }

    #[test]
    fn single_cluster_flags_nothing() {
        let rows = [row(20.0), row(21.0), row(22.0)];
        let mut clusters = form_clusters(&rows, 50.0);
        score_clusters(&mut clusters);
        assert_eq!(flag_outliers(&mut clusters, 0.0), 0);
    }

    #[test]
    fn close_pair_is_not_flagged() {
        let rows = [row(20.0), row(20.0), row(20.0), row(30.0)];
        let mut clusters = form_clusters(&rows, 5.0);
        score_clusters(&mut clusters);
        assert_eq!(flag_outliers(&mut clusters, 15.0), 0);
    }

    #[test]
    fn two_cluster_scores_are_the_center_distance() {
        let rows = [row(20.0), row(20.0), row(20.0), row(60.0)];
        let mut clusters = form_clusters(&rows, 5.0);
        score_clusters(&mut clusters);
        assert_eq!(clusters[0].score, 40.0);
        assert_eq!(clusters[1].score, 40.0);
    }

    /// Average distance to the other centers, flagged strictly above mean + σ
    fn reference_flags(centers: &[f64]) -> Vec<bool> {
        let k = centers.len() as f64;
        let scores: Vec<f64> = centers
            .iter()
            .map(|a| centers.iter().map(|b| (a - b).abs()).sum::<f64>() / (k - 1.0))
            .collect();
        let mean = scores.iter().sum::<f64>() / k;
        let sigma = sqrt(scores.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / k);
        scores.iter().map(|s| *s > mean + sigma).collect()
    }

    fn flags_for(rows: &[Vector4], width: f64, threshold: f64) -> (Vec<f64>, Vec<bool>) {
        let mut clusters = form_clusters(rows, width);
        score_clusters(&mut clusters);
        flag_outliers(&mut clusters, threshold);
        let centers = clusters.iter().map(|c| c.center[0]).collect();
        let flags = clusters.iter().map(|c| c.is_outlier).collect();
        (centers, flags)
    }

    #[test]
    fn three_clusters_follow_mean_plus_sigma() {
        // Equidistant ends: scores 150, 100, 150, nothing above mean + σ
        let mut rows = vec![row(20.0); 10];
        rows.push(row(120.0));
        rows.push(row(220.0));
        let (centers, flags) = flags_for(&rows, 5.0, 15.0);
        assert_eq!(centers.len(), 3);
        assert_eq!(flags, reference_flags(&centers));
        assert_eq!(flags, [false, false, false]);

        // Scores 6.5, 5, 8.5: the far singleton stands out even below the threshold
        let mut rows = vec![row(0.0); 10];
        rows.push(row(3.0));
        rows.push(row(10.0));
        let (centers, flags) = flags_for(&rows, 1.0, 15.0);
        assert_eq!(flags, reference_flags(&centers));
        assert_eq!(flags, [false, false, true]);
    }

    #[test]
    fn four_clusters_flag_the_straggler() {
        let mut rows = vec![row(0.0); 5];
        rows.extend([row(10.0), row(20.0), row(200.0)]);
        let (centers, flags) = flags_for(&rows, 1.0, 15.0);
        assert_eq!(centers.len(), 4);
        assert_eq!(flags, reference_flags(&centers));
        assert_eq!(flags, [false, false, false, true]);
    }

    fn run(detector: &mut ClusteringDetector, readings: &[Reading]) -> (DetectionMetrics, usize) {
        let mut metrics = DetectionMetrics::new();
        let mut energy = EnergyAccountant::new(5.0);
        let mut forwarded = 0;
        for reading in readings {
            let mut sink = DetectionSink::new(&mut metrics, &mut energy, 256, 30.0);
            detector.admit(*reading, &mut sink);
            forwarded += sink.finish().forwarded.len();
        }
        (metrics, forwarded)
    }

    #[test]
    fn single_source_outlier_is_an_error() {
        let mut readings: Vec<Reading> = (0..4).map(|i| Reading::new(i, 20.0, 40.0, 100.0, 2.5)).collect();
        readings.push(Reading::new(7, 150.0, 40.0, 100.0, 2.5).with_ground_truth(true));
        readings.push(Reading::new(7, 151.0, 40.0, 100.0, 2.5).with_ground_truth(true));

        let mut detector = ClusteringDetector::new(6, 5.0, 15.0);
        let (metrics, forwarded) = run(&mut detector, &readings);

        assert_eq!(forwarded, 4);
        assert_eq!(metrics.matrix().true_positives, 2);
        assert_eq!(metrics.total_samples(), 6);
        assert_eq!(detector.errors(), 1);
        // One error cluster is one error, whatever its size
        assert_eq!(detector.trust().record(7).unwrap().error_count, 1);
        assert_eq!(detector.trust().trust(7), 0.5);
        assert_eq!(detector.pending(), 0);
    }

    #[test]
    fn multi_source_outlier_is_an_event() {
        let mut readings: Vec<Reading> = (0..4).map(|i| Reading::new(i, 20.0, 40.0, 100.0, 2.5)).collect();
        readings.push(Reading::new(7, 150.0, 40.0, 100.0, 2.5));
        readings.push(Reading::new(8, 151.0, 40.0, 100.0, 2.5));

        let mut detector = ClusteringDetector::new(6, 5.0, 15.0);
        let (metrics, forwarded) = run(&mut detector, &readings);

        assert_eq!(forwarded, 4);
        assert_eq!(metrics.matrix().false_positives, 2);
        assert_eq!(detector.events(), 1);
        assert_eq!(detector.errors(), 0);
        assert_eq!(detector.trust().trust(7), 1.0);
        assert_eq!(detector.last_batch().unwrap().clusters, 2);
    }
}
