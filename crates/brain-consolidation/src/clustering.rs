//! Greedy, order-preserving clustering with an all-members similarity check.

use brain_core::memory::MemoryRecord;

use crate::algorithms::similarity::cosine_similarity;

/// Group `records` by embedding similarity. Returns index groups covering
/// every input exactly once, in first-member order.
///
/// Each unassigned record opens a cluster and absorbs every later unassigned
/// record whose similarity is `>= threshold` with every member already in
/// the cluster. A record without an embedding stays a singleton.
pub fn cluster(records: &[MemoryRecord], threshold: f64) -> Vec<Vec<usize>> {
    let mut assigned = vec![false; records.len()];
    let mut clusters = Vec::new();

    for i in 0..records.len() {
        if assigned[i] {
            continue;
        }
        assigned[i] = true;
        let mut members = vec![i];

        if records[i].embedding.is_some() {
            for j in (i + 1)..records.len() {
                if assigned[j] {
                    continue;
                }
                let Some(candidate) = records[j].embedding.as_deref() else {
                    continue;
                };
                let fits = members.iter().all(|&m| {
                    records[m]
                        .embedding
                        .as_deref()
                        .is_some_and(|e| cosine_similarity(candidate, e) >= threshold)
                });
                if fits {
                    members.push(j);
                    assigned[j] = true;
                }
            }
        }
        clusters.push(members);
    }
    clusters
}

/// Smallest pairwise similarity inside one cluster; 1.0 for singletons.
pub fn min_pairwise_similarity(records: &[MemoryRecord], members: &[usize]) -> f64 {
    let mut min = 1.0f64;
    for (pos, &i) in members.iter().enumerate() {
        for &j in &members[pos + 1..] {
            if let (Some(a), Some(b)) = (records[i].embedding.as_deref(), records[j].embedding.as_deref()) {
                min = min.min(cosine_similarity(a, b));
            }
        }
    }
    min
}
