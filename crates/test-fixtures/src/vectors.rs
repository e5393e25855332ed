//! Deterministic embeddings.

/// One-hot unit vector along axis `i`.
pub fn axis(dim: usize, i: usize) -> Vec<f32> {
    let mut v = vec![0.0; dim];
    v[i % dim] = 1.0;
    v
}

/// Unit vector whose cosine similarity with `axis(dim, i)` is `cosine`,
/// leaning toward axis `j` (`i != j`).
pub fn tilted(dim: usize, i: usize, j: usize, cosine: f64) -> Vec<f32> {
    let sine = (1.0 - cosine * cosine).max(0.0).sqrt();
    let mut v = vec![0.0; dim];
    v[i % dim] = cosine as f32;
    v[j % dim] = sine as f32;
    v
}

/// Pseudo-random unit vector derived from `seed` via blake3's XOF.
pub fn unit_vec(seed: &str, dim: usize) -> Vec<f32> {
    let mut reader = blake3::Hasher::new().update(seed.as_bytes()).finalize_xof();
    let mut bytes = vec![0u8; dim * 4];
    reader.fill(&mut bytes);
    let raw: Vec<f32> = bytes
        .chunks_exact(4)
        .map(|c| {
            let n = u32::from_le_bytes([c[0], c[1], c[2], c[3]]);
            (n as f64 / u32::MAX as f64 * 2.0 - 1.0) as f32
        })
        .collect();
    let norm = raw.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        return axis(dim, 0);
    }
    raw.into_iter().map(|x| x / norm).collect()
}
