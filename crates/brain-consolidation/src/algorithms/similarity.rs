//! Cosine similarity over `f32` embeddings, accumulated in `f64`.

/// Cosine similarity between two vectors, clamped to [-1, 1].
/// Returns 0.0 for mismatched lengths, empty, or zero-magnitude vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (mut dot, mut mag_a, mut mag_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }
    let denom = mag_a.sqrt() * mag_b.sqrt();
    if denom < f64::EPSILON || !denom.is_finite() {
        0.0
    } else {
        (dot / denom).clamp(-1.0, 1.0)
    }
}

/// Similarity of two optional embeddings; absent on either side reads as 0.0.
pub fn similarity_of(a: Option<&[f32]>, b: Option<&[f32]>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => cosine_similarity(a, b),
        _ => 0.0,
    }
}

/// Round to four decimal places, as reported in evidence payloads.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
