/// Row-wise softmax over a `rows × cols` buffer, in place.
///
/// Subtracts each row's maximum before exponentiating so large logits do not
/// overflow.
pub fn softmax_rows(values: &mut [f32], cols: usize) {
    for row in values.chunks_exact_mut(cols) {
        let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mut sum = 0.0f32;
        for v in row.iter_mut() {
            *v = (*v - max).exp();
            sum += *v;
        }
        let inv = 1.0 / sum;
        for v in row.iter_mut() {
            *v *= inv;
        }
    }
}

/// Index of the maximum element in a slice. Ties resolve to the first index;
/// an empty slice yields 0.
pub fn argmax(v: &[f32]) -> usize {
    let mut best = 0;
    for (i, &x) in v.iter().enumerate().skip(1) {
        if x > v[best] {
            best = i;
        }
    }
    best
}
