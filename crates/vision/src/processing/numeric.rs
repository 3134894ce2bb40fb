/// Logistic (sigmoid) function, split on the sign of `x` so `exp` never
/// sees a large positive argument.
#[inline]
pub fn logistic(x: f32) -> f32 {
    if x > 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Normalized exponential over `logits`, shifted by the maximum logit.
///
/// Returns an empty vector for empty input.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    let mut exps: Vec<f32> = logits.iter().map(|&v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();

    // sum >= 1 because the max entry contributes exp(0)
    for e in &mut exps {
        *e /= sum;
    }
    exps
}

/// Convert a center/size box to corners.
///
/// Every corner is clamped against 0 only. `x_max`/`y_max` may exceed 1 and
/// are not ordered against `x_min`/`y_min`.
#[inline]
pub fn center_to_corners(x: f32, y: f32, w: f32, h: f32) -> [f32; 4] {
    [
        (x - w / 2.0).max(0.0),
        (y - h / 2.0).max(0.0),
        (x + w / 2.0).max(0.0),
        (y + h / 2.0).max(0.0),
    ]
}
