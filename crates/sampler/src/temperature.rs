/// Divide every logit by `temperature`. Zero (greedy) leaves them untouched.
pub fn apply(logits: &mut [f32], temperature: f32) {
    if temperature > 0.0 {
        for l in logits.iter_mut() {
            *l /= temperature;
        }
    }
}
