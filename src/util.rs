use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Deterministic offset in `[-1, 1]` on both axes, derived from `id`.
pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::stable_pair;

    #[test]
    fn stable_pair_is_deterministic_and_bounded() {
        for id in ["a", "b", "entity-42", ""] {
            let (x, y) = stable_pair(id);
            assert_eq!((x, y), stable_pair(id));
            assert!((-1.0..=1.0).contains(&x));
            assert!((-1.0..=1.0).contains(&y));
        }
        assert_ne!(stable_pair("a"), stable_pair("b"));
    }
}
