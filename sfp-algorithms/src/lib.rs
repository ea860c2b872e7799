use ahash::RandomState;
pub fn seeded_hasher(seed: &[u8; 32]) -> RandomState {
    let word = |i: usize| {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&seed[i * 8..(i + 1) * 8]);
        u64::from_be_bytes(bytes)
    };
    RandomState::with_seeds(word(0), word(1), word(2), word(3))
}
pub(crate) type HashMap<K, V> = std::collections::HashMap<K, V, RandomState>;

pub mod steiner_forest;
pub use steiner_forest as sfp;
