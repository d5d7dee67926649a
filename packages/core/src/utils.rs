// ABOUTME: Shared utility functions for Just Start
// ABOUTME: Row ID generation

use rand::Rng;

const ID_LENGTH: usize = 12;
const CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Generate a unique row ID (12 alphanumeric characters)
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
