// ABOUTME: Capability token generation for share links
// ABOUTME: 256 bits of randomness encoded as URL-safe base64

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

/// Number of random bytes in a share token (256 bits)
pub const SHARE_TOKEN_BYTES: usize = 32;

/// Generate a high-entropy, URL-safe share token
pub fn generate_share_token() -> String {
    let mut bytes = [0u8; SHARE_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
