use rand::RngCore;

/// Access codes are 8 lowercase-hex characters (4 random bytes).
pub const CODE_LEN: usize = 8;

/// Generate a fresh access code. Collision with an existing code is handled
/// by the caller, which retries against the registry's unique key.
pub fn generate() -> String {
    let mut bytes = [0u8; CODE_LEN / 2];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
