//! Record ID generation.
//!
//! A redesign note in the spec calls out global mutable state (the ID
//! generator included) as something to avoid — callers construct an
//! [`IdGenerator`] explicitly and pass it to whatever needs IDs, rather than
//! reaching for a process-wide singleton.

use rand::RngCore;

#[derive(Debug, Default, Clone, Copy)]
pub struct IdGenerator;

impl IdGenerator {
    pub fn new() -> Self {
        Self
    }

    /// 8 random bytes rendered as 16 lowercase hex characters.
    pub fn generate(&self) -> String {
        let mut bytes = [0u8; 8];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex_encode(&bytes)
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        s.push_str(&format!("{:02x}", b));
    }
    s
}
