use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A single block of the ledger. Immutable once sealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub index: u64,
    pub hash: String,
    pub previous_hash: String,
    pub timestamp: i64, // Unix timestamp (UTC, seconds)
    pub data: String,
    pub difficulty: u32, // required leading zero bits of `hash`
    pub nonce: u64,      // Proof-of-Work nonce
}

impl Block {
    /// The hardcoded first block shared by every node.
    pub fn genesis() -> Self {
        Self {
            index: 0,
            hash: String::new(),
            previous_hash: String::new(),
            timestamp: 0,
            data: String::new(),
            difficulty: 0,
            nonce: 0,
        }
    }

    /// Create an unsealed block on top of `previous`. Call
    /// `miner::seal` to search for a nonce.
    pub fn candidate(previous: &Block, timestamp: i64, data: String, difficulty: u32) -> Self {
        let mut block = Self {
            index: previous.index + 1,
            hash: String::new(),
            previous_hash: previous.hash.clone(),
            timestamp,
            data,
            difficulty,
            nonce: 0,
        };
        block.hash = block.compute_hash();
        block
    }

    /// Compute the SHA-256 hash of this block's content (everything but
    /// the `hash` field), hex encoded.
    pub fn compute_hash(&self) -> String {
        calculate_hash(
            self.index,
            &self.previous_hash,
            self.timestamp,
            &self.data,
            self.difficulty,
            self.nonce,
        )
    }

    /// Whether the stored hash satisfies the block's own difficulty.
    pub fn meets_difficulty(&self) -> bool {
        hash_matches_difficulty(&self.hash, self.difficulty)
    }
}

/// Fields are concatenated in a fixed order without separators, using
/// their plain decimal representation.
pub fn calculate_hash(
    index: u64,
    previous_hash: &str,
    timestamp: i64,
    data: &str,
    difficulty: u32,
    nonce: u64,
) -> String {
    let preimage = format!("{index}{previous_hash}{timestamp}{data}{difficulty}{nonce}");
    let mut hasher = Sha256::new();
    hasher.update(preimage.as_bytes());
    hex::encode(hasher.finalize())
}

/// True when the first `difficulty` bits of the hex digest are zero.
/// Anything that is not valid hex never matches.
pub fn hash_matches_difficulty(hash: &str, difficulty: u32) -> bool {
    match hex::decode(hash) {
        Ok(bytes) => leading_zero_bits(&bytes) >= difficulty,
        Err(_) => false,
    }
}

fn leading_zero_bits(bytes: &[u8]) -> u32 {
    let mut bits = 0;
    for byte in bytes {
        if *byte == 0 {
            bits += 8;
        } else {
            bits += byte.leading_zeros();
            break;
        }
    }
    bits
}

#[cfg(test)]
mod tests {
    use super::{Block, calculate_hash, hash_matches_difficulty};

    #[test]
    fn genesis_is_the_fixed_empty_block() {
        let g = Block::genesis();
        assert_eq!(g.index, 0);
        assert!(g.hash.is_empty());
        assert!(g.previous_hash.is_empty());
        assert!(g.data.is_empty());
        assert_eq!((g.timestamp, g.difficulty, g.nonce), (0, 0, 0));
    }

    #[test]
    fn hash_concatenates_fields_in_order() {
        // sha256("1abc1700000000hello25")
        assert_eq!(
            calculate_hash(1, "abc", 1_700_000_000, "hello", 2, 5),
            "9b79c839434069ea140ea9215ed2d16d6e59dd9989b065f3e6b5dbb59fbf97c6"
        );
    }

    #[test]
    fn candidate_links_to_previous() {
        let g = Block::genesis();
        let b = Block::candidate(&g, 42, "payload".into(), 3);
        assert_eq!(b.index, 1);
        assert_eq!(b.previous_hash, g.hash);
        assert_eq!(b.hash, b.compute_hash());
    }

    #[test]
    fn leading_zero_nibbles_are_counted_as_bits() {
        let h = format!("0f{}", "ff".repeat(31));
        assert!(hash_matches_difficulty(&h, 4));
        assert!(!hash_matches_difficulty(&h, 5));

        // '1' is 0001: three zero bits, not zero
        let h = format!("1{}", "f".repeat(63));
        assert!(hash_matches_difficulty(&h, 3));
        assert!(!hash_matches_difficulty(&h, 4));

        let h = format!("0001{}", "f".repeat(60));
        assert!(hash_matches_difficulty(&h, 15));
        assert!(!hash_matches_difficulty(&h, 16));
    }

    #[test]
    fn difficulty_zero_accepts_any_digest() {
        let h = "f".repeat(64);
        assert!(hash_matches_difficulty(&h, 0));
    }

    #[test]
    fn non_hex_never_matches() {
        assert!(!hash_matches_difficulty("zz", 0));
        assert!(!hash_matches_difficulty("abc", 0));
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let json = serde_json::to_value(Block::genesis()).unwrap();
        assert!(json.get("previousHash").is_some());
        assert!(json.get("previous_hash").is_none());
    }
}
