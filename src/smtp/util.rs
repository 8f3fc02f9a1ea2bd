use rand::Rng;

const PROBE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const PROBE_LOCAL_LEN: usize = 16;

/// Random local-part for the catch-all probe, regenerated per call so it
/// cannot collide with a real mailbox across verifications.
pub(crate) fn random_local_part() -> String {
    let mut rng = rand::thread_rng();
    (0..PROBE_LOCAL_LEN)
        .map(|_| PROBE_ALPHABET[rng.gen_range(0..PROBE_ALPHABET.len())] as char)
        .collect()
}

const FULL_INBOX_PATTERNS: &[&str] = &["full", "quota", "insufficient", "storage"];

/// Heuristic over transient-rejection text. Greylisting and rate limiting
/// also answer 4xx, so only replies naming a storage condition count.
pub(crate) fn looks_like_full_inbox(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    FULL_INBOX_PATTERNS
        .iter()
        .any(|pattern| lower.contains(pattern))
}
