use chrono::{DateTime, FixedOffset, Utc};
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Uniqueness source for self-generated identifiers.
///
/// A generated id combines the wall clock, the process id, a random
/// component and a process-wide monotonic counter; the counter is the one
/// piece of shared mutable state in the crate and makes ids generated in a
/// tight loop distinct even when the clock and RNG collude.
static COUNTER: AtomicU64 = AtomicU64::new(0);

/// A fresh `left@right` message identifier, brackets not included.
pub(crate) fn message_id() -> String {
    format!("{}@{}", unique_token(), hostname())
}

fn unique_token() -> String {
    let clock = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let random: u64 = rand::rng().random();
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!(
        "{}.{}.{}.{}",
        base36(clock),
        std::process::id(),
        count,
        base36(random),
    )
}

fn hostname() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost.localdomain".to_string())
}

fn base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Current wall clock as a fixed-offset timestamp (UTC).
pub(crate) fn now() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}
