/// Number of shards a question bank is split into.
pub const POOL_GROUPS: i16 = 10;

/// Maps a user identifier to its question pool.
///
/// The last character is read as a decimal digit; anything else, including
/// an empty identifier, lands in pool 0. The partition is static, so the
/// same identifier always gets the same pool.
pub fn assign_pool(user_id: &str) -> i16 {
    user_id
        .chars()
        .last()
        .and_then(|c| c.to_digit(10))
        .map(|d| d as i16)
        .unwrap_or(0)
}
