//! Fresh identifiers for test isolation.

use uuid::Uuid;

/// A new random user id.
pub fn unique_user() -> Uuid {
    Uuid::new_v4()
}

/// `n` distinct user ids, in creation order.
///
/// ```
/// use codeword_test_support::unique_helpers::unique_users;
///
/// let users = unique_users(4);
/// assert_eq!(users.len(), 4);
/// assert_ne!(users[0], users[1]);
/// ```
pub fn unique_users(n: usize) -> Vec<Uuid> {
    (0..n).map(|_| unique_user()).collect()
}
