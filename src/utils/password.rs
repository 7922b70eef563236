use rand::Rng;

const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const PASSWORD_LEN: usize = 8;

/// Generates the credential assigned to a newly observed identity: 8
/// characters drawn uniformly from the alphanumeric alphabet. Not a
/// cryptographic secret, and uniqueness across identities is not guaranteed.
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    (0..PASSWORD_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passwords_are_eight_alphanumeric_characters() {
        for _ in 0..200 {
            let password = generate();
            assert_eq!(password.len(), 8);
            assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn passwords_vary_between_invocations() {
        let first = generate();
        // one collision in 62^8 would be astonishing
        assert!((0..10).any(|_| generate() != first));
    }
}
