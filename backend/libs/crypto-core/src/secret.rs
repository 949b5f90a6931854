//! Signing secret strength classification
//!
//! HS256 tokens are only as strong as the shared secret. Startup code uses
//! [`secret_strength`] to refuse weak secrets in production.

const MIN_SECRET_LENGTH: usize = 32; // 256 bits minimum
const RECOMMENDED_SECRET_LENGTH: usize = 64;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SecretStrength {
    /// Weak secret - reject in production
    Weak,
    /// Acceptable secret - warn
    Acceptable,
    Strong,
}

/// Classify a symmetric secret.
///
/// **Criteria**:
/// - Minimum 32 bytes, 64 recommended
/// - Shannon entropy of at least 4.0 bits/byte
/// - No runs of four repeated or sequential bytes
pub fn secret_strength(secret: &str) -> SecretStrength {
    let bytes = secret.as_bytes();

    if bytes.len() < MIN_SECRET_LENGTH {
        return SecretStrength::Weak;
    }

    let entropy = shannon_entropy(bytes);
    if entropy < 4.0 || has_obvious_patterns(bytes) {
        return SecretStrength::Weak;
    }

    if bytes.len() >= RECOMMENDED_SECRET_LENGTH && entropy >= 5.0 {
        SecretStrength::Strong
    } else {
        SecretStrength::Acceptable
    }
}

/// Bits per byte (0-8 scale)
fn shannon_entropy(data: &[u8]) -> f64 {
    let mut freq = [0u32; 256];
    for &byte in data {
        freq[byte as usize] += 1;
    }

    let len = data.len() as f64;
    freq.iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

fn has_obvious_patterns(data: &[u8]) -> bool {
    let mut repeated = 1;
    let mut sequential = 1;

    for window in data.windows(2) {
        repeated = if window[0] == window[1] { repeated + 1 } else { 1 };
        sequential = if window[1] as i16 - window[0] as i16 == 1 {
            sequential + 1
        } else {
            1
        };

        if repeated >= 4 || sequential >= 4 {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_secret_is_weak() {
        assert_eq!(secret_strength("supersecretkey"), SecretStrength::Weak);
    }

    #[test]
    fn low_entropy_secret_is_weak() {
        assert_eq!(secret_strength(&"ab".repeat(20)), SecretStrength::Weak);
    }

    #[test]
    fn sequential_secret_is_weak() {
        assert_eq!(
            secret_strength("abcdefghijklmnopqrstuvwxyzabcdef"),
            SecretStrength::Weak
        );
    }

    #[test]
    fn random_looking_secret_is_acceptable() {
        assert_eq!(
            secret_strength("J8Kq2mPvRx4TnZs9YwLcGf7DhBe3Xa6W"),
            SecretStrength::Acceptable
        );
    }

    #[test]
    fn long_random_secret_is_strong() {
        let secret = "J8Kq2mPvRx4TnZs9YwLcGf7DhBe3Xa6WuE5gQ1iVoN0yHrMbAkSdFjTlCpIzOt%#";
        assert_eq!(secret.len(), 64);
        assert_eq!(secret_strength(secret), SecretStrength::Strong);
    }
}
