use argon2::Argon2;
use rand::{rngs::OsRng, RngCore};
use tracing::error;

const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

fn derive(plain: &str, salt: &[u8]) -> anyhow::Result<[u8; HASH_LEN]> {
    let mut out = [0u8; HASH_LEN];
    Argon2::default()
        .hash_password_into(plain.as_bytes(), salt, &mut out)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password_into error");
            anyhow::anyhow!(e.to_string())
        })?;
    Ok(out)
}

/// Hashes with a fresh random salt, producing `"<salt-hex>.<hash-hex>"`.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let hash = derive(plain, &salt)?;
    Ok(format!("{}.{}", hex::encode(salt), hex::encode(hash)))
}

pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let (salt_hex, hash_hex) = stored
        .split_once('.')
        .ok_or_else(|| anyhow::anyhow!("stored password is missing the salt separator"))?;
    let salt = hex::decode(salt_hex)?;
    let expected = hex::decode(hash_hex)?;
    if salt.is_empty() || expected.is_empty() {
        anyhow::bail!("stored password has an empty component");
    }
    let actual = derive(plain, &salt)?;
    Ok(constant_time_eq(&actual, &expected))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn stored_form_is_salt_dot_hash() {
        let stored = hash_password("asdf").unwrap();
        let (salt, hash) = stored.split_once('.').unwrap();
        assert_eq!(salt.len(), SALT_LEN * 2);
        assert_eq!(hash.len(), HASH_LEN * 2);
        assert_ne!(stored, "asdf");
    }

    #[test]
    fn same_password_gets_different_salts() {
        assert_ne!(hash_password("asdf").unwrap(), hash_password("asdf").unwrap());
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        assert!(verify_password("anything", "not-a-valid-hash").is_err());
        assert!(verify_password("anything", "zz.yy").is_err());
        assert!(verify_password("anything", ".abcd").is_err());
    }
}
