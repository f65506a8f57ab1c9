use std::fmt;
use std::str::FromStr;

use ethers::prelude::k256::SecretKey;

#[derive(Clone)]
pub struct PrivateKey {
    pub key: SecretKey,
}

impl FromStr for PrivateKey {
    type Err = eyre::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix("0x").unwrap_or(s);

        if s.len() != 64 {
            eyre::bail!(
                "private key must be 32 bytes of hex, got {} characters",
                s.len()
            );
        }

        let bytes = hex::decode(s)?;

        let key = SecretKey::from_slice(&bytes)?;

        Ok(Self { key })
    }
}

/// `{}` prints bare hex, `{:#}` prints it with a `0x` prefix.
impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if f.alternate() {
            write!(f, "0x")?;
        }

        write!(f, "{}", hex::encode(self.key.to_bytes()))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PrivateKey").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    const KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn parses_with_and_without_prefix() {
        let bare: PrivateKey = KEY.parse().unwrap();
        let prefixed: PrivateKey = format!("0x{KEY}").parse().unwrap();

        assert_eq!(bare.key.to_bytes(), prefixed.key.to_bytes());
        assert_eq!(
            bare.key.to_bytes().as_slice(),
            hex!("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80")
        );
    }

    #[test]
    fn display_forms() {
        let key: PrivateKey = KEY.parse().unwrap();

        assert_eq!(key.to_string(), KEY);
        assert_eq!(format!("{key:#}"), format!("0x{KEY}"));
    }

    #[test]
    fn debug_hides_key_material() {
        let key: PrivateKey = KEY.parse().unwrap();

        assert!(!format!("{key:?}").contains("ac0974"));
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!("".parse::<PrivateKey>().is_err());
        assert!("0x1234".parse::<PrivateKey>().is_err());
        assert!("zz".repeat(32).parse::<PrivateKey>().is_err());
        assert!("00".repeat(32).parse::<PrivateKey>().is_err());
    }
}
