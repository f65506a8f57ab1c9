use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shrinkwraprs::Shrinkwrap;

macro_rules! impl_string_newtype {
    (pub struct $outer:ident(String)) => {
        #[derive(
            Debug,
            Clone,
            Serialize,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Deserialize,
            Shrinkwrap,
        )]
        #[serde(transparent)]
        pub struct $outer(pub String);

        impl fmt::Display for $outer {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $outer {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl FromStr for $outer {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_string()))
            }
        }
    };
}

impl_string_newtype!(pub struct NetworkName(String));
impl_string_newtype!(pub struct ContractName(String));

/// A solc release, always a plain `MAJOR.MINOR.PATCH`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Shrinkwrap)]
#[serde(try_from = "String", into = "String")]
pub struct SolidityVersion(pub semver::Version);

impl FromStr for SolidityVersion {
    type Err = eyre::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let version = semver::Version::parse(s.trim())
            .map_err(|err| eyre::eyre!("invalid solidity version {s:?}: {err}"))?;

        if !version.pre.is_empty() || !version.build.is_empty() {
            eyre::bail!("solidity version {s:?} must be a plain release");
        }

        Ok(Self(version))
    }
}

impl TryFrom<String> for SolidityVersion {
    type Error = eyre::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SolidityVersion> for String {
    fn from(value: SolidityVersion) -> Self {
        value.to_string()
    }
}

impl fmt::Display for SolidityVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_release() {
        let version: SolidityVersion = "0.8.9".parse().unwrap();

        assert_eq!(version.to_string(), "0.8.9");
        assert_eq!(version.minor, 8);
    }

    #[test]
    fn rejects_partial_and_prerelease_versions() {
        assert!("0.8".parse::<SolidityVersion>().is_err());
        assert!("^0.8.9".parse::<SolidityVersion>().is_err());
        assert!("0.8.9-nightly".parse::<SolidityVersion>().is_err());
    }

    #[test]
    fn deserializes_from_string() {
        let version: SolidityVersion =
            serde_yaml::from_str("\"0.8.9\"").unwrap();

        assert_eq!(version, "0.8.9".parse().unwrap());
        assert!(serde_yaml::from_str::<SolidityVersion>("nope").is_err());
    }
}
