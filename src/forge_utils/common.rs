use std::fmt;
use std::path::{Path, PathBuf};

/// A contract as `forge` addresses it: `path/to/Source.sol:Name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSpec {
    pub path: PathBuf,
    pub name: String,
}

impl ContractSpec {
    pub fn path_name(path: impl AsRef<Path>, name: impl ToString) -> Self {
        Self {
            path: path.as_ref().to_owned(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for ContractSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            ContractSpec::path_name("src/Miner.sol", "Miner").to_string(),
            "src/Miner.sol:Miner"
        );
    }
}
