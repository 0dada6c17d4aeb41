use std::fmt;
use std::str::FromStr;

use crate::error::TimingError;

/// `major.minor.patch`, compared component-wise. Missing components read as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PluginVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl PluginVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Version of this build.
    pub fn current() -> Self {
        Self::new(
            env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or(0),
            env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or(0),
            env!("CARGO_PKG_VERSION_PATCH").parse().unwrap_or(0),
        )
    }
}

impl FromStr for PluginVersion {
    type Err = TimingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches(['v', 'V']);
        let invalid = || TimingError::InvalidArgument(format!("'{}' is not a version", s));

        if trimmed.is_empty() {
            return Err(invalid());
        }

        let mut numbers = [0u32; 3];
        for (i, part) in trimmed.split('.').enumerate() {
            if i >= numbers.len() {
                return Err(invalid());
            }
            numbers[i] = part.parse().map_err(|_| invalid())?;
        }

        Ok(Self::new(numbers[0], numbers[1], numbers[2]))
    }
}

impl fmt::Display for PluginVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_orders() {
        let v: PluginVersion = "1.4.1".parse().unwrap();
        assert_eq!(v, PluginVersion::new(1, 4, 1));
        assert_eq!("1.2".parse::<PluginVersion>().unwrap(), PluginVersion::new(1, 2, 0));
        assert_eq!("v2".parse::<PluginVersion>().unwrap(), PluginVersion::new(2, 0, 0));

        assert!(PluginVersion::new(1, 10, 0) > PluginVersion::new(1, 9, 9));
        assert!(PluginVersion::new(1, 3, 9) < PluginVersion::new(1, 4, 0));
    }

    #[test]
    fn rejects_garbage() {
        assert!("".parse::<PluginVersion>().is_err());
        assert!("1.x".parse::<PluginVersion>().is_err());
        assert!("1.2.3.4".parse::<PluginVersion>().is_err());
    }

    #[test]
    fn current_matches_package() {
        assert_eq!(PluginVersion::current().to_string(), env!("CARGO_PKG_VERSION"));
    }
}
