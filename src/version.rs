use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use log::error;

use crate::error::{BindError, Result};
use crate::parser;

/// A `major.minor[.patch]` version. A requirement may omit the patch
/// component; a running version without one counts as patch 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub(crate) major: u32,
    pub(crate) minor: u32,
    pub(crate) patch: Option<u32>,
}

impl Version {
    /// Parse a running engine version, ignoring a pre-release or build
    /// suffix such as `-dev` or `+abc`.
    pub fn running(s: &str) -> Result<Self> {
        match parser::version(s.trim()) {
            Ok((rest, (major, minor, patch)))
                if rest.is_empty() || rest.starts_with('-') || rest.starts_with('+') =>
            {
                Ok(Version {
                    major,
                    minor,
                    patch: Some(patch.unwrap_or(0)),
                })
            }
            _ => Err(BindError::MalformedVersion(s.to_owned())),
        }
    }

    /// Whether this running version is at least `required`.
    pub fn satisfies(&self, required: &Version) -> bool {
        match (self.major, self.minor).cmp(&(required.major, required.minor)) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => match required.patch {
                None => true,
                Some(patch) => self.patch.unwrap_or(0) >= patch,
            },
        }
    }
}

impl FromStr for Version {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self> {
        match parser::version(s.trim()) {
            Ok(("", (major, minor, patch))) => Ok(Version {
                major,
                minor,
                patch,
            }),
            _ => Err(BindError::MalformedVersion(s.to_owned())),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(patch) = self.patch {
            write!(f, ".{}", patch)?;
        }
        Ok(())
    }
}

/// Fail with [`BindError::IncompatibleVersion`] unless `running` is at least `minimum`.
pub fn check_minimum_version(running: &str, minimum: &str) -> Result<()> {
    let required: Version = minimum.parse()?;
    let current = Version::running(running)?;
    if current.satisfies(&required) {
        Ok(())
    } else {
        error!(
            "version {} is required, but this is version {}",
            required, running
        );
        Err(BindError::IncompatibleVersion {
            running: running.to_owned(),
            required: minimum.to_owned(),
        })
    }
}
