use std::cmp::Ordering;

/// Go module version supporting semantic, pseudo and non-standard forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoVersion {
    pub original: String,
    pub parsed: VersionType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionType {
    Semantic(semver::Version),
    Numeric(Vec<u64>),
    Unknown,
}

impl GoVersion {
    pub fn parse(version: &str) -> Self {
        let normalized = Self::normalize(version);
        let parsed = if let Ok(v) = semver::Version::parse(normalized) {
            VersionType::Semantic(v)
        } else if let Some(numeric) = Self::parse_numeric(normalized) {
            VersionType::Numeric(numeric)
        } else {
            VersionType::Unknown
        };

        GoVersion {
            original: version.to_string(),
            parsed,
        }
    }

    /// Strips the `v` prefix and the `+incompatible` marker Go adds to
    /// pre-module major versions.
    fn normalize(version: &str) -> &str {
        let trimmed = version.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        trimmed.strip_suffix("+incompatible").unwrap_or(trimmed)
    }

    fn parse_numeric(version: &str) -> Option<Vec<u64>> {
        let numbers = version
            .split('.')
            .map(|part| part.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;

        if numbers.is_empty() {
            None
        } else {
            Some(numbers)
        }
    }
}

impl PartialOrd for GoVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GoVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.parsed, &other.parsed) {
            // Build metadata does not take part in Go's ordering.
            (VersionType::Semantic(a), VersionType::Semantic(b)) => a
                .major
                .cmp(&b.major)
                .then(a.minor.cmp(&b.minor))
                .then(a.patch.cmp(&b.patch))
                .then_with(|| match (a.pre.is_empty(), b.pre.is_empty()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    (false, false) => a.pre.cmp(&b.pre),
                }),
            (VersionType::Numeric(a), VersionType::Numeric(b)) => {
                for (av, bv) in a.iter().zip(b.iter()) {
                    match av.cmp(bv) {
                        Ordering::Equal => continue,
                        other => return other,
                    }
                }
                a.len().cmp(&b.len())
            }
            (VersionType::Unknown, VersionType::Unknown) => {
                self.original.cmp(&other.original)
            }
            (VersionType::Unknown, _) => Ordering::Less,
            (_, VersionType::Unknown) => Ordering::Greater,
            _ => self.original.cmp(&other.original),
        }
    }
}

pub struct VersionComparator;

impl VersionComparator {
    /// Check if version `a` is newer than version `b`
    pub fn is_newer(a: &str, b: &str) -> bool {
        GoVersion::parse(a) > GoVersion::parse(b)
    }
}
