pub mod version;

pub use version::VersionComparator;

use jiff::Timestamp;
use serde::Deserialize;

/// One module entry as emitted by `go list -m -json`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct GoModule {
    pub path: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub update: Option<Box<GoModule>>,
    #[serde(default)]
    pub replace: Option<Box<GoModule>>,
    #[serde(default)]
    pub main: bool,
    #[serde(default)]
    pub indirect: bool,
}

impl GoModule {
    /// The module whose versions count: the replacement when one is set.
    fn effective(&self) -> &GoModule {
        self.replace.as_deref().unwrap_or(self)
    }

    fn timestamps_valid(&self) -> bool {
        let module = self.effective();
        let Some(update) = module.update.as_deref() else {
            return true;
        };
        match (parse_time(module.time.as_deref()), parse_time(update.time.as_deref())) {
            (Some(current), Some(newer)) => current <= newer,
            _ => true,
        }
    }

    /// Converts the raw entry into a report record. The main module yields `None`.
    pub fn to_record(&self) -> Option<DependencyRecord> {
        if self.main {
            return None;
        }

        let effective = self.effective();
        Some(DependencyRecord {
            path: self.path.clone(),
            version: effective.version.clone(),
            available: effective.update.as_ref().map(|u| u.version.clone()),
            direct: !self.indirect,
            valid_timestamps: self.timestamps_valid(),
        })
    }
}

fn parse_time(value: Option<&str>) -> Option<Timestamp> {
    value.and_then(|v| v.parse::<Timestamp>().ok())
}

/// A resolved dependency with its current and newest available version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRecord {
    pub path: String,
    pub version: String,
    pub available: Option<String>,
    pub direct: bool,
    pub valid_timestamps: bool,
}

impl DependencyRecord {
    /// True when a strictly newer version than the current one is available.
    pub fn is_outdated(&self) -> bool {
        self.available
            .as_deref()
            .is_some_and(|candidate| VersionComparator::is_newer(candidate, &self.version))
    }
}
