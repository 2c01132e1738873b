//! Working set of sites owned by the caller.
//!
//! The planning functions only ever borrow a snapshot of the roster; nothing in the core keeps
//! or mutates it between calls.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{PlanError, RosterError};
use crate::models::Site;

/// Ordered list of sites; duplicate names are allowed and kept as separate entries
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SiteRoster {
    sites: Vec<Site>,
}

#[derive(Deserialize)]
struct SiteFile {
    #[serde(default)]
    sites: Vec<Site>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonSites {
    List(Vec<Site>),
    Wrapped(SiteFile),
}

impl SiteRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a site after checking the entry is usable
    pub fn add(&mut self, site: Site) -> Result<(), PlanError> {
        if site.name.trim().is_empty() {
            return Err(PlanError::invalid("site name must not be empty"));
        }
        if !site.current_wait.is_finite() || site.current_wait < 0.0 {
            return Err(PlanError::invalid(format!(
                "current wait for '{}' must be a non-negative number of weeks, got {}",
                site.name, site.current_wait
            )));
        }
        self.sites.push(site);
        Ok(())
    }

    /// Remove and return the site at `index`, if any
    pub fn remove(&mut self, index: usize) -> Option<Site> {
        (index < self.sites.len()).then(|| self.sites.remove(index))
    }

    pub fn clear(&mut self) {
        self.sites.clear();
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Sum of current weekly throughput across the roster
    pub fn current_total(&self) -> u64 {
        self.sites
            .iter()
            .fold(0u64, |acc, s| acc.saturating_add(s.current_throughput))
    }

    /// Append every site listed in a `.toml` or `.json` file
    pub fn load_file(&mut self, path: &Path) -> Result<(), RosterError> {
        let text = fs::read_to_string(path).map_err(|source| RosterError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let sites = match extension.as_deref() {
            Some("toml") => {
                let file: SiteFile = toml::from_str(&text).map_err(|source| RosterError::Toml {
                    path: path.to_path_buf(),
                    source,
                })?;
                file.sites
            }
            Some("json") => {
                let parsed: JsonSites =
                    serde_json::from_str(&text).map_err(|source| RosterError::Json {
                        path: path.to_path_buf(),
                        source,
                    })?;
                match parsed {
                    JsonSites::List(sites) => sites,
                    JsonSites::Wrapped(file) => file.sites,
                }
            }
            _ => {
                return Err(RosterError::UnsupportedFormat {
                    path: path.to_path_buf(),
                })
            }
        };

        debug!(path = %path.display(), count = sites.len(), "loaded site file");
        for site in sites {
            self.add(site)?;
        }
        Ok(())
    }

    /// Append a site written as `NAME:THROUGHPUT:WAIT`
    pub fn add_spec(&mut self, spec: &str) -> Result<(), RosterError> {
        let site = parse_site_spec(spec)?;
        self.add(site)?;
        Ok(())
    }
}

/// Parse `NAME:THROUGHPUT:WAIT`; the name itself may contain colons
pub fn parse_site_spec(spec: &str) -> Result<Site, RosterError> {
    let malformed = |reason: &str| RosterError::MalformedSpec {
        spec: spec.to_string(),
        reason: reason.to_string(),
    };

    let mut parts = spec.rsplitn(3, ':');
    let (Some(wait), Some(throughput), Some(name)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed("expected NAME:THROUGHPUT:WAIT"));
    };

    let current_throughput = throughput
        .trim()
        .parse::<u64>()
        .map_err(|_| malformed("throughput must be a non-negative whole number"))?;
    let current_wait = wait
        .trim()
        .parse::<f64>()
        .map_err(|_| malformed("wait must be a number of weeks"))?;

    Ok(Site::new(name.trim(), current_throughput, current_wait))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_add_rejects_empty_name() {
        let mut roster = SiteRoster::new();
        let err = roster.add(Site::new("   ", 10, 2.0)).unwrap_err();
        assert!(matches!(err, PlanError::InvalidInput { .. }));
        assert!(roster.is_empty());
    }

    #[test]
    fn test_add_rejects_bad_wait() {
        let mut roster = SiteRoster::new();
        assert!(roster.add(Site::new("A", 10, -0.5)).is_err());
        assert!(roster.add(Site::new("A", 10, f64::INFINITY)).is_err());
        assert!(roster.add(Site::new("A", 10, f64::NAN)).is_err());
    }

    #[test]
    fn test_duplicates_kept_in_order() {
        let mut roster = SiteRoster::new();
        roster.add(Site::new("Umeå", 10, 4.0)).unwrap();
        roster.add(Site::new("Luleå", 5, 8.0)).unwrap();
        roster.add(Site::new("Umeå", 3, 1.0)).unwrap();

        assert_eq!(roster.len(), 3);
        assert_eq!(roster.current_total(), 18);
        let names: Vec<&str> = roster.sites().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Umeå", "Luleå", "Umeå"]);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut roster = SiteRoster::new();
        roster.add(Site::new("A", 1, 1.0)).unwrap();
        roster.add(Site::new("B", 2, 2.0)).unwrap();

        assert_eq!(roster.remove(5), None);
        assert_eq!(roster.remove(0), Some(Site::new("A", 1, 1.0)));
        assert_eq!(roster.sites(), &[Site::new("B", 2, 2.0)]);

        roster.clear();
        assert!(roster.is_empty());
        assert_eq!(roster.current_total(), 0);
    }

    #[test]
    fn test_current_total_saturates() {
        let mut roster = SiteRoster::new();
        roster.add(Site::new("A", u64::MAX, 1.0)).unwrap();
        roster.add(Site::new("B", 7, 1.0)).unwrap();
        assert_eq!(roster.current_total(), u64::MAX);
    }

    #[test]
    fn test_parse_site_spec() {
        assert_eq!(parse_site_spec("A:10:4.0").unwrap(), Site::new("A", 10, 4.0));
        assert_eq!(
            parse_site_spec("Site: North:5: 8").unwrap(),
            Site::new("Site: North", 5, 8.0)
        );
        assert!(parse_site_spec("A:10").is_err());
        assert!(parse_site_spec("A:-1:2.0").is_err());
        assert!(parse_site_spec("A:3:soon").is_err());
    }

    #[test]
    fn test_add_spec_rejects_empty_name() {
        let mut roster = SiteRoster::new();
        let err = roster.add_spec(":10:4.0").unwrap_err();
        assert!(matches!(err, RosterError::Plan(PlanError::InvalidInput { .. })));
    }

    #[test]
    fn test_load_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[[sites]]
name = "A"
current_throughput = 10
current_wait = 4.0

[[sites]]
name = "B"
current_throughput = 5
current_wait = 8.0
"#
        )
        .unwrap();

        let mut roster = SiteRoster::new();
        roster.load_file(file.path()).unwrap();
        assert_eq!(
            roster.sites(),
            &[Site::new("A", 10, 4.0), Site::new("B", 5, 8.0)]
        );
    }

    #[test]
    fn test_load_json_list_and_wrapped() {
        let mut list = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            list,
            r#"[{{"name": "A", "current_throughput": 10, "current_wait": 4.0}}]"#
        )
        .unwrap();
        let mut wrapped = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            wrapped,
            r#"{{"sites": [{{"name": "B", "current_throughput": 5, "current_wait": 8.0}}]}}"#
        )
        .unwrap();

        let mut roster = SiteRoster::new();
        roster.load_file(list.path()).unwrap();
        roster.load_file(wrapped.path()).unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.current_total(), 15);
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        let err = SiteRoster::new().load_file(file.path()).unwrap_err();
        assert!(matches!(err, RosterError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SiteRoster::new()
            .load_file(Path::new("/nonexistent/sites.toml"))
            .unwrap_err();
        assert!(matches!(err, RosterError::Io { .. }));
    }
}
