//! Two-column profile reader
//!
//! Each data line holds `distance, gravity`. Distances are kilometres and
//! are converted to metres on load; gravity is milligals unless the reader is
//! configured for gravity units.

use std::fs;
use std::path::Path;

use crate::error::{GravpolyError, Result};
use crate::models::profile::{Profile, ProfileSample};
use crate::units::{km_to_m, GravityUnit};

/// Configurable reader for delimited profile files
#[derive(Debug, Clone)]
pub struct ProfileReader {
    delimiter: char,
    gravity_unit: GravityUnit,
}

impl Default for ProfileReader {
    fn default() -> Self {
        Self { delimiter: ',', gravity_unit: GravityUnit::Milligal }
    }
}

impl ProfileReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_gravity_unit(mut self, unit: GravityUnit) -> Self {
        self.gravity_unit = unit;
        self
    }

    /// Read and validate a profile file; the file stem becomes the profile name
    pub fn read(&self, path: &Path) -> Result<Profile> {
        let content = fs::read_to_string(path)?;
        let profile = self.parse(&content)?;

        Ok(match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => profile.with_name(stem),
            None => profile,
        })
    }

    /// Parse profile text.
    ///
    /// Blank lines and `#` comments are skipped. A first data line that does
    /// not parse as numbers is treated as a header.
    pub fn parse(&self, content: &str) -> Result<Profile> {
        let mut samples = Vec::new();
        let mut seen_data = false;

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match self.parse_line(line) {
                Ok((km, gravity)) => {
                    seen_data = true;
                    samples.push(ProfileSample {
                        distance: km_to_m(km),
                        gravity: self.gravity_unit.to_mgal(gravity),
                    });
                }
                Err(reason) if !seen_data => {
                    tracing::debug!("Skipping header line {}: {}", line_no, reason);
                    seen_data = true;
                }
                Err(reason) => {
                    return Err(GravpolyError::ProfileParse { line: line_no, reason });
                }
            }
        }

        Profile::new(samples)
    }

    /// Exactly two fields; empty fields are errors. Runs of a whitespace
    /// delimiter count as one separator.
    fn parse_line(&self, line: &str) -> std::result::Result<(f64, f64), String> {
        let fields: Vec<&str> = if self.delimiter.is_whitespace() {
            line.split_whitespace().collect()
        } else {
            line.split(self.delimiter).map(str::trim).collect()
        };

        let (distance, gravity) = match fields.as_slice() {
            [distance, gravity] => (*distance, *gravity),
            [_] => return Err("missing gravity column".to_string()),
            _ => return Err(format!("expected 2 columns, found {}", fields.len())),
        };

        let distance = distance
            .parse::<f64>()
            .map_err(|e| format!("invalid distance '{}': {}", distance, e))?;
        let gravity =
            gravity.parse::<f64>().map_err(|e| format!("invalid gravity '{}': {}", gravity, e))?;

        Ok((distance, gravity))
    }
}

/// Read a comma-delimited km / mGal profile file
pub fn read_profile<P: AsRef<Path>>(path: P) -> Result<Profile> {
    ProfileReader::default().read(path.as_ref())
}

/// Parse comma-delimited km / mGal profile text
pub fn parse_profile(content: &str) -> Result<Profile> {
    ProfileReader::default().parse(content)
}
