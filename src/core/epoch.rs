//! Archive and epoch directory selection
//!
//! The contemporary MODIS composite is organised in `YYYY.MM.DD` directories.
//! Scenes dated outside the composite's coverage use the historical Jupp-Li
//! dataset, organised in day-of-year directories (`1` .. `366`).

use crate::types::{ArchiveSelection, BrdfError, BrdfResult, BrdfTier, EpochRange};
use chrono::{Datelike, NaiveDate};
use std::cmp::Reverse;
use std::path::{Path, PathBuf};

/// Directory naming convention of the contemporary archive
pub const EPOCH_DIR_FORMAT: &str = "%Y.%m.%d";

/// Chooses between the contemporary and historical BRDF archives
#[derive(Debug, Clone)]
pub struct EpochSelector {
    primary_root: PathBuf,
    fallback_root: PathBuf,
    definitive_start: Option<NaiveDate>,
}

impl EpochSelector {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(primary_root: P, fallback_root: Q) -> Self {
        Self {
            primary_root: primary_root.as_ref().to_path_buf(),
            fallback_root: fallback_root.as_ref().to_path_buf(),
            definitive_start: None,
        }
    }

    /// Earliest date for which contemporary data is considered definitive,
    /// regardless of the first directory present in the archive.
    pub fn with_definitive_start(mut self, start: Option<NaiveDate>) -> Self {
        self.definitive_start = start;
        self
    }

    /// Date range covered by the contemporary archive
    pub fn contemporary_range(&self) -> BrdfResult<EpochRange> {
        let names = list_dir_names(&self.primary_root)?;
        let dates: Vec<NaiveDate> = names.iter().filter_map(|n| parse_epoch_name(n)).collect();

        let (first, last) = match (dates.iter().min(), dates.iter().max()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => {
                return Err(BrdfError::Configuration(format!(
                    "No {} epoch directories found in BRDF archive: {}",
                    EPOCH_DIR_FORMAT,
                    self.primary_root.display()
                )))
            }
        };

        let start = match self.definitive_start {
            Some(definitive) if definitive > first => definitive,
            _ => first,
        };

        log::debug!("Contemporary BRDF archive covers {} .. {}", start, last);
        Ok(EpochRange { start, end: last })
    }

    /// Select the archive root and nearest epoch directory for a scene date
    pub fn select(&self, scene_date: NaiveDate) -> BrdfResult<ArchiveSelection> {
        let range = self.contemporary_range()?;

        let selection = if range.contains(scene_date) {
            ArchiveSelection {
                root: self.primary_root.clone(),
                tier: BrdfTier::Definitive,
                epoch: nearest_dated_epoch(&self.primary_root, scene_date)?,
            }
        } else {
            log::info!(
                "Scene date {} outside contemporary BRDF coverage {} .. {}, using fallback archive",
                scene_date,
                range.start,
                range.end
            );
            ArchiveSelection {
                root: self.fallback_root.clone(),
                tier: BrdfTier::Fallback,
                epoch: nearest_day_of_year_epoch(&self.fallback_root, scene_date)?,
            }
        };

        log::info!(
            "Selected {} BRDF epoch {}",
            selection.tier,
            selection.epoch_path().display()
        );
        Ok(selection)
    }
}

/// Nearest `YYYY.MM.DD` directory under `root`
pub fn nearest_dated_epoch(root: &Path, scene_date: NaiveDate) -> BrdfResult<String> {
    let names = list_dir_names(root)?;
    nearest_dated_name(&names, scene_date).ok_or_else(|| {
        BrdfError::Configuration(format!("No dated BRDF epochs in: {}", root.display()))
    })
}

/// Nearest day-of-year directory under `root`
pub fn nearest_day_of_year_epoch(root: &Path, scene_date: NaiveDate) -> BrdfResult<String> {
    let names = list_dir_names(root)?;
    nearest_day_of_year_name(&names, scene_date).ok_or_else(|| {
        BrdfError::Configuration(format!("No day-of-year BRDF epochs in: {}", root.display()))
    })
}

/// Closest dated name; equidistant dates resolve to the most recent.
pub fn nearest_dated_name(names: &[String], scene_date: NaiveDate) -> Option<String> {
    names
        .iter()
        .filter_map(|name| parse_epoch_name(name).map(|date| (date, name)))
        .min_by_key(|(date, _)| proximity(*date, scene_date))
        .map(|(_, name)| name.clone())
}

/// Closest day-of-year name, wrapping across the year boundary.
///
/// Each name is read as that day in the scene's year. The last directory is
/// also tried in the previous year and the first in the following year, so
/// late-December scenes can match early-January epochs and vice versa.
pub fn nearest_day_of_year_name(names: &[String], scene_date: NaiveDate) -> Option<String> {
    let mut days: Vec<(u32, &String)> = names
        .iter()
        .filter_map(|name| name.parse::<u32>().ok().map(|doy| (doy, name)))
        .collect();
    days.sort_by_key(|(_, name)| format!("{:0>3}", name));

    let (first, last) = match (days.first(), days.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return None,
    };

    let year = scene_date.year();
    let mut candidates: Vec<(i32, u32, &String)> = Vec::with_capacity(days.len() + 2);
    candidates.push((year - 1, last.0, last.1));
    candidates.extend(days.iter().map(|(doy, name)| (year, *doy, *name)));
    candidates.push((year + 1, first.0, first.1));

    candidates
        .into_iter()
        .filter_map(|(y, doy, name)| match NaiveDate::from_yo_opt(y, doy) {
            Some(date) => Some((date, name)),
            None => {
                log::debug!("Ignoring day-of-year epoch {} for year {}", name, y);
                None
            }
        })
        .min_by_key(|(date, _)| proximity(*date, scene_date))
        .map(|(_, name)| name.clone())
}

fn proximity(date: NaiveDate, scene_date: NaiveDate) -> (i64, Reverse<NaiveDate>) {
    ((date - scene_date).num_days().abs(), Reverse(date))
}

pub fn parse_epoch_name(name: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(name, EPOCH_DIR_FORMAT).ok()
}

/// Lexicographically sorted sub-directory names of `root`
fn list_dir_names(root: &Path) -> BrdfResult<Vec<String>> {
    let entries = std::fs::read_dir(root).map_err(|e| {
        BrdfError::Configuration(format!("Cannot list BRDF archive {}: {}", root.display(), e))
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => log::debug!("Skipping non UTF-8 directory name {:?}", name),
        }
    }
    names.sort();

    if names.is_empty() {
        return Err(BrdfError::Configuration(format!(
            "BRDF archive is empty: {}",
            root.display()
        )));
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_nearest_dated_name() {
        let epochs = names(&["2005.05.25", "2005.06.10", "2005.06.26", "README"]);
        assert_eq!(
            nearest_dated_name(&epochs, date(2005, 6, 12)).as_deref(),
            Some("2005.06.10")
        );
        assert_eq!(
            nearest_dated_name(&epochs, date(1990, 1, 1)).as_deref(),
            Some("2005.05.25")
        );
    }

    #[test]
    fn test_equidistant_dated_name_prefers_recent() {
        let epochs = names(&["2005.06.10", "2005.06.26"]);
        assert_eq!(
            nearest_dated_name(&epochs, date(2005, 6, 18)).as_deref(),
            Some("2005.06.26")
        );
    }

    #[test]
    fn test_nearest_day_of_year_name() {
        let epochs = names(&["1", "113", "17", "33", "353"]);
        assert_eq!(
            nearest_day_of_year_name(&epochs, date(1998, 2, 3)).as_deref(),
            Some("33")
        );
        assert_eq!(
            nearest_day_of_year_name(&epochs, date(1998, 4, 20)).as_deref(),
            Some("113")
        );
    }

    #[test]
    fn test_day_of_year_wraps_year_boundary() {
        let epochs = names(&["017", "113", "337"]);
        // Dec 30 is 18 days before next year's day 17 and 27 days after day 337
        assert_eq!(
            nearest_day_of_year_name(&epochs, date(1998, 12, 30)).as_deref(),
            Some("017")
        );
        assert_eq!(
            nearest_day_of_year_name(&epochs, date(1998, 1, 2)).as_deref(),
            Some("017")
        );
        // Previous year's day 360 is 10 days back
        let winter = names(&["100", "360"]);
        assert_eq!(
            nearest_day_of_year_name(&winter, date(1999, 1, 5)).as_deref(),
            Some("360")
        );
    }

    #[test]
    fn test_day_of_year_ignores_non_numeric() {
        assert!(nearest_day_of_year_name(&names(&["notes", "tmp"]), date(1998, 1, 1)).is_none());
    }
}
