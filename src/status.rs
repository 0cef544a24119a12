//! Verifies a built site against the expected page counts and produces the
//! migration status report. A shortfall isn't an error: it's reported through
//! [`StatusReport::passed`] so the caller can turn it into an exit code.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use walkdir::WalkDir;

const HTML_EXTENSION: &str = "html";
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp"];

/// The minimum number of built pages for each content category.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExpectedPages {
    pub docs: usize,
    pub blog: usize,
    pub about: usize,
}

impl Default for ExpectedPages {
    fn default() -> Self {
        ExpectedPages {
            docs: 138,
            blog: 52,
            about: 11,
        }
    }
}

impl ExpectedPages {
    pub fn total(&self) -> usize {
        self.docs + self.blog + self.about
    }
}

/// Page counts for one category of the built site.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SectionResult {
    pub category: String,
    pub total: usize,
    pub found: usize,
    pub missing: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_pages: usize,
    pub pages_complete: usize,
    pub pages_failed: usize,
    pub percent_complete: f64,
}

/// The migration status report, serialized as `migration-status.json`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub last_run: String,
    pub summary: Summary,
    pub docs: SectionResult,
    pub blog: SectionResult,
    pub about: SectionResult,
}

impl StatusReport {
    /// Builds the report for the site built into `dist`, whose pages live
    /// under `dist/docs`, `dist/blog`, and `dist/about`.
    pub fn verify(dist: &Path, expected: &ExpectedPages) -> Result<StatusReport, walkdir::Error> {
        let docs = verify_section("docs", &dist.join("docs"), expected.docs)?;
        let blog = verify_section("blog", &dist.join("blog"), expected.blog)?;
        let about = verify_section("about", &dist.join("about"), expected.about)?;

        let found = docs.found + blog.found + about.found;
        let total = expected.total();
        Ok(StatusReport {
            last_run: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            summary: Summary {
                total_pages: total,
                pages_complete: found,
                pages_failed: total.saturating_sub(found),
                percent_complete: percent_complete(found, total),
            },
            docs,
            blog,
            about,
        })
    }

    /// Whether every expected page was found.
    pub fn passed(&self) -> bool {
        self.summary.percent_complete >= 100.0
    }
}

impl fmt::Display for StatusReport {
    /// Renders the human-readable summary table.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "=== MIGRATION STATUS ===")?;
        for (label, section) in &[
            ("Docs Pages:", &self.docs),
            ("Blog Posts:", &self.blog),
            ("About Pages:", &self.about),
        ] {
            writeln!(
                f,
                "{:<13} {}/{} ({}%)",
                label,
                section.found,
                section.total,
                whole_percent(section.found, section.total)
            )?;
        }
        writeln!(f, "-------------------------")?;
        write!(
            f,
            "{:<13} {}/{} ({}%)",
            "OVERALL:",
            self.summary.pages_complete,
            self.summary.total_pages,
            self.summary.percent_complete
        )
    }
}

/// Counts the `.html` pages under `dir` (a missing directory has none) and
/// compares the count against `expected`.
pub fn verify_section(
    name: &str,
    dir: &Path,
    expected: usize,
) -> Result<SectionResult, walkdir::Error> {
    let found = count_files(dir, &[HTML_EXTENSION])?;
    Ok(SectionResult {
        category: name.to_owned(),
        total: expected,
        found,
        missing: match found < expected {
            true => vec![format!("Expected at least {}, found {}", expected, found)],
            false => Vec::new(),
        },
    })
}

/// Returns `found / expected` as a percentage rounded to one decimal place.
/// Nothing expected counts as complete.
pub fn percent_complete(found: usize, expected: usize) -> f64 {
    if expected == 0 {
        return 100.0;
    }
    (found as f64 / expected as f64 * 1000.0).round() / 10.0
}

fn whole_percent(found: usize, expected: usize) -> f64 {
    percent_complete(found, expected).round()
}

/// Image counts for the source assets and the built site.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageReport {
    /// `(directory, count)` for each source image directory.
    pub source: Vec<(String, usize)>,

    /// `(directory, count)` for each built image directory.
    pub built: Vec<(String, usize)>,
}

impl ImageReport {
    /// Counts images under the source `public` directory and the built `dist`
    /// directory, including the images optimized into `dist/_astro`.
    pub fn verify(public: &Path, dist: &Path) -> Result<ImageReport, walkdir::Error> {
        Ok(ImageReport {
            source: count_images(public, &["images", "blog/content/images", "users"])?,
            built: count_images(dist, &["images", "blog/content/images", "users", "_astro"])?,
        })
    }

    pub fn total_source(&self) -> usize {
        self.source.iter().map(|(_, n)| n).sum()
    }

    pub fn total_built(&self) -> usize {
        self.built.iter().map(|(_, n)| n).sum()
    }

    pub fn passed(&self) -> bool {
        self.total_built() >= self.total_source()
    }
}

impl fmt::Display for ImageReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "=== IMAGE VERIFICATION ===")?;
        writeln!(f, "Source images:")?;
        for (dir, n) in &self.source {
            writeln!(f, "  {:<28} {}", format!("/public/{}:", dir), n)?;
        }
        writeln!(f, "Built images:")?;
        for (dir, n) in &self.built {
            writeln!(f, "  {:<28} {}", format!("/dist/{}:", dir), n)?;
        }
        writeln!(f, "Total source images: {}", self.total_source())?;
        write!(f, "Total built images:  {}", self.total_built())
    }
}

fn count_images(root: &Path, dirs: &[&str]) -> Result<Vec<(String, usize)>, walkdir::Error> {
    let mut counts = Vec::with_capacity(dirs.len());
    for dir in dirs {
        counts.push((dir.to_string(), count_files(&root.join(dir), IMAGE_EXTENSIONS)?));
    }
    Ok(counts)
}

fn count_files(dir: &Path, extensions: &[&str]) -> Result<usize, walkdir::Error> {
    if !dir.exists() {
        return Ok(0);
    }
    let mut count = 0;
    for result in WalkDir::new(dir).follow_links(true) {
        let entry = result?;
        let matches = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| extensions.contains(&ext));
        if entry.file_type().is_file() && matches {
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative_path: &str) {
        let path = root.join(relative_path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_percent_complete() {
        assert_eq!(94.5, percent_complete(190, 201));
        assert_eq!(100.0, percent_complete(201, 201));
        assert_eq!(105.0, percent_complete(210, 200));
        assert_eq!(0.0, percent_complete(0, 201));
        assert_eq!(100.0, percent_complete(0, 0));
    }

    #[test]
    fn test_verify() -> Result<(), walkdir::Error> {
        let dist = TempDir::new().unwrap();
        touch(dist.path(), "docs/index.html");
        touch(dist.path(), "docs/getting-started/docker/index.html");
        touch(dist.path(), "docs/getting-started/docker/diagram.png");
        touch(dist.path(), "blog/2024/06/20/version-4-0-released/index.html");
        let expected = ExpectedPages {
            docs: 2,
            blog: 2,
            about: 1,
        };

        let report = StatusReport::verify(dist.path(), &expected)?;
        assert_eq!(
            Summary {
                total_pages: 5,
                pages_complete: 3,
                pages_failed: 2,
                percent_complete: 60.0,
            },
            report.summary
        );
        assert!(report.docs.missing.is_empty());
        assert_eq!(vec!["Expected at least 2, found 1"], report.blog.missing);
        assert_eq!(0, report.about.found);
        assert!(!report.passed());
        Ok(())
    }

    #[test]
    fn test_report_json() -> Result<(), walkdir::Error> {
        let dist = TempDir::new().unwrap();
        touch(dist.path(), "about/index.html");
        let expected = ExpectedPages {
            docs: 0,
            blog: 0,
            about: 1,
        };
        let report = StatusReport::verify(dist.path(), &expected)?;
        assert!(report.passed());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(1, json["summary"]["pagesComplete"]);
        assert_eq!(100.0, json["summary"]["percentComplete"]);
        assert_eq!("about", json["about"]["category"]);
        assert!(json["lastRun"].is_string());
        Ok(())
    }

    #[test]
    fn test_verify_images() -> Result<(), walkdir::Error> {
        let public = TempDir::new().unwrap();
        let dist = TempDir::new().unwrap();
        touch(public.path(), "images/logo.png");
        touch(public.path(), "blog/content/images/2024/nr4.jpg");
        touch(public.path(), "users/readme.txt");
        touch(dist.path(), "images/logo.png");

        let report = ImageReport::verify(public.path(), dist.path())?;
        assert_eq!(2, report.total_source());
        assert_eq!(1, report.total_built());
        assert!(!report.passed());

        touch(dist.path(), "_astro/nr4.hash.webp");
        assert!(ImageReport::verify(public.path(), dist.path())?.passed());
        Ok(())
    }
}
