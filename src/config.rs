//! Site configuration. Every setting has a built-in default so a project
//! needs no configuration file at all; an optional `site.yaml` in the
//! project directory overrides individual settings.
//!
//! ```yaml
//! site_title: Ghost Library
//! default_author: Anonymous
//! base_url: https://example.org/stories/
//! output_directory: public
//! ```

use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the optional configuration file in the project directory.
pub const CONFIG_FILE: &str = "site.yaml";

pub const SOURCE_DIRECTORY: &str = "stories";
pub const OUTPUT_DIRECTORY: &str = "docs";
pub const TEMPLATES_DIRECTORY: &str = "templates";
pub const STATIC_DIRECTORY: &str = "static";

pub const SITE_TITLE: &str = "Призрачная Библиотека";
pub const DEFAULT_AUTHOR: &str = "Ghost";
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const WORDS_PER_MINUTE: u64 = 180;
pub const BASE_URL: &str = "https://example.github.io/ghost-library/";
pub const INDEX_DESCRIPTION: &str = "A quiet archive of stories.";

#[derive(Deserialize, Default)]
#[serde(default)]
struct SiteFile {
    source_directory: Option<PathBuf>,
    output_directory: Option<PathBuf>,
    templates_directory: Option<PathBuf>,
    static_directory: Option<PathBuf>,
    site_title: Option<String>,
    default_author: Option<String>,
    date_format: Option<String>,
    words_per_minute: Option<u64>,
    base_url: Option<Url>,
    index_description: Option<String>,
    feed: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding story files and series folders.
    pub source_directory: PathBuf,

    /// Directory the site is written into. Its contents are wiped on every
    /// build, except for a `.git` directory.
    pub output_directory: PathBuf,

    /// Directory holding the `base.html` and `index.html` templates.
    pub templates_directory: PathBuf,

    /// Directory copied verbatim to `{output_directory}/static`.
    pub static_directory: PathBuf,

    pub site_title: String,
    pub default_author: String,

    /// `strftime`-style format for dates derived from file timestamps or
    /// date-time frontmatter values.
    pub date_format: String,

    pub words_per_minute: u64,

    /// Absolute URL the site is published under. Always ends in a slash so
    /// page file names can be joined onto it.
    pub base_url: Url,

    pub index_description: String,

    /// Whether to write `feed.atom`.
    pub feed: bool,
}

impl Config {
    /// Returns the default configuration for a project rooted at `project`.
    pub fn defaults(project: &Path) -> Result<Config> {
        Ok(Config {
            source_directory: project.join(SOURCE_DIRECTORY),
            output_directory: project.join(OUTPUT_DIRECTORY),
            templates_directory: project.join(TEMPLATES_DIRECTORY),
            static_directory: project.join(STATIC_DIRECTORY),
            site_title: SITE_TITLE.to_owned(),
            default_author: DEFAULT_AUTHOR.to_owned(),
            date_format: DATE_FORMAT.to_owned(),
            words_per_minute: WORDS_PER_MINUTE,
            base_url: Url::parse(BASE_URL)?,
            index_description: INDEX_DESCRIPTION.to_owned(),
            feed: true,
        })
    }

    /// Loads the configuration for a project rooted at `project`, applying
    /// `{project}/site.yaml` on top of the defaults when it exists.
    pub fn from_directory(project: &Path) -> Result<Config> {
        let path = project.join(CONFIG_FILE);
        if path.exists() {
            match Config::from_project_file(&path) {
                Ok(config) => Ok(config),
                Err(e) => Err(anyhow!("Loading configuration: {:?}", e)),
            }
        } else {
            Config::defaults(project)
        }
    }

    /// Loads the configuration from an explicit `site.yaml` path. Relative
    /// directories in the file resolve against the file's directory.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let project = match path.parent() {
            Some(dir) => dir,
            None => {
                return Err(anyhow!(
                    "Can't get parent directory for provided project file path '{:?}'",
                    path
                ))
            }
        };
        let file: SiteFile = serde_yaml::from_reader(open_config(path)?)?;
        Ok(Config::defaults(project)?.overlay(project, file))
    }

    fn overlay(mut self, project: &Path, file: SiteFile) -> Config {
        let dir = |p: Option<PathBuf>, current: PathBuf| match p {
            Some(p) => project.join(p),
            None => current,
        };
        self.source_directory = dir(file.source_directory, self.source_directory);
        self.output_directory = dir(file.output_directory, self.output_directory);
        self.templates_directory = dir(file.templates_directory, self.templates_directory);
        self.static_directory = dir(file.static_directory, self.static_directory);
        if let Some(title) = file.site_title {
            self.site_title = title;
        }
        if let Some(author) = file.default_author {
            self.default_author = author;
        }
        if let Some(format) = file.date_format {
            self.date_format = format;
        }
        if let Some(wpm) = file.words_per_minute {
            self.words_per_minute = wpm.max(1);
        }
        if let Some(url) = file.base_url {
            self.base_url = with_trailing_slash(url);
        }
        if let Some(description) = file.index_description {
            self.index_description = description;
        }
        if let Some(feed) = file.feed {
            self.feed = feed;
        }
        self
    }
}

fn open_config(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| anyhow!("Opening config file `{}`: {}", path.display(), e))
}

// Without a trailing slash, [`Url::join`] treats the last path segment as a
// file name and replaces it.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_without_config_file() -> Result<()> {
        let project = tempfile::tempdir()?;
        let config = Config::from_directory(project.path())?;
        assert_eq!(project.path().join("stories"), config.source_directory);
        assert_eq!(project.path().join("docs"), config.output_directory);
        assert_eq!(DEFAULT_AUTHOR, config.default_author);
        assert_eq!(WORDS_PER_MINUTE, config.words_per_minute);
        assert!(config.feed);
        Ok(())
    }

    #[test]
    fn test_config_file_overrides() -> Result<()> {
        let project = tempfile::tempdir()?;
        fs::write(
            project.path().join(CONFIG_FILE),
            "site_title: Night Shelf\noutput_directory: public\nbase_url: https://example.org/shelf\nfeed: false\n",
        )?;
        let config = Config::from_directory(project.path())?;
        assert_eq!("Night Shelf", config.site_title);
        assert_eq!(project.path().join("public"), config.output_directory);
        assert_eq!(project.path().join("stories"), config.source_directory);
        assert_eq!("https://example.org/shelf/", config.base_url.as_str());
        assert!(!config.feed);
        Ok(())
    }

    #[test]
    fn test_malformed_config_file() -> Result<()> {
        let project = tempfile::tempdir()?;
        fs::write(project.path().join(CONFIG_FILE), "words_per_minute: [fast]\n")?;
        assert!(Config::from_directory(project.path()).is_err());
        Ok(())
    }
}
