//! Replay scenario files.
//!
//! # Example
//!
//! ```toml
//! config = "pageswap.toml"      # Optional, relative to this file
//! page = "thread.html"          # Initial document
//! url = "https://forum.test/threads/t.1/"
//! latency_ms = 50
//! fade_ms = 0                   # 0 swaps without animation delay
//! steps = ["click .pageNav-jump--next", "jump 3", "back", "forward", "wait 200"]
//!
//! [responses]
//! "https://forum.test/threads/t.1/page-2" = "page-2.json"
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::config::{ConfigError, PageswapConfig};
use crate::host::{FetchResponse, StaticFetcher};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("scenario parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("step {index}: {source}")]
    Step {
        index: usize,
        #[source]
        source: StepError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("empty step")]
    Empty,

    #[error("unknown step `{0}`, expected click, jump, back, forward or wait")]
    Unknown(String),

    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),

    #[error("`{0}` is not a duration in milliseconds")]
    InvalidWait(String),
}

// ============================================================================
// Steps
// ============================================================================

/// One scripted interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Click the first element matching a selector.
    Click(String),
    /// Type into the page jump field and press its submit.
    Jump(String),
    Back,
    Forward,
    Wait(Duration),
}

impl FromStr for Step {
    type Err = StepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (verb, rest) = s.split_once(char::is_whitespace).unwrap_or((s, ""));
        let rest = rest.trim();
        let argument = |name: &'static str| {
            if rest.is_empty() {
                Err(StepError::MissingArgument(name))
            } else {
                Ok(rest.to_string())
            }
        };

        match verb {
            "" => Err(StepError::Empty),
            "click" => argument("click").map(Self::Click),
            "jump" => argument("jump").map(Self::Jump),
            "back" => Ok(Self::Back),
            "forward" => Ok(Self::Forward),
            "wait" => {
                let ms = argument("wait")?;
                ms.parse()
                    .map(|ms| Self::Wait(Duration::from_millis(ms)))
                    .map_err(|_| StepError::InvalidWait(ms))
            }
            other => Err(StepError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Click(selector) => write!(f, "click {selector}"),
            Self::Jump(input) => write!(f, "jump {input}"),
            Self::Back => f.write_str("back"),
            Self::Forward => f.write_str("forward"),
            Self::Wait(duration) => write!(f, "wait {}", duration.as_millis()),
        }
    }
}

// ============================================================================
// Scenario
// ============================================================================

/// Scenario file as written.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioFile {
    #[serde(default)]
    config: Option<PathBuf>,
    page: PathBuf,
    url: String,
    #[serde(default)]
    latency_ms: u64,
    #[serde(default)]
    fade_ms: u64,
    #[serde(default)]
    steps: Vec<String>,
    #[serde(default)]
    responses: FxHashMap<String, PathBuf>,
}

/// A scenario with every referenced file loaded.
#[derive(Debug)]
pub struct Scenario {
    pub config: PageswapConfig,
    pub page: String,
    pub url: String,
    pub latency: Duration,
    pub fade: Duration,
    pub steps: Vec<Step>,
    pub responses: Vec<(String, FetchResponse)>,
}

fn read(path: &Path) -> Result<String, ScenarioError> {
    fs::read_to_string(path).map_err(|err| ScenarioError::Io(path.to_path_buf(), err))
}

impl Scenario {
    /// Load a scenario; referenced files resolve against its directory.
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let file: ScenarioFile = toml::from_str(&read(path)?)?;
        let dir = path.parent().unwrap_or(Path::new("."));

        let config = match &file.config {
            Some(config) => PageswapConfig::from_path(&dir.join(config))?,
            None => PageswapConfig::default(),
        };

        let steps: Vec<Step> = file
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                step.parse().map_err(|source| ScenarioError::Step {
                    index: i + 1,
                    source,
                })
            })
            .collect::<Result<_, _>>()?;

        let mut responses = file
            .responses
            .iter()
            .map(|(url, body)| -> Result<_, ScenarioError> {
                let body = read(&dir.join(body))?;
                Ok((url.clone(), FetchResponse::from_body(&body)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        responses.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(Self {
            config,
            page: read(&dir.join(&file.page))?,
            url: file.url,
            latency: Duration::from_millis(file.latency_ms),
            fade: Duration::from_millis(file.fade_ms),
            steps,
            responses,
        })
    }

    pub fn fetcher(&self) -> StaticFetcher {
        let mut fetcher = StaticFetcher::new(self.latency);
        for (url, response) in &self.responses {
            fetcher.insert(url.clone(), response.clone());
        }
        fetcher
    }
}
