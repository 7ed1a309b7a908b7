//! Configuration types for batch PDF jobs.
//!
//! Three layers of configuration meet here:
//!
//! * [`ActionConfig`]: the per-job JSON file shipped inside the archive
//!   (`*.config.json`). It names exactly one processing action and carries
//!   that action's settings. Field names are PascalCase on the wire.
//! * [`ServerConfig`]: the per-host JSON file (`serverconfig.json`) that
//!   names the log, output and work directories.
//! * [`JobConfig`]: the runtime knobs of a single run, built via
//!   [`JobConfigBuilder`] from the server config plus CLI overrides.
//!
//! # Action selection
//!
//! The six action flags are validated into a closed [`Action`] enum by
//! [`ActionConfig::select_action`]. Executors receive only the settings of
//! the action that was selected.

use crate::error::{ConfigError, JobError, ValidationError};
use crate::geometry::{PageSize, ScaleFactors, TriggerPolicy};
use crate::pdf::PageTextExtractor;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Treat an explicit JSON `null` the same as a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Rotation applied by ScaleAndRotate when the config leaves it out.
pub const DEFAULT_DEGREES_ROTATION: i64 = 90;

/// `DegreesRotation` defaults to a quarter turn, not zero, so `null` needs its
/// own fallback.
fn nullable_degrees<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(DEFAULT_DEGREES_ROTATION))
}

// ── Action config (job archive) ──────────────────────────────────────────

/// The action configuration shipped inside a job archive.
///
/// # Example
/// ```rust
/// use edgequake_pdfjob::config::{ActionConfig, Action};
///
/// let json = r#"{
///     "Author": "ops",
///     "ProcessingActions": { "MakeCopies": true },
///     "Settings": { "MakeCopies": { "NumberOfCopies": 3 } }
/// }"#;
/// let config: ActionConfig = serde_json::from_str(json).unwrap();
/// assert!(matches!(config.select_action(), Ok(Action::MakeCopies { copies: 3, .. })));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ActionConfig {
    #[serde(deserialize_with = "nullable")]
    pub author: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub date: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub description: Option<String>,
    /// Keep diagnostic traces in the error manifest. Default: false.
    #[serde(deserialize_with = "nullable")]
    pub enable_debug: bool,
    #[serde(deserialize_with = "nullable")]
    pub notes: String,
    #[serde(deserialize_with = "nullable")]
    pub processing_actions: ProcessingActions,
    #[serde(deserialize_with = "nullable")]
    pub settings: Settings,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            author: None,
            date: None,
            description: None,
            enable_debug: false,
            notes: "No JSON has been read in".to_string(),
            processing_actions: ProcessingActions::default(),
            settings: Settings::default(),
        }
    }
}

/// The six mutually exclusive action flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProcessingActions {
    #[serde(deserialize_with = "nullable")]
    pub split: bool,
    #[serde(deserialize_with = "nullable")]
    pub concatenate: bool,
    #[serde(deserialize_with = "nullable")]
    pub make_copies: bool,
    #[serde(deserialize_with = "nullable")]
    pub scale_and_rotate: bool,
    #[serde(deserialize_with = "nullable")]
    pub smart_save: bool,
    #[serde(deserialize_with = "nullable")]
    pub text_convert: bool,
}

impl ProcessingActions {
    /// Every enabled action, in declaration order.
    pub fn enabled(&self) -> Vec<ProcessingAction> {
        [
            (self.split, ProcessingAction::Split),
            (self.concatenate, ProcessingAction::Concatenate),
            (self.make_copies, ProcessingAction::MakeCopies),
            (self.scale_and_rotate, ProcessingAction::ScaleAndRotate),
            (self.smart_save, ProcessingAction::SmartSave),
            (self.text_convert, ProcessingAction::TextConvert),
        ]
        .into_iter()
        .filter_map(|(on, action)| on.then_some(action))
        .collect()
    }

    /// Exactly one enabled action, or a [`ValidationError`].
    pub fn single(&self) -> Result<ProcessingAction, ValidationError> {
        let mut enabled = self.enabled();
        match enabled.len() {
            0 => Err(ValidationError::NoActionSelected),
            1 => Ok(enabled.remove(0)),
            _ => Err(ValidationError::MultipleActionsSelected { actions: enabled }),
        }
    }
}

/// Per-action settings. Only the section matching the selected action is read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Settings {
    #[serde(deserialize_with = "nullable")]
    pub concatenation: Concatenation,
    #[serde(deserialize_with = "nullable")]
    pub make_copies: MakeCopies,
    #[serde(deserialize_with = "nullable")]
    pub smart_saving: SmartSaving,
    #[serde(deserialize_with = "nullable")]
    pub target_page_size: TargetPageSize,
    #[serde(deserialize_with = "nullable")]
    pub scale_and_rotate: ScaleAndRotateSettings,
}

/// Document-break markers inserted while merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Concatenation {
    #[serde(deserialize_with = "nullable")]
    pub add_doc_break: bool,
    #[serde(deserialize_with = "nullable")]
    pub break_text: String,
}

impl Concatenation {
    /// The annotation title to use, or `None` when breaks are disabled.
    pub fn break_title(&self) -> Option<&str> {
        self.add_doc_break.then_some(self.break_text.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MakeCopies {
    #[serde(deserialize_with = "nullable")]
    pub number_of_copies: i64,
}

/// Smart-save steps. Each flag enables one step; the final write always runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SmartSaving {
    #[serde(deserialize_with = "nullable")]
    pub strip_comments: bool,
    #[serde(deserialize_with = "nullable")]
    pub flatten_acroforms: bool,
    #[serde(deserialize_with = "nullable")]
    pub remove_password: bool,
}

/// Destination page size for scale-and-rotate, in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TargetPageSize {
    #[serde(deserialize_with = "nullable")]
    pub page_width: f64,
    #[serde(deserialize_with = "nullable")]
    pub page_height: f64,
}

impl From<TargetPageSize> for PageSize {
    fn from(t: TargetPageSize) -> Self {
        PageSize::new(t.page_width, t.page_height)
    }
}

/// Trigger-driven scale-and-rotate parameters.
///
/// Defaults reproduce the classic behaviour: turn pages whose orientation
/// differs from the target by a quarter and auto-scale them to fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ScaleAndRotateSettings {
    #[serde(deserialize_with = "nullable")]
    pub trigger: TriggerPolicy,
    #[serde(deserialize_with = "nullable_degrees")]
    pub degrees_rotation: i64,
    /// `0` together with `ScaleY == 0` means auto-scale.
    #[serde(deserialize_with = "nullable")]
    pub scale_x: f64,
    #[serde(deserialize_with = "nullable")]
    pub scale_y: f64,
    #[serde(deserialize_with = "nullable")]
    pub shift_x: f64,
    #[serde(deserialize_with = "nullable")]
    pub shift_y: f64,
}

impl Default for ScaleAndRotateSettings {
    fn default() -> Self {
        Self {
            trigger: TriggerPolicy::XYDiff,
            degrees_rotation: DEFAULT_DEGREES_ROTATION,
            scale_x: 0.0,
            scale_y: 0.0,
            shift_x: 0.0,
            shift_y: 0.0,
        }
    }
}

impl ScaleAndRotateSettings {
    pub fn scale(&self) -> ScaleFactors {
        ScaleFactors::new(self.scale_x, self.scale_y)
    }

    pub fn shift(&self) -> (f64, f64) {
        (self.shift_x, self.shift_y)
    }
}

// ── Selected action ──────────────────────────────────────────────────────

/// Name of one of the six processing actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessingAction {
    Split,
    Concatenate,
    MakeCopies,
    ScaleAndRotate,
    SmartSave,
    TextConvert,
}

impl ProcessingAction {
    pub fn name(self) -> &'static str {
        match self {
            ProcessingAction::Split => "Split",
            ProcessingAction::Concatenate => "Concatenate",
            ProcessingAction::MakeCopies => "MakeCopies",
            ProcessingAction::ScaleAndRotate => "ScaleAndRotate",
            ProcessingAction::SmartSave => "SmartSave",
            ProcessingAction::TextConvert => "TextConvert",
        }
    }
}

impl fmt::Display for ProcessingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The validated action of a job, carrying only the settings it needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Split,
    Concatenate {
        /// Annotation title for document breaks; `None` disables them.
        doc_break: Option<String>,
    },
    MakeCopies {
        copies: i64,
        doc_break: Option<String>,
    },
    ScaleAndRotate {
        target: PageSize,
        settings: ScaleAndRotateSettings,
    },
    SmartSave(SmartSaving),
    TextConvert,
}

impl Action {
    pub fn kind(&self) -> ProcessingAction {
        match self {
            Action::Split => ProcessingAction::Split,
            Action::Concatenate { .. } => ProcessingAction::Concatenate,
            Action::MakeCopies { .. } => ProcessingAction::MakeCopies,
            Action::ScaleAndRotate { .. } => ProcessingAction::ScaleAndRotate,
            Action::SmartSave(_) => ProcessingAction::SmartSave,
            Action::TextConvert => ProcessingAction::TextConvert,
        }
    }
}

/// Suffix that marks the action config inside a job archive.
pub const ACTION_CONFIG_SUFFIX: &str = ".config.json";

impl ActionConfig {
    /// Find the first `*.config.json` (by name) at the top level of `dir`.
    pub fn find_in(dir: &Path) -> Result<PathBuf, ConfigError> {
        let entries = std::fs::read_dir(dir).map_err(|source| ConfigError::Unreadable {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.to_ascii_lowercase().ends_with(ACTION_CONFIG_SUFFIX))
                    .unwrap_or(false)
            })
            .collect();
        candidates.sort();
        candidates.into_iter().next().ok_or_else(|| ConfigError::Missing {
            dir: dir.to_path_buf(),
        })
    }

    /// Read and parse an action config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validate the action flags and bind the selected action to its settings.
    pub fn select_action(&self) -> Result<Action, ValidationError> {
        let doc_break = || {
            self.settings
                .concatenation
                .break_title()
                .map(str::to_string)
        };
        Ok(match self.processing_actions.single()? {
            ProcessingAction::Split => Action::Split,
            ProcessingAction::Concatenate => Action::Concatenate {
                doc_break: doc_break(),
            },
            ProcessingAction::MakeCopies => Action::MakeCopies {
                copies: self.settings.make_copies.number_of_copies,
                doc_break: doc_break(),
            },
            ProcessingAction::ScaleAndRotate => Action::ScaleAndRotate {
                target: self.settings.target_page_size.into(),
                settings: self.settings.scale_and_rotate,
            },
            ProcessingAction::SmartSave => Action::SmartSave(self.settings.smart_saving),
            ProcessingAction::TextConvert => Action::TextConvert,
        })
    }
}

// ── Server config (host) ─────────────────────────────────────────────────

/// Host-level configuration read from `serverconfig.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServerConfig {
    #[serde(deserialize_with = "nullable")]
    pub author: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub date: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub description: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub notes: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub directories: Directories,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Directories {
    #[serde(deserialize_with = "nullable")]
    pub log_dir: Option<PathBuf>,
    #[serde(deserialize_with = "nullable")]
    pub out_dir: Option<PathBuf>,
    #[serde(deserialize_with = "nullable")]
    pub work_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Read and parse a server config file.
    pub fn load(path: &Path) -> Result<Self, JobError> {
        let raw = std::fs::read_to_string(path).map_err(|e| JobError::ServerConfig {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| JobError::ServerConfig {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }
}

// ── Runtime config ───────────────────────────────────────────────────────

/// Runtime configuration for one job run.
///
/// Built via [`JobConfig::builder()`].
///
/// # Example
/// ```rust
/// use edgequake_pdfjob::JobConfig;
///
/// let config = JobConfig::builder()
///     .out_dir("/srv/pdfjob/out")
///     .work_dir("/srv/pdfjob/work")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct JobConfig {
    /// Where the finished `<stem>.zip` is copied. Required.
    pub out_dir: PathBuf,

    /// Parent of the per-job workspace. Default: the system temp directory.
    pub work_dir: PathBuf,

    /// Directory for log files; only read by the CLI.
    pub log_dir: Option<PathBuf>,

    /// Explicit pdfium shared library to bind for text extraction.
    /// If None, `PDFIUM_LIB_PATH`, then the working directory, then the
    /// system library search path are tried.
    pub pdfium_library: Option<PathBuf>,

    /// Pre-constructed text extractor. Takes precedence over `pdfium_library`.
    pub text_extractor: Option<Arc<dyn PageTextExtractor>>,

    /// Optional per-file progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::new(),
            work_dir: std::env::temp_dir(),
            log_dir: None,
            pdfium_library: None,
            text_extractor: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for JobConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobConfig")
            .field("out_dir", &self.out_dir)
            .field("work_dir", &self.work_dir)
            .field("log_dir", &self.log_dir)
            .field("pdfium_library", &self.pdfium_library)
            .field(
                "text_extractor",
                &self.text_extractor.as_ref().map(|_| "<dyn PageTextExtractor>"),
            )
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn JobProgressCallback>"),
            )
            .finish()
    }
}

impl JobConfig {
    pub fn builder() -> JobConfigBuilder {
        JobConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`JobConfig`].
#[derive(Debug)]
pub struct JobConfigBuilder {
    config: JobConfig,
}

impl JobConfigBuilder {
    /// Seed directories from a server config; later setters override them.
    pub fn server_config(mut self, server: &ServerConfig) -> Self {
        let dirs = &server.directories;
        if let Some(ref out) = dirs.out_dir {
            self.config.out_dir = out.clone();
        }
        if let Some(ref work) = dirs.work_dir {
            self.config.work_dir = work.clone();
        }
        if dirs.log_dir.is_some() {
            self.config.log_dir = dirs.log_dir.clone();
        }
        self
    }

    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.out_dir = dir.into();
        self
    }

    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.work_dir = dir.into();
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.log_dir = Some(dir.into());
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library = Some(path.into());
        self
    }

    pub fn text_extractor(mut self, extractor: Arc<dyn PageTextExtractor>) -> Self {
        self.config.text_extractor = Some(extractor);
        self
    }

    pub fn progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.config.progress_callback = Some(callback);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<JobConfig, JobError> {
        let c = &self.config;
        if c.out_dir.as_os_str().is_empty() {
            return Err(JobError::InvalidConfig(
                "An output directory is required (Directories.OutDir or --out-dir)".into(),
            ));
        }
        if c.work_dir.as_os_str().is_empty() {
            return Err(JobError::InvalidConfig(
                "Work directory must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ActionConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn finds_and_loads_action_config() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ActionConfig::find_in(dir.path()),
            Err(ConfigError::Missing { .. })
        ));
        std::fs::write(dir.path().join("a.pdf"), b"").unwrap();
        std::fs::write(
            dir.path().join("job.Config.json"),
            r#"{"ProcessingActions": {"TextConvert": true}}"#,
        )
        .unwrap();
        let path = ActionConfig::find_in(dir.path()).unwrap();
        let config = ActionConfig::load(&path).unwrap();
        assert_eq!(config.select_action().unwrap(), Action::TextConvert);
    }

    #[test]
    fn invalid_json_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            ActionConfig::load(&path),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn defaults_when_fields_missing() {
        let c = parse("{}");
        assert!(!c.enable_debug);
        assert_eq!(c.notes, "No JSON has been read in");
        assert_eq!(c.processing_actions, ProcessingActions::default());
        assert_eq!(c.settings.scale_and_rotate.trigger, TriggerPolicy::XYDiff);
        assert_eq!(c.settings.scale_and_rotate.degrees_rotation, 90);
    }

    #[test]
    fn nulls_and_unknown_fields_are_tolerated() {
        let c = parse(
            r#"{
                "Author": null,
                "EnableDebug": null,
                "Extra": { "Whatever": 1 },
                "ProcessingActions": { "Split": true, "Concatenate": null },
                "Settings": { "Concatenation": null }
            }"#,
        );
        assert_eq!(c.author, None);
        assert!(!c.enable_debug);
        assert!(c.processing_actions.split);
        assert!(!c.processing_actions.concatenate);
        assert_eq!(c.settings.concatenation, Concatenation::default());
    }

    #[test]
    fn null_scale_and_rotate_fields_take_their_defaults() {
        let c = parse(
            r#"{
                "Settings": {
                    "ScaleAndRotate": {
                        "Trigger": null,
                        "DegreesRotation": null,
                        "ScaleX": null,
                        "ShiftY": null
                    }
                }
            }"#,
        );
        assert_eq!(c.settings.scale_and_rotate, ScaleAndRotateSettings::default());
        assert_eq!(c.settings.scale_and_rotate.degrees_rotation, 90);

        let explicit = parse(r#"{ "Settings": { "ScaleAndRotate": { "DegreesRotation": 0 } } }"#);
        assert_eq!(explicit.settings.scale_and_rotate.degrees_rotation, 0);
    }

    #[test]
    fn no_action_is_a_validation_error() {
        assert_eq!(
            parse("{}").select_action(),
            Err(ValidationError::NoActionSelected)
        );
    }

    #[test]
    fn multiple_actions_list_every_enabled_flag() {
        let c = parse(
            r#"{ "ProcessingActions": { "Split": true, "ScaleAndRotate": true, "TextConvert": true } }"#,
        );
        assert_eq!(
            c.select_action(),
            Err(ValidationError::MultipleActionsSelected {
                actions: vec![
                    ProcessingAction::Split,
                    ProcessingAction::ScaleAndRotate,
                    ProcessingAction::TextConvert,
                ]
            })
        );
    }

    #[test]
    fn selected_action_carries_its_settings() {
        let c = parse(
            r#"{
                "ProcessingActions": { "Concatenate": true },
                "Settings": { "Concatenation": { "AddDocBreak": true, "BreakText": "Doc Break" } }
            }"#,
        );
        assert_eq!(
            c.select_action().unwrap(),
            Action::Concatenate {
                doc_break: Some("Doc Break".into())
            }
        );

        let c = parse(
            r#"{
                "ProcessingActions": { "ScaleAndRotate": true },
                "Settings": {
                    "TargetPageSize": { "PageWidth": 792, "PageHeight": 612 },
                    "ScaleAndRotate": { "Trigger": "odd", "DegreesRotation": 270 }
                }
            }"#,
        );
        match c.select_action().unwrap() {
            Action::ScaleAndRotate { target, settings } => {
                assert_eq!(target, PageSize::new(792.0, 612.0));
                assert_eq!(settings.trigger, TriggerPolicy::Odd);
                assert_eq!(settings.degrees_rotation, 270);
                assert!(settings.scale().is_auto());
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn doc_break_disabled_yields_none() {
        let c = parse(
            r#"{
                "ProcessingActions": { "MakeCopies": true },
                "Settings": {
                    "Concatenation": { "AddDocBreak": false, "BreakText": "ignored" },
                    "MakeCopies": { "NumberOfCopies": 2 }
                }
            }"#,
        );
        assert_eq!(
            c.select_action().unwrap(),
            Action::MakeCopies {
                copies: 2,
                doc_break: None
            }
        );
    }

    #[test]
    fn unknown_trigger_is_a_parse_error() {
        let r: Result<ActionConfig, _> =
            serde_json::from_str(r#"{ "Settings": { "ScaleAndRotate": { "Trigger": "diagonal" } } }"#);
        assert!(r.is_err());
    }

    #[test]
    fn server_config_seeds_builder() {
        let server: ServerConfig = serde_json::from_str(
            r#"{ "Directories": { "OutDir": "/out", "WorkDir": "/work", "LogDir": "/log" } }"#,
        )
        .unwrap();
        let config = JobConfig::builder()
            .server_config(&server)
            .work_dir("/override")
            .build()
            .unwrap();
        assert_eq!(config.out_dir, PathBuf::from("/out"));
        assert_eq!(config.work_dir, PathBuf::from("/override"));
        assert_eq!(config.log_dir, Some(PathBuf::from("/log")));
    }

    #[test]
    fn builder_requires_out_dir() {
        assert!(matches!(
            JobConfig::builder().build(),
            Err(JobError::InvalidConfig(_))
        ));
    }
}
