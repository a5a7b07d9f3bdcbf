pub mod config;
pub mod inspector;
pub mod notify;
pub mod orchestrator;
pub mod processor;
pub mod replacer;
pub mod scanner;
pub mod tags;
pub mod testing;
pub mod transcoder;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, NotificationConfig,
    SanitizedConfig,
};
pub use inspector::{Eligibility, EligibilityInspector};
pub use notify::{
    create_notification_system, LogNotifier, Notification, NotificationHandle,
    NotificationWriter, Notifier, NotifyError, WebhookNotifier,
};
pub use orchestrator::{BatchError, BatchOrchestrator, BatchSummary, OrchestratorConfig};
pub use processor::{ConversionOutcome, FileProcessor, FileReport, ProcessingStage, ProcessorConfig};
pub use replacer::{FsReplacer, ReplaceError, Replacer, ReplacerConfig};
pub use scanner::{DirectoryWalker, ScanError};
pub use tags::{
    EstimatedTags, LoftyTagAccessor, RecoveryOutcome, RecoveryPolicy, SeparatorPolicy,
    TagAccessor, TagError, TagField, TagSet,
};
pub use transcoder::{
    Artifact, AudioFormat, FfmpegTranscoder, TranscodeError, Transcoder, TranscoderConfig,
};
