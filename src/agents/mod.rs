pub mod environment;
pub mod formatter;
pub mod module_lister;
pub mod project_scanner;
pub mod publisher;
pub mod renderer;
pub mod report_writer;
pub mod version_control;

pub use environment::EnvironmentPreparer;
pub use formatter::{ExternalFormatter, FormatMode, MarkdownFormatter, ReportFormatter};
pub use module_lister::{GoModuleLister, ModuleLister};
pub use publisher::{PublishOutcome, ReportPublisher};
pub use renderer::ReportRenderer;
pub use report_writer::ReportWriter;
pub use version_control::{ReportRepository, VersionControlAgent};
