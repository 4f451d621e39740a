pub mod ai_service;
#[cfg(feature = "http-server")]
pub mod barcode; // Static barcode lookup
pub mod mock_analyzer; // Offline keyword analysis
pub mod openai; // OpenAI compatible chat-completion client
pub mod pipeline;
pub mod settings; // Key-value settings file

#[cfg(feature = "http-server")]
pub use barcode::BarcodeService;
pub use openai::OpenAiService;
pub use pipeline::{AnalysisOutcome, AnalysisPipeline};
pub use settings::SettingsStore;
