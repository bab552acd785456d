//! xlsxchat - Chat-style XLSX to Markdown conversion sessions
//!
//! This crate provides the orchestration core behind a chat-style web UI that
//! converts uploaded Excel workbooks (XLSX) into Markdown tables. The UI
//! framework itself is an external collaborator: this crate accepts uploaded
//! bytes, converts selected sheets, holds the result in a per-user session,
//! and interprets chat commands (`/download`, `/preview`, `/error`) against
//! that session.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use xlsxchat::{
//!     CommandRouter, ConversionOptions, ConversionSession, NoProgress, SheetConverter,
//!     UploadedFile, Workbook,
//! };
//!
//! fn main() -> Result<(), xlsxchat::XlsxChatError> {
//!     // Accept an uploaded file (extension is authoritative, MIME is advisory)
//!     let bytes = std::fs::read("report.xlsx")?;
//!     let file = UploadedFile::new("report.xlsx", None, bytes);
//!     let (mut workbook, warnings) = Workbook::open(file)?;
//!     for warning in &warnings {
//!         eprintln!("{warning}");
//!     }
//!
//!     // Convert every sheet with default options
//!     let selected = workbook.sheet_names().to_vec();
//!     let converter = SheetConverter::new(ConversionOptions::default());
//!     let outcome = converter.convert(&mut workbook, &selected, &mut NoProgress)?;
//!
//!     // Store the outcome in the session and answer chat commands against it
//!     let mut session = ConversionSession::new();
//!     session.store_outcome(outcome);
//!
//!     let router = CommandRouter::new();
//!     let (response, _action) = router.handle(&mut session, "/preview");
//!     println!("{response}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Partial success
//!
//! Sheets are processed sequentially, one at a time. A sheet that fails to
//! read, or that contains no data rows, is recorded as an error message and
//! skipped; the remaining sheets are still converted. Only when *zero* sheets
//! succeed does the conversion as a whole fail, and in that case the session
//! keeps whatever outcome it held before.
//!
//! # Custom options
//!
//! ```rust
//! use xlsxchat::ConversionOptions;
//!
//! # fn main() -> Result<(), xlsxchat::XlsxChatError> {
//! let options = ConversionOptions::builder()
//!     .include_row_index(true)
//!     .max_column_width(50) // valid range: 10..=100
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod command;
mod convert;
mod error;
mod normalize;
mod render;
mod session;
mod types;
mod workbook;

// 公開API
pub use command::{CommandRouter, UiAction};
pub use convert::{
    ConversionOptions, ConversionOptionsBuilder, NoProgress, ProgressSink, SheetConverter,
    DEFAULT_MAX_COLUMN_WIDTH, MAX_MAX_COLUMN_WIDTH, MIN_MAX_COLUMN_WIDTH,
};
pub use error::XlsxChatError;
pub use normalize::normalize;
pub use render::{render_table, render_table_fallback};
pub use session::{ChatRole, ChatTurn, ConversionSession};
pub use types::{CellValue, ConversionOutcome, SheetConversionResult, TabularData};
pub use workbook::{UploadedFile, Workbook, MARKDOWN_MIME};
