//! Diagnostic creation, severity management, and rendering.
//!
//! Every stage of the router reports through a shared [`DiagnosticSink`]
//! instead of a global logger. A [`Diagnostic`] carries a severity, a coded
//! identifier, a message, an optional subject (usually a net or pin name),
//! and free-form notes and help lines. [`DiagnosticRenderer`] implementations
//! format the accumulated diagnostics for a terminal or as JSON.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, JsonRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
