//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate parser and repository calls into use-case level APIs.
//! - Keep hosts (CLI, embedding UIs) decoupled from storage details.

pub mod timeline_service;
