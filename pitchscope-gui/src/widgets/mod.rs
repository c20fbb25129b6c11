//! # Widgets Module
//!
//! Canvas widgets for the Pitchscope window.

pub mod scope;
