// THEORY:
// This file is the main entry point for the `aqua_cycle` library crate.
// It follows the standard Rust convention of using `lib.rs` to define the public
// API that will be exposed to external consumers (like the streaming server).
//
// The primary goal is to export the `ScenePipeline` and its associated data
// structures (`PipelineConfig`, `GestureSignal`, etc.) as the clean, high-level
// interface for the entire interaction engine. All the complex internal modules
// (`core_modules`) are encapsulated behind it, providing a clean separation of
// concerns: the pipeline takes a camera frame plus detector output and leaves
// the fully annotated frame behind.

pub mod core_modules;
pub mod pipeline;
