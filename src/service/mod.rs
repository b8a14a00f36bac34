// src/service/mod.rs
//
// Store-facing orchestration. Everything here takes the stores as trait
// objects and keeps no state of its own between calls. Generation
// compensates when a write fails partway; cleanup paths log and carry on.

pub mod candidates;
pub mod exams;
pub mod lifecycle;
