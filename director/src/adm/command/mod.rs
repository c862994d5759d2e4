pub mod cleanup;
pub mod show_cleanable;
