pub(crate) mod reorder_engine;

pub use reorder_engine::ReorderEngine;
