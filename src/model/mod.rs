//! Data models for the todo worker.
//!
//! - Todo: the single persisted entity
//! - `NewTodo`: the payload of an `addTodo` request

pub mod todo;

pub use todo::{NewTodo, Todo};
