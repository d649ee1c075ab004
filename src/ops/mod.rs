//! Trie algorithms over [`Node`](crate::node::Node) handles.

pub mod get;
pub mod merge;
pub mod put;
pub mod remove;
