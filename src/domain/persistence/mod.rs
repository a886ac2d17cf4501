//! Storage-agnostic persistence model: entity metadata, query expressions
//! and the store port the unit of work commits through.

pub mod entity;
pub mod query;
pub mod store;
pub mod value;

pub use entity::{Column, Entity, EntityKind, Record};
pub use query::{ColumnName, CompareOp, PageRequest, Predicate, Query, SortOrder, Window};
pub use store::{Mutation, Store, StoreProvider, StoreTransaction};
pub use value::FieldValue;
