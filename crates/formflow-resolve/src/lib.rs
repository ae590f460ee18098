//! Lexical scope resolution for compiled form trees.
//!
//! A value-consuming node (a field default, a computed expression) needs to
//! know which enclosing containers it sits in and which ancestor-declared
//! on-load effects are responsible for populating the data it reads. This
//! crate walks the element tree's parent links to answer both questions.
//!
//! The tree is consumed through the narrow [`scope::ElementLookup`] trait,
//! so any representation with parent links and on-load declarations can be
//! resolved against; [`formflow_core::FormTree`] implements it.

pub mod scope;

pub use scope::{ElementLookup, ScopeEntry, ScopeInfo, ScopeResolver};
