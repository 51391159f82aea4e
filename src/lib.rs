//! Reshape JSON values with templates that are themselves JSON.
//!
//! A template is compiled once into a [`Transform`] and then applied to any
//! number of inputs:
//!
//! ```
//! use serde_json::json;
//!
//! let transform = jt::compile(&json!({
//!     "names": ".people[].name",
//!     ".kind": true
//! }))
//! .unwrap();
//!
//! let output = transform.apply(&json!({
//!     "kind": "staff",
//!     "people": [{"name": "ann"}, {"name": "bob"}]
//! }));
//! assert_eq!(output, json!({"names": ["ann", "bob"], "staff": true}));
//! ```

pub mod error;
pub mod format;
pub mod output;
pub mod parser;
pub mod template;
pub mod value;

pub use error::{CompileError, JtError};
pub use template::{compile, compile_with, Options, Transform};
