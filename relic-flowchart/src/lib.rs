pub mod answer_key;
pub mod config;
pub mod error;
pub mod graph;
pub mod multiset;
pub mod protocol;
pub mod server;
pub mod transport;
pub mod validator;

pub use answer_key::{AnswerKey, AnswerKeyRegistry};
pub use error::FlowchartError;
pub use graph::{Edge, Label, LabelPair, Node};
pub use validator::{FlowchartValidator, ValidationResult, ValidatorOptions};
