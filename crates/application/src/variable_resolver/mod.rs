//! Variable storage and `${NAME}` substitution.

mod store;
mod substitution;

pub use store::{VariableError, VariableStore};
pub use substitution::{MacroResolver, SubstitutionResult, read_variable};
