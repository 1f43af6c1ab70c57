pub mod explicit;
pub mod symbolic;


pub use explicit::{DfaStateId, ExplicitDfa, Guard};
pub use symbolic::SymbolicDfa;
