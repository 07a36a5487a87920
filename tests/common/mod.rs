pub mod rows;
pub mod sources;

#[allow(unused_imports)]
pub use rows::{customer_row, header_row, sheet_with};
#[allow(unused_imports)]
pub use sources::ScriptedSource;
