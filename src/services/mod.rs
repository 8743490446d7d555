pub mod line_edit;
pub mod process;
