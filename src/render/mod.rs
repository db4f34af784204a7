pub mod cell;
pub mod document;
pub mod html;
pub mod text;

pub use cell::CellValue;
pub use document::{DocBlock, ResultDoc, TableData};
