pub mod color;
pub mod cursor;
pub mod grid;
pub mod parser;
pub mod screen;
pub mod wide;

pub use cursor::{CellAttrs, CursorState};
pub use grid::{Cell, CellFlags, Grid, Row};
pub use parser::AnsiParser;
pub use screen::{EraseMode, ScreenBuffer, Style};
