//! Paint model shared by the overlay renderer and the element.
//!
//! Colors are linear premultiplied alpha; geometry stays in `coords`.

mod color;

pub use color::Color;
