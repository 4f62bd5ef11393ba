//! # Mugsmith core
//!
//! Everything needed to edit a mug design without a window: the layered design state, its
//! undo history, the editor session driving it, the pixel operations and the CPU compositor
//! that flattens a design into the texture wrapped around the mug.

pub mod ar;
pub mod blend;
pub mod color;
pub mod editor;
pub mod history;
pub mod id;
pub mod io;
pub mod raster;
pub mod render;
pub mod repositories;
pub mod state;
pub mod util;

pub use id::ObjectId;
pub use state::Design;

/// Width and height of the mug's printable wrap area, in logical pixels (3:1).
pub const PRINT_AREA: [u32; 2] = [900, 300];
