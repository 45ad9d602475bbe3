pub mod analysis;
pub mod annotate;
pub mod count;
pub mod error;
pub mod interval;
pub mod io;
pub mod linkage;
pub mod mapchart;
pub mod matrix;
pub mod peak;
pub mod table;
