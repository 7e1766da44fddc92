pub mod lookup;
pub mod set_search_dir;

pub use lookup::*;
pub use set_search_dir::*;
