pub mod decide;
pub mod train;
pub mod util;
