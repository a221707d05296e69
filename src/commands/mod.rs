mod generate;
mod info;
mod watch;

pub use generate::*;
pub use info::*;
pub use watch::*;
