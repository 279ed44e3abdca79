pub mod datapoint;
pub mod dates;
pub mod subject;
pub mod view_state;

pub use datapoint::*;
pub use dates::*;
pub use subject::*;
pub use view_state::*;
