pub mod scale;
pub mod vessel;

pub use scale::{LinearScale, TimeScale};
pub use vessel::{day_number, Direction, VesselEvent, VesselType};
