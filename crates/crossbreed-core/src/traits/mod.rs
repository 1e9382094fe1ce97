mod backend;
mod clock;
mod lookup;

pub use backend::IPredictionBackend;
pub use clock::{IClock, ManualClock, SystemClock};
pub use lookup::IGeneticsLookup;
