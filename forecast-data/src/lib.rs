mod loader;

pub use loader::{BracketTable, ScheduleLoader, ScheduleLoaderError, ScheduleRecord};
