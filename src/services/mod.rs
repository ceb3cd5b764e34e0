pub mod backup;
pub mod dashboard;
pub mod dates;
pub mod drafts;
pub mod editor;
pub mod previous;
pub mod records;
pub mod routine;
pub mod timer;
pub mod volume;

pub use dashboard::{ChartSeries, Dashboard};
pub use drafts::DraftStore;
pub use editor::{EditorCommand, SessionEditor};
pub use routine::{RoutineCommand, RoutineManager};
