pub mod cli;
pub mod config;
pub mod error;
pub mod identity;
pub mod reduce;
pub mod report;
pub mod scan;
pub mod segment;
pub mod settings;
pub mod stats;
pub mod table;
pub mod util;

pub use reduce::{JobRecord, Parallelism, Reducer, Reduction};
pub use settings::Settings;
pub use table::{Sample, SampleTable};
