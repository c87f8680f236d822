// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod fields;
pub mod filter;
pub mod forms;
pub mod ids;
pub mod model;
pub mod selection;
pub mod sort;
pub mod state;
pub mod table;

pub use fields::*;
pub use filter::*;
pub use forms::*;
pub use ids::*;
pub use model::*;
pub use selection::*;
pub use sort::*;
pub use state::*;
pub use table::*;
