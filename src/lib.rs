// Library root
// -----------
// The `hack` binary is a thin wrapper around these modules.
//
// Module responsibilities:
// - `store`: the JSON config file (credentials, custom keys, cached catalog).
// - `api`: blocking HTTP calls to the HackMyVM API and download host.
// - `catalog`: machine records, the cache in front of the API, list filters.
// - `download` / `submit`: the operations behind `download`, `checkflag`
//   and `submit`.
// - `cli` / `commands`: argument parsing and dispatch.
// - `ui`: prompts, progress bars and table output.
pub mod api;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod download;
pub mod error;
pub mod store;
pub mod submit;
pub mod ui;

pub use error::{Error, Result};
