//! Pipeline orchestration.
//!
//! # Components
//!
//! - [`MosaicService`]: runs one request through decode, quantize, resize,
//!   tile and encode, then tears the arenas down
//! - [`MosaicRequest`] / [`MosaicOptions`]: what to build
//! - [`MosaicResponse`]: the serializable result envelope
//! - [`Stage`] / [`StageTrace`]: where a run got to and where it failed

mod request;
mod service;
mod stage;

pub use request::{
    MosaicOptions, MosaicRequest, MosaicResponse, SquareMode, TileImage, DEFAULT_FIT,
    DEFAULT_TILE_SIZE,
};
pub use service::{MosaicService, PipelineRun};
pub use stage::{Stage, StageTrace};
