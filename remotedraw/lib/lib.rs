//! `remotedraw` loads images from remote locations and displays them through placeholder-backed
//! visuals.
//!
//! # Overview
//!
//! A host constructs a [`RemoteVisual`](visual::RemoteVisual) with a placeholder and a resource
//! identifier. The visual asks a [`FetchCoordinator`](fetch::FetchCoordinator) for the resource:
//!
//! - If the resource is already cached, it is displayed immediately.
//! - Otherwise the placeholder is displayed while a bounded worker pool fetches and decodes the
//!   resource. On completion the coordinator posts the result to the host's presentation context,
//!   the visual swaps the placeholder for the fetched image and asks its host to redraw.
//!
//! Concurrent requests for the same identifier share a single fetch.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use std::{sync::Arc, time::Duration};
//!
//! use remotedraw::{
//!     config::FetcherConfig,
//!     fetch::{FetchCoordinator, PresentationQueue},
//!     resource::ImageDecoder,
//!     transport::DefaultTransport,
//!     visual::{ColorVisual, Rect, RemoteVisual},
//! };
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = FetcherConfig::default();
//!     let queue = PresentationQueue::new();
//!     let coordinator = FetchCoordinator::new(
//!         config.clone(),
//!         Arc::new(DefaultTransport::new(&config)?),
//!         Arc::new(ImageDecoder),
//!         queue.presenter(),
//!     )?;
//!
//!     let visual = RemoteVisual::new(
//!         Box::new(ColorVisual::new(0xFFFF0000)),
//!         "https://example.com/photo.png",
//!         &coordinator,
//!     );
//!     visual.set_bounds(Rect::new(0, 0, 320, 240));
//!
//!     // The host's event loop drains completions on its own thread.
//!     queue.run_for(Duration::from_secs(5));
//!     println!("resolved: {}", visual.is_resolved());
//!
//!     coordinator.shutdown();
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`cache`] - Bounded in-memory cache of decoded resources
//! - [`cli`] - Command-line arguments of the demo binary
//! - [`config`] - Fetcher configuration and defaults
//! - [`fetch`] - Fetch coordination, worker pool and presentation context
//! - [`resource`] - Decoded resources and decoders
//! - [`transport`] - Byte transports (HTTP, filesystem)
//! - [`visual`] - Visual abstractions and the remote-backed visual

#![warn(missing_docs)]

mod error;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub mod cache;
pub mod cli;
pub mod config;
pub mod fetch;
pub mod resource;
pub mod transport;
pub mod visual;

pub use error::*;
