use std::sync::Arc;

use clap::Parser;
use remotedraw::{
    cli::{LoadTracker, RemoteDrawArgs},
    fetch::{FetchCoordinator, PresentationQueue},
    resource::ImageDecoder,
    transport::DefaultTransport,
    visual::{ColorVisual, RecordingCanvas, Rect, RemoteVisual},
    RemoteDrawResult,
};
use tracing_subscriber::{fmt, EnvFilter};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Color of the placeholder shown until an image arrives.
const PLACEHOLDER_COLOR: u32 = 0xFFFF_0000;

/// Bounds every demo visual is laid out in.
const DEMO_BOUNDS: Rect = Rect::new(0, 0, 200, 200);

//--------------------------------------------------------------------------------------------------
// Functions: main
//--------------------------------------------------------------------------------------------------

fn main() -> RemoteDrawResult<()> {
    let args = RemoteDrawArgs::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_level(true)
        .with_env_filter(filter)
        .init();

    let config = args.fetcher_config()?;
    let queue = PresentationQueue::new();
    let coordinator = FetchCoordinator::new(
        config.clone(),
        Arc::new(DefaultTransport::new(&config)?),
        Arc::new(ImageDecoder),
        queue.presenter(),
    )?;

    let tracked: Vec<(RemoteVisual, Arc<LoadTracker>)> = args
        .identifiers
        .iter()
        .map(|identifier| {
            let visual = RemoteVisual::new(
                Box::new(ColorVisual::new(PLACEHOLDER_COLOR)),
                identifier.as_str(),
                &coordinator,
            );
            visual.set_bounds(DEMO_BOUNDS);
            let tracker = LoadTracker::new();
            tracker.track(&visual, &coordinator);
            (visual, tracker)
        })
        .collect();

    queue.run_until(args.wait(), || tracked.iter().all(|(_, tracker)| tracker.is_settled()));

    for (visual, tracker) in &tracked {
        let mut canvas = RecordingCanvas::new();
        visual.draw(&mut canvas);
        println!("{}", tracker.summary(visual.key(), &canvas));
    }

    coordinator.shutdown();
    Ok(())
}
