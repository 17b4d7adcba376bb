//! Yardview Client
//!
//! Window, input and wgpu front end for the scene viewer.

pub mod app;
pub mod config;
pub mod input;
pub mod renderer;

/// Run the viewer until the window closes.
pub fn run() -> anyhow::Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};
    use winit::event_loop::EventLoop;
    use app::App;
    use config::ViewerConfig;

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("yardview=debug".parse()?))
        .init();

    tracing::info!("Starting Yardview");

    let event_loop = EventLoop::new()?;
    let mut app = App::new(ViewerConfig::default());

    event_loop.run_app(&mut app)?;

    // Startup failures end the loop early; surface them to the caller.
    app.into_result()
}
