pub mod app;
pub mod bridge;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod theme;
pub mod toast;
pub mod toaster;
pub mod ui;
pub use bridge::{dismiss, notify, notify_error, notify_success, ToastBus, Toasts};
pub use error::{AppError, AppResult};
pub use toast::{Toast, ToastId, ToastKind, ToastOptions};
pub use toaster::{Toaster, ToasterOptions};

/// Entrypoint used by the demo binary.
pub fn run() -> AppResult<()> {
    logging::init();
    tracing::info!("starting toastline demo");

    let options = config::load_toaster_options();
    let app = app::App::new(options);
    app.start()?;

    tracing::info!(position = %app.options().position, "demo window closed");
    Ok(())
}
