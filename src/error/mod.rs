use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to initialize gtk")]
    GtkInit(#[from] gtk4::glib::BoolError),
    #[error("gtk application exited with {0:?}")]
    Exit(gtk4::glib::ExitCode),
}
