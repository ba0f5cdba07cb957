use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::bridge;
use crate::error::{AppError, AppResult};
use crate::toast::{ToastId, ToastOptions};
use crate::toaster::{Toaster, ToasterOptions};
use crate::ui::{ToasterWidget, LAYOUT_TOKENS};
use gtk4::prelude::*;
use gtk4::{Align, Application, ApplicationWindow, Box as GtkBox, Button, Label, Orientation, Overlay};

const APPLICATION_ID: &str = "io.github.toastline.Demo";

/// Pass only argv[0] to GTK so demo flags never reach GTK's own parser.
fn gtk_launch_args() -> Vec<String> {
    std::env::args().take(1).collect()
}

/// Demo window: a row of buttons publishing on the document bus and a
/// toaster rendering whatever arrives.
pub struct App {
    options: ToasterOptions,
}

impl App {
    pub fn new(options: ToasterOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ToasterOptions {
        &self.options
    }

    pub fn start(&self) -> AppResult<()> {
        gtk4::init()?;

        tracing::info!(
            position = %self.options.position,
            theme = ?self.options.theme,
            hotkey = %self.options.hotkey.label(),
            "starting gtk runtime"
        );
        let application = Application::new(
            Some(APPLICATION_ID),
            gtk4::gio::ApplicationFlags::NON_UNIQUE,
        );

        let options = self.options.clone();
        let activate_once = Rc::new(Cell::new(false));
        application.connect_activate(move |app| {
            if activate_once.replace(true) {
                tracing::debug!("ignoring duplicate gtk activate signal");
                return;
            }
            let window = build_demo_window(app, options.clone());
            tracing::info!("presenting demo window");
            window.present();
        });

        let gtk_args = gtk_launch_args();
        let exit_code = application.run_with_args(&gtk_args);
        if exit_code != gtk4::glib::ExitCode::SUCCESS {
            return Err(AppError::Exit(exit_code));
        }
        Ok(())
    }
}

fn demo_button(label: &str) -> Button {
    let button = Button::with_label(label);
    button.set_focus_on_click(false);
    button
}

fn build_demo_window(app: &Application, options: ToasterOptions) -> ApplicationWindow {
    let window = ApplicationWindow::new(app);
    window.set_title(Some("Toastline"));
    window.set_default_size(760, 520);

    let hotkey_label = options.hotkey.label();
    let toaster = ToasterWidget::new(Toaster::on_document(options));
    toaster.connect_hotkeys(&window);

    let content = GtkBox::new(Orientation::Vertical, LAYOUT_TOKENS.gap);
    content.set_halign(Align::Center);
    content.set_valign(Align::Center);
    let hint = Label::new(Some(&format!(
        "Press {hotkey_label} to expand the stack, Escape to collapse it."
    )));
    hint.add_css_class("dim-label");
    content.append(&hint);

    let buttons = GtkBox::new(Orientation::Horizontal, LAYOUT_TOKENS.gap / 2);
    let notify_button = demo_button("Notify");
    let success_button = demo_button("Success");
    let error_button = demo_button("Error");
    let dismiss_button = demo_button("Dismiss latest");
    let expand_button = demo_button("Toggle expanded");
    for button in [
        &notify_button,
        &success_button,
        &error_button,
        &dismiss_button,
        &expand_button,
    ] {
        buttons.append(button);
    }
    content.append(&buttons);

    let latest = Rc::new(RefCell::new(None::<ToastId>));
    let sequence = Rc::new(Cell::new(0_u32));
    let next_count = move || {
        let count = sequence.get().saturating_add(1);
        sequence.set(count);
        count
    };

    {
        let latest = latest.clone();
        let next_count = next_count.clone();
        notify_button.connect_clicked(move |_| {
            let count = next_count();
            let id = bridge::notify(
                format!("Event #{count} has been created"),
                ToastOptions::new().with_description("Sunday, December 03, 2023 at 9:00 AM"),
            );
            latest.replace(Some(id));
        });
    }
    {
        let latest = latest.clone();
        let next_count = next_count.clone();
        success_button.connect_clicked(move |_| {
            let count = next_count();
            let id = bridge::notify_success(format!("Saved draft #{count}"), None);
            latest.replace(Some(id));
        });
    }
    {
        let latest = latest.clone();
        error_button.connect_clicked(move |_| {
            let count = next_count();
            let id = bridge::notify_error(
                format!("Upload #{count} failed"),
                ToastOptions::new()
                    .with_description("Check the connection and try again.")
                    .with_duration(Duration::from_secs(8)),
            );
            latest.replace(Some(id));
        });
    }
    {
        let latest = latest.clone();
        dismiss_button.connect_clicked(move |_| {
            if let Some(id) = latest.borrow_mut().take() {
                bridge::dismiss(id);
            }
        });
    }
    {
        let toaster = toaster.clone();
        expand_button.connect_clicked(move |_| {
            let expanded = toaster.toaster().snapshot().expanded();
            toaster.toaster().set_expanded(!expanded);
        });
    }

    let overlay = Overlay::new();
    overlay.set_child(Some(&content));
    overlay.add_overlay(toaster.widget());
    window.set_child(Some(&overlay));
    window
}
