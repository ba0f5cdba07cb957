use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use gtk4::prelude::*;
use gtk4::{Align, Box as GtkBox, Button, Label, Orientation};

use super::runtime_css::TOAST_CLASS;
use super::style::StyleTokens;
use crate::toast::{StyleMap, ToastId};
use crate::toaster::ToastItemView;

/// Auto-dismiss countdown that can be paused while the stack is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct DismissTimer {
    remaining: Duration,
    started: Option<Instant>,
}

impl DismissTimer {
    pub(super) fn new(duration: Duration) -> Self {
        Self {
            remaining: duration,
            started: None,
        }
    }

    #[cfg(test)]
    pub(super) fn is_running(&self) -> bool {
        self.started.is_some()
    }

    /// Starts counting down; returns how long until expiry, or `None` when
    /// already running.
    pub(super) fn resume(&mut self, now: Instant) -> Option<Duration> {
        if self.started.is_some() {
            return None;
        }
        self.started = Some(now);
        Some(self.remaining)
    }

    /// Stops counting down, keeping the time left. Returns whether the timer
    /// was running.
    pub(super) fn pause(&mut self, now: Instant) -> bool {
        let Some(started) = self.started.take() else {
            return false;
        };
        self.remaining = self
            .remaining
            .saturating_sub(now.saturating_duration_since(started));
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Countdown {
    Leave,
    Pause,
    Run,
}

/// What the auto-dismiss countdown should do for `item`. Only a real
/// expansion or an ongoing interaction pauses it; `expand_by_default` does not.
pub(super) fn countdown_for(item: &ToastItemView, expanded: bool, interacting: bool) -> Countdown {
    if item.toast.is_dismissed() {
        Countdown::Leave
    } else if expanded || interacting {
        Countdown::Pause
    } else {
        Countdown::Run
    }
}

/// Whether a row built for `id` at `generation` still renders `item`. A toast
/// that reuses an id is a new toast and gets a new row.
pub(super) fn renders_item(id: &ToastId, generation: u64, item: &ToastItemView) -> bool {
    &item.toast.id == id && item.generation == generation
}

/// Inline style for one toast: toaster-wide toast style, then the toast's own.
pub(super) fn row_style(item: &ToastItemView) -> StyleMap {
    let mut style = item.style.clone();
    if let Some(own) = &item.toast.style {
        style.extend(own.iter().map(|(name, value)| (name.clone(), value.clone())));
    }
    style
}

pub(super) fn row_classes(item: &ToastItemView, row_class: &str) -> Vec<String> {
    let mut classes = vec![
        TOAST_CLASS.to_string(),
        format!("toast-{}", item.toast.kind.as_str()),
        row_class.to_string(),
    ];
    for extra in [item.class.as_deref(), item.toast.class.as_deref()]
        .into_iter()
        .flatten()
    {
        classes.extend(extra.split_whitespace().map(str::to_string));
    }
    classes
}

fn description_classes(item: &ToastItemView) -> Vec<String> {
    let mut classes = vec!["toast-description".to_string()];
    for extra in [
        item.description_class.as_deref(),
        item.toast.description_class.as_deref(),
    ]
    .into_iter()
    .flatten()
    {
        classes.extend(extra.split_whitespace().map(str::to_string));
    }
    classes
}

struct RowRuntime {
    timer: RefCell<DismissTimer>,
    sequence: Cell<u64>,
    leaving: Cell<bool>,
    exit_ms: u32,
    remove: Box<dyn Fn()>,
}

impl RowRuntime {
    fn bump_sequence(&self) -> u64 {
        let sequence = self.sequence.get().saturating_add(1);
        self.sequence.set(sequence);
        sequence
    }

    fn pause(&self) {
        if self.timer.borrow_mut().pause(Instant::now()) {
            self.bump_sequence();
        }
    }

    fn resume(self: &Rc<Self>, root: &GtkBox) {
        if self.leaving.get() {
            return;
        }
        let Some(delay) = self.timer.borrow_mut().resume(Instant::now()) else {
            return;
        };
        let sequence = self.bump_sequence();
        let runtime = Rc::downgrade(self);
        let root = root.clone();
        gtk4::glib::timeout_add_local_once(delay, move || {
            let Some(runtime) = runtime.upgrade() else {
                return;
            };
            if runtime.sequence.get() == sequence {
                runtime.leave(&root);
            }
        });
    }

    /// Plays the exit transition, then removes the toast from the toaster.
    fn leave(self: &Rc<Self>, root: &GtkBox) {
        if self.leaving.replace(true) {
            return;
        }
        self.timer.borrow_mut().pause(Instant::now());
        self.bump_sequence();
        root.add_css_class("toast-leaving");

        let runtime = Rc::downgrade(self);
        gtk4::glib::timeout_add_local_once(
            Duration::from_millis(u64::from(self.exit_ms)),
            move || {
                if let Some(runtime) = runtime.upgrade() {
                    (runtime.remove)();
                }
            },
        );
    }
}

/// Widgets for one toast in the stack.
pub(super) struct ToastRow {
    id: ToastId,
    generation: u64,
    root: GtkBox,
    title: Label,
    description: Label,
    row_class: String,
    applied_classes: RefCell<Vec<String>>,
    applied_description_classes: RefCell<Vec<String>>,
    runtime: Rc<RowRuntime>,
}

impl ToastRow {
    pub(super) fn new(
        item: &ToastItemView,
        row_class: String,
        tokens: StyleTokens,
        remove: impl Fn() + 'static,
    ) -> Self {
        let root = GtkBox::builder()
            .orientation(Orientation::Horizontal)
            .spacing(tokens.gap / 2)
            .accessible_role(gtk4::AccessibleRole::ListItem)
            .build();
        root.set_size_request(tokens.toast_width, -1);

        let content = GtkBox::new(Orientation::Vertical, 2);
        content.set_hexpand(true);
        content.set_valign(Align::Center);
        let title = Label::new(None);
        title.add_css_class("toast-title");
        title.set_xalign(0.0);
        title.set_wrap(true);
        let description = Label::new(None);
        description.set_xalign(0.0);
        description.set_wrap(true);
        content.append(&title);
        content.append(&description);
        root.append(&content);

        let runtime = Rc::new(RowRuntime {
            timer: RefCell::new(DismissTimer::new(item.duration)),
            sequence: Cell::new(0),
            leaving: Cell::new(false),
            exit_ms: tokens.exit_ms,
            remove: Box::new(remove),
        });

        if item.close_button {
            let close = Button::from_icon_name("window-close-symbolic");
            close.add_css_class("flat");
            close.add_css_class("toast-close");
            close.set_focus_on_click(false);
            close.set_tooltip_text(Some("Close toast"));
            close.set_valign(Align::Start);
            close.set_size_request(tokens.close_button_size, tokens.close_button_size);
            let runtime = Rc::downgrade(&runtime);
            let row_root = root.downgrade();
            close.connect_clicked(move |_| {
                if let (Some(runtime), Some(row_root)) = (runtime.upgrade(), row_root.upgrade()) {
                    runtime.leave(&row_root);
                }
            });
            root.append(&close);
        }

        Self {
            id: item.toast.id.clone(),
            generation: item.generation,
            root,
            title,
            description,
            row_class,
            applied_classes: RefCell::new(Vec::new()),
            applied_description_classes: RefCell::new(Vec::new()),
            runtime,
        }
    }

    pub(super) fn id(&self) -> &ToastId {
        &self.id
    }

    pub(super) fn renders(&self, item: &ToastItemView) -> bool {
        renders_item(&self.id, self.generation, item)
    }

    pub(super) fn widget(&self) -> &GtkBox {
        &self.root
    }

    pub(super) fn row_class(&self) -> &str {
        &self.row_class
    }

    /// Applies `item` to the widgets and pauses or resumes the countdown.
    pub(super) fn update(&self, item: &ToastItemView, expanded: bool, interacting: bool) {
        self.title.set_text(&item.toast.title);
        match item.toast.description.as_deref() {
            Some(text) => {
                self.description.set_text(text);
                self.description.set_visible(true);
            }
            None => self.description.set_visible(false),
        }
        replace_classes(
            self.root.upcast_ref(),
            &self.applied_classes,
            row_classes(item, &self.row_class),
        );
        replace_classes(
            self.description.upcast_ref(),
            &self.applied_description_classes,
            description_classes(item),
        );
        self.root.set_visible(item.is_shown(expanded));
        self.root.update_property(&[gtk4::accessible::Property::Label(
            &item.toast.title,
        )]);

        match countdown_for(item, expanded, interacting) {
            Countdown::Leave => self.runtime.leave(&self.root),
            Countdown::Pause => self.runtime.pause(),
            Countdown::Run => self.runtime.resume(&self.root),
        }
    }

    /// Natural height at the toast width, once laid out.
    pub(super) fn natural_height(&self, width: i32) -> Option<f64> {
        let (_, natural, _, _) = self.root.measure(Orientation::Vertical, width);
        (natural > 0).then(|| f64::from(natural))
    }
}

fn replace_classes(widget: &gtk4::Widget, applied: &RefCell<Vec<String>>, next: Vec<String>) {
    let mut applied = applied.borrow_mut();
    if *applied == next {
        return;
    }
    for class in applied.iter().filter(|class| !next.contains(class)) {
        widget.remove_css_class(class);
    }
    for class in &next {
        widget.add_css_class(class);
    }
    *applied = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ResolvedTheme;
    use crate::toast::{Toast, ToastKind, ToastOptions};
    use crate::toaster::{view, ToasterAction, ToasterOptions, ToasterState};

    fn item_for(toast: Toast, options: &ToasterOptions) -> ToastItemView {
        let mut state = ToasterState::new(false, ResolvedTheme::Light);
        state.apply(ToasterAction::ToastAdded(toast));
        view::render(&state, options)
            .expect("stack should render")
            .items
            .remove(0)
    }

    #[test]
    fn timer_keeps_remaining_time_across_pauses() {
        let start = Instant::now();
        let mut timer = DismissTimer::new(Duration::from_millis(4_000));

        assert_eq!(timer.resume(start), Some(Duration::from_millis(4_000)));
        assert_eq!(timer.resume(start), None);
        assert!(timer.pause(start + Duration::from_millis(1_500)));
        assert!(!timer.pause(start + Duration::from_millis(1_600)));
        assert!(!timer.is_running());

        assert_eq!(
            timer.resume(start + Duration::from_secs(10)),
            Some(Duration::from_millis(2_500))
        );
    }

    #[test]
    fn timer_never_goes_negative() {
        let start = Instant::now();
        let mut timer = DismissTimer::new(Duration::from_millis(100));
        timer.resume(start);
        timer.pause(start + Duration::from_secs(1));
        assert_eq!(timer.resume(start), Some(Duration::ZERO));
    }

    #[test]
    fn toast_style_overrides_toaster_toast_style() {
        let mut options = ToasterOptions::default();
        options
            .toast_options
            .style
            .insert("color".to_string(), "red".to_string());
        options
            .toast_options
            .style
            .insert("padding".to_string(), "4px".to_string());
        let mut own = StyleMap::new();
        own.insert("color".to_string(), "blue".to_string());
        let toast = Toast::from_options(
            "styled",
            ToastKind::Normal,
            ToastOptions {
                style: Some(own),
                ..ToastOptions::new()
            },
        );

        let style = row_style(&item_for(toast, &options));
        assert_eq!(style.get("color").map(String::as_str), Some("blue"));
        assert_eq!(style.get("padding").map(String::as_str), Some("4px"));
    }

    #[test]
    fn classes_combine_kind_toaster_and_toast_classes() {
        let mut options = ToasterOptions::default();
        options.toast_options.class = Some("pill wide".to_string());
        options.toast_options.description_class = Some("muted".to_string());
        let toast = Toast::from_options(
            "ok",
            ToastKind::Success,
            ToastOptions::new().with_class("mine"),
        );
        let item = item_for(toast, &options);

        assert_eq!(
            row_classes(&item, "toastline-toast-7"),
            vec![
                "toastline-toast",
                "toast-success",
                "toastline-toast-7",
                "pill",
                "wide",
                "mine"
            ]
        );
        assert_eq!(description_classes(&item), vec!["toast-description", "muted"]);
    }

    #[test]
    fn countdown_pauses_only_on_real_expansion_or_interaction() {
        let options = ToasterOptions {
            expand: true,
            ..ToasterOptions::default()
        };
        let item = item_for(Toast::from_options("a", ToastKind::Normal, ToastOptions::new()), &options);

        assert_eq!(countdown_for(&item, false, false), Countdown::Run);
        assert_eq!(countdown_for(&item, true, false), Countdown::Pause);
        assert_eq!(countdown_for(&item, false, true), Countdown::Pause);

        let dismissed = ToastItemView {
            toast: item.toast.dismissed(),
            ..item
        };
        assert_eq!(countdown_for(&dismissed, true, true), Countdown::Leave);
    }

    #[test]
    fn reused_id_is_not_rendered_by_the_previous_row() {
        let options = ToasterOptions::default();
        let id = ToastId::from("x");
        let mut state = ToasterState::new(false, ResolvedTheme::Light);
        state.apply(ToasterAction::ToastAdded(Toast::from_options(
            "first",
            ToastKind::Normal,
            ToastOptions::new().with_id("x"),
        )));
        state.apply(ToasterAction::DismissRequested(id.clone()));
        let leaving = view::render(&state, &options).expect("stack").items.remove(0);
        assert!(renders_item(&id, leaving.generation, &leaving));

        state.apply(ToasterAction::ToastAdded(Toast::from_options(
            "second",
            ToastKind::Normal,
            ToastOptions::new().with_id("x"),
        )));
        let fresh = view::render(&state, &options).expect("stack").items.remove(0);

        assert!(!fresh.toast.is_dismissed());
        assert!(!renders_item(&id, leaving.generation, &fresh));
        assert!(renders_item(&id, fresh.generation, &fresh));
        assert!(!renders_item(&ToastId::from("y"), fresh.generation, &fresh));
    }
}
