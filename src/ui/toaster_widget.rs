use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU32, Ordering};

use gtk4::prelude::*;
use gtk4::{Align, Box as GtkBox, CssProvider, Orientation};

use super::key_bridge;
use super::runtime_css::{attach_provider, install_runtime_css, stack_css, TOASTER_CLASS};
use super::style::{css_pixels, LAYOUT_TOKENS};
use super::system_theme::GtkSystemTheme;
use super::toast_row::{row_style, ToastRow};
use crate::toaster::view::{GAP_PROPERTY, OFFSET_PROPERTY};
use crate::toaster::{view, HorizontalEdge, StackView, Toaster, ToasterState, VerticalEdge};

static NEXT_WIDGET_CLASS: AtomicU32 = AtomicU32::new(1);

fn next_class(prefix: &str) -> String {
    let sequence = NEXT_WIDGET_CLASS.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{sequence}")
}

const fn halign_for(x: HorizontalEdge) -> Align {
    match x {
        HorizontalEdge::Left => Align::Start,
        HorizontalEdge::Center => Align::Center,
        HorizontalEdge::Right => Align::End,
    }
}

const fn valign_for(y: VerticalEdge) -> Align {
    match y {
        VerticalEdge::Top => Align::Start,
        VerticalEdge::Bottom => Align::End,
    }
}

/// Classes on the stack container for `view`.
pub(super) fn stack_classes(view: &StackView) -> Vec<String> {
    let mut classes = vec![
        format!("theme-{}", view.theme.as_str()),
        format!("y-{}", view.y_position.as_str()),
        format!("x-{}", view.x_position.as_str()),
    ];
    if view.rich_colors {
        classes.push("rich-colors".to_string());
    }
    if view.expanded {
        classes.push("expanded".to_string());
    }
    if let Some(class) = &view.class {
        classes.extend(class.split_whitespace().map(str::to_string));
    }
    classes
}

struct Inner {
    toaster: Toaster,
    root: GtkBox,
    list: GtkBox,
    provider: CssProvider,
    stack_class: String,
    rows: RefCell<Vec<ToastRow>>,
    applied_classes: RefCell<Vec<String>>,
    applied_css: RefCell<String>,
    syncing: Cell<bool>,
    resync: Cell<bool>,
    measure_pending: Cell<bool>,
}

impl Inner {
    fn sync(self: &Rc<Self>, state: &ToasterState) {
        if self.syncing.replace(true) {
            self.resync.set(true);
            return;
        }
        self.render(state);
        while self.resync.replace(false) {
            let state = self.toaster.snapshot();
            self.render(&state);
        }
        self.syncing.set(false);
    }

    fn render(self: &Rc<Self>, state: &ToasterState) {
        let Some(view) = view::render(state, self.toaster.options()) else {
            for row in self.rows.borrow_mut().drain(..) {
                self.list.remove(row.widget());
            }
            self.root.set_visible(false);
            return;
        };

        self.apply_stack(&view);
        self.reconcile_rows(&view, state.interacting());
        self.apply_css(&view);
        self.root.set_visible(true);
        self.schedule_measure();
    }

    fn apply_stack(&self, view: &StackView) {
        let next = stack_classes(view);
        let mut applied = self.applied_classes.borrow_mut();
        if *applied != next {
            for class in applied.iter().filter(|class| !next.contains(class)) {
                self.root.remove_css_class(class);
            }
            for class in &next {
                self.root.add_css_class(class);
            }
            *applied = next;
        }

        self.root.set_halign(halign_for(view.x_position));
        self.root.set_valign(valign_for(view.y_position));
        let offset = view
            .style_value(OFFSET_PROPERTY)
            .and_then(css_pixels)
            .unwrap_or_default();
        self.root.set_margin_top(offset);
        self.root.set_margin_bottom(offset);
        self.root.set_margin_start(offset);
        self.root.set_margin_end(offset);
        let gap = view
            .style_value(GAP_PROPERTY)
            .and_then(css_pixels)
            .unwrap_or(LAYOUT_TOKENS.gap);
        self.list.set_spacing(gap);
        self.root
            .update_property(&[gtk4::accessible::Property::Label(&view.aria_label)]);
    }

    fn reconcile_rows(&self, view: &StackView, interacting: bool) {
        let mut rows = self.rows.borrow_mut();
        rows.retain(|row| {
            let keep = view.items.iter().any(|item| row.renders(item));
            if !keep {
                self.list.remove(row.widget());
            }
            keep
        });

        let mut ordered = Vec::with_capacity(view.items.len());
        for item in &view.items {
            let index = match rows.iter().position(|row| row.renders(item)) {
                Some(index) => index,
                None => {
                    let row = ToastRow::new(
                        item,
                        next_class("toastline-toast"),
                        LAYOUT_TOKENS,
                        self.toaster.remover(item.toast.id.clone()),
                    );
                    self.list.append(row.widget());
                    rows.push(row);
                    rows.len() - 1
                }
            };
            rows[index].update(item, view.expanded, interacting);
            ordered.push(rows[index].widget().clone());
        }

        // The front toast sits nearest the screen edge.
        if view.y_position == VerticalEdge::Bottom {
            ordered.reverse();
        }
        let mut previous: Option<GtkBox> = None;
        for widget in ordered {
            self.list.reorder_child_after(&widget, previous.as_ref());
            previous = Some(widget);
        }
    }

    fn apply_css(&self, view: &StackView) {
        let toast_classes = {
            let rows = self.rows.borrow();
            view.items
                .iter()
                .filter_map(|item| {
                    rows.iter()
                        .find(|row| row.renders(item))
                        .map(|row| (row.row_class().to_string(), row_style(item)))
                })
                .collect::<Vec<_>>()
        };
        let css = stack_css(
            &self.stack_class,
            view,
            &toast_classes,
            gtk4::minor_version() >= 16,
        );
        let mut applied = self.applied_css.borrow_mut();
        if *applied != css {
            self.provider.load_from_data(&css);
            *applied = css;
        }
    }

    /// Heights are reported from an idle callback so the report's own state
    /// change never lands in the middle of a render.
    fn schedule_measure(self: &Rc<Self>) {
        if self.measure_pending.replace(true) {
            return;
        }
        let inner = Rc::downgrade(self);
        gtk4::glib::idle_add_local_once(move || {
            let Some(inner) = inner.upgrade() else {
                return;
            };
            inner.measure_pending.set(false);
            let heights = inner
                .rows
                .borrow()
                .iter()
                .filter_map(|row| {
                    row.natural_height(LAYOUT_TOKENS.toast_width)
                        .map(|height| (row.id().clone(), height))
                })
                .collect::<Vec<_>>();
            for (toast_id, height) in heights {
                inner.toaster.report_height(toast_id, height);
            }
        });
    }

    fn focus_within(&self) -> bool {
        self.root
            .root()
            .and_then(|root| root.focus())
            .is_some_and(|focus| focus.is_ancestor(&self.root))
    }
}

fn with_inner(inner: &Weak<Inner>, f: impl FnOnce(&Rc<Inner>)) {
    if let Some(inner) = inner.upgrade() {
        f(&inner);
    }
}

/// GTK rendering of a [`Toaster`]: a landmark box holding the toast list.
///
/// Place [`ToasterWidget::widget`] in an overlay above the window content and
/// call [`ToasterWidget::connect_hotkeys`] on the window.
#[derive(Clone)]
pub struct ToasterWidget {
    inner: Rc<Inner>,
}

impl ToasterWidget {
    pub fn new(toaster: Toaster) -> Self {
        install_runtime_css();

        let stack_class = next_class("toastline-stack");
        let root = GtkBox::builder()
            .orientation(Orientation::Vertical)
            .accessible_role(gtk4::AccessibleRole::Region)
            .build();
        root.add_css_class(TOASTER_CLASS);
        root.add_css_class(&stack_class);
        root.set_visible(false);
        let list = GtkBox::builder()
            .orientation(Orientation::Vertical)
            .spacing(LAYOUT_TOKENS.gap)
            .accessible_role(gtk4::AccessibleRole::List)
            .focusable(true)
            .build();
        root.append(&list);

        let provider = CssProvider::new();
        if !attach_provider(&provider) {
            tracing::warn!("no display available; per-stack styles disabled");
        }

        let inner = Rc::new(Inner {
            toaster,
            root,
            list,
            provider,
            stack_class,
            rows: RefCell::new(Vec::new()),
            applied_classes: RefCell::new(Vec::new()),
            applied_css: RefCell::new(String::new()),
            syncing: Cell::new(false),
            resync: Cell::new(false),
            measure_pending: Cell::new(false),
        });

        {
            let weak = Rc::downgrade(&inner);
            inner.toaster.connect_changed(move |state| {
                with_inner(&weak, |inner| inner.sync(state));
            });
        }
        connect_pointer(&inner);

        inner.toaster.mount();
        match GtkSystemTheme::for_default_display() {
            Some(source) => inner.toaster.follow_system_theme(&source),
            None => tracing::debug!("no gtk settings; system theme not followed"),
        }

        let state = inner.toaster.snapshot();
        inner.sync(&state);
        Self { inner }
    }

    pub fn widget(&self) -> &GtkBox {
        &self.inner.root
    }

    pub fn toaster(&self) -> &Toaster {
        &self.inner.toaster
    }

    /// Routes key presses on `window` to the toaster: the hotkey expands the
    /// stack and moves focus into it; Escape inside the stack collapses it.
    pub fn connect_hotkeys<W: IsA<gtk4::Widget>>(&self, window: &W) {
        let controller = gtk4::EventControllerKey::new();
        controller.set_propagation_phase(gtk4::PropagationPhase::Capture);
        let inner = Rc::downgrade(&self.inner);
        controller.connect_key_pressed(move |_, key, keycode, modifier| {
            let Some(inner) = inner.upgrade() else {
                return gtk4::glib::Propagation::Proceed;
            };
            let Some(press) = key_bridge::key_press(key, keycode, modifier) else {
                return gtk4::glib::Propagation::Proceed;
            };
            if inner.toaster.handle_key_press(&press, inner.focus_within()) {
                inner.list.grab_focus();
                return gtk4::glib::Propagation::Stop;
            }
            gtk4::glib::Propagation::Proceed
        });
        window.add_controller(controller);
    }
}

fn connect_pointer(inner: &Rc<Inner>) {
    let motion = gtk4::EventControllerMotion::new();
    {
        let weak = Rc::downgrade(inner);
        motion.connect_enter(move |_, _, _| {
            with_inner(&weak, |inner| inner.toaster.pointer_entered());
        });
    }
    {
        let weak = Rc::downgrade(inner);
        motion.connect_motion(move |_, _, _| {
            with_inner(&weak, |inner| inner.toaster.pointer_moved());
        });
    }
    {
        let weak = Rc::downgrade(inner);
        motion.connect_leave(move |_| {
            with_inner(&weak, |inner| inner.toaster.pointer_left());
        });
    }
    inner.root.add_controller(motion);

    let click = gtk4::GestureClick::new();
    click.set_button(0);
    click.set_propagation_phase(gtk4::PropagationPhase::Capture);
    {
        let weak = Rc::downgrade(inner);
        click.connect_pressed(move |_, _, _, _| {
            with_inner(&weak, |inner| inner.toaster.pointer_down());
        });
    }
    {
        let weak = Rc::downgrade(inner);
        click.connect_released(move |_, _, _, _| {
            with_inner(&weak, |inner| inner.toaster.pointer_up());
        });
    }
    inner.root.add_controller(click);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ResolvedTheme;
    use crate::toast::{Toast, ToastKind, ToastOptions};
    use crate::toaster::{ToasterAction, ToasterOptions};

    #[test]
    fn stack_classes_follow_view() {
        let mut state = ToasterState::new(false, ResolvedTheme::Dark);
        for id in ["a", "b"] {
            state.apply(ToasterAction::ToastAdded(Toast::from_options(
                id,
                ToastKind::Normal,
                ToastOptions::new().with_id(id),
            )));
        }
        state.apply(ToasterAction::PointerEntered);
        let options = ToasterOptions {
            position: "top-center".parse().expect("position"),
            rich_colors: true,
            class: Some("app-toasts compact".to_string()),
            ..ToasterOptions::default()
        };
        let view = view::render(&state, &options).expect("stack should render");

        assert_eq!(
            stack_classes(&view),
            vec![
                "theme-dark",
                "y-top",
                "x-center",
                "rich-colors",
                "expanded",
                "app-toasts",
                "compact"
            ]
        );
    }

    #[test]
    fn alignment_tracks_screen_edges() {
        assert_eq!(halign_for(HorizontalEdge::Left), Align::Start);
        assert_eq!(halign_for(HorizontalEdge::Center), Align::Center);
        assert_eq!(valign_for(VerticalEdge::Bottom), Align::End);
    }

    #[test]
    fn generated_classes_are_unique() {
        assert_ne!(next_class("toastline-toast"), next_class("toastline-toast"));
    }
}
