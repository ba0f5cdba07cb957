//! The toaster: owns the live toast list and everything derived from it.
//!
//! A [`Toaster`] listens on a [`ToastBus`] for created and dismissed toasts,
//! folds every UI event into [`ToasterState`] through a single reducer and
//! describes the result with [`view::render`]. It knows nothing about widgets;
//! the GTK layer in `crate::ui` feeds it input and draws its view.

pub mod options;
pub mod state;
pub mod view;

use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::bridge::{Subscription, ToastBus};
use crate::input::KeyPress;
use crate::theme::{SystemThemeSource, ThemeMode, ThemeWatch};
use crate::toast::ToastId;

pub use options::{
    HorizontalEdge, Offset, Position, PositionError, ToastStyleOptions, ToasterOptions,
    VerticalEdge,
};
pub use state::{ToastHeight, ToasterAction, ToasterState};
pub use view::{StackView, ToastItemView};

type Observer = Rc<dyn Fn(&ToasterState)>;

struct Core {
    state: RefCell<ToasterState>,
    observers: RefCell<Vec<Observer>>,
}

impl Core {
    fn dispatch(&self, action: ToasterAction) -> bool {
        let changed = self.state.borrow_mut().apply(action);
        if changed {
            self.notify_observers();
        }
        changed
    }

    fn notify_observers(&self) {
        let observers = self.observers.borrow().clone();
        if observers.is_empty() {
            return;
        }
        let snapshot = self.state.borrow().clone();
        for observer in observers {
            observer(&snapshot);
        }
    }
}

/// Bus subscriptions and the system theme watch, each attached at most once.
#[derive(Default)]
struct Links {
    created: OnceCell<Subscription>,
    dismissed: OnceCell<Subscription>,
    system_theme: OnceCell<ThemeWatch>,
}

/// Handle to one mounted toaster. Clones share the same state; listeners are
/// released when the last clone is dropped.
#[derive(Clone)]
pub struct Toaster {
    options: Rc<ToasterOptions>,
    bus: ToastBus,
    core: Rc<Core>,
    links: Rc<Links>,
}

impl Toaster {
    pub fn new(options: ToasterOptions, bus: ToastBus) -> Self {
        let theme = options.theme.fixed().unwrap_or_default();
        let state = ToasterState::new(options.expand, theme);
        Self {
            options: Rc::new(options),
            bus,
            core: Rc::new(Core {
                state: RefCell::new(state),
                observers: RefCell::new(Vec::new()),
            }),
            links: Rc::new(Links::default()),
        }
    }

    /// Toaster listening on the thread's document bus.
    pub fn on_document(options: ToasterOptions) -> Self {
        Self::new(options, ToastBus::document())
    }

    pub fn options(&self) -> &ToasterOptions {
        &self.options
    }

    /// Attaches the creation and removal listeners. Calling this again, from
    /// any clone, attaches nothing new.
    pub fn mount(&self) {
        self.links.created.get_or_init(|| {
            let core = Rc::downgrade(&self.core);
            self.bus.subscribe_created(move |toast| {
                with_core(&core, |core| {
                    core.dispatch(ToasterAction::ToastAdded(toast.clone()));
                });
            })
        });
        self.links.dismissed.get_or_init(|| {
            let core = Rc::downgrade(&self.core);
            self.bus.subscribe_dismissed(move |id| {
                with_core(&core, |core| {
                    core.dispatch(ToasterAction::DismissRequested(id.clone()));
                });
            })
        });
        tracing::debug!("toaster mounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.links.created.get().is_some() && self.links.dismissed.get().is_some()
    }

    /// Keeps the theme in sync with the desktop preference when the options
    /// ask for the system theme. Only the first call has an effect.
    pub fn follow_system_theme(&self, source: &dyn SystemThemeSource) {
        if self.options.theme != ThemeMode::System {
            return;
        }
        self.links.system_theme.get_or_init(|| {
            let current = source.current();
            tracing::debug!(theme = current.as_str(), "following system theme");
            self.core.dispatch(ToasterAction::ThemeResolved(current));

            let core = Rc::downgrade(&self.core);
            source.watch(Box::new(move |theme| {
                with_core(&core, |core| {
                    tracing::debug!(theme = theme.as_str(), "system theme changed");
                    core.dispatch(ToasterAction::ThemeResolved(theme));
                });
            }))
        });
    }

    /// Registers a callback run with the new state after every change.
    pub fn connect_changed<F>(&self, observer: F)
    where
        F: Fn(&ToasterState) + 'static,
    {
        self.core.observers.borrow_mut().push(Rc::new(observer));
    }

    pub fn dispatch(&self, action: ToasterAction) -> bool {
        self.core.dispatch(action)
    }

    pub fn snapshot(&self) -> ToasterState {
        self.core.state.borrow().clone()
    }

    pub fn view(&self) -> Option<StackView> {
        view::render(&self.core.state.borrow(), &self.options)
    }

    /// Handles a document-level key press.
    ///
    /// Returns `true` when the hotkey matched and the stack should take focus.
    pub fn handle_key_press(&self, press: &KeyPress, focus_within_stack: bool) -> bool {
        let hotkey_pressed = self.options.hotkey.is_pressed(press);
        if hotkey_pressed {
            self.dispatch(ToasterAction::HotkeyPressed);
        }
        if press.is_escape() && focus_within_stack {
            self.dispatch(ToasterAction::EscapeWithinStack);
        }
        hotkey_pressed
    }

    pub fn pointer_entered(&self) {
        self.dispatch(ToasterAction::PointerEntered);
    }

    pub fn pointer_moved(&self) {
        self.dispatch(ToasterAction::PointerMoved);
    }

    pub fn pointer_left(&self) {
        self.dispatch(ToasterAction::PointerLeft);
    }

    pub fn pointer_down(&self) {
        self.dispatch(ToasterAction::PointerDown);
    }

    pub fn pointer_up(&self) {
        self.dispatch(ToasterAction::PointerUp);
    }

    pub fn set_expanded(&self, expanded: bool) {
        self.dispatch(ToasterAction::ExpandedSet(expanded));
    }

    pub fn report_height(&self, toast_id: ToastId, height: f64) {
        self.dispatch(ToasterAction::HeightMeasured { toast_id, height });
    }

    pub fn remove_toast(&self, id: &ToastId) {
        tracing::debug!(%id, "remove toast");
        self.dispatch(ToasterAction::ToastRemoved(id.clone()));
    }

    /// Removal callback handed to the renderer of toast `id`.
    ///
    /// The callback does not keep the toaster alive.
    pub fn remover(&self, id: ToastId) -> impl Fn() + 'static {
        let core = Rc::downgrade(&self.core);
        move || {
            with_core(&core, |core| {
                core.dispatch(ToasterAction::ToastRemoved(id.clone()));
            });
        }
    }
}

impl fmt::Debug for Toaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toaster")
            .field("options", &self.options)
            .field("state", &self.core.state.borrow())
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

fn with_core(core: &Weak<Core>, f: impl FnOnce(&Core)) {
    if let Some(core) = core.upgrade() {
        f(&core);
    }
}
