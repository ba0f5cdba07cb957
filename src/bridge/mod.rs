//! Imperative toast API and the in-process bus that carries its events.
//!
//! Any code on the UI thread can call [`notify`] or [`dismiss`] without holding
//! a reference to a mounted toaster. Calls publish on the document bus, which
//! delivers synchronously to whoever is subscribed. With nobody subscribed the
//! event is dropped.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::toast::{Toast, ToastId, ToastKind, ToastOptions};

pub const CREATED_CHANNEL: &str = "toastline:add-toast";
pub const DISMISSED_CHANNEL: &str = "toastline:remove-toast";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Created,
    Dismissed,
}

impl Channel {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Created => CREATED_CHANNEL,
            Self::Dismissed => DISMISSED_CHANNEL,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToastEvent {
    Created(Toast),
    Dismissed(ToastId),
}

impl ToastEvent {
    pub fn channel(&self) -> Channel {
        match self {
            Self::Created(_) => Channel::Created,
            Self::Dismissed(_) => Channel::Dismissed,
        }
    }
}

type Handler = Rc<dyn Fn(&ToastEvent)>;

struct Listener {
    key: u64,
    channel: Channel,
    handler: Handler,
}

#[derive(Default)]
struct BusInner {
    listeners: RefCell<Vec<Listener>>,
    next_key: Cell<u64>,
}

/// Typed publish/subscribe bus for toast creation and removal.
///
/// Cloning yields another handle to the same bus.
#[derive(Clone, Default)]
pub struct ToastBus {
    inner: Rc<BusInner>,
}

impl ToastBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bus shared by everything on the current (UI) thread.
    pub fn document() -> Self {
        thread_local! {
            static DOCUMENT_BUS: ToastBus = ToastBus::new();
        }
        DOCUMENT_BUS.with(Clone::clone)
    }

    pub fn subscribe<F>(&self, channel: Channel, handler: F) -> Subscription
    where
        F: Fn(&ToastEvent) + 'static,
    {
        let key = self.inner.next_key.get();
        self.inner.next_key.set(key.wrapping_add(1));
        self.inner.listeners.borrow_mut().push(Listener {
            key,
            channel,
            handler: Rc::new(handler),
        });
        tracing::debug!(channel = channel.name(), key, "toast bus listener attached");

        Subscription {
            bus: Rc::downgrade(&self.inner),
            key,
            channel,
        }
    }

    pub fn subscribe_created<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&Toast) + 'static,
    {
        self.subscribe(Channel::Created, move |event| {
            if let ToastEvent::Created(toast) = event {
                handler(toast);
            }
        })
    }

    pub fn subscribe_dismissed<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&ToastId) + 'static,
    {
        self.subscribe(Channel::Dismissed, move |event| {
            if let ToastEvent::Dismissed(id) = event {
                handler(id);
            }
        })
    }

    /// Delivers `event` to every listener on its channel, in attach order.
    ///
    /// Returns how many listeners received it. Handlers may publish or
    /// (un)subscribe while being called; such changes apply from the next
    /// publish on.
    pub fn publish(&self, event: ToastEvent) -> usize {
        let channel = event.channel();
        let handlers = self
            .inner
            .listeners
            .borrow()
            .iter()
            .filter(|listener| listener.channel == channel)
            .map(|listener| listener.handler.clone())
            .collect::<Vec<_>>();

        if handlers.is_empty() {
            tracing::trace!(channel = channel.name(), "no toast listener; event dropped");
            return 0;
        }

        for handler in &handlers {
            handler(&event);
        }
        handlers.len()
    }

    pub fn subscriber_count(&self, channel: Channel) -> usize {
        self.inner
            .listeners
            .borrow()
            .iter()
            .filter(|listener| listener.channel == channel)
            .count()
    }
}

impl fmt::Debug for ToastBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastBus")
            .field("created", &self.subscriber_count(Channel::Created))
            .field("dismissed", &self.subscriber_count(Channel::Dismissed))
            .finish()
    }
}

/// Keeps a listener attached; dropping it detaches the listener.
#[must_use = "dropping a Subscription detaches its listener"]
pub struct Subscription {
    bus: Weak<BusInner>,
    key: u64,
    channel: Channel,
}

impl Subscription {
    pub fn channel(&self) -> Channel {
        self.channel
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .field("channel", &self.channel)
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(bus) = self.bus.upgrade() else {
            return;
        };
        // A handler being dropped here may hold the last reference to another
        // subscription; let the borrow end before those destructors run.
        let removed = {
            let mut listeners = bus.listeners.borrow_mut();
            listeners
                .iter()
                .position(|listener| listener.key == self.key)
                .map(|index| listeners.remove(index))
        };
        if removed.is_some() {
            tracing::debug!(
                channel = self.channel.name(),
                key = self.key,
                "toast bus listener detached"
            );
        }
        drop(removed);
    }
}

/// The imperative toast API bound to one bus.
#[derive(Debug, Clone, Default)]
pub struct Toasts {
    bus: ToastBus,
}

impl Toasts {
    pub fn new(bus: ToastBus) -> Self {
        Self { bus }
    }

    pub fn document() -> Self {
        Self::new(ToastBus::document())
    }

    pub fn bus(&self) -> &ToastBus {
        &self.bus
    }

    pub fn notify(
        &self,
        title: impl Into<String>,
        options: impl Into<Option<ToastOptions>>,
    ) -> ToastId {
        self.create(title.into(), ToastKind::Normal, options.into())
    }

    pub fn notify_success(
        &self,
        title: impl Into<String>,
        options: impl Into<Option<ToastOptions>>,
    ) -> ToastId {
        self.create(title.into(), ToastKind::Success, options.into())
    }

    pub fn notify_error(
        &self,
        title: impl Into<String>,
        options: impl Into<Option<ToastOptions>>,
    ) -> ToastId {
        self.create(title.into(), ToastKind::Error, options.into())
    }

    /// Asks the toaster to start removing `id`. Unknown ids are ignored.
    pub fn dismiss(&self, id: impl Into<ToastId>) {
        let id = id.into();
        tracing::debug!(%id, "dismiss toast");
        self.bus.publish(ToastEvent::Dismissed(id));
    }

    fn create(&self, title: String, kind: ToastKind, options: Option<ToastOptions>) -> ToastId {
        let toast = Toast::from_options(title, kind, options.unwrap_or_default());
        let id = toast.id.clone();
        tracing::debug!(%id, kind = kind.as_str(), "publish toast");
        self.bus.publish(ToastEvent::Created(toast));
        id
    }
}

pub fn notify(title: impl Into<String>, options: impl Into<Option<ToastOptions>>) -> ToastId {
    Toasts::document().notify(title, options)
}

pub fn notify_success(
    title: impl Into<String>,
    options: impl Into<Option<ToastOptions>>,
) -> ToastId {
    Toasts::document().notify_success(title, options)
}

pub fn notify_error(
    title: impl Into<String>,
    options: impl Into<Option<ToastOptions>>,
) -> ToastId {
    Toasts::document().notify_error(title, options)
}

pub fn dismiss(id: impl Into<ToastId>) {
    Toasts::document().dismiss(id);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(bus: &ToastBus) -> (Rc<RefCell<Vec<ToastEvent>>>, Subscription, Subscription) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let created = {
            let events = events.clone();
            bus.subscribe(Channel::Created, move |event| {
                events.borrow_mut().push(event.clone())
            })
        };
        let dismissed = {
            let events = events.clone();
            bus.subscribe(Channel::Dismissed, move |event| {
                events.borrow_mut().push(event.clone())
            })
        };
        (events, created, dismissed)
    }

    #[test]
    fn notify_variants_publish_one_event_with_their_kind() {
        let bus = ToastBus::new();
        let (events, _created, _dismissed) = recorder(&bus);
        let toasts = Toasts::new(bus);

        let normal = toasts.notify("Saved", None);
        let success = toasts.notify_success("Done", ToastOptions::new().with_id("x"));
        let error = toasts.notify_error("Failed", None);

        assert_eq!(success, ToastId::from("x"));
        let events = events.borrow();
        assert_eq!(events.len(), 3);
        let kinds = events
            .iter()
            .map(|event| match event {
                ToastEvent::Created(toast) => (toast.id.clone(), toast.kind),
                other => panic!("unexpected event {other:?}"),
            })
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                (normal, ToastKind::Normal),
                (success, ToastKind::Success),
                (error, ToastKind::Error),
            ]
        );
    }

    #[test]
    fn dismiss_publishes_bare_id_on_removal_channel() {
        let bus = ToastBus::new();
        let (events, _created, _dismissed) = recorder(&bus);

        Toasts::new(bus).dismiss("x");

        assert_eq!(
            *events.borrow(),
            vec![ToastEvent::Dismissed(ToastId::from("x"))]
        );
    }

    #[test]
    fn publish_without_listeners_is_silent() {
        let bus = ToastBus::new();
        let toasts = Toasts::new(bus.clone());

        let id = toasts.notify("Nobody listens", None);
        toasts.dismiss(id.clone());

        assert!(!id.as_str().is_empty());
        assert_eq!(
            bus.publish(ToastEvent::Dismissed(ToastId::from("gone"))),
            0
        );
    }

    #[test]
    fn dropping_subscription_detaches_listener() {
        let bus = ToastBus::new();
        let (events, created, dismissed) = recorder(&bus);
        assert_eq!(bus.subscriber_count(Channel::Created), 1);

        drop(created);
        drop(dismissed);
        Toasts::new(bus.clone()).notify("Late", None);

        assert!(events.borrow().is_empty());
        assert_eq!(bus.subscriber_count(Channel::Created), 0);
        assert_eq!(bus.subscriber_count(Channel::Dismissed), 0);
    }

    #[test]
    fn delivery_follows_attach_order() {
        let bus = ToastBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let first = {
            let order = order.clone();
            bus.subscribe_created(move |_| order.borrow_mut().push("first"))
        };
        let second = {
            let order = order.clone();
            bus.subscribe_created(move |_| order.borrow_mut().push("second"))
        };

        let delivered = bus.publish(ToastEvent::Created(Toast::from_options(
            "Ordered",
            ToastKind::Normal,
            ToastOptions::new(),
        )));

        assert_eq!(delivered, 2);
        assert_eq!(*order.borrow(), vec!["first", "second"]);
        drop((first, second));
    }

    #[test]
    fn handler_may_publish_reentrantly() {
        let bus = ToastBus::new();
        let dismissed = Rc::new(RefCell::new(Vec::new()));
        let _on_dismiss = {
            let dismissed = dismissed.clone();
            bus.subscribe_dismissed(move |id| dismissed.borrow_mut().push(id.clone()))
        };
        let _on_create = {
            let toasts = Toasts::new(bus.clone());
            bus.subscribe_created(move |toast| toasts.dismiss(toast.id.clone()))
        };

        let id = Toasts::new(bus.clone()).notify("Bounce", ToastOptions::new().with_id("b"));

        assert_eq!(*dismissed.borrow(), vec![id]);
    }

    #[test]
    fn document_bus_is_shared_within_a_thread() {
        let received = Rc::new(RefCell::new(Vec::new()));
        let _subscription = {
            let received = received.clone();
            ToastBus::document().subscribe_created(move |toast| {
                received.borrow_mut().push(toast.title.clone())
            })
        };

        notify("From anywhere", None);
        notify_success("Also here", None);

        assert_eq!(
            *received.borrow(),
            vec!["From anywhere".to_string(), "Also here".to_string()]
        );
    }

    #[test]
    fn channel_names_are_distinct() {
        assert_ne!(Channel::Created.name(), Channel::Dismissed.name());
    }
}
