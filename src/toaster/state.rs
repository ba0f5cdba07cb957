use crate::theme::ResolvedTheme;
use crate::toast::{Toast, ToastId};

/// Rendered height of one toast, reported by the per-toast renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ToastHeight {
    pub toast_id: ToastId,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToasterAction {
    ToastAdded(Toast),
    /// Flag matching toasts for removal; the renderer removes them later.
    DismissRequested(ToastId),
    ToastRemoved(ToastId),
    HeightMeasured { toast_id: ToastId, height: f64 },
    PointerEntered,
    PointerMoved,
    PointerLeft,
    PointerDown,
    PointerUp,
    HotkeyPressed,
    EscapeWithinStack,
    ExpandedSet(bool),
    ThemeResolved(ResolvedTheme),
}

/// State of one mounted toaster. Mutated only through [`ToasterState::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct ToasterState {
    toasts: Vec<Toast>,
    expanded: bool,
    heights: Vec<ToastHeight>,
    interacting: bool,
    theme: ResolvedTheme,
    /// Add counter per live toast; a reused id gets a fresh generation.
    generations: Vec<(ToastId, u64)>,
    next_generation: u64,
}

impl ToasterState {
    pub fn new(expanded: bool, theme: ResolvedTheme) -> Self {
        let mut state = Self {
            toasts: Vec::new(),
            expanded,
            heights: Vec::new(),
            interacting: false,
            theme,
            generations: Vec::new(),
            next_generation: 0,
        };
        state.settle();
        state
    }

    /// Visible toasts, most recent first.
    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn expanded(&self) -> bool {
        self.expanded
    }

    pub fn heights(&self) -> &[ToastHeight] {
        &self.heights
    }

    pub fn interacting(&self) -> bool {
        self.interacting
    }

    pub fn theme(&self) -> ResolvedTheme {
        self.theme
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    /// Which add of `id` is live. Renderers key per-toast state on it.
    pub fn generation(&self, id: &ToastId) -> Option<u64> {
        self.generations
            .iter()
            .find(|(entry, _)| entry == id)
            .map(|(_, generation)| *generation)
    }

    pub fn front_height(&self) -> Option<f64> {
        self.heights.first().map(|entry| entry.height)
    }

    /// Applies one transition and recomputes derived fields.
    ///
    /// Returns whether anything observable changed.
    pub fn apply(&mut self, action: ToasterAction) -> bool {
        tracing::trace!(?action, "toaster transition");
        let flags_before = (self.expanded, self.interacting, self.theme);
        let list_changed = match action {
            ToasterAction::ToastAdded(toast) => {
                self.add(toast);
                true
            }
            ToasterAction::DismissRequested(id) => self.flag_dismissed(&id),
            ToasterAction::ToastRemoved(id) => self.remove(&id),
            ToasterAction::HeightMeasured { toast_id, height } => {
                self.record_height(toast_id, height)
            }
            ToasterAction::PointerEntered
            | ToasterAction::PointerMoved
            | ToasterAction::HotkeyPressed => {
                self.expanded = true;
                false
            }
            ToasterAction::PointerLeft => {
                if !self.interacting {
                    self.expanded = false;
                }
                false
            }
            ToasterAction::PointerDown => {
                self.interacting = true;
                false
            }
            ToasterAction::PointerUp => {
                self.interacting = false;
                false
            }
            ToasterAction::EscapeWithinStack => {
                self.expanded = false;
                false
            }
            ToasterAction::ExpandedSet(expanded) => {
                self.expanded = expanded;
                false
            }
            ToasterAction::ThemeResolved(theme) => {
                self.theme = theme;
                false
            }
        };

        self.settle();
        list_changed || flags_before != (self.expanded, self.interacting, self.theme)
    }

    fn settle(&mut self) {
        if self.toasts.len() <= 1 {
            self.expanded = false;
        }
    }

    fn add(&mut self, toast: Toast) {
        if self.toasts.iter().any(|existing| existing.id == toast.id) {
            tracing::debug!(id = %toast.id, "toast id reused; replacing previous toast");
            self.toasts.retain(|existing| existing.id != toast.id);
            self.heights.retain(|entry| entry.toast_id != toast.id);
            self.generations.retain(|(entry, _)| entry != &toast.id);
        }
        self.generations
            .push((toast.id.clone(), self.next_generation));
        self.next_generation = self.next_generation.wrapping_add(1);
        self.toasts.insert(0, toast);
        self.sort_heights();
    }

    fn flag_dismissed(&mut self, id: &ToastId) -> bool {
        let mut changed = false;
        self.toasts = self
            .toasts
            .iter()
            .map(|toast| {
                if &toast.id == id && !toast.is_dismissed() {
                    changed = true;
                    toast.dismissed()
                } else {
                    toast.clone()
                }
            })
            .collect();
        if !changed {
            tracing::trace!(%id, "dismiss requested for unknown or already dismissed toast");
        }
        changed
    }

    fn remove(&mut self, id: &ToastId) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| &toast.id != id);
        self.heights.retain(|entry| &entry.toast_id != id);
        self.generations.retain(|(entry, _)| entry != id);
        before != self.toasts.len()
    }

    fn record_height(&mut self, toast_id: ToastId, height: f64) -> bool {
        if !self.toasts.iter().any(|toast| toast.id == toast_id) {
            return false;
        }
        match self
            .heights
            .iter_mut()
            .find(|entry| entry.toast_id == toast_id)
        {
            Some(entry) if entry.height == height => return false,
            Some(entry) => entry.height = height,
            None => self.heights.push(ToastHeight { toast_id, height }),
        }
        self.sort_heights();
        true
    }

    /// Keeps `heights` in the same order as `toasts`, so index 0 is the front.
    fn sort_heights(&mut self) {
        let toasts = &self.toasts;
        self.heights.sort_by_key(|entry| {
            toasts
                .iter()
                .position(|toast| toast.id == entry.toast_id)
                .unwrap_or(usize::MAX)
        });
    }
}
