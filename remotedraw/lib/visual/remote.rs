use std::{
    fmt,
    sync::{Arc, Weak},
    time::Instant,
};

use parking_lot::Mutex;

use crate::{
    fetch::{FetchCallback, FetchCoordinator, FetchOutcome, FetchRegistration},
    resource::DecodedResource,
    FetchError,
};

use super::{
    BitmapVisual, Canvas, ColorFilter, HostCallback, Insets, Opacity, Rect, ScheduledTask,
    SharedVisualState, Size, Visual, VisualState,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A visual showing a placeholder until its remote resource is available.
///
/// On construction the visual asks the [`FetchCoordinator`] for its resource. A cached resource is
/// displayed right away; otherwise the placeholder stays current until the fetch completes on the
/// presentation context. The visual then swaps in a [`BitmapVisual`] carrying over the
/// placeholder's bounds and the whole [`VisualState`], and asks its host to redraw. The swap
/// happens at most once. A failed fetch leaves the placeholder in place.
///
/// Every configuration call is recorded and forwarded to whichever visual is current.
///
/// Dropping the visual withdraws its interest in a pending fetch.
pub struct RemoteVisual {
    inner: Arc<RemoteInner>,
}

/// Which visual a [`RemoteVisual`] currently wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemotePhase {
    /// The placeholder (or nothing) is shown while the resource is unavailable.
    Placeholder,

    /// The fetched resource is shown. Final.
    Resolved,
}

/// The shareable description of a [`RemoteVisual`]: its identifier and visual state.
///
/// Visuals created from the same description share their visual state until one of them calls
/// [`RemoteVisual::mutate`].
#[derive(Debug, Clone)]
pub struct RemoteVisualState {
    key: String,
    state: SharedVisualState,
}

struct RemoteInner {
    key: String,
    this: Weak<RemoteInner>,
    core: Mutex<RemoteCore>,

    /// Kept outside `core` so the current visual may invalidate itself while `core` is locked.
    host: Mutex<Option<Weak<dyn HostCallback>>>,
}

struct RemoteCore {
    current: Option<Box<dyn Visual>>,
    phase: RemotePhase,
    resource: Option<Arc<DecodedResource>>,
    state: SharedVisualState,

    /// What the current visual has been told so far. Attributes still at their defaults are
    /// never pushed, so a placeholder keeps whatever the host configured on it.
    applied: VisualState,
    mutated: bool,
    bounds: Rect,
    state_set: Vec<i32>,
    level: i32,
    registration: Option<FetchRegistration>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl RemoteVisual {
    /// Creates a visual showing `placeholder` until the resource identified by `key` is fetched.
    pub fn new(
        placeholder: Box<dyn Visual>,
        key: impl Into<String>,
        coordinator: &FetchCoordinator,
    ) -> Self {
        Self::with_state(
            Some(placeholder),
            key.into(),
            SharedVisualState::default(),
            coordinator,
        )
    }

    /// Creates a visual that draws nothing until the resource identified by `key` is fetched.
    pub fn without_placeholder(key: impl Into<String>, coordinator: &FetchCoordinator) -> Self {
        Self::with_state(None, key.into(), SharedVisualState::default(), coordinator)
    }

    fn with_state(
        mut placeholder: Option<Box<dyn Visual>>,
        key: String,
        state: SharedVisualState,
        coordinator: &FetchCoordinator,
    ) -> Self {
        let inner = Arc::new_cyclic(|this: &Weak<RemoteInner>| {
            if let Some(placeholder) = placeholder.as_mut() {
                placeholder.set_host(Some(this.clone() as Weak<dyn HostCallback>));
            }

            RemoteInner {
                key,
                this: this.clone(),
                core: Mutex::new(RemoteCore {
                    current: placeholder,
                    phase: RemotePhase::Placeholder,
                    resource: None,
                    state,
                    applied: VisualState::default(),
                    mutated: false,
                    bounds: Rect::default(),
                    state_set: Vec::new(),
                    level: 0,
                    registration: None,
                }),
                host: Mutex::new(None),
            }
        });

        // A state shared with another visual may already carry changes.
        inner.core.lock().sync_current();

        let callback: Weak<dyn FetchCallback> = Arc::downgrade(&inner) as Weak<dyn FetchCallback>;
        match coordinator.fetch_or_get(&inner.key, callback) {
            FetchOutcome::Ready(resource) => {
                inner.resolve(resource);
            }
            FetchOutcome::Pending(registration) => {
                let mut core = inner.core.lock();
                if core.phase == RemotePhase::Placeholder {
                    core.registration = Some(registration);
                }
            }
        }

        Self { inner }
    }

    /// The resource identifier.
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Installs the host notified when the visual needs a redraw.
    pub fn set_host(&self, host: Option<Weak<dyn HostCallback>>) {
        *self.inner.host.lock() = host;
    }

    /// Which visual is current.
    pub fn phase(&self) -> RemotePhase {
        self.inner.core.lock().phase
    }

    /// Whether the fetched resource is displayed.
    pub fn is_resolved(&self) -> bool {
        self.phase() == RemotePhase::Resolved
    }

    /// The fetched resource, once resolved.
    pub fn resource(&self) -> Option<Arc<DecodedResource>> {
        self.inner.core.lock().resource.clone()
    }

    /// Runs `f` with the current visual, if any.
    pub fn with_current<R>(&self, f: impl FnOnce(Option<&dyn Visual>) -> R) -> R {
        let mut core = self.inner.core.lock();
        core.sync_current();
        f(core.current.as_deref())
    }

    /// Draws the current visual. Draws nothing if there is none.
    ///
    /// Changes made through visuals sharing this visual's state are applied first.
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        let mut core = self.inner.core.lock();
        core.sync_current();
        if let Some(current) = core.current.as_ref() {
            current.draw(canvas);
        }
    }

    /// A copy of the visual state.
    pub fn state(&self) -> VisualState {
        self.inner.core.lock().state.snapshot()
    }

    /// Sets the global alpha.
    pub fn set_alpha(&self, alpha: u8) {
        self.update_state(|s| s.alpha = alpha);
    }

    /// Sets or clears the color filter.
    pub fn set_color_filter(&self, filter: Option<ColorFilter>) {
        self.update_state(|s| s.color_filter = filter);
    }

    /// Enables or disables dithering.
    pub fn set_dither(&self, dither: bool) {
        self.update_state(|s| s.dither = dither);
    }

    /// Enables or disables bitmap filtering.
    pub fn set_filter_bitmap(&self, filter: bool) {
        self.update_state(|s| s.filter_bitmap = filter);
    }

    /// Records the host configuration changes this visual depends on.
    pub fn set_changing_configurations(&self, configurations: u32) {
        self.update_state(|s| s.changing_configurations = configurations);
    }

    /// The host configuration changes this visual depends on.
    pub fn changing_configurations(&self) -> u32 {
        self.state().changing_configurations
    }

    /// The bounds last assigned by the host.
    pub fn bounds(&self) -> Rect {
        self.inner.core.lock().bounds
    }

    /// Records new bounds and applies them to the current visual.
    pub fn set_bounds(&self, bounds: Rect) {
        let mut core = self.inner.core.lock();
        core.bounds = bounds;
        if let Some(current) = core.current.as_mut() {
            current.set_bounds(bounds);
        }
    }

    /// Whether the current visual reacts to the host's state set.
    pub fn is_stateful(&self) -> bool {
        self.inner
            .core
            .lock()
            .current
            .as_ref()
            .is_some_and(|current| current.is_stateful())
    }

    /// Records the host's state set and applies it to the current visual.
    pub fn set_state(&self, state: &[i32]) -> bool {
        let mut core = self.inner.core.lock();
        core.state_set = state.to_vec();
        core.current
            .as_mut()
            .is_some_and(|current| current.set_state(state))
    }

    /// Records a level and applies it to the current visual if it changed.
    pub fn set_level(&self, level: i32) -> bool {
        let mut core = self.inner.core.lock();
        if core.level == level {
            return false;
        }
        core.level = level;
        core.current
            .as_mut()
            .is_some_and(|current| current.set_level(level))
    }

    /// The natural size of the current visual, or [`Size::UNKNOWN`].
    pub fn intrinsic_size(&self) -> Size {
        self.inner
            .core
            .lock()
            .current
            .as_ref()
            .map_or(Size::UNKNOWN, |current| current.intrinsic_size())
    }

    /// The minimum size of the current visual, or [`Size::ZERO`].
    pub fn minimum_size(&self) -> Size {
        self.inner
            .core
            .lock()
            .current
            .as_ref()
            .map_or(Size::ZERO, |current| current.minimum_size())
    }

    /// Always [`Opacity::Transparent`]: the coverage of a resource that has not been fetched yet
    /// cannot be known.
    pub fn opacity(&self) -> Opacity {
        Opacity::Transparent
    }

    /// The padding of the current visual.
    pub fn padding(&self) -> Option<Insets> {
        self.inner
            .core
            .lock()
            .current
            .as_ref()
            .and_then(|current| current.padding())
    }

    /// Detaches a private copy of the visual state so later changes do not affect visuals created
    /// from the same [`RemoteVisualState`]. Only the first call copies.
    pub fn mutate(&self) -> &Self {
        let mut core = self.inner.core.lock();
        if !core.mutated {
            core.state = core.state.detach();
            core.mutated = true;
        }
        self
    }

    /// Whether [`mutate`](Self::mutate) has been called.
    pub fn is_mutated(&self) -> bool {
        self.inner.core.lock().mutated
    }

    /// Returns the shareable description of this visual.
    pub fn constant_state(&self) -> RemoteVisualState {
        RemoteVisualState {
            key: self.inner.key.clone(),
            state: self.inner.core.lock().state.clone(),
        }
    }

    /// Changes the visual state, then forwards whatever the current visual has not seen yet.
    fn update_state(&self, f: impl FnOnce(&mut VisualState)) {
        let mut core = self.inner.core.lock();
        core.state.update(f);
        core.sync_current();
    }
}

impl RemoteVisualState {
    /// The resource identifier.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The host configuration changes the state depends on.
    pub fn changing_configurations(&self) -> u32 {
        self.state.snapshot().changing_configurations
    }

    /// Creates another visual for the same resource, sharing this visual state.
    pub fn new_visual(
        &self,
        placeholder: Box<dyn Visual>,
        coordinator: &FetchCoordinator,
    ) -> RemoteVisual {
        RemoteVisual::with_state(
            Some(placeholder),
            self.key.clone(),
            self.state.clone(),
            coordinator,
        )
    }
}

impl RemoteCore {
    /// Brings the current visual up to date with the visual state, forwarding only the
    /// attributes that differ from what it last received.
    fn sync_current(&mut self) {
        let state = self.state.snapshot();
        if let Some(current) = self.current.as_mut() {
            let applied = &self.applied;
            if state.alpha != applied.alpha {
                current.set_alpha(state.alpha);
            }
            if state.color_filter != applied.color_filter {
                current.set_color_filter(state.color_filter);
            }
            if state.dither != applied.dither {
                current.set_dither(state.dither);
            }
            if state.filter_bitmap != applied.filter_bitmap {
                current.set_filter_bitmap(state.filter_bitmap);
            }
        }
        self.applied = state;
    }
}

impl RemoteInner {
    /// Swaps the current visual for `resource`. Returns `false` if already resolved.
    fn resolve(&self, resource: Arc<DecodedResource>) -> bool {
        let registration = {
            let mut core = self.core.lock();
            if core.phase == RemotePhase::Resolved {
                return false;
            }

            let bounds = core
                .current
                .as_ref()
                .map_or(core.bounds, |current| current.bounds());

            let mut visual: Box<dyn Visual> = Box::new(BitmapVisual::new(resource.clone()));
            visual.set_bounds(bounds);
            let state = core.state.snapshot();
            state.apply_to(visual.as_mut());
            if !core.state_set.is_empty() {
                visual.set_state(&core.state_set);
            }
            if core.level != 0 {
                visual.set_level(core.level);
            }
            visual.set_host(Some(self.this.clone() as Weak<dyn HostCallback>));

            if let Some(mut previous) = core.current.replace(visual) {
                previous.set_host(None);
            }
            core.applied = state;
            core.resource = Some(resource);
            core.phase = RemotePhase::Resolved;
            core.registration.take()
        };

        // Unregistering locks the coordinator; do it outside our own lock.
        drop(registration);
        true
    }

    fn host(&self) -> Option<Arc<dyn HostCallback>> {
        let host = self.host.lock().clone();
        host.and_then(|host| host.upgrade())
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl FetchCallback for RemoteInner {
    fn on_loaded(&self, key: &str, resource: Arc<DecodedResource>) {
        if !self.resolve(resource) {
            tracing::trace!("ignoring repeated completion for {key}");
            return;
        }

        tracing::debug!("remote visual resolved: {key}");
        if let Some(host) = self.host() {
            host.invalidate_visual();
        }
    }

    fn on_failed(&self, key: &str, error: &FetchError) {
        tracing::debug!("remote visual keeps its placeholder for {key}: {error}");
        let registration = self.core.lock().registration.take();
        drop(registration);
    }
}

impl HostCallback for RemoteInner {
    fn invalidate_visual(&self) {
        if let Some(host) = self.host() {
            host.invalidate_visual();
        }
    }

    fn schedule_visual(&self, task: ScheduledTask, when: Instant) {
        if let Some(host) = self.host() {
            host.schedule_visual(task, when);
        }
    }

    fn unschedule_visual(&self, task: &ScheduledTask) {
        if let Some(host) = self.host() {
            host.unschedule_visual(task);
        }
    }
}

impl Visual for RemoteVisual {
    fn draw(&self, canvas: &mut dyn Canvas) {
        RemoteVisual::draw(self, canvas);
    }

    fn bounds(&self) -> Rect {
        RemoteVisual::bounds(self)
    }

    fn set_bounds(&mut self, bounds: Rect) {
        RemoteVisual::set_bounds(self, bounds);
    }

    fn opacity(&self) -> Opacity {
        RemoteVisual::opacity(self)
    }

    fn set_alpha(&mut self, alpha: u8) {
        RemoteVisual::set_alpha(self, alpha);
    }

    fn set_color_filter(&mut self, filter: Option<ColorFilter>) {
        RemoteVisual::set_color_filter(self, filter);
    }

    fn set_dither(&mut self, dither: bool) {
        RemoteVisual::set_dither(self, dither);
    }

    fn set_filter_bitmap(&mut self, filter: bool) {
        RemoteVisual::set_filter_bitmap(self, filter);
    }

    fn is_stateful(&self) -> bool {
        RemoteVisual::is_stateful(self)
    }

    fn set_state(&mut self, state: &[i32]) -> bool {
        RemoteVisual::set_state(self, state)
    }

    fn set_level(&mut self, level: i32) -> bool {
        RemoteVisual::set_level(self, level)
    }

    fn intrinsic_size(&self) -> Size {
        RemoteVisual::intrinsic_size(self)
    }

    fn minimum_size(&self) -> Size {
        RemoteVisual::minimum_size(self)
    }

    fn padding(&self) -> Option<Insets> {
        RemoteVisual::padding(self)
    }

    fn set_host(&mut self, host: Option<Weak<dyn HostCallback>>) {
        RemoteVisual::set_host(self, host);
    }
}

impl fmt::Debug for RemoteVisual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.core.lock();
        f.debug_struct("RemoteVisual")
            .field("key", &self.inner.key)
            .field("phase", &core.phase)
            .field("current", &core.current)
            .field("bounds", &core.bounds)
            .finish()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
