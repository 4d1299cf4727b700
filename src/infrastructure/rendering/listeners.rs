use leptos::ev::EventDescriptor;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{AddEventListenerOptions, Event, EventTarget};

use crate::domain::errors::{AppError, RenderingResult};

#[derive(Clone, Debug)]
pub struct EventOptions {
    pub passive: bool,
    pub capture: bool,
}

impl Default for EventOptions {
    fn default() -> Self {
        Self { passive: true, capture: false }
    }
}

impl EventOptions {
    /// For handlers that call `prevent_default` (wheel and pinch zoom).
    pub fn active() -> Self {
        Self { passive: false, capture: false }
    }
}

/// A DOM listener that is detached when the handle is removed or dropped.
pub struct EventListenerHandle {
    target: EventTarget,
    event_name: String,
    callback: Closure<dyn FnMut(Event)>,
    capture: bool,
    attached: bool,
}

impl EventListenerHandle {
    pub fn remove(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;
        let _ = self.target.remove_event_listener_with_callback_and_bool(
            &self.event_name,
            self.callback.as_ref().unchecked_ref(),
            self.capture,
        );
    }
}

impl Drop for EventListenerHandle {
    fn drop(&mut self) {
        self.remove();
    }
}

pub fn listen<E>(
    target: &EventTarget,
    event: E,
    options: &EventOptions,
    mut cb: impl FnMut(E::EventType) + 'static,
) -> RenderingResult<EventListenerHandle>
where
    E: EventDescriptor + 'static,
    E::EventType: JsCast,
{
    let opts = AddEventListenerOptions::new();
    opts.set_passive(options.passive);
    opts.set_capture(options.capture);

    let event_name = event.name().into_owned();
    let callback = Closure::wrap(Box::new(move |ev: Event| {
        cb(ev.unchecked_into::<E::EventType>());
    }) as Box<dyn FnMut(Event)>);

    target
        .add_event_listener_with_callback_and_add_event_listener_options(
            &event_name,
            callback.as_ref().unchecked_ref(),
            &opts,
        )
        .map_err(|e| AppError::Browser(format!("failed to listen for '{event_name}': {e:?}")))?;

    Ok(EventListenerHandle {
        target: target.clone(),
        event_name,
        callback,
        capture: options.capture,
        attached: true,
    })
}
