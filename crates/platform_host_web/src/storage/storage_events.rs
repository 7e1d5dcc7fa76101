//! Cross-tab change notifications backed by the window `storage` event.

use platform_host::{StorageEvents, StorageListener, StorageSubscription};

#[derive(Debug, Clone, Copy, Default)]
/// Storage-change source fed by the browser's native `storage` event.
///
/// The platform only dispatches this event in tabs other than the one that mutated storage.
pub struct WebStorageEvents;

impl StorageEvents for WebStorageEvents {
    fn subscribe_changes(&self, listener: StorageListener) -> StorageSubscription {
        #[cfg(target_arch = "wasm32")]
        {
            use platform_host::StorageChange;
            use wasm_bindgen::{closure::Closure, JsCast};

            let Some(window) = web_sys::window() else {
                return StorageSubscription::inert();
            };
            let on_storage =
                Closure::<dyn FnMut(web_sys::StorageEvent)>::wrap(Box::new(move |event| {
                    let change = StorageChange {
                        key: event.key(),
                        old_value: event.old_value(),
                        new_value: event.new_value(),
                    };
                    listener(&change);
                }));
            if window
                .add_event_listener_with_callback("storage", on_storage.as_ref().unchecked_ref())
                .is_err()
            {
                return StorageSubscription::inert();
            }
            StorageSubscription::new(move || {
                let _ = window.remove_event_listener_with_callback(
                    "storage",
                    on_storage.as_ref().unchecked_ref(),
                );
                drop(on_storage);
            })
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = listener;
            StorageSubscription::inert()
        }
    }
}
