//! Transient notices (toasts) raised by hooks.

use std::time::Duration;

use leptos::*;
use platform_host::StorageError;

use crate::CatalogContext;

/// How long a notice stays visible.
pub const NOTICE_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Notice styling.
pub enum NoticeKind {
    /// Confirmation.
    Success,
    /// Something the user asked for did not happen.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One transient message.
pub struct Notice {
    /// Sequence number; a newer notice replaces an older one.
    pub id: u64,
    /// Styling.
    pub kind: NoticeKind,
    /// Text shown to the user.
    pub message: String,
}

/// Message for a wishlist change that could not be saved.
pub fn storage_notice(err: &StorageError) -> String {
    match err {
        StorageError::QuotaExceeded(_) => {
            "Browser storage is full. Your wishlist was not changed.".to_string()
        }
        StorageError::Unavailable(_) => {
            "Browser storage is unavailable. Your wishlist was not changed.".to_string()
        }
        _ => "Your wishlist could not be saved.".to_string(),
    }
}

impl CatalogContext {
    /// Shows `message` for [`NOTICE_DURATION`], replacing any current notice.
    pub fn notify(&self, kind: NoticeKind, message: impl Into<String>) {
        let id = self
            .notice
            .with_untracked(|current| current.as_ref().map_or(1, |notice| notice.id + 1));
        self.notice.set(Some(Notice {
            id,
            kind,
            message: message.into(),
        }));

        // Native builds have no timer host; the notice stays until replaced.
        #[cfg(target_arch = "wasm32")]
        {
            let notice = self.notice;
            let dismiss = move || {
                if notice.with_untracked(|current| current.as_ref().is_some_and(|n| n.id == id)) {
                    notice.set(None);
                }
            };
            if let Err(err) = set_timeout_with_handle(dismiss, NOTICE_DURATION) {
                logging::warn!("notice dismiss timer failed: {err:?}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use catalog_api::{CatalogConfig, MemoryTransport};
    use platform_host::MemoryOrigin;
    use platform_host_web::HostStorage;

    use super::*;

    #[test]
    fn newer_notice_replaces_older() {
        let runtime = create_runtime();
        let context = CatalogContext::new(
            HostStorage::memory(MemoryOrigin::default().open_tab()),
            CatalogConfig::default(),
            Rc::new(MemoryTransport::default()),
        );
        context.notify(NoticeKind::Success, "saved");
        context.notify(NoticeKind::Error, "failed");

        let shown = context.notice.get_untracked().expect("notice");
        assert_eq!(shown.id, 2);
        assert_eq!(shown.kind, NoticeKind::Error);
        assert_eq!(shown.message, "failed");
        runtime.dispose();
    }

    #[test]
    fn storage_failures_have_user_facing_text() {
        assert!(storage_notice(&StorageError::QuotaExceeded("full".into())).contains("full"));
        assert!(
            storage_notice(&StorageError::Unavailable("private mode".into()))
                .contains("unavailable")
        );
        assert_eq!(
            storage_notice(&StorageError::Backend("boom".into())),
            "Your wishlist could not be saved."
        );
    }
}
