//! User-facing notifications.

use std::cell::{Cell, RefCell};

use chrono::{DateTime, Utc};
use derive_more::Display;
use futures::{stream::LocalBoxStream, StreamExt as _};
use medea_reactive::collections::ObservableHashMap;

use crate::utils::CallError;

/// ID of a [`Notification`].
///
/// IDs are issued in ascending order, so ordering by ID is ordering by
/// creation.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display(fmt = "notification-{}", _0)]
pub struct NotificationId(u64);

/// Severity of a [`Notification`].
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum NotificationLevel {
    /// Something the user might want to know.
    #[display(fmt = "info")]
    Info,

    /// Something went not as expected, but the call goes on.
    #[display(fmt = "warning")]
    Warning,

    /// Some user action failed.
    #[display(fmt = "error")]
    Error,
}

/// Transient message shown to the user until dismissed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notification {
    /// ID of this [`Notification`].
    pub id: NotificationId,

    /// Severity of this [`Notification`].
    pub level: NotificationLevel,

    /// Text of this [`Notification`].
    pub message: String,

    /// Time this [`Notification`] was raised at.
    pub created_at: DateTime<Utc>,
}

/// Registry of the not yet dismissed [`Notification`]s.
///
/// Notifications never expire here: each one lives until dismissed.
#[derive(Default)]
pub struct Notifications {
    /// Value of the next issued [`NotificationId`].
    next_id: Cell<u64>,

    /// Alive notifications.
    entries: RefCell<ObservableHashMap<NotificationId, Notification>>,
}

impl Notifications {
    /// Creates a new empty [`Notifications`] registry.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises a new [`Notification`] returning its ID.
    pub fn notify<M: Into<String>>(
        &self,
        level: NotificationLevel,
        message: M,
    ) -> NotificationId {
        let id = NotificationId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        let notification = Notification {
            id,
            level,
            message: message.into(),
            created_at: Utc::now(),
        };
        log::debug!("Raising {} {}: {}", level, id, notification.message);
        self.entries.borrow_mut().insert(id, notification);
        id
    }

    /// Raises a new [`NotificationLevel::Info`] [`Notification`].
    #[inline]
    pub fn info<M: Into<String>>(&self, message: M) -> NotificationId {
        self.notify(NotificationLevel::Info, message)
    }

    /// Raises a new [`NotificationLevel::Warning`] [`Notification`].
    #[inline]
    pub fn warning<M: Into<String>>(&self, message: M) -> NotificationId {
        self.notify(NotificationLevel::Warning, message)
    }

    /// Raises a new [`NotificationLevel::Error`] [`Notification`].
    #[inline]
    pub fn error<M: Into<String>>(&self, message: M) -> NotificationId {
        self.notify(NotificationLevel::Error, message)
    }

    /// Raises a new [`NotificationLevel::Error`] [`Notification`] describing
    /// the provided [`CallError`].
    pub fn report(&self, err: &CallError) -> NotificationId {
        self.error(format!("{}: {}", err.name(), err.message()))
    }

    /// Dismisses the [`Notification`] with the provided `id`.
    ///
    /// Returns the dismissed [`Notification`], or [`None`] if there was no
    /// such one.
    pub fn dismiss(&self, id: NotificationId) -> Option<Notification> {
        self.entries.borrow_mut().remove(&id)
    }

    /// Returns the [`Notification`] with the provided `id`, if any.
    #[inline]
    pub fn get(&self, id: NotificationId) -> Option<Notification> {
        self.entries.borrow().get(&id).cloned()
    }

    /// Returns snapshot of all the alive [`Notification`]s, oldest first.
    pub fn all(&self) -> Vec<Notification> {
        let mut all: Vec<_> = self.entries.borrow().values().cloned().collect();
        all.sort_by_key(|n| n.id);
        all
    }

    /// Returns count of the alive [`Notification`]s.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.borrow().iter().count()
    }

    /// Indicates whether there are no alive [`Notification`]s.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().iter().next().is_none()
    }

    /// Returns [`LocalBoxStream`] of the raised [`Notification`]s.
    pub fn on_raise(&self) -> LocalBoxStream<'static, Notification> {
        self.entries
            .borrow()
            .on_insert()
            .map(|(_, notification)| notification)
            .boxed_local()
    }

    /// Returns [`LocalBoxStream`] of the dismissed [`Notification`]s.
    pub fn on_dismiss(&self) -> LocalBoxStream<'static, Notification> {
        self.entries
            .borrow()
            .on_remove()
            .map(|(_, notification)| notification)
            .boxed_local()
    }
}

#[cfg(test)]
mod spec {
    use futures::{executor::block_on, StreamExt as _};

    use super::*;

    fn messages(notifications: &Notifications) -> Vec<String> {
        notifications.all().into_iter().map(|n| n.message).collect()
    }

    #[test]
    fn issues_unique_ids() {
        let notifications = Notifications::new();

        let first = notifications.info("first");
        let second = notifications.info("first");

        assert_ne!(first, second);
        assert_eq!(notifications.len(), 2);
    }

    #[test]
    fn dismisses_exactly_one_keeping_order() {
        let notifications = Notifications::new();
        notifications.info("one");
        let two = notifications.warning("two");
        notifications.error("three");

        let dismissed = notifications.dismiss(two).unwrap();

        assert_eq!(dismissed.message, "two");
        assert_eq!(dismissed.level, NotificationLevel::Warning);
        assert_eq!(messages(&notifications), vec!["one", "three"]);
    }

    #[test]
    fn dismissing_absent_id_is_noop() {
        let notifications = Notifications::new();
        let id = notifications.info("once");

        assert!(notifications.dismiss(id).is_some());
        assert!(notifications.dismiss(id).is_none());
        assert!(notifications.is_empty());
    }

    #[test]
    fn emits_raised_and_dismissed() {
        let notifications = Notifications::new();
        let mut raised = notifications.on_raise();
        let mut dismissed = notifications.on_dismiss();

        let id = notifications.error("failed");
        notifications.dismiss(id);
        notifications.dismiss(id);
        let other = notifications.info("other");
        notifications.dismiss(other);

        let raised: Vec<_> = block_on(raised.by_ref().take(2).collect());
        assert_eq!(
            raised.iter().map(|n| n.id).collect::<Vec<_>>(),
            vec![id, other],
        );
        let dismissed: Vec<_> = block_on(dismissed.by_ref().take(2).collect());
        assert_eq!(dismissed[0].id, id);
        assert_eq!(dismissed[0].message, "failed");
        assert_eq!(dismissed[1].id, other);
    }
}
