// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Transient notification queue with TTL + dedupe.
//!
//! The editor raises notifications for lock denials, undo/redo, clipboard
//! feedback and peer presence. The caller supplies `now` on every call so the
//! queue stays deterministic under test.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    /// Informational note.
    Info,
    /// An action completed.
    Success,
    /// Warning that may need attention (e.g. a lock denial).
    Warn,
    /// Error requiring user awareness.
    Error,
}

/// Who raised a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastScope {
    /// Caused by another participant in the project.
    Peer,
    /// Caused by the local user's own action.
    Local,
}

/// Identifier for a toast entry.
pub type ToastId = u64;

/// Toast data stored in the service.
#[derive(Debug, Clone)]
pub struct Toast {
    /// Stable identifier.
    pub id: ToastId,
    /// Severity.
    pub kind: ToastKind,
    /// Origin.
    pub scope: ToastScope,
    /// Short title line.
    pub title: String,
    /// Optional body text.
    pub body: Option<String>,
    /// Time-to-live duration.
    pub ttl: Duration,
    /// Creation (or last refresh) time.
    pub created: Instant,
}

/// Rendering-friendly view of a toast.
#[derive(Debug, Clone)]
pub struct ToastRender {
    /// Stable identifier.
    pub id: ToastId,
    /// Severity.
    pub kind: ToastKind,
    /// Origin.
    pub scope: ToastScope,
    /// Short title line.
    pub title: String,
    /// Optional body text.
    pub body: Option<String>,
    /// 1.0 -> just created, 0.0 -> expired.
    pub progress: f32,
}

/// In-memory toast queue with TTL and dedupe window.
#[derive(Debug, Clone)]
pub struct ToastService {
    queue: VecDeque<Toast>,
    max: usize,
    dedupe_window: Duration,
    next_id: ToastId,
}

impl ToastService {
    /// Create a new queue holding at most `max` toasts.
    pub fn new(max: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            max: max.max(1),
            dedupe_window: Duration::from_millis(500),
            next_id: 1,
        }
    }

    /// Push a toast, deduping identical recent entries (same kind, scope,
    /// title and body within the dedupe window).
    ///
    /// A duplicate refreshes the existing entry instead of stacking a new one.
    pub fn push<S, B>(
        &mut self,
        kind: ToastKind,
        scope: ToastScope,
        title: S,
        body: B,
        ttl: Duration,
        now: Instant,
    ) -> ToastId
    where
        S: Into<String>,
        B: Into<Option<String>>,
    {
        let title = title.into();
        let body = body.into();

        if let Some(existing) = self.queue.iter_mut().find(|t| {
            t.kind == kind
                && t.scope == scope
                && t.title == title
                && t.body == body
                && now.saturating_duration_since(t.created) <= self.dedupe_window
        }) {
            existing.created = now;
            existing.ttl = ttl;
            return existing.id;
        }

        let id = self.next_id;
        self.next_id += 1;
        if self.queue.len() >= self.max {
            self.queue.pop_front();
        }
        self.queue.push_back(Toast {
            id,
            kind,
            scope,
            title,
            body,
            ttl,
            created: now,
        });
        id
    }

    /// Drop expired toasts (call once per tick).
    pub fn retain_visible(&mut self, now: Instant) {
        self.queue
            .retain(|t| now.saturating_duration_since(t.created) < t.ttl);
    }

    /// Number of queued toasts, expired or not.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Most recently pushed toast, if any.
    pub fn latest(&self) -> Option<&Toast> {
        self.queue.back()
    }

    /// Render-ready toasts with progress ratios.
    pub fn visible(&self, now: Instant) -> Vec<ToastRender> {
        self.queue
            .iter()
            .filter(|t| now.saturating_duration_since(t.created) < t.ttl)
            .map(|t| ToastRender {
                id: t.id,
                kind: t.kind,
                scope: t.scope,
                title: t.title.clone(),
                body: t.body.clone(),
                progress: 1.0
                    - (now.saturating_duration_since(t.created).as_secs_f32()
                        / t.ttl.as_secs_f32()),
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(3);

    #[test]
    fn duplicates_inside_window_refresh_instead_of_stacking() {
        let mut toasts = ToastService::new(4);
        let t0 = Instant::now();
        let a = toasts.push(ToastKind::Warn, ToastScope::Local, "Locked", None, TTL, t0);
        let b = toasts.push(
            ToastKind::Warn,
            ToastScope::Local,
            "Locked",
            None,
            TTL,
            t0 + Duration::from_millis(100),
        );
        assert_eq!(a, b);
        assert_eq!(toasts.len(), 1);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut toasts = ToastService::new(2);
        let t0 = Instant::now();
        toasts.push(ToastKind::Info, ToastScope::Peer, "one", None, TTL, t0);
        toasts.push(ToastKind::Info, ToastScope::Peer, "two", None, TTL, t0);
        toasts.push(ToastKind::Info, ToastScope::Peer, "three", None, TTL, t0);
        let titles: Vec<_> = toasts.visible(t0).into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["two".to_string(), "three".to_string()]);
    }

    #[test]
    fn expired_toasts_are_dropped() {
        let mut toasts = ToastService::new(4);
        let t0 = Instant::now();
        toasts.push(ToastKind::Success, ToastScope::Local, "Undo", None, TTL, t0);
        assert_eq!(toasts.visible(t0 + Duration::from_secs(1)).len(), 1);
        toasts.retain_visible(t0 + TTL);
        assert!(toasts.is_empty());
    }
}
