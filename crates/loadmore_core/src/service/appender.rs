//! Load-more click appender.
//!
//! # Responsibility
//! - Attach one click reaction to the trigger element of a document.
//! - On every activation, append one `ArticleFragment` to the container.
//!
//! # Invariants
//! - The trigger is resolved once, at attach time.
//! - The container is resolved again on every activation, never cached.
//! - Fragments appended == activations delivered while attached.
//! - A missing container turns the activation into a silent no-op.

use crate::dom::{DocumentHost, DomError, Event, EventKind, ListenerId, NodeId, Selector};
use crate::model::fragment::{ArticleFragment, CONTAINER_SELECTOR, TRIGGER_ID};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use thiserror::Error;

static DEFAULT_CONTAINER: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(CONTAINER_SELECTOR).expect("valid default container selector")
});

/// Where the appender listens, where it appends, and what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppenderConfig {
    /// `id` of the trigger element.
    pub trigger_id: String,
    /// Selector re-resolved on each activation.
    pub container: Selector,
    pub fragment: ArticleFragment,
}

impl Default for AppenderConfig {
    fn default() -> Self {
        Self {
            trigger_id: TRIGGER_ID.to_string(),
            container: DEFAULT_CONTAINER.clone(),
            fragment: ArticleFragment::default(),
        }
    }
}

impl AppenderConfig {
    /// Builds a config from raw identifiers.
    ///
    /// # Errors
    /// - `InvalidConfig` when `trigger_id` is blank.
    /// - `Dom(InvalidSelector)` when `container_selector` does not parse.
    pub fn new(
        trigger_id: impl Into<String>,
        container_selector: &str,
        fragment: ArticleFragment,
    ) -> Result<Self, AppendError> {
        let trigger_id = trigger_id.into().trim().to_string();
        if trigger_id.is_empty() {
            return Err(AppendError::InvalidConfig(
                "trigger id must not be blank".to_string(),
            ));
        }
        Ok(Self {
            trigger_id,
            container: Selector::parse(container_selector)?,
            fragment,
        })
    }
}

/// Result of one activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// A new fragment element was appended as the container's last child.
    Appended { container: NodeId, article: NodeId },
    /// No element matched the container selector; nothing changed.
    ContainerMissing,
}

/// Appender errors. Only initialization failures surface to callers.
#[derive(Debug, Error)]
pub enum AppendError {
    #[error("required element not found: {lookup}")]
    ElementNotFound { lookup: String },
    #[error("invalid appender config: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Performs one activation against `document`.
///
/// # Contract
/// - Looks up `container` at call time.
/// - Appends exactly one element built from `fragment`, or nothing when the
///   container is missing.
///
/// # Errors
/// - Propagates host failures while building or appending the element.
pub fn append_fragment<D: DocumentHost>(
    document: &mut D,
    container: &Selector,
    fragment: &ArticleFragment,
) -> Result<ActivationOutcome, DomError> {
    let Some(container_id) = document.query_selector(container) else {
        return Ok(ActivationOutcome::ContainerMissing);
    };

    let article = document.create_element(&fragment.tag)?;
    document.add_class(article, &fragment.class)?;
    document.set_inner_html(article, &fragment.inner_html())?;
    document.append_child(container_id, article)?;

    Ok(ActivationOutcome::Appended {
        container: container_id,
        article,
    })
}

/// Click listener that grows a content list by one fixed entry per click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonClickAppender {
    trigger: NodeId,
    listener: ListenerId,
}

impl ButtonClickAppender {
    /// Resolves the trigger and registers the click listener.
    ///
    /// # Errors
    /// - `ElementNotFound` when no element has `config.trigger_id`.
    /// - `Dom` when the host rejects listener registration.
    pub fn attach<D>(document: &mut D, config: AppenderConfig) -> Result<Self, AppendError>
    where
        D: DocumentHost + 'static,
    {
        let trigger = document
            .get_element_by_id(&config.trigger_id)
            .ok_or_else(|| AppendError::ElementNotFound {
                lookup: format!("#{}", config.trigger_id),
            })?;

        let AppenderConfig {
            trigger_id,
            container,
            fragment,
        } = config;
        info!(
            "event=appender_attach module=appender status=ok trigger={} container={}",
            trigger_id, container
        );

        let listener = document.add_event_listener(
            trigger,
            EventKind::Click,
            Box::new(move |document: &mut D, event: &Event| {
                match append_fragment(document, &container, &fragment) {
                    Ok(ActivationOutcome::Appended { container, article }) => debug!(
                        "event=fragment_append module=appender status=ok target={} container={} article={}",
                        event.target, container, article
                    ),
                    Ok(ActivationOutcome::ContainerMissing) => debug!(
                        "event=fragment_append module=appender status=skipped reason=container_missing selector={}",
                        container
                    ),
                    Err(err) => warn!(
                        "event=fragment_append module=appender status=error error={}",
                        err
                    ),
                }
            }),
        )?;

        Ok(Self { trigger, listener })
    }

    /// The trigger element resolved at attach time.
    pub fn trigger(&self) -> NodeId {
        self.trigger
    }

    /// Removes the click listener; later clicks append nothing.
    pub fn detach<D: DocumentHost>(self, document: &mut D) -> Result<(), AppendError> {
        document.remove_event_listener(self.listener)?;
        debug!(
            "event=appender_detach module=appender status=ok trigger={}",
            self.trigger
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{append_fragment, ActivationOutcome, AppendError, AppenderConfig, ButtonClickAppender};
    use crate::dom::{
        DocumentHost, DomError, DomResult, Event, EventKind, Listener, ListenerId, NodeId, Selector,
    };
    use crate::model::fragment::ArticleFragment;
    use std::cell::Cell;

    /// Host double that records calls instead of keeping a tree.
    #[derive(Default)]
    struct RecordingHost {
        trigger: Option<NodeId>,
        container: Option<NodeId>,
        next_node: usize,
        container_lookups: Cell<usize>,
        inner_html: Vec<(NodeId, String)>,
        classes: Vec<(NodeId, String)>,
        appended: Vec<(NodeId, NodeId)>,
        listeners: Vec<(ListenerId, Listener<RecordingHost>)>,
    }

    impl RecordingHost {
        fn with_trigger_and_container() -> Self {
            Self {
                trigger: Some(NodeId(1)),
                container: Some(NodeId(2)),
                next_node: 3,
                ..Self::default()
            }
        }

        fn fire(&mut self, target: NodeId) {
            let mut listeners = std::mem::take(&mut self.listeners);
            let event = Event {
                kind: EventKind::Click,
                target,
            };
            for (_, listener) in listeners.iter_mut() {
                listener(self, &event);
            }
            self.listeners = listeners;
        }
    }

    impl DocumentHost for RecordingHost {
        fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
            (id == "loadMore").then_some(self.trigger).flatten()
        }

        fn query_selector(&self, _selector: &Selector) -> Option<NodeId> {
            self.container_lookups.set(self.container_lookups.get() + 1);
            self.container
        }

        fn create_element(&mut self, _tag: &str) -> DomResult<NodeId> {
            let id = NodeId(self.next_node);
            self.next_node += 1;
            Ok(id)
        }

        fn add_class(&mut self, element: NodeId, class: &str) -> DomResult<()> {
            self.classes.push((element, class.to_string()));
            Ok(())
        }

        fn set_inner_html(&mut self, element: NodeId, html: &str) -> DomResult<()> {
            self.inner_html.push((element, html.to_string()));
            Ok(())
        }

        fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
            self.appended.push((parent, child));
            Ok(())
        }

        fn add_event_listener(
            &mut self,
            _target: NodeId,
            _kind: EventKind,
            listener: Listener<Self>,
        ) -> DomResult<ListenerId> {
            let id = ListenerId(self.listeners.len() as u64);
            self.listeners.push((id, listener));
            Ok(id)
        }

        fn remove_event_listener(&mut self, listener: ListenerId) -> DomResult<()> {
            let before = self.listeners.len();
            self.listeners.retain(|(id, _)| *id != listener);
            if self.listeners.len() == before {
                return Err(DomError::UnknownListener(listener));
            }
            Ok(())
        }
    }

    #[test]
    fn default_config_targets_literal_identifiers() {
        let config = AppenderConfig::default();
        assert_eq!(config.trigger_id, "loadMore");
        assert_eq!(config.container.as_str(), ".news-container");
        assert_eq!(config.fragment, ArticleFragment::default());
    }

    #[test]
    fn config_rejects_blank_trigger_and_bad_selector() {
        let err = AppenderConfig::new("  ", ".news-container", ArticleFragment::default())
            .expect_err("blank trigger must fail");
        assert!(matches!(err, AppendError::InvalidConfig(_)));

        let err = AppenderConfig::new("loadMore", "div > p", ArticleFragment::default())
            .expect_err("unsupported selector must fail");
        assert!(matches!(err, AppendError::Dom(DomError::InvalidSelector(_))));
    }

    #[test]
    fn attach_fails_when_trigger_is_missing() {
        let mut host = RecordingHost::default();
        let err = ButtonClickAppender::attach(&mut host, AppenderConfig::default())
            .expect_err("missing trigger must fail");
        assert!(matches!(err, AppendError::ElementNotFound { ref lookup } if lookup == "#loadMore"));
        assert!(host.listeners.is_empty());
    }

    #[test]
    fn attach_does_not_resolve_container_up_front() {
        let mut host = RecordingHost::with_trigger_and_container();
        let appender =
            ButtonClickAppender::attach(&mut host, AppenderConfig::default()).expect("attach");
        assert_eq!(appender.trigger(), NodeId(1));
        assert_eq!(host.container_lookups.get(), 0);
    }

    #[test]
    fn each_activation_resolves_container_and_appends_once() {
        let mut host = RecordingHost::with_trigger_and_container();
        ButtonClickAppender::attach(&mut host, AppenderConfig::default()).expect("attach");

        for _ in 0..3 {
            host.fire(NodeId(1));
        }

        assert_eq!(host.container_lookups.get(), 3);
        assert_eq!(host.appended.len(), 3);
        assert!(host.appended.iter().all(|(parent, _)| *parent == NodeId(2)));
        assert!(host.classes.iter().all(|(_, class)| class == "tease-card"));
        let expected = ArticleFragment::default().inner_html();
        assert!(host.inner_html.iter().all(|(_, html)| *html == expected));
    }

    #[test]
    fn activation_without_container_is_a_no_op() {
        let mut host = RecordingHost::with_trigger_and_container();
        host.container = None;

        let outcome = append_fragment(
            &mut host,
            &AppenderConfig::default().container,
            &ArticleFragment::default(),
        )
        .expect("missing container is not an error");

        assert_eq!(outcome, ActivationOutcome::ContainerMissing);
        assert!(host.appended.is_empty());
        assert!(host.inner_html.is_empty());
    }

    #[test]
    fn detach_removes_listener() {
        let mut host = RecordingHost::with_trigger_and_container();
        let appender =
            ButtonClickAppender::attach(&mut host, AppenderConfig::default()).expect("attach");
        appender.detach(&mut host).expect("detach");

        host.fire(NodeId(1));
        assert!(host.appended.is_empty());
    }
}
