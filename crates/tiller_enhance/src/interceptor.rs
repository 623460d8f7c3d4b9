//! Action-interception protocol
//!
//! Runs after an intercepted action completed without error. Navigation is
//! fail-fast: targets and anchors are validated before any content-tree
//! mutation, so a partially-applied navigation cannot occur.

use std::sync::Arc;

use thiserror::Error;

use tiller_core::{
    ActionId, AnchorId, Component, ComponentDescriptor, ComponentError, NavigationDirective,
    NestedViewSpec, ViewId,
};
use tiller_view::{View, ViewFactory, WindowManager};

use crate::enhancer::InterceptionTable;

/// Navigation failures; all fatal, none leaves a partial mutation behind
#[derive(Debug, Clone, Error)]
pub enum NavigationError {
    /// Navigation names a view id nobody registered
    #[error("view '{0}' does not exist")]
    UnresolvedView(ViewId),

    /// Same-window navigation, but the invoking component's view is not
    /// hosted in any window yet
    #[error("view '{0}' is not part of any window, nothing to reuse")]
    UnattachedWindow(ViewId),

    /// A nested-attachment anchor is absent from the hosting view
    #[error("anchor '{anchor}' does not exist in view '{view}'")]
    MissingAnchor {
        /// The view searched for the anchor
        view: ViewId,
        /// The missing anchor
        anchor: AnchorId,
    },
}

/// Failure of an intercepted invocation
#[derive(Debug, Error)]
pub enum InterceptionError {
    /// The original behavior failed; navigation was skipped
    #[error(transparent)]
    Component(#[from] ComponentError),

    /// The original behavior succeeded but navigation failed
    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

/// What an intercepted invocation did after the action succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// A navigation directive ran
    NavigationApplied,
    /// The action declares no directive (or the type is not intercepted)
    NoNavigation,
}

/// Collaborators the protocol navigates against
pub struct NavContext<'a> {
    /// Resolves view ids
    pub views: &'a dyn ViewFactory,
    /// Creates and tracks windows
    pub windows: &'a WindowManager,
    /// Types registered for global interception
    pub table: &'a InterceptionTable,
}

/// Invoke an action on any component instance through one entry point
///
/// The original behavior always runs. Whether navigation follows depends on
/// the configured strategy: under global registration the component's type
/// is found in the interception table and its directive runs for any
/// instance, however obtained; under wrapping an unwrapped instance is not
/// intercepted and the call reports [`ActionOutcome::NoNavigation`].
pub fn dispatch_action(
    component: &dyn Component,
    action: &ActionId,
    ctx: &NavContext<'_>,
) -> Result<ActionOutcome, InterceptionError> {
    component.on_action(action)?;

    let descriptor = match ctx.table.lookup(component.as_any().type_id()) {
        Some(descriptor) => descriptor,
        None => return Ok(ActionOutcome::NoNavigation),
    };
    let directive = match descriptor.directive_for(action) {
        Some(directive) => directive,
        None => return Ok(ActionOutcome::NoNavigation),
    };
    let current = ctx.views.resolve(&descriptor.view);
    apply_directive(&descriptor, current, directive, ctx).map_err(InterceptionError::from)
}

/// Apply a navigation directive on behalf of the invoking component
///
/// `current` is the component's own view; it is required for same-window
/// navigation and for nested attachment.
pub(crate) fn apply_directive(
    descriptor: &ComponentDescriptor,
    current: Option<Arc<View>>,
    directive: &NavigationDirective,
    ctx: &NavContext<'_>,
) -> Result<ActionOutcome, NavigationError> {
    match directive {
        NavigationDirective::ShowView { view, new_window } => {
            show_view(descriptor, current, view, *new_window, ctx)
        }
        NavigationDirective::AttachNestedViews(specs) => {
            attach_nested_views(descriptor, current, specs, ctx)
        }
    }
}

fn show_view(
    descriptor: &ComponentDescriptor,
    current: Option<Arc<View>>,
    target: &ViewId,
    new_window: bool,
    ctx: &NavContext<'_>,
) -> Result<ActionOutcome, NavigationError> {
    let view = ctx
        .views
        .resolve(target)
        .ok_or_else(|| NavigationError::UnresolvedView(target.clone()))?;

    if new_window {
        let window = view.show_in_new_window();
        log::debug!("'{}' navigated to '{}' in new {}", descriptor.id, target, window);
    } else {
        let current =
            current.ok_or_else(|| NavigationError::UnattachedWindow(descriptor.view.clone()))?;
        let window = current
            .owning_window()
            .ok_or_else(|| NavigationError::UnattachedWindow(current.id().clone()))?;
        view.show(window)
            .map_err(|_| NavigationError::UnattachedWindow(current.id().clone()))?;
        log::debug!("'{}' navigated to '{}' in {}", descriptor.id, target, window);
    }
    Ok(ActionOutcome::NavigationApplied)
}

/// Graft nested views beneath their anchors in the component's own view
///
/// Specs apply independently, but each one validates its target view and
/// anchor before mutating anything.
pub fn attach_nested_views(
    descriptor: &ComponentDescriptor,
    current: Option<Arc<View>>,
    specs: &[NestedViewSpec],
    ctx: &NavContext<'_>,
) -> Result<ActionOutcome, NavigationError> {
    let host =
        current.ok_or_else(|| NavigationError::UnresolvedView(descriptor.view.clone()))?;

    for spec in specs {
        let nested = ctx
            .views
            .resolve(&spec.view)
            .ok_or_else(|| NavigationError::UnresolvedView(spec.view.clone()))?;
        let anchor = host
            .lookup_anchor(&spec.anchor)
            .ok_or_else(|| NavigationError::MissingAnchor {
                view: host.id().clone(),
                anchor: spec.anchor.clone(),
            })?;
        anchor.attach_child(nested.content_root(), spec.position);
        log::debug!(
            "attached '{}' beneath anchor '{}' of '{}'",
            spec.view,
            spec.anchor,
            host.id()
        );
    }
    Ok(ActionOutcome::NavigationApplied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::sync::Arc;

    use tiller_core::ActionSpec;
    use tiller_view::{NodeRef, StaticViewFactory};

    use crate::enhancer::{Enhancer, GlobalEnhancer, WrappingEnhancer};

    struct Wizard;

    impl Component for Wizard {
        fn on_action(&self, action: &ActionId) -> Result<(), ComponentError> {
            if action.name() == "fail" {
                return Err(ComponentError::action_failed(action.clone(), "rejected"));
            }
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    struct Fixture {
        views: StaticViewFactory,
        windows: Arc<WindowManager>,
        table: Arc<InterceptionTable>,
    }

    impl Fixture {
        fn new() -> Self {
            let windows = Arc::new(WindowManager::new());
            let views = StaticViewFactory::new();

            let wizard_root = NodeRef::new("root");
            wizard_root.add_child(NodeRef::with_anchor("content", "contentArea"));
            views
                .register(Arc::new(View::new(
                    "wizardView",
                    wizard_root,
                    Arc::clone(&windows),
                )))
                .unwrap();
            views
                .register(Arc::new(View::new(
                    "summaryView",
                    NodeRef::new("summary"),
                    Arc::clone(&windows),
                )))
                .unwrap();
            views
                .register(Arc::new(View::new(
                    "panelView",
                    NodeRef::new("panel"),
                    Arc::clone(&windows),
                )))
                .unwrap();

            Self {
                views,
                windows,
                table: Arc::new(InterceptionTable::new()),
            }
        }

        fn ctx(&self) -> NavContext<'_> {
            NavContext {
                views: &self.views,
                windows: &self.windows,
                table: &self.table,
            }
        }

        fn view(&self, id: &str) -> Arc<View> {
            self.views.resolve(&id.into()).unwrap()
        }
    }

    fn wizard_descriptor() -> ComponentDescriptor {
        ComponentDescriptor::of::<Wizard>("wizard", "wizardView")
            .with_action(ActionSpec::show_view("finish", "summaryView"))
            .with_action(ActionSpec::show_in_new_window("detach", "summaryView"))
            .with_action(ActionSpec::attach_nested(
                "expand",
                vec![NestedViewSpec::new("panelView", "contentArea")],
            ))
            .with_action(ActionSpec::attach_nested(
                "expand-broken",
                vec![NestedViewSpec::new("panelView", "missingArea")],
            ))
            .with_action(ActionSpec::show_view("finish-broken", "ghostView"))
            .with_action(ActionSpec::show_in_new_window("fail", "summaryView"))
    }

    fn enhanced(fixture: &Fixture) -> crate::enhanced::EnhancedComponent {
        let enhancer = WrappingEnhancer::new();
        let class = enhancer.enhance(&wizard_descriptor());
        let component = class.instantiate(Arc::new(Wizard)).unwrap();
        component.attach_view(fixture.view("wizardView"));
        component
    }

    #[test]
    fn test_new_window_navigation_opens_distinct_window() {
        let fixture = Fixture::new();
        let component = enhanced(&fixture);
        let first = fixture.view("wizardView").show_in_new_window();

        let outcome = component
            .invoke(&"detach".into(), &fixture.ctx())
            .unwrap();
        assert_eq!(outcome, ActionOutcome::NavigationApplied);

        let second = fixture.view("summaryView").owning_window().unwrap();
        assert_ne!(first, second);
        assert_eq!(fixture.windows.window_count(), 2);
    }

    #[test]
    fn test_same_window_navigation_reuses_current_window() {
        let fixture = Fixture::new();
        let component = enhanced(&fixture);
        let window = fixture.view("wizardView").show_in_new_window();

        component.invoke(&"finish".into(), &fixture.ctx()).unwrap();

        assert_eq!(fixture.view("summaryView").owning_window(), Some(window));
        assert_eq!(fixture.windows.window_count(), 1);
    }

    #[test]
    fn test_same_window_navigation_without_window_is_fatal() {
        let fixture = Fixture::new();
        let component = enhanced(&fixture);

        let err = component
            .invoke(&"finish".into(), &fixture.ctx())
            .unwrap_err();
        assert!(matches!(
            err,
            InterceptionError::Navigation(NavigationError::UnattachedWindow(_))
        ));
        // validated before mutation: nothing was shown anywhere
        assert_eq!(fixture.windows.window_count(), 0);
    }

    #[test]
    fn test_unresolved_target_view_is_fatal() {
        let fixture = Fixture::new();
        let component = enhanced(&fixture);
        fixture.view("wizardView").show_in_new_window();

        let err = component
            .invoke(&"finish-broken".into(), &fixture.ctx())
            .unwrap_err();
        match err {
            InterceptionError::Navigation(NavigationError::UnresolvedView(view)) => {
                assert_eq!(view.name(), "ghostView");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_nested_attachment_grafts_beneath_anchor() {
        let fixture = Fixture::new();
        let component = enhanced(&fixture);

        let anchor = fixture
            .view("wizardView")
            .lookup_anchor(&"contentArea".into())
            .unwrap();
        assert_eq!(anchor.child_count(), 0);

        component.invoke(&"expand".into(), &fixture.ctx()).unwrap();

        assert_eq!(anchor.child_count(), 1);
        assert!(anchor.children()[0].ptr_eq(&fixture.view("panelView").content_root()));
    }

    #[test]
    fn test_missing_anchor_leaves_tree_unchanged() {
        let fixture = Fixture::new();
        let component = enhanced(&fixture);
        let root = fixture.view("wizardView").content_root();
        let before = root.child_count();

        let err = component
            .invoke(&"expand-broken".into(), &fixture.ctx())
            .unwrap_err();
        assert!(matches!(
            err,
            InterceptionError::Navigation(NavigationError::MissingAnchor { .. })
        ));
        assert_eq!(root.child_count(), before);
        assert_eq!(
            fixture
                .view("wizardView")
                .lookup_anchor(&"contentArea".into())
                .unwrap()
                .child_count(),
            0
        );
    }

    #[test]
    fn test_failed_action_skips_navigation() {
        let fixture = Fixture::new();
        let component = enhanced(&fixture);
        fixture.view("wizardView").show_in_new_window();

        let err = component.invoke(&"fail".into(), &fixture.ctx()).unwrap_err();
        assert!(matches!(err, InterceptionError::Component(_)));
        // the summary view was never shown
        assert!(fixture.view("summaryView").owning_window().is_none());
        assert_eq!(fixture.windows.window_count(), 1);
    }

    #[test]
    fn test_action_without_directive_reports_no_navigation() {
        let fixture = Fixture::new();
        let component = enhanced(&fixture);
        let outcome = component
            .invoke(&"plain-save".into(), &fixture.ctx())
            .unwrap();
        assert_eq!(outcome, ActionOutcome::NoNavigation);
    }

    #[test]
    fn test_indexed_attachment_position() {
        let fixture = Fixture::new();
        let anchor = fixture
            .view("wizardView")
            .lookup_anchor(&"contentArea".into())
            .unwrap();
        anchor.add_child(NodeRef::new("existing"));

        let descriptor = ComponentDescriptor::of::<Wizard>("wizard", "wizardView").with_action(
            ActionSpec::attach_nested(
                "expand",
                vec![NestedViewSpec::new("panelView", "contentArea").at(0)],
            ),
        );
        let class = WrappingEnhancer::new().enhance(&descriptor);
        let component = class.instantiate(Arc::new(Wizard)).unwrap();
        component.attach_view(fixture.view("wizardView"));

        component.invoke(&"expand".into(), &fixture.ctx()).unwrap();

        let names: Vec<String> = anchor.children().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["panel", "existing"]);
    }

    #[test]
    fn test_global_dispatch_intercepts_any_instance() {
        let fixture = Fixture::new();
        let enhancer = GlobalEnhancer::new(Arc::clone(&fixture.table));
        enhancer.install();
        enhancer.enhance(&wizard_descriptor());

        // an instance the container never saw
        let stray = Wizard;
        let outcome = dispatch_action(&stray, &"detach".into(), &fixture.ctx()).unwrap();
        assert_eq!(outcome, ActionOutcome::NavigationApplied);
        assert_eq!(fixture.windows.window_count(), 1);
    }

    #[test]
    fn test_wrapping_dispatch_leaves_bare_instances_alone() {
        let fixture = Fixture::new();
        let enhancer = WrappingEnhancer::new();
        enhancer.install();
        enhancer.enhance(&wizard_descriptor());

        let stray = Wizard;
        let outcome = dispatch_action(&stray, &"detach".into(), &fixture.ctx()).unwrap();
        assert_eq!(outcome, ActionOutcome::NoNavigation);
        assert_eq!(fixture.windows.window_count(), 0);
    }
}
