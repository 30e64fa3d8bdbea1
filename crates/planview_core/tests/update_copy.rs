use std::sync::Once;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use planview_core::{
    update, DiagramReply, Effect, Failure, GuardedAction, Msg, ViewerController, ViewerSettings,
    COPY_LABEL, COPY_LABEL_COPIED, COPY_LABEL_ERROR,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(planview_logging::initialize_for_tests);
}

fn rendered() -> ViewerController {
    let (state, _) = update(
        ViewerController::new(ViewerSettings::default()),
        Msg::Pasted("Task".to_string()),
    );
    let (state, _) = update(
        state,
        Msg::DiagramReceived(DiagramReply {
            image: STANDARD.encode(r#"<svg viewBox="0 0 1 1"></svg>"#),
            notifications: Vec::new(),
        }),
    );
    state
}

fn copy_label(state: &ViewerController) -> String {
    state.view().copy_button.expect("copy button").label
}

#[test]
fn copy_fetches_text_then_writes_it() {
    init_logging();
    let (state, effects) = update(rendered(), Msg::CopyClicked);
    assert_eq!(effects, vec![Effect::FetchCopyText]);
    assert_eq!(state.guard().held(), Some(GuardedAction::CopyPlan));

    let (state, effects) = update(state, Msg::CopyTextReady("2024-01-02\t2024-01-05\tana".into()));
    assert_eq!(
        effects,
        vec![Effect::WriteClipboard {
            text: "2024-01-02\t2024-01-05\tana".to_string()
        }]
    );
    assert!(state.guard().is_held());
}

#[test]
fn successful_copy_flashes_confirmation_then_restores() {
    init_logging();
    let (state, _) = update(rendered(), Msg::CopyClicked);
    let (state, _) = update(state, Msg::CopyTextReady("plan".into()));
    let (state, effects) = update(state, Msg::CopyFinished(Ok(())));

    assert!(!state.guard().is_held());
    assert_eq!(copy_label(&state), COPY_LABEL_COPIED);
    let flash = match effects.as_slice() {
        [Effect::RestoreCopyLabel { flash, after }] => {
            assert_eq!(*after, Duration::from_secs(2));
            *flash
        }
        other => panic!("unexpected effects {other:?}"),
    };

    let (state, _) = update(state, Msg::CopyLabelExpired { flash });
    assert_eq!(copy_label(&state), COPY_LABEL);
}

#[test]
fn failed_copy_flashes_error_and_releases_guard() {
    init_logging();
    let (state, _) = update(rendered(), Msg::CopyClicked);
    let (state, effects) = update(state, Msg::CopyFinished(Err("network error".into())));

    assert_eq!(copy_label(&state), COPY_LABEL_ERROR);
    assert_eq!(effects.len(), 1);
    assert!(!state.guard().is_held());
}

#[test]
fn old_restore_timer_does_not_clobber_newer_flash() {
    init_logging();
    let (state, _) = update(rendered(), Msg::CopyClicked);
    let (state, first) = update(state, Msg::CopyFinished(Ok(())));
    let (state, _) = update(state, Msg::CopyClicked);
    let (state, _) = update(state, Msg::CopyFinished(Err("clipboard unavailable".into())));

    let Some(Effect::RestoreCopyLabel { flash, .. }) = first.first() else {
        panic!("missing restore effect");
    };
    let (state, _) = update(state, Msg::CopyLabelExpired { flash: *flash });
    assert_eq!(copy_label(&state), COPY_LABEL_ERROR);
}

#[test]
fn copy_holds_the_shared_guard() {
    init_logging();
    let (state, _) = update(rendered(), Msg::CopyClicked);

    let (state, effects) = update(state, Msg::Pasted("new plan".into()));
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::ClearClicked);
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::CopyClicked);
    assert!(effects.is_empty());

    let (state, _) = update(state, Msg::CopyFinished(Ok(())));
    let (_, effects) = update(state, Msg::Pasted("new plan".into()));
    assert_eq!(
        effects,
        vec![Effect::Process {
            content: "new plan".to_string()
        }]
    );
}

#[test]
fn copy_before_render_is_ignored() {
    init_logging();
    let (state, effects) = update(ViewerController::new(ViewerSettings::default()), Msg::CopyClicked);
    assert!(effects.is_empty());
    assert!(!state.guard().is_held());
}

#[test]
fn copy_stays_unavailable_after_failed_first_paste() {
    init_logging();
    let (state, _) = update(
        ViewerController::new(ViewerSettings::default()),
        Msg::Pasted("Task".to_string()),
    );
    let (state, _) = update(
        state,
        Msg::DiagramFailed(Failure::Rejected {
            message: Some("Missing column Task".to_string()),
            notifications: Vec::new(),
        }),
    );

    let view = state.view();
    assert!(view.copy_button.is_none());
    assert!(view.clear_button.is_none());
    let (state, effects) = update(state, Msg::CopyClicked);
    assert!(effects.is_empty());
    assert!(!state.guard().is_held());
}
