//! End-to-end authoring flow: open a session, build a mixed chain through
//! the step forms, pick an audience, assemble, and submit.

use uuid::Uuid;

use zapline_workflow::{
    Cadence, CampaignObjective, MediaSource, StepKind, WorkflowEditorSession, WorkflowError,
};

#[test]
fn author_and_submit_a_three_step_campaign() {
    let mut session = WorkflowEditorSession::new();

    // Greeting text.
    session.open_new_step(StepKind::Text);
    session.form_mut().unwrap().content = "Hello {nome}, our winter sale starts today!".to_string();
    let greeting = session.confirm_form().unwrap();

    // Product image with a caption, hosted remotely.
    session.open_new_step(StepKind::Image);
    {
        let form = session.form_mut().unwrap();
        form.content = "This week's highlights".to_string();
        form.media = Some(MediaSource::Url {
            url: "https://cdn.zapline.app/campaigns/winter/highlights.png".to_string(),
        });
    }
    let image = session.confirm_form().unwrap();

    // Closing poll.
    session.open_new_step(StepKind::Poll);
    {
        let form = session.form_mut().unwrap();
        form.content = "Which category should we restock first?".to_string();
        form.poll_options = vec![
            "Shoes".to_string(),
            "Jackets".to_string(),
            "Accessories".to_string(),
        ];
        form.selectable_count = 1;
    }
    let poll = session.confirm_form().unwrap();

    // Audience and campaign details.
    let contacts: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
    session.set_audience(contacts.clone());
    session.set_name("Winter Sale Kickoff");
    session.set_objective(CampaignObjective::Promotion);
    session.set_cadence(Cadence {
        min_delay_secs: 5,
        max_delay_secs: 15,
    });

    let submission = session.begin_submission().unwrap();
    assert_eq!(submission.name, "Winter Sale Kickoff");
    assert_eq!(submission.audience, contacts);
    assert_eq!(
        submission.steps.iter().map(|s| s.id).collect::<Vec<_>>(),
        vec![greeting, image, poll]
    );
    // Per-kind delay defaults survive assembly: text 1s, image 2s, poll 1s.
    assert_eq!(
        submission.steps.iter().map(|s| s.delay_ms).collect::<Vec<_>>(),
        vec![1000, 2000, 1000]
    );
    assert!(submission.validate().is_ok());

    session.finish_submission(true);
    assert_eq!(session.graph().step_count(), 0);
}

#[test]
fn editing_mid_chain_keeps_order_stable() {
    let mut session = WorkflowEditorSession::new();
    for content in ["one", "two", "three"] {
        session.open_new_step(StepKind::Text);
        session.form_mut().unwrap().content = content.to_string();
        session.confirm_form().unwrap();
    }

    let chain = session.graph().linearize().unwrap();
    let middle = chain.steps[1].id;

    session.open_edit_step(middle).unwrap();
    session.form_mut().unwrap().content = "two (edited)".to_string();
    session.confirm_form().unwrap();

    let chain = session.graph().linearize().unwrap();
    let contents: Vec<&str> = chain.steps.iter().map(|s| s.content.as_str()).collect();
    assert_eq!(contents, vec!["one", "two (edited)", "three"]);
}

#[test]
fn manual_branch_blocks_submission_until_fixed() {
    let mut session = WorkflowEditorSession::new();
    session.open_new_step(StepKind::Text);
    session.form_mut().unwrap().content = "a".to_string();
    let a = session.confirm_form().unwrap();

    session.open_new_step(StepKind::Text);
    session.form_mut().unwrap().content = "b".to_string();
    session.confirm_form().unwrap();

    // A manual canvas connection from start to b creates a fan-out at start.
    let start = session.graph().start_id();
    let b_incoming = session
        .graph()
        .edges()
        .iter()
        .find(|e| e.source == a)
        .map(|e| e.target)
        .unwrap();
    let stray_edge = session.connect(start, b_incoming).unwrap();

    session.set_name("Broken");
    session.add_recipient(Uuid::new_v4());
    assert!(matches!(
        session.begin_submission(),
        Err(WorkflowError::AmbiguousFanOut { .. })
    ));

    // Removing the stray edge restores a linear chain.
    session.disconnect(stray_edge).unwrap();
    assert!(session.begin_submission().is_ok());
}
