use dialogue_commands_core::flows::{Flow, FlowStep, FlowsList, StepKind};
use serde_json::json;

fn flow_with_all_steps() -> Flow {
    let flows = FlowsList::from_json(&json!({
        "flows": {
            "test_flow": {
                "steps": [
                    {"id": "action_step", "action": "utter_greet"},
                    {
                        "id": "set_slots_step",
                        "set_slots": [{"has_been_greeted": true}, {"will_be_interesting": "unsure"}]
                    },
                    {
                        "id": "collect_step",
                        "collect": "topic",
                        "ask_before_filling": true,
                        "reset_after_flow_ends": false,
                        "rejections": [
                            {"if": "topic != large language models", "utter": "utter_too_boring"}
                        ]
                    },
                    {"id": "flow_step", "next": "generation_step"},
                    {
                        "id": "generation_step",
                        "generation_prompt": "Engage the user on the chosen topic:",
                        "llm": {"model": "gpt-5"}
                    },
                    {"id": "link_step", "link": "test_flow"}
                ]
            }
        }
    }))
    .expect("valid flows");

    flows.flow_by_id("test_flow").cloned().expect("test_flow is defined")
}

#[test]
fn serialization_neither_adds_nor_removes_data() {
    let flow = flow_with_all_steps();
    let expected_kinds = [
        ("action_step", "action"),
        ("set_slots_step", "set_slots"),
        ("collect_step", "collect"),
        ("flow_step", "generic"),
        ("generation_step", "generate_response"),
        ("link_step", "link"),
    ];

    for (step_id, kind) in expected_kinds {
        let step = flow.step_by_id(step_id).expect("step exists");
        assert_eq!(step.kind.type_name(), kind, "{step_id} has the wrong variant");

        let mut restored = FlowStep::from_json(&step.as_json()).expect("restores");
        // positions are only stamped when whole flows are assembled
        restored.idx = step.idx;
        assert_eq!(&restored, step, "{step_id} changed through serialization");
    }
}

#[test]
fn action_step_attributes() {
    let flow = flow_with_all_steps();
    let step = flow.step_by_id("action_step").expect("step");
    let StepKind::Action(action) = &step.kind else {
        panic!("expected an action step");
    };
    assert_eq!(action.action, "utter_greet");
}

#[test]
fn set_slots_step_attributes() {
    let flow = flow_with_all_steps();
    let step = flow.step_by_id("set_slots_step").expect("step");
    let StepKind::SetSlots(set_slots) = &step.kind else {
        panic!("expected a set slots step");
    };
    assert_eq!(set_slots.slots.len(), 2);
    assert_eq!(set_slots.slots[0].key, "has_been_greeted");
    assert_eq!(set_slots.slots[0].value, json!(true));
    assert_eq!(set_slots.slots[1].key, "will_be_interesting");
    assert_eq!(set_slots.slots[1].value, json!("unsure"));
}

#[test]
fn collect_step_attributes() {
    let flow = flow_with_all_steps();
    let collect = flow.step_by_id("collect_step").and_then(FlowStep::as_collect).expect("collect");

    assert_eq!(collect.collect, "topic");
    assert!(collect.ask_before_filling);
    assert!(!collect.reset_after_flow_ends);
    assert_eq!(collect.rejections.len(), 1);
    assert_eq!(collect.rejections[0].utter, "utter_too_boring");
}

#[test]
fn generic_step_attributes() {
    let flow = flow_with_all_steps();
    let step = flow.step_by_id("flow_step").expect("step");

    assert!(matches!(step.kind, StepKind::Generic(_)));
    assert_eq!(step.next.links.len(), 1);
    assert_eq!(step.next.links[0].target, "generation_step");
}

#[test]
fn generation_step_attributes() {
    let flow = flow_with_all_steps();
    let step = flow.step_by_id("generation_step").expect("step");
    let StepKind::GenerateResponse(generation) = &step.kind else {
        panic!("expected a generate response step");
    };
    assert!(generation.generation_prompt.starts_with("Engage"));
    assert_eq!(generation.llm_config["model"], json!("gpt-5"));
}

#[test]
fn link_step_attributes() {
    let flow = flow_with_all_steps();
    let step = flow.step_by_id("link_step").expect("step");
    let StepKind::Link(link) = &step.kind else {
        panic!("expected a link step");
    };
    assert_eq!(link.link, "test_flow");
}
